use models::{
    assignment::{AssignError, Clash},
    grid::GridError,
    slot::CatalogError,
};
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Every way a timetable operation can fail, independent of transport
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed input or a rule the request breaks on its own
    #[error("{0}")]
    Validation(String),

    /// The write would collide with data that already exists
    #[error("{message}")]
    Conflict { message: String, clashes: Vec<Clash> },

    #[error("{0} not found")]
    NotFound(String),

    #[error("authentication required")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error(transparent)]
    Database(DbErr),
}

impl ServiceError {
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
            clashes: Vec::new(),
        }
    }

    pub fn teacher_busy(clashes: Vec<Clash>) -> Self {
        let message = match clashes.as_slice() {
            [only] => format!(
                "teacher already assigned: {} teaches {} on {} {}",
                only.teacher_name, only.class_label, only.day, only.busy_slot
            ),
            _ => format!("teacher already assigned: {} clashes", clashes.len()),
        };
        Self::Conflict { message, clashes }
    }
}

impl From<DbErr> for ServiceError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                Self::conflict("a timetable already exists for this class and academic year")
            }
            _ => Self::Database(err),
        }
    }
}

impl From<AssignError> for ServiceError {
    fn from(err: AssignError) -> Self {
        match err {
            AssignError::TeacherBusy(clashes) => Self::teacher_busy(clashes),
            AssignError::NoContiguousSlot(_) => Self::conflict(err.to_string()),
            AssignError::Validation(_) => Self::Validation(err.to_string()),
        }
    }
}

impl From<GridError> for ServiceError {
    fn from(err: GridError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<CatalogError> for ServiceError {
    fn from(err: CatalogError) -> Self {
        Self::Validation(err.to_string())
    }
}

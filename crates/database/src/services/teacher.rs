use crate::{entities::teachers, error::ServiceError, services::timetable::now};
use log::info;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder,
};
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct NewTeacher {
    pub display_name: String,
    pub username: Option<String>,
    pub department: String,
}

pub struct TeacherService;

impl TeacherService {
    pub async fn create(
        db: &DatabaseConnection,
        new: NewTeacher,
        actor: &str,
    ) -> Result<teachers::Model, ServiceError> {
        let display_name = new.display_name.trim();
        let department = new.department.trim().to_lowercase();
        if display_name.is_empty() || department.is_empty() {
            return Err(ServiceError::Validation(
                "displayName and department are required".to_string(),
            ));
        }

        let now = now();
        let model = teachers::ActiveModel {
            id: Set(Uuid::new_v4()),
            display_name: Set(display_name.to_string()),
            username: Set(new.username.filter(|u| !u.trim().is_empty())),
            department: Set(department),
            is_active: Set(true),
            created_by: Set(actor.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await?;

        info!("Added teacher {} ({})", model.display_name, model.id);
        Ok(model)
    }

    /// Active teachers by name, optionally from one department
    pub async fn list_active(
        db: &DatabaseConnection,
        department: Option<String>,
    ) -> Result<Vec<teachers::Model>, ServiceError> {
        let mut condition = Condition::all().add(teachers::Column::IsActive.eq(true));
        if let Some(department) = department {
            condition =
                condition.add(teachers::Column::Department.eq(department.trim().to_lowercase()));
        }

        Ok(teachers::Entity::find()
            .filter(condition)
            .order_by_asc(teachers::Column::DisplayName)
            .all(db)
            .await?)
    }

    /// Only the coordinator who added a teacher may retire them. Timetables
    /// that still name the teacher are left as they are.
    pub async fn deactivate(
        db: &DatabaseConnection,
        id: Uuid,
        actor: &str,
    ) -> Result<teachers::Model, ServiceError> {
        let model = teachers::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("teacher {id}")))?;

        if model.created_by != actor {
            return Err(ServiceError::Forbidden(
                "only the creator can deactivate this teacher".to_string(),
            ));
        }

        let mut active: teachers::ActiveModel = model.into();
        active.is_active = Set(false);
        active.updated_at = Set(now());
        let updated = active.update(db).await?;

        info!("Deactivated teacher {id} by {actor}");
        Ok(updated)
    }
}

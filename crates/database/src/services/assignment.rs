use crate::{
    entities::timetables,
    error::ServiceError,
    services::{availability::AvailabilityService, timetable::TimetableService},
};
use futures::try_join;
use log::{info, warn};
use models::{activity::Activity, assignment::AssignOutcome, slot::SlotKey};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

pub struct AssignmentService;

impl AssignmentService {
    /// Places `activity` at `key` in timetable `id`, checked against every
    /// other timetable with drafts included
    pub async fn assign(
        db: &DatabaseConnection,
        id: Uuid,
        key: SlotKey,
        activity: Activity,
        actor: &str,
    ) -> Result<(timetables::Model, AssignOutcome), ServiceError> {
        let (model, busy) = try_join!(
            TimetableService::get(db, id),
            AvailabilityService::index(db, true, Some(id))
        )?;

        let catalog = model.effective_catalog();
        let mut grid = model.grid.clone();
        let outcome = grid
            .assign(&catalog, key, activity, &busy)
            .inspect_err(|err| warn!("Rejected assignment at {key} in timetable {id}: {err}"))?;

        match &outcome {
            AssignOutcome::Unchanged => Ok((model, outcome)),
            AssignOutcome::Written(keys) => {
                info!("Assigned {} cells at {key} in timetable {id} by {actor}", keys.len());
                let catalog = model.catalog.clone();
                let saved = TimetableService::save_grid(db, model, catalog, grid, actor).await?;
                Ok((saved, outcome))
            }
        }
    }

    /// Empties the cell at `key` along with the other half of a lab pair.
    /// Clearing an empty cell changes nothing.
    pub async fn unassign(
        db: &DatabaseConnection,
        id: Uuid,
        key: SlotKey,
        actor: &str,
    ) -> Result<timetables::Model, ServiceError> {
        let model = TimetableService::get(db, id).await?;

        let mut grid = model.grid.clone();
        let cleared = grid.unassign(&key);
        if cleared.is_empty() {
            return Ok(model);
        }

        info!("Cleared {} cells at {key} in timetable {id} by {actor}", cleared.len());
        let catalog = model.catalog.clone();
        TimetableService::save_grid(db, model, catalog, grid, actor).await
    }
}

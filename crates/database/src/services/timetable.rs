use crate::{entities::timetables, error::ServiceError, services::availability::AvailabilityService};
use chrono::{NaiveDateTime, NaiveTime, Utc};
use log::info;
use models::{
    activity::{Activity, Subject},
    days::Day,
    grid::{Grid, GridEntry},
    identity::ClassIdentity,
    slot::{SlotCatalog, TimeSlot},
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};
use serde::Serialize;
use uuid::Uuid;

/// A timetable about to be stored
#[derive(Debug, Clone, Default)]
pub struct NewTimetable {
    pub identity: ClassIdentity,
    /// `None` keeps the standard day
    pub catalog: Option<SlotCatalog>,
    pub grid: Grid,
}

#[derive(Debug, Clone)]
pub enum GridPatch {
    Replace(Grid),
    Upsert(Vec<GridEntry>),
}

#[derive(Debug, Clone, Default)]
pub struct TimetablePatch {
    pub catalog: Option<SlotCatalog>,
    pub grid: Option<GridPatch>,
}

#[derive(Debug, Clone, Default)]
pub struct TimetableFilter {
    pub year: Option<String>,
    pub branch: Option<String>,
    pub section: Option<String>,
    pub academic_year: Option<String>,
    pub is_published: Option<bool>,
}

/// Coordinator edits to a timetable's own slot list
#[derive(Debug, Clone)]
pub enum CatalogEdit {
    Add(TimeSlot),
    Remove(TimeSlot),
    /// Moves the end of `slot` and shifts every later slot by the same amount
    Resize { slot: TimeSlot, end: NaiveTime },
}

/// One slot a teacher holds in some timetable
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherAssignment {
    pub timetable_id: Uuid,
    pub class: ClassIdentity,
    pub day: Day,
    pub time_slot: TimeSlot,
    pub activity: Activity,
    /// The subject this teacher covers, which differs per batch in split labs
    pub subject: Option<Subject>,
    pub is_continuation: bool,
}

pub(crate) fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

pub struct TimetableService;

impl TimetableService {
    /// The largest page `list` hands out
    pub const MAX_PER_PAGE: u64 = 100;

    pub async fn create(
        db: &DatabaseConnection,
        new: NewTimetable,
        actor: &str,
    ) -> Result<timetables::Model, ServiceError> {
        let identity = new.identity.normalized();

        if Self::find_by_identity(db, &identity).await?.is_some() {
            return Err(ServiceError::conflict(format!(
                "a timetable already exists for {identity}"
            )));
        }

        let catalog = new.catalog.clone().unwrap_or_default();
        new.grid.validate(&catalog)?;
        let busy = AvailabilityService::index(db, true, None).await?;
        let clashes = new.grid.clashes(&catalog, &busy);
        if !clashes.is_empty() {
            return Err(ServiceError::teacher_busy(clashes));
        }

        let now = now();
        let model = timetables::ActiveModel {
            id: Set(Uuid::new_v4()),
            year: Set(identity.year.clone()),
            branch: Set(identity.branch.clone()),
            section: Set(identity.section.clone()),
            academic_year: Set(identity.academic_year.clone()),
            catalog: Set(new.catalog),
            grid: Set(new.grid),
            is_published: Set(false),
            published_at: Set(None),
            last_published_at: Set(None),
            created_by: Set(actor.to_string()),
            last_modified_by: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await?;

        info!("Created timetable {} for {identity}", model.id);
        Ok(model)
    }

    pub async fn get(db: &DatabaseConnection, id: Uuid) -> Result<timetables::Model, ServiceError> {
        timetables::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("timetable {id}")))
    }

    pub async fn find_by_identity(
        db: &DatabaseConnection,
        identity: &ClassIdentity,
    ) -> Result<Option<timetables::Model>, ServiceError> {
        let identity = identity.clone().normalized();
        let model = timetables::Entity::find()
            .filter(
                Condition::all()
                    .add(timetables::Column::Year.eq(identity.year))
                    .add(timetables::Column::Branch.eq(identity.branch))
                    .add(timetables::Column::Section.eq(identity.section))
                    .add(timetables::Column::AcademicYear.eq(identity.academic_year)),
            )
            .one(db)
            .await?;
        Ok(model)
    }

    /// The most recently published timetable of a class section. `year` and
    /// `academic_year` narrow the match when given.
    pub async fn find_published(
        db: &DatabaseConnection,
        branch: &str,
        section: &str,
        year: Option<&str>,
        academic_year: Option<&str>,
    ) -> Result<timetables::Model, ServiceError> {
        let mut condition = Condition::all()
            .add(timetables::Column::IsPublished.eq(true))
            .add(timetables::Column::Branch.eq(branch.trim().to_lowercase()))
            .add(timetables::Column::Section.eq(section.trim().to_uppercase()));

        if let Some(year) = year {
            condition = condition.add(timetables::Column::Year.eq(year.trim()));
        }
        if let Some(academic_year) = academic_year {
            condition = condition.add(timetables::Column::AcademicYear.eq(academic_year.trim()));
        }

        timetables::Entity::find()
            .filter(condition)
            .order_by_desc(timetables::Column::PublishedAt)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("published timetable for {branch} {section}"))
            })
    }

    /// Replaces or patches the grid and optionally the catalog. The result is
    /// checked as a whole against every other timetable.
    pub async fn update(
        db: &DatabaseConnection,
        id: Uuid,
        patch: TimetablePatch,
        actor: &str,
    ) -> Result<timetables::Model, ServiceError> {
        let model = Self::get(db, id).await?;

        let catalog = patch.catalog.or_else(|| model.catalog.clone());
        let grid = match patch.grid {
            Some(GridPatch::Replace(grid)) => grid,
            Some(GridPatch::Upsert(entries)) => {
                let mut grid = model.grid.clone();
                grid.upsert(entries);
                grid
            }
            None => model.grid.clone(),
        };

        let saved = Self::save_checked(db, model, catalog, grid, actor).await?;
        info!("Updated timetable {id} by {actor}");
        Ok(saved)
    }

    /// Applies a slot edit, carrying the grid along with it
    pub async fn edit_catalog(
        db: &DatabaseConnection,
        id: Uuid,
        edit: CatalogEdit,
        actor: &str,
    ) -> Result<timetables::Model, ServiceError> {
        let model = Self::get(db, id).await?;
        let mut catalog = model.effective_catalog();
        let mut grid = model.grid.clone();

        match &edit {
            CatalogEdit::Add(slot) => catalog.add_slot(*slot)?,
            CatalogEdit::Remove(slot) => {
                catalog.remove_slot(slot)?;
                grid.drop_slot(slot);
            }
            CatalogEdit::Resize { slot, end } => {
                let moved = catalog.resize_slot(slot, *end)?;
                grid.rename_slots(&moved);
            }
        }

        let saved = Self::save_checked(db, model, Some(catalog), grid, actor).await?;
        info!("Edited slots of timetable {id}: {edit:?}");
        Ok(saved)
    }

    /// Flips the published flag and its timestamps. Gating lives in
    /// [`PublicationService`](crate::services::publication::PublicationService).
    pub async fn set_published(
        db: &DatabaseConnection,
        id: Uuid,
        is_published: bool,
        actor: &str,
    ) -> Result<timetables::Model, ServiceError> {
        let model = Self::get(db, id).await?;
        let now = now();

        let mut active: timetables::ActiveModel = model.into();
        active.is_published = Set(is_published);
        active.published_at = Set(is_published.then_some(now));
        if is_published {
            active.last_published_at = Set(Some(now));
        }
        active.last_modified_by = Set(Some(actor.to_string()));
        active.updated_at = Set(now);

        Ok(active.update(db).await?)
    }

    pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
        let result = timetables::Entity::delete_by_id(id).exec(db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("timetable {id}")));
        }

        info!("Deleted timetable {id}");
        Ok(())
    }

    /// Newest first. `page` starts at 1.
    pub async fn list(
        db: &DatabaseConnection,
        filter: TimetableFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<timetables::Model>, u64), ServiceError> {
        let mut condition = Condition::all();

        if let Some(year) = filter.year {
            condition = condition.add(timetables::Column::Year.eq(year.trim()));
        }
        if let Some(branch) = filter.branch {
            condition = condition.add(timetables::Column::Branch.eq(branch.trim().to_lowercase()));
        }
        if let Some(section) = filter.section {
            condition =
                condition.add(timetables::Column::Section.eq(section.trim().to_uppercase()));
        }
        if let Some(academic_year) = filter.academic_year {
            condition = condition.add(timetables::Column::AcademicYear.eq(academic_year.trim()));
        }
        if let Some(is_published) = filter.is_published {
            condition = condition.add(timetables::Column::IsPublished.eq(is_published));
        }

        let query = timetables::Entity::find()
            .filter(condition)
            .order_by_desc(timetables::Column::CreatedAt);

        let total_items = query.clone().count(db).await?;
        let paginator = query.paginate(db, per_page.clamp(1, Self::MAX_PER_PAGE));
        let items = paginator.fetch_page(page.max(1) - 1).await?; // SeaORM uses 0-based pages

        Ok((items, total_items))
    }

    /// Every slot `teacher_id` holds, in day order then time
    pub async fn find_by_teacher(
        db: &DatabaseConnection,
        teacher_id: Uuid,
        only_published: bool,
    ) -> Result<Vec<TeacherAssignment>, ServiceError> {
        let schedules = Self::load_all(db, !only_published).await?;

        let mut assignments: Vec<TeacherAssignment> = schedules
            .iter()
            .flat_map(|schedule| {
                schedule
                    .grid
                    .occupants()
                    .filter(|(_, occupant)| {
                        occupant
                            .activity
                            .teachers()
                            .iter()
                            .any(|teacher| teacher.id == Some(teacher_id))
                    })
                    .map(|(key, occupant)| TeacherAssignment {
                        timetable_id: schedule.id,
                        class: schedule.identity(),
                        day: key.day,
                        time_slot: key.time_slot,
                        activity: occupant.activity.clone(),
                        subject: occupant.activity.subject_of(teacher_id).cloned(),
                        is_continuation: occupant.is_continuation,
                    })
            })
            .collect();

        assignments.sort_by_key(|a| (a.day, a.time_slot));
        Ok(assignments)
    }

    /// Loads every timetable, or only the published ones
    pub(crate) async fn load_all(
        db: &DatabaseConnection,
        include_drafts: bool,
    ) -> Result<Vec<timetables::Model>, ServiceError> {
        let mut query = timetables::Entity::find();
        if !include_drafts {
            query = query.filter(timetables::Column::IsPublished.eq(true));
        }
        Ok(query.all(db).await?)
    }

    /// Validates `grid` against `catalog`, checks it against every other
    /// timetable, then writes both
    pub(crate) async fn save_checked(
        db: &DatabaseConnection,
        model: timetables::Model,
        catalog: Option<SlotCatalog>,
        grid: Grid,
        actor: &str,
    ) -> Result<timetables::Model, ServiceError> {
        let effective = catalog.clone().unwrap_or_default();
        grid.validate(&effective)?;

        let busy = AvailabilityService::index(db, true, Some(model.id)).await?;
        let clashes = grid.clashes(&effective, &busy);
        if !clashes.is_empty() {
            return Err(ServiceError::teacher_busy(clashes));
        }

        Self::save_grid(db, model, catalog, grid, actor).await
    }

    /// Writes `grid` and `catalog` without further checks
    pub(crate) async fn save_grid(
        db: &DatabaseConnection,
        model: timetables::Model,
        catalog: Option<SlotCatalog>,
        grid: Grid,
        actor: &str,
    ) -> Result<timetables::Model, ServiceError> {
        let mut active: timetables::ActiveModel = model.into();
        active.catalog = Set(catalog);
        active.grid = Set(grid);
        active.last_modified_by = Set(Some(actor.to_string()));
        active.updated_at = Set(now());

        Ok(active.update(db).await?)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testing::memory_db;
    use models::{
        activity::{Session, TeacherRef},
        grid::Cell,
        slot::SlotKey,
    };

    fn identity(section: &str) -> ClassIdentity {
        ClassIdentity::new("2nd Year", "cse", section, "2025-26")
    }

    fn slot(text: &str) -> TimeSlot {
        text.parse().unwrap()
    }

    fn lecture(teacher: Uuid, name: &str) -> Activity {
        Activity::Lecture(Session {
            subject: Subject {
                acronym: Some("DBMS".to_string()),
                ..Default::default()
            },
            teacher: TeacherRef {
                id: Some(teacher),
                name: name.to_string(),
                username: None,
            },
            room: None,
        })
    }

    fn grid_with(day: Day, time: &str, activity: Activity) -> Grid {
        Grid::from(vec![GridEntry {
            day,
            time_slot: slot(time),
            cell: Cell::Primary { activity },
        }])
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = memory_db().await;
        let created = TimetableService::create(
            &db,
            NewTimetable {
                identity: ClassIdentity::new("2nd Year", " CSE", "a", "2025-26"),
                ..Default::default()
            },
            "coord-1",
        )
        .await
        .unwrap();

        assert_eq!(created.branch, "cse");
        assert_eq!(created.section, "A");
        assert!(!created.is_published);
        assert_eq!(created.created_by, "coord-1");

        let fetched = TimetableService::get(&db, created.id).await.unwrap();
        assert_eq!(fetched, created);

        let found = TimetableService::find_by_identity(&db, &identity("A"))
            .await
            .unwrap();
        assert_eq!(found.map(|m| m.id), Some(created.id));
    }

    #[tokio::test]
    async fn test_duplicate_identity_conflicts() {
        let db = memory_db().await;
        let new = NewTimetable {
            identity: identity("A"),
            ..Default::default()
        };
        TimetableService::create(&db, new.clone(), "coord-1")
            .await
            .unwrap();

        let err = TimetableService::create(&db, new, "coord-2")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict { .. }));

        let (items, total) =
            TimetableService::list(&db, TimetableFilter::default(), 1, 20)
                .await
                .unwrap();
        assert_eq!(total, 1);
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let db = memory_db().await;
        let err = TimetableService::get(&db, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let err = TimetableService::delete(&db, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_clashing_grid() {
        let db = memory_db().await;
        let teacher = Uuid::new_v4();
        TimetableService::create(
            &db,
            NewTimetable {
                identity: identity("A"),
                catalog: None,
                grid: grid_with(Day::Monday, "08:50-09:50", lecture(teacher, "Dr. Rao")),
            },
            "coord-1",
        )
        .await
        .unwrap();

        let err = TimetableService::create(
            &db,
            NewTimetable {
                identity: identity("B"),
                catalog: None,
                grid: grid_with(Day::Monday, "08:50-09:50", lecture(teacher, "Dr. Rao")),
            },
            "coord-1",
        )
        .await
        .unwrap_err();

        let ServiceError::Conflict { clashes, .. } = err else {
            panic!("expected a conflict, got {err:?}");
        };
        assert_eq!(clashes.len(), 1);
        assert_eq!(clashes[0].class_label, "2nd Year CSE A");
    }

    #[tokio::test]
    async fn test_update_upserts_and_rejects_unknown_slots() {
        let db = memory_db().await;
        let created = TimetableService::create(
            &db,
            NewTimetable {
                identity: identity("A"),
                ..Default::default()
            },
            "coord-1",
        )
        .await
        .unwrap();

        let teacher = Uuid::new_v4();
        let patch = TimetablePatch {
            catalog: None,
            grid: Some(GridPatch::Upsert(vec![GridEntry {
                day: Day::Tuesday,
                time_slot: slot("09:50-10:50"),
                cell: Cell::Primary {
                    activity: lecture(teacher, "Dr. Rao"),
                },
            }])),
        };
        let updated = TimetableService::update(&db, created.id, patch, "coord-2")
            .await
            .unwrap();
        assert_eq!(updated.grid.len(), 1);
        assert_eq!(updated.last_modified_by.as_deref(), Some("coord-2"));

        let bad = TimetablePatch {
            catalog: None,
            grid: Some(GridPatch::Replace(grid_with(
                Day::Monday,
                "07:00-08:00",
                Activity::Library,
            ))),
        };
        let err = TimetableService::update(&db, created.id, bad, "coord-2")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_edit_catalog_shifts_cells() {
        let db = memory_db().await;
        let created = TimetableService::create(
            &db,
            NewTimetable {
                identity: identity("A"),
                catalog: None,
                grid: grid_with(Day::Monday, "09:50-10:50", Activity::Library),
            },
            "coord-1",
        )
        .await
        .unwrap();

        let first = slot("08:50-09:50");
        let edited = TimetableService::edit_catalog(
            &db,
            created.id,
            CatalogEdit::Resize {
                slot: first,
                end: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            },
            "coord-1",
        )
        .await
        .unwrap();

        let shifted = SlotKey::new(Day::Monday, slot("10:00-11:00"));
        assert!(edited.grid.get(&shifted).is_some());
        assert!(edited.effective_catalog().contains(&slot("08:50-10:00")));

        let removed = TimetableService::edit_catalog(
            &db,
            created.id,
            CatalogEdit::Remove(slot("10:00-11:00")),
            "coord-1",
        )
        .await
        .unwrap();
        assert!(removed.grid.is_empty());
    }

    #[tokio::test]
    async fn test_resize_into_booked_teacher_conflicts() {
        let db = memory_db().await;
        let teacher = Uuid::new_v4();
        let section_a = TimetableService::create(
            &db,
            NewTimetable {
                identity: identity("A"),
                catalog: None,
                grid: grid_with(Day::Monday, "09:50-10:50", lecture(teacher, "Dr. Rao")),
            },
            "coord-1",
        )
        .await
        .unwrap();
        TimetableService::create(
            &db,
            NewTimetable {
                identity: identity("B"),
                catalog: None,
                grid: grid_with(Day::Monday, "10:50-11:50", lecture(teacher, "Dr. Rao")),
            },
            "coord-1",
        )
        .await
        .unwrap();

        // Stretching the first period pushes A's lecture to 10:00-11:00
        let err = TimetableService::edit_catalog(
            &db,
            section_a.id,
            CatalogEdit::Resize {
                slot: slot("08:50-09:50"),
                end: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            },
            "coord-1",
        )
        .await
        .unwrap_err();

        let ServiceError::Conflict { clashes, .. } = err else {
            panic!("expected a conflict, got {err:?}");
        };
        assert_eq!(clashes.len(), 1);
        assert_eq!(clashes[0].teacher_id, teacher);
        assert_eq!(clashes[0].class_label, "2nd Year CSE B");

        let unchanged = TimetableService::get(&db, section_a.id).await.unwrap();
        assert_eq!(unchanged.catalog, None);
        assert!(
            unchanged
                .grid
                .get(&SlotKey::new(Day::Monday, slot("09:50-10:50")))
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_upsert_double_booking_conflicts() {
        let db = memory_db().await;
        let teacher = Uuid::new_v4();
        TimetableService::create(
            &db,
            NewTimetable {
                identity: identity("A"),
                catalog: None,
                grid: grid_with(Day::Friday, "13:30-14:30", lecture(teacher, "Dr. Rao")),
            },
            "coord-1",
        )
        .await
        .unwrap();
        let section_b = TimetableService::create(
            &db,
            NewTimetable {
                identity: identity("B"),
                ..Default::default()
            },
            "coord-1",
        )
        .await
        .unwrap();

        let patch = TimetablePatch {
            catalog: None,
            grid: Some(GridPatch::Upsert(vec![GridEntry {
                day: Day::Friday,
                time_slot: slot("13:30-14:30"),
                cell: Cell::Primary {
                    activity: lecture(teacher, "Dr. Rao"),
                },
            }])),
        };
        let err = TimetableService::update(&db, section_b.id, patch, "coord-2")
            .await
            .unwrap_err();

        let ServiceError::Conflict { clashes, .. } = err else {
            panic!("expected a conflict, got {err:?}");
        };
        assert!(!clashes.is_empty());
        assert_eq!(clashes[0].class_label, "2nd Year CSE A");

        let unchanged = TimetableService::get(&db, section_b.id).await.unwrap();
        assert!(unchanged.grid.is_empty());
        assert_eq!(unchanged.last_modified_by, None);
    }

    #[tokio::test]
    async fn test_list_filters_and_paginates() {
        let db = memory_db().await;
        for section in ["A", "B", "C"] {
            TimetableService::create(
                &db,
                NewTimetable {
                    identity: identity(section),
                    ..Default::default()
                },
                "coord-1",
            )
            .await
            .unwrap();
        }

        let (page, total) = TimetableService::list(&db, TimetableFilter::default(), 2, 2)
            .await
            .unwrap();
        assert_eq!(total, 3);
        assert_eq!(page.len(), 1);

        let filter = TimetableFilter {
            section: Some("b".to_string()),
            ..Default::default()
        };
        let (items, total) = TimetableService::list(&db, filter, 1, 20).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(items[0].section, "B");

        let filter = TimetableFilter {
            is_published: Some(true),
            ..Default::default()
        };
        let (_, total) = TimetableService::list(&db, filter, 1, 20).await.unwrap();
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn test_find_by_teacher_sorted_and_published_only() {
        let db = memory_db().await;
        let teacher = Uuid::new_v4();

        let mut grid = grid_with(Day::Wednesday, "08:50-09:50", lecture(teacher, "Dr. Rao"));
        grid.upsert(vec![GridEntry {
            day: Day::Monday,
            time_slot: slot("13:30-14:30"),
            cell: Cell::Primary {
                activity: lecture(teacher, "Dr. Rao"),
            },
        }]);
        let created = TimetableService::create(
            &db,
            NewTimetable {
                identity: identity("A"),
                catalog: None,
                grid,
            },
            "coord-1",
        )
        .await
        .unwrap();

        let hidden = TimetableService::find_by_teacher(&db, teacher, true)
            .await
            .unwrap();
        assert!(hidden.is_empty());

        TimetableService::set_published(&db, created.id, true, "coord-1")
            .await
            .unwrap();
        let found = TimetableService::find_by_teacher(&db, teacher, true)
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].day, Day::Monday);
        assert_eq!(found[1].day, Day::Wednesday);
        assert_eq!(found[0].class.label(), "2nd Year CSE A");
    }
}

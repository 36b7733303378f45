use crate::{entities::timetables, error::ServiceError, services::timetable::TimetableService};
use log::debug;
use models::{
    availability::{Booking, BusyIndex, ScheduleView},
    slot::SlotKey,
};
use sea_orm::DatabaseConnection;
use std::collections::BTreeSet;
use uuid::Uuid;

/// Who is teaching at one slot, across every matching timetable
#[derive(Debug, Clone, Default)]
pub struct BusySlot {
    pub busy_teachers: BTreeSet<Uuid>,
    pub bookings: Vec<Booking>,
}

pub struct AvailabilityService;

impl AvailabilityService {
    /// Builds a fresh index from the store. Nothing is cached between calls.
    pub async fn index(
        db: &DatabaseConnection,
        include_drafts: bool,
        exclude: Option<Uuid>,
    ) -> Result<BusyIndex, ServiceError> {
        let schedules = TimetableService::load_all(db, include_drafts).await?;
        let index = Self::build(&schedules, include_drafts, exclude);
        debug!(
            "Built availability index over {} timetables (drafts: {include_drafts}, excluding: {exclude:?})",
            schedules.len()
        );
        Ok(index)
    }

    pub fn build(
        schedules: &[timetables::Model],
        include_drafts: bool,
        exclude: Option<Uuid>,
    ) -> BusyIndex {
        let labels: Vec<String> = schedules.iter().map(|s| s.identity().label()).collect();
        let views = schedules
            .iter()
            .zip(&labels)
            .map(|(schedule, label)| ScheduleView {
                id: schedule.id,
                class_label: label,
                is_published: schedule.is_published,
                grid: &schedule.grid,
            });

        BusyIndex::build(views, include_drafts, exclude)
    }

    pub async fn busy_teachers(
        db: &DatabaseConnection,
        key: SlotKey,
        include_drafts: bool,
        exclude: Option<Uuid>,
    ) -> Result<BusySlot, ServiceError> {
        let index = Self::index(db, include_drafts, exclude).await?;

        Ok(BusySlot {
            busy_teachers: index.busy_teachers(&key),
            bookings: index.bookings_at(&key).cloned().collect(),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        services::timetable::{NewTimetable, TimetableService},
        testing::memory_db,
    };
    use models::{
        activity::{Activity, Session, Subject, TeacherRef},
        days::Day,
        grid::{Cell, Grid, GridEntry},
        identity::ClassIdentity,
        slot::{SlotCatalog, TimeSlot},
    };

    fn slot(text: &str) -> TimeSlot {
        text.parse().unwrap()
    }

    fn lecture_grid(teacher: Uuid, time: &str) -> Grid {
        Grid::from(vec![GridEntry {
            day: Day::Thursday,
            time_slot: slot(time),
            cell: Cell::Primary {
                activity: Activity::Lecture(Session {
                    subject: Subject {
                        code: Some("CS301".to_string()),
                        ..Default::default()
                    },
                    teacher: TeacherRef {
                        id: Some(teacher),
                        name: "Dr. Iyer".to_string(),
                        username: None,
                    },
                    room: Some("B-204".to_string()),
                }),
            },
        }])
    }

    #[tokio::test]
    async fn test_busy_teachers_respects_drafts_and_exclude() {
        let db = memory_db().await;
        let teacher = Uuid::new_v4();
        let draft = TimetableService::create(
            &db,
            NewTimetable {
                identity: ClassIdentity::new("3rd Year", "it", "A", "2025-26"),
                catalog: None,
                grid: lecture_grid(teacher, "09:50-10:50"),
            },
            "coord-1",
        )
        .await
        .unwrap();

        let key = SlotKey::new(Day::Thursday, slot("09:50-10:50"));

        let published_only = AvailabilityService::busy_teachers(&db, key, false, None)
            .await
            .unwrap();
        assert!(published_only.busy_teachers.is_empty());

        let with_drafts = AvailabilityService::busy_teachers(&db, key, true, None)
            .await
            .unwrap();
        assert_eq!(with_drafts.busy_teachers, BTreeSet::from([teacher]));
        assert_eq!(with_drafts.bookings[0].class_label, "3rd Year IT A");
        assert_eq!(with_drafts.bookings[0].timetable_id, draft.id);

        let excluded = AvailabilityService::busy_teachers(&db, key, true, Some(draft.id))
            .await
            .unwrap();
        assert!(excluded.bookings.is_empty());
    }

    #[tokio::test]
    async fn test_overlap_across_catalogs() {
        let db = memory_db().await;
        let teacher = Uuid::new_v4();
        let catalog = SlotCatalog::new(vec![slot("09:00-10:00"), slot("10:00-11:00")]).unwrap();
        TimetableService::create(
            &db,
            NewTimetable {
                identity: ClassIdentity::new("1st Year", "ece", "A", "2025-26"),
                catalog: Some(catalog),
                grid: lecture_grid(teacher, "09:00-10:00"),
            },
            "coord-1",
        )
        .await
        .unwrap();

        // 08:50-09:50 overlaps 09:00-10:00 on the standard day
        let key = SlotKey::new(Day::Thursday, slot("08:50-09:50"));
        let busy = AvailabilityService::busy_teachers(&db, key, true, None)
            .await
            .unwrap();
        assert!(busy.busy_teachers.contains(&teacher));

        let later = SlotKey::new(Day::Thursday, slot("10:50-11:50"));
        let free = AvailabilityService::busy_teachers(&db, later, true, None)
            .await
            .unwrap();
        assert!(free.busy_teachers.is_empty());
    }
}

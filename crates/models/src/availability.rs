use crate::{
    days::Day,
    grid::Grid,
    slot::{SlotKey, TimeSlot},
};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

/// Read-only view of one stored timetable, as the index needs it
#[derive(Debug, Clone, Copy)]
pub struct ScheduleView<'a> {
    pub id: Uuid,
    pub class_label: &'a str,
    pub is_published: bool,
    pub grid: &'a Grid,
}

/// One teacher holding one slot of one timetable
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub teacher_id: Uuid,
    pub teacher_name: String,
    pub time_slot: TimeSlot,
    pub timetable_id: Uuid,
    pub class_label: String,
    /// Set when the teacher teaches one batch of a split lab
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch: Option<String>,
}

/// Which teachers are already booked where, across a set of timetables.
///
/// Built on demand from the store for every check and dropped afterwards.
/// Two slots on the same day are treated as the same time whenever their
/// clock intervals overlap.
#[derive(Debug, Clone, Default)]
pub struct BusyIndex {
    by_day: BTreeMap<Day, Vec<Booking>>,
}

impl BusyIndex {
    /// Collects every teacher-bearing cell of `schedules`. Drafts are skipped
    /// unless `include_drafts`; the timetable `exclude` (the one being
    /// edited) never contributes.
    pub fn build<'a>(
        schedules: impl IntoIterator<Item = ScheduleView<'a>>,
        include_drafts: bool,
        exclude: Option<Uuid>,
    ) -> Self {
        let mut index = Self::default();

        for schedule in schedules {
            if Some(schedule.id) == exclude || (!schedule.is_published && !include_drafts) {
                continue;
            }

            for (key, occupant) in schedule.grid.occupants() {
                let batches = occupant.activity.batches();
                for (teacher, batch) in occupant.activity.teachers().into_iter().zip(batches) {
                    // Free-text teachers cannot be matched across timetables
                    let Some(teacher_id) = teacher.id else {
                        continue;
                    };

                    index.by_day.entry(key.day).or_default().push(Booking {
                        teacher_id,
                        teacher_name: teacher.name.clone(),
                        time_slot: key.time_slot,
                        timetable_id: schedule.id,
                        class_label: schedule.class_label.to_string(),
                        batch,
                    });
                }
            }
        }

        index
    }

    pub fn is_empty(&self) -> bool {
        self.by_day.values().all(Vec::is_empty)
    }

    /// Bookings whose slot overlaps `key`
    pub fn bookings_at<'s>(&'s self, key: &SlotKey) -> impl Iterator<Item = &'s Booking> + 's {
        let time_slot = key.time_slot;
        self.by_day
            .get(&key.day)
            .into_iter()
            .flatten()
            .filter(move |booking| booking.time_slot.overlaps(&time_slot))
    }

    /// The teachers occupying `key` anywhere in the indexed timetables
    pub fn busy_teachers(&self, key: &SlotKey) -> BTreeSet<Uuid> {
        self.bookings_at(key).map(|b| b.teacher_id).collect()
    }

    /// Bookings of `teacher_id` overlapping `key`
    pub fn bookings_of<'s>(
        &'s self,
        teacher_id: Uuid,
        key: &SlotKey,
    ) -> impl Iterator<Item = &'s Booking> + 's {
        self.bookings_at(key)
            .filter(move |booking| booking.teacher_id == teacher_id)
    }
}

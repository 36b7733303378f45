//! Validates and applies cell edits to a timetable grid.
//!
//! The engine is pure: callers build a [`BusyIndex`] from every other
//! timetable and hand it in, then persist the grid on success.

use crate::{
    activity::Activity,
    availability::BusyIndex,
    days::Day,
    grid::{Cell, Grid, GridError},
    slot::{SlotCatalog, SlotKey, TimeSlot},
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// A teacher that the proposed edit would double-book
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Clash {
    pub teacher_id: Uuid,
    pub teacher_name: String,
    pub day: Day,
    /// The slot the edit tried to claim
    pub time_slot: TimeSlot,
    /// The slot the teacher already holds elsewhere
    pub busy_slot: TimeSlot,
    pub timetable_id: Uuid,
    pub class_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssignError {
    #[error("{0}")]
    Validation(String),
    #[error("no contiguous slot available after {0}")]
    NoContiguousSlot(SlotKey),
    #[error("teacher already assigned: {}", describe(.0))]
    TeacherBusy(Vec<Clash>),
}

fn describe(clashes: &[Clash]) -> String {
    clashes
        .iter()
        .map(|c| {
            format!(
                "{} on {} {} ({})",
                c.teacher_name, c.day, c.busy_slot, c.class_label
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<GridError> for AssignError {
    fn from(err: GridError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Result of a successful [`Grid::assign`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignOutcome {
    /// The identical activity already occupied the cell
    Unchanged,
    /// Cells written, primary first
    Written(Vec<SlotKey>),
}

impl Grid {
    /// Places `activity` at `key`, enforcing the two-slot and double-booking
    /// rules. On error the grid is left untouched.
    pub fn assign(
        &mut self,
        catalog: &SlotCatalog,
        key: SlotKey,
        activity: Activity,
        busy: &BusyIndex,
    ) -> Result<AssignOutcome, AssignError> {
        if !catalog.contains(&key.time_slot) {
            return Err(GridError::UnknownSlot(key).into());
        }

        if matches!(activity, Activity::Lunch) {
            // No-op only when every day already has lunch here
            let row_done = Day::order().iter().all(|day| {
                matches!(
                    self.get(&SlotKey::new(*day, key.time_slot)),
                    Some(Cell::Primary { activity: Activity::Lunch })
                )
            });
            if row_done {
                return Ok(AssignOutcome::Unchanged);
            }
            return Ok(AssignOutcome::Written(self.fill_row(key.time_slot, activity)));
        }

        if let Some(Cell::Primary { activity: current }) = self.get(&key)
            && current == &activity
        {
            return Ok(AssignOutcome::Unchanged);
        }

        activity.validate().map_err(AssignError::Validation)?;

        let mut span = vec![key];
        if activity.span() > 1 {
            let next = catalog
                .next_slot(key.day, &key.time_slot)
                .filter(|next| self.is_vacant_for(next, &key))
                .ok_or(AssignError::NoContiguousSlot(key))?;
            span.push(next);
        }

        let clashes = clashes_for(&activity, &span, busy);
        if !clashes.is_empty() {
            return Err(AssignError::TeacherBusy(clashes));
        }

        for cell in &span {
            self.clear(cell);
        }
        self.put_primary(key, activity);
        for continuation in &span[1..] {
            self.put_continuation(*continuation, key.time_slot);
        }

        Ok(AssignOutcome::Written(span))
    }

    /// Empties the cell at `key` and the other half of its pair
    pub fn unassign(&mut self, key: &SlotKey) -> Vec<SlotKey> {
        self.clear(key)
    }

    /// Every double-booking the grid would cause against `busy`. Used to
    /// check whole grids submitted at once.
    pub fn clashes(&self, catalog: &SlotCatalog, busy: &BusyIndex) -> Vec<Clash> {
        self.entries()
            .filter_map(|(key, cell)| match cell {
                Cell::Primary { activity } => Some((*key, activity)),
                Cell::Continuation { .. } => None,
            })
            .flat_map(|(key, activity)| {
                let mut span = vec![key];
                if activity.span() > 1
                    && let Some(next) = catalog.next_slot(key.day, &key.time_slot)
                {
                    span.push(next);
                }
                clashes_for(activity, &span, busy)
            })
            .collect()
    }

    /// Writes `activity` into `time_slot` on every day, breaking any pair it
    /// lands on
    fn fill_row(&mut self, time_slot: TimeSlot, activity: Activity) -> Vec<SlotKey> {
        Day::order()
            .into_iter()
            .map(|day| {
                let key = SlotKey::new(day, time_slot);
                self.clear(&key);
                self.put_primary(key, activity.clone());
                key
            })
            .collect()
    }
}

fn clashes_for(activity: &Activity, span: &[SlotKey], busy: &BusyIndex) -> Vec<Clash> {
    let mut clashes = Vec::new();

    for teacher in activity.teachers() {
        let Some(teacher_id) = teacher.id else {
            continue;
        };

        for key in span {
            for booking in busy.bookings_of(teacher_id, key) {
                clashes.push(Clash {
                    teacher_id,
                    teacher_name: if teacher.name.is_empty() {
                        booking.teacher_name.clone()
                    } else {
                        teacher.name.clone()
                    },
                    day: key.day,
                    time_slot: key.time_slot,
                    busy_slot: booking.time_slot,
                    timetable_id: booking.timetable_id,
                    class_label: booking.class_label.clone(),
                });
            }
        }
    }

    clashes
}

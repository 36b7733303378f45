use crate::{
    activity::Activity,
    days::Day,
    slot::{SlotCatalog, SlotKey, TimeSlot},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Content of one grid cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "kebab-case")]
pub enum Cell {
    /// The editable cell holding the activity
    Primary { activity: Activity },
    /// Second half of a two-slot activity whose primary sits at `of` on the
    /// same day. Carries no state of its own.
    Continuation { of: TimeSlot },
}

/// Serialized form of one occupied cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridEntry {
    pub day: Day,
    pub time_slot: TimeSlot,
    pub cell: Cell,
}

/// A cell resolved through its continuation link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occupant<'a> {
    pub activity: &'a Activity,
    /// Where the primary cell lives
    pub primary: SlotKey,
    /// True when the looked-up cell is the continuation half
    pub is_continuation: bool,
}

/// Structural problems found in a stored or submitted grid
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("{0} is not a time slot of this timetable")]
    UnknownSlot(SlotKey),
    #[error("{key}: {message}")]
    InvalidActivity { key: SlotKey, message: String },
    #[error("continuation at {0} does not follow a two-slot activity")]
    DanglingContinuation(SlotKey),
    #[error("{0} spans two slots but its second slot is not linked to it")]
    MissingContinuation(SlotKey),
}

/// The sparse day × slot layout of one timetable
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<GridEntry>", into = "Vec<GridEntry>")]
pub struct Grid {
    cells: BTreeMap<SlotKey, Cell>,
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn get(&self, key: &SlotKey) -> Option<&Cell> {
        self.cells.get(key)
    }

    /// Occupied cells in day order, then time order
    pub fn entries(&self) -> impl Iterator<Item = (&SlotKey, &Cell)> {
        self.cells.iter()
    }

    /// Looks up a cell, following a continuation to its primary
    pub fn occupant(&self, key: &SlotKey) -> Option<Occupant<'_>> {
        match self.cells.get(key)? {
            Cell::Primary { activity } => Some(Occupant {
                activity,
                primary: *key,
                is_continuation: false,
            }),
            Cell::Continuation { of } => {
                let primary = SlotKey::new(key.day, *of);
                match self.cells.get(&primary)? {
                    Cell::Primary { activity } => Some(Occupant {
                        activity,
                        primary,
                        is_continuation: true,
                    }),
                    Cell::Continuation { .. } => None,
                }
            }
        }
    }

    /// Every occupied cell resolved to its activity, continuations included
    pub fn occupants(&self) -> impl Iterator<Item = (SlotKey, Occupant<'_>)> {
        self.cells
            .keys()
            .filter_map(|key| self.occupant(key).map(|occupant| (*key, occupant)))
    }

    /// A cell is free for a lab's second half when it holds nothing with a
    /// subject or teacher, or when it already continues `owner`
    pub(crate) fn is_vacant_for(&self, key: &SlotKey, owner: &SlotKey) -> bool {
        match self.cells.get(key) {
            None => true,
            Some(Cell::Primary { activity }) => !activity.has_subject_or_teacher(),
            Some(Cell::Continuation { of }) => key.day == owner.day && of == &owner.time_slot,
        }
    }

    /// Removes the cell at `key` together with the other half of its pair.
    /// Returns every key that was cleared.
    pub fn clear(&mut self, key: &SlotKey) -> Vec<SlotKey> {
        let Some(cell) = self.cells.remove(key) else {
            return Vec::new();
        };

        let mut cleared = vec![*key];
        match cell {
            Cell::Primary { .. } => {
                let linked: Vec<SlotKey> = self
                    .cells
                    .iter()
                    .filter(|(k, c)| {
                        k.day == key.day
                            && matches!(c, Cell::Continuation { of } if of == &key.time_slot)
                    })
                    .map(|(k, _)| *k)
                    .collect();

                for k in linked {
                    self.cells.remove(&k);
                    cleared.push(k);
                }
            }
            Cell::Continuation { of } => {
                let primary = SlotKey::new(key.day, of);
                if self.cells.remove(&primary).is_some() {
                    cleared.insert(0, primary);
                }
            }
        }

        cleared
    }

    pub(crate) fn put_primary(&mut self, key: SlotKey, activity: Activity) {
        self.cells.insert(key, Cell::Primary { activity });
    }

    pub(crate) fn put_continuation(&mut self, key: SlotKey, of: TimeSlot) {
        self.cells.insert(key, Cell::Continuation { of });
    }

    /// Writes a batch of raw entries, last write wins per key
    pub fn upsert(&mut self, entries: impl IntoIterator<Item = GridEntry>) {
        for entry in entries {
            self.cells
                .insert(SlotKey::new(entry.day, entry.time_slot), entry.cell);
        }
    }

    /// Checks that every cell lies on the catalog, every academic activity
    /// is complete, and every two-slot activity is linked to its second half
    pub fn validate(&self, catalog: &SlotCatalog) -> Result<(), GridError> {
        for (key, cell) in &self.cells {
            if !catalog.contains(&key.time_slot) {
                return Err(GridError::UnknownSlot(*key));
            }

            match cell {
                Cell::Primary { activity } => {
                    activity
                        .validate()
                        .map_err(|message| GridError::InvalidActivity { key: *key, message })?;

                    if activity.span() > 1 {
                        let linked = catalog
                            .next_slot(key.day, &key.time_slot)
                            .filter(|next| {
                                matches!(
                                    self.cells.get(next),
                                    Some(Cell::Continuation { of }) if of == &key.time_slot
                                )
                            });
                        if linked.is_none() {
                            return Err(GridError::MissingContinuation(*key));
                        }
                    }
                }
                Cell::Continuation { of } => {
                    let follows = catalog
                        .next_slot(key.day, of)
                        .is_some_and(|next| &next == key);
                    let owner_spans = matches!(
                        self.cells.get(&SlotKey::new(key.day, *of)),
                        Some(Cell::Primary { activity }) if activity.span() > 1
                    );
                    if !follows || !owner_spans {
                        return Err(GridError::DanglingContinuation(*key));
                    }
                }
            }
        }

        Ok(())
    }

    /// Applies a batch of slot renames produced by a catalog resize. Every
    /// rename is resolved against the original keys, so a shifted slot never
    /// collides with one that has not moved yet.
    pub fn rename_slots(&mut self, renames: &[(TimeSlot, TimeSlot)]) {
        let mut remaining = std::mem::take(&mut self.cells);

        for (old, new) in renames {
            for day in Day::order() {
                if let Some(cell) = remaining.remove(&SlotKey::new(day, *old)) {
                    self.cells.insert(SlotKey::new(day, *new), cell);
                }
            }
        }
        self.cells.append(&mut remaining);

        for cell in self.cells.values_mut() {
            if let Cell::Continuation { of } = cell
                && let Some((_, new)) = renames.iter().find(|(old, _)| old == of)
            {
                *of = *new;
            }
        }
    }

    /// Clears every pair touching `slot` on any day
    pub fn drop_slot(&mut self, slot: &TimeSlot) -> Vec<SlotKey> {
        Day::order()
            .into_iter()
            .flat_map(|day| self.clear(&SlotKey::new(day, *slot)))
            .collect()
    }
}

impl From<Vec<GridEntry>> for Grid {
    fn from(entries: Vec<GridEntry>) -> Self {
        let mut grid = Grid::new();
        grid.upsert(entries);
        grid
    }
}

impl From<Grid> for Vec<GridEntry> {
    fn from(grid: Grid) -> Self {
        grid.cells
            .into_iter()
            .map(|(key, cell)| GridEntry {
                day: key.day,
                time_slot: key.time_slot,
                cell,
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::activity::{Session, Subject, TeacherRef};

    fn slot(label: &str) -> TimeSlot {
        label.parse().unwrap()
    }

    fn lab() -> Activity {
        Activity::Lab(Session {
            subject: Subject {
                acronym: Some("CNL".into()),
                ..Default::default()
            },
            teacher: TeacherRef {
                name: "R. Iyer".into(),
                ..Default::default()
            },
            room: Some("Lab 3".into()),
        })
    }

    fn lab_grid() -> (Grid, SlotKey, SlotKey) {
        let first = SlotKey::new(Day::Tuesday, slot("08:50-09:50"));
        let second = SlotKey::new(Day::Tuesday, slot("09:50-10:50"));
        let mut grid = Grid::new();
        grid.put_primary(first, lab());
        grid.put_continuation(second, first.time_slot);
        (grid, first, second)
    }

    #[test]
    fn test_occupant_follows_continuation() {
        let (grid, first, second) = lab_grid();

        let head = grid.occupant(&first).unwrap();
        assert!(!head.is_continuation);

        let tail = grid.occupant(&second).unwrap();
        assert!(tail.is_continuation);
        assert_eq!(tail.primary, first);
        assert_eq!(tail.activity, head.activity);
        assert_eq!(grid.occupants().count(), 2);
    }

    #[test]
    fn test_clear_removes_both_halves() {
        let (mut grid, first, second) = lab_grid();
        assert_eq!(grid.clear(&first), vec![first, second]);
        assert!(grid.is_empty());

        let (mut grid, first, second) = lab_grid();
        assert_eq!(grid.clear(&second), vec![first, second]);
        assert!(grid.is_empty());
    }

    #[test]
    fn test_validate_detects_broken_pairs() {
        let catalog = SlotCatalog::standard();
        let (grid, first, second) = lab_grid();
        assert!(grid.validate(&catalog).is_ok());

        let mut orphan = grid.clone();
        orphan.cells.remove(&first);
        assert_eq!(
            orphan.validate(&catalog),
            Err(GridError::DanglingContinuation(second))
        );

        let mut headless = grid.clone();
        headless.cells.remove(&second);
        assert_eq!(
            headless.validate(&catalog),
            Err(GridError::MissingContinuation(first))
        );

        let mut off_catalog = Grid::new();
        let key = SlotKey::new(Day::Monday, slot("07:00-08:00"));
        off_catalog.put_primary(key, Activity::Lunch);
        assert_eq!(
            off_catalog.validate(&catalog),
            Err(GridError::UnknownSlot(key))
        );
    }

    #[test]
    fn test_rename_slots_keeps_links() {
        let (mut grid, _, _) = lab_grid();
        grid.rename_slots(&[
            (slot("08:50-09:50"), slot("08:50-10:00")),
            (slot("09:50-10:50"), slot("10:00-11:00")),
        ]);

        let head = SlotKey::new(Day::Tuesday, slot("08:50-10:00"));
        let tail = SlotKey::new(Day::Tuesday, slot("10:00-11:00"));
        assert_eq!(grid.occupant(&tail).unwrap().primary, head);
        assert_eq!(grid.len(), 2);
    }

    #[test]
    fn test_grid_serde_is_entry_list() {
        let (grid, _, _) = lab_grid();
        let json = serde_json::to_value(&grid).unwrap();
        let entries = json.as_array().unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["day"], "Tuesday");
        assert_eq!(entries[0]["timeSlot"], "08:50-09:50");
        assert_eq!(entries[0]["cell"]["role"], "primary");
        assert_eq!(entries[0]["cell"]["activity"]["kind"], "lab");
        assert_eq!(entries[1]["cell"]["role"], "continuation");
        assert_eq!(entries[1]["cell"]["of"], "08:50-09:50");

        let back: Grid = serde_json::from_value(json).unwrap();
        assert_eq!(back, grid);
    }
}

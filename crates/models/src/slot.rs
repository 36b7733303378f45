use crate::days::Day;
use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};
use thiserror::Error;

/// Clock format used for slot labels, e.g. `09:00`
const CLOCK_FORMAT: &str = "%H:%M";

/// Errors produced while parsing or editing time slots
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("invalid time slot label `{0}`, expected HH:MM-HH:MM")]
    InvalidLabel(String),
    #[error("time slot must end after it starts: `{0}`")]
    EmptyInterval(String),
    #[error("a timetable needs at least one time slot")]
    Empty,
    #[error("time slot {0} overlaps {1}")]
    Overlap(TimeSlot, TimeSlot),
    #[error("time slot {0} is not part of this timetable")]
    UnknownSlot(TimeSlot),
    #[error("resizing {0} would push the day past midnight")]
    OutOfDay(TimeSlot),
}

/// A half-open clock interval `[start, end)` labelled as `HH:MM-HH:MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeSlot {
    start: NaiveTime,
    end: NaiveTime,
}

impl TimeSlot {
    /// Creates a new `TimeSlot` if `start` is before `end`
    pub fn new(start: NaiveTime, end: NaiveTime) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    /// Convenience constructor from hour/minute pairs
    pub fn from_hm(start: (u32, u32), end: (u32, u32)) -> Option<Self> {
        let start = NaiveTime::from_hms_opt(start.0, start.1, 0)?;
        let end = NaiveTime::from_hms_opt(end.0, end.1, 0)?;
        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// True if the two intervals share any instant
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Moves both ends by `delta`, failing if either end wraps past midnight
    fn shifted(&self, delta: Duration) -> Option<Self> {
        let (start, start_wrap) = self.start.overflowing_add_signed(delta);
        let (end, end_wrap) = self.end.overflowing_add_signed(delta);
        if start_wrap != 0 || end_wrap != 0 {
            return None;
        }
        Self::new(start, end)
    }
}

impl FromStr for TimeSlot {
    type Err = CatalogError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        let invalid = || CatalogError::InvalidLabel(label.to_string());

        let (start, end) = label.split_once('-').ok_or_else(invalid)?;
        let start = NaiveTime::parse_from_str(start.trim(), CLOCK_FORMAT).map_err(|_| invalid())?;
        let end = NaiveTime::parse_from_str(end.trim(), CLOCK_FORMAT).map_err(|_| invalid())?;

        Self::new(start, end).ok_or_else(|| CatalogError::EmptyInterval(label.to_string()))
    }
}

impl Display for TimeSlot {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "{}-{}",
            self.start.format(CLOCK_FORMAT),
            self.end.format(CLOCK_FORMAT)
        )
    }
}

impl Serialize for TimeSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeSlot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}

/// Addresses one cell of a timetable grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotKey {
    pub day: Day,
    pub time_slot: TimeSlot,
}

impl SlotKey {
    pub fn new(day: Day, time_slot: TimeSlot) -> Self {
        Self { day, time_slot }
    }
}

impl Display for SlotKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} {}", self.day, self.time_slot)
    }
}

/// The ordered list of time slots a timetable lays its days out on.
///
/// Every timetable owns its own catalog. Slots are kept sorted and never
/// overlap, so declaration order and temporal order agree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TimeSlot>", into = "Vec<TimeSlot>")]
pub struct SlotCatalog {
    slots: Vec<TimeSlot>,
}

impl SlotCatalog {
    /// Start of the first period in the standard institute day
    const DAY_START: (u32, u32) = (8, 50);
    const PERIOD_MINUTES: i64 = 60;
    const LUNCH_MINUTES: i64 = 40;
    /// Number of teaching periods before lunch
    const MORNING_PERIODS: usize = 4;
    const AFTERNOON_PERIODS: usize = 3;

    /// Validates and wraps an ordered slot list
    pub fn new(slots: Vec<TimeSlot>) -> Result<Self, CatalogError> {
        if slots.is_empty() {
            return Err(CatalogError::Empty);
        }

        for pair in slots.windows(2) {
            if let [earlier, later] = pair
                && later.start < earlier.end
            {
                return Err(CatalogError::Overlap(*earlier, *later));
            }
        }

        Ok(Self { slots })
    }

    /// The default institute day: eight slots from 08:50 with lunch after the
    /// fourth period
    pub fn standard() -> Self {
        let mut slots = Vec::with_capacity(Self::MORNING_PERIODS + Self::AFTERNOON_PERIODS + 1);
        let mut cursor = NaiveTime::from_hms_opt(Self::DAY_START.0, Self::DAY_START.1, 0)
            .unwrap_or_default();

        let mut push = |minutes: i64, cursor: &mut NaiveTime| {
            let end = *cursor + Duration::minutes(minutes);
            if let Some(slot) = TimeSlot::new(*cursor, end) {
                slots.push(slot);
            }
            *cursor = end;
        };

        for _ in 0..Self::MORNING_PERIODS {
            push(Self::PERIOD_MINUTES, &mut cursor);
        }
        push(Self::LUNCH_MINUTES, &mut cursor);
        for _ in 0..Self::AFTERNOON_PERIODS {
            push(Self::PERIOD_MINUTES, &mut cursor);
        }

        Self { slots }
    }

    /// The lunch slot of [`SlotCatalog::standard`]
    pub fn standard_lunch() -> TimeSlot {
        Self::standard().slots[Self::MORNING_PERIODS]
    }

    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, slot: &TimeSlot) -> bool {
        self.position(slot).is_some()
    }

    pub fn position(&self, slot: &TimeSlot) -> Option<usize> {
        self.slots.iter().position(|s| s == slot)
    }

    /// Returns the slot immediately after `slot` on the same day, or `None`
    /// if `slot` is last or not part of this catalog
    pub fn next_slot(&self, day: Day, slot: &TimeSlot) -> Option<SlotKey> {
        let index = self.position(slot)?;
        self.slots
            .get(index + 1)
            .map(|next| SlotKey::new(day, *next))
    }

    /// Every cell address of the grid, days in order then slots in order
    pub fn keys(&self) -> impl Iterator<Item = SlotKey> + '_ {
        Day::order()
            .into_iter()
            .flat_map(move |day| self.slots.iter().map(move |slot| SlotKey::new(day, *slot)))
    }

    /// Inserts a new slot in temporal position
    pub fn add_slot(&mut self, slot: TimeSlot) -> Result<(), CatalogError> {
        if let Some(existing) = self.slots.iter().find(|s| s.overlaps(&slot)) {
            return Err(CatalogError::Overlap(*existing, slot));
        }

        let index = self.slots.partition_point(|s| s.start < slot.start);
        self.slots.insert(index, slot);
        Ok(())
    }

    pub fn remove_slot(&mut self, slot: &TimeSlot) -> Result<(), CatalogError> {
        let index = self
            .position(slot)
            .ok_or(CatalogError::UnknownSlot(*slot))?;

        if self.slots.len() == 1 {
            return Err(CatalogError::Empty);
        }

        self.slots.remove(index);
        Ok(())
    }

    /// Changes the end of `slot` and shifts every later slot by the same
    /// amount. Returns the `(old, new)` pairs of every slot that moved, in
    /// catalog order.
    pub fn resize_slot(
        &mut self,
        slot: &TimeSlot,
        new_end: NaiveTime,
    ) -> Result<Vec<(TimeSlot, TimeSlot)>, CatalogError> {
        let index = self
            .position(slot)
            .ok_or(CatalogError::UnknownSlot(*slot))?;

        let resized = TimeSlot::new(slot.start, new_end)
            .ok_or_else(|| CatalogError::EmptyInterval(format!("{}-{}", slot.start, new_end)))?;
        let delta = new_end - slot.end;

        let mut moved = vec![(*slot, resized)];
        for later in &self.slots[index + 1..] {
            let shifted = later.shifted(delta).ok_or(CatalogError::OutOfDay(*later))?;
            moved.push((*later, shifted));
        }

        for (offset, (_, new)) in moved.iter().enumerate() {
            self.slots[index + offset] = *new;
        }

        Ok(moved.into_iter().filter(|(old, new)| old != new).collect())
    }
}

impl Default for SlotCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<Vec<TimeSlot>> for SlotCatalog {
    type Error = CatalogError;

    fn try_from(slots: Vec<TimeSlot>) -> Result<Self, Self::Error> {
        Self::new(slots)
    }
}

impl From<SlotCatalog> for Vec<TimeSlot> {
    fn from(catalog: SlotCatalog) -> Self {
        catalog.slots
    }
}

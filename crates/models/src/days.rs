use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

/// A teaching day on the timetable grid
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Day {
    #[serde(alias = "Mon", alias = "monday")]
    #[strum(to_string = "Monday", serialize = "Mon")]
    Monday,
    #[serde(alias = "Tue", alias = "tuesday")]
    #[strum(to_string = "Tuesday", serialize = "Tue")]
    Tuesday,
    #[serde(alias = "Wed", alias = "wednesday")]
    #[strum(to_string = "Wednesday", serialize = "Wed")]
    Wednesday,
    #[serde(alias = "Thu", alias = "thursday")]
    #[strum(to_string = "Thursday", serialize = "Thu")]
    Thursday,
    #[serde(alias = "Fri", alias = "friday")]
    #[strum(to_string = "Friday", serialize = "Fri")]
    Friday,
    #[serde(alias = "Sat", alias = "saturday")]
    #[strum(to_string = "Saturday", serialize = "Sat")]
    Saturday,
}

impl Day {
    /// The fixed display and sort order of the grid, Monday first
    pub fn order() -> Vec<Day> {
        Day::iter().collect()
    }

    /// Zero-based position of the day within [`Day::order`]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &str {
        self.as_ref()
    }
}

#[cfg(test)]
mod test {
    use crate::days::Day;
    use std::str::FromStr;

    #[test]
    fn test_day_order() {
        let order = Day::order();
        assert_eq!(order.len(), 6);
        assert_eq!(order.first(), Some(&Day::Monday));
        assert_eq!(order.last(), Some(&Day::Saturday));
        assert!(Day::Monday < Day::Tuesday);
        assert_eq!(Day::Thursday.index(), 3);
    }

    #[test]
    fn test_day_from_str() {
        assert_eq!(Day::from_str("Monday").unwrap(), Day::Monday);
        assert_eq!(Day::from_str("wed").unwrap(), Day::Wednesday);
        assert_eq!(Day::from_str("SATURDAY").unwrap(), Day::Saturday);
        assert!(Day::from_str("Sunday").is_err());
    }

    #[test]
    fn test_day_serde() {
        assert_eq!(serde_json::to_string(&Day::Friday).unwrap(), "\"Friday\"");
        let day: Day = serde_json::from_str("\"Tue\"").unwrap();
        assert_eq!(day, Day::Tuesday);
        assert_eq!(Day::Tuesday.to_string(), "Tuesday");
    }
}

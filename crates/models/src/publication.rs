use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Lifecycle of a timetable as seen by its readers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PublicationState {
    /// Never published
    Draft,
    Published,
    /// Published once, then withdrawn. Reads like a draft.
    Unpublished,
}

impl PublicationState {
    pub fn from_flags(is_published: bool, last_published_at: Option<NaiveDateTime>) -> Self {
        match (is_published, last_published_at) {
            (true, _) => Self::Published,
            (false, Some(_)) => Self::Unpublished,
            (false, None) => Self::Draft,
        }
    }

    pub fn is_visible_to(self, role: Role) -> bool {
        match role {
            Role::Coordinator => true,
            Role::Teacher | Role::Student => self == Self::Published,
        }
    }
}

/// Who is asking, as established by the upstream identity layer
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    Coordinator,
    Teacher,
    #[default]
    Student,
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::Utc;
    use std::str::FromStr;

    #[test]
    fn test_state_from_flags() {
        let now = Utc::now().naive_utc();
        assert_eq!(
            PublicationState::from_flags(false, None),
            PublicationState::Draft
        );
        assert_eq!(
            PublicationState::from_flags(true, Some(now)),
            PublicationState::Published
        );
        assert_eq!(
            PublicationState::from_flags(false, Some(now)),
            PublicationState::Unpublished
        );
    }

    #[test]
    fn test_visibility() {
        assert!(PublicationState::Draft.is_visible_to(Role::Coordinator));
        assert!(!PublicationState::Draft.is_visible_to(Role::Teacher));
        assert!(!PublicationState::Unpublished.is_visible_to(Role::Student));
        assert!(PublicationState::Published.is_visible_to(Role::Student));
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!(Role::from_str("Coordinator").unwrap(), Role::Coordinator);
        assert_eq!(Role::from_str("teacher").unwrap(), Role::Teacher);
        assert!(Role::from_str("admin").is_err());
        assert_eq!(Role::default(), Role::Student);
    }
}

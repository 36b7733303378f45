use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// The natural key of a timetable: one per class section and academic year
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassIdentity {
    /// e.g. `2nd Year`
    pub year: String,
    /// e.g. `cse`
    pub branch: String,
    pub section: String,
    /// e.g. `2025-26`
    pub academic_year: String,
}

impl ClassIdentity {
    pub fn new(
        year: impl Into<String>,
        branch: impl Into<String>,
        section: impl Into<String>,
        academic_year: impl Into<String>,
    ) -> Self {
        Self {
            year: year.into(),
            branch: branch.into(),
            section: section.into(),
            academic_year: academic_year.into(),
        }
    }

    /// Trims every field and lowercases the branch, so `CSE ` and `cse`
    /// address the same class
    pub fn normalized(self) -> Self {
        Self {
            year: self.year.trim().to_string(),
            branch: self.branch.trim().to_lowercase(),
            section: self.section.trim().to_uppercase(),
            academic_year: self.academic_year.trim().to_string(),
        }
    }

    /// Names of the fields a timetable must have before it can be published
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("year", &self.year),
            ("branch", &self.branch),
            ("section", &self.section),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// Short human label, e.g. `2nd Year CSE A`
    pub fn label(&self) -> String {
        format!(
            "{} {} {}",
            self.year,
            self.branch.to_uppercase(),
            self.section
        )
    }
}

impl Display for ClassIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} ({})", self.label(), self.academic_year)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_normalized_and_label() {
        let identity = ClassIdentity::new(" 1st Year", "CSE ", "a", "2025-26").normalized();
        assert_eq!(identity.branch, "cse");
        assert_eq!(identity.section, "A");
        assert_eq!(identity.label(), "1st Year CSE A");
        assert_eq!(identity.to_string(), "1st Year CSE A (2025-26)");
    }

    #[test]
    fn test_missing_fields() {
        let identity = ClassIdentity::new("", "it", " ", "2025-26");
        assert_eq!(identity.missing_fields(), vec!["year", "section"]);
        assert!(ClassIdentity::new("2nd Year", "it", "B", "").missing_fields().is_empty());
    }
}

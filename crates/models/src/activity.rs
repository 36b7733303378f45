use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

/// Subject details shown in a cell. Every field is optional free text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acronym: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Subject {
    /// True if any of the identifying fields carries text
    pub fn is_present(&self) -> bool {
        [&self.acronym, &self.code, &self.name]
            .into_iter()
            .flatten()
            .any(|s| !s.trim().is_empty())
    }

    /// Short label used in listings: acronym, then code, then name
    pub fn label(&self) -> &str {
        [&self.acronym, &self.code, &self.name]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|s| !s.trim().is_empty())
            .unwrap_or_default()
    }
}

/// Weak reference to a teacher. `id` may point at a teacher that has since
/// been deactivated or removed; that is never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl TeacherRef {
    pub fn is_present(&self) -> bool {
        self.id.is_some() || !self.name.trim().is_empty()
    }
}

/// One taught session: a subject, its teacher and an optional room
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub subject: Subject,
    #[serde(default)]
    pub teacher: TeacherRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
}

/// One batch of a split lab, e.g. `B1`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParallelSession {
    #[serde(default)]
    pub batch: String,
    #[serde(default)]
    pub subject: Subject,
    #[serde(default)]
    pub teacher: TeacherRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
}

/// Discriminant of [`Activity`], used for display and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum ActivityKind {
    Lecture,
    Lab,
    SplitLab,
    Lunch,
    Break,
    Library,
    MiniProject,
    Mentor,
}

/// What occupies a cell of the timetable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Activity {
    Lecture(Session),
    /// Two contiguous slots, one teacher
    Lab(Session),
    /// Two contiguous slots, two batches taught in parallel
    SplitLab {
        #[serde(rename = "parallelSessions")]
        parallel_sessions: [ParallelSession; 2],
    },
    Lunch,
    Break,
    Library,
    MiniProject,
    Mentor,
}

impl Activity {
    pub fn kind(&self) -> ActivityKind {
        match self {
            Self::Lecture(_) => ActivityKind::Lecture,
            Self::Lab(_) => ActivityKind::Lab,
            Self::SplitLab { .. } => ActivityKind::SplitLab,
            Self::Lunch => ActivityKind::Lunch,
            Self::Break => ActivityKind::Break,
            Self::Library => ActivityKind::Library,
            Self::MiniProject => ActivityKind::MiniProject,
            Self::Mentor => ActivityKind::Mentor,
        }
    }

    /// Number of contiguous slots the activity occupies
    pub fn span(&self) -> usize {
        match self {
            Self::Lab(_) | Self::SplitLab { .. } => 2,
            _ => 1,
        }
    }

    /// Lectures and labs carry subjects and teachers; the rest are markers
    pub fn is_academic(&self) -> bool {
        matches!(
            self,
            Self::Lecture(_) | Self::Lab(_) | Self::SplitLab { .. }
        )
    }

    /// Every teacher the activity books, one per batch for split labs
    pub fn teachers(&self) -> Vec<&TeacherRef> {
        match self {
            Self::Lecture(session) | Self::Lab(session) => vec![&session.teacher],
            Self::SplitLab { parallel_sessions } => {
                parallel_sessions.iter().map(|s| &s.teacher).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Batch labels lined up with [`Activity::teachers`]
    pub fn batches(&self) -> Vec<Option<String>> {
        match self {
            Self::SplitLab { parallel_sessions } => parallel_sessions
                .iter()
                .map(|s| Some(s.batch.clone()))
                .collect(),
            _ => self.teachers().iter().map(|_| None).collect(),
        }
    }

    /// Subject of the session taught by `teacher_id`, if any
    pub fn subject_of(&self, teacher_id: Uuid) -> Option<&Subject> {
        match self {
            Self::Lecture(session) | Self::Lab(session) => {
                (session.teacher.id == Some(teacher_id)).then_some(&session.subject)
            }
            Self::SplitLab { parallel_sessions } => parallel_sessions
                .iter()
                .find(|s| s.teacher.id == Some(teacher_id))
                .map(|s| &s.subject),
            _ => None,
        }
    }

    /// True if any session names a subject or a teacher
    pub fn has_subject_or_teacher(&self) -> bool {
        match self {
            Self::Lecture(session) | Self::Lab(session) => {
                session.subject.is_present() || session.teacher.is_present()
            }
            Self::SplitLab { parallel_sessions } => parallel_sessions
                .iter()
                .any(|s| s.subject.is_present() || s.teacher.is_present()),
            _ => false,
        }
    }

    /// Checks the fields an academic activity must carry
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::Lecture(session) | Self::Lab(session) => {
                if !session.subject.is_present() {
                    return Err(format!("a {} needs a subject", self.kind()));
                }
                if !session.teacher.is_present() {
                    return Err(format!("a {} needs a teacher", self.kind()));
                }
                Ok(())
            }
            Self::SplitLab { parallel_sessions } => {
                for session in parallel_sessions {
                    if session.batch.trim().is_empty() {
                        return Err("every split-lab batch needs a label".to_string());
                    }
                    if !session.subject.is_present() {
                        return Err(format!("batch {} needs a subject", session.batch));
                    }
                    if !session.teacher.is_present() {
                        return Err(format!("batch {} needs a teacher", session.batch));
                    }
                }

                let [first, second] = parallel_sessions;
                if first.batch.trim().eq_ignore_ascii_case(second.batch.trim()) {
                    return Err(format!(
                        "split-lab batches must be distinct, got {} twice",
                        first.batch
                    ));
                }
                if same_teacher(&first.teacher, &second.teacher) {
                    return Err("split-lab batches must have different teachers".to_string());
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

fn same_teacher(a: &TeacherRef, b: &TeacherRef) -> bool {
    match (a.id, b.id) {
        (Some(a), Some(b)) => a == b,
        (None, None) => a.name.trim().eq_ignore_ascii_case(b.name.trim()),
        _ => false,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn session(subject: &str, teacher: Uuid) -> Session {
        Session {
            subject: Subject {
                acronym: Some(subject.to_string()),
                ..Default::default()
            },
            teacher: TeacherRef {
                id: Some(teacher),
                name: format!("teacher {subject}"),
                username: None,
            },
            room: None,
        }
    }

    fn batch(label: &str, teacher: Uuid) -> ParallelSession {
        let Session { subject, teacher, room } = session("DSL", teacher);
        ParallelSession {
            batch: label.to_string(),
            subject,
            teacher,
            room,
        }
    }

    #[test]
    fn test_activity_json_shape() {
        let json = r#"{
            "kind": "split-lab",
            "parallelSessions": [
                {"batch": "B1", "subject": {"acronym": "DSL"}, "teacher": {"name": "A"}},
                {"batch": "B2", "subject": {"acronym": "OSL"}, "teacher": {"name": "B"}}
            ]
        }"#;
        let activity: Activity = serde_json::from_str(json).unwrap();
        assert_eq!(activity.kind(), ActivityKind::SplitLab);
        assert_eq!(activity.span(), 2);
        assert_eq!(activity.teachers().len(), 2);

        let lunch: Activity = serde_json::from_str(r#"{"kind": "lunch"}"#).unwrap();
        assert_eq!(lunch, Activity::Lunch);

        let project: Activity = serde_json::from_str(r#"{"kind": "mini-project"}"#).unwrap();
        assert_eq!(project.kind().to_string(), "mini-project");
    }

    #[test]
    fn test_lecture_requires_subject_and_teacher() {
        let mut lecture = session("DS", Uuid::new_v4());
        assert!(Activity::Lecture(lecture.clone()).validate().is_ok());

        lecture.subject = Subject::default();
        assert!(Activity::Lecture(lecture.clone()).validate().is_err());

        let no_teacher = Session {
            teacher: TeacherRef::default(),
            ..session("DS", Uuid::new_v4())
        };
        assert!(Activity::Lab(no_teacher).validate().is_err());
    }

    #[test]
    fn test_split_lab_batches_must_differ() {
        let t1 = Uuid::new_v4();
        let t2 = Uuid::new_v4();

        let ok = Activity::SplitLab {
            parallel_sessions: [batch("B1", t1), batch("B2", t2)],
        };
        assert!(ok.validate().is_ok());

        let same_batch = Activity::SplitLab {
            parallel_sessions: [batch("B1", t1), batch("b1", t2)],
        };
        assert!(same_batch.validate().is_err());

        let same_teacher = Activity::SplitLab {
            parallel_sessions: [batch("B1", t1), batch("B2", t1)],
        };
        assert!(same_teacher.validate().is_err());
    }

    #[test]
    fn test_markers_are_not_academic() {
        assert!(!Activity::Lunch.is_academic());
        assert!(!Activity::Library.has_subject_or_teacher());
        assert!(Activity::Mentor.validate().is_ok());
        assert!(Activity::Break.teachers().is_empty());
    }
}

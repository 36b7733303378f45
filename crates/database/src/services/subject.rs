use crate::{entities::subjects, error::ServiceError, services::timetable::now};
use log::info;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SubjectType {
    Theory,
    Lab,
}

#[derive(Debug, Clone)]
pub struct NewSubject {
    pub code: String,
    pub name: String,
    pub acronym: String,
    pub subject_type: SubjectType,
    pub department: Option<String>,
}

pub struct SubjectService;

impl SubjectService {
    pub async fn create(
        db: &DatabaseConnection,
        new: NewSubject,
    ) -> Result<subjects::Model, ServiceError> {
        let code = new.code.trim().to_uppercase();
        let name = new.name.trim();
        if code.is_empty() || name.is_empty() {
            return Err(ServiceError::Validation(
                "code and name are required".to_string(),
            ));
        }

        // Default the acronym to the initials of the name
        let acronym = match new.acronym.trim() {
            "" => name
                .split_whitespace()
                .filter_map(|word| word.chars().next())
                .collect::<String>()
                .to_uppercase(),
            given => given.to_string(),
        };

        let model = subjects::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(code),
            name: Set(name.to_string()),
            acronym: Set(acronym),
            subject_type: Set(new.subject_type.to_string()),
            department: Set(new
                .department
                .map(|d| d.trim().to_lowercase())
                .filter(|d| !d.is_empty())),
            created_at: Set(now()),
        }
        .insert(db)
        .await?;

        info!("Added subject {} ({})", model.code, model.id);
        Ok(model)
    }

    pub async fn list(
        db: &DatabaseConnection,
        subject_type: Option<SubjectType>,
        department: Option<String>,
    ) -> Result<Vec<subjects::Model>, ServiceError> {
        let mut condition = Condition::all();
        if let Some(subject_type) = subject_type {
            condition = condition.add(subjects::Column::SubjectType.eq(subject_type.to_string()));
        }
        if let Some(department) = department {
            condition =
                condition.add(subjects::Column::Department.eq(department.trim().to_lowercase()));
        }

        Ok(subjects::Entity::find()
            .filter(condition)
            .order_by_asc(subjects::Column::Code)
            .all(db)
            .await?)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testing::memory_db;
    use std::str::FromStr;

    fn new_subject(code: &str, name: &str, subject_type: SubjectType) -> NewSubject {
        NewSubject {
            code: code.to_string(),
            name: name.to_string(),
            acronym: String::new(),
            subject_type,
            department: Some("CSE".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_derives_acronym() {
        let db = memory_db().await;
        let subject = SubjectService::create(
            &db,
            new_subject("cs302", "Database Management Systems", SubjectType::Theory),
        )
        .await
        .unwrap();

        assert_eq!(subject.code, "CS302");
        assert_eq!(subject.acronym, "DMS");
        assert_eq!(subject.subject_type, "theory");
        assert_eq!(subject.department.as_deref(), Some("cse"));
    }

    #[tokio::test]
    async fn test_list_by_type() {
        let db = memory_db().await;
        SubjectService::create(&db, new_subject("CS302", "Databases", SubjectType::Theory))
            .await
            .unwrap();
        SubjectService::create(&db, new_subject("CS392", "Databases Lab", SubjectType::Lab))
            .await
            .unwrap();

        let labs = SubjectService::list(&db, Some(SubjectType::Lab), None)
            .await
            .unwrap();
        assert_eq!(labs.len(), 1);
        assert_eq!(labs[0].code, "CS392");

        let cse = SubjectService::list(&db, None, Some("cse".to_string()))
            .await
            .unwrap();
        assert_eq!(cse.len(), 2);
    }

    #[test]
    fn test_subject_type_from_str() {
        assert_eq!(SubjectType::from_str("LAB").unwrap(), SubjectType::Lab);
        assert!(SubjectType::from_str("seminar").is_err());
    }
}

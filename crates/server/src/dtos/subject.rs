use database::entities::subjects;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubjectResponse {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub acronym: String,
    #[serde(rename = "type")]
    pub subject_type: String,
    pub department: Option<String>,
}

impl From<subjects::Model> for SubjectResponse {
    fn from(model: subjects::Model) -> Self {
        Self {
            id: model.id,
            code: model.code,
            name: model.name,
            acronym: model.acronym,
            subject_type: model.subject_type,
            department: model.department,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubjectRequest {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub acronym: String,
    /// `theory` or `lab`
    #[serde(rename = "type")]
    pub subject_type: String,
    pub department: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SubjectQuery {
    /// `theory` or `lab`
    #[serde(rename = "type")]
    pub subject_type: Option<String>,
    pub department: Option<String>,
}

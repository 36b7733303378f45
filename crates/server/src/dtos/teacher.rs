use chrono::NaiveDateTime;
use database::entities::teachers;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeacherResponse {
    pub id: Uuid,
    pub display_name: String,
    pub username: Option<String>,
    pub department: String,
    pub is_active: bool,
    pub created_by: String,
    pub created_at: NaiveDateTime,
}

impl From<teachers::Model> for TeacherResponse {
    fn from(model: teachers::Model) -> Self {
        Self {
            id: model.id,
            display_name: model.display_name,
            username: model.username,
            department: model.department,
            is_active: model.is_active,
            created_by: model.created_by,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeacherRequest {
    pub display_name: String,
    pub username: Option<String>,
    pub department: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TeacherQuery {
    pub department: Option<String>,
}

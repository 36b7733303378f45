use crate::{
    dtos::teacher::{CreateTeacherRequest, TeacherQuery, TeacherResponse},
    error::{ApiError, ErrorResponse},
    extractors::{actor::Actor, json::AppJson},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use database::services::teacher::{NewTeacher, TeacherService};
use uuid::Uuid;

/// List active teachers by name
#[utoipa::path(
    get,
    path = "/teachers",
    params(TeacherQuery),
    responses(
        (status = 200, description = "Active teachers", body = Vec<TeacherResponse>)
    ),
    tag = "Teachers"
)]
pub async fn list_teachers(
    State(state): State<AppState>,
    Query(params): Query<TeacherQuery>,
) -> Result<Json<Vec<TeacherResponse>>, ApiError> {
    let teachers = TeacherService::list_active(&state.db, params.department).await?;
    Ok(Json(teachers.into_iter().map(Into::into).collect()))
}

/// Add a teacher to the directory
#[utoipa::path(
    post,
    path = "/teachers",
    request_body = CreateTeacherRequest,
    responses(
        (status = 201, description = "Teacher added", body = TeacherResponse),
        (status = 400, description = "Name or department missing", body = ErrorResponse),
        (status = 403, description = "Caller is not a coordinator", body = ErrorResponse)
    ),
    tag = "Teachers"
)]
pub async fn create_teacher(
    State(state): State<AppState>,
    actor: Actor,
    AppJson(request): AppJson<CreateTeacherRequest>,
) -> Result<(StatusCode, Json<TeacherResponse>), ApiError> {
    actor.require_coordinator()?;

    let new = NewTeacher {
        display_name: request.display_name,
        username: request.username,
        department: request.department,
    };
    let teacher = TeacherService::create(&state.db, new, &actor.id).await?;
    Ok((StatusCode::CREATED, Json(teacher.into())))
}

/// Retire a teacher. Only the coordinator who added them may do so.
#[utoipa::path(
    put,
    path = "/teachers/{id}/deactivate",
    params(("id" = Uuid, Path, description = "Teacher ID")),
    responses(
        (status = 200, description = "Teacher deactivated", body = TeacherResponse),
        (status = 403, description = "Caller did not add this teacher", body = ErrorResponse),
        (status = 404, description = "Teacher not found", body = ErrorResponse)
    ),
    tag = "Teachers"
)]
pub async fn deactivate_teacher(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<TeacherResponse>, ApiError> {
    let teacher = TeacherService::deactivate(&state.db, id, &actor.id).await?;
    Ok(Json(teacher.into()))
}

use crate::{
    dtos::subject::{CreateSubjectRequest, SubjectQuery, SubjectResponse},
    error::{ApiError, ErrorResponse},
    extractors::{actor::Actor, json::AppJson},
    state::AppState,
};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use database::{
    error::ServiceError,
    services::subject::{NewSubject, SubjectService, SubjectType},
};
use std::str::FromStr;

fn subject_type(value: &str) -> Result<SubjectType, ApiError> {
    SubjectType::from_str(value.trim())
        .map_err(|_| ServiceError::Validation(format!("unknown subject type: {value}")).into())
}

/// List subjects by code
#[utoipa::path(
    get,
    path = "/subjects",
    params(SubjectQuery),
    responses(
        (status = 200, description = "Subjects", body = Vec<SubjectResponse>),
        (status = 400, description = "Unknown subject type", body = ErrorResponse)
    ),
    tag = "Subjects"
)]
pub async fn list_subjects(
    State(state): State<AppState>,
    Query(params): Query<SubjectQuery>,
) -> Result<Json<Vec<SubjectResponse>>, ApiError> {
    let subject_type = params.subject_type.as_deref().map(subject_type).transpose()?;
    let subjects = SubjectService::list(&state.db, subject_type, params.department).await?;
    Ok(Json(subjects.into_iter().map(Into::into).collect()))
}

/// Add a subject to the catalog
#[utoipa::path(
    post,
    path = "/subjects",
    request_body = CreateSubjectRequest,
    responses(
        (status = 201, description = "Subject added", body = SubjectResponse),
        (status = 400, description = "Missing code or name, or unknown type", body = ErrorResponse),
        (status = 403, description = "Caller is not a coordinator", body = ErrorResponse)
    ),
    tag = "Subjects"
)]
pub async fn create_subject(
    State(state): State<AppState>,
    actor: Actor,
    AppJson(request): AppJson<CreateSubjectRequest>,
) -> Result<(StatusCode, Json<SubjectResponse>), ApiError> {
    actor.require_coordinator()?;

    let new = NewSubject {
        code: request.code,
        name: request.name,
        acronym: request.acronym,
        subject_type: subject_type(&request.subject_type)?,
        department: request.department,
    };
    let subject = SubjectService::create(&state.db, new).await?;
    Ok((StatusCode::CREATED, Json(subject.into())))
}

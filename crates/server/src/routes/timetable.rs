use crate::{
    dtos::{
        PaginationMeta,
        timetable::{
            AssignCellRequest, AssignCellResponse, CellQuery, ClashQuery, ClashResponse,
            ClassQuery, CreateTimetableRequest, PaginatedTimetablesResponse, PublishRequest,
            SlotEditRequest, TeacherSlotResponse, TimetableListQuery, TimetableResponse,
            UpdateTimetableRequest,
        },
    },
    error::{ApiError, ErrorResponse},
    extractors::{
        actor::{Actor, Viewer},
        json::AppJson,
    },
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use database::{
    error::ServiceError,
    services::{
        assignment::AssignmentService,
        availability::AvailabilityService,
        publication::PublicationService,
        timetable::{
            CatalogEdit, GridPatch, NewTimetable, TimetableFilter, TimetablePatch,
            TimetableService,
        },
    },
};
use models::{
    assignment::AssignOutcome,
    identity::ClassIdentity,
    publication::Role,
    slot::{SlotCatalog, SlotKey, TimeSlot},
};
use uuid::Uuid;

fn catalog_from(slots: Option<Vec<TimeSlot>>) -> Result<Option<SlotCatalog>, ApiError> {
    slots
        .map(SlotCatalog::new)
        .transpose()
        .map_err(|err| ServiceError::from(err).into())
}

/// Create a timetable for a class
#[utoipa::path(
    post,
    path = "/timetable",
    request_body = CreateTimetableRequest,
    responses(
        (status = 201, description = "Timetable created", body = TimetableResponse),
        (status = 400, description = "Invalid slots or grid", body = ErrorResponse),
        (status = 403, description = "Caller is not a coordinator", body = ErrorResponse),
        (status = 409, description = "Class already has a timetable, or the grid double-books a teacher", body = ErrorResponse)
    ),
    tag = "Timetables"
)]
pub async fn create_timetable(
    State(state): State<AppState>,
    actor: Actor,
    AppJson(request): AppJson<CreateTimetableRequest>,
) -> Result<(StatusCode, Json<TimetableResponse>), ApiError> {
    actor.require_coordinator()?;

    let new = NewTimetable {
        identity: ClassIdentity::new(
            request.year,
            request.branch,
            request.section,
            request.academic_year,
        ),
        catalog: catalog_from(request.slots)?,
        grid: request.grid,
    };
    let model = TimetableService::create(&state.db, new, &actor.id).await?;

    Ok((StatusCode::CREATED, Json(model.into())))
}

/// List timetables, newest first
#[utoipa::path(
    get,
    path = "/timetable",
    params(TimetableListQuery),
    responses(
        (status = 200, description = "Page of timetables", body = PaginatedTimetablesResponse),
        (status = 400, description = "Invalid query parameters")
    ),
    tag = "Timetables"
)]
pub async fn list_timetables(
    State(state): State<AppState>,
    Viewer(role): Viewer,
    Query(params): Query<TimetableListQuery>,
) -> Result<Json<PaginatedTimetablesResponse>, ApiError> {
    let is_published = match role {
        Role::Coordinator => params.is_published,
        Role::Teacher | Role::Student => Some(true),
    };
    let filter = TimetableFilter {
        year: params.year,
        branch: params.branch,
        section: params.section,
        academic_year: params.academic_year,
        is_published,
    };

    let per_page = params.per_page.clamp(1, TimetableService::MAX_PER_PAGE);
    let page = params.page.max(1);
    let (items, total_items) = TimetableService::list(&state.db, filter, page, per_page).await?;

    Ok(Json(PaginatedTimetablesResponse {
        timetables: items.into_iter().map(Into::into).collect(),
        pagination: PaginationMeta::new(page, per_page, total_items),
    }))
}

/// Get one timetable. Drafts are visible to coordinators only.
#[utoipa::path(
    get,
    path = "/timetable/{id}",
    params(("id" = Uuid, Path, description = "Timetable ID")),
    responses(
        (status = 200, description = "Timetable found", body = TimetableResponse),
        (status = 404, description = "Timetable not found or not visible", body = ErrorResponse)
    ),
    tag = "Timetables"
)]
pub async fn get_timetable(
    State(state): State<AppState>,
    Viewer(role): Viewer,
    Path(id): Path<Uuid>,
) -> Result<Json<TimetableResponse>, ApiError> {
    let model = PublicationService::get_visible(&state.db, id, role).await?;
    Ok(Json(model.into()))
}

/// Replace the grid, upsert cells, or swap the slot list
#[utoipa::path(
    put,
    path = "/timetable/{id}",
    params(("id" = Uuid, Path, description = "Timetable ID")),
    request_body = UpdateTimetableRequest,
    responses(
        (status = 200, description = "Timetable updated", body = TimetableResponse),
        (status = 400, description = "Invalid slots or grid", body = ErrorResponse),
        (status = 404, description = "Timetable not found", body = ErrorResponse),
        (status = 409, description = "The grid double-books a teacher", body = ErrorResponse)
    ),
    tag = "Timetables"
)]
pub async fn update_timetable(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    AppJson(request): AppJson<UpdateTimetableRequest>,
) -> Result<Json<TimetableResponse>, ApiError> {
    actor.require_coordinator()?;

    let grid = match (request.grid, request.cells) {
        (Some(_), Some(_)) => {
            return Err(
                ServiceError::Validation("send either grid or cells, not both".to_string()).into(),
            );
        }
        (Some(grid), None) => Some(GridPatch::Replace(grid)),
        (None, Some(cells)) => Some(GridPatch::Upsert(cells)),
        (None, None) => None,
    };
    let patch = TimetablePatch {
        catalog: catalog_from(request.slots)?,
        grid,
    };

    let model = TimetableService::update(&state.db, id, patch, &actor.id).await?;
    Ok(Json(model.into()))
}

/// Delete a timetable
#[utoipa::path(
    delete,
    path = "/timetable/{id}",
    params(("id" = Uuid, Path, description = "Timetable ID")),
    responses(
        (status = 204, description = "Timetable deleted"),
        (status = 404, description = "Timetable not found", body = ErrorResponse)
    ),
    tag = "Timetables"
)]
pub async fn delete_timetable(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    actor.require_coordinator()?;
    TimetableService::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Publish or unpublish a timetable
#[utoipa::path(
    put,
    path = "/timetable/{id}/publish",
    params(("id" = Uuid, Path, description = "Timetable ID")),
    request_body = PublishRequest,
    responses(
        (status = 200, description = "Publication state changed", body = TimetableResponse),
        (status = 400, description = "Class year, branch or section missing", body = ErrorResponse),
        (status = 404, description = "Timetable not found", body = ErrorResponse)
    ),
    tag = "Timetables"
)]
pub async fn publish_timetable(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    AppJson(request): AppJson<PublishRequest>,
) -> Result<Json<TimetableResponse>, ApiError> {
    actor.require_coordinator()?;

    let model = PublicationService::set_published(
        &state.db,
        id,
        request.is_published,
        &actor.id,
        state.notifier.as_ref(),
    )
    .await?;
    Ok(Json(model.into()))
}

/// Assign an activity to one cell
#[utoipa::path(
    put,
    path = "/timetable/{id}/cells",
    params(("id" = Uuid, Path, description = "Timetable ID")),
    request_body = AssignCellRequest,
    responses(
        (status = 200, description = "Cell assigned", body = AssignCellResponse),
        (status = 400, description = "Unknown slot or incomplete activity", body = ErrorResponse),
        (status = 404, description = "Timetable not found", body = ErrorResponse),
        (status = 409, description = "Teacher already assigned, or no free slot for the lab's second half", body = ErrorResponse)
    ),
    tag = "Timetables"
)]
pub async fn assign_cell(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    AppJson(request): AppJson<AssignCellRequest>,
) -> Result<Json<AssignCellResponse>, ApiError> {
    actor.require_coordinator()?;

    let key = SlotKey::new(request.day, request.time_slot);
    let (model, outcome) =
        AssignmentService::assign(&state.db, id, key, request.activity, &actor.id).await?;

    let (changed, cells) = match outcome {
        AssignOutcome::Unchanged => (false, Vec::new()),
        AssignOutcome::Written(cells) => (true, cells),
    };

    Ok(Json(AssignCellResponse {
        timetable: model.into(),
        changed,
        cells,
    }))
}

/// Clear one cell, along with the other half of a lab
#[utoipa::path(
    delete,
    path = "/timetable/{id}/cells",
    params(("id" = Uuid, Path, description = "Timetable ID"), CellQuery),
    responses(
        (status = 200, description = "Cell cleared", body = TimetableResponse),
        (status = 404, description = "Timetable not found", body = ErrorResponse)
    ),
    tag = "Timetables"
)]
pub async fn clear_cell(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Query(params): Query<CellQuery>,
) -> Result<Json<TimetableResponse>, ApiError> {
    actor.require_coordinator()?;

    let key = SlotKey::new(params.day, params.time_slot);
    let model = AssignmentService::unassign(&state.db, id, key, &actor.id).await?;
    Ok(Json(model.into()))
}

/// Add, remove or resize a slot of the day
#[utoipa::path(
    put,
    path = "/timetable/{id}/slots",
    params(("id" = Uuid, Path, description = "Timetable ID")),
    request_body = SlotEditRequest,
    responses(
        (status = 200, description = "Slots changed, cells moved along", body = TimetableResponse),
        (status = 400, description = "Overlapping or unknown slot", body = ErrorResponse),
        (status = 409, description = "Moved cells double-book a teacher", body = ErrorResponse)
    ),
    tag = "Timetables"
)]
pub async fn edit_slots(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    AppJson(request): AppJson<SlotEditRequest>,
) -> Result<Json<TimetableResponse>, ApiError> {
    actor.require_coordinator()?;

    let edit = match request {
        SlotEditRequest::Add { slot } => CatalogEdit::Add(slot),
        SlotEditRequest::Remove { slot } => CatalogEdit::Remove(slot),
        SlotEditRequest::Resize { slot, end } => CatalogEdit::Resize { slot, end },
    };
    let model = TimetableService::edit_catalog(&state.db, id, edit, &actor.id).await?;
    Ok(Json(model.into()))
}

/// The published timetable of a class section
#[utoipa::path(
    get,
    path = "/timetable/class/{branch}/{section}",
    params(
        ("branch" = String, Path, description = "Branch, e.g. cse"),
        ("section" = String, Path, description = "Section, e.g. A"),
        ClassQuery
    ),
    responses(
        (status = 200, description = "Published timetable", body = TimetableResponse),
        (status = 404, description = "No published timetable for this class", body = ErrorResponse)
    ),
    tag = "Timetables"
)]
pub async fn get_class_timetable(
    State(state): State<AppState>,
    Path((branch, section)): Path<(String, String)>,
    Query(params): Query<ClassQuery>,
) -> Result<Json<TimetableResponse>, ApiError> {
    let model = TimetableService::find_published(
        &state.db,
        &branch,
        &section,
        params.year.as_deref(),
        params.academic_year.as_deref(),
    )
    .await?;
    Ok(Json(model.into()))
}

/// Every published slot a teacher holds
#[utoipa::path(
    get,
    path = "/timetable/teacher/{id}",
    params(("id" = Uuid, Path, description = "Teacher ID")),
    responses(
        (status = 200, description = "Assignments in day and time order", body = Vec<TeacherSlotResponse>)
    ),
    tag = "Timetables"
)]
pub async fn get_teacher_timetable(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<TeacherSlotResponse>>, ApiError> {
    let assignments = TimetableService::find_by_teacher(&state.db, id, true).await?;
    Ok(Json(assignments.into_iter().map(Into::into).collect()))
}

/// Which teachers are already booked at a slot. Only coordinators see
/// bookings held by draft or unpublished timetables.
#[utoipa::path(
    get,
    path = "/timetable/clash",
    params(ClashQuery),
    responses(
        (status = 200, description = "Busy teachers with the classes they teach", body = ClashResponse),
        (status = 400, description = "Invalid day or slot")
    ),
    tag = "Timetables"
)]
pub async fn get_busy_teachers(
    State(state): State<AppState>,
    Viewer(role): Viewer,
    Query(params): Query<ClashQuery>,
) -> Result<Json<ClashResponse>, ApiError> {
    let include_drafts = match role {
        Role::Coordinator => params.include_drafts,
        Role::Teacher | Role::Student => false,
    };
    let key = SlotKey::new(params.day, params.slot_key);
    let busy =
        AvailabilityService::busy_teachers(&state.db, key, include_drafts, params.exclude).await?;

    Ok(Json(ClashResponse {
        busy_teachers: busy.busy_teachers.into_iter().collect(),
        clashes: busy.bookings,
    }))
}

pub mod health;
pub mod root;
pub mod subject;
pub mod teacher;
pub mod timetable;

use crate::state::AppState;
use axum::{
    Router,
    routing::{get, put},
};

/// Every timetable, teacher and subject endpoint
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route(
            "/timetable",
            get(timetable::list_timetables).post(timetable::create_timetable),
        )
        .route("/timetable/clash", get(timetable::get_busy_teachers))
        .route(
            "/timetable/class/{branch}/{section}",
            get(timetable::get_class_timetable),
        )
        .route("/timetable/teacher/{id}", get(timetable::get_teacher_timetable))
        .route(
            "/timetable/{id}",
            get(timetable::get_timetable)
                .put(timetable::update_timetable)
                .delete(timetable::delete_timetable),
        )
        .route("/timetable/{id}/publish", put(timetable::publish_timetable))
        .route(
            "/timetable/{id}/cells",
            put(timetable::assign_cell).delete(timetable::clear_cell),
        )
        .route("/timetable/{id}/slots", put(timetable::edit_slots))
        .route(
            "/teachers",
            get(teacher::list_teachers).post(teacher::create_teacher),
        )
        .route("/teachers/{id}/deactivate", put(teacher::deactivate_teacher))
        .route(
            "/subjects",
            get(subject::list_subjects).post(subject::create_subject),
        )
}

/// Unauthenticated probes
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/", get(root::root))
        .route("/health", get(health::health))
}

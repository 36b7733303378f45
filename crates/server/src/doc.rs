use crate::routes::{health, root, subject, teacher, timetable};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "jwt",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        components.add_security_scheme(
            "actor",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("x-actor-id"))),
        );
    }
}

/// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        root::root,
        health::health,
        timetable::create_timetable,
        timetable::list_timetables,
        timetable::get_timetable,
        timetable::update_timetable,
        timetable::delete_timetable,
        timetable::publish_timetable,
        timetable::assign_cell,
        timetable::clear_cell,
        timetable::edit_slots,
        timetable::get_class_timetable,
        timetable::get_teacher_timetable,
        timetable::get_busy_teachers,
        teacher::list_teachers,
        teacher::create_teacher,
        teacher::deactivate_teacher,
        subject::list_subjects,
        subject::create_subject
    ),
    modifiers(&SecurityAddon),
    security(("actor" = []), ("jwt" = [])),
    tags(
        (name = "Health", description = "Liveness endpoints"),
        (name = "Timetables", description = "Timetable editing, publication and lookups"),
        (name = "Teachers", description = "Teacher directory"),
        (name = "Subjects", description = "Subject catalog"),
    ),
    info(
        title = "Timetable API",
        version = "1.0.0",
        description = "College timetable scheduling with teacher double-booking checks",
        license(
            name = "MIT OR Apache-2.0",
        )
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_every_route_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/timetable",
            "/timetable/{id}",
            "/timetable/{id}/cells",
            "/timetable/class/{branch}/{section}",
            "/timetable/clash",
            "/teachers/{id}/deactivate",
            "/subjects",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path} is undocumented");
        }
    }
}

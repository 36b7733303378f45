/// Names the service
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service banner", content_type = "text/plain", body = String)
    ),
    tag = "Health"
)]
pub async fn root() -> &'static str {
    concat!("timetable-service ", env!("CARGO_PKG_VERSION"))
}

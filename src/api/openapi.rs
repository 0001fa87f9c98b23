//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{availability, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Lodging Bookings API",
        version = "1.0.0",
        description = "JSON endpoints of the lodging bookings website"
    ),
    paths(
        health::health_check,
        health::readiness_check,
        availability::availability_json,
    ),
    components(
        schemas(
            health::HealthResponse,
            availability::AvailabilityRequest,
            availability::AvailabilityResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "availability", description = "Room availability")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

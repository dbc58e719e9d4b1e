use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::metrics::metrics_middleware;
use crate::modules::permissions_admin::{init_me_router, init_permissions_admin_router};
use crate::modules::schedule::init_schedule_router;
use crate::state::AppState;
use axum::http::{HeaderName, HeaderValue, Method};
use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

pub fn init_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .nest(
            "/api",
            Router::new()
                .nest("/admin/permissions", init_permissions_admin_router())
                .nest("/me", init_me_router())
                .nest("/schedule", init_schedule_router()),
        )
        .with_state(state.clone())
        .layer({
            let allowed_origins: Vec<HeaderValue> = state
                .cors_config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            let identity_headers = [
                &state.identity_config.user_header,
                &state.identity_config.business_header,
            ]
            .into_iter()
            .filter_map(|name| HeaderName::from_bytes(name.as_bytes()).ok());

            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers(
                    [axum::http::header::CONTENT_TYPE, axum::http::header::ACCEPT]
                        .into_iter()
                        .chain(identity_headers)
                        .collect::<Vec<_>>(),
                )
                .allow_credentials(true)
        })
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
}

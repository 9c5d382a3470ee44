use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    create_mapping_handler, get_mapping_handler, health_handler, list_mappings_handler,
    redirect_handler,
};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route(
                "/v1/mappings",
                get(list_mappings_handler).post(create_mapping_handler),
            )
            .route("/v1/mappings/{key}", get(get_mapping_handler))
            .route("/{key}", get(redirect_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}

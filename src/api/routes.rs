//! API Routes

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    create_handler, delete_handler, get_handler, health_handler, list_handler, patch_handler,
    AppState,
};

/// Creates the router serving every registered collection.
///
/// `/health` is matched before the `/:collection` capture, so no collection
/// can be named `health`.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/:collection", get(list_handler).post(create_handler))
        .route(
            "/:collection/:id",
            get(get_handler)
                .patch(patch_handler)
                .delete(delete_handler),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

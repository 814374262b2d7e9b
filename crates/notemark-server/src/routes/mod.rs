pub mod health;
pub mod index;
pub mod notes;

use std::path::Path;
use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::middleware as axum_mw;
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;

use crate::middleware;
use crate::pipeline::MAX_UPLOAD_BYTES;
use crate::state::AppState;

/// Upper bound on the time spent producing any single response.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// All routes plus the middleware stack. Files under `static_dir` are served
/// at `/static`.
pub fn router(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/", get(index::index))
        .route("/health", get(health::health_check))
        .route(
            "/notes",
            post(notes::upload_note).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/notes/{id}",
            get(notes::get_note).delete(notes::delete_note),
        )
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(axum_mw::from_fn(middleware::audit::audit_log))
                .layer(CatchPanicLayer::new())
                .layer(request_timeout_layer(REQUEST_TIMEOUT)),
        )
        .with_state(state)
}

/// Requests still running after `limit` are answered with 408.
pub fn request_timeout_layer(limit: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, limit)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;

    #[tokio::test]
    async fn slow_handler_is_cut_off_with_408() {
        let app: Router = Router::new()
            .route(
                "/",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    "late"
                }),
            )
            .layer(request_timeout_layer(Duration::from_millis(50)));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    }
}

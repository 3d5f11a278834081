//! Web application router and middleware setup.

use crate::board::BoardDescription;
use crate::config::ViewerConfig;
use crate::monitor::PinRegistry;
use crate::web::handlers;
use crate::web::lifecycle::ConnectionLifecycle;
use crate::web::websocket;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// State shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Observer admission and resync
    pub lifecycle: ConnectionLifecycle,
    /// Monitored pins
    pub registry: Arc<PinRegistry>,
    /// Board layout used for labels
    pub board: Arc<BoardDescription>,
    /// Startup configuration
    pub config: Arc<ViewerConfig>,
}

/// Create the main axum application with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    let enable_cors = state.config.web.enable_cors;
    let ws_path = state.config.web.ws_path.clone();

    let mut app = Router::new()
        .route("/", get(handlers::index))
        .route("/api/health", get(handlers::health_check))
        .route("/api/pins", get(handlers::list_pins))
        .route(&ws_path, get(websocket::websocket_handler))
        .with_state(state);

    if enable_cors {
        app = app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    app.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::ResetHandle;
    use crate::web::broadcast::Broadcaster;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn state() -> AppState {
        let config = ViewerConfig::default().with_pins(vec![2, 4, 5]);
        AppState {
            lifecycle: ConnectionLifecycle::new(Broadcaster::default(), ResetHandle::new(), 4),
            registry: Arc::new(config.registry().unwrap()),
            board: Arc::new(config.board_description().unwrap()),
            config: Arc::new(config),
        }
    }

    #[tokio::test]
    async fn test_health_route() {
        let app = create_app(state());
        let response = app
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let app = create_app(state());
        let response = app
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_index_has_indicator_per_monitored_pin() {
        let html = handlers::render_index(&state());
        assert!(html.contains("id='gpio2'"));
        assert!(html.contains("id='gpio4'"));
        assert!(html.contains("id='gpio5'"));
        assert!(!html.contains("id='gpio17'"));
        assert!(html.contains("var serverPort = 8080;"));
    }
}

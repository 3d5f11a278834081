//! Web server, observer transport and broadcast for the GPIO viewer.
//!
//! This module wires the sampling loop to WebSocket observers: a forwarding
//! task publishes every message the loop produces, and each connected
//! observer receives it through its own session.

pub mod broadcast;
pub mod config;
pub mod handlers;
pub mod lifecycle;
pub mod router;
pub mod websocket;

// Re-export commonly used items
pub use broadcast::Broadcaster;
pub use config::WebConfig;
pub use lifecycle::{ConnectionLifecycle, ObserverSession};
pub use router::{create_app, AppState};

use crate::config::ViewerConfig;
use crate::error::{Result, ViewerError};
use crate::monitor::{PinMessage, PortReader, ResetHandle, SamplingLoop};
use futures_util::stream::BoxStream;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tracing::info;

/// A fully assembled viewer: sampling loop, broadcaster and router state.
pub struct Viewer<R> {
    sampler: SamplingLoop<R>,
    broadcaster: Broadcaster,
    state: AppState,
}

impl<R: PortReader + 'static> Viewer<R> {
    /// Validate `config` and assemble the viewer around `reader`.
    ///
    /// Nothing is started; an invalid configuration leaves nothing behind.
    pub fn new(config: ViewerConfig, reader: R) -> Result<Self> {
        config.validate()?;
        let registry = Arc::new(config.registry()?);
        let board = Arc::new(config.board_description()?);

        let reset = ResetHandle::new();
        let broadcaster = Broadcaster::default();
        let lifecycle =
            ConnectionLifecycle::new(broadcaster.clone(), reset.clone(), config.web.max_observers);
        let sampler = SamplingLoop::new(
            registry.clone(),
            reader,
            reset,
            config.sampling_interval(),
        );

        let state = AppState {
            lifecycle,
            registry,
            board,
            config: Arc::new(config),
        };

        Ok(Self {
            sampler,
            broadcaster,
            state,
        })
    }

    /// Shared handler state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// The broadcaster observers subscribe to.
    pub fn broadcaster(&self) -> &Broadcaster {
        &self.broadcaster
    }

    /// Start sampling and publishing, returning the router and the
    /// forwarding task.
    pub fn start(self) -> (axum::Router, JoinHandle<()>) {
        let forwarder = spawn_forwarder(self.sampler.into_stream(), self.broadcaster);
        (create_app(self.state), forwarder)
    }
}

/// Publish every message from `messages` until the stream ends.
pub fn spawn_forwarder(
    mut messages: BoxStream<'static, PinMessage>,
    broadcaster: Broadcaster,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(message) = messages.next().await {
            broadcaster.publish(message);
        }
    })
}

/// Start the web server and sampling loop for `config`, reading pins
/// through `reader`. Runs until the server stops.
pub async fn start_web_server<R: PortReader + 'static>(config: ViewerConfig, reader: R) -> Result<()> {
    let addr = config
        .web
        .bind_address()
        .parse::<SocketAddr>()
        .map_err(|e| ViewerError::config_error(format!("Invalid bind address: {}", e)))?;

    let viewer = Viewer::new(config, reader)?;
    let ws_path = viewer.state().config.web.ws_path.clone();
    let interval_ms = viewer.state().config.sampling_interval_ms;
    let pin_count = viewer.state().registry.len();

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Starting GPIO viewer on http://{}", addr);
    info!("WebSocket endpoint: ws://{}{}", addr, ws_path);
    info!("Monitoring {} pins every {} ms", pin_count, interval_ms);

    let (app, _forwarder) = viewer.start();

    axum::serve(listener, app)
        .await
        .map_err(|e| ViewerError::web_server_error(format!("Server error: {}", e)))?;

    Ok(())
}

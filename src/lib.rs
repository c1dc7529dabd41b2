pub mod api;
pub mod bridge;
pub mod config;
pub mod logging;
pub mod referral;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::bridge::{InferenceRuntime, OllamaBridge};
use crate::config::{AppConfig, ConfigError};
use crate::referral::{ReferralPipeline, TracingObserver};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ReferralPipeline>,
}

impl AppState {
    pub fn new(pipeline: ReferralPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }

    /// Production wiring: Ollama bridge plus `tracing` observer.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let template = config.prompt.build()?;
        let runtime: Arc<dyn InferenceRuntime> =
            Arc::new(OllamaBridge::new(config.runtime.bridge_config()));
        Ok(Self::new(ReferralPipeline::new(
            template,
            runtime,
            Arc::new(TracingObserver),
        )))
    }
}

pub fn build_app(state: AppState) -> Router {
    api::router(state).layer(TraceLayer::new_for_http())
}

pub async fn run_server(app: Router, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "referral service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}

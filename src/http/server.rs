//! HTTP server setup.
//!
//! # Responsibilities
//! - Create Axum Router with the demo and admin handlers
//! - Wire up middleware (tracing, timeout)
//! - Serve until the shutdown coordinator fires

use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::admin::setup_admin_router;
use crate::config::{AdminSettings, Settings};
use crate::http::handlers::{get_config, post_config, DemoProperties};
use crate::lifecycle::Shutdown;
use crate::poller::PollingScheduler;
use crate::registry::ConfigRegistry;
use crate::source::DatastoreSource;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ConfigRegistry>,
    pub source: Arc<DatastoreSource>,
    pub scheduler: Arc<PollingScheduler>,
    pub properties: DemoProperties,
    pub admin: AdminSettings,
}

impl AppState {
    pub fn new(
        registry: Arc<ConfigRegistry>,
        source: Arc<DatastoreSource>,
        scheduler: Arc<PollingScheduler>,
        admin: AdminSettings,
    ) -> Self {
        let properties = DemoProperties::new(&registry);
        Self {
            registry,
            source,
            scheduler,
            properties,
            admin,
        }
    }
}

/// HTTP server for the demo and admin endpoints.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(settings: &Settings, state: AppState) -> Self {
        let router = Self::build_router(settings, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(settings: &Settings, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/config", get(get_config).post(post_config))
            .with_state(state.clone());

        if settings.admin.enabled {
            router = router.merge(setup_admin_router(state));
        }

        router
            .layer(TimeoutLayer::new(Duration::from_secs(settings.http.request_timeout_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// Serve on `listener` until `shutdown` is triggered.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

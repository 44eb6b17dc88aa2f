//! remote-config demo service.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────┐  lookup   ┌──────────────┐  coerce   ┌──────────────┐
//!   │ entity store │◀──────────│  datastore   │──────────▶│   ValueSet   │
//!   │ (http/memory)│           │    source    │           └──────┬───────┘
//!   └──────────────┘           └──────▲───────┘                  │ publish
//!                                     │ fetch_all                ▼
//!                              ┌──────┴───────┐           ┌──────────────┐
//!                              │   polling    │──────────▶│   registry   │
//!                              │  scheduler   │           │  (ArcSwap)   │
//!                              └──────────────┘           └──────┬───────┘
//!                                                                │ get()
//!                                                         ┌──────▼───────┐
//!                                                         │   accessor   │
//!                                                         │   handles    │
//!                                                         └──────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use remote_config::config::{load_settings, Settings};
use remote_config::http::{AppState, HttpServer};
use remote_config::lifecycle::{signals::shutdown_on_signal, Shutdown};
use remote_config::observability::{logging, metrics};
use remote_config::poller::PollingScheduler;
use remote_config::registry::ConfigRegistry;
use remote_config::source::{
    build_store, DatastoreSource, ENTITY_KEY_PROPERTY, ENTITY_KIND_PROPERTY,
};

#[derive(Parser)]
#[command(name = "remote-config")]
#[command(about = "Serve configuration polled from a remote entity store", long_about = None)]
struct Args {
    /// Settings file (TOML). Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let settings = match &args.config {
        Some(path) => load_settings(path)?,
        None => Settings::default(),
    };

    logging::init_logging(&settings.observability.log_level);
    tracing::info!("remote-config v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        store = ?settings.store.backend,
        initial_delay_ms = settings.poller.initial_delay_ms,
        delay_ms = settings.poller.delay_ms,
        synchronous_first_poll = settings.poller.synchronous_first_poll,
        "Settings loaded"
    );

    if settings.observability.metrics_enabled {
        match settings.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %settings.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let registry = ConfigRegistry::global();
    // The remote entity may still redirect itself by publishing these names.
    if let Some(kind) = &settings.store.entity_kind {
        registry.set_default(ENTITY_KIND_PROPERTY, kind.as_str());
    }
    if let Some(key) = &settings.store.entity_key {
        registry.set_default(ENTITY_KEY_PROPERTY, key.as_str());
    }

    let store = build_store(&settings.store)?;
    let source = Arc::new(DatastoreSource::new(store, &registry));
    let scheduler = Arc::new(PollingScheduler::new(
        settings.poller.clone(),
        source.clone(),
        registry.clone(),
    ));

    scheduler.start().await?;

    let shutdown = Shutdown::new();
    tokio::spawn(shutdown_on_signal(shutdown.clone()));

    let listener = TcpListener::bind(&settings.http.bind_address).await?;
    let state = AppState::new(registry, source, scheduler.clone(), settings.admin.clone());
    let server = HttpServer::new(&settings, state);
    let served = server.run(listener, shutdown).await;

    // The poller must be gone before the store client is dropped.
    scheduler.stop().await;
    served?;

    tracing::info!("Shutdown complete");
    Ok(())
}

//! Shared utilities for integration testing.
#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use remote_config::config::schema::{PollerSettings, StoreBackend, StoreSettings};
use remote_config::registry::{ConfigRegistry, TypedValue, ValueSet};
use remote_config::source::{ConfigSource, PollOutcome};

pub fn poller_settings(initial_delay_ms: u64, delay_ms: u64, synchronous: bool) -> PollerSettings {
    PollerSettings {
        initial_delay_ms,
        delay_ms,
        synchronous_first_poll: synchronous,
        ignore_deletes_from_source: false,
    }
}

/// Wait until the registry has published at least `target` times.
pub async fn wait_for_version(registry: &ConfigRegistry, target: u64) {
    let mut rx = registry.subscribe();
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|v| *v >= target))
        .await
        .expect("timed out waiting for publication")
        .expect("registry dropped");
}

/// Wait until `f` holds, polling every few milliseconds.
pub async fn wait_until(mut f: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !f() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("timed out waiting for condition");
}

/// Source that takes `latency` per fetch and records overlapping calls.
pub struct SlowSource {
    latency: Duration,
    in_flight: AtomicBool,
    calls: AtomicUsize,
    overlaps: AtomicUsize,
}

impl SlowSource {
    pub fn new(latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            latency,
            in_flight: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            overlaps: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn overlaps(&self) -> usize {
        self.overlaps.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConfigSource for SlowSource {
    async fn fetch_all(&self) -> PollOutcome {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.latency).await;
        self.in_flight.store(false, Ordering::SeqCst);

        let values: ValueSet = vec![("call", TypedValue::Integer(call as i64))]
            .into_iter()
            .collect();
        Ok(values)
    }
}

/// Entity store API served by axum, backed by a map of entity JSON.
///
/// A `Value::Null` entry answers `{"entity": null}`. With `fail` set every
/// request answers 500.
#[derive(Clone, Default)]
pub struct MockStore {
    pub entities: Arc<Mutex<HashMap<(String, String), Value>>>,
    pub fail: Arc<AtomicBool>,
}

impl MockStore {
    pub fn insert(&self, kind: &str, key: &str, entity: Value) {
        self.entities
            .lock()
            .unwrap()
            .insert((kind.to_string(), key.to_string()), entity);
    }

    pub fn get(&self, kind: &str, key: &str) -> Option<Value> {
        self.entities
            .lock()
            .unwrap()
            .get(&(kind.to_string(), key.to_string()))
            .cloned()
    }
}

async fn lookup_entity(
    State(store): State<MockStore>,
    Path((_dataset, kind, key)): Path<(String, String, String)>,
) -> Response {
    if store.fail.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "backend unavailable").into_response();
    }
    match store.get(&kind, &key) {
        Some(entity) => Json(json!({ "entity": entity })).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn upsert_entity(
    State(store): State<MockStore>,
    Path((_dataset, kind, key)): Path<(String, String, String)>,
    Json(entity): Json<Value>,
) -> StatusCode {
    if store.fail.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    store.insert(&kind, &key, entity);
    StatusCode::NO_CONTENT
}

/// Serve `store` on an ephemeral local port.
pub async fn start_mock_store(store: MockStore) -> SocketAddr {
    let app = Router::new()
        .route(
            "/v1/datasets/{dataset}/entities/{kind}/{key}",
            get(lookup_entity).put(upsert_entity),
        )
        .with_state(store);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

pub fn http_store_settings(addr: SocketAddr) -> StoreSettings {
    StoreSettings {
        backend: StoreBackend::Http,
        endpoint: format!("http://{}", addr),
        dataset: "test".to_string(),
        timeout_secs: 2,
        entity_kind: None,
        entity_key: None,
    }
}

use std::collections::BTreeMap;

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::http::server::AppState;
use crate::observability::metrics;
use crate::poller::{PollStatus, SchedulerError};
use crate::registry::TypedValue;
use crate::source::EntityIdentity;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub source: EntityIdentity,
    pub poller: PollStatus,
}

/// Where an effective value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueOrigin {
    Remote,
    Local,
}

#[derive(Debug, Serialize)]
pub struct EffectiveValue {
    pub value: TypedValue,
    pub origin: ValueOrigin,
}

#[derive(Serialize)]
pub struct PropertiesDump {
    pub version: u64,
    pub properties: BTreeMap<String, EffectiveValue>,
}

#[derive(Serialize)]
pub struct RefreshResult {
    pub version: Option<u64>,
    pub error: Option<String>,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    metrics::record_request("admin_status", 200);
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        source: state.source.identity(),
        poller: state.scheduler.status(),
    })
}

/// Remote values, plus dynamic defaults for names the source does not set.
pub async fn get_properties(State(state): State<AppState>) -> Json<PropertiesDump> {
    let snapshot = state.registry.snapshot();

    let mut properties: BTreeMap<String, EffectiveValue> = state
        .registry
        .defaults()
        .into_iter()
        .map(|(name, value)| {
            (
                name,
                EffectiveValue {
                    value,
                    origin: ValueOrigin::Local,
                },
            )
        })
        .collect();
    for (name, value) in snapshot.iter() {
        properties.insert(
            name.to_string(),
            EffectiveValue {
                value: value.clone(),
                origin: ValueOrigin::Remote,
            },
        );
    }

    metrics::record_request("admin_properties", 200);
    Json(PropertiesDump {
        version: state.registry.version(),
        properties,
    })
}

pub async fn post_refresh(State(state): State<AppState>) -> (StatusCode, Json<RefreshResult>) {
    let (status, result) = match state.scheduler.poll_now().await {
        Ok(version) => (
            StatusCode::OK,
            RefreshResult {
                version: Some(version),
                error: None,
            },
        ),
        Err(e @ SchedulerError::Stopped) => (
            StatusCode::SERVICE_UNAVAILABLE,
            RefreshResult {
                version: None,
                error: Some(e.to_string()),
            },
        ),
        Err(e) => (
            StatusCode::BAD_GATEWAY,
            RefreshResult {
                version: None,
                error: Some(e.to_string()),
            },
        ),
    };

    metrics::record_request("admin_refresh", status.as_u16());
    (status, Json(result))
}

//! Entity store client over a JSON HTTP API.
//!
//! # Protocol
//! ```text
//! GET {endpoint}/v1/datasets/{dataset}/entities/{kind}/{key}
//!     200 {"entity": {...}}   → Found
//!     200 {"entity": null}    → Missing
//!     404                     → NotFound
//! PUT same path, entity JSON body → upsert
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

use crate::config::schema::StoreSettings;
use crate::source::store::EntityStore;
use crate::source::types::{Entity, EntityIdentity, LookupResult, StoreError, StoreResult};

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    entity: Option<Entity>,
}

/// Entity store reached over HTTP.
#[derive(Clone)]
pub struct HttpEntityStore {
    client: reqwest::Client,
    base: Url,
    dataset: String,
    timeout_secs: u64,
}

impl HttpEntityStore {
    /// Create a client for the store described by `settings`.
    pub fn new(settings: &StoreSettings) -> StoreResult<Self> {
        let base: Url = settings.endpoint.parse().map_err(|e: url::ParseError| {
            StoreError::InvalidEndpoint {
                endpoint: settings.endpoint.clone(),
                reason: e.to_string(),
            }
        })?;
        if base.cannot_be_a_base() {
            return Err(StoreError::InvalidEndpoint {
                endpoint: settings.endpoint.clone(),
                reason: "not a base URL".to_string(),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        tracing::info!(
            endpoint = %base,
            dataset = %settings.dataset,
            timeout_secs = settings.timeout_secs,
            "HTTP entity store client initialized"
        );

        Ok(Self {
            client,
            base,
            dataset: settings.dataset.clone(),
            timeout_secs: settings.timeout_secs,
        })
    }

    fn entity_url(&self, identity: &EntityIdentity) -> StoreResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidEndpoint {
                endpoint: self.base.to_string(),
                reason: "not a base URL".to_string(),
            })?
            .pop_if_empty()
            .extend([
                "v1",
                "datasets",
                self.dataset.as_str(),
                "entities",
                identity.kind.as_str(),
                identity.key.as_str(),
            ]);
        Ok(url)
    }

    fn transport_error(&self, e: reqwest::Error) -> StoreError {
        if e.is_timeout() {
            StoreError::Timeout(self.timeout_secs)
        } else {
            StoreError::Transport(e.to_string())
        }
    }

    async fn status_error(response: reqwest::Response) -> StoreError {
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        StoreError::Status { status, message }
    }
}

#[async_trait]
impl EntityStore for HttpEntityStore {
    async fn lookup(&self, identity: &EntityIdentity) -> StoreResult<LookupResult> {
        let url = self.entity_url(identity)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(LookupResult::NotFound),
            status if status.is_success() => {
                let body: LookupResponse = response
                    .json()
                    .await
                    .map_err(|e| StoreError::Decode(e.to_string()))?;
                Ok(match body.entity {
                    Some(entity) => LookupResult::Found(entity),
                    None => LookupResult::Missing,
                })
            }
            _ => Err(Self::status_error(response).await),
        }
    }

    async fn upsert(&self, entity: Entity) -> StoreResult<()> {
        let url = self.entity_url(&entity.key)?;
        let response = self
            .client
            .put(url)
            .json(&entity)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }
        Ok(())
    }
}

impl std::fmt::Debug for HttpEntityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpEntityStore")
            .field("base", &self.base.as_str())
            .field("dataset", &self.dataset)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(endpoint: &str) -> StoreSettings {
        StoreSettings {
            endpoint: endpoint.to_string(),
            dataset: "config-test".to_string(),
            ..StoreSettings::default()
        }
    }

    #[test]
    fn test_entity_url() {
        let store = HttpEntityStore::new(&settings("http://localhost:8432/")).unwrap();
        let url = store.entity_url(&EntityIdentity::new("Cfg", "latest")).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8432/v1/datasets/config-test/entities/Cfg/latest"
        );
    }

    #[test]
    fn test_entity_url_escapes_segments() {
        let store = HttpEntityStore::new(&settings("http://localhost:8432/store")).unwrap();
        let url = store.entity_url(&EntityIdentity::new("Cfg", "a/b")).unwrap();
        assert!(url.as_str().ends_with("/store/v1/datasets/config-test/entities/Cfg/a%2Fb"));
    }

    #[test]
    fn test_invalid_endpoint() {
        let err = HttpEntityStore::new(&settings("not a url")).unwrap_err();
        assert!(matches!(err, StoreError::InvalidEndpoint { .. }));

        let err = HttpEntityStore::new(&settings("mailto:ops@example.com")).unwrap_err();
        assert!(matches!(err, StoreError::InvalidEndpoint { .. }));
    }
}

//! In-process entity store for development and tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::source::store::EntityStore;
use crate::source::types::{Entity, EntityIdentity, LookupResult, StoreError, StoreResult};

/// Entity store backed by a map.
///
/// A `None` entry simulates a lookup that finds a result without an entity
/// body. `set_failing(true)` makes every call fail with a transport error.
#[derive(Default)]
pub struct InMemoryStore {
    entities: RwLock<HashMap<EntityIdentity, Option<Entity>>>,
    failing: AtomicBool,
    lookups: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `entity` under its key, replacing any previous entry.
    pub async fn put(&self, entity: Entity) {
        self.entities.write().await.insert(entity.key.clone(), Some(entity));
    }

    /// Record `identity` as found but carrying no entity.
    pub async fn put_missing(&self, identity: EntityIdentity) {
        self.entities.write().await.insert(identity, None);
    }

    pub async fn remove(&self, identity: &EntityIdentity) {
        self.entities.write().await.remove(identity);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of lookups served so far, failed ones included.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    fn check_failing(&self) -> StoreResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Transport("injected failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl EntityStore for InMemoryStore {
    async fn lookup(&self, identity: &EntityIdentity) -> StoreResult<LookupResult> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.check_failing()?;

        let entities = self.entities.read().await;
        Ok(match entities.get(identity) {
            None => LookupResult::NotFound,
            Some(None) => LookupResult::Missing,
            Some(Some(entity)) => LookupResult::Found(entity.clone()),
        })
    }

    async fn upsert(&self, entity: Entity) -> StoreResult<()> {
        self.check_failing()?;
        self.put(entity).await;
        Ok(())
    }
}

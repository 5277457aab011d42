//! In-memory management plane for reconciler tests

use super::models::trigger::{Trigger, RUNTIME_STATE_STARTED};
use super::models::{
    DatasetResource, Factory, IntegrationRuntimeResource, LinkedServiceResource, TriggerResource,
};
use super::{ApiError, Clients, EntityApi, TriggerRuntimeApi};
use crate::ids::{FactoryChildId, ResourceId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Entities keyed by their canonical id string
pub struct MemoryStore<T> {
    entities: Mutex<HashMap<String, T>>,
    puts: AtomicUsize,
    failure: Mutex<Option<u16>>,
}

impl<T: Clone> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            entities: Mutex::new(HashMap::new()),
            puts: AtomicUsize::new(0),
            failure: Mutex::new(None),
        }
    }

    pub fn insert(&self, id: &impl ResourceId, entity: T) {
        self.entities
            .lock()
            .unwrap()
            .insert(id.to_string(), entity);
    }

    pub fn entity(&self, id: &impl ResourceId) -> Option<T> {
        self.entities.lock().unwrap().get(&id.to_string()).cloned()
    }

    pub fn len(&self) -> usize {
        self.entities.lock().unwrap().len()
    }

    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    /// Makes every following call fail with `status`
    pub fn fail_with(&self, status: u16) {
        *self.failure.lock().unwrap() = Some(status);
    }

    fn check(&self) -> Result<(), ApiError> {
        match *self.failure.lock().unwrap() {
            Some(status) => Err(ApiError::ApiError {
                status,
                code: "InternalServerError".to_string(),
                message: "injected failure".to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl<I, T> EntityApi<I, T> for MemoryStore<T>
where
    I: ResourceId,
    T: Clone + Send + Sync + 'static,
{
    async fn get(&self, id: &I) -> Result<Option<T>, ApiError> {
        self.check()?;
        Ok(self.entity(id))
    }

    async fn create_or_update(&self, id: &I, entity: &T) -> Result<T, ApiError> {
        self.check()?;
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.insert(id, entity.clone());
        Ok(entity.clone())
    }

    async fn delete(&self, id: &I) -> Result<bool, ApiError> {
        self.check()?;
        Ok(self
            .entities
            .lock()
            .unwrap()
            .remove(&id.to_string())
            .is_some())
    }
}

/// Flips `runtimeState` on stored triggers and records each call
pub struct MemoryTriggerRuntime {
    store: Arc<MemoryStore<TriggerResource>>,
    pub calls: Mutex<Vec<String>>,
}

impl MemoryTriggerRuntime {
    fn set_state(&self, id: &FactoryChildId, state: &str) -> Result<(), ApiError> {
        let mut entities = self.store.entities.lock().unwrap();
        let Some(resource) = entities.get_mut(&id.to_string()) else {
            return Err(ApiError::ApiError {
                status: 404,
                code: "NotFound".to_string(),
                message: format!("{} not found", id),
            });
        };
        if let Trigger::ScheduleTrigger(schedule) = &mut resource.properties {
            schedule.runtime_state = Some(state.to_string());
        }
        self.calls
            .lock()
            .unwrap()
            .push(format!("{} {}", state, id.name));
        Ok(())
    }
}

#[async_trait]
impl TriggerRuntimeApi for MemoryTriggerRuntime {
    async fn start(&self, id: &FactoryChildId) -> Result<(), ApiError> {
        self.set_state(id, RUNTIME_STATE_STARTED)
    }

    async fn stop(&self, id: &FactoryChildId) -> Result<(), ApiError> {
        self.set_state(id, "Stopped")
    }
}

/// Handles on every store behind a `Clients` bundle
pub struct MemoryBackend {
    pub factories: Arc<MemoryStore<Factory>>,
    pub linked_services: Arc<MemoryStore<LinkedServiceResource>>,
    pub datasets: Arc<MemoryStore<DatasetResource>>,
    pub integration_runtimes: Arc<MemoryStore<IntegrationRuntimeResource>>,
    pub triggers: Arc<MemoryStore<TriggerResource>>,
    pub trigger_runtime: Arc<MemoryTriggerRuntime>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        let triggers = Arc::new(MemoryStore::new());
        Self {
            factories: Arc::new(MemoryStore::new()),
            linked_services: Arc::new(MemoryStore::new()),
            datasets: Arc::new(MemoryStore::new()),
            integration_runtimes: Arc::new(MemoryStore::new()),
            trigger_runtime: Arc::new(MemoryTriggerRuntime {
                store: triggers.clone(),
                calls: Mutex::new(Vec::new()),
            }),
            triggers,
        }
    }

    pub fn clients(&self, subscription_id: &str) -> Clients {
        Clients {
            subscription_id: subscription_id.to_string(),
            factories: self.factories.clone(),
            linked_services: self.linked_services.clone(),
            datasets: self.datasets.clone(),
            integration_runtimes: self.integration_runtimes.clone(),
            triggers: self.triggers.clone(),
            trigger_runtime: self.trigger_runtime.clone(),
        }
    }
}

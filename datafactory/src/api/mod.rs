//! Data Factory management-plane API
//!
//! Reconcilers only see the `EntityApi` and `TriggerRuntimeApi` seams,
//! bundled per entity kind in `Clients`. `ArmClient` implements both over
//! HTTPS.

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

#[cfg(test)]
pub(crate) mod memory;

pub use client::{ArmClient, API_VERSION, DEFAULT_ENDPOINT};
pub use error::ApiError;
pub use transport::TransportConfig;

use crate::ids::{FactoryChildId, FactoryId, ResourceId};
use async_trait::async_trait;
use models::{
    DatasetResource, Factory, IntegrationRuntimeResource, LinkedServiceResource, TriggerResource,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Typed CRUD over one kind of remote entity
#[async_trait]
pub trait EntityApi<I: ResourceId, T>: Send + Sync {
    /// `None` when the entity does not exist
    async fn get(&self, id: &I) -> Result<Option<T>, ApiError>;

    /// Full-replace PUT; returns the entity as stored
    async fn create_or_update(&self, id: &I, entity: &T) -> Result<T, ApiError>;

    /// `false` when there was nothing to delete
    async fn delete(&self, id: &I) -> Result<bool, ApiError>;
}

/// Start/stop control for triggers
#[async_trait]
pub trait TriggerRuntimeApi: Send + Sync {
    async fn start(&self, id: &FactoryChildId) -> Result<(), ApiError>;

    async fn stop(&self, id: &FactoryChildId) -> Result<(), ApiError>;
}

#[async_trait]
impl<I, T> EntityApi<I, T> for ArmClient
where
    I: ResourceId,
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn get(&self, id: &I) -> Result<Option<T>, ApiError> {
        ArmClient::get(self, &id.resource_path()).await
    }

    async fn create_or_update(&self, id: &I, entity: &T) -> Result<T, ApiError> {
        self.put(&id.resource_path(), entity).await
    }

    async fn delete(&self, id: &I) -> Result<bool, ApiError> {
        ArmClient::delete(self, &id.resource_path()).await
    }
}

#[async_trait]
impl TriggerRuntimeApi for ArmClient {
    async fn start(&self, id: &FactoryChildId) -> Result<(), ApiError> {
        self.post_action(&format!("{}/start", id.resource_path()))
            .await
    }

    async fn stop(&self, id: &FactoryChildId) -> Result<(), ApiError> {
        self.post_action(&format!("{}/stop", id.resource_path()))
            .await
    }
}

/// Everything a reconciler may call, built once by provider configure
#[derive(Clone)]
pub struct Clients {
    pub subscription_id: String,
    pub factories: Arc<dyn EntityApi<FactoryId, Factory>>,
    pub linked_services: Arc<dyn EntityApi<FactoryChildId, LinkedServiceResource>>,
    pub datasets: Arc<dyn EntityApi<FactoryChildId, DatasetResource>>,
    pub integration_runtimes: Arc<dyn EntityApi<FactoryChildId, IntegrationRuntimeResource>>,
    pub triggers: Arc<dyn EntityApi<FactoryChildId, TriggerResource>>,
    pub trigger_runtime: Arc<dyn TriggerRuntimeApi>,
}

impl Clients {
    pub fn from_arm(subscription_id: impl Into<String>, client: ArmClient) -> Self {
        let client = Arc::new(client);
        Self {
            subscription_id: subscription_id.into(),
            factories: client.clone(),
            linked_services: client.clone(),
            datasets: client.clone(),
            integration_runtimes: client.clone(),
            triggers: client.clone(),
            trigger_runtime: client,
        }
    }
}

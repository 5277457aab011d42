//! Helpers for driving reconcilers against the in-memory backend

use crate::api::memory::MemoryBackend;
use crate::reconciler::{Reconciler, ResourceKind};
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::resource::{
    CreateResourceRequest, CreateResourceResponse, DeleteResourceRequest, ReadResourceRequest,
    ReadResourceResponse, Resource, UpdateResourceRequest, UpdateResourceResponse,
    ValidateResourceConfigRequest,
};
use tfplug::types::{Diagnostic, DynamicValue};

pub const SUBSCRIPTION: &str = "00000000-0000-0000-0000-000000000000";

pub fn factory_id() -> String {
    format!(
        "/subscriptions/{}/resourceGroups/acctestRG-df-1/providers/Microsoft.DataFactory/factories/acctestdf1",
        SUBSCRIPTION
    )
}

pub fn harness<K: ResourceKind>(kind: K) -> (MemoryBackend, Reconciler<K>) {
    let backend = MemoryBackend::new();
    let clients = Arc::new(backend.clients(SUBSCRIPTION));
    (backend, Reconciler::with_clients(kind, clients))
}

pub async fn create<K: ResourceKind>(
    reconciler: &Reconciler<K>,
    config: &DynamicValue,
) -> CreateResourceResponse {
    reconciler
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: K::TYPE_NAME.to_string(),
                planned_state: config.clone(),
                config: config.clone(),
            },
        )
        .await
}

pub async fn read<K: ResourceKind>(
    reconciler: &Reconciler<K>,
    state: &DynamicValue,
) -> ReadResourceResponse {
    reconciler
        .read(
            Context::new(),
            ReadResourceRequest {
                type_name: K::TYPE_NAME.to_string(),
                current_state: state.clone(),
            },
        )
        .await
}

pub async fn update<K: ResourceKind>(
    reconciler: &Reconciler<K>,
    prior: &DynamicValue,
    config: &DynamicValue,
) -> UpdateResourceResponse {
    let mut planned = config.clone();
    if let Some(id) = prior.string("id") {
        planned.insert("id", id);
    }
    reconciler
        .update(
            Context::new(),
            UpdateResourceRequest {
                type_name: K::TYPE_NAME.to_string(),
                prior_state: prior.clone(),
                planned_state: planned,
                config: config.clone(),
            },
        )
        .await
}

pub async fn delete<K: ResourceKind>(
    reconciler: &Reconciler<K>,
    state: &DynamicValue,
) -> Vec<Diagnostic> {
    reconciler
        .delete(
            Context::new(),
            DeleteResourceRequest {
                type_name: K::TYPE_NAME.to_string(),
                prior_state: state.clone(),
            },
        )
        .await
        .diagnostics
}

pub async fn validate<K: ResourceKind>(
    reconciler: &Reconciler<K>,
    config: &DynamicValue,
) -> Vec<Diagnostic> {
    reconciler
        .validate(
            Context::new(),
            ValidateResourceConfigRequest {
                type_name: K::TYPE_NAME.to_string(),
                config: config.clone(),
            },
        )
        .await
        .diagnostics
}

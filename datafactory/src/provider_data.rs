//! Provider data structure passed to resources and data sources

use crate::api::{ArmClient, Clients};
use std::sync::Arc;

#[derive(Clone)]
pub struct DataFactoryProviderData {
    pub clients: Arc<Clients>,
}

impl DataFactoryProviderData {
    pub fn new(clients: Clients) -> Self {
        Self {
            clients: Arc::new(clients),
        }
    }

    pub fn from_arm(subscription_id: impl Into<String>, client: ArmClient) -> Self {
        Self::new(Clients::from_arm(subscription_id, client))
    }
}

//! Wire models for the Data Factory management API (2018-06-01)
//!
//! Polymorphic bodies are enums tagged by the service's discriminator.
//! Discriminators this crate does not manage decode to `Unsupported`.

pub mod common;
pub mod dataset;
pub mod factory;
pub mod integration_runtime;
pub mod linked_service;
pub mod trigger;

pub use common::{ArmErrorResponse, SecretBase};
pub use dataset::DatasetResource;
pub use factory::Factory;
pub use integration_runtime::IntegrationRuntimeResource;
pub use linked_service::LinkedServiceResource;
pub use trigger::TriggerResource;

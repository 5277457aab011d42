//! Resource implementations

pub mod common;
pub mod dataset_delimited_text;
pub mod factory;
pub mod integration_runtime_azure_ssis;
pub mod integration_runtime_self_hosted;
pub mod linked_service_azure_databricks;
pub mod trigger_schedule;

#[cfg(test)]
mod testing;

pub use dataset_delimited_text::DelimitedTextDatasetKind;
pub use factory::FactoryKind;
pub use integration_runtime_azure_ssis::AzureSsisIntegrationRuntimeKind;
pub use integration_runtime_self_hosted::SelfHostedIntegrationRuntimeKind;
pub use linked_service_azure_databricks::AzureDatabricksLinkedServiceKind;
pub use trigger_schedule::ScheduleTriggerKind;

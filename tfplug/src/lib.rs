//! tfplug - Terraform resource framework for Rust
//!
//! Schemas, dynamic configuration values, validation, per-operation
//! timeouts and the async provider/resource/data source traits that
//! provider crates implement.

// Core modules
pub mod context;
pub mod error;
pub mod schema;
pub mod types;

// Provider API modules
pub mod data_source;
pub mod provider;
pub mod resource;

// Helper modules
pub mod defaults;
pub mod import;
pub mod timeouts;
pub mod validator;

// Re-exports for convenience
pub use context::Context;
pub use data_source::{DataSource, DataSourceWithConfigure};
pub use error::{Result, TfplugError};
pub use import::import_state_passthrough_id;
pub use provider::{Provider, ProviderData};
pub use resource::{Resource, ResourceWithConfigure, ResourceWithImportState};
pub use schema::{AttributeBuilder, AttributeType, NestedBlockBuilder, Schema, SchemaBuilder};
pub use timeouts::Timeouts;
pub use types::{AttributePath, Config, Diagnostic, Dynamic, DynamicValue, State};

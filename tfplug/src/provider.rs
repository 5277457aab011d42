//! Provider trait and resource/data source instantiation

use crate::context::Context;
use crate::data_source::{ConfigureDataSourceRequest, DataSourceWithConfigure};
use crate::error::{Result, TfplugError};
use crate::resource::{ConfigureResourceRequest, ResourceWithConfigure};
use crate::schema::Schema;
use crate::types::{Diagnostic, DynamicValue};
use async_trait::async_trait;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// Builds a fresh, unconfigured resource instance
pub type ResourceFactory = Box<dyn Fn() -> Box<dyn ResourceWithConfigure> + Send + Sync>;

/// Builds a fresh, unconfigured data source instance
pub type DataSourceFactory = Box<dyn Fn() -> Box<dyn DataSourceWithConfigure> + Send + Sync>;

/// Shared data produced by `configure` and handed to every resource
pub type ProviderData = Arc<dyn Any + Send + Sync>;

#[async_trait]
pub trait Provider: Send + Sync {
    /// Prefix shared by all resource type names (e.g. "azurerm")
    fn type_name(&self) -> &str;

    async fn metadata(
        &self,
        ctx: Context,
        request: ProviderMetadataRequest,
    ) -> ProviderMetadataResponse;

    async fn schema(&self, ctx: Context, request: ProviderSchemaRequest) -> ProviderSchemaResponse;

    /// Builds the clients shared by resources. Only the returned
    /// provider_data reaches resources; no global state.
    async fn configure(
        &mut self,
        ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse;

    fn resources(&self) -> HashMap<String, ResourceFactory>;

    fn data_sources(&self) -> HashMap<String, DataSourceFactory>;
}

pub struct ProviderMetadataRequest;

pub struct ProviderMetadataResponse {
    pub type_name: String,
}

pub struct ProviderSchemaRequest;

pub struct ProviderSchemaResponse {
    pub schema: Schema,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct ConfigureProviderRequest {
    pub config: DynamicValue,
}

pub struct ConfigureProviderResponse {
    pub provider_data: Option<ProviderData>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Instantiates a resource by type name and hands it the provider data
pub async fn new_resource(
    provider: &dyn Provider,
    ctx: Context,
    type_name: &str,
    provider_data: Option<ProviderData>,
) -> Result<Box<dyn ResourceWithConfigure>> {
    let factories = provider.resources();
    let factory = factories
        .get(type_name)
        .ok_or_else(|| TfplugError::ResourceNotFound(type_name.to_string()))?;

    let mut resource = factory();
    let response = resource
        .configure(ctx, ConfigureResourceRequest { provider_data })
        .await;
    check(response.diagnostics)?;
    Ok(resource)
}

/// Instantiates a data source by type name and hands it the provider data
pub async fn new_data_source(
    provider: &dyn Provider,
    ctx: Context,
    type_name: &str,
    provider_data: Option<ProviderData>,
) -> Result<Box<dyn DataSourceWithConfigure>> {
    let factories = provider.data_sources();
    let factory = factories
        .get(type_name)
        .ok_or_else(|| TfplugError::DataSourceNotFound(type_name.to_string()))?;

    let mut data_source = factory();
    let response = data_source
        .configure(ctx, ConfigureDataSourceRequest { provider_data })
        .await;
    check(response.diagnostics)?;
    Ok(data_source)
}

fn check(diagnostics: Vec<Diagnostic>) -> Result<()> {
    let errors: Vec<String> = diagnostics
        .iter()
        .filter(|d| d.is_error())
        .map(ToString::to_string)
        .collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(TfplugError::InvalidConfiguration(errors.join("; ")))
    }
}

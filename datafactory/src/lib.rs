//! Azure Data Factory resources for tfplug
//!
//! The factory, its linked services, datasets, integration runtimes and
//! triggers are all driven by one generic [`reconciler::Reconciler`]; each
//! resource module only supplies schema, identifier and expand/flatten
//! pieces.

pub mod api;
pub mod data_sources;
pub mod ids;
pub mod logging;
pub mod provider_data;
pub mod reconciler;
pub mod resources;
pub mod sensitive;

use api::{ArmClient, DEFAULT_ENDPOINT};
use async_trait::async_trait;
use provider_data::DataFactoryProviderData;
use reconciler::{Reconciler, ResourceKind};
use resources::{
    AzureDatabricksLinkedServiceKind, AzureSsisIntegrationRuntimeKind, DelimitedTextDatasetKind,
    FactoryKind, ScheduleTriggerKind, SelfHostedIntegrationRuntimeKind,
};
use std::collections::HashMap;
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::defaults::EnvDefault;
use tfplug::provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, DataSourceFactory, Provider,
    ProviderMetadataRequest, ProviderMetadataResponse, ProviderSchemaRequest,
    ProviderSchemaResponse, ResourceFactory,
};
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic};

pub const SUBSCRIPTION_ID_ENV: &str = "ARM_SUBSCRIPTION_ID";
pub const ACCESS_TOKEN_ENV: &str = "ARM_ACCESS_TOKEN";
pub const ENDPOINT_ENV: &str = "ARM_ENDPOINT";

#[derive(Default)]
pub struct DataFactoryProvider;

impl DataFactoryProvider {
    pub fn new() -> Self {
        Self
    }

    fn schema_static() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Azure Resource Manager provider for Data Factory")
            .attribute(
                AttributeBuilder::new("subscription_id", AttributeType::String)
                    .description("Subscription new factories are created in")
                    .optional()
                    .default(EnvDefault::create_required(SUBSCRIPTION_ID_ENV))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("access_token", AttributeType::String)
                    .description("Bearer token for the Resource Manager API")
                    .optional()
                    .sensitive()
                    .default(EnvDefault::create_required(ACCESS_TOKEN_ENV))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("endpoint", AttributeType::String)
                    .description("Resource Manager endpoint")
                    .optional()
                    .default(EnvDefault::create(ENDPOINT_ENV, DEFAULT_ENDPOINT))
                    .build(),
            )
            .build()
    }
}

fn missing(attribute: &str, env_var: &str) -> Diagnostic {
    Diagnostic::error(
        format!("Missing {}", attribute),
        format!(
            "{} is required (set in provider config or {} env var)",
            attribute, env_var
        ),
    )
    .with_attribute(AttributePath::new(attribute))
}

fn reconciler<K: ResourceKind>(kind: fn() -> K) -> ResourceFactory {
    Box::new(move || Box::new(Reconciler::new(kind())))
}

#[async_trait]
impl Provider for DataFactoryProvider {
    fn type_name(&self) -> &str {
        "azurerm"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ProviderMetadataRequest,
    ) -> ProviderMetadataResponse {
        ProviderMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ProviderSchemaRequest,
    ) -> ProviderSchemaResponse {
        ProviderSchemaResponse {
            schema: Self::schema_static(),
            diagnostics: vec![],
        }
    }

    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse {
        let schema = Self::schema_static();
        let mut config = request.config;
        schema.apply_defaults(&mut config);

        let mut diagnostics = schema.validate(&config);
        let subscription_id = config.string("subscription_id");
        let access_token = config.string("access_token");
        let endpoint = config
            .string("endpoint")
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        if subscription_id.is_none() {
            diagnostics.push(missing("subscription_id", SUBSCRIPTION_ID_ENV));
        }
        if access_token.is_none() {
            diagnostics.push(missing("access_token", ACCESS_TOKEN_ENV));
        }

        let (Some(subscription_id), Some(access_token)) = (subscription_id, access_token) else {
            return ConfigureProviderResponse {
                provider_data: None,
                diagnostics,
            };
        };
        if diagnostics.iter().any(Diagnostic::is_error) {
            return ConfigureProviderResponse {
                provider_data: None,
                diagnostics,
            };
        }

        match ArmClient::new(&endpoint, &access_token) {
            Ok(client) => {
                tracing::debug!(endpoint = %endpoint, "configured Resource Manager client");
                ConfigureProviderResponse {
                    provider_data: Some(Arc::new(DataFactoryProviderData::from_arm(
                        subscription_id,
                        client,
                    ))),
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to create API client",
                    e.to_string(),
                ));
                ConfigureProviderResponse {
                    provider_data: None,
                    diagnostics,
                }
            }
        }
    }

    fn resources(&self) -> HashMap<String, ResourceFactory> {
        HashMap::from([
            (
                FactoryKind::TYPE_NAME.to_string(),
                reconciler(|| FactoryKind),
            ),
            (
                AzureDatabricksLinkedServiceKind::TYPE_NAME.to_string(),
                reconciler(|| AzureDatabricksLinkedServiceKind),
            ),
            (
                DelimitedTextDatasetKind::TYPE_NAME.to_string(),
                reconciler(|| DelimitedTextDatasetKind),
            ),
            (
                SelfHostedIntegrationRuntimeKind::TYPE_NAME.to_string(),
                reconciler(|| SelfHostedIntegrationRuntimeKind),
            ),
            (
                AzureSsisIntegrationRuntimeKind::TYPE_NAME.to_string(),
                reconciler(|| AzureSsisIntegrationRuntimeKind),
            ),
            (
                ScheduleTriggerKind::TYPE_NAME.to_string(),
                reconciler(|| ScheduleTriggerKind),
            ),
        ])
    }

    fn data_sources(&self) -> HashMap<String, DataSourceFactory> {
        let factory: DataSourceFactory =
            Box::new(|| Box::new(data_sources::FactoryDataSource::new()));
        HashMap::from([("azurerm_data_factory".to_string(), factory)])
    }
}

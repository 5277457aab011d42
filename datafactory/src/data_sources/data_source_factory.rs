//! `azurerm_data_factory` data source

use crate::api::Clients;
use crate::ids::FactoryId;
use crate::provider_data::DataFactoryProviderData;
use crate::reconciler::call;
use crate::resources::factory::{factory_name_attribute, flatten_factory};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceMetadataRequest,
    DataSourceMetadataResponse, DataSourceSchemaRequest, DataSourceSchemaResponse,
    DataSourceWithConfigure, ReadDataSourceRequest, ReadDataSourceResponse,
    ValidateDataSourceConfigRequest, ValidateDataSourceConfigResponse,
};
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::timeouts::{timeouts_block, Timeouts, TIMEOUTS_BLOCK};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};
use tfplug::validator::StringNotEmpty;

#[derive(Default)]
pub struct FactoryDataSource {
    clients: Option<Arc<Clients>>,
}

impl FactoryDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wires the data source to `clients` without going through configure
    pub fn with_clients(clients: Arc<Clients>) -> Self {
        Self {
            clients: Some(clients),
        }
    }

    fn schema_static() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Gets information about an existing Azure Data Factory")
            .attribute(computed("id", AttributeType::String))
            .attribute(factory_name_attribute(true))
            .attribute(
                AttributeBuilder::new("resource_group_name", AttributeType::String)
                    .required()
                    .validator(StringNotEmpty::create())
                    .build(),
            )
            .attribute(computed("location", AttributeType::String))
            .attribute(computed(
                "github_configuration",
                objects(&[
                    ("account_name", AttributeType::String),
                    ("branch_name", AttributeType::String),
                    ("git_url", AttributeType::String),
                    ("repository_name", AttributeType::String),
                    ("root_folder", AttributeType::String),
                    ("publishing_enabled", AttributeType::Bool),
                ]),
            ))
            .attribute(computed(
                "vsts_configuration",
                objects(&[
                    ("account_name", AttributeType::String),
                    ("branch_name", AttributeType::String),
                    ("project_name", AttributeType::String),
                    ("repository_name", AttributeType::String),
                    ("root_folder", AttributeType::String),
                    ("tenant_id", AttributeType::String),
                    ("publishing_enabled", AttributeType::Bool),
                ]),
            ))
            .attribute(computed(
                "identity",
                objects(&[
                    ("type", AttributeType::String),
                    ("identity_ids", AttributeType::string_list()),
                    ("principal_id", AttributeType::String),
                    ("tenant_id", AttributeType::String),
                ]),
            ))
            .attribute(computed(
                "global_parameter",
                objects(&[
                    ("name", AttributeType::String),
                    ("type", AttributeType::String),
                    ("value", AttributeType::String),
                ]),
            ))
            .attribute(computed("public_network_enabled", AttributeType::Bool))
            .attribute(computed("purview_id", AttributeType::String))
            .attribute(computed("tags", AttributeType::string_map()))
            .block(timeouts_block())
            .build()
    }

    async fn read_factory(
        &self,
        ctx: Context,
        config: &DynamicValue,
    ) -> Result<DynamicValue, Diagnostic> {
        let clients = self.clients.as_deref().ok_or_else(|| {
            Diagnostic::error(
                "Provider not configured",
                "Provider data was not properly configured",
            )
        })?;
        let timeouts = Timeouts::default().with_overrides(config).map_err(|e| {
            Diagnostic::error("Invalid timeouts", e.to_string())
                .with_attribute(AttributePath::new(TIMEOUTS_BLOCK))
        })?;
        let ctx = ctx.with_timeout(timeouts.read);

        let id = FactoryId::new(
            clients.subscription_id.as_str(),
            config.string("resource_group_name").unwrap_or_default(),
            config.string("name").unwrap_or_default(),
        );

        tracing::debug!(id = %id, "reading data factory");
        let factory = call(&ctx, clients.factories.get(&id))
            .await
            .map_err(|e| {
                Diagnostic::error(
                    "Failed to read Data Factory",
                    format!("retrieving {}: {}", id, e),
                )
            })?
            .ok_or_else(|| {
                Diagnostic::error("Data Factory not found", format!("{} was not found", id))
            })?;

        let mut state = flatten_factory(&id, &factory)?;
        state.insert("id", id.to_string());
        if let Some(timeouts) = config.attr(TIMEOUTS_BLOCK) {
            state.insert(TIMEOUTS_BLOCK, timeouts.clone());
        }
        Ok(state)
    }
}

fn computed(name: &str, type_: AttributeType) -> Attribute {
    AttributeBuilder::new(name, type_).computed().build()
}

fn objects(fields: &[(&str, AttributeType)]) -> AttributeType {
    AttributeType::List(Box::new(AttributeType::Object(
        fields
            .iter()
            .map(|(name, type_)| (name.to_string(), type_.clone()))
            .collect::<HashMap<_, _>>(),
    )))
}

#[async_trait]
impl DataSource for FactoryDataSource {
    fn type_name(&self) -> &str {
        "azurerm_data_factory"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: DataSourceMetadataRequest,
    ) -> DataSourceMetadataResponse {
        DataSourceMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        DataSourceSchemaResponse {
            schema: Self::schema_static(),
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateDataSourceConfigRequest,
    ) -> ValidateDataSourceConfigResponse {
        ValidateDataSourceConfigResponse {
            diagnostics: Self::schema_static().validate(&request.config),
        }
    }

    async fn read(&self, ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        match self.read_factory(ctx, &request.config).await {
            Ok(state) => ReadDataSourceResponse {
                state,
                diagnostics: vec![],
            },
            Err(diagnostic) => ReadDataSourceResponse {
                state: DynamicValue::null(),
                diagnostics: vec![diagnostic],
            },
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for FactoryDataSource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        let mut diagnostics = vec![];

        if let Some(data) = request.provider_data {
            if let Some(provider_data) = data.downcast_ref::<DataFactoryProviderData>() {
                self.clients = Some(provider_data.clients.clone());
            } else {
                tracing::error!("Failed to downcast provider data to DataFactoryProviderData");
                diagnostics.push(Diagnostic::error(
                    "Invalid provider data",
                    "Failed to extract DataFactoryProviderData from provider data",
                ));
            }
        } else {
            tracing::warn!("No provider data provided to data factory data source");
            diagnostics.push(Diagnostic::error(
                "No provider data",
                "No provider data was provided to the data source",
            ));
        }

        ConfigureDataSourceResponse { diagnostics }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::memory::MemoryBackend;
    use crate::api::models::factory::{
        Factory, FactoryGitHubConfiguration, FactoryRepoConfiguration,
    };
    use tfplug::types::Dynamic;

    const SUBSCRIPTION: &str = "00000000-0000-0000-0000-000000000000";

    fn lookup(name: &str) -> DynamicValue {
        let mut config = DynamicValue::object();
        config.insert("name", name);
        config.insert("resource_group_name", "acctestRG-df-1");
        config
    }

    async fn read(source: &FactoryDataSource, config: DynamicValue) -> ReadDataSourceResponse {
        source
            .read(
                Context::new(),
                ReadDataSourceRequest {
                    type_name: "azurerm_data_factory".to_string(),
                    config,
                },
            )
            .await
    }

    #[tokio::test]
    async fn reads_existing_factory() {
        let backend = MemoryBackend::new();
        let id = FactoryId::new(SUBSCRIPTION, "acctestRG-df-1", "acctestdf1");
        let mut factory = Factory {
            location: Some("West US".to_string()),
            ..Default::default()
        };
        factory.properties.repo_configuration =
            Some(FactoryRepoConfiguration::GitHub(FactoryGitHubConfiguration {
                account_name: "acctestgh".to_string(),
                repository_name: "repo".to_string(),
                collaboration_branch: "main".to_string(),
                root_folder: "/".to_string(),
                ..Default::default()
            }));
        factory.tags.insert("env".to_string(), "test".to_string());
        backend.factories.insert(&id, factory);

        let source = FactoryDataSource::with_clients(Arc::new(backend.clients(SUBSCRIPTION)));
        let response = read(&source, lookup("acctestdf1")).await;
        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);

        let state = response.state;
        assert_eq!(state.string("id"), Some(id.to_string()));
        assert_eq!(state.string("location").as_deref(), Some("westus"));
        assert_eq!(
            state
                .block("github_configuration")
                .and_then(|g| g.string("account_name"))
                .as_deref(),
            Some("acctestgh")
        );
        assert_eq!(state.attr("vsts_configuration"), Some(&Dynamic::empty_list()));
        assert_eq!(
            state.string_map("tags").get("env").map(String::as_str),
            Some("test")
        );
    }

    #[tokio::test]
    async fn missing_factory_is_an_error() {
        let backend = MemoryBackend::new();
        let source = FactoryDataSource::with_clients(Arc::new(backend.clients(SUBSCRIPTION)));

        let response = read(&source, lookup("absent")).await;
        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(response.diagnostics[0].summary, "Data Factory not found");
        assert!(response.state.is_null());
    }

    #[tokio::test]
    async fn read_requires_configuration() {
        let source = FactoryDataSource::new();
        let response = read(&source, lookup("acctestdf1")).await;
        assert_eq!(response.diagnostics[0].summary, "Provider not configured");
    }

    #[tokio::test]
    async fn configure_rejects_foreign_provider_data() {
        let mut source = FactoryDataSource::new();
        let response = source
            .configure(
                Context::new(),
                ConfigureDataSourceRequest {
                    provider_data: Some(Arc::new("not provider data")),
                },
            )
            .await;
        assert_eq!(response.diagnostics[0].summary, "Invalid provider data");
    }

    #[tokio::test]
    async fn computed_outputs_cannot_be_configured() {
        let source = FactoryDataSource::new();
        let mut config = lookup("acctestdf1");
        config.insert("location", "westus");
        let response = source
            .validate(
                Context::new(),
                ValidateDataSourceConfigRequest {
                    type_name: "azurerm_data_factory".to_string(),
                    config,
                },
            )
            .await;
        assert_eq!(response.diagnostics.len(), 1);
    }
}

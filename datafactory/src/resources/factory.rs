//! `azurerm_data_factory`

use super::common::{id_attribute, normalize_location, unsupported_variant};
use crate::api::models::factory::{
    Factory, FactoryGitHubConfiguration, FactoryIdentity, FactoryProperties,
    FactoryRepoConfiguration, FactoryVstsConfiguration, GlobalParameterSpecification,
    PurviewConfiguration,
};
use crate::api::{Clients, EntityApi};
use crate::ids::{FactoryId, IdParseError};
use crate::reconciler::ResourceKind;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tfplug::defaults::StaticDefault;
use tfplug::schema::{
    AttributeBuilder, AttributeType, NestedBlock, NestedBlockBuilder, Schema, SchemaBuilder,
};
use tfplug::timeouts::timeouts_block;
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use tfplug::validator::{EachElement, StringInSlice, StringLenBetween, StringMatch, StringNotEmpty};

const PUBLIC_NETWORK_ENABLED: &str = "Enabled";
const PUBLIC_NETWORK_DISABLED: &str = "Disabled";

const IDENTITY_TYPES: &[&str] = &[
    "SystemAssigned",
    "UserAssigned",
    "SystemAssigned,UserAssigned",
    "SystemAssigned, UserAssigned",
];

const GLOBAL_PARAMETER_TYPES: &[&str] = &["Array", "Bool", "Float", "Int", "Object", "String"];

pub struct FactoryKind;

fn required_string(name: &str) -> tfplug::schema::Attribute {
    AttributeBuilder::new(name, AttributeType::String)
        .required()
        .validator(StringNotEmpty::create())
        .build()
}

fn publishing_enabled() -> tfplug::schema::Attribute {
    AttributeBuilder::new("publishing_enabled", AttributeType::Bool)
        .optional()
        .default(StaticDefault::bool(true))
        .build()
}

fn github_block() -> NestedBlock {
    NestedBlockBuilder::new("github_configuration")
        .max_items(1)
        .attribute(required_string("account_name"))
        .attribute(required_string("branch_name"))
        .attribute(required_string("git_url"))
        .attribute(required_string("repository_name"))
        .attribute(
            AttributeBuilder::new("root_folder", AttributeType::String)
                .required()
                .build(),
        )
        .attribute(publishing_enabled())
        .build()
}

fn vsts_block() -> NestedBlock {
    NestedBlockBuilder::new("vsts_configuration")
        .max_items(1)
        .attribute(required_string("account_name"))
        .attribute(required_string("branch_name"))
        .attribute(required_string("project_name"))
        .attribute(required_string("repository_name"))
        .attribute(
            AttributeBuilder::new("root_folder", AttributeType::String)
                .required()
                .build(),
        )
        .attribute(required_string("tenant_id"))
        .attribute(publishing_enabled())
        .build()
}

fn identity_block() -> NestedBlock {
    NestedBlockBuilder::new("identity")
        .max_items(1)
        .attribute(
            AttributeBuilder::new("type", AttributeType::String)
                .required()
                .validator(StringInSlice::create(IDENTITY_TYPES))
                .build(),
        )
        .attribute(
            AttributeBuilder::new("identity_ids", AttributeType::string_list())
                .optional()
                .validator(EachElement::create(StringNotEmpty::create()))
                .build(),
        )
        .attribute(
            AttributeBuilder::new("principal_id", AttributeType::String)
                .computed()
                .build(),
        )
        .attribute(
            AttributeBuilder::new("tenant_id", AttributeType::String)
                .computed()
                .build(),
        )
        .build()
}

fn global_parameter_block() -> NestedBlock {
    NestedBlockBuilder::new("global_parameter")
        .attribute(required_string("name"))
        .attribute(
            AttributeBuilder::new("type", AttributeType::String)
                .required()
                .validator(StringInSlice::create(GLOBAL_PARAMETER_TYPES))
                .build(),
        )
        .attribute(required_string("value"))
        .build()
}

/// Name rules for factories: alphanumerics separated by single dashes
pub fn factory_name_attribute(required: bool) -> tfplug::schema::Attribute {
    let builder = AttributeBuilder::new("name", AttributeType::String)
        .description("Name of the Data Factory")
        .validator(StringLenBetween::create(3, 63))
        .validator(StringMatch::create(
            r"^[A-Za-z0-9]+(?:-[A-Za-z0-9]+)*$",
            "invalid data_factory_name, see https://docs.microsoft.com/en-us/azure/data-factory/naming-rules",
        ));
    if required {
        builder.required().build()
    } else {
        builder.optional().build()
    }
}

fn expand_repo(config: &DynamicValue) -> Option<FactoryRepoConfiguration> {
    let publish = |block: &DynamicValue| Some(!block.boolean("publishing_enabled").unwrap_or(true));

    if let Some(vsts) = config.block("vsts_configuration") {
        return Some(FactoryRepoConfiguration::Vsts(FactoryVstsConfiguration {
            account_name: vsts.string("account_name").unwrap_or_default(),
            repository_name: vsts.string("repository_name").unwrap_or_default(),
            collaboration_branch: vsts.string("branch_name").unwrap_or_default(),
            root_folder: vsts.string("root_folder").unwrap_or_default(),
            project_name: vsts.string("project_name").unwrap_or_default(),
            tenant_id: vsts.string("tenant_id").unwrap_or_default(),
            last_commit_id: None,
            disable_publish: publish(&vsts),
        }));
    }
    if let Some(github) = config.block("github_configuration") {
        return Some(FactoryRepoConfiguration::GitHub(FactoryGitHubConfiguration {
            account_name: github.string("account_name").unwrap_or_default(),
            repository_name: github.string("repository_name").unwrap_or_default(),
            collaboration_branch: github.string("branch_name").unwrap_or_default(),
            root_folder: github.string("root_folder").unwrap_or_default(),
            host_name: github.string("git_url"),
            last_commit_id: None,
            disable_publish: publish(&github),
        }));
    }
    None
}

fn expand_identity(config: &DynamicValue) -> Option<FactoryIdentity> {
    let identity = config.block("identity")?;
    Some(FactoryIdentity {
        identity_type: identity
            .string("type")
            .unwrap_or_default()
            .replace(", ", ","),
        principal_id: None,
        tenant_id: None,
        user_assigned_identities: identity
            .string_list("identity_ids")
            .into_iter()
            .map(|id| (id, Value::Object(Default::default())))
            .collect(),
    })
}

fn expand_global_parameters(
    config: &DynamicValue,
) -> Result<BTreeMap<String, GlobalParameterSpecification>, Diagnostic> {
    let mut parameters = BTreeMap::new();
    for (idx, block) in config.blocks("global_parameter").into_iter().enumerate() {
        let name = block.string("name").unwrap_or_default();
        let parameter_type = block.string("type").unwrap_or_default();
        let raw = block.string("value").unwrap_or_default();

        let value = if parameter_type == "Array" || parameter_type == "Object" {
            serde_json::from_str(&raw).map_err(|e| {
                Diagnostic::error(
                    "Invalid global parameter",
                    format!("value of {:?} is not valid {} JSON: {}", name, parameter_type, e),
                )
                .with_attribute(
                    AttributePath::new("global_parameter")
                        .index(idx as i64)
                        .attribute("value"),
                )
            })?
        } else {
            Value::String(raw)
        };

        if parameters
            .insert(
                name.clone(),
                GlobalParameterSpecification {
                    parameter_type,
                    value,
                },
            )
            .is_some()
        {
            return Err(Diagnostic::error(
                "Duplicate global parameter",
                format!("global parameter {:?} is defined more than once", name),
            )
            .with_attribute(AttributePath::new("global_parameter")));
        }
    }
    Ok(parameters)
}

fn flatten_repo(
    id: &FactoryId,
    repo: Option<&FactoryRepoConfiguration>,
) -> Result<(Dynamic, Dynamic), Diagnostic> {
    let publishing = |disable: Option<bool>| !disable.unwrap_or(false);

    match repo {
        None => Ok((Dynamic::empty_list(), Dynamic::empty_list())),
        Some(FactoryRepoConfiguration::GitHub(github)) => {
            let mut block = DynamicValue::object();
            block.insert("account_name", github.account_name.as_str());
            block.insert("branch_name", github.collaboration_branch.as_str());
            block.insert("git_url", github.host_name.clone());
            block.insert("repository_name", github.repository_name.as_str());
            block.insert("root_folder", github.root_folder.as_str());
            block.insert("publishing_enabled", publishing(github.disable_publish));
            Ok((vec![block].into(), Dynamic::empty_list()))
        }
        Some(FactoryRepoConfiguration::Vsts(vsts)) => {
            let mut block = DynamicValue::object();
            block.insert("account_name", vsts.account_name.as_str());
            block.insert("branch_name", vsts.collaboration_branch.as_str());
            block.insert("project_name", vsts.project_name.as_str());
            block.insert("repository_name", vsts.repository_name.as_str());
            block.insert("root_folder", vsts.root_folder.as_str());
            block.insert("tenant_id", vsts.tenant_id.as_str());
            block.insert("publishing_enabled", publishing(vsts.disable_publish));
            Ok((Dynamic::empty_list(), vec![block].into()))
        }
        Some(FactoryRepoConfiguration::Unsupported) => Err(unsupported_variant(
            id,
            "a GitHub or VSTS repository configuration",
            "an unknown repository type",
        )),
    }
}

fn flatten_identity(identity: Option<&FactoryIdentity>) -> Dynamic {
    let Some(identity) = identity else {
        return Dynamic::empty_list();
    };
    let mut block = DynamicValue::object();
    block.insert("type", identity.identity_type.as_str());
    block.insert(
        "identity_ids",
        Dynamic::string_list(identity.user_assigned_identities.keys().cloned()),
    );
    block.insert("principal_id", identity.principal_id.clone());
    block.insert("tenant_id", identity.tenant_id.clone());
    vec![block].into()
}

fn flatten_global_parameters(parameters: &BTreeMap<String, GlobalParameterSpecification>) -> Dynamic {
    let blocks: Vec<DynamicValue> = parameters
        .iter()
        .map(|(name, spec)| {
            let value = match &spec.value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            let mut block = DynamicValue::object();
            block.insert("name", name.as_str());
            block.insert("type", spec.parameter_type.as_str());
            block.insert("value", value);
            block
        })
        .collect();
    blocks.into()
}

/// Attributes shared with the factory data source
pub fn flatten_factory(id: &FactoryId, factory: &Factory) -> Result<DynamicValue, Diagnostic> {
    let mut state = DynamicValue::object();
    state.insert("name", id.factory_name.as_str());
    state.insert("resource_group_name", id.resource_group.as_str());
    state.insert(
        "location",
        factory.location.as_deref().map(normalize_location),
    );

    let (github, vsts) = flatten_repo(id, factory.properties.repo_configuration.as_ref())?;
    state.insert("github_configuration", github);
    state.insert("vsts_configuration", vsts);
    state.insert("identity", flatten_identity(factory.identity.as_ref()));
    state.insert(
        "public_network_enabled",
        factory.properties.public_network_access.as_deref() != Some(PUBLIC_NETWORK_DISABLED),
    );
    state.insert(
        "purview_id",
        factory
            .properties
            .purview_configuration
            .as_ref()
            .and_then(|p| p.purview_resource_id.clone()),
    );
    state.insert(
        "global_parameter",
        flatten_global_parameters(&factory.properties.global_parameters),
    );
    state.insert("tags", Dynamic::string_map(factory.tags.clone()));
    Ok(state)
}

impl ResourceKind for FactoryKind {
    type Id = FactoryId;
    type Model = Factory;

    const TYPE_NAME: &'static str = "azurerm_data_factory";

    fn schema(&self) -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Manages an Azure Data Factory")
            .attribute(id_attribute())
            .attribute(factory_name_attribute(true))
            .attribute(required_string("resource_group_name"))
            .attribute(required_string("location"))
            .attribute(
                AttributeBuilder::new("public_network_enabled", AttributeType::Bool)
                    .optional()
                    .default(StaticDefault::bool(true))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("purview_id", AttributeType::String)
                    .optional()
                    .validator(StringNotEmpty::create())
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("tags", AttributeType::string_map())
                    .optional()
                    .build(),
            )
            .block(github_block())
            .block(vsts_block())
            .block(identity_block())
            .block(global_parameter_block())
            .block(timeouts_block())
            .conflicting(&["github_configuration", "vsts_configuration"])
            .build()
    }

    fn parse_id(&self, raw: &str) -> Result<FactoryId, IdParseError> {
        FactoryId::parse(raw)
    }

    fn id_from_config(
        &self,
        config: &DynamicValue,
        subscription_id: &str,
    ) -> Result<FactoryId, Diagnostic> {
        match (config.string("resource_group_name"), config.string("name")) {
            (Some(resource_group), Some(name)) => {
                Ok(FactoryId::new(subscription_id, resource_group, name))
            }
            _ => Err(Diagnostic::error(
                "Missing required argument",
                "both \"name\" and \"resource_group_name\" are required",
            )),
        }
    }

    fn api(&self, clients: &Clients) -> Arc<dyn EntityApi<FactoryId, Factory>> {
        clients.factories.clone()
    }

    fn expand(&self, config: &DynamicValue) -> Result<Factory, Diagnostic> {
        let public_network_access = if config.boolean("public_network_enabled").unwrap_or(true) {
            PUBLIC_NETWORK_ENABLED
        } else {
            PUBLIC_NETWORK_DISABLED
        };

        Ok(Factory {
            id: None,
            name: None,
            location: config.string("location").map(|l| normalize_location(&l)),
            tags: config.string_map("tags"),
            identity: expand_identity(config),
            properties: FactoryProperties {
                repo_configuration: expand_repo(config),
                public_network_access: Some(public_network_access.to_string()),
                global_parameters: expand_global_parameters(config)?,
                purview_configuration: config.string("purview_id").map(|id| PurviewConfiguration {
                    purview_resource_id: Some(id),
                }),
                provisioning_state: None,
            },
        })
    }

    fn flatten(
        &self,
        id: &FactoryId,
        model: &Factory,
        _prior: &DynamicValue,
    ) -> Result<DynamicValue, Diagnostic> {
        flatten_factory(id, model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::testing::{create, delete, harness, read, update, validate, SUBSCRIPTION};
    use std::collections::HashMap;

    fn config() -> DynamicValue {
        let mut config = DynamicValue::object();
        config.insert("name", "acctestdf1");
        config.insert("resource_group_name", "acctestRG-df-1");
        config.insert("location", "West US");
        config
    }

    fn github() -> Dynamic {
        Dynamic::block(HashMap::from([
            ("account_name".to_string(), Dynamic::from("acctestGH")),
            ("branch_name".to_string(), Dynamic::from("main")),
            ("git_url".to_string(), Dynamic::from("https://github.com")),
            ("repository_name".to_string(), Dynamic::from("acctestRepo")),
            ("root_folder".to_string(), Dynamic::from("/")),
        ]))
    }

    #[tokio::test]
    async fn basic_factory_reads_back_normalized() {
        let (backend, factory) = harness(FactoryKind);

        let created = create(&factory, &config()).await;
        assert!(created.diagnostics.is_empty(), "{:?}", created.diagnostics);
        assert_eq!(
            created.new_state.string("id").as_deref(),
            Some(format!(
                "/subscriptions/{}/resourceGroups/acctestRG-df-1/providers/Microsoft.DataFactory/factories/acctestdf1",
                SUBSCRIPTION
            ))
            .as_deref()
        );

        let state = read(&factory, &created.new_state).await;
        let state = state.new_state.unwrap();
        assert_eq!(state.string("location").as_deref(), Some("westus"));
        assert_eq!(state.attr("github_configuration"), Some(&Dynamic::empty_list()));
        assert_eq!(state.attr("vsts_configuration"), Some(&Dynamic::empty_list()));
        assert_eq!(state.boolean("public_network_enabled"), Some(true));
        assert_eq!(state.string("id"), created.new_state.string("id"));
        assert_eq!(backend.factories.len(), 1);
    }

    #[tokio::test]
    async fn github_configuration_round_trips() {
        let (backend, factory) = harness(FactoryKind);
        let mut config = config();
        config.insert("github_configuration", github());

        let created = create(&factory, &config).await;
        assert!(created.diagnostics.is_empty(), "{:?}", created.diagnostics);

        let block = created.new_state.block("github_configuration").unwrap();
        assert_eq!(block.string("account_name").as_deref(), Some("acctestGH"));
        assert_eq!(block.string("git_url").as_deref(), Some("https://github.com"));
        assert_eq!(block.boolean("publishing_enabled"), Some(true));
        assert_eq!(
            created.new_state.attr("vsts_configuration"),
            Some(&Dynamic::empty_list())
        );

        let id = FactoryId::parse(&created.new_state.string("id").unwrap()).unwrap();
        let stored = backend.factories.entity(&id).unwrap();
        assert!(matches!(
            stored.properties.repo_configuration,
            Some(FactoryRepoConfiguration::GitHub(ref gh)) if gh.disable_publish == Some(false)
        ));
    }

    #[tokio::test]
    async fn repo_configurations_conflict() {
        let (backend, factory) = harness(FactoryKind);
        let mut config = config();
        config.insert("github_configuration", github());
        config.insert(
            "vsts_configuration",
            Dynamic::block(HashMap::from([
                ("account_name".to_string(), Dynamic::from("acct")),
                ("branch_name".to_string(), Dynamic::from("main")),
                ("project_name".to_string(), Dynamic::from("proj")),
                ("repository_name".to_string(), Dynamic::from("repo")),
                ("root_folder".to_string(), Dynamic::from("/")),
                ("tenant_id".to_string(), Dynamic::from("tenant")),
            ])),
        );

        let diagnostics = validate(&factory, &config).await;
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].summary, "Conflicting configuration arguments");
        assert_eq!(backend.factories.puts(), 0);
    }

    #[tokio::test]
    async fn invalid_names_are_rejected() {
        let (_backend, factory) = harness(FactoryKind);
        for name in ["ab", "double--dash", "-leading", "under_score"] {
            let mut config = config();
            config.insert("name", name);
            assert!(!validate(&factory, &config).await.is_empty(), "{}", name);
        }
    }

    #[tokio::test]
    async fn create_refuses_existing_factory() {
        let (backend, factory) = harness(FactoryKind);
        let id = FactoryId::new(SUBSCRIPTION, "acctestRG-df-1", "acctestdf1");
        backend.factories.insert(&id, Factory::default());

        let created = create(&factory, &config()).await;
        assert_eq!(created.diagnostics.len(), 1);
        assert_eq!(created.diagnostics[0].summary, "Resource already exists");
        assert!(created.diagnostics[0].detail.contains("azurerm_data_factory"));
        assert_eq!(backend.factories.puts(), 0);
    }

    #[tokio::test]
    async fn update_replaces_in_place() {
        let (backend, factory) = harness(FactoryKind);
        let created = create(&factory, &config()).await;

        let mut changed = config();
        changed.insert("public_network_enabled", false);
        changed.insert("tags", Dynamic::string_map([("env", "test")]));
        let updated = update(&factory, &created.new_state, &changed).await;
        assert!(updated.diagnostics.is_empty(), "{:?}", updated.diagnostics);
        assert_eq!(updated.new_state.boolean("public_network_enabled"), Some(false));
        assert_eq!(
            updated.new_state.string_map("tags").get("env").map(String::as_str),
            Some("test")
        );
        assert_eq!(backend.factories.len(), 1);
        assert_eq!(backend.factories.puts(), 2);
    }

    #[tokio::test]
    async fn delete_then_read_is_absent() {
        let (_backend, factory) = harness(FactoryKind);
        let created = create(&factory, &config()).await;

        assert!(delete(&factory, &created.new_state).await.is_empty());
        let read = read(&factory, &created.new_state).await;
        assert!(read.diagnostics.is_empty());
        assert!(read.new_state.is_none());

        // Deleting twice is still success
        assert!(delete(&factory, &created.new_state).await.is_empty());
    }

    #[tokio::test]
    async fn global_parameters_keep_json_values() {
        let (backend, factory) = harness(FactoryKind);
        let mut config = config();
        let param = |name: &str, kind: &str, value: &str| {
            Dynamic::Map(HashMap::from([
                ("name".to_string(), Dynamic::from(name)),
                ("type".to_string(), Dynamic::from(kind)),
                ("value".to_string(), Dynamic::from(value)),
            ]))
        };
        config.insert(
            "global_parameter",
            Dynamic::List(vec![
                param("arr", "Array", r#"["a","b"]"#),
                param("count", "Int", "12"),
            ]),
        );

        let created = create(&factory, &config).await;
        assert!(created.diagnostics.is_empty(), "{:?}", created.diagnostics);

        let id = FactoryId::new(SUBSCRIPTION, "acctestRG-df-1", "acctestdf1");
        let stored = backend.factories.entity(&id).unwrap();
        assert_eq!(
            stored.properties.global_parameters["arr"].value,
            serde_json::json!(["a", "b"])
        );

        let params = created.new_state.blocks("global_parameter");
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].string("value").as_deref(), Some(r#"["a","b"]"#));
        assert_eq!(params[1].string("value").as_deref(), Some("12"));
    }

    #[tokio::test]
    async fn invalid_array_parameter_fails_before_put() {
        let (backend, factory) = harness(FactoryKind);
        let mut config = config();
        config.insert(
            "global_parameter",
            Dynamic::List(vec![Dynamic::Map(HashMap::from([
                ("name".to_string(), Dynamic::from("arr")),
                ("type".to_string(), Dynamic::from("Array")),
                ("value".to_string(), Dynamic::from("not json")),
            ]))]),
        );

        let created = create(&factory, &config).await;
        assert_eq!(created.diagnostics[0].summary, "Invalid global parameter");
        assert_eq!(backend.factories.puts(), 0);
    }

    #[tokio::test]
    async fn identity_is_flattened() {
        let (_backend, factory) = harness(FactoryKind);
        let mut config = config();
        config.insert(
            "identity",
            Dynamic::block(HashMap::from([(
                "type".to_string(),
                Dynamic::from("SystemAssigned"),
            )])),
        );

        let created = create(&factory, &config).await;
        let identity = created.new_state.block("identity").unwrap();
        assert_eq!(identity.string("type").as_deref(), Some("SystemAssigned"));
        assert_eq!(identity.attr("identity_ids"), Some(&Dynamic::empty_list()));
    }
}

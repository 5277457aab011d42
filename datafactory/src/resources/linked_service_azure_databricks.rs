//! `azurerm_data_factory_linked_service_azure_databricks`

use super::common::{
    additional_properties_attribute, annotations_attribute, child_id, child_name_attribute,
    child_state, data_factory_id_attribute, description_attribute, expand_additional_properties,
    expand_annotations, expand_key_vault, expand_parameters, flatten_common, flatten_key_vault,
    id_attribute, key_vault_block, parameters_attribute, unsupported_variant,
};
use crate::api::models::common::{IntegrationRuntimeReference, SecretBase};
use crate::api::models::linked_service::{
    AzureDatabricksLinkedService, AzureDatabricksProperties, LinkedService, LinkedServiceResource,
};
use crate::api::{Clients, EntityApi};
use crate::ids::{ChildKind, FactoryChildId, IdParseError};
use crate::reconciler::ResourceKind;
use crate::sensitive::read_back;
use std::sync::Arc;
use tfplug::defaults::StaticDefault;
use tfplug::schema::{
    Attribute, AttributeBuilder, AttributeType, NestedBlock, NestedBlockBuilder, Schema,
    SchemaBuilder,
};
use tfplug::timeouts::timeouts_block;
use tfplug::types::{Diagnostic, Dynamic, DynamicValue};
use tfplug::validator::{EachElement, IntAtLeast, StringMatch, StringNotEmpty};

const MSI_AUTHENTICATION: &str = "MSI";

pub struct AzureDatabricksLinkedServiceKind;

fn optional_string(name: &str) -> Attribute {
    AttributeBuilder::new(name, AttributeType::String)
        .optional()
        .validator(StringNotEmpty::create())
        .build()
}

fn required_string(name: &str) -> Attribute {
    AttributeBuilder::new(name, AttributeType::String)
        .required()
        .validator(StringNotEmpty::create())
        .build()
}

fn min_workers() -> Attribute {
    AttributeBuilder::new("min_number_of_workers", AttributeType::Number)
        .optional()
        .default(StaticDefault::number(1.0))
        .validator(IntAtLeast::create(1))
        .build()
}

fn max_workers() -> Attribute {
    AttributeBuilder::new("max_number_of_workers", AttributeType::Number)
        .optional()
        .validator(IntAtLeast::create(1))
        .build()
}

fn new_cluster_block() -> NestedBlock {
    NestedBlockBuilder::new("new_cluster_config")
        .max_items(1)
        .attribute(required_string("node_type"))
        .attribute(required_string("cluster_version"))
        .attribute(min_workers())
        .attribute(max_workers())
        .attribute(optional_string("driver_node_type"))
        .attribute(optional_string("log_destination"))
        .attribute(
            AttributeBuilder::new("custom_tags", AttributeType::string_map())
                .optional()
                .build(),
        )
        .attribute(
            AttributeBuilder::new("init_scripts", AttributeType::string_list())
                .optional()
                .validator(EachElement::create(StringNotEmpty::create()))
                .build(),
        )
        .attribute(
            AttributeBuilder::new("spark_config", AttributeType::string_map())
                .optional()
                .build(),
        )
        .attribute(
            AttributeBuilder::new("spark_environment_variables", AttributeType::string_map())
                .optional()
                .build(),
        )
        .build()
}

fn instance_pool_block() -> NestedBlock {
    NestedBlockBuilder::new("instance_pool")
        .max_items(1)
        .attribute(required_string("instance_pool_id"))
        .attribute(required_string("cluster_version"))
        .attribute(min_workers())
        .attribute(max_workers())
        .build()
}

/// Worker counts travel as `"min"` or `"min:max"`
fn encode_workers(block: &DynamicValue) -> String {
    let min = block.int("min_number_of_workers").unwrap_or(1);
    match block.int("max_number_of_workers") {
        Some(max) if max > 0 => format!("{}:{}", min, max),
        _ => min.to_string(),
    }
}

fn decode_workers(raw: Option<&str>) -> (Option<i64>, Option<i64>) {
    let Some(raw) = raw else {
        return (None, None);
    };
    match raw.split_once(':') {
        Some((min, max)) => (min.trim().parse().ok(), max.trim().parse().ok()),
        None => (raw.trim().parse().ok(), None),
    }
}

fn expand_properties(config: &DynamicValue) -> AzureDatabricksProperties {
    let mut properties = AzureDatabricksProperties {
        domain: config.string("adb_domain").unwrap_or_default(),
        ..Default::default()
    };

    if let Some(workspace) = config.string("msi_work_space_resource_id") {
        properties.authentication = Some(MSI_AUTHENTICATION.to_string());
        properties.workspace_resource_id = Some(workspace);
    } else if let Some(token) = config.string("access_token") {
        properties.access_token = Some(SecretBase::secure_string(token));
    } else if let Some(key_vault) = config.block("key_vault_password") {
        properties.access_token = Some(expand_key_vault(&key_vault));
    }

    if let Some(cluster) = config.string("existing_cluster_id") {
        properties.existing_cluster_id = Some(cluster);
    } else if let Some(cluster) = config.block("new_cluster_config") {
        properties.new_cluster_node_type = cluster.string("node_type");
        properties.new_cluster_version = cluster.string("cluster_version");
        properties.new_cluster_num_of_worker = Some(encode_workers(&cluster));
        properties.new_cluster_driver_node_type = cluster.string("driver_node_type");
        properties.new_cluster_log_destination = cluster.string("log_destination");
        properties.new_cluster_init_scripts = cluster.string_list("init_scripts");
        properties.new_cluster_custom_tags = cluster.string_map("custom_tags");
        properties.new_cluster_spark_conf = cluster.string_map("spark_config");
        properties.new_cluster_spark_env_vars = cluster.string_map("spark_environment_variables");
    } else if let Some(pool) = config.block("instance_pool") {
        properties.instance_pool_id = pool.string("instance_pool_id");
        properties.new_cluster_version = pool.string("cluster_version");
        properties.new_cluster_num_of_worker = Some(encode_workers(&pool));
    }

    properties
}

fn flatten_compute(state: &mut DynamicValue, properties: &AzureDatabricksProperties) {
    let (min, max) = decode_workers(properties.new_cluster_num_of_worker.as_deref());

    state.insert("existing_cluster_id", properties.existing_cluster_id.clone());

    if let Some(pool_id) = &properties.instance_pool_id {
        let mut pool = DynamicValue::object();
        pool.insert("instance_pool_id", pool_id.as_str());
        pool.insert("cluster_version", properties.new_cluster_version.clone());
        pool.insert("min_number_of_workers", min);
        pool.insert("max_number_of_workers", max);
        state.insert("instance_pool", vec![pool]);
        state.insert("new_cluster_config", Dynamic::empty_list());
        return;
    }

    state.insert("instance_pool", Dynamic::empty_list());
    if properties.new_cluster_node_type.is_some() || properties.new_cluster_version.is_some() {
        let mut cluster = DynamicValue::object();
        cluster.insert("node_type", properties.new_cluster_node_type.clone());
        cluster.insert("cluster_version", properties.new_cluster_version.clone());
        cluster.insert("min_number_of_workers", min);
        cluster.insert("max_number_of_workers", max);
        cluster.insert(
            "driver_node_type",
            properties.new_cluster_driver_node_type.clone(),
        );
        cluster.insert(
            "log_destination",
            properties.new_cluster_log_destination.clone(),
        );
        cluster.insert(
            "custom_tags",
            Dynamic::string_map(properties.new_cluster_custom_tags.clone()),
        );
        cluster.insert(
            "init_scripts",
            Dynamic::string_list(properties.new_cluster_init_scripts.clone()),
        );
        cluster.insert(
            "spark_config",
            Dynamic::string_map(properties.new_cluster_spark_conf.clone()),
        );
        cluster.insert(
            "spark_environment_variables",
            Dynamic::string_map(properties.new_cluster_spark_env_vars.clone()),
        );
        state.insert("new_cluster_config", vec![cluster]);
    } else {
        state.insert("new_cluster_config", Dynamic::empty_list());
    }
}

fn flatten_authentication(
    state: &mut DynamicValue,
    properties: &AzureDatabricksProperties,
    prior: &DynamicValue,
) {
    let msi = properties.authentication.as_deref() == Some(MSI_AUTHENTICATION);
    state.insert(
        "msi_work_space_resource_id",
        properties
            .workspace_resource_id
            .clone()
            .filter(|_| msi),
    );
    state.insert(
        "key_vault_password",
        flatten_key_vault(properties.access_token.as_ref(), false),
    );

    // The service never returns inline tokens
    let access_token = match &properties.access_token {
        Some(SecretBase::AzureKeyVaultSecret(_)) => None,
        _ if msi => None,
        _ => read_back(prior, "access_token"),
    };
    state.insert("access_token", access_token);
}

impl ResourceKind for AzureDatabricksLinkedServiceKind {
    type Id = FactoryChildId;
    type Model = LinkedServiceResource;

    const TYPE_NAME: &'static str = "azurerm_data_factory_linked_service_azure_databricks";

    fn schema(&self) -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Manages a Linked Service (connection) between Azure Databricks and Azure Data Factory")
            .attribute(id_attribute())
            .attribute(child_name_attribute("linked service"))
            .attribute(data_factory_id_attribute())
            .attribute(
                AttributeBuilder::new("adb_domain", AttributeType::String)
                    .description("The domain URL of the databricks instance")
                    .required()
                    .validator(StringMatch::create(
                        r"^https://\S+$",
                        "adb_domain must be an https URL",
                    ))
                    .build(),
            )
            .attribute(description_attribute())
            .attribute(optional_string("integration_runtime_name"))
            .attribute(annotations_attribute())
            .attribute(parameters_attribute())
            .attribute(additional_properties_attribute())
            .attribute(optional_string("msi_work_space_resource_id"))
            .attribute(
                AttributeBuilder::new("access_token", AttributeType::String)
                    .optional()
                    .sensitive()
                    .validator(StringNotEmpty::create())
                    .build(),
            )
            .attribute(optional_string("existing_cluster_id"))
            .block(key_vault_block("key_vault_password", false))
            .block(new_cluster_block())
            .block(instance_pool_block())
            .block(timeouts_block())
            .exactly_one_of(&["msi_work_space_resource_id", "access_token", "key_vault_password"])
            .exactly_one_of(&["existing_cluster_id", "new_cluster_config", "instance_pool"])
            .build()
    }

    fn parse_id(&self, raw: &str) -> Result<FactoryChildId, IdParseError> {
        FactoryChildId::parse(raw, ChildKind::LinkedService)
    }

    fn id_from_config(
        &self,
        config: &DynamicValue,
        _subscription_id: &str,
    ) -> Result<FactoryChildId, Diagnostic> {
        child_id(config, ChildKind::LinkedService)
    }

    fn api(&self, clients: &Clients) -> Arc<dyn EntityApi<FactoryChildId, LinkedServiceResource>> {
        clients.linked_services.clone()
    }

    fn expand(&self, config: &DynamicValue) -> Result<LinkedServiceResource, Diagnostic> {
        Ok(LinkedServiceResource {
            id: None,
            name: None,
            properties: LinkedService::AzureDatabricks(AzureDatabricksLinkedService {
                connect_via: config
                    .string("integration_runtime_name")
                    .map(IntegrationRuntimeReference::new),
                description: config.string("description"),
                parameters: expand_parameters(config),
                annotations: expand_annotations(config),
                type_properties: expand_properties(config),
                additional_properties: expand_additional_properties(config),
            }),
        })
    }

    fn flatten(
        &self,
        id: &FactoryChildId,
        model: &LinkedServiceResource,
        prior: &DynamicValue,
    ) -> Result<DynamicValue, Diagnostic> {
        let LinkedService::AzureDatabricks(linked) = &model.properties else {
            return Err(unsupported_variant(
                id,
                "an AzureDatabricks linked service",
                "another linked service type",
            ));
        };

        let mut state = child_state(id);
        state.insert("adb_domain", linked.type_properties.domain.as_str());
        state.insert("description", linked.description.clone());
        state.insert(
            "integration_runtime_name",
            linked
                .connect_via
                .as_ref()
                .map(|r| r.reference_name.clone()),
        );
        flatten_common(
            &mut state,
            &linked.parameters,
            &linked.annotations,
            &linked.additional_properties,
        );
        flatten_authentication(&mut state, &linked.type_properties, prior);
        flatten_compute(&mut state, &linked.type_properties);
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::testing::{create, factory_id, harness, read, validate};
    use std::collections::HashMap;

    fn config() -> DynamicValue {
        let mut config = DynamicValue::object();
        config.insert("name", "acctestlsdbs");
        config.insert("data_factory_id", factory_id());
        config.insert("adb_domain", "https://adb-111111111.11.azuredatabricks.net");
        config
    }

    fn new_cluster(min: f64, max: Option<f64>) -> Dynamic {
        let mut fields = HashMap::from([
            ("node_type".to_string(), Dynamic::from("Standard_NC12")),
            ("cluster_version".to_string(), Dynamic::from("5.5.x-gpu-scala2.11")),
            ("min_number_of_workers".to_string(), Dynamic::Number(min)),
            (
                "spark_config".to_string(),
                Dynamic::string_map([("config1", "value1")]),
            ),
        ]);
        if let Some(max) = max {
            fields.insert("max_number_of_workers".to_string(), Dynamic::Number(max));
        }
        Dynamic::block(fields)
    }

    #[test]
    fn worker_counts_encode_as_range() {
        let mut block = DynamicValue::object();
        block.insert("min_number_of_workers", 1i64);
        assert_eq!(encode_workers(&block), "1");
        block.insert("max_number_of_workers", 5i64);
        assert_eq!(encode_workers(&block), "1:5");

        assert_eq!(decode_workers(Some("2:8")), (Some(2), Some(8)));
        assert_eq!(decode_workers(Some("3")), (Some(3), None));
        assert_eq!(decode_workers(None), (None, None));
    }

    #[tokio::test]
    async fn access_token_is_read_back_from_prior_state() {
        let (backend, linked) = harness(AzureDatabricksLinkedServiceKind);
        let mut config = config();
        config.insert("access_token", "dapi-secret");
        config.insert("existing_cluster_id", "0308-201146-sly615");
        config.insert("annotations", Dynamic::string_list(["test1", "test2"]));

        let created = create(&linked, &config).await;
        assert!(created.diagnostics.is_empty(), "{:?}", created.diagnostics);
        assert_eq!(
            created.new_state.string("access_token").as_deref(),
            Some("dapi-secret")
        );

        let id = FactoryChildId::parse(
            &created.new_state.string("id").unwrap(),
            ChildKind::LinkedService,
        )
        .unwrap();
        let stored = backend.linked_services.entity(&id).unwrap();
        let LinkedService::AzureDatabricks(body) = stored.properties else {
            panic!("expected a databricks linked service");
        };
        assert_eq!(
            body.type_properties.access_token,
            Some(SecretBase::secure_string("dapi-secret"))
        );

        let state = read(&linked, &created.new_state).await.new_state.unwrap();
        assert_eq!(state.string("access_token").as_deref(), Some("dapi-secret"));
        assert_eq!(
            state.string("existing_cluster_id").as_deref(),
            Some("0308-201146-sly615")
        );
        assert_eq!(state.string_list("annotations"), vec!["test1", "test2"]);
        assert_eq!(state.attr("key_vault_password"), Some(&Dynamic::empty_list()));
    }

    #[tokio::test]
    async fn msi_with_new_cluster_round_trips() {
        let (_backend, linked) = harness(AzureDatabricksLinkedServiceKind);
        let mut config = config();
        config.insert("msi_work_space_resource_id", "/subscriptions/s/workspace");
        config.insert("new_cluster_config", new_cluster(1.0, Some(5.0)));

        let created = create(&linked, &config).await;
        assert!(created.diagnostics.is_empty(), "{:?}", created.diagnostics);

        let state = created.new_state;
        assert_eq!(
            state.string("msi_work_space_resource_id").as_deref(),
            Some("/subscriptions/s/workspace")
        );
        assert_eq!(state.attr("access_token"), Some(&Dynamic::Null));
        let cluster = state.block("new_cluster_config").unwrap();
        assert_eq!(cluster.int("min_number_of_workers"), Some(1));
        assert_eq!(cluster.int("max_number_of_workers"), Some(5));
        assert_eq!(
            cluster.string_map("spark_config").get("config1").map(String::as_str),
            Some("value1")
        );
        assert_eq!(state.attr("instance_pool"), Some(&Dynamic::empty_list()));
    }

    #[tokio::test]
    async fn key_vault_token_is_flattened_as_block() {
        let (_backend, linked) = harness(AzureDatabricksLinkedServiceKind);
        let mut config = config();
        config.insert(
            "key_vault_password",
            Dynamic::block(HashMap::from([
                ("linked_service_name".to_string(), Dynamic::from("kvls")),
                ("secret_name".to_string(), Dynamic::from("token")),
            ])),
        );
        config.insert(
            "instance_pool",
            Dynamic::block(HashMap::from([
                ("instance_pool_id".to_string(), Dynamic::from("0308-pool")),
                ("cluster_version".to_string(), Dynamic::from("5.5.x-gpu-scala2.11")),
            ])),
        );

        let created = create(&linked, &config).await;
        assert!(created.diagnostics.is_empty(), "{:?}", created.diagnostics);

        let key_vault = created.new_state.block("key_vault_password").unwrap();
        assert_eq!(key_vault.string("linked_service_name").as_deref(), Some("kvls"));
        assert_eq!(key_vault.string("secret_name").as_deref(), Some("token"));

        let pool = created.new_state.block("instance_pool").unwrap();
        assert_eq!(pool.string("instance_pool_id").as_deref(), Some("0308-pool"));
        assert_eq!(pool.int("min_number_of_workers"), Some(1));
        assert_eq!(pool.attr("max_number_of_workers"), Some(&Dynamic::Null));
    }

    #[tokio::test]
    async fn authentication_members_are_exclusive() {
        let (backend, linked) = harness(AzureDatabricksLinkedServiceKind);
        let mut config = config();
        config.insert("access_token", "dapi-secret");
        config.insert("msi_work_space_resource_id", "/subscriptions/s/workspace");
        config.insert("existing_cluster_id", "0308-201146-sly615");

        let diagnostics = validate(&linked, &config).await;
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].detail.contains("only one of"));
        assert_eq!(backend.linked_services.puts(), 0);
    }

    #[tokio::test]
    async fn compute_is_required() {
        let (_backend, linked) = harness(AzureDatabricksLinkedServiceKind);
        let mut config = config();
        config.insert("access_token", "dapi-secret");

        let diagnostics = validate(&linked, &config).await;
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].detail.contains("existing_cluster_id"));
    }
}

//! `azurerm_data_factory_integration_runtime_azure_ssis`
//!
//! A managed runtime that hosts SSIS packages. Most of the configuration is
//! nested one level down, in `computeProperties` and `ssisProperties`, and
//! several secrets (catalog password, SAS token, component licenses, cmdkey
//! passwords) are write-only and have to be read back from prior state.

use super::common::{
    child_id, child_state, data_factory_id_attribute, description_attribute, expand_key_vault,
    flatten_key_vault, id_attribute, integration_runtime_name_attribute, key_vault_block,
    normalize_location, unsupported_variant,
};
use crate::api::models::common::{EntityReference, SecretBase};
use crate::api::models::integration_runtime::{
    AzPowerShellSetupProperties, CatalogInfo, CmdkeySetupProperties, ComponentSetupProperties,
    ComputeProperties, CopyComputeScale, CredentialReference, CustomSetup, CustomSetupScript,
    CustomerVirtualNetwork, DataProxyProperties, EnvironmentVariableSetupProperties,
    IntegrationRuntime, IntegrationRuntimeResource, ManagedIntegrationRuntime,
    ManagedIntegrationRuntimeProperties, PackageStore, PipelineExternalComputeScale,
    SsisProperties, VnetProperties,
};
use crate::api::{Clients, EntityApi};
use crate::ids::{ChildKind, FactoryChildId, IdParseError};
use crate::reconciler::ResourceKind;
use crate::sensitive::{read_back, read_back_matching};
use std::collections::BTreeMap;
use std::sync::Arc;
use tfplug::defaults::StaticDefault;
use tfplug::schema::{
    Attribute, AttributeBuilder, AttributeType, NestedBlock, NestedBlockBuilder, Schema,
    SchemaBuilder,
};
use tfplug::timeouts::timeouts_block;
use tfplug::types::{Diagnostic, Dynamic, DynamicValue};
use tfplug::validator::{
    IntAtLeast, IntBetween, IntDivisibleBy, ListLength, StringInSlice, StringNotEmpty, Validator,
};

const NODE_SIZES: &[&str] = &[
    "Standard_D2_v3",
    "Standard_D4_v3",
    "Standard_D8_v3",
    "Standard_D16_v3",
    "Standard_D32_v3",
    "Standard_D64_v3",
    "Standard_E2_v3",
    "Standard_E4_v3",
    "Standard_E8_v3",
    "Standard_E16_v3",
    "Standard_E32_v3",
    "Standard_E64_v3",
    "Standard_D1_v2",
    "Standard_D2_v2",
    "Standard_D3_v2",
    "Standard_D4_v2",
    "Standard_A4_v2",
    "Standard_A8_v2",
];

#[rustfmt::skip]
const CATALOG_PRICING_TIERS: &[&str] = &[
    "Basic",
    "S0", "S1", "S2", "S3", "S4", "S6", "S7", "S9", "S12",
    "P1", "P2", "P4", "P6", "P11", "P15",
    "GP_S_Gen5_1", "GP_S_Gen5_2", "GP_S_Gen5_4", "GP_S_Gen5_6", "GP_S_Gen5_8",
    "GP_S_Gen5_10", "GP_S_Gen5_12", "GP_S_Gen5_14", "GP_S_Gen5_16", "GP_S_Gen5_18",
    "GP_S_Gen5_20", "GP_S_Gen5_24", "GP_S_Gen5_32", "GP_S_Gen5_40",
    "GP_Gen5_2", "GP_Gen5_4", "GP_Gen5_6", "GP_Gen5_8", "GP_Gen5_10", "GP_Gen5_12",
    "GP_Gen5_14", "GP_Gen5_16", "GP_Gen5_18", "GP_Gen5_20", "GP_Gen5_24", "GP_Gen5_32",
    "GP_Gen5_40", "GP_Gen5_80",
    "BC_Gen5_2", "BC_Gen5_4", "BC_Gen5_6", "BC_Gen5_8", "BC_Gen5_10", "BC_Gen5_12",
    "BC_Gen5_14", "BC_Gen5_16", "BC_Gen5_18", "BC_Gen5_20", "BC_Gen5_24", "BC_Gen5_32",
    "BC_Gen5_40", "BC_Gen5_80",
    "HS_Gen5_2", "HS_Gen5_4", "HS_Gen5_6", "HS_Gen5_8", "HS_Gen5_10", "HS_Gen5_12",
    "HS_Gen5_14", "HS_Gen5_16", "HS_Gen5_18", "HS_Gen5_20", "HS_Gen5_24", "HS_Gen5_32",
    "HS_Gen5_40", "HS_Gen5_80",
];

const EXPRESS_SETUP_MEMBERS: &[&str] =
    &["environment", "powershell_version", "component", "command_key"];

pub struct AzureSsisIntegrationRuntimeKind;

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

fn sensitive_string(name: &str, required: bool) -> Attribute {
    let builder = AttributeBuilder::new(name, AttributeType::String);
    let builder = if required {
        builder.required()
    } else {
        builder.optional()
    };
    builder
        .sensitive()
        .validator(StringNotEmpty::create())
        .build()
}

fn optional_number(name: &str, validators: Vec<Box<dyn Validator>>) -> Attribute {
    let mut builder = AttributeBuilder::new(name, AttributeType::Number).optional();
    for validator in validators {
        builder = builder.validator(validator);
    }
    builder.build()
}

fn copy_compute_scale_block() -> NestedBlock {
    NestedBlockBuilder::new("copy_compute_scale")
        .max_items(1)
        .attribute(optional_number(
            "data_integration_unit",
            vec![IntBetween::create(4, 256), IntDivisibleBy::create(4)],
        ))
        .attribute(optional_number("time_to_live", vec![IntAtLeast::create(5)]))
        .build()
}

fn pipeline_external_compute_scale_block() -> NestedBlock {
    NestedBlockBuilder::new("pipeline_external_compute_scale")
        .max_items(1)
        .attribute(optional_number(
            "number_of_external_nodes",
            vec![IntBetween::create(1, 10)],
        ))
        .attribute(optional_number(
            "number_of_pipeline_nodes",
            vec![IntBetween::create(1, 10)],
        ))
        .attribute(optional_number("time_to_live", vec![IntAtLeast::create(5)]))
        .build()
}

fn vnet_integration_block() -> NestedBlock {
    NestedBlockBuilder::new("vnet_integration")
        .max_items(1)
        .attribute(optional_string("vnet_id"))
        .attribute(optional_string("subnet_id"))
        .attribute(optional_string("subnet_name"))
        .attribute(
            AttributeBuilder::new("public_ips", AttributeType::string_list())
                .optional()
                .validator(ListLength::exactly(2))
                .build(),
        )
        .exactly_one_of(&["vnet_id", "subnet_id"])
        .required_with("subnet_name", &["vnet_id"])
        .build()
}

fn catalog_info_block() -> NestedBlock {
    NestedBlockBuilder::new("catalog_info")
        .max_items(1)
        .attribute(required_string("server_endpoint"))
        .attribute(optional_string("administrator_login"))
        .attribute(sensitive_string("administrator_password", false))
        .attribute(
            AttributeBuilder::new("pricing_tier", AttributeType::String)
                .optional()
                .validator(StringInSlice::create(CATALOG_PRICING_TIERS))
                .build(),
        )
        .attribute(optional_string("elastic_pool_name"))
        .attribute(optional_string("dual_standby_pair_name"))
        .conflicting(&["pricing_tier", "elastic_pool_name"])
        .build()
}

fn express_custom_setup_block() -> NestedBlock {
    NestedBlockBuilder::new("express_custom_setup")
        .max_items(1)
        .attribute(
            AttributeBuilder::new("environment", AttributeType::string_map())
                .optional()
                .build(),
        )
        .attribute(optional_string("powershell_version"))
        .block(
            NestedBlockBuilder::new("command_key")
                .attribute(required_string("target_name"))
                .attribute(required_string("user_name"))
                .attribute(sensitive_string("password", false))
                .block(key_vault_block("key_vault_password", true))
                .build(),
        )
        .block(
            NestedBlockBuilder::new("component")
                .attribute(required_string("name"))
                .attribute(sensitive_string("license", false))
                .block(key_vault_block("key_vault_license", true))
                .build(),
        )
        .at_least_one_of(EXPRESS_SETUP_MEMBERS)
        .build()
}

fn format_elastic_pool(name: &str) -> String {
    format!("ELASTIC_POOL(name=\"{}\")", name)
}

/// Pool name out of a pricing tier of the form `ELASTIC_POOL(name="...")`
fn parse_elastic_pool(tier: &str) -> Option<&str> {
    tier.strip_prefix("ELASTIC_POOL(name=\"")
        .and_then(|rest| rest.strip_suffix("\")"))
        .filter(|name| !name.is_empty())
}

/// Inline value when set, otherwise the Key Vault reference
fn expand_secret(item: &DynamicValue, inline: &str, key_vault: &str) -> Option<SecretBase> {
    item.string(inline)
        .map(SecretBase::secure_string)
        .or_else(|| item.block(key_vault).map(|block| expand_key_vault(&block)))
}

fn non_zero(block: &DynamicValue, name: &str) -> Option<i64> {
    block.int(name).filter(|v| *v != 0)
}

fn expand_compute(config: &DynamicValue) -> ComputeProperties {
    let mut compute = ComputeProperties {
        location: config.string("location").map(|l| normalize_location(&l)),
        node_size: config.string("node_size"),
        number_of_nodes: config.int("number_of_nodes"),
        max_parallel_executions_per_node: config.int("max_parallel_executions_per_node"),
        ..Default::default()
    };

    if let Some(vnet) = config.block("vnet_integration") {
        let mut properties = match vnet.string("subnet_id") {
            Some(subnet_id) => VnetProperties {
                subnet_id: Some(subnet_id),
                ..Default::default()
            },
            None => VnetProperties {
                vnet_id: vnet.string("vnet_id"),
                subnet: vnet.string("subnet_name"),
                ..Default::default()
            },
        };
        properties.public_ips = vnet.string_list("public_ips");
        compute.vnet_properties = Some(properties);
    }

    if let Some(scale) = config.block("copy_compute_scale") {
        let scale = CopyComputeScale {
            data_integration_unit: non_zero(&scale, "data_integration_unit"),
            time_to_live: non_zero(&scale, "time_to_live"),
        };
        if scale != CopyComputeScale::default() {
            compute.copy_compute_scale_properties = Some(scale);
        }
    }

    if let Some(scale) = config.block("pipeline_external_compute_scale") {
        let scale = PipelineExternalComputeScale {
            time_to_live: non_zero(&scale, "time_to_live"),
            number_of_pipeline_nodes: non_zero(&scale, "number_of_pipeline_nodes"),
            number_of_external_nodes: non_zero(&scale, "number_of_external_nodes"),
        };
        if scale != PipelineExternalComputeScale::default() {
            compute.pipeline_external_compute_scale_properties = Some(scale);
        }
    }

    compute
}

fn expand_catalog(catalog: &DynamicValue) -> CatalogInfo {
    // elastic_pool_name and pricing_tier share catalogPricingTier on the wire
    let pricing_tier = match catalog.string("elastic_pool_name") {
        Some(pool) => Some(format_elastic_pool(&pool)),
        None => catalog.string("pricing_tier"),
    };
    CatalogInfo {
        catalog_server_endpoint: catalog.string("server_endpoint"),
        catalog_admin_user_name: catalog.string("administrator_login"),
        catalog_admin_password: catalog
            .string("administrator_password")
            .map(SecretBase::secure_string),
        catalog_pricing_tier: pricing_tier,
        dual_standby_pair_name: catalog.string("dual_standby_pair_name"),
    }
}

/// Steps are emitted as environment, PowerShell, components, then cmdkeys
fn expand_express_setup(setup: &DynamicValue) -> Vec<CustomSetup> {
    let mut steps = Vec::new();

    for (variable_name, variable_value) in setup.string_map("environment") {
        steps.push(CustomSetup::EnvironmentVariableSetup {
            type_properties: EnvironmentVariableSetupProperties {
                variable_name,
                variable_value,
            },
        });
    }

    if let Some(version) = setup.string("powershell_version") {
        steps.push(CustomSetup::AzPowerShellSetup {
            type_properties: AzPowerShellSetupProperties { version },
        });
    }

    for component in setup.blocks("component") {
        steps.push(CustomSetup::ComponentSetup {
            type_properties: ComponentSetupProperties {
                component_name: component.string("name").unwrap_or_default(),
                license_key: expand_secret(&component, "license", "key_vault_license"),
            },
        });
    }

    for key in setup.blocks("command_key") {
        steps.push(CustomSetup::CmdkeySetup {
            type_properties: CmdkeySetupProperties {
                target_name: key.string("target_name").unwrap_or_default(),
                user_name: key.string("user_name").unwrap_or_default(),
                password: expand_secret(&key, "password", "key_vault_password"),
            },
        });
    }

    steps
}

fn expand_ssis(config: &DynamicValue) -> SsisProperties {
    SsisProperties {
        catalog_info: config.block("catalog_info").map(|c| expand_catalog(&c)),
        license_type: config.string("license_type"),
        custom_setup_script_properties: config.block("custom_setup_script").map(|script| {
            CustomSetupScript {
                blob_container_uri: script.string("blob_container_uri").unwrap_or_default(),
                sas_token: script.string("sas_token").map(SecretBase::secure_string),
            }
        }),
        data_proxy_properties: config.block("proxy").map(|proxy| DataProxyProperties {
            connect_via: proxy
                .string("self_hosted_integration_runtime_name")
                .map(EntityReference::integration_runtime),
            staging_linked_service: proxy
                .string("staging_storage_linked_service_name")
                .map(EntityReference::linked_service),
            path: proxy.string("path"),
        }),
        edition: config.string("edition"),
        express_custom_setup_properties: config
            .block("express_custom_setup")
            .map(|setup| expand_express_setup(&setup))
            .unwrap_or_default(),
        package_stores: config
            .blocks("package_store")
            .iter()
            .map(|store| PackageStore {
                name: store.string("name").unwrap_or_default(),
                package_store_linked_service: EntityReference::linked_service(
                    store.string("linked_service_name").unwrap_or_default(),
                ),
            })
            .collect(),
        credential: config.string("credential_name").map(CredentialReference::new),
    }
}

fn flatten_compute(state: &mut DynamicValue, compute: Option<&ComputeProperties>) {
    let empty = ComputeProperties::default();
    let compute = compute.unwrap_or(&empty);

    state.insert(
        "location",
        compute.location.as_deref().map(normalize_location),
    );
    state.insert("node_size", compute.node_size.clone());
    state.insert("number_of_nodes", compute.number_of_nodes);
    state.insert(
        "max_parallel_executions_per_node",
        compute.max_parallel_executions_per_node,
    );

    let vnet = match &compute.vnet_properties {
        Some(vnet) => {
            let mut block = DynamicValue::object();
            block.insert("vnet_id", vnet.vnet_id.clone());
            block.insert("subnet_id", vnet.subnet_id.clone());
            block.insert("subnet_name", vnet.subnet.clone());
            block.insert("public_ips", Dynamic::string_list(vnet.public_ips.clone()));
            vec![block].into()
        }
        None => Dynamic::empty_list(),
    };
    state.insert("vnet_integration", vnet);

    let copy_scale = match &compute.copy_compute_scale_properties {
        Some(scale) => {
            let mut block = DynamicValue::object();
            block.insert("data_integration_unit", scale.data_integration_unit);
            block.insert("time_to_live", scale.time_to_live);
            vec![block].into()
        }
        None => Dynamic::empty_list(),
    };
    state.insert("copy_compute_scale", copy_scale);

    let pipeline_scale = match &compute.pipeline_external_compute_scale_properties {
        Some(scale) => {
            let mut block = DynamicValue::object();
            block.insert("number_of_external_nodes", scale.number_of_external_nodes);
            block.insert("number_of_pipeline_nodes", scale.number_of_pipeline_nodes);
            block.insert("time_to_live", scale.time_to_live);
            vec![block].into()
        }
        None => Dynamic::empty_list(),
    };
    state.insert("pipeline_external_compute_scale", pipeline_scale);
}

fn flatten_catalog(catalog: Option<&CatalogInfo>, prior: &DynamicValue) -> Dynamic {
    let Some(catalog) = catalog else {
        return Dynamic::empty_list();
    };

    let tier = catalog.catalog_pricing_tier.as_deref();
    let elastic_pool_name = tier.and_then(parse_elastic_pool);
    let pricing_tier = tier.filter(|_| elastic_pool_name.is_none());

    let mut block = DynamicValue::object();
    block.insert("server_endpoint", catalog.catalog_server_endpoint.clone());
    block.insert("administrator_login", catalog.catalog_admin_user_name.clone());
    block.insert(
        "administrator_password",
        read_back(prior, "catalog_info.0.administrator_password"),
    );
    block.insert("pricing_tier", pricing_tier);
    block.insert("elastic_pool_name", elastic_pool_name);
    block.insert("dual_standby_pair_name", catalog.dual_standby_pair_name.clone());
    vec![block].into()
}

fn flatten_express_setup(steps: &[CustomSetup], prior: &DynamicValue) -> Dynamic {
    if steps.is_empty() {
        return Dynamic::empty_list();
    }

    let prior_setup = prior.block("express_custom_setup");
    let prior_components = prior_setup
        .as_ref()
        .map(|setup| setup.blocks("component"))
        .unwrap_or_default();
    let prior_keys = prior_setup
        .as_ref()
        .map(|setup| setup.blocks("command_key"))
        .unwrap_or_default();

    let mut environment = BTreeMap::new();
    let mut powershell_version = None;
    let mut components = Vec::new();
    let mut command_keys = Vec::new();

    for step in steps {
        match step {
            CustomSetup::EnvironmentVariableSetup { type_properties } => {
                environment.insert(
                    type_properties.variable_name.clone(),
                    type_properties.variable_value.clone(),
                );
            }
            CustomSetup::AzPowerShellSetup { type_properties } => {
                powershell_version = Some(type_properties.version.clone());
            }
            CustomSetup::ComponentSetup { type_properties } => {
                let name = type_properties.component_name.as_str();
                let mut component = DynamicValue::object();
                component.insert("name", name);
                component.insert(
                    "license",
                    read_back_matching(&prior_components, "license", &[("name", name)]),
                );
                component.insert(
                    "key_vault_license",
                    flatten_key_vault(type_properties.license_key.as_ref(), true),
                );
                components.push(component);
            }
            CustomSetup::CmdkeySetup { type_properties } => {
                let target_name = type_properties.target_name.as_str();
                let user_name = type_properties.user_name.as_str();
                let mut key = DynamicValue::object();
                key.insert("target_name", target_name);
                key.insert("user_name", user_name);
                key.insert(
                    "password",
                    read_back_matching(
                        &prior_keys,
                        "password",
                        &[("target_name", target_name), ("user_name", user_name)],
                    ),
                );
                key.insert(
                    "key_vault_password",
                    flatten_key_vault(type_properties.password.as_ref(), true),
                );
                command_keys.push(key);
            }
            CustomSetup::Unsupported => {
                tracing::warn!("skipping express custom setup step of an unsupported type");
            }
        }
    }

    let mut block = DynamicValue::object();
    block.insert("environment", Dynamic::string_map(environment));
    block.insert("powershell_version", powershell_version);
    block.insert("component", components);
    block.insert("command_key", command_keys);
    vec![block].into()
}

fn flatten_ssis(state: &mut DynamicValue, ssis: Option<&SsisProperties>, prior: &DynamicValue) {
    let empty = SsisProperties::default();
    let ssis = ssis.unwrap_or(&empty);

    state.insert("edition", ssis.edition.clone());
    state.insert("license_type", ssis.license_type.clone());
    state.insert(
        "credential_name",
        ssis.credential.as_ref().map(|c| c.reference_name.clone()),
    );
    state.insert("catalog_info", flatten_catalog(ssis.catalog_info.as_ref(), prior));

    let script = match &ssis.custom_setup_script_properties {
        Some(script) => {
            let mut block = DynamicValue::object();
            block.insert("blob_container_uri", script.blob_container_uri.as_str());
            block.insert("sas_token", read_back(prior, "custom_setup_script.0.sas_token"));
            vec![block].into()
        }
        None => Dynamic::empty_list(),
    };
    state.insert("custom_setup_script", script);

    state.insert(
        "express_custom_setup",
        flatten_express_setup(&ssis.express_custom_setup_properties, prior),
    );

    let stores: Vec<DynamicValue> = ssis
        .package_stores
        .iter()
        .map(|store| {
            let mut block = DynamicValue::object();
            block.insert("name", store.name.as_str());
            block.insert(
                "linked_service_name",
                store.package_store_linked_service.reference_name.clone(),
            );
            block
        })
        .collect();
    state.insert("package_store", stores);

    let proxy = match &ssis.data_proxy_properties {
        Some(proxy) => {
            let mut block = DynamicValue::object();
            block.insert(
                "self_hosted_integration_runtime_name",
                proxy
                    .connect_via
                    .as_ref()
                    .and_then(|r| r.reference_name.clone()),
            );
            block.insert(
                "staging_storage_linked_service_name",
                proxy
                    .staging_linked_service
                    .as_ref()
                    .and_then(|r| r.reference_name.clone()),
            );
            block.insert("path", proxy.path.clone());
            vec![block].into()
        }
        None => Dynamic::empty_list(),
    };
    state.insert("proxy", proxy);
}

impl ResourceKind for AzureSsisIntegrationRuntimeKind {
    type Id = FactoryChildId;
    type Model = IntegrationRuntimeResource;

    const TYPE_NAME: &'static str = "azurerm_data_factory_integration_runtime_azure_ssis";

    fn schema(&self) -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Manages a Data Factory Azure-SSIS Integration Runtime")
            .attribute(id_attribute())
            .attribute(integration_runtime_name_attribute())
            .attribute(data_factory_id_attribute())
            .attribute(description_attribute())
            .attribute(required_string("location"))
            .attribute(
                AttributeBuilder::new("node_size", AttributeType::String)
                    .required()
                    .validator(StringInSlice::create(NODE_SIZES))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("number_of_nodes", AttributeType::Number)
                    .optional()
                    .default(StaticDefault::number(1.0))
                    .validator(IntBetween::create(1, 10))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("max_parallel_executions_per_node", AttributeType::Number)
                    .optional()
                    .default(StaticDefault::number(1.0))
                    .validator(IntBetween::create(1, 16))
                    .build(),
            )
            .attribute(optional_string("credential_name"))
            .attribute(
                AttributeBuilder::new("edition", AttributeType::String)
                    .optional()
                    .default(StaticDefault::string("Standard"))
                    .validator(StringInSlice::create(&["Standard", "Enterprise"]))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("license_type", AttributeType::String)
                    .optional()
                    .default(StaticDefault::string("LicenseIncluded"))
                    .validator(StringInSlice::create(&["LicenseIncluded", "BasePrice"]))
                    .build(),
            )
            .block(copy_compute_scale_block())
            .block(
                NestedBlockBuilder::new("express_vnet_integration")
                    .max_items(1)
                    .attribute(required_string("subnet_id"))
                    .build(),
            )
            .block(vnet_integration_block())
            .block(
                NestedBlockBuilder::new("custom_setup_script")
                    .max_items(1)
                    .attribute(required_string("blob_container_uri"))
                    .attribute(sensitive_string("sas_token", true))
                    .build(),
            )
            .block(catalog_info_block())
            .block(express_custom_setup_block())
            .block(
                NestedBlockBuilder::new("package_store")
                    .attribute(required_string("name"))
                    .attribute(required_string("linked_service_name"))
                    .build(),
            )
            .block(pipeline_external_compute_scale_block())
            .block(
                NestedBlockBuilder::new("proxy")
                    .max_items(1)
                    .attribute(required_string("self_hosted_integration_runtime_name"))
                    .attribute(required_string("staging_storage_linked_service_name"))
                    .attribute(optional_string("path"))
                    .build(),
            )
            .block(timeouts_block())
            .build()
    }

    fn parse_id(&self, raw: &str) -> Result<FactoryChildId, IdParseError> {
        FactoryChildId::parse(raw, ChildKind::IntegrationRuntime)
    }

    fn id_from_config(
        &self,
        config: &DynamicValue,
        _subscription_id: &str,
    ) -> Result<FactoryChildId, Diagnostic> {
        child_id(config, ChildKind::IntegrationRuntime)
    }

    fn api(
        &self,
        clients: &Clients,
    ) -> Arc<dyn EntityApi<FactoryChildId, IntegrationRuntimeResource>> {
        clients.integration_runtimes.clone()
    }

    fn expand(&self, config: &DynamicValue) -> Result<IntegrationRuntimeResource, Diagnostic> {
        let customer_virtual_network = config
            .block("express_vnet_integration")
            .and_then(|vnet| vnet.string("subnet_id"))
            .map(|subnet_id| CustomerVirtualNetwork { subnet_id });

        Ok(IntegrationRuntimeResource {
            id: None,
            name: None,
            properties: IntegrationRuntime::Managed(ManagedIntegrationRuntime {
                description: config.string("description"),
                state: None,
                type_properties: ManagedIntegrationRuntimeProperties {
                    compute_properties: Some(expand_compute(config)),
                    ssis_properties: Some(expand_ssis(config)),
                    customer_virtual_network,
                },
            }),
        })
    }

    fn flatten(
        &self,
        id: &FactoryChildId,
        model: &IntegrationRuntimeResource,
        prior: &DynamicValue,
    ) -> Result<DynamicValue, Diagnostic> {
        let IntegrationRuntime::Managed(runtime) = &model.properties else {
            return Err(unsupported_variant(
                id,
                "a Managed integration runtime",
                model.properties.kind(),
            ));
        };
        let properties = &runtime.type_properties;

        let mut state = child_state(id);
        state.insert("description", runtime.description.clone());
        flatten_compute(&mut state, properties.compute_properties.as_ref());
        flatten_ssis(&mut state, properties.ssis_properties.as_ref(), prior);

        let express_vnet = match &properties.customer_virtual_network {
            Some(network) => {
                let mut block = DynamicValue::object();
                block.insert("subnet_id", network.subnet_id.as_str());
                vec![block].into()
            }
            None => Dynamic::empty_list(),
        };
        state.insert("express_vnet_integration", express_vnet);
        Ok(state)
    }
}

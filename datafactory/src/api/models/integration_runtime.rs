//! Integration runtime models

use super::common::{EntityReference, SecretBase};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationRuntimeResource {
    #[serde(skip_serializing, default)]
    pub id: Option<String>,
    #[serde(skip_serializing, default)]
    pub name: Option<String>,
    pub properties: IntegrationRuntime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum IntegrationRuntime {
    Managed(ManagedIntegrationRuntime),
    SelfHosted(SelfHostedIntegrationRuntime),
    #[serde(other)]
    Unsupported,
}

impl IntegrationRuntime {
    pub fn kind(&self) -> &'static str {
        match self {
            IntegrationRuntime::Managed(_) => "Managed",
            IntegrationRuntime::SelfHosted(_) => "SelfHosted",
            IntegrationRuntime::Unsupported => "unsupported",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedIntegrationRuntime {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing, default)]
    pub state: Option<String>,
    #[serde(default)]
    pub type_properties: ManagedIntegrationRuntimeProperties,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedIntegrationRuntimeProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compute_properties: Option<ComputeProperties>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssis_properties: Option<SsisProperties>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_virtual_network: Option<CustomerVirtualNetwork>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_nodes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_parallel_executions_per_node: Option<i64>,
    #[serde(rename = "vNetProperties", skip_serializing_if = "Option::is_none")]
    pub vnet_properties: Option<VnetProperties>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copy_compute_scale_properties: Option<CopyComputeScale>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipeline_external_compute_scale_properties: Option<PipelineExternalComputeScale>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VnetProperties {
    #[serde(rename = "vNetId", skip_serializing_if = "Option::is_none")]
    pub vnet_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet: Option<String>,
    #[serde(rename = "subnetId", skip_serializing_if = "Option::is_none")]
    pub subnet_id: Option<String>,
    #[serde(rename = "publicIPs", default, skip_serializing_if = "Vec::is_empty")]
    pub public_ips: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyComputeScale {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_integration_unit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_to_live: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineExternalComputeScale {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_to_live: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_pipeline_nodes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_external_nodes: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SsisProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_info: Option<CatalogInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_setup_script_properties: Option<CustomSetupScript>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_proxy_properties: Option<DataProxyProperties>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edition: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub express_custom_setup_properties: Vec<CustomSetup>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub package_stores: Vec<PackageStore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential: Option<CredentialReference>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_server_endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_admin_user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_admin_password: Option<SecretBase>,
    /// Service tier, or `ELASTIC_POOL(name="...")` for an elastic pool
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_pricing_tier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dual_standby_pair_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomSetupScript {
    pub blob_container_uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sas_token: Option<SecretBase>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataProxyProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect_via: Option<EntityReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staging_linked_service: Option<EntityReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageStore {
    pub name: String,
    pub package_store_linked_service: EntityReference,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialReference {
    #[serde(rename = "type")]
    pub reference_type: String,
    pub reference_name: String,
}

impl CredentialReference {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            reference_type: "CredentialReference".to_string(),
            reference_name: name.into(),
        }
    }
}

/// One express custom setup step, discriminated by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CustomSetup {
    CmdkeySetup {
        #[serde(rename = "typeProperties")]
        type_properties: CmdkeySetupProperties,
    },
    EnvironmentVariableSetup {
        #[serde(rename = "typeProperties")]
        type_properties: EnvironmentVariableSetupProperties,
    },
    ComponentSetup {
        #[serde(rename = "typeProperties")]
        type_properties: ComponentSetupProperties,
    },
    AzPowerShellSetup {
        #[serde(rename = "typeProperties")]
        type_properties: AzPowerShellSetupProperties,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CmdkeySetupProperties {
    pub target_name: String,
    pub user_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<SecretBase>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentVariableSetupProperties {
    pub variable_name: String,
    pub variable_value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSetupProperties {
    pub component_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_key: Option<SecretBase>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AzPowerShellSetupProperties {
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerVirtualNetwork {
    pub subnet_id: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfHostedIntegrationRuntime {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "SelfHostedProperties::is_empty")]
    pub type_properties: SelfHostedProperties,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfHostedProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_info: Option<LinkedIntegrationRuntime>,
}

impl SelfHostedProperties {
    fn is_empty(&self) -> bool {
        self.linked_info.is_none()
    }
}

/// Link to a runtime shared from another factory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "authorizationType")]
pub enum LinkedIntegrationRuntime {
    #[serde(rename = "RBAC", rename_all = "camelCase")]
    Rbac { resource_id: String },
    #[serde(other)]
    Unsupported,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn custom_setup_steps_nest_type_properties() {
        let steps = vec![
            CustomSetup::EnvironmentVariableSetup {
                type_properties: EnvironmentVariableSetupProperties {
                    variable_name: "Env".to_string(),
                    variable_value: "test".to_string(),
                },
            },
            CustomSetup::AzPowerShellSetup {
                type_properties: AzPowerShellSetupProperties {
                    version: "1.1.0".to_string(),
                },
            },
        ];
        assert_eq!(
            serde_json::to_value(&steps).unwrap(),
            json!([
                {"type": "EnvironmentVariableSetup", "typeProperties": {"variableName": "Env", "variableValue": "test"}},
                {"type": "AzPowerShellSetup", "typeProperties": {"version": "1.1.0"}}
            ])
        );
    }

    #[test]
    fn self_hosted_rbac_link_decodes() {
        let raw = json!({
            "properties": {
                "type": "SelfHosted",
                "typeProperties": {
                    "linkedInfo": {"authorizationType": "RBAC", "resourceId": "/shared/ir"}
                }
            }
        });
        let resource: IntegrationRuntimeResource = serde_json::from_value(raw).unwrap();
        match resource.properties {
            IntegrationRuntime::SelfHosted(runtime) => assert_eq!(
                runtime.type_properties.linked_info,
                Some(LinkedIntegrationRuntime::Rbac {
                    resource_id: "/shared/ir".to_string()
                })
            ),
            other => panic!("expected self-hosted runtime, got {}", other.kind()),
        }
    }

    #[test]
    fn managed_runtime_state_is_read_only() {
        let runtime = IntegrationRuntime::Managed(ManagedIntegrationRuntime {
            state: Some("Started".to_string()),
            ..Default::default()
        });
        let body = serde_json::to_value(&runtime).unwrap();
        assert_eq!(body, json!({"type": "Managed", "typeProperties": {}}));
    }
}

//! Linked service models

use super::common::{IntegrationRuntimeReference, ParameterSpecification, SecretBase};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedServiceResource {
    #[serde(skip_serializing, default)]
    pub id: Option<String>,
    #[serde(skip_serializing, default)]
    pub name: Option<String>,
    pub properties: LinkedService,
}

/// Linked service body, discriminated by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LinkedService {
    AzureDatabricks(AzureDatabricksLinkedService),
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureDatabricksLinkedService {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect_via: Option<IntegrationRuntimeReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, ParameterSpecification>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Value>,
    pub type_properties: AzureDatabricksProperties,
    /// Properties outside the typed model travel at the top level
    #[serde(flatten)]
    pub additional_properties: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureDatabricksProperties {
    pub domain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<SecretBase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_resource_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_cluster_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_pool_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_cluster_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_cluster_num_of_worker: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_cluster_node_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_cluster_driver_node_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_cluster_log_destination: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub new_cluster_init_scripts: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub new_cluster_custom_tags: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub new_cluster_spark_conf: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub new_cluster_spark_env_vars: BTreeMap<String, String>,
}

//! Factory (top-level account) model

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Factory {
    #[serde(skip_serializing, default)]
    pub id: Option<String>,
    #[serde(skip_serializing, default)]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<FactoryIdentity>,
    #[serde(default)]
    pub properties: FactoryProperties,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactoryIdentity {
    #[serde(rename = "type")]
    pub identity_type: String,
    #[serde(skip_serializing, default)]
    pub principal_id: Option<String>,
    #[serde(skip_serializing, default)]
    pub tenant_id: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub user_assigned_identities: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactoryProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_configuration: Option<FactoryRepoConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_network_access: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub global_parameters: BTreeMap<String, GlobalParameterSpecification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purview_configuration: Option<PurviewConfiguration>,
    #[serde(skip_serializing, default)]
    pub provisioning_state: Option<String>,
}

/// Source control binding, discriminated by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FactoryRepoConfiguration {
    #[serde(rename = "FactoryVSTSConfiguration")]
    Vsts(FactoryVstsConfiguration),
    #[serde(rename = "FactoryGitHubConfiguration")]
    GitHub(FactoryGitHubConfiguration),
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactoryVstsConfiguration {
    pub account_name: String,
    pub repository_name: String,
    pub collaboration_branch: String,
    pub root_folder: String,
    pub project_name: String,
    pub tenant_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_commit_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_publish: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactoryGitHubConfiguration {
    pub account_name: String,
    pub repository_name: String,
    pub collaboration_branch: String,
    pub root_folder: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_commit_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_publish: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalParameterSpecification {
    #[serde(rename = "type")]
    pub parameter_type: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurviewConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purview_resource_id: Option<String>,
}

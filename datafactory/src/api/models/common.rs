//! Shared reference and secret types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Error envelope returned by the management API
#[derive(Debug, Deserialize)]
pub struct ArmErrorResponse {
    pub error: ArmErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ArmErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedServiceReference {
    #[serde(rename = "type")]
    pub reference_type: String,
    pub reference_name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, Value>,
}

impl LinkedServiceReference {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            reference_type: "LinkedServiceReference".to_string(),
            reference_name: name.into(),
            parameters: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationRuntimeReference {
    #[serde(rename = "type")]
    pub reference_type: String,
    pub reference_name: String,
}

impl IntegrationRuntimeReference {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            reference_type: "IntegrationRuntimeReference".to_string(),
            reference_name: name.into(),
        }
    }
}

/// Reference whose `type` is optional on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityReference {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub reference_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_name: Option<String>,
}

impl EntityReference {
    pub fn linked_service(name: impl Into<String>) -> Self {
        Self {
            reference_type: Some("LinkedServiceReference".to_string()),
            reference_name: Some(name.into()),
        }
    }

    pub fn integration_runtime(name: impl Into<String>) -> Self {
        Self {
            reference_type: Some("IntegrationRuntimeReference".to_string()),
            reference_name: Some(name.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSpecification {
    #[serde(rename = "type")]
    pub parameter_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
}

/// Secret value: inline (write-only, never returned) or a Key Vault lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SecretBase {
    SecureString(SecureString),
    AzureKeyVaultSecret(AzureKeyVaultSecretReference),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecureString {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureKeyVaultSecretReference {
    pub store: LinkedServiceReference,
    pub secret_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_version: Option<String>,
}

impl SecretBase {
    pub fn secure_string(value: impl Into<String>) -> Self {
        SecretBase::SecureString(SecureString {
            value: value.into(),
        })
    }

    pub fn key_vault(
        linked_service_name: impl Into<String>,
        parameters: BTreeMap<String, Value>,
        secret_name: impl Into<String>,
        secret_version: Option<String>,
    ) -> Self {
        let mut store = LinkedServiceReference::new(linked_service_name);
        store.parameters = parameters;
        SecretBase::AzureKeyVaultSecret(AzureKeyVaultSecretReference {
            store,
            secret_name: secret_name.into(),
            secret_version,
        })
    }
}

/// Builds the `{name: {type: String, defaultValue}}` parameter map
pub fn string_parameters(
    input: &BTreeMap<String, String>,
) -> BTreeMap<String, ParameterSpecification> {
    input
        .iter()
        .map(|(k, v)| {
            (
                k.clone(),
                ParameterSpecification {
                    parameter_type: "String".to_string(),
                    default_value: Some(Value::String(v.clone())),
                },
            )
        })
        .collect()
}

/// Inverse of `string_parameters`; non-string defaults are rendered as JSON
pub fn flatten_parameters(
    input: &BTreeMap<String, ParameterSpecification>,
) -> BTreeMap<String, String> {
    input
        .iter()
        .map(|(k, v)| {
            let value = match &v.default_value {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            };
            (k.clone(), value)
        })
        .collect()
}

pub fn string_annotations(input: &[String]) -> Vec<Value> {
    input.iter().cloned().map(Value::String).collect()
}

pub fn flatten_annotations(input: &[Value]) -> Vec<String> {
    input
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect()
}

/// Free-form extra properties are sent as strings
pub fn string_values(input: &BTreeMap<String, String>) -> BTreeMap<String, Value> {
    input
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect()
}

pub fn flatten_string_values(input: &BTreeMap<String, Value>) -> BTreeMap<String, String> {
    input
        .iter()
        .map(|(k, v)| {
            let value = match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.clone(), value)
        })
        .collect()
}

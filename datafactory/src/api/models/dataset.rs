//! Dataset models

use super::common::{LinkedServiceReference, ParameterSpecification};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetResource {
    #[serde(skip_serializing, default)]
    pub id: Option<String>,
    #[serde(skip_serializing, default)]
    pub name: Option<String>,
    pub properties: Dataset,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Dataset {
    DelimitedText(DelimitedTextDataset),
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelimitedTextDataset {
    pub linked_service_name: LinkedServiceReference,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<DatasetFolder>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, ParameterSpecification>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub structure: Vec<DatasetColumn>,
    pub type_properties: DelimitedTextProperties,
    #[serde(flatten)]
    pub additional_properties: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetFolder {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetColumn {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub column_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelimitedTextProperties {
    pub location: DatasetLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_delimiter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_delimiter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_char: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escape_char: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_row_as_header: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub null_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression_codec: Option<String>,
}

/// Storage location of the data, discriminated by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DatasetLocation {
    AzureBlobStorageLocation(BlobStorageLocation),
    #[serde(rename = "AzureBlobFSLocation")]
    AzureBlobFsLocation(BlobFsLocation),
    HttpServerLocation(HttpServerLocation),
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobStorageLocation {
    pub container: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobFsLocation {
    pub file_system: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpServerLocation {
    pub relative_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn location_variants_use_service_discriminators() {
        let fs = DatasetLocation::AzureBlobFsLocation(BlobFsLocation {
            file_system: "data".to_string(),
            ..Default::default()
        });
        assert_eq!(
            serde_json::to_value(&fs).unwrap(),
            json!({"type": "AzureBlobFSLocation", "fileSystem": "data"})
        );

        let http: DatasetLocation = serde_json::from_value(json!({
            "type": "HttpServerLocation",
            "relativeUrl": "/files",
            "fileName": "foo.csv"
        }))
        .unwrap();
        assert_eq!(
            http,
            DatasetLocation::HttpServerLocation(HttpServerLocation {
                relative_url: "/files".to_string(),
                folder_path: None,
                file_name: Some("foo.csv".to_string()),
            })
        );
    }

    #[test]
    fn unknown_location_is_unsupported() {
        let location: DatasetLocation =
            serde_json::from_value(json!({"type": "AmazonS3Location", "bucketName": "b"})).unwrap();
        assert_eq!(location, DatasetLocation::Unsupported);
    }
}

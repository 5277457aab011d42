//! `azurerm_data_factory_dataset_delimited_text`

use super::common::{
    additional_properties_attribute, annotations_attribute, child_id, child_name_attribute,
    child_state, data_factory_id_attribute, description_attribute, expand_additional_properties,
    expand_annotations, expand_parameters, flatten_common, id_attribute, parameters_attribute,
    unsupported_variant,
};
use crate::api::models::common::LinkedServiceReference;
use crate::api::models::dataset::{
    BlobFsLocation, BlobStorageLocation, Dataset, DatasetColumn, DatasetFolder, DatasetLocation,
    DatasetResource, DelimitedTextDataset, DelimitedTextProperties, HttpServerLocation,
};
use crate::api::{Clients, EntityApi};
use crate::ids::{ChildKind, FactoryChildId, IdParseError};
use crate::reconciler::ResourceKind;
use std::sync::Arc;
use tfplug::defaults::StaticDefault;
use tfplug::schema::{
    Attribute, AttributeBuilder, AttributeType, NestedBlock, NestedBlockBuilder, Schema,
    SchemaBuilder,
};
use tfplug::timeouts::timeouts_block;
use tfplug::types::{Diagnostic, Dynamic, DynamicValue};
use tfplug::validator::{StringInSlice, StringNotEmpty};

const LOCATION_BLOCKS: &[&str] = &[
    "azure_blob_storage_location",
    "azure_blob_fs_location",
    "http_server_location",
];

const COLUMN_TYPES: &[&str] = &[
    "Byte",
    "Byte[]",
    "Boolean",
    "Date",
    "DateTime",
    "DateTimeOffset",
    "Decimal",
    "Double",
    "Guid",
    "Int16",
    "Int32",
    "Int64",
    "Single",
    "String",
    "TimeSpan",
];

pub struct DelimitedTextDatasetKind;

fn string_attr(name: &str, required: bool) -> Attribute {
    let builder = AttributeBuilder::new(name, AttributeType::String);
    if required {
        builder.required().validator(StringNotEmpty::create()).build()
    } else {
        builder.optional().build()
    }
}

fn location_block(name: &str, root: &str, path_required: bool) -> NestedBlock {
    NestedBlockBuilder::new(name)
        .max_items(1)
        .attribute(string_attr(root, true))
        .attribute(string_attr("path", path_required))
        .attribute(string_attr("filename", path_required))
        .build()
}

fn schema_column_block() -> NestedBlock {
    NestedBlockBuilder::new("schema_column")
        .attribute(string_attr("name", true))
        .attribute(
            AttributeBuilder::new("type", AttributeType::String)
                .optional()
                .validator(StringInSlice::create(COLUMN_TYPES))
                .build(),
        )
        .attribute(string_attr("description", false))
        .build()
}

/// First configured location block, in declaration order
fn expand_location(config: &DynamicValue) -> Result<DatasetLocation, Diagnostic> {
    if let Some(blob) = config.block("azure_blob_storage_location") {
        return Ok(DatasetLocation::AzureBlobStorageLocation(BlobStorageLocation {
            container: blob.string("container").unwrap_or_default(),
            folder_path: blob.string("path"),
            file_name: blob.string("filename"),
        }));
    }
    if let Some(fs) = config.block("azure_blob_fs_location") {
        return Ok(DatasetLocation::AzureBlobFsLocation(BlobFsLocation {
            file_system: fs.string("file_system").unwrap_or_default(),
            folder_path: fs.string("path"),
            file_name: fs.string("filename"),
        }));
    }
    if let Some(http) = config.block("http_server_location") {
        return Ok(DatasetLocation::HttpServerLocation(HttpServerLocation {
            relative_url: http.string("relative_url").unwrap_or_default(),
            folder_path: http.string("path"),
            file_name: http.string("filename"),
        }));
    }
    Err(Diagnostic::error(
        "Missing dataset location",
        format!("one of `{}` must be specified", LOCATION_BLOCKS.join(",")),
    ))
}

fn location_state(root: &str, value: &str, path: &Option<String>, file: &Option<String>) -> Dynamic {
    let mut block = DynamicValue::object();
    block.insert(root, value);
    block.insert("path", path.clone());
    block.insert("filename", file.clone());
    vec![block].into()
}

fn flatten_location(
    id: &FactoryChildId,
    state: &mut DynamicValue,
    location: &DatasetLocation,
) -> Result<(), Diagnostic> {
    for name in LOCATION_BLOCKS {
        state.insert(name, Dynamic::empty_list());
    }
    match location {
        DatasetLocation::AzureBlobStorageLocation(blob) => state.insert(
            "azure_blob_storage_location",
            location_state("container", &blob.container, &blob.folder_path, &blob.file_name),
        ),
        DatasetLocation::AzureBlobFsLocation(fs) => state.insert(
            "azure_blob_fs_location",
            location_state("file_system", &fs.file_system, &fs.folder_path, &fs.file_name),
        ),
        DatasetLocation::HttpServerLocation(http) => state.insert(
            "http_server_location",
            location_state("relative_url", &http.relative_url, &http.folder_path, &http.file_name),
        ),
        DatasetLocation::Unsupported => {
            return Err(unsupported_variant(
                id,
                "a blob storage, blob FS or HTTP server location",
                "another location type",
            ))
        }
    }
    Ok(())
}

fn expand_columns(config: &DynamicValue) -> Vec<DatasetColumn> {
    config
        .blocks("schema_column")
        .into_iter()
        .map(|column| DatasetColumn {
            name: column.string("name").unwrap_or_default(),
            column_type: column.string("type"),
            description: column.string("description"),
        })
        .collect()
}

fn flatten_columns(columns: &[DatasetColumn]) -> Dynamic {
    columns
        .iter()
        .map(|column| {
            let mut block = DynamicValue::object();
            block.insert("name", column.name.as_str());
            block.insert("type", column.column_type.clone());
            block.insert("description", column.description.clone());
            block
        })
        .collect::<Vec<_>>()
        .into()
}

impl ResourceKind for DelimitedTextDatasetKind {
    type Id = FactoryChildId;
    type Model = DatasetResource;

    const TYPE_NAME: &'static str = "azurerm_data_factory_dataset_delimited_text";

    fn schema(&self) -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Manages an Azure Delimited Text Dataset inside an Azure Data Factory")
            .attribute(id_attribute())
            .attribute(child_name_attribute("dataset"))
            .attribute(data_factory_id_attribute())
            .attribute(string_attr("linked_service_name", true))
            .attribute(
                AttributeBuilder::new("folder", AttributeType::String)
                    .optional()
                    .validator(StringNotEmpty::create())
                    .build(),
            )
            .attribute(description_attribute())
            .attribute(annotations_attribute())
            .attribute(parameters_attribute())
            .attribute(additional_properties_attribute())
            .attribute(string_attr("column_delimiter", false))
            .attribute(string_attr("row_delimiter", false))
            .attribute(string_attr("encoding", false))
            .attribute(string_attr("quote_character", false))
            .attribute(string_attr("escape_character", false))
            .attribute(
                AttributeBuilder::new("first_row_as_header", AttributeType::Bool)
                    .optional()
                    .default(StaticDefault::bool(false))
                    .build(),
            )
            .attribute(string_attr("null_value", false))
            .attribute(string_attr("compression_codec", false))
            .block(location_block("azure_blob_storage_location", "container", false))
            .block(location_block("azure_blob_fs_location", "file_system", false))
            .block(location_block("http_server_location", "relative_url", true))
            .block(schema_column_block())
            .block(timeouts_block())
            .exactly_one_of(LOCATION_BLOCKS)
            .build()
    }

    fn parse_id(&self, raw: &str) -> Result<FactoryChildId, IdParseError> {
        FactoryChildId::parse(raw, ChildKind::Dataset)
    }

    fn id_from_config(
        &self,
        config: &DynamicValue,
        _subscription_id: &str,
    ) -> Result<FactoryChildId, Diagnostic> {
        child_id(config, ChildKind::Dataset)
    }

    fn api(&self, clients: &Clients) -> Arc<dyn EntityApi<FactoryChildId, DatasetResource>> {
        clients.datasets.clone()
    }

    fn expand(&self, config: &DynamicValue) -> Result<DatasetResource, Diagnostic> {
        let type_properties = DelimitedTextProperties {
            location: expand_location(config)?,
            column_delimiter: config.string("column_delimiter"),
            row_delimiter: config.string("row_delimiter"),
            encoding_name: config.string("encoding"),
            quote_char: config.string("quote_character"),
            escape_char: config.string("escape_character"),
            first_row_as_header: config.boolean("first_row_as_header"),
            null_value: config.string("null_value"),
            compression_codec: config.string("compression_codec"),
        };

        Ok(DatasetResource {
            id: None,
            name: None,
            properties: Dataset::DelimitedText(DelimitedTextDataset {
                linked_service_name: LinkedServiceReference::new(
                    config.string("linked_service_name").unwrap_or_default(),
                ),
                description: config.string("description"),
                folder: config.string("folder").map(|name| DatasetFolder { name }),
                parameters: expand_parameters(config),
                annotations: expand_annotations(config),
                structure: expand_columns(config),
                type_properties,
                additional_properties: expand_additional_properties(config),
            }),
        })
    }

    fn flatten(
        &self,
        id: &FactoryChildId,
        model: &DatasetResource,
        _prior: &DynamicValue,
    ) -> Result<DynamicValue, Diagnostic> {
        let Dataset::DelimitedText(dataset) = &model.properties else {
            return Err(unsupported_variant(
                id,
                "a DelimitedText dataset",
                "another dataset type",
            ));
        };
        let properties = &dataset.type_properties;

        let mut state = child_state(id);
        state.insert(
            "linked_service_name",
            dataset.linked_service_name.reference_name.as_str(),
        );
        state.insert("description", dataset.description.clone());
        state.insert(
            "folder",
            dataset.folder.as_ref().map(|folder| folder.name.clone()),
        );
        flatten_common(
            &mut state,
            &dataset.parameters,
            &dataset.annotations,
            &dataset.additional_properties,
        );
        state.insert("schema_column", flatten_columns(&dataset.structure));
        state.insert("column_delimiter", properties.column_delimiter.clone());
        state.insert("row_delimiter", properties.row_delimiter.clone());
        state.insert("encoding", properties.encoding_name.clone());
        state.insert("quote_character", properties.quote_char.clone());
        state.insert("escape_character", properties.escape_char.clone());
        state.insert(
            "first_row_as_header",
            properties.first_row_as_header.unwrap_or(false),
        );
        state.insert("null_value", properties.null_value.clone());
        state.insert("compression_codec", properties.compression_codec.clone());
        flatten_location(id, &mut state, &properties.location)?;
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::testing::{create, factory_id, harness, read, update, validate};
    use std::collections::HashMap;

    fn config() -> DynamicValue {
        let mut config = DynamicValue::object();
        config.insert("name", "acctestds");
        config.insert("data_factory_id", factory_id());
        config.insert("linked_service_name", "acctestlsblob");
        config.insert("column_delimiter", ",");
        config.insert("encoding", "UTF-8");
        config.insert(
            "http_server_location",
            Dynamic::block(HashMap::from([
                ("relative_url".to_string(), Dynamic::from("/fizz/buzz/")),
                ("path".to_string(), Dynamic::from("foo/bar/")),
                ("filename".to_string(), Dynamic::from("foo.txt")),
            ])),
        );
        config
    }

    #[tokio::test]
    async fn http_dataset_round_trips() {
        let (_backend, dataset) = harness(DelimitedTextDatasetKind);
        let mut config = config();
        config.insert(
            "schema_column",
            Dynamic::List(vec![Dynamic::Map(HashMap::from([
                ("name".to_string(), Dynamic::from("test1")),
                ("type".to_string(), Dynamic::from("Byte")),
                ("description".to_string(), Dynamic::from("description")),
            ]))]),
        );

        let created = create(&dataset, &config).await;
        assert!(created.diagnostics.is_empty(), "{:?}", created.diagnostics);

        let state = read(&dataset, &created.new_state).await.new_state.unwrap();
        let http = state.block("http_server_location").unwrap();
        assert_eq!(http.string("relative_url").as_deref(), Some("/fizz/buzz/"));
        assert_eq!(http.string("filename").as_deref(), Some("foo.txt"));
        assert_eq!(
            state.attr("azure_blob_storage_location"),
            Some(&Dynamic::empty_list())
        );
        assert_eq!(state.string("encoding").as_deref(), Some("UTF-8"));
        assert_eq!(state.boolean("first_row_as_header"), Some(false));
        assert_eq!(state.blocks("schema_column")[0].string("type").as_deref(), Some("Byte"));
        assert_eq!(state.string("linked_service_name").as_deref(), Some("acctestlsblob"));
    }

    #[tokio::test]
    async fn switching_location_replaces_body() {
        let (backend, dataset) = harness(DelimitedTextDatasetKind);
        let created = create(&dataset, &config()).await;

        let mut changed = config();
        changed.insert("http_server_location", Dynamic::empty_list());
        changed.insert(
            "azure_blob_storage_location",
            Dynamic::block(HashMap::from([
                ("container".to_string(), Dynamic::from("content")),
                ("path".to_string(), Dynamic::from("foo")),
            ])),
        );
        let updated = update(&dataset, &created.new_state, &changed).await;
        assert!(updated.diagnostics.is_empty(), "{:?}", updated.diagnostics);
        assert_eq!(
            updated.new_state.attr("http_server_location"),
            Some(&Dynamic::empty_list())
        );
        let blob = updated.new_state.block("azure_blob_storage_location").unwrap();
        assert_eq!(blob.string("container").as_deref(), Some("content"));
        assert_eq!(blob.attr("filename"), Some(&Dynamic::Null));
        assert_eq!(backend.datasets.len(), 1);
    }

    #[tokio::test]
    async fn two_locations_fail_validation() {
        let (backend, dataset) = harness(DelimitedTextDatasetKind);
        let mut config = config();
        config.insert(
            "azure_blob_fs_location",
            Dynamic::block(HashMap::from([(
                "file_system".to_string(),
                Dynamic::from("fs"),
            )])),
        );

        let diagnostics = validate(&dataset, &config).await;
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].summary, "Invalid combination of arguments");
        assert_eq!(backend.datasets.puts(), 0);
    }

    #[tokio::test]
    async fn other_dataset_types_are_rejected_on_read() {
        let (backend, dataset) = harness(DelimitedTextDatasetKind);
        let created = create(&dataset, &config()).await;
        let id = FactoryChildId::parse(&created.new_state.string("id").unwrap(), ChildKind::Dataset)
            .unwrap();
        backend.datasets.insert(
            &id,
            DatasetResource {
                id: None,
                name: None,
                properties: Dataset::Unsupported,
            },
        );

        let read = read(&dataset, &created.new_state).await;
        assert_eq!(read.diagnostics[0].summary, "Unexpected remote entity type");
    }
}

//! Schema pieces and conversions shared by the factory child resources

use crate::api::models::common::{
    flatten_annotations, flatten_parameters, flatten_string_values, string_annotations,
    string_parameters, string_values, ParameterSpecification, SecretBase,
};
use crate::ids::{ChildKind, FactoryChildId, FactoryId};
use serde_json::Value;
use std::collections::BTreeMap;
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType, NestedBlock, NestedBlockBuilder};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use tfplug::validator::{
    StringMatch, StringNotEmpty, Validator, ValidatorRequest, ValidatorResponse,
};

/// Names of linked services, datasets, runtimes and triggers
pub const CHILD_NAME_PATTERN: &str = r"^[A-Za-z0-9_][^<>*#.%&:\\+?/]*$";

/// Lowercase with spaces removed, so `West US` and `westus` compare equal
pub fn normalize_location(input: &str) -> String {
    input.replace(' ', "").to_lowercase()
}

pub fn id_attribute() -> Attribute {
    AttributeBuilder::new("id", AttributeType::String)
        .description("The ID of the resource")
        .computed()
        .build()
}

pub fn child_name_attribute(label: &str) -> Attribute {
    AttributeBuilder::new("name", AttributeType::String)
        .description(&format!("Name of the {}", label))
        .required()
        .validator(StringMatch::create(
            CHILD_NAME_PATTERN,
            "invalid name, see https://docs.microsoft.com/azure/data-factory/naming-rules",
        ))
        .build()
}

pub fn integration_runtime_name_attribute() -> Attribute {
    AttributeBuilder::new("name", AttributeType::String)
        .description("Name of the Integration Runtime")
        .required()
        .validator(StringMatch::create(
            r"^([a-zA-Z0-9](-|-?[a-zA-Z0-9]+)+[a-zA-Z0-9])$",
            "Invalid name for Managed Integration Runtime: minimum 3 characters, must start and end with a number or a letter, may only consist of letters, numbers and dashes and no consecutive dashes.",
        ))
        .build()
}

pub fn data_factory_id_attribute() -> Attribute {
    AttributeBuilder::new("data_factory_id", AttributeType::String)
        .description("ID of the Data Factory the entity belongs to")
        .required()
        .validator(Box::new(FactoryIdValidator))
        .build()
}

pub fn description_attribute() -> Attribute {
    AttributeBuilder::new("description", AttributeType::String)
        .optional()
        .validator(StringNotEmpty::create())
        .build()
}

pub fn annotations_attribute() -> Attribute {
    AttributeBuilder::new("annotations", AttributeType::string_list())
        .optional()
        .build()
}

pub fn parameters_attribute() -> Attribute {
    AttributeBuilder::new("parameters", AttributeType::string_map())
        .optional()
        .build()
}

pub fn additional_properties_attribute() -> Attribute {
    AttributeBuilder::new("additional_properties", AttributeType::string_map())
        .optional()
        .build()
}

/// Key Vault secret reference block; `extended` adds parameters and secret_version
pub fn key_vault_block(name: &str, extended: bool) -> NestedBlock {
    let mut builder = NestedBlockBuilder::new(name)
        .max_items(1)
        .attribute(
            AttributeBuilder::new("linked_service_name", AttributeType::String)
                .required()
                .validator(StringNotEmpty::create())
                .build(),
        )
        .attribute(
            AttributeBuilder::new("secret_name", AttributeType::String)
                .required()
                .validator(StringNotEmpty::create())
                .build(),
        );
    if extended {
        builder = builder
            .attribute(
                AttributeBuilder::new("parameters", AttributeType::string_map())
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("secret_version", AttributeType::String)
                    .optional()
                    .validator(StringNotEmpty::create())
                    .build(),
            );
    }
    builder.build()
}

pub fn expand_key_vault(block: &DynamicValue) -> SecretBase {
    SecretBase::key_vault(
        block.string("linked_service_name").unwrap_or_default(),
        string_values(&block.string_map("parameters")),
        block.string("secret_name").unwrap_or_default(),
        block.string("secret_version"),
    )
}

/// Key Vault block for `secret`, empty for inline or absent secrets
pub fn flatten_key_vault(secret: Option<&SecretBase>, extended: bool) -> Dynamic {
    let Some(SecretBase::AzureKeyVaultSecret(reference)) = secret else {
        return Dynamic::empty_list();
    };
    let mut block = DynamicValue::object();
    block.insert(
        "linked_service_name",
        reference.store.reference_name.as_str(),
    );
    block.insert("secret_name", reference.secret_name.as_str());
    if extended {
        block.insert(
            "parameters",
            Dynamic::string_map(flatten_string_values(&reference.store.parameters)),
        );
        block.insert("secret_version", reference.secret_version.clone());
    }
    vec![block].into()
}

/// Identifier of the child entity named in `config`
pub fn child_id(config: &DynamicValue, kind: ChildKind) -> Result<FactoryChildId, Diagnostic> {
    let raw = config.string("data_factory_id").ok_or_else(|| {
        Diagnostic::error(
            "Missing required argument",
            "The argument \"data_factory_id\" is required, but no definition was found.",
        )
        .with_attribute(AttributePath::new("data_factory_id"))
    })?;
    let factory = FactoryId::parse(&raw).map_err(|e| {
        Diagnostic::error("Invalid data_factory_id", e.to_string())
            .with_attribute(AttributePath::new("data_factory_id"))
    })?;
    let name = config.string("name").ok_or_else(|| {
        Diagnostic::error(
            "Missing required argument",
            "The argument \"name\" is required, but no definition was found.",
        )
        .with_attribute(AttributePath::new("name"))
    })?;
    Ok(FactoryChildId::new(factory, kind, name))
}

/// Starts a child state with `name` and `data_factory_id` taken from `id`
pub fn child_state(id: &FactoryChildId) -> DynamicValue {
    let mut state = DynamicValue::object();
    state.insert("name", id.name.as_str());
    state.insert("data_factory_id", id.factory.to_string());
    state
}

pub fn expand_parameters(config: &DynamicValue) -> BTreeMap<String, ParameterSpecification> {
    string_parameters(&config.string_map("parameters"))
}

pub fn expand_annotations(config: &DynamicValue) -> Vec<Value> {
    string_annotations(&config.string_list("annotations"))
}

pub fn expand_additional_properties(config: &DynamicValue) -> BTreeMap<String, Value> {
    string_values(&config.string_map("additional_properties"))
}

/// Writes parameters, annotations and additional_properties into `state`
pub fn flatten_common(
    state: &mut DynamicValue,
    parameters: &BTreeMap<String, ParameterSpecification>,
    annotations: &[Value],
    additional_properties: &BTreeMap<String, Value>,
) {
    state.insert(
        "parameters",
        Dynamic::string_map(flatten_parameters(parameters)),
    );
    state.insert(
        "annotations",
        Dynamic::string_list(flatten_annotations(annotations)),
    );
    state.insert(
        "additional_properties",
        Dynamic::string_map(flatten_string_values(additional_properties)),
    );
}

/// The service returned a variant this resource does not manage
pub fn unsupported_variant(id: &impl std::fmt::Display, expected: &str, found: &str) -> Diagnostic {
    Diagnostic::error(
        "Unexpected remote entity type",
        format!(
            "converting {}: expected {} but the service returned {}",
            id, expected, found
        ),
    )
}

/// Rejects values that do not parse as a factory id
struct FactoryIdValidator;

impl Validator for FactoryIdValidator {
    fn description(&self) -> String {
        "value must be a Data Factory resource id".to_string()
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut diagnostics = Vec::new();
        if let Some(raw) = request.config_value.value.as_str() {
            if let Err(e) = FactoryId::parse(raw) {
                diagnostics.push(
                    Diagnostic::error("Invalid attribute value", e.to_string())
                        .with_attribute(request.path.clone()),
                );
            }
        }
        ValidatorResponse { diagnostics }
    }
}

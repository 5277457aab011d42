//! Schema types and builders for tfplug
//!
//! This module provides the schema system for defining resource and data source
//! schemas: attribute types, nested blocks, cross-attribute constraints, and
//! the config walk that validates values and fills in defaults.

use crate::defaults::{DefaultRequest, DefaultValue};
use crate::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use crate::validator::{Validator, ValidatorRequest};
use std::collections::HashMap;
use std::sync::Arc;

/// AttributeType defines the type system for Terraform attributes
/// This must match Terraform's type system exactly
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    String,
    Number, // Always f64
    Bool,
    List(Box<AttributeType>),               // Ordered, allows duplicates
    Set(Box<AttributeType>),                // Unordered, no duplicates
    Map(Box<AttributeType>),                // String keys only
    Object(HashMap<String, AttributeType>), // Fixed structure
}

impl AttributeType {
    pub fn string_list() -> Self {
        AttributeType::List(Box::new(AttributeType::String))
    }

    pub fn string_map() -> Self {
        AttributeType::Map(Box::new(AttributeType::String))
    }
}

/// Schema is returned by providers/resources/data sources
/// Version is used for state migration
#[derive(Debug, Clone)]
pub struct Schema {
    pub version: i64,
    pub block: Block,
}

/// Block represents a configuration block
#[derive(Debug, Clone, Default)]
pub struct Block {
    pub attributes: Vec<Attribute>,
    pub block_types: Vec<NestedBlock>,
    pub constraints: Vec<Constraint>,
    pub description: String,
    pub deprecated: bool,
}

/// Attribute represents a single configuration attribute
#[derive(Clone)]
pub struct Attribute {
    pub name: String,
    pub r#type: AttributeType,
    pub description: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    pub deprecated: bool,
    pub validators: Vec<Arc<dyn Validator>>,
    pub default: Option<Arc<dyn DefaultValue>>,
}

// Validators and defaults are trait objects without Debug
impl std::fmt::Debug for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &self.name)
            .field("type", &self.r#type)
            .field("required", &self.required)
            .field("optional", &self.optional)
            .field("computed", &self.computed)
            .field("sensitive", &self.sensitive)
            .field(
                "validators",
                &format!("{} validators", self.validators.len()),
            )
            .field("default", &self.default.as_ref().map(|d| d.description()))
            .finish()
    }
}

/// NestedBlock represents a nested configuration block
#[derive(Debug, Clone)]
pub struct NestedBlock {
    pub type_name: String,
    pub block: Block,
    pub nesting: NestingMode,
    pub min_items: i64,
    pub max_items: i64,
}

/// NestingMode defines how nested blocks are structured
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NestingMode {
    Single,
    List,
    Set,
}

/// Cross-attribute rules evaluated within one block object.
/// Names are dotted paths relative to that block (`vnet_integration.0.vnet_id`).
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// At most one of the names may be set
    ConflictsWith(Vec<String>),
    /// Exactly one of the names must be set
    ExactlyOneOf(Vec<String>),
    /// At least one of the names must be set
    AtLeastOneOf(Vec<String>),
    /// When `attribute` is set, every name in `with` must be set too
    RequiredWith { attribute: String, with: Vec<String> },
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Schema {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.block.attribute(name)
    }

    pub fn nested_block(&self, name: &str) -> Option<&NestedBlock> {
        self.block.nested_block(name)
    }

    /// Checks `config` against the schema without touching any remote system
    pub fn validate(&self, config: &DynamicValue) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        self.block
            .validate_object(config, &AttributePath::root(), &mut diagnostics);
        diagnostics
    }

    /// Fills absent or null attributes that declare a default
    pub fn apply_defaults(&self, value: &mut DynamicValue) {
        if value.is_unknown() {
            return;
        }
        self.block.apply_defaults(&mut value.value, &AttributePath::root());
    }
}

impl Block {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn nested_block(&self, name: &str) -> Option<&NestedBlock> {
        self.block_types.iter().find(|b| b.type_name == name)
    }

    fn validate_object(
        &self,
        object: &DynamicValue,
        path: &AttributePath,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        match &object.value {
            Dynamic::Unknown => return,
            Dynamic::Map(_) | Dynamic::Null => {}
            other => {
                diagnostics.push(
                    Diagnostic::error(
                        "Incorrect attribute value type",
                        format!("expected an object, got {}", other.type_name()),
                    )
                    .with_attribute(path.clone()),
                );
                return;
            }
        }

        for attribute in &self.attributes {
            let attr_path = path.clone().attribute(&attribute.name);
            let value = object.attr(&attribute.name).unwrap_or(&Dynamic::Null);

            if matches!(value, Dynamic::Null) {
                if attribute.required {
                    diagnostics.push(
                        Diagnostic::error(
                            "Missing required argument",
                            format!(
                                "The argument \"{}\" is required, but no definition was found.",
                                attribute.name
                            ),
                        )
                        .with_attribute(attr_path),
                    );
                }
                continue;
            }
            if matches!(value, Dynamic::Unknown) {
                continue;
            }

            if attribute.computed && !attribute.optional && !attribute.required {
                diagnostics.push(
                    Diagnostic::error(
                        "Value for unconfigurable attribute",
                        format!(
                            "Can't configure a value for \"{}\": its value will be decided automatically.",
                            attribute.name
                        ),
                    )
                    .with_attribute(attr_path),
                );
                continue;
            }

            for validator in &attribute.validators {
                let response = validator.validate(ValidatorRequest {
                    config_value: DynamicValue::new(value.clone()),
                    path: attr_path.clone(),
                });
                diagnostics.extend(response.diagnostics);
            }
        }

        for nested in &self.block_types {
            let block_path = path.clone().attribute(&nested.type_name);
            let items: Vec<Dynamic> = match object.attr(&nested.type_name) {
                None | Some(Dynamic::Null) => Vec::new(),
                Some(Dynamic::Unknown) => continue,
                Some(Dynamic::List(items)) => items.clone(),
                Some(single @ Dynamic::Map(_)) => vec![single.clone()],
                Some(other) => {
                    diagnostics.push(
                        Diagnostic::error(
                            "Incorrect block type",
                            format!("expected a list of blocks, got {}", other.type_name()),
                        )
                        .with_attribute(block_path),
                    );
                    continue;
                }
            };

            let count = items.len() as i64;
            if count < nested.min_items {
                diagnostics.push(
                    Diagnostic::error(
                        format!("Insufficient {} blocks", nested.type_name),
                        format!(
                            "At least {} \"{}\" blocks are required.",
                            nested.min_items, nested.type_name
                        ),
                    )
                    .with_attribute(block_path.clone()),
                );
            }
            if nested.max_items > 0 && count > nested.max_items {
                diagnostics.push(
                    Diagnostic::error(
                        format!("Too many {} blocks", nested.type_name),
                        format!(
                            "No more than {} \"{}\" blocks are allowed.",
                            nested.max_items, nested.type_name
                        ),
                    )
                    .with_attribute(block_path.clone()),
                );
            }

            for (idx, item) in items.into_iter().enumerate() {
                nested.block.validate_object(
                    &DynamicValue::new(item),
                    &block_path.clone().index(idx as i64),
                    diagnostics,
                );
            }
        }

        for constraint in &self.constraints {
            constraint.check(object, path, diagnostics);
        }
    }

    fn apply_defaults(&self, value: &mut Dynamic, path: &AttributePath) {
        if matches!(value, Dynamic::Null) {
            *value = Dynamic::Map(HashMap::new());
        }
        let Dynamic::Map(fields) = value else {
            return;
        };

        for attribute in &self.attributes {
            let Some(default) = &attribute.default else {
                continue;
            };
            let absent = matches!(fields.get(&attribute.name), None | Some(Dynamic::Null));
            if absent {
                let response = default.default_value(DefaultRequest {
                    path: path.clone().attribute(&attribute.name),
                });
                if !response.value.is_null() {
                    fields.insert(attribute.name.clone(), response.value.value);
                }
            }
        }

        for nested in &self.block_types {
            let block_path = path.clone().attribute(&nested.type_name);
            match fields.get_mut(&nested.type_name) {
                Some(Dynamic::List(items)) => {
                    for (idx, item) in items.iter_mut().enumerate() {
                        nested
                            .block
                            .apply_defaults(item, &block_path.clone().index(idx as i64));
                    }
                }
                Some(single @ Dynamic::Map(_)) => nested.block.apply_defaults(single, &block_path),
                _ => {}
            }
        }
    }
}

impl Constraint {
    fn check(&self, object: &DynamicValue, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>) {
        let state = |name: &str| -> Presence {
            match object.lookup(&AttributePath::parse(name)) {
                Some(Dynamic::Unknown) => Presence::Unknown,
                Some(value) if value.is_set() => Presence::Set,
                _ => Presence::Unset,
            }
        };

        let tally = |list: &[String]| -> Option<usize> {
            let mut set = 0;
            for name in list {
                match state(name) {
                    Presence::Unknown => return None,
                    Presence::Set => set += 1,
                    Presence::Unset => {}
                }
            }
            Some(set)
        };

        let at = |list: &[String]| -> AttributePath {
            match list.first() {
                Some(first) => path.clone().join(&AttributePath::parse(first)),
                None => path.clone(),
            }
        };

        match self {
            Constraint::ConflictsWith(list) => {
                if matches!(tally(list), Some(n) if n > 1) {
                    diagnostics.push(
                        Diagnostic::error(
                            "Conflicting configuration arguments",
                            format!("only one of `{}` can be specified", list.join(",")),
                        )
                        .with_attribute(at(list)),
                    );
                }
            }
            Constraint::ExactlyOneOf(list) => match tally(list) {
                Some(0) => diagnostics.push(
                    Diagnostic::error(
                        "Invalid combination of arguments",
                        format!("one of `{}` must be specified", list.join(",")),
                    )
                    .with_attribute(at(list)),
                ),
                Some(n) if n > 1 => diagnostics.push(
                    Diagnostic::error(
                        "Invalid combination of arguments",
                        format!("only one of `{}` can be specified", list.join(",")),
                    )
                    .with_attribute(at(list)),
                ),
                _ => {}
            },
            Constraint::AtLeastOneOf(list) => {
                if tally(list) == Some(0) {
                    diagnostics.push(
                        Diagnostic::error(
                            "Missing required argument",
                            format!("at least one of `{}` must be specified", list.join(",")),
                        )
                        .with_attribute(at(list)),
                    );
                }
            }
            Constraint::RequiredWith { attribute, with } => {
                if state(attribute) != Presence::Set {
                    return;
                }
                let missing = with.iter().any(|name| state(name) == Presence::Unset);
                if missing {
                    let mut all = vec![attribute.clone()];
                    all.extend(with.iter().cloned());
                    diagnostics.push(
                        Diagnostic::error(
                            "Missing required argument",
                            format!(
                                "\"{}\": all of `{}` must be specified",
                                attribute,
                                all.join(",")
                            ),
                        )
                        .with_attribute(path.clone().join(&AttributePath::parse(attribute))),
                    );
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Presence {
    Set,
    Unset,
    Unknown,
}

/// AttributeBuilder provides fluent API for building attributes
pub struct AttributeBuilder {
    attribute: Attribute,
}

impl AttributeBuilder {
    pub fn new(name: &str, type_: AttributeType) -> Self {
        Self {
            attribute: Attribute {
                name: name.to_string(),
                r#type: type_,
                description: String::new(),
                required: false,
                optional: false,
                computed: false,
                sensitive: false,
                deprecated: false,
                validators: Vec::new(),
                default: None,
            },
        }
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.attribute.description = desc.to_string();
        self
    }

    pub fn required(mut self) -> Self {
        self.attribute.required = true;
        self.attribute.optional = false;
        self
    }

    pub fn optional(mut self) -> Self {
        self.attribute.optional = true;
        self.attribute.required = false;
        self
    }

    pub fn computed(mut self) -> Self {
        self.attribute.computed = true;
        self
    }

    /// Mark as sensitive (hidden)
    pub fn sensitive(mut self) -> Self {
        self.attribute.sensitive = true;
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.attribute.deprecated = true;
        self
    }

    pub fn validator(mut self, validator: Box<dyn Validator>) -> Self {
        self.attribute.validators.push(Arc::from(validator));
        self
    }

    pub fn default(mut self, default: Box<dyn DefaultValue>) -> Self {
        self.attribute.default = Some(Arc::from(default));
        self
    }

    pub fn build(self) -> Attribute {
        self.attribute
    }
}

/// NestedBlockBuilder builds list-nested blocks; `max_items(1)` gives the
/// single-object blocks used for grouped settings.
pub struct NestedBlockBuilder {
    nested: NestedBlock,
}

impl NestedBlockBuilder {
    pub fn new(type_name: &str) -> Self {
        Self {
            nested: NestedBlock {
                type_name: type_name.to_string(),
                block: Block::default(),
                nesting: NestingMode::List,
                min_items: 0,
                max_items: 0,
            },
        }
    }

    pub fn nesting(mut self, nesting: NestingMode) -> Self {
        self.nested.nesting = nesting;
        self
    }

    pub fn min_items(mut self, min: i64) -> Self {
        self.nested.min_items = min;
        self
    }

    pub fn max_items(mut self, max: i64) -> Self {
        self.nested.max_items = max;
        self
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.nested.block.description = desc.to_string();
        self
    }

    pub fn attribute(mut self, attr: Attribute) -> Self {
        self.nested.block.attributes.push(attr);
        self
    }

    pub fn block(mut self, block: NestedBlock) -> Self {
        self.nested.block.block_types.push(block);
        self
    }

    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.nested.block.constraints.push(constraint);
        self
    }

    pub fn conflicting(self, list: &[&str]) -> Self {
        self.constraint(Constraint::ConflictsWith(names(list)))
    }

    pub fn exactly_one_of(self, list: &[&str]) -> Self {
        self.constraint(Constraint::ExactlyOneOf(names(list)))
    }

    pub fn at_least_one_of(self, list: &[&str]) -> Self {
        self.constraint(Constraint::AtLeastOneOf(names(list)))
    }

    pub fn required_with(self, attribute: &str, with: &[&str]) -> Self {
        self.constraint(Constraint::RequiredWith {
            attribute: attribute.to_string(),
            with: names(with),
        })
    }

    pub fn build(self) -> NestedBlock {
        self.nested
    }
}

/// SchemaBuilder provides fluent API for building schemas
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            schema: Schema {
                version: 0,
                block: Block::default(),
            },
        }
    }

    /// Set schema version
    pub fn version(mut self, version: i64) -> Self {
        self.schema.version = version;
        self
    }

    pub fn attribute(mut self, attr: Attribute) -> Self {
        self.schema.block.attributes.push(attr);
        self
    }

    pub fn block(mut self, block: NestedBlock) -> Self {
        self.schema.block.block_types.push(block);
        self
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.schema.block.description = desc.to_string();
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.schema.block.deprecated = true;
        self
    }

    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.schema.block.constraints.push(constraint);
        self
    }

    pub fn conflicting(self, list: &[&str]) -> Self {
        self.constraint(Constraint::ConflictsWith(names(list)))
    }

    pub fn exactly_one_of(self, list: &[&str]) -> Self {
        self.constraint(Constraint::ExactlyOneOf(names(list)))
    }

    pub fn at_least_one_of(self, list: &[&str]) -> Self {
        self.constraint(Constraint::AtLeastOneOf(names(list)))
    }

    pub fn required_with(self, attribute: &str, with: &[&str]) -> Self {
        self.constraint(Constraint::RequiredWith {
            attribute: attribute.to_string(),
            with: names(with),
        })
    }

    pub fn build(self) -> Schema {
        self.schema
    }
}

impl std::default::Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

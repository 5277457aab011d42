//! Per-operation timeouts
//!
//! Resources declare default budgets for create/read/update/delete and users
//! may override them with a `timeouts` block using Go-style durations such as
//! `"30m"`, `"1h30m"` or `"45s"`.

use crate::error::{Result, TfplugError};
use crate::schema::{AttributeBuilder, AttributeType, NestedBlock, NestedBlockBuilder};
use crate::types::{Diagnostic, DynamicValue};
use crate::validator::{Validator, ValidatorRequest, ValidatorResponse};
use std::time::Duration;

/// The four CRUD operations that carry a timeout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub create: Duration,
    pub read: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            create: Duration::from_secs(30 * 60),
            read: Duration::from_secs(5 * 60),
            update: Duration::from_secs(30 * 60),
            delete: Duration::from_secs(30 * 60),
        }
    }
}

impl Timeouts {
    pub fn get(&self, operation: Operation) -> Duration {
        match operation {
            Operation::Create => self.create,
            Operation::Read => self.read,
            Operation::Update => self.update,
            Operation::Delete => self.delete,
        }
    }

    /// Applies overrides from the `timeouts` block of `config`, if any
    pub fn with_overrides(mut self, config: &DynamicValue) -> Result<Self> {
        let Some(block) = config.block(TIMEOUTS_BLOCK) else {
            return Ok(self);
        };
        for operation in [
            Operation::Create,
            Operation::Read,
            Operation::Update,
            Operation::Delete,
        ] {
            if let Some(raw) = block.string(operation.as_str()) {
                let duration = parse_duration(&raw)?;
                match operation {
                    Operation::Create => self.create = duration,
                    Operation::Read => self.read = duration,
                    Operation::Update => self.update = duration,
                    Operation::Delete => self.delete = duration,
                }
            }
        }
        Ok(self)
    }
}

pub const TIMEOUTS_BLOCK: &str = "timeouts";

/// Schema block accepting overrides for each operation
pub fn timeouts_block() -> NestedBlock {
    let mut builder = NestedBlockBuilder::new(TIMEOUTS_BLOCK)
        .max_items(1)
        .description("Per-operation timeouts");
    for operation in ["create", "read", "update", "delete"] {
        builder = builder.attribute(
            AttributeBuilder::new(operation, AttributeType::String)
                .optional()
                .validator(Box::new(DurationValidator))
                .build(),
        );
    }
    builder.build()
}

struct DurationValidator;

impl Validator for DurationValidator {
    fn description(&self) -> String {
        "value must be a duration such as 30m or 1h30m".to_string()
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut diagnostics = Vec::new();
        if let Some(raw) = request.config_value.value.as_str() {
            if let Err(e) = parse_duration(raw) {
                diagnostics.push(
                    Diagnostic::error("Invalid timeout", e.to_string())
                        .with_attribute(request.path.clone()),
                );
            }
        }
        ValidatorResponse { diagnostics }
    }
}

/// Parses `"1h30m"`, `"45s"`, `"500ms"` style durations
pub fn parse_duration(raw: &str) -> Result<Duration> {
    let invalid = || TfplugError::InvalidConfiguration(format!("invalid duration {:?}", raw));
    let input = raw.trim();
    if input.is_empty() {
        return Err(invalid());
    }
    if input == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total = Duration::ZERO;
    let mut rest = input;
    while !rest.is_empty() {
        let digits = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(invalid)?;
        if digits == 0 {
            return Err(invalid());
        }
        let amount: f64 = rest[..digits].parse().map_err(|_| invalid())?;
        rest = &rest[digits..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let nanos_per_unit = match &rest[..unit_len] {
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            _ => return Err(invalid()),
        };
        rest = &rest[unit_len..];

        total += Duration::from_nanos((amount * nanos_per_unit).round() as u64);
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Dynamic;
    use std::collections::HashMap;

    #[test]
    fn parses_compound_durations() {
        assert_eq!(parse_duration("30m").unwrap(), Duration::from_secs(1800));
        assert_eq!(parse_duration("1h30m").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_duration("45s").unwrap(), Duration::from_secs(45));
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("1.5h").unwrap(), Duration::from_secs(5400));
    }

    #[test]
    fn rejects_malformed_durations() {
        for raw in ["", "10", "m", "5x", "1h-2m"] {
            assert!(parse_duration(raw).is_err(), "{} should fail", raw);
        }
    }

    #[test]
    fn defaults_match_resource_budgets() {
        let t = Timeouts::default();
        assert_eq!(t.get(Operation::Create), Duration::from_secs(1800));
        assert_eq!(t.get(Operation::Read), Duration::from_secs(300));
    }

    #[test]
    fn overrides_come_from_timeouts_block() {
        let mut config = DynamicValue::object();
        config.insert(
            "timeouts",
            Dynamic::block(HashMap::from([("create".to_string(), Dynamic::from("1h"))])),
        );

        let t = Timeouts::default().with_overrides(&config).unwrap();
        assert_eq!(t.create, Duration::from_secs(3600));
        assert_eq!(t.delete, Duration::from_secs(1800));
    }
}

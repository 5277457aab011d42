//! Default value providers for attributes
//!
//! Defaults are applied when an attribute is absent or null in the
//! configuration, before the value is expanded into a remote request.
//!
//! ```no_run
//! use tfplug::schema::{AttributeBuilder, AttributeType};
//! use tfplug::defaults::{StaticDefault, EnvDefault};
//!
//! let nodes = AttributeBuilder::new("number_of_nodes", AttributeType::Number)
//!     .optional()
//!     .default(StaticDefault::number(1.0))
//!     .build();
//!
//! let endpoint = AttributeBuilder::new("endpoint", AttributeType::String)
//!     .optional()
//!     .default(EnvDefault::create("ARM_ENDPOINT", "https://management.azure.com"))
//!     .build();
//! ```

use crate::types::{AttributePath, Dynamic, DynamicValue};
use std::env;

/// DefaultValue provides default values for optional attributes
pub trait DefaultValue: Send + Sync {
    /// Human-readable description
    fn description(&self) -> String;
    /// Provide default value; a null value means "no default"
    fn default_value(&self, request: DefaultRequest) -> DefaultResponse;
}

/// Request for default values
pub struct DefaultRequest {
    pub path: AttributePath,
}

/// Response with default value
pub struct DefaultResponse {
    pub value: DynamicValue,
}

/// StaticDefault provides a static default value
pub struct StaticDefault {
    value: Dynamic,
}

impl StaticDefault {
    pub fn create(value: Dynamic) -> Box<dyn DefaultValue> {
        Box::new(Self { value })
    }

    pub fn string(value: &str) -> Box<dyn DefaultValue> {
        Self::create(Dynamic::String(value.to_string()))
    }

    pub fn number(value: f64) -> Box<dyn DefaultValue> {
        Self::create(Dynamic::Number(value))
    }

    pub fn bool(value: bool) -> Box<dyn DefaultValue> {
        Self::create(Dynamic::Bool(value))
    }
}

impl DefaultValue for StaticDefault {
    fn description(&self) -> String {
        format!("static default value: {:?}", self.value)
    }

    fn default_value(&self, _request: DefaultRequest) -> DefaultResponse {
        DefaultResponse {
            value: DynamicValue::new(self.value.clone()),
        }
    }
}

/// EnvDefault gets the default value from an environment variable
pub struct EnvDefault {
    env_var: String,
    fallback: Option<String>,
}

impl EnvDefault {
    pub fn create(env_var: &str, fallback: &str) -> Box<dyn DefaultValue> {
        Box::new(Self {
            env_var: env_var.to_string(),
            fallback: Some(fallback.to_string()),
        })
    }

    /// No fallback: an unset variable leaves the attribute null
    pub fn create_required(env_var: &str) -> Box<dyn DefaultValue> {
        Box::new(Self {
            env_var: env_var.to_string(),
            fallback: None,
        })
    }
}

impl DefaultValue for EnvDefault {
    fn description(&self) -> String {
        match &self.fallback {
            Some(fallback) => format!(
                "default from environment variable {} (fallback: {})",
                self.env_var, fallback
            ),
            None => format!("default from environment variable {}", self.env_var),
        }
    }

    fn default_value(&self, _request: DefaultRequest) -> DefaultResponse {
        let value = match env::var(&self.env_var) {
            Ok(val) if !val.is_empty() => Dynamic::String(val),
            _ => match &self.fallback {
                Some(fallback) => Dynamic::String(fallback.clone()),
                None => Dynamic::Null,
            },
        };

        DefaultResponse {
            value: DynamicValue::new(value),
        }
    }
}

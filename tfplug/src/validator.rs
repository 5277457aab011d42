//! Attribute validators
//!
//! Validators run during config validation on attributes that are set and
//! known. Each constructor returns a boxed validator ready for
//! `AttributeBuilder::validator`.

use crate::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use regex::Regex;

/// Validator performs validation on attribute values
pub trait Validator: Send + Sync {
    /// Human-readable description
    fn description(&self) -> String;
    /// Perform validation
    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse;
}

/// Request for validators
pub struct ValidatorRequest {
    pub config_value: DynamicValue,
    pub path: AttributePath,
}

/// Response from validators
#[derive(Default)]
pub struct ValidatorResponse {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidatorResponse {
    fn invalid(path: &AttributePath, detail: String) -> Self {
        Self {
            diagnostics: vec![Diagnostic::error("Invalid attribute value", detail)
                .with_attribute(path.clone())],
        }
    }
}

fn expect_string<'a>(request: &'a ValidatorRequest) -> Result<&'a str, ValidatorResponse> {
    request.config_value.value.as_str().ok_or_else(|| {
        ValidatorResponse::invalid(
            &request.path,
            format!(
                "expected type of {} to be string, got {}",
                request.path,
                request.config_value.value.type_name()
            ),
        )
    })
}

fn expect_int(request: &ValidatorRequest) -> Result<i64, ValidatorResponse> {
    match request.config_value.value {
        Dynamic::Number(n) if n.fract() == 0.0 => Ok(n as i64),
        ref other => Err(ValidatorResponse::invalid(
            &request.path,
            format!(
                "expected type of {} to be integer, got {}",
                request.path,
                other.type_name()
            ),
        )),
    }
}

/// Value must be one of a fixed set of strings
pub struct StringInSlice {
    allowed: Vec<String>,
}

impl StringInSlice {
    pub fn create(allowed: &[&str]) -> Box<dyn Validator> {
        Box::new(Self {
            allowed: allowed.iter().map(|s| s.to_string()).collect(),
        })
    }
}

impl Validator for StringInSlice {
    fn description(&self) -> String {
        format!("value must be one of {:?}", self.allowed)
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let value = match expect_string(&request) {
            Ok(v) => v,
            Err(response) => return response,
        };
        if self.allowed.iter().any(|a| a == value) {
            return ValidatorResponse::default();
        }
        ValidatorResponse::invalid(
            &request.path,
            format!(
                "expected {} to be one of {:?}, got {}",
                request.path, self.allowed, value
            ),
        )
    }
}

/// Value must match a regular expression
pub struct StringMatch {
    pattern: Regex,
    message: String,
}

impl StringMatch {
    /// An invalid pattern yields a validator that rejects every value.
    pub fn create(pattern: &str, message: &str) -> Box<dyn Validator> {
        match Regex::new(pattern) {
            Ok(pattern) => Box::new(Self {
                pattern,
                message: message.to_string(),
            }),
            Err(e) => Box::new(Rejecting {
                reason: format!("invalid pattern {}: {}", pattern, e),
            }),
        }
    }
}

impl Validator for StringMatch {
    fn description(&self) -> String {
        format!("value must match {}", self.pattern.as_str())
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let value = match expect_string(&request) {
            Ok(v) => v,
            Err(response) => return response,
        };
        if self.pattern.is_match(value) {
            return ValidatorResponse::default();
        }
        ValidatorResponse::invalid(&request.path, format!("{}: {}", request.path, self.message))
    }
}

struct Rejecting {
    reason: String,
}

impl Validator for Rejecting {
    fn description(&self) -> String {
        self.reason.clone()
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        ValidatorResponse::invalid(&request.path, self.reason.clone())
    }
}

/// Value must be a string with at least one non-whitespace character
pub struct StringNotEmpty;

impl StringNotEmpty {
    pub fn create() -> Box<dyn Validator> {
        Box::new(Self)
    }
}

impl Validator for StringNotEmpty {
    fn description(&self) -> String {
        "value must not be empty".to_string()
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let value = match expect_string(&request) {
            Ok(v) => v,
            Err(response) => return response,
        };
        if value.trim().is_empty() {
            return ValidatorResponse::invalid(
                &request.path,
                format!("expected {} to not be an empty string", request.path),
            );
        }
        ValidatorResponse::default()
    }
}

/// String length must fall within an inclusive range
pub struct StringLenBetween {
    min: usize,
    max: usize,
}

impl StringLenBetween {
    pub fn create(min: usize, max: usize) -> Box<dyn Validator> {
        Box::new(Self { min, max })
    }
}

impl Validator for StringLenBetween {
    fn description(&self) -> String {
        format!("length must be between {} and {}", self.min, self.max)
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let value = match expect_string(&request) {
            Ok(v) => v,
            Err(response) => return response,
        };
        let len = value.chars().count();
        if len < self.min || len > self.max {
            return ValidatorResponse::invalid(
                &request.path,
                format!(
                    "expected length of {} to be in the range ({} - {}), got {}",
                    request.path, self.min, self.max, len
                ),
            );
        }
        ValidatorResponse::default()
    }
}

/// Integer within an inclusive range
pub struct IntBetween {
    min: i64,
    max: i64,
}

impl IntBetween {
    pub fn create(min: i64, max: i64) -> Box<dyn Validator> {
        Box::new(Self { min, max })
    }
}

impl Validator for IntBetween {
    fn description(&self) -> String {
        format!("value must be between {} and {}", self.min, self.max)
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let value = match expect_int(&request) {
            Ok(v) => v,
            Err(response) => return response,
        };
        if value < self.min || value > self.max {
            return ValidatorResponse::invalid(
                &request.path,
                format!(
                    "expected {} to be in the range ({} - {}), got {}",
                    request.path, self.min, self.max, value
                ),
            );
        }
        ValidatorResponse::default()
    }
}

/// Integer no smaller than a bound
pub struct IntAtLeast {
    min: i64,
}

impl IntAtLeast {
    pub fn create(min: i64) -> Box<dyn Validator> {
        Box::new(Self { min })
    }
}

impl Validator for IntAtLeast {
    fn description(&self) -> String {
        format!("value must be at least {}", self.min)
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let value = match expect_int(&request) {
            Ok(v) => v,
            Err(response) => return response,
        };
        if value < self.min {
            return ValidatorResponse::invalid(
                &request.path,
                format!(
                    "expected {} to be at least ({}), got {}",
                    request.path, self.min, value
                ),
            );
        }
        ValidatorResponse::default()
    }
}

/// Integer that is a multiple of `divisor`
pub struct IntDivisibleBy {
    divisor: i64,
}

impl IntDivisibleBy {
    pub fn create(divisor: i64) -> Box<dyn Validator> {
        Box::new(Self { divisor })
    }
}

impl Validator for IntDivisibleBy {
    fn description(&self) -> String {
        format!("value must be divisible by {}", self.divisor)
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let value = match expect_int(&request) {
            Ok(v) => v,
            Err(response) => return response,
        };
        if self.divisor == 0 || value % self.divisor != 0 {
            return ValidatorResponse::invalid(
                &request.path,
                format!(
                    "expected {} to be divisible by {}, got: {}",
                    request.path, self.divisor, value
                ),
            );
        }
        ValidatorResponse::default()
    }
}

/// List attribute length within an inclusive range
pub struct ListLength {
    min: usize,
    max: usize,
}

impl ListLength {
    pub fn create(min: usize, max: usize) -> Box<dyn Validator> {
        Box::new(Self { min, max })
    }

    pub fn exactly(len: usize) -> Box<dyn Validator> {
        Self::create(len, len)
    }
}

impl Validator for ListLength {
    fn description(&self) -> String {
        format!("list must have between {} and {} items", self.min, self.max)
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let Some(items) = request.config_value.value.as_list() else {
            return ValidatorResponse::invalid(
                &request.path,
                format!("expected {} to be a list", request.path),
            );
        };
        if items.len() < self.min || items.len() > self.max {
            let detail = if self.min == self.max {
                format!(
                    "{} must contain exactly {} items, got {}",
                    request.path,
                    self.min,
                    items.len()
                )
            } else {
                format!(
                    "{} must contain between {} and {} items, got {}",
                    request.path,
                    self.min,
                    self.max,
                    items.len()
                )
            };
            return ValidatorResponse::invalid(&request.path, detail);
        }
        ValidatorResponse::default()
    }
}

/// Applies an inner validator to every element of a list
pub struct EachElement {
    inner: Box<dyn Validator>,
}

impl EachElement {
    pub fn create(inner: Box<dyn Validator>) -> Box<dyn Validator> {
        Box::new(Self { inner })
    }
}

impl Validator for EachElement {
    fn description(&self) -> String {
        format!("each element: {}", self.inner.description())
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let Some(items) = request.config_value.value.as_list() else {
            return ValidatorResponse::default();
        };
        let diagnostics = items
            .iter()
            .enumerate()
            .filter(|(_, item)| !matches!(item, Dynamic::Null | Dynamic::Unknown))
            .flat_map(|(idx, item)| {
                self.inner
                    .validate(ValidatorRequest {
                        config_value: DynamicValue::new(item.clone()),
                        path: request.path.clone().index(idx as i64),
                    })
                    .diagnostics
            })
            .collect();
        ValidatorResponse { diagnostics }
    }
}

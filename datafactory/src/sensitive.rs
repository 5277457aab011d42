//! Read-back of write-only values
//!
//! The service accepts secrets (tokens, passwords, SAS tokens, license keys)
//! but never returns them. Flatten copies them from the prior state instead,
//! matching list elements on their identifying attributes.

use tfplug::types::{AttributePath, Dynamic, DynamicValue};

/// Value at a dotted path such as `catalog_info.0.administrator_password`
pub fn read_back(prior: &DynamicValue, dotted: &str) -> Option<String> {
    prior
        .lookup(&AttributePath::parse(dotted))
        .and_then(Dynamic::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// `property` of the first element of `items` whose `filters` all match
pub fn read_back_matching(
    items: &[DynamicValue],
    property: &str,
    filters: &[(&str, &str)],
) -> Option<String> {
    items
        .iter()
        .find(|item| {
            filters
                .iter()
                .all(|(key, value)| item.string(key).as_deref().unwrap_or("") == *value)
        })
        .and_then(|item| item.string(property))
}

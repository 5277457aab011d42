//! Resource identifiers for Data Factory entities
//!
//! Identifiers follow the ARM layout
//! `/subscriptions/{s}/resourceGroups/{rg}/providers/Microsoft.DataFactory/factories/{f}`
//! with an optional `/{kind}/{name}` suffix for child entities. Segment keys
//! are matched case-insensitively; values keep their case.

use std::fmt;
use thiserror::Error;

pub const PROVIDER_NAMESPACE: &str = "Microsoft.DataFactory";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdParseError {
    #[error("parsing {input:?}: expected an id of the form /key/value[/key/value...]")]
    Malformed { input: String },

    #[error("parsing {input:?}: expected segment {expected:?}, found {found:?}")]
    UnexpectedSegment {
        input: String,
        expected: String,
        found: String,
    },

    #[error("parsing {input:?}: missing segment {segment:?}")]
    MissingSegment { input: String, segment: String },

    #[error("parsing {input:?}: unexpected trailing segments after {segment:?}")]
    TrailingSegments { input: String, segment: String },

    #[error("parsing {input:?}: expected provider {expected}, found {found}")]
    WrongProvider {
        input: String,
        expected: String,
        found: String,
    },
}

/// Path-addressable identifier of a remote entity
pub trait ResourceId: fmt::Display + Clone + Send + Sync + 'static {
    /// URL path with each value percent-encoded
    fn resource_path(&self) -> String;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FactoryId {
    pub subscription_id: String,
    pub resource_group: String,
    pub factory_name: String,
}

impl FactoryId {
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        factory_name: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            factory_name: factory_name.into(),
        }
    }

    pub fn parse(input: &str) -> Result<Self, IdParseError> {
        let mut segments = Segments::new(input)?;
        let factory = Self::take(&mut segments)?;
        segments.finish("factories")?;
        Ok(factory)
    }

    fn take(segments: &mut Segments<'_>) -> Result<Self, IdParseError> {
        let subscription_id = segments.expect("subscriptions")?;
        let resource_group = segments.expect("resourceGroups")?;
        let namespace = segments.expect("providers")?;
        if !namespace.eq_ignore_ascii_case(PROVIDER_NAMESPACE) {
            return Err(IdParseError::WrongProvider {
                input: segments.input.to_string(),
                expected: PROVIDER_NAMESPACE.to_string(),
                found: namespace.to_string(),
            });
        }
        let factory_name = segments.expect("factories")?;
        Ok(Self::new(subscription_id, resource_group, factory_name))
    }
}

impl fmt::Display for FactoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/subscriptions/{}/resourceGroups/{}/providers/{}/factories/{}",
            self.subscription_id, self.resource_group, PROVIDER_NAMESPACE, self.factory_name
        )
    }
}

impl ResourceId for FactoryId {
    fn resource_path(&self) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{}/providers/{}/factories/{}",
            urlencoding::encode(&self.subscription_id),
            urlencoding::encode(&self.resource_group),
            PROVIDER_NAMESPACE,
            urlencoding::encode(&self.factory_name)
        )
    }
}

/// Entity collections nested under a factory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChildKind {
    LinkedService,
    Dataset,
    IntegrationRuntime,
    Trigger,
}

impl ChildKind {
    pub fn segment(&self) -> &'static str {
        match self {
            ChildKind::LinkedService => "linkedservices",
            ChildKind::Dataset => "datasets",
            ChildKind::IntegrationRuntime => "integrationruntimes",
            ChildKind::Trigger => "triggers",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChildKind::LinkedService => "Linked Service",
            ChildKind::Dataset => "Dataset",
            ChildKind::IntegrationRuntime => "Integration Runtime",
            ChildKind::Trigger => "Trigger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FactoryChildId {
    pub factory: FactoryId,
    pub kind: ChildKind,
    pub name: String,
}

impl FactoryChildId {
    pub fn new(factory: FactoryId, kind: ChildKind, name: impl Into<String>) -> Self {
        Self {
            factory,
            kind,
            name: name.into(),
        }
    }

    /// Parses an id that must address an entity of `kind`
    pub fn parse(input: &str, kind: ChildKind) -> Result<Self, IdParseError> {
        let mut segments = Segments::new(input)?;
        let factory = FactoryId::take(&mut segments)?;
        let name = segments.expect(kind.segment())?;
        segments.finish(kind.segment())?;
        Ok(Self::new(factory, kind, name))
    }
}

impl fmt::Display for FactoryChildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.factory, self.kind.segment(), self.name)
    }
}

impl ResourceId for FactoryChildId {
    fn resource_path(&self) -> String {
        format!(
            "{}/{}/{}",
            self.factory.resource_path(),
            self.kind.segment(),
            urlencoding::encode(&self.name)
        )
    }
}

struct Segments<'a> {
    input: &'a str,
    pairs: std::vec::IntoIter<(&'a str, &'a str)>,
}

impl<'a> Segments<'a> {
    fn new(input: &'a str) -> Result<Self, IdParseError> {
        let malformed = || IdParseError::Malformed {
            input: input.to_string(),
        };
        let trimmed = input
            .strip_prefix('/')
            .ok_or_else(malformed)?
            .trim_end_matches('/');
        let parts: Vec<&str> = trimmed.split('/').collect();
        if parts.len() % 2 != 0 || parts.iter().any(|p| p.is_empty()) {
            return Err(malformed());
        }
        let pairs: Vec<(&str, &str)> = parts.chunks(2).map(|c| (c[0], c[1])).collect();
        Ok(Self {
            input,
            pairs: pairs.into_iter(),
        })
    }

    fn expect(&mut self, key: &str) -> Result<&'a str, IdParseError> {
        match self.pairs.next() {
            Some((found, value)) if found.eq_ignore_ascii_case(key) => Ok(value),
            Some((found, _)) => Err(IdParseError::UnexpectedSegment {
                input: self.input.to_string(),
                expected: key.to_string(),
                found: found.to_string(),
            }),
            None => Err(IdParseError::MissingSegment {
                input: self.input.to_string(),
                segment: key.to_string(),
            }),
        }
    }

    fn finish(mut self, last: &str) -> Result<(), IdParseError> {
        match self.pairs.next() {
            None => Ok(()),
            Some(_) => Err(IdParseError::TrailingSegments {
                input: self.input.to_string(),
                segment: last.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FACTORY: &str =
        "/subscriptions/00000000-0000-0000-0000-000000000000/resourceGroups/acctestRG-df-1/providers/Microsoft.DataFactory/factories/acctestdf1";

    #[test]
    fn factory_id_round_trips() {
        let id = FactoryId::parse(FACTORY).unwrap();
        assert_eq!(id.resource_group, "acctestRG-df-1");
        assert_eq!(id.factory_name, "acctestdf1");
        assert_eq!(id.to_string(), FACTORY);
    }

    #[test]
    fn segment_keys_are_case_insensitive() {
        let lower = FACTORY
            .replace("resourceGroups", "resourcegroups")
            .replace("Microsoft.DataFactory", "microsoft.datafactory");
        let id = FactoryId::parse(&lower).unwrap();
        assert_eq!(id.to_string(), FACTORY);
    }

    #[test]
    fn child_id_round_trips_for_every_kind() {
        for kind in [
            ChildKind::LinkedService,
            ChildKind::Dataset,
            ChildKind::IntegrationRuntime,
            ChildKind::Trigger,
        ] {
            let raw = format!("{}/{}/entity-1", FACTORY, kind.segment());
            let id = FactoryChildId::parse(&raw, kind).unwrap();
            assert_eq!(id.name, "entity-1");
            assert_eq!(id.to_string(), raw);
        }
    }

    #[test]
    fn child_id_rejects_other_kind() {
        let raw = format!("{}/datasets/ds1", FACTORY);
        let err = FactoryChildId::parse(&raw, ChildKind::Trigger).unwrap_err();
        assert!(matches!(err, IdParseError::UnexpectedSegment { ref expected, .. } if expected == "triggers"));
    }

    #[test]
    fn factory_id_rejects_child_suffix() {
        let raw = format!("{}/datasets/ds1", FACTORY);
        assert!(matches!(
            FactoryId::parse(&raw),
            Err(IdParseError::TrailingSegments { .. })
        ));
    }

    #[test]
    fn rejects_wrong_provider() {
        let raw = FACTORY.replace("Microsoft.DataFactory", "Microsoft.Storage");
        assert!(matches!(
            FactoryId::parse(&raw),
            Err(IdParseError::WrongProvider { .. })
        ));
    }

    #[test]
    fn rejects_missing_and_malformed_segments() {
        assert!(matches!(
            FactoryId::parse("/subscriptions/s/resourceGroups/rg"),
            Err(IdParseError::MissingSegment { .. })
        ));
        assert!(matches!(
            FactoryId::parse("subscriptions/s"),
            Err(IdParseError::Malformed { .. })
        ));
        assert!(matches!(
            FactoryId::parse("/subscriptions//resourceGroups/rg"),
            Err(IdParseError::Malformed { .. })
        ));
    }

    #[test]
    fn resource_path_encodes_values() {
        let id = FactoryChildId::new(
            FactoryId::new("sub", "my rg", "df"),
            ChildKind::Dataset,
            "data set",
        );
        assert_eq!(
            id.resource_path(),
            "/subscriptions/sub/resourceGroups/my%20rg/providers/Microsoft.DataFactory/factories/df/datasets/data%20set"
        );
    }
}

//! Dated changepoints carried on attributes.

use serde::{Deserialize, Serialize};

use chrono::NaiveDate;

use crate::error::MappingError;
use crate::model::AttributeValue;

/// The declared kind of a changepoint value.
///
/// The wire form is a lowercase tag. An empty tag means the kind is
/// unspecified: the write path rejects such changepoints, while the read
/// path produces them for synthesized monthly samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalKind {
    /// A monetary amount, written to the session as a number.
    Currency,
    /// Free text.
    Text,
}

impl TemporalKind {
    /// Returns the wire tag for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Currency => "currency",
            Self::Text => "text",
        }
    }
}

impl std::fmt::Display for TemporalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TemporalKind {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "currency" => Ok(Self::Currency),
            "text" => Ok(Self::Text),
            other => Err(MappingError::UnsupportedTemporalKind {
                kind: other.to_string(),
            }),
        }
    }
}

/// A single dated changepoint supplied with, or produced from, an
/// attribute.
///
/// An ascending run of changepoints forms a step function: each value
/// applies from its `effective_from` date until the next changepoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalValueItem {
    effective_from: NaiveDate,
    value: AttributeValue,
    #[serde(with = "kind_tag", default)]
    kind: Option<TemporalKind>,
}

impl TemporalValueItem {
    /// Creates a changepoint with a declared value kind.
    #[must_use]
    pub fn new(
        effective_from: NaiveDate,
        value: impl Into<AttributeValue>,
        kind: TemporalKind,
    ) -> Self {
        Self {
            effective_from,
            value: value.into(),
            kind: Some(kind),
        }
    }

    /// Creates a changepoint with no declared kind, as synthesized on the
    /// way out of a session.
    #[must_use]
    pub fn untyped(effective_from: NaiveDate, value: impl Into<AttributeValue>) -> Self {
        Self {
            effective_from,
            value: value.into(),
            kind: None,
        }
    }

    /// The date this changepoint takes effect.
    #[must_use]
    pub const fn effective_from(&self) -> NaiveDate {
        self.effective_from
    }

    /// The changepoint value.
    #[must_use]
    pub const fn value(&self) -> &AttributeValue {
        &self.value
    }

    /// The declared value kind, if any.
    #[must_use]
    pub const fn kind(&self) -> Option<TemporalKind> {
        self.kind
    }
}

/// Serde adapter for the kind tag: the empty string stands in for "no
/// kind" on both sides, and unsupported tags fail deserialization.
mod kind_tag {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::TemporalKind;

    pub fn serialize<S>(kind: &Option<TemporalKind>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match kind {
            Some(kind) => serializer.serialize_str(kind.as_str()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<TemporalKind>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tag = Option::<String>::deserialize(deserializer)?;
        match tag.as_deref() {
            None | Some("") => Ok(None),
            Some(tag) => tag.parse().map(Some).map_err(serde::de::Error::custom),
        }
    }
}

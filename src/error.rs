//! Error types for detbridge.
//!
//! All errors are strongly typed using thiserror, layered by the boundary
//! that raises them: resource loading, tree mapping, rule-base schema
//! validation, and the determinations engine itself. The top-level
//! [`BridgeError`] folds the layers together so callers can use `?`
//! throughout and still pattern match on the specific condition.

use thiserror::Error;

use chrono::NaiveDate;

use crate::determinations::schema::AttributeKind;
use crate::determinations::InstanceId;

/// Errors raised while locating or reading rule-base resources.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("Resource not found: {name}")]
    NotFound {
        name: String,
    },

    #[error("Failed to read resource '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read rule-base stream: {source}")]
    Stream {
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while mapping an entity tree into or out of a session.
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("Root entity '{name}' is not the global entity")]
    RootNotGlobal {
        name: String,
    },

    #[error("Entity type '{name}' is not declared by the rule-base")]
    UnknownEntity {
        name: String,
    },

    #[error("Attribute '{attribute}' expects a {expected} value, got '{value}'")]
    TypeMismatch {
        attribute: String,
        expected: AttributeKind,
        value: String,
    },

    #[error("Changepoint for attribute '{attribute}' carries no value kind")]
    MissingTemporalKind {
        attribute: String,
    },

    #[error("Unsupported changepoint value kind '{kind}'")]
    UnsupportedTemporalKind {
        kind: String,
    },

    #[error("Monthly samples from {year_start} exceed the supported date range")]
    SampleOverflow {
        year_start: NaiveDate,
    },
}

/// Errors raised when a rule-base schema fails structural validation.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Schema does not declare a global entity")]
    MissingGlobal,

    #[error("Entity type '{name}' is declared more than once")]
    DuplicateEntity {
        name: String,
    },

    #[error("Attribute '{attribute}' on entity '{entity}' is declared more than once")]
    DuplicateAttribute {
        entity: String,
        attribute: String,
    },

    #[error("Entity '{entity}' declares unknown child type '{child}'")]
    UnknownChild {
        entity: String,
        child: String,
    },

    #[error("Entity '{entity}' declares the global entity as a child")]
    GlobalAsChild {
        entity: String,
    },

    #[error("Entity type '{child}' has more than one containment parent")]
    MultipleParents {
        child: String,
    },

    #[error("Entity type '{name}' is not reachable from the global entity")]
    Unreachable {
        name: String,
    },
}

/// Errors raised by a determinations engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Rule-base compilation failed: {message}")]
    Compile {
        message: String,
    },

    #[error("Rule-base schema is invalid: {0}")]
    Schema(#[from] SchemaError),

    #[error("Entity type '{name}' is not declared by the rule-base")]
    UnknownEntity {
        name: String,
    },

    #[error("Entity '{entity}' has no attribute '{attribute}'")]
    UnknownAttribute {
        entity: String,
        attribute: String,
    },

    #[error("Unknown instance: {id}")]
    UnknownInstance {
        id: InstanceId,
    },

    #[error("Entity type '{child}' is not a declared child of '{parent}'")]
    NotAChild {
        parent: String,
        child: String,
    },

    #[error("Containment of '{child}' under '{parent}' is already complete")]
    ContainmentClosed {
        parent: String,
        child: String,
    },

    #[error("Attribute '{attribute}' on entity '{entity}' holds {expected} values")]
    ValueType {
        entity: String,
        attribute: String,
        expected: AttributeKind,
    },

    #[error("Inference failed: {message}")]
    Inference {
        message: String,
    },
}

impl EngineError {
    /// Creates a compilation error from any displayable cause.
    #[must_use]
    pub fn compile(message: impl Into<String>) -> Self {
        Self::Compile {
            message: message.into(),
        }
    }
}

/// Top-level error type for detbridge.
///
/// This enum encompasses every failure that can surface while executing
/// a determinations session end to end.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),

    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl BridgeError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a resource error.
    #[must_use]
    pub const fn is_resource(&self) -> bool {
        matches!(self, Self::Resource(_))
    }

    /// Returns true if this is a mapping error.
    #[must_use]
    pub const fn is_mapping(&self) -> bool {
        matches!(self, Self::Mapping(_))
    }

    /// Returns true if this is an engine error.
    #[must_use]
    pub const fn is_engine(&self) -> bool {
        matches!(self, Self::Engine(_))
    }

    /// Returns true if this is an internal error.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }

    /// Returns true if the failure names an entity type the rule-base
    /// does not declare, from either side of the engine seam.
    #[must_use]
    pub const fn is_unknown_entity(&self) -> bool {
        matches!(
            self,
            Self::Mapping(MappingError::UnknownEntity { .. })
                | Self::Engine(EngineError::UnknownEntity { .. })
        )
    }
}

/// Result type alias for detbridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

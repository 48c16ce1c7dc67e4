//! The determinations-engine contract.
//!
//! These traits define the seam between the mapping layer and a rules
//! engine. By using traits, we enable:
//! - The in-memory reference engine for testing and embedded use
//! - Vendor engine adapters behind the same surface
//!
//! Instances inside a session are addressed through opaque
//! [`InstanceId`] handles; the mapping layer never sees engine
//! internals.

pub mod memory;
pub mod schema;
pub mod value;

pub use memory::MemoryEngine;
pub use schema::{AttributeDef, AttributeKind, EntityDef, RulebaseSchema};
pub use value::{ChangePoint, ChangePointValue, EngineValue, TemporalValue};

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use uuid::Uuid;

use crate::error::EngineError;

/// Opaque handle to an entity instance inside a session.
///
/// Handles are engine-assigned and only meaningful to the session that
/// issued them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct InstanceId(u64);

impl InstanceId {
    /// Creates a handle from an engine-assigned raw value.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw engine-assigned value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generates a new random session identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for SessionId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A rules engine capable of compiling rule-bases and opening sessions.
pub trait DeterminationsEngine: Send + Sync {
    /// The engine product name, for diagnostics.
    fn name(&self) -> &str;

    /// The engine version string, for diagnostics.
    fn version(&self) -> &str;

    /// Compiles a rule-base from its raw bytes.
    fn compile_rulebase(&self, bytes: &[u8]) -> Result<Arc<dyn CompiledRulebase>, EngineError>;
}

/// A compiled rule-base, ready to open sessions against.
///
/// Compiled rule-bases are immutable and shared; sessions opened from
/// one are independent.
pub trait CompiledRulebase: Send + Sync {
    /// The rule-base name declared by the archive.
    fn name(&self) -> &str;

    /// The schema resolved at compile time.
    fn schema(&self) -> Arc<RulebaseSchema>;

    /// Opens a fresh session holding an empty global instance.
    fn open_session(&self) -> Result<Box<dyn EngineSession>, EngineError>;
}

impl std::fmt::Debug for dyn CompiledRulebase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CompiledRulebase({})", self.name())
    }
}

/// A single inference session over a compiled rule-base.
///
/// A session is owned by one caller at a time: facts are written in,
/// [`think`](Self::think) runs inference, then conclusions are read out.
pub trait EngineSession: Send {
    /// The session identifier.
    fn id(&self) -> SessionId;

    /// The schema of the rule-base this session runs.
    fn schema(&self) -> Arc<RulebaseSchema>;

    /// The pre-created root instance of the global entity.
    fn global_instance(&self) -> InstanceId;

    /// The entity type name of an instance.
    fn entity_name(&self, instance: InstanceId) -> Result<String, EngineError>;

    /// Creates an instance of `entity` contained in `parent`.
    fn create_instance(&mut self, entity: &str, parent: InstanceId)
        -> Result<InstanceId, EngineError>;

    /// Writes an attribute value on an instance.
    fn set_value(
        &mut self,
        instance: InstanceId,
        attribute: &str,
        value: EngineValue,
    ) -> Result<(), EngineError>;

    /// Reads an attribute value from an instance, `None` when unset.
    fn value(&self, instance: InstanceId, attribute: &str)
        -> Result<Option<EngineValue>, EngineError>;

    /// Declares that no further `child` instances will be created under
    /// `parent`.
    fn mark_containment_complete(
        &mut self,
        parent: InstanceId,
        child: &str,
    ) -> Result<(), EngineError>;

    /// Returns true if containment of `child` under `parent` has been
    /// declared complete.
    fn containment_complete(&self, parent: InstanceId, child: &str) -> Result<bool, EngineError>;

    /// Instances of `child` contained in `parent`, in creation order.
    fn children(&self, parent: InstanceId, child: &str) -> Result<Vec<InstanceId>, EngineError>;

    /// Runs inference over the supplied facts until quiescent.
    fn think(&mut self) -> Result<(), EngineError>;
}

impl std::fmt::Debug for dyn EngineSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EngineSession({})", self.id())
    }
}

//! Building engine sessions from rule-base streams and entity trees.
//!
//! The write path ([`write`]) maps a [`DataEntity`] tree into a fresh
//! session; the read path ([`read`]) rebuilds a tree from a session
//! after inference. [`SessionBuilder`] ties the write path to the
//! compile cache: one builder serves any number of rule-bases.

pub mod read;
pub mod write;

pub use read::DataEntityBuilder;
pub use write::{map_entity, map_global_entity, map_temporal_value, set_attribute};

use std::io::Read;
use std::sync::Arc;

use tracing::info;

use crate::determinations::{DeterminationsEngine, EngineSession};
use crate::error::{BridgeResult, ResourceError};
use crate::model::DataEntity;
use crate::rulebase::RulebaseCache;

/// Builds ready-to-run sessions from rule-base streams.
///
/// The builder owns a content-keyed compile cache, so feeding it the
/// same rule-base repeatedly compiles once and reuses the published
/// artifact for every later session.
pub struct SessionBuilder {
    engine: Arc<dyn DeterminationsEngine>,
    cache: RulebaseCache,
}

impl SessionBuilder {
    /// Creates a builder compiling with the given engine, with an empty
    /// cache.
    #[must_use]
    pub fn new(engine: Arc<dyn DeterminationsEngine>) -> Self {
        Self {
            engine,
            cache: RulebaseCache::new(),
        }
    }

    /// The engine this builder compiles with.
    #[must_use]
    pub fn engine(&self) -> &Arc<dyn DeterminationsEngine> {
        &self.engine
    }

    /// The compile cache.
    #[must_use]
    pub const fn cache(&self) -> &RulebaseCache {
        &self.cache
    }

    /// Reads a rule-base stream, compiles it unless its content is
    /// already cached, opens a session, and maps `global` onto the
    /// session's root instance.
    ///
    /// # Errors
    ///
    /// Fails if the stream cannot be read, the rule-base does not
    /// compile, or the tree does not map onto the rule-base's schema.
    pub fn create_session(
        &self,
        rulebase: &mut dyn Read,
        global: &DataEntity,
    ) -> BridgeResult<Box<dyn EngineSession>> {
        let mut bytes = Vec::new();
        rulebase
            .read_to_end(&mut bytes)
            .map_err(|source| ResourceError::Stream { source })?;

        let compiled = self.cache.get_or_compile(self.engine.as_ref(), &bytes)?;
        let mut session = compiled.open_session()?;
        write::map_global_entity(session.as_mut(), global)?;
        info!(
            session = %session.id(),
            rulebase = compiled.name(),
            entities = global.count(),
            "session created"
        );
        Ok(session)
    }
}

//! Content-addressed caching of compiled rule-bases.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};
use std::time::Instant;

use tracing::{debug, info};

use crate::determinations::{CompiledRulebase, DeterminationsEngine};
use crate::error::{BridgeError, BridgeResult};

/// Content hash identifying a rule-base by its bytes.
///
/// Byte-identical rule-bases share a key regardless of which resource
/// they were loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RulebaseKey([u8; 32]);

impl RulebaseKey {
    /// Hashes rule-base bytes into a key.
    #[must_use]
    pub fn for_bytes(bytes: &[u8]) -> Self {
        Self(*blake3::hash(bytes).as_bytes())
    }
}

impl fmt::Display for RulebaseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Compile-once cache of rule-bases, keyed by content hash.
///
/// Distinct contents compile independently, so one cache can serve any
/// number of rule-bases. There is no eviction: deployments run a small,
/// fixed set of rule-bases for the lifetime of the process.
#[derive(Default)]
pub struct RulebaseCache {
    compiled: RwLock<HashMap<RulebaseKey, Arc<dyn CompiledRulebase>>>,
}

impl RulebaseCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct rule-bases compiled so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.compiled.read().map_or(0, |guard| guard.len())
    }

    /// Returns true if nothing has been compiled yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the compiled rule-base for `bytes`, compiling it with
    /// `engine` on first sight of the content.
    ///
    /// # Errors
    ///
    /// Returns the engine's compilation error; failed compilations are
    /// not cached.
    pub fn get_or_compile(
        &self,
        engine: &dyn DeterminationsEngine,
        bytes: &[u8],
    ) -> BridgeResult<Arc<dyn CompiledRulebase>> {
        let key = RulebaseKey::for_bytes(bytes);

        {
            let guard = self
                .compiled
                .read()
                .map_err(|_| BridgeError::internal("rule-base cache lock poisoned"))?;
            if let Some(rulebase) = guard.get(&key) {
                debug!(key = %key, rulebase = rulebase.name(), "rule-base cache hit");
                return Ok(Arc::clone(rulebase));
            }
        }

        let started = Instant::now();
        let compiled = engine.compile_rulebase(bytes)?;
        info!(
            engine = engine.name(),
            version = engine.version(),
            rulebase = compiled.name(),
            key = %key,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "compiled rule-base"
        );

        let mut guard = self
            .compiled
            .write()
            .map_err(|_| BridgeError::internal("rule-base cache lock poisoned"))?;
        // A racing caller may have compiled the same content first.
        let entry = guard.entry(key).or_insert(compiled);
        Ok(Arc::clone(entry))
    }
}

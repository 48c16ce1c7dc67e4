//! Orchestration: one call from input tree to determined output tree.

use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use tracing::debug;

use crate::determinations::DeterminationsEngine;
use crate::error::BridgeResult;
use crate::model::DataEntity;
use crate::rulebase::{ResourceResolver, RulebaseProvider};
use crate::session::{DataEntityBuilder, SessionBuilder};

/// Configuration for a determinations service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Name of the rule-base resource to execute against.
    pub rulebase_resource: String,
    /// Reporting-year start used for monthly temporal samples.
    pub year_start: NaiveDate,
}

impl ServiceConfig {
    /// Creates a config for a named rule-base resource and year start.
    #[must_use]
    pub fn new(rulebase_resource: impl Into<String>, year_start: NaiveDate) -> Self {
        Self {
            rulebase_resource: rulebase_resource.into(),
            year_start,
        }
    }
}

/// Runs rule-base sessions end to end: resolves the configured
/// rule-base, builds a session from an input tree, runs inference, and
/// rebuilds the determined tree.
///
/// The service is cheap to share behind an [`Arc`]: repeated executions
/// against the same rule-base reuse the compiled artifact.
pub struct DeterminationsService {
    sessions: SessionBuilder,
    entities: DataEntityBuilder,
    provider: RulebaseProvider,
    resources: Arc<dyn ResourceResolver>,
}

impl DeterminationsService {
    /// Creates a service executing `config`'s rule-base on `engine`,
    /// resolving resources through `resources`.
    #[must_use]
    pub fn new(
        engine: Arc<dyn DeterminationsEngine>,
        resources: Arc<dyn ResourceResolver>,
        config: &ServiceConfig,
    ) -> Self {
        Self {
            sessions: SessionBuilder::new(engine),
            entities: DataEntityBuilder::new(config.year_start),
            provider: RulebaseProvider::new(config.rulebase_resource.clone()),
            resources,
        }
    }

    /// Assembles a service from prebuilt collaborators, for hosts that
    /// construct the session builder, entity builder, or provider
    /// themselves.
    #[must_use]
    pub fn with_parts(
        sessions: SessionBuilder,
        entities: DataEntityBuilder,
        provider: RulebaseProvider,
        resources: Arc<dyn ResourceResolver>,
    ) -> Self {
        Self {
            sessions,
            entities,
            provider,
            resources,
        }
    }

    /// The name of the rule-base resource this service executes.
    #[must_use]
    pub fn rulebase_resource(&self) -> &str {
        self.provider.resource_name()
    }

    /// Executes one session: maps `global` in, runs inference to
    /// quiescence, and returns the determined tree.
    ///
    /// # Errors
    ///
    /// Fails if the rule-base resource cannot be opened or compiled, or
    /// if the tree does not map onto its schema.
    pub fn execute_session(&self, global: &DataEntity) -> BridgeResult<DataEntity> {
        let mut session = {
            let mut stream = self.provider.open(self.resources.as_ref())?;
            self.sessions.create_session(stream.as_mut(), global)?
        };

        let started = Instant::now();
        session.think()?;
        debug!(
            session = %session.id(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "inference complete"
        );

        self.entities
            .build_root(session.as_ref(), session.global_instance())
    }
}

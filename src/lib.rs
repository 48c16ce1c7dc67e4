//! # detbridge - Data Entities in, Determinations out
//!
//! detbridge moves generic data-entity trees in and out of rule-base
//! sessions. It compiles rule-bases on demand and caches them by
//! content, maps a supplied tree onto a fresh session, runs inference
//! to quiescence, and rebuilds the determined tree with temporal
//! values flattened into monthly samples. The engine executing the
//! rule-base sits behind a trait; an in-memory engine ships with the
//! crate for tests and embedding.
//!
//! ## Core Concepts
//!
//! - **DataEntity**: a named tree of attributes, the generic currency
//!   callers supply and receive
//! - **Rule-base**: a compiled decision model a determinations engine
//!   executes
//! - **Session**: one inference run over a rule-base, seeded from a
//!   tree and read back into one
//! - **Temporal value**: dated changepoints applied as a step function
//!   over the reporting year
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use chrono::NaiveDate;
//! use detbridge::determinations::MemoryEngine;
//! use detbridge::model::{AttributeData, DataEntity};
//! use detbridge::rulebase::ResourceCatalog;
//! use detbridge::{DeterminationsService, ServiceConfig};
//!
//! let rulebase = r#"{
//!     "name": "Loans Bursary 17_18",
//!     "entities": [
//!         {"name": "global",
//!          "attributes": [{"name": "UKPRN", "kind": "number"}],
//!          "children": ["Learner"]},
//!         {"name": "Learner",
//!          "attributes": [{"name": "LearnRefNumber", "kind": "text"}],
//!          "children": []}
//!     ]
//! }"#;
//!
//! let resources = ResourceCatalog::new().with_resource("Loans Bursary 17_18", rulebase);
//! let config = ServiceConfig::new(
//!     "Loans Bursary 17_18",
//!     NaiveDate::from_ymd_opt(2017, 8, 1).unwrap(),
//! );
//! let service = DeterminationsService::new(
//!     Arc::new(MemoryEngine::new()),
//!     Arc::new(resources),
//!     &config,
//! );
//!
//! let global = DataEntity::global()
//!     .with_attribute(AttributeData::new("UKPRN", 12_345_678i64))
//!     .with_child(
//!         DataEntity::new("Learner")
//!             .with_attribute(AttributeData::new("LearnRefNumber", "Learner1")),
//!     );
//!
//! let determined = service.execute_session(&global)?;
//! assert_eq!(determined.children().len(), 1);
//! # Ok::<(), detbridge::BridgeError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Data contract and error surface
pub mod error;
pub mod model;

// Engine seam, rule-base plumbing, and orchestration
pub mod determinations;
pub mod rulebase;
pub mod service;
pub mod session;

// Re-export primary types at crate root for convenience
pub use error::{BridgeError, BridgeResult, EngineError, MappingError, ResourceError, SchemaError};
pub use model::{
    AttributeData, AttributeValue, DataEntity, TemporalKind, TemporalValueItem, GLOBAL_NAME,
};

pub use determinations::{
    AttributeKind, ChangePoint, ChangePointValue, CompiledRulebase, DeterminationsEngine,
    EngineSession, EngineValue, InstanceId, MemoryEngine, RulebaseSchema, SessionId, TemporalValue,
};
pub use rulebase::{ResourceCatalog, ResourceResolver, RulebaseCache, RulebaseKey, RulebaseProvider};
pub use service::{DeterminationsService, ServiceConfig};
pub use session::{DataEntityBuilder, SessionBuilder};

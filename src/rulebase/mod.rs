//! Rule-base location, loading, and compile caching.

pub mod cache;
pub mod provider;

pub use cache::{RulebaseCache, RulebaseKey};
pub use provider::{ResourceCatalog, ResourceResolver, RulebaseProvider};

//! The generic data model exchanged with determinations engines.
//!
//! This module groups the entity tree, attribute payloads, and temporal
//! changepoint types.

pub mod attribute;
pub mod entity;
pub mod temporal;

pub use attribute::{AttributeData, AttributeValue};
pub use entity::{DataEntity, GLOBAL_NAME};
pub use temporal::{TemporalKind, TemporalValueItem};

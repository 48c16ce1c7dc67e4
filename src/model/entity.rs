//! The hierarchical entity tree exchanged with determinations sessions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{AttributeData, AttributeValue};

/// Name of the root entity type, compared case-insensitively.
pub const GLOBAL_NAME: &str = "global";

/// A node in the data model exchanged with a session.
///
/// Entities form a tree rooted at the global entity. Attributes are
/// keyed by name; children keep their supplied order. Attaching a child
/// records the parent's name on it, so [`parent_name`] is `None` exactly
/// on roots.
///
/// [`parent_name`]: DataEntity::parent_name
///
/// # Examples
///
/// ```
/// use detbridge::model::{AttributeData, DataEntity};
///
/// let learner = DataEntity::new("Learner")
///     .with_attribute(AttributeData::new("LearnRefNumber", "Learner1"));
/// let global = DataEntity::global().with_child(learner);
///
/// assert!(global.is_global());
/// assert_eq!(global.children()[0].parent_name(), Some("global"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataEntity {
    name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    attributes: BTreeMap<String, AttributeData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<DataEntity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_name: Option<String>,
}

impl DataEntity {
    /// Creates an empty entity of the given type.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
            parent_name: None,
        }
    }

    /// Creates an empty global entity.
    #[must_use]
    pub fn global() -> Self {
        Self::new(GLOBAL_NAME)
    }

    /// The entity type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The name of the containing entity, `None` for roots.
    #[must_use]
    pub fn parent_name(&self) -> Option<&str> {
        self.parent_name.as_deref()
    }

    /// Returns true if this is the global (root) entity type.
    #[must_use]
    pub fn is_global(&self) -> bool {
        self.name.eq_ignore_ascii_case(GLOBAL_NAME)
    }

    /// The attributes keyed by name.
    #[must_use]
    pub const fn attributes(&self) -> &BTreeMap<String, AttributeData> {
        &self.attributes
    }

    /// Looks up an attribute by name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&AttributeData> {
        self.attributes.get(name)
    }

    /// Looks up an attribute's scalar value by name.
    ///
    /// Returns `None` for absent attributes; attributes present with a
    /// null value return `Some(&AttributeValue::Null)`.
    #[must_use]
    pub fn attribute_value(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name).map(AttributeData::value)
    }

    /// Inserts an attribute, replacing any previous one with the same
    /// name.
    pub fn set_attribute(&mut self, attribute: AttributeData) {
        self.attributes
            .insert(attribute.name().to_string(), attribute);
    }

    /// Adds an attribute, builder style.
    #[must_use]
    pub fn with_attribute(mut self, attribute: AttributeData) -> Self {
        self.set_attribute(attribute);
        self
    }

    /// The child entities in supplied order.
    #[must_use]
    pub fn children(&self) -> &[DataEntity] {
        &self.children
    }

    /// Iterates the children of the given entity type.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a DataEntity> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Attaches a child, recording this entity's name as its parent.
    pub fn add_child(&mut self, mut child: DataEntity) {
        child.parent_name = Some(self.name.clone());
        self.children.push(child);
    }

    /// Attaches a child, builder style.
    #[must_use]
    pub fn with_child(mut self, child: DataEntity) -> Self {
        self.add_child(child);
        self
    }

    /// Counts the entities in this subtree, including this one.
    #[must_use]
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(DataEntity::count).sum::<usize>()
    }
}

//! Rule-base schemas: entity types, attribute kinds, and containment.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::model::GLOBAL_NAME;

/// The kind of values an attribute holds, resolved once when the schema
/// is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    /// True or false.
    Boolean,
    /// Double-precision numbers, including monetary amounts.
    Number,
    /// Free text.
    Text,
    /// Calendar dates.
    Date,
    /// Dated changepoint runs.
    Temporal,
}

impl AttributeKind {
    /// Returns the lowercase kind name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::Text => "text",
            Self::Date => "date",
            Self::Temporal => "temporal",
        }
    }
}

impl std::fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An attribute declared on an entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDef {
    /// The attribute name.
    pub name: String,
    /// The kind of values the attribute holds.
    pub kind: AttributeKind,
}

impl AttributeDef {
    /// Creates an attribute declaration.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: AttributeKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// An entity type declared by a rule-base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDef {
    /// The entity type name.
    pub name: String,
    /// Attributes declared on this type, in declaration order.
    #[serde(default)]
    pub attributes: Vec<AttributeDef>,
    /// Child entity types contained by this type, in declaration order.
    #[serde(default)]
    pub children: Vec<String>,
}

impl EntityDef {
    /// Creates an entity declaration with no attributes or children.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Declares an attribute, builder style.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, kind: AttributeKind) -> Self {
        self.attributes.push(AttributeDef::new(name, kind));
        self
    }

    /// Declares a child entity type, builder style.
    #[must_use]
    pub fn with_child(mut self, child: impl Into<String>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Looks up a declared attribute by name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&AttributeDef> {
        self.attributes.iter().find(|attr| attr.name == name)
    }

    /// Returns true if `child` is a declared child type.
    #[must_use]
    pub fn declares_child(&self, child: &str) -> bool {
        self.children.iter().any(|name| name == child)
    }

    /// Returns true if this is the global entity type.
    #[must_use]
    pub fn is_global(&self) -> bool {
        self.name.eq_ignore_ascii_case(GLOBAL_NAME)
    }
}

/// A validated rule-base schema.
///
/// Construction checks the declarations hang together: a global root
/// exists, names are unique, child references resolve, and every type is
/// reachable from the root through exactly one containment parent.
#[derive(Debug, Clone, PartialEq)]
pub struct RulebaseSchema {
    entities: BTreeMap<String, EntityDef>,
    global: String,
}

impl RulebaseSchema {
    /// Validates entity declarations into a schema.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] describing the first structural problem
    /// found.
    pub fn from_entities(entities: Vec<EntityDef>) -> Result<Self, SchemaError> {
        let mut map = BTreeMap::new();
        let mut global = None;

        for def in entities {
            for (index, attr) in def.attributes.iter().enumerate() {
                if def.attributes[..index].iter().any(|a| a.name == attr.name) {
                    return Err(SchemaError::DuplicateAttribute {
                        entity: def.name.clone(),
                        attribute: attr.name.clone(),
                    });
                }
            }
            if def.is_global() {
                if global.is_some() {
                    return Err(SchemaError::DuplicateEntity {
                        name: def.name.clone(),
                    });
                }
                global = Some(def.name.clone());
            }
            let name = def.name.clone();
            if map.insert(name.clone(), def).is_some() {
                return Err(SchemaError::DuplicateEntity { name });
            }
        }

        let Some(global) = global else {
            return Err(SchemaError::MissingGlobal);
        };

        let mut parents: HashMap<&str, &str> = HashMap::new();
        for def in map.values() {
            for child in &def.children {
                let Some(child_def) = map.get(child) else {
                    return Err(SchemaError::UnknownChild {
                        entity: def.name.clone(),
                        child: child.clone(),
                    });
                };
                if child_def.is_global() {
                    return Err(SchemaError::GlobalAsChild {
                        entity: def.name.clone(),
                    });
                }
                if parents.insert(child.as_str(), def.name.as_str()).is_some() {
                    return Err(SchemaError::MultipleParents {
                        child: child.clone(),
                    });
                }
            }
        }

        let mut reachable = HashSet::new();
        let mut stack = vec![global.as_str()];
        while let Some(name) = stack.pop() {
            if reachable.insert(name) {
                if let Some(def) = map.get(name) {
                    stack.extend(def.children.iter().map(String::as_str));
                }
            }
        }
        for name in map.keys() {
            if !reachable.contains(name.as_str()) {
                return Err(SchemaError::Unreachable { name: name.clone() });
            }
        }

        Ok(Self {
            entities: map,
            global,
        })
    }

    /// Looks up an entity type by name.
    #[must_use]
    pub fn entity(&self, name: &str) -> Option<&EntityDef> {
        self.entities.get(name)
    }

    /// The global entity declaration.
    #[must_use]
    pub fn global(&self) -> &EntityDef {
        // The global entry is guaranteed present by construction.
        &self.entities[self.global.as_str()]
    }

    /// All entity declarations, keyed by name.
    #[must_use]
    pub const fn entities(&self) -> &BTreeMap<String, EntityDef> {
        &self.entities
    }

    /// Number of declared entity types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if the schema declares no entity types.
    ///
    /// Never true for a validated schema, which always holds the global
    /// entity; provided for completeness alongside [`len`](Self::len).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn learner_schema() -> Vec<EntityDef> {
        vec![
            EntityDef::new("global")
                .with_attribute("UKPRN", AttributeKind::Number)
                .with_child("Learner"),
            EntityDef::new("Learner")
                .with_attribute("LearnRefNumber", AttributeKind::Text)
                .with_child("LearningDelivery"),
            EntityDef::new("LearningDelivery")
                .with_attribute("LearnStartDate", AttributeKind::Date),
        ]
    }

    #[test]
    fn test_valid_schema() {
        let schema = RulebaseSchema::from_entities(learner_schema()).unwrap();
        assert_eq!(schema.len(), 3);
        assert_eq!(schema.global().name, "global");
        assert!(schema.entity("Learner").is_some());
        assert!(schema.entity("Absent").is_none());
        assert!(!schema.is_empty());
    }

    #[test]
    fn test_missing_global() {
        let err = RulebaseSchema::from_entities(vec![EntityDef::new("Learner")]).unwrap_err();
        assert!(matches!(err, SchemaError::MissingGlobal));
    }

    #[test]
    fn test_duplicate_entity() {
        let err = RulebaseSchema::from_entities(vec![
            EntityDef::new("global").with_child("Learner"),
            EntityDef::new("Learner"),
            EntityDef::new("Learner"),
        ])
        .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateEntity { name } if name == "Learner"));
    }

    #[test]
    fn test_duplicate_attribute() {
        let err = RulebaseSchema::from_entities(vec![EntityDef::new("global")
            .with_attribute("UKPRN", AttributeKind::Number)
            .with_attribute("UKPRN", AttributeKind::Text)])
        .unwrap_err();
        assert!(
            matches!(err, SchemaError::DuplicateAttribute { attribute, .. } if attribute == "UKPRN")
        );
    }

    #[test]
    fn test_unknown_child() {
        let err =
            RulebaseSchema::from_entities(vec![EntityDef::new("global").with_child("Ghost")])
                .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownChild { child, .. } if child == "Ghost"));
    }

    #[test]
    fn test_global_as_child() {
        let err = RulebaseSchema::from_entities(vec![
            EntityDef::new("global").with_child("Learner"),
            EntityDef::new("Learner").with_child("global"),
        ])
        .unwrap_err();
        assert!(matches!(err, SchemaError::GlobalAsChild { entity } if entity == "Learner"));
    }

    #[test]
    fn test_multiple_parents() {
        let err = RulebaseSchema::from_entities(vec![
            EntityDef::new("global")
                .with_child("Learner")
                .with_child("Provider"),
            EntityDef::new("Learner").with_child("Shared"),
            EntityDef::new("Provider").with_child("Shared"),
            EntityDef::new("Shared"),
        ])
        .unwrap_err();
        assert!(matches!(err, SchemaError::MultipleParents { child } if child == "Shared"));
    }

    #[test]
    fn test_unreachable_entity() {
        let err = RulebaseSchema::from_entities(vec![
            EntityDef::new("global"),
            EntityDef::new("Orphan"),
        ])
        .unwrap_err();
        assert!(matches!(err, SchemaError::Unreachable { name } if name == "Orphan"));
    }

    #[test]
    fn test_entity_def_lookups() {
        let def = EntityDef::new("Learner")
            .with_attribute("LearnRefNumber", AttributeKind::Text)
            .with_child("LearningDelivery");
        assert_eq!(
            def.attribute("LearnRefNumber").map(|a| a.kind),
            Some(AttributeKind::Text)
        );
        assert!(def.attribute("Absent").is_none());
        assert!(def.declares_child("LearningDelivery"));
        assert!(!def.declares_child("Absent"));
        assert!(!def.is_global());
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(format!("{}", AttributeKind::Boolean), "boolean");
        assert_eq!(format!("{}", AttributeKind::Temporal), "temporal");
    }

    #[test]
    fn test_entity_def_serialization() {
        let def = EntityDef::new("Learner").with_attribute("ULN", AttributeKind::Number);
        let json = serde_json::to_string(&def).unwrap();
        assert!(json.contains("\"number\""));
        let deserialized: EntityDef = serde_json::from_str(&json).unwrap();
        assert_eq!(def, deserialized);
    }
}

//! In-memory determinations engine.
//!
//! This module provides a self-contained engine behind the contract
//! traits. It is intended for embedded usage, tests, and as a reference
//! implementation: rule-bases are JSON [`RulebaseDefinition`] archives,
//! and inference is constant defaulting, which is enough to exercise the
//! whole mapping surface without a vendor engine.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::determinations::schema::{EntityDef, RulebaseSchema};
use crate::determinations::value::EngineValue;
use crate::determinations::{
    CompiledRulebase, DeterminationsEngine, EngineSession, InstanceId, SessionId,
};
use crate::error::EngineError;

/// Name reported by the in-memory engine.
pub const ENGINE_NAME: &str = "detbridge-memory";

/// Version reported by the in-memory engine.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// The JSON archive format compiled by [`MemoryEngine`]: declared entity
/// types plus constant defaulting rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulebaseDefinition {
    /// The rule-base name.
    pub name: String,
    /// Declared entity types.
    pub entities: Vec<EntityDef>,
    /// Defaulting rules applied by `think`.
    #[serde(default)]
    pub rules: Vec<DefaultRule>,
}

/// A constant defaulting rule: on `think`, concludes `value` for
/// `attribute` on every instance of `entity` where it is still unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultRule {
    /// Target entity type.
    pub entity: String,
    /// Target attribute.
    pub attribute: String,
    /// The constant to conclude.
    pub value: EngineValue,
}

/// The in-memory determinations engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryEngine;

impl MemoryEngine {
    /// Creates the engine.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl DeterminationsEngine for MemoryEngine {
    fn name(&self) -> &str {
        ENGINE_NAME
    }

    fn version(&self) -> &str {
        ENGINE_VERSION
    }

    fn compile_rulebase(&self, bytes: &[u8]) -> Result<Arc<dyn CompiledRulebase>, EngineError> {
        let definition: RulebaseDefinition =
            serde_json::from_slice(bytes).map_err(|err| EngineError::compile(err.to_string()))?;
        let schema = Arc::new(RulebaseSchema::from_entities(definition.entities)?);

        // Rules are checked against the schema here so sessions never
        // see an ill-typed conclusion.
        for rule in &definition.rules {
            let Some(entity) = schema.entity(&rule.entity) else {
                return Err(EngineError::compile(format!(
                    "rule targets undeclared entity '{}'",
                    rule.entity
                )));
            };
            let Some(attribute) = entity.attribute(&rule.attribute) else {
                return Err(EngineError::compile(format!(
                    "rule targets undeclared attribute '{}.{}'",
                    rule.entity, rule.attribute
                )));
            };
            if attribute.kind != rule.value.kind() {
                return Err(EngineError::compile(format!(
                    "rule value for '{}.{}' is not {}",
                    rule.entity, rule.attribute, attribute.kind
                )));
            }
        }

        Ok(Arc::new(MemoryRulebase {
            name: definition.name,
            schema,
            rules: definition.rules,
        }))
    }
}

/// A compiled in-memory rule-base.
#[derive(Debug)]
struct MemoryRulebase {
    name: String,
    schema: Arc<RulebaseSchema>,
    rules: Vec<DefaultRule>,
}

impl CompiledRulebase for MemoryRulebase {
    fn name(&self) -> &str {
        &self.name
    }

    fn schema(&self) -> Arc<RulebaseSchema> {
        Arc::clone(&self.schema)
    }

    fn open_session(&self) -> Result<Box<dyn EngineSession>, EngineError> {
        Ok(Box::new(MemorySession::new(
            Arc::clone(&self.schema),
            self.rules.clone(),
        )))
    }
}

/// Per-instance state inside a session.
#[derive(Debug)]
struct InstanceState {
    entity: String,
    children: Vec<InstanceId>,
    values: BTreeMap<String, EngineValue>,
    closed: BTreeSet<String>,
}

impl InstanceState {
    fn new(entity: String) -> Self {
        Self {
            entity,
            children: Vec::new(),
            values: BTreeMap::new(),
            closed: BTreeSet::new(),
        }
    }
}

/// A session over an in-memory rule-base.
///
/// Instance handles index into the instance table; handle 0 is the
/// global instance created when the session opens.
#[derive(Debug)]
struct MemorySession {
    id: SessionId,
    schema: Arc<RulebaseSchema>,
    rules: Vec<DefaultRule>,
    instances: Vec<InstanceState>,
}

impl MemorySession {
    fn new(schema: Arc<RulebaseSchema>, rules: Vec<DefaultRule>) -> Self {
        let global = InstanceState::new(schema.global().name.clone());
        Self {
            id: SessionId::new(),
            schema,
            rules,
            instances: vec![global],
        }
    }

    fn instance(&self, id: InstanceId) -> Result<&InstanceState, EngineError> {
        self.instances
            .get(id.raw() as usize)
            .ok_or(EngineError::UnknownInstance { id })
    }

    fn instance_mut(&mut self, id: InstanceId) -> Result<&mut InstanceState, EngineError> {
        self.instances
            .get_mut(id.raw() as usize)
            .ok_or(EngineError::UnknownInstance { id })
    }

    fn definition(&self, name: &str) -> Result<&EntityDef, EngineError> {
        self.schema.entity(name).ok_or_else(|| EngineError::UnknownEntity {
            name: name.to_string(),
        })
    }
}

impl EngineSession for MemorySession {
    fn id(&self) -> SessionId {
        self.id
    }

    fn schema(&self) -> Arc<RulebaseSchema> {
        Arc::clone(&self.schema)
    }

    fn global_instance(&self) -> InstanceId {
        InstanceId::from_raw(0)
    }

    fn entity_name(&self, instance: InstanceId) -> Result<String, EngineError> {
        Ok(self.instance(instance)?.entity.clone())
    }

    fn create_instance(
        &mut self,
        entity: &str,
        parent: InstanceId,
    ) -> Result<InstanceId, EngineError> {
        self.definition(entity)?;
        let parent_state = self.instance(parent)?;
        let parent_def = self.definition(&parent_state.entity)?;
        if !parent_def.declares_child(entity) {
            return Err(EngineError::NotAChild {
                parent: parent_def.name.clone(),
                child: entity.to_string(),
            });
        }
        if parent_state.closed.contains(entity) {
            return Err(EngineError::ContainmentClosed {
                parent: parent_def.name.clone(),
                child: entity.to_string(),
            });
        }

        let id = InstanceId::from_raw(self.instances.len() as u64);
        self.instances.push(InstanceState::new(entity.to_string()));
        self.instances[parent.raw() as usize].children.push(id);
        Ok(id)
    }

    fn set_value(
        &mut self,
        instance: InstanceId,
        attribute: &str,
        value: EngineValue,
    ) -> Result<(), EngineError> {
        let state = self.instance(instance)?;
        let def = self.definition(&state.entity)?;
        let Some(attr) = def.attribute(attribute) else {
            return Err(EngineError::UnknownAttribute {
                entity: def.name.clone(),
                attribute: attribute.to_string(),
            });
        };
        if attr.kind != value.kind() {
            return Err(EngineError::ValueType {
                entity: def.name.clone(),
                attribute: attr.name.clone(),
                expected: attr.kind,
            });
        }

        self.instance_mut(instance)?
            .values
            .insert(attribute.to_string(), value);
        Ok(())
    }

    fn value(
        &self,
        instance: InstanceId,
        attribute: &str,
    ) -> Result<Option<EngineValue>, EngineError> {
        let state = self.instance(instance)?;
        let def = self.definition(&state.entity)?;
        if def.attribute(attribute).is_none() {
            return Err(EngineError::UnknownAttribute {
                entity: def.name.clone(),
                attribute: attribute.to_string(),
            });
        }
        Ok(state.values.get(attribute).cloned())
    }

    fn mark_containment_complete(
        &mut self,
        parent: InstanceId,
        child: &str,
    ) -> Result<(), EngineError> {
        let state = self.instance(parent)?;
        let def = self.definition(&state.entity)?;
        if !def.declares_child(child) {
            return Err(EngineError::NotAChild {
                parent: def.name.clone(),
                child: child.to_string(),
            });
        }

        self.instance_mut(parent)?.closed.insert(child.to_string());
        Ok(())
    }

    fn containment_complete(&self, parent: InstanceId, child: &str) -> Result<bool, EngineError> {
        let state = self.instance(parent)?;
        let def = self.definition(&state.entity)?;
        if !def.declares_child(child) {
            return Err(EngineError::NotAChild {
                parent: def.name.clone(),
                child: child.to_string(),
            });
        }
        Ok(state.closed.contains(child))
    }

    fn children(&self, parent: InstanceId, child: &str) -> Result<Vec<InstanceId>, EngineError> {
        let state = self.instance(parent)?;
        let def = self.definition(&state.entity)?;
        if !def.declares_child(child) {
            return Err(EngineError::NotAChild {
                parent: def.name.clone(),
                child: child.to_string(),
            });
        }
        Ok(state
            .children
            .iter()
            .copied()
            .filter(|id| self.instances[id.raw() as usize].entity == child)
            .collect())
    }

    fn think(&mut self) -> Result<(), EngineError> {
        // Conclusions are constants, so one pass reaches quiescence.
        for rule in &self.rules {
            for state in &mut self.instances {
                if state.entity == rule.entity && !state.values.contains_key(&rule.attribute) {
                    state.values.insert(rule.attribute.clone(), rule.value.clone());
                }
            }
        }
        Ok(())
    }
}

//! Read path: rebuilding a data-entity tree from a session.

use chrono::{Months, NaiveDate};

use crate::determinations::schema::{AttributeDef, EntityDef, RulebaseSchema};
use crate::determinations::value::{ChangePointValue, EngineValue, TemporalValue};
use crate::determinations::{EngineSession, InstanceId};
use crate::error::{BridgeResult, MappingError};
use crate::model::{AttributeData, AttributeValue, DataEntity, TemporalValueItem};

/// Number of monthly samples synthesized for each temporal attribute.
const SAMPLE_MONTHS: u32 = 12;

/// Rebuilds data-entity trees from post-inference sessions.
///
/// Every attribute the schema declares appears on the output entity,
/// unset ones with a null value. Temporal values are flattened into
/// twelve monthly samples starting at the configured reporting-year
/// start, each carrying the value in effect on that date.
#[derive(Debug, Clone, Copy)]
pub struct DataEntityBuilder {
    year_start: NaiveDate,
}

impl DataEntityBuilder {
    /// Creates a builder sampling from the given reporting-year start.
    #[must_use]
    pub const fn new(year_start: NaiveDate) -> Self {
        Self { year_start }
    }

    /// The reporting-year start used for monthly sampling.
    #[must_use]
    pub const fn year_start(&self) -> NaiveDate {
        self.year_start
    }

    /// Builds the full tree rooted at `instance`, children included.
    ///
    /// # Errors
    ///
    /// Fails if the session rejects an instance or attribute access, or
    /// if a sample date cannot be represented.
    pub fn build_root(
        &self,
        session: &dyn EngineSession,
        instance: InstanceId,
    ) -> BridgeResult<DataEntity> {
        let schema = session.schema();
        self.build_node(session, &schema, instance)
    }

    /// Builds the subtree rooted at `instance` and attaches it to
    /// `parent`.
    pub fn append_child(
        &self,
        session: &dyn EngineSession,
        instance: InstanceId,
        parent: &mut DataEntity,
    ) -> BridgeResult<()> {
        let schema = session.schema();
        let child = self.build_node(session, &schema, instance)?;
        parent.add_child(child);
        Ok(())
    }

    fn build_node(
        &self,
        session: &dyn EngineSession,
        schema: &RulebaseSchema,
        instance: InstanceId,
    ) -> BridgeResult<DataEntity> {
        let name = session.entity_name(instance)?;
        let Some(entity_def) = schema.entity(&name) else {
            return Err(MappingError::UnknownEntity { name }.into());
        };

        let mut node = DataEntity::new(name);
        self.map_attributes(session, entity_def, instance, &mut node)?;
        self.map_children(session, schema, entity_def, instance, &mut node)?;
        Ok(node)
    }

    fn map_attributes(
        &self,
        session: &dyn EngineSession,
        entity_def: &EntityDef,
        instance: InstanceId,
        node: &mut DataEntity,
    ) -> BridgeResult<()> {
        for declared in &entity_def.attributes {
            let attribute = self.map_attribute(session, declared, instance)?;
            node.set_attribute(attribute);
        }
        Ok(())
    }

    fn map_attribute(
        &self,
        session: &dyn EngineSession,
        declared: &AttributeDef,
        instance: InstanceId,
    ) -> BridgeResult<AttributeData> {
        match session.value(instance, &declared.name)? {
            Some(EngineValue::Temporal(temporal)) => {
                self.sample_temporal(&declared.name, &temporal)
            }
            Some(EngineValue::Boolean(v)) => Ok(AttributeData::new(&declared.name, v)),
            Some(EngineValue::Number(v)) => Ok(AttributeData::new(&declared.name, v)),
            Some(EngineValue::Text(v)) => Ok(AttributeData::new(&declared.name, v.trim())),
            Some(EngineValue::Date(v)) => Ok(AttributeData::new(&declared.name, v)),
            None => Ok(AttributeData::new(&declared.name, AttributeValue::Null)),
        }
    }

    fn sample_temporal(&self, name: &str, temporal: &TemporalValue) -> BridgeResult<AttributeData> {
        let mut items = Vec::with_capacity(SAMPLE_MONTHS as usize);
        for period in 0..SAMPLE_MONTHS {
            let date = self
                .year_start
                .checked_add_months(Months::new(period))
                .ok_or(MappingError::SampleOverflow {
                    year_start: self.year_start,
                })?;
            let value = match temporal.value_at(date) {
                Some(ChangePointValue::Number(number)) => AttributeValue::Float(*number),
                Some(ChangePointValue::Text(text)) => AttributeValue::String(text.clone()),
                None => AttributeValue::Null,
            };
            items.push(TemporalValueItem::untyped(date, value));
        }
        Ok(AttributeData::temporal(name, items))
    }

    fn map_children(
        &self,
        session: &dyn EngineSession,
        schema: &RulebaseSchema,
        entity_def: &EntityDef,
        instance: InstanceId,
        node: &mut DataEntity,
    ) -> BridgeResult<()> {
        // Declaration order for types, creation order within a type.
        for child_type in &entity_def.children {
            for child in session.children(instance, child_type)? {
                let child_node = self.build_node(session, schema, child)?;
                node.add_child(child_node);
            }
        }
        Ok(())
    }
}

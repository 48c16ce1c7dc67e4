//! Write path: mapping a data-entity tree into an engine session.

use chrono::NaiveDate;

use tracing::warn;

use crate::determinations::schema::{AttributeDef, AttributeKind, EntityDef};
use crate::determinations::value::{ChangePoint, ChangePointValue, EngineValue, TemporalValue};
use crate::determinations::{EngineSession, InstanceId, RulebaseSchema};
use crate::error::{BridgeResult, MappingError};
use crate::model::{AttributeData, AttributeValue, DataEntity, TemporalKind, TemporalValueItem};

/// Maps a global entity tree onto the session's root instance.
///
/// After mapping, every child type declared on the root is marked
/// containment complete, whether or not the tree supplied instances of
/// it.
///
/// # Errors
///
/// Fails with [`MappingError::RootNotGlobal`] unless `entity` is the
/// global entity; otherwise propagates mapping and engine errors from
/// the tree walk.
pub fn map_global_entity(session: &mut dyn EngineSession, entity: &DataEntity) -> BridgeResult<()> {
    if !entity.is_global() {
        return Err(MappingError::RootNotGlobal {
            name: entity.name().to_string(),
        }
        .into());
    }

    let schema = session.schema();
    let root = session.global_instance();
    map_entity(session, &schema, entity, root)?;
    close_declared_children(session, schema.global(), root)?;
    Ok(())
}

/// Maps one entity subtree into the session under `parent`.
///
/// A global node merges into `parent` instead of creating an instance:
/// its attributes and children land on the parent instance itself.
/// Anything else becomes a fresh instance of its declared type.
///
/// For an instance this call creates, every declared child type is
/// closed exactly once after all children are mapped: supplied types
/// close behind their instances, unsupplied types close with zero
/// instances. Merged nodes close nothing; the call owning the instance
/// does.
pub fn map_entity(
    session: &mut dyn EngineSession,
    schema: &RulebaseSchema,
    entity: &DataEntity,
    parent: InstanceId,
) -> BridgeResult<InstanceId> {
    let (entity_def, instance) = if entity.is_global() {
        let name = session.entity_name(parent)?;
        let def = schema
            .entity(&name)
            .ok_or(MappingError::UnknownEntity { name })?;
        (def, parent)
    } else {
        let def = schema
            .entity(entity.name())
            .ok_or_else(|| MappingError::UnknownEntity {
                name: entity.name().to_string(),
            })?;
        let instance = session.create_instance(entity.name(), parent)?;
        (def, instance)
    };

    for attribute in entity.attributes().values() {
        set_attribute(session, entity_def, instance, attribute)?;
    }

    for child in entity.children() {
        map_entity(session, schema, child, instance)?;
    }

    if !entity.is_global() {
        close_declared_children(session, entity_def, instance)?;
    }

    Ok(instance)
}

fn close_declared_children(
    session: &mut dyn EngineSession,
    entity_def: &EntityDef,
    instance: InstanceId,
) -> BridgeResult<()> {
    for child_type in &entity_def.children {
        session.mark_containment_complete(instance, child_type)?;
    }
    Ok(())
}

/// Writes one attribute onto an instance.
///
/// Attributes carrying neither a value nor changepoints are skipped, as
/// are attributes the entity type does not declare (logged and dropped,
/// matching rule-bases that consume a subset of the supplied data).
/// Changepoints become a temporal value; scalars are coerced to the
/// declared kind.
pub fn set_attribute(
    session: &mut dyn EngineSession,
    entity_def: &EntityDef,
    instance: InstanceId,
    attribute: &AttributeData,
) -> BridgeResult<()> {
    if !attribute.has_value() {
        return Ok(());
    }

    let Some(declared) = entity_def.attribute(attribute.name()) else {
        warn!(
            entity = %entity_def.name,
            attribute = attribute.name(),
            "attribute not declared by the rule-base, skipping"
        );
        return Ok(());
    };

    if attribute.is_temporal() {
        let temporal = map_temporal_value(attribute.name(), attribute.changepoints())?;
        session.set_value(instance, attribute.name(), EngineValue::Temporal(temporal))?;
        return Ok(());
    }

    let value = coerce_scalar(declared, attribute.value())?;
    session.set_value(instance, attribute.name(), value)?;
    Ok(())
}

/// Converts supplied changepoints into an engine temporal value, in
/// input order.
///
/// A changepoint whose value renders as the empty string becomes an
/// explicit no-value marker. Every changepoint must carry a kind:
/// currency values parse as numbers, text values are trimmed.
///
/// # Errors
///
/// Returns [`MappingError::MissingTemporalKind`] for untagged items and
/// [`MappingError::TypeMismatch`] for unparseable currency values.
pub fn map_temporal_value(
    attribute: &str,
    changepoints: &[TemporalValueItem],
) -> Result<TemporalValue, MappingError> {
    let mut change_points = Vec::with_capacity(changepoints.len());
    for item in changepoints {
        let Some(kind) = item.kind() else {
            return Err(MappingError::MissingTemporalKind {
                attribute: attribute.to_string(),
            });
        };

        let date = item.effective_from();
        let change_point = match kind {
            TemporalKind::Currency => {
                let text = item.value().to_text();
                if text.is_empty() {
                    ChangePoint::unknown(date)
                } else {
                    let amount =
                        text.trim()
                            .parse::<f64>()
                            .map_err(|_| MappingError::TypeMismatch {
                                attribute: attribute.to_string(),
                                expected: AttributeKind::Number,
                                value: text.clone(),
                            })?;
                    ChangePoint::new(date, ChangePointValue::Number(amount))
                }
            }
            TemporalKind::Text => {
                let text = item.value().to_text();
                let text = text.trim();
                if text.is_empty() {
                    ChangePoint::unknown(date)
                } else {
                    ChangePoint::new(date, ChangePointValue::Text(text.to_string()))
                }
            }
        };
        change_points.push(change_point);
    }
    Ok(TemporalValue::new(change_points))
}

fn coerce_scalar(
    declared: &AttributeDef,
    value: &AttributeValue,
) -> Result<EngineValue, MappingError> {
    let mismatch = || MappingError::TypeMismatch {
        attribute: declared.name.clone(),
        expected: declared.kind,
        value: value.to_text(),
    };

    match declared.kind {
        AttributeKind::Boolean => match value {
            AttributeValue::Bool(v) => Ok(EngineValue::Boolean(*v)),
            other => {
                let text = other.to_text();
                let text = text.trim();
                if text.eq_ignore_ascii_case("true") {
                    Ok(EngineValue::Boolean(true))
                } else if text.eq_ignore_ascii_case("false") {
                    Ok(EngineValue::Boolean(false))
                } else {
                    Err(mismatch())
                }
            }
        },
        AttributeKind::Number => match value {
            AttributeValue::Int(v) => Ok(EngineValue::Number(*v as f64)),
            AttributeValue::Float(v) => Ok(EngineValue::Number(*v)),
            other => other
                .to_text()
                .trim()
                .parse::<f64>()
                .map(EngineValue::Number)
                .map_err(|_| mismatch()),
        },
        AttributeKind::Text => Ok(EngineValue::Text(value.to_text().trim().to_string())),
        AttributeKind::Date => match value {
            AttributeValue::Date(v) => Ok(EngineValue::Date(*v)),
            other => other
                .to_text()
                .trim()
                .parse::<NaiveDate>()
                .map(EngineValue::Date)
                .map_err(|_| mismatch()),
        },
        // Temporal slots are fed by changepoints, never by a scalar.
        AttributeKind::Temporal => Err(mismatch()),
    }
}

//! Values held by session attributes, including temporal step functions.

use serde::{Deserialize, Serialize};

use chrono::NaiveDate;

use crate::determinations::schema::AttributeKind;

/// The payload of a single changepoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ChangePointValue {
    Number(f64),
    Text(String),
}

impl ChangePointValue {
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            Self::Number(_) => None,
        }
    }
}

/// A dated step in a temporal value.
///
/// A changepoint with no payload marks the attribute as having no known
/// value from its date until the next changepoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangePoint {
    date: NaiveDate,
    value: Option<ChangePointValue>,
}

impl ChangePoint {
    /// Creates a changepoint carrying a value.
    #[must_use]
    pub const fn new(date: NaiveDate, value: ChangePointValue) -> Self {
        Self {
            date,
            value: Some(value),
        }
    }

    /// Creates a no-value marker at the given date.
    #[must_use]
    pub const fn unknown(date: NaiveDate) -> Self {
        Self { date, value: None }
    }

    /// The date this step takes effect.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// The step's payload, `None` for a no-value marker.
    #[must_use]
    pub const fn value(&self) -> Option<&ChangePointValue> {
        self.value.as_ref()
    }
}

/// A temporal value: a run of changepoints applied in order as a step
/// function over dates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemporalValue {
    change_points: Vec<ChangePoint>,
}

impl TemporalValue {
    /// Creates a temporal value from changepoints in ascending date
    /// order.
    #[must_use]
    pub fn new(change_points: Vec<ChangePoint>) -> Self {
        Self { change_points }
    }

    /// The changepoints in order.
    #[must_use]
    pub fn change_points(&self) -> &[ChangePoint] {
        &self.change_points
    }

    /// Number of changepoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.change_points.len()
    }

    /// Returns true if there are no changepoints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.change_points.is_empty()
    }

    /// The payload in effect on `date`: that of the last changepoint
    /// dated on or before it.
    ///
    /// Returns `None` before the first changepoint, and within spans
    /// opened by a no-value marker.
    #[must_use]
    pub fn value_at(&self, date: NaiveDate) -> Option<&ChangePointValue> {
        let mut current = None;
        for change_point in &self.change_points {
            if change_point.date <= date {
                current = change_point.value.as_ref();
            }
        }
        current
    }
}

/// A typed value held by a session attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum EngineValue {
    Boolean(bool),
    Number(f64),
    Text(String),
    Date(NaiveDate),
    Temporal(TemporalValue),
}

impl EngineValue {
    pub const fn is_temporal(&self) -> bool {
        matches!(self, Self::Temporal(_))
    }

    pub const fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    pub const fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(v) => Some(*v),
            _ => None,
        }
    }

    pub const fn as_temporal(&self) -> Option<&TemporalValue> {
        match self {
            Self::Temporal(v) => Some(v),
            _ => None,
        }
    }

    /// The attribute kind this value satisfies.
    #[must_use]
    pub const fn kind(&self) -> AttributeKind {
        match self {
            Self::Boolean(_) => AttributeKind::Boolean,
            Self::Number(_) => AttributeKind::Number,
            Self::Text(_) => AttributeKind::Text,
            Self::Date(_) => AttributeKind::Date,
            Self::Temporal(_) => AttributeKind::Temporal,
        }
    }
}

impl std::fmt::Display for EngineValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v:?}"),
            Self::Date(v) => write!(f, "{v}"),
            Self::Temporal(v) => write!(f, "temporal[{}]", v.len()),
        }
    }
}

impl From<bool> for EngineValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<f64> for EngineValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<String> for EngineValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for EngineValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<NaiveDate> for EngineValue {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}

impl From<TemporalValue> for EngineValue {
    fn from(v: TemporalValue) -> Self {
        Self::Temporal(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_value_at_step_function() {
        let temporal = TemporalValue::new(vec![
            ChangePoint::new(date(2017, 8, 1), ChangePointValue::Number(100.0)),
            ChangePoint::new(date(2017, 9, 1), ChangePointValue::Number(250.0)),
        ]);

        assert_eq!(temporal.value_at(date(2017, 7, 31)), None);
        assert_eq!(
            temporal.value_at(date(2017, 8, 1)).and_then(ChangePointValue::as_number),
            Some(100.0)
        );
        assert_eq!(
            temporal.value_at(date(2017, 8, 15)).and_then(ChangePointValue::as_number),
            Some(100.0)
        );
        assert_eq!(
            temporal.value_at(date(2018, 1, 1)).and_then(ChangePointValue::as_number),
            Some(250.0)
        );
    }

    #[test]
    fn test_value_at_unknown_span() {
        let temporal = TemporalValue::new(vec![
            ChangePoint::new(date(2017, 8, 1), ChangePointValue::Number(100.0)),
            ChangePoint::unknown(date(2017, 10, 1)),
            ChangePoint::new(date(2017, 12, 1), ChangePointValue::Text("resumed".into())),
        ]);

        assert!(temporal.value_at(date(2017, 9, 30)).is_some());
        assert_eq!(temporal.value_at(date(2017, 10, 1)), None);
        assert_eq!(temporal.value_at(date(2017, 11, 15)), None);
        assert_eq!(
            temporal.value_at(date(2017, 12, 25)).and_then(ChangePointValue::as_text),
            Some("resumed")
        );
    }

    #[test]
    fn test_value_at_empty() {
        let temporal = TemporalValue::default();
        assert!(temporal.is_empty());
        assert_eq!(temporal.value_at(date(2017, 8, 1)), None);
    }

    #[test]
    fn test_engine_value_kind() {
        assert_eq!(EngineValue::Boolean(true).kind(), AttributeKind::Boolean);
        assert_eq!(EngineValue::Number(1.0).kind(), AttributeKind::Number);
        assert_eq!(EngineValue::Text("x".into()).kind(), AttributeKind::Text);
        assert_eq!(EngineValue::Date(date(2017, 8, 1)).kind(), AttributeKind::Date);
        assert_eq!(
            EngineValue::Temporal(TemporalValue::default()).kind(),
            AttributeKind::Temporal
        );
    }

    #[test]
    fn test_engine_value_accessors() {
        let value = EngineValue::Number(12_345_678.0);
        assert_eq!(value.as_number(), Some(12_345_678.0));
        assert!(value.as_text().is_none());
        assert!(!value.is_temporal());
    }

    #[test]
    fn test_engine_value_display() {
        assert_eq!(format!("{}", EngineValue::Boolean(true)), "true");
        assert_eq!(format!("{}", EngineValue::Text("hi".into())), "\"hi\"");
        let temporal = EngineValue::Temporal(TemporalValue::new(vec![ChangePoint::unknown(
            date(2017, 8, 1),
        )]));
        assert_eq!(format!("{temporal}"), "temporal[1]");
    }

    #[test]
    fn test_engine_value_serialization() {
        let value = EngineValue::Temporal(TemporalValue::new(vec![ChangePoint::new(
            date(2017, 8, 1),
            ChangePointValue::Number(100.0),
        )]));
        let json = serde_json::to_string(&value).unwrap();
        let deserialized: EngineValue = serde_json::from_str(&json).unwrap();
        assert_eq!(value, deserialized);
    }
}

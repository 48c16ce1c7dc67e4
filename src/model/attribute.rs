//! Attribute payloads: named scalar values and optional changepoint lists.

use serde::{Deserialize, Serialize};

use chrono::NaiveDate;

use crate::model::TemporalValueItem;

/// Possible scalar values an attribute can hold.
///
/// # Examples
///
/// ```
/// use detbridge::model::AttributeValue;
///
/// let number: AttributeValue = 12_345_678i64.into();
/// let text: AttributeValue = "Version_005".into();
///
/// assert!(number.is_int());
/// assert_eq!(text.as_string(), Some("Version_005"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Date(NaiveDate),
    Null,
}

impl AttributeValue {
    pub const fn is_bool(&self) -> bool {
        matches!(self, Self::Bool(_))
    }

    pub const fn is_int(&self) -> bool {
        matches!(self, Self::Int(_))
    }

    pub const fn is_float(&self) -> bool {
        matches!(self, Self::Float(_))
    }

    pub const fn is_string(&self) -> bool {
        matches!(self, Self::String(_))
    }

    pub const fn is_date(&self) -> bool {
        matches!(self, Self::Date(_))
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            // Engines hand numbers back as doubles; integral ones
            // convert back losslessly.
            #[allow(clippy::cast_possible_truncation)]
            Self::Float(v)
                if v.is_finite()
                    && v.fract() == 0.0
                    && (i64::MIN as f64..=i64::MAX as f64).contains(v) =>
            {
                Some(*v as i64)
            }
            _ => None,
        }
    }

    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub const fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns a human-readable type name.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Date(_) => "date",
            Self::Null => "null",
        }
    }

    /// Returns the value's plain string form: the form written to text
    /// attributes and compared against the empty-value changepoint marker.
    ///
    /// Unlike the `Display` form, strings are unquoted and null renders
    /// as the empty string.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Bool(v) => v.to_string(),
            Self::Int(v) => v.to_string(),
            Self::Float(v) => v.to_string(),
            Self::String(v) => v.clone(),
            Self::Date(v) => v.to_string(),
            Self::Null => String::new(),
        }
    }
}

impl Default for AttributeValue {
    fn default() -> Self {
        Self::Null
    }
}

impl std::fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{v:?}"),
            Self::Date(v) => write!(f, "{v}"),
            Self::Null => write!(f, "null"),
        }
    }
}

// Convenient From implementations
impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for AttributeValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f32> for AttributeValue {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<NaiveDate> for AttributeValue {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}

/// A named attribute carried by a data entity.
///
/// An attribute holds a scalar value, a changepoint list, or both a null
/// scalar and changepoints. An attribute with a null value and no
/// changepoints counts as unsupplied and is skipped on the way into a
/// session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeData {
    name: String,
    #[serde(default)]
    value: AttributeValue,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    changepoints: Vec<TemporalValueItem>,
}

impl AttributeData {
    /// Creates a scalar attribute.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            changepoints: Vec::new(),
        }
    }

    /// Creates a temporal attribute from its changepoints, with a null
    /// scalar value.
    #[must_use]
    pub fn temporal(name: impl Into<String>, changepoints: Vec<TemporalValueItem>) -> Self {
        Self {
            name: name.into(),
            value: AttributeValue::Null,
            changepoints,
        }
    }

    /// Appends changepoints, builder style.
    #[must_use]
    pub fn with_changepoints(
        mut self,
        changepoints: impl IntoIterator<Item = TemporalValueItem>,
    ) -> Self {
        self.changepoints.extend(changepoints);
        self
    }

    /// The attribute name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The scalar value, [`AttributeValue::Null`] for purely temporal
    /// attributes.
    #[must_use]
    pub const fn value(&self) -> &AttributeValue {
        &self.value
    }

    /// The changepoint list, empty for scalar attributes.
    #[must_use]
    pub fn changepoints(&self) -> &[TemporalValueItem] {
        &self.changepoints
    }

    /// Returns true if this attribute carries changepoints.
    #[must_use]
    pub fn is_temporal(&self) -> bool {
        !self.changepoints.is_empty()
    }

    /// Returns true if this attribute carries anything to write: a
    /// non-null scalar or at least one changepoint.
    #[must_use]
    pub fn has_value(&self) -> bool {
        !self.value.is_null() || !self.changepoints.is_empty()
    }
}

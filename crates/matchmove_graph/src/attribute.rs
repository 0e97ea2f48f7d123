// SPDX-License-Identifier: MIT OR Apache-2.0
//! Attribute definitions for scene nodes.

use matchmove_anim::AnimCurve;
use serde::{Deserialize, Serialize};

/// Data type stored in an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    /// Unitless double
    Double,
    /// Distance in scene units
    DoubleLinear,
    /// Angle
    DoubleAngle,
    /// Single precision float
    Float,
    /// Time value
    Time,
    /// Boolean
    Bool,
    /// Integer
    Int,
    /// Enumeration
    Enum,
    /// Message (relationship only, carries no value)
    Message,
    /// String
    String,
    /// Compound or array parent
    Compound,
}

impl ValueType {
    /// Whether a solver can treat values of this type as continuous parameters
    pub fn is_solvable(&self) -> bool {
        match self {
            Self::Double | Self::DoubleLinear | Self::DoubleAngle | Self::Float | Self::Time => {
                true
            }
            Self::Bool | Self::Int | Self::Enum | Self::Message | Self::String | Self::Compound => {
                false
            }
        }
    }

    /// Host type name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Double => "double",
            Self::DoubleLinear => "doubleLinear",
            Self::DoubleAngle => "doubleAngle",
            Self::Float => "float",
            Self::Time => "time",
            Self::Bool => "bool",
            Self::Int => "long",
            Self::Enum => "enum",
            Self::Message => "message",
            Self::String => "string",
            Self::Compound => "compound",
        }
    }
}

/// Stored value of an attribute
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AttrValue {
    /// Same value on every frame
    Static(f64),
    /// Keyframed value
    Animated(AnimCurve),
}

impl AttrValue {
    /// Sample the value at a frame
    pub fn sample(&self, frame: f64) -> f64 {
        match self {
            Self::Static(v) => *v,
            // An empty curve behaves like an unkeyed zero
            Self::Animated(curve) => curve.evaluate(frame).unwrap_or(0.0),
        }
    }

    /// Whether the value is keyframed
    pub fn is_animated(&self) -> bool {
        matches!(self, Self::Animated(_))
    }
}

impl Default for AttrValue {
    fn default() -> Self {
        Self::Static(0.0)
    }
}

/// An attribute on a node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name, e.g. `translateX` or `input[0]`
    pub name: String,
    /// Data type
    pub value_type: ValueType,
    /// False for computed outputs that can never be set directly
    pub writable: bool,
    /// Locked attributes cannot be set
    #[serde(default)]
    pub locked: bool,
    /// Changing this attribute can move the node in world space
    #[serde(default)]
    pub affects_worldspace: bool,
    /// Element or child attribute names for array/compound attributes
    #[serde(default)]
    pub children: Vec<String>,
    /// Same-node attributes a computed output is derived from
    #[serde(default)]
    pub affected_by: Vec<String>,
    /// Current value
    #[serde(default)]
    pub value: AttrValue,
}

impl Attribute {
    /// Create a writable, unlocked attribute
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            writable: true,
            locked: false,
            affects_worldspace: false,
            children: Vec::new(),
            affected_by: Vec::new(),
            value: AttrValue::default(),
        }
    }

    /// Create a computed output derived from other attributes on the same node
    pub fn output(
        name: impl Into<String>,
        value_type: ValueType,
        affected_by: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let mut attr = Self::new(name, value_type);
        attr.writable = false;
        attr.affected_by = affected_by.into_iter().map(Into::into).collect();
        attr
    }

    /// Create an array/compound parent over the given child names
    pub fn compound(
        name: impl Into<String>,
        children: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let mut attr = Self::new(name, ValueType::Compound);
        attr.children = children.into_iter().map(Into::into).collect();
        attr
    }

    /// Mark as affecting world space
    pub fn worldspace(mut self) -> Self {
        self.affects_worldspace = true;
        self
    }

    /// Set the default value
    pub fn with_default(mut self, value: f64) -> Self {
        self.value = AttrValue::Static(value);
        self
    }

    /// Whether this is an array/compound parent
    pub fn is_compound(&self) -> bool {
        !self.children.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matchmove_anim::InterpolationMode;

    #[test]
    fn test_solvable_types() {
        assert!(ValueType::Double.is_solvable());
        assert!(ValueType::DoubleLinear.is_solvable());
        assert!(ValueType::DoubleAngle.is_solvable());
        assert!(ValueType::Float.is_solvable());
        assert!(ValueType::Time.is_solvable());
        assert!(!ValueType::Bool.is_solvable());
        assert!(!ValueType::Message.is_solvable());
        assert!(!ValueType::Compound.is_solvable());
    }

    #[test]
    fn test_attr_value_sampling() {
        assert_eq!(AttrValue::Static(2.5).sample(10.0), 2.5);
        let curve = AnimCurve::from_pairs(&[(1.0, 0.0), (2.0, 1.0)], InterpolationMode::Linear);
        let value = AttrValue::Animated(curve);
        assert!(value.is_animated());
        assert_eq!(value.sample(2.0), 1.0);
        assert_eq!(AttrValue::Animated(AnimCurve::new()).sample(1.0), 0.0);
    }

    #[test]
    fn test_output_attribute_is_not_writable() {
        let attr = Attribute::output("output", ValueType::Double, ["input"]);
        assert!(!attr.writable);
        assert_eq!(attr.affected_by, vec!["input".to_string()]);
        let compound = Attribute::compound("input", ["input[0]", "input[1]"]);
        assert!(compound.is_compound());
        assert_eq!(compound.value_type, ValueType::Compound);
    }
}

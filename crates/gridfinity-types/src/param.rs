use serde::{Deserialize, Serialize};

use crate::layout::LayoutMatrix;

/// Property-editor grouping of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Gridfinity,
    GridfinityNonStandard,
    ReferenceParameters,
    #[serde(rename = "zzExpertOnly")]
    ExpertOnly,
}

/// Inclusive numeric range and editor step for a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Constraint {
    pub fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Storage type of a parameter, independent of its current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamType {
    Length,
    Angle,
    Integer,
    Float,
    Bool,
    Enumeration,
    Layout,
}

/// A typed parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum ParamValue {
    /// Millimetres.
    Length(f64),
    /// Degrees.
    Angle(f64),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Enumeration { selected: String, options: Vec<String> },
    Layout(LayoutMatrix),
}

impl ParamValue {
    pub fn param_type(&self) -> ParamType {
        match self {
            ParamValue::Length(_) => ParamType::Length,
            ParamValue::Angle(_) => ParamType::Angle,
            ParamValue::Integer(_) => ParamType::Integer,
            ParamValue::Float(_) => ParamType::Float,
            ParamValue::Bool(_) => ParamType::Bool,
            ParamValue::Enumeration { .. } => ParamType::Enumeration,
            ParamValue::Layout(_) => ParamType::Layout,
        }
    }

    /// Numeric view used by expressions; booleans read as 1.0 / 0.0.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Length(v) | ParamValue::Angle(v) | ParamValue::Float(v) => Some(*v),
            ParamValue::Integer(v) => Some(*v as f64),
            ParamValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            ParamValue::Enumeration { .. } | ParamValue::Layout(_) => None,
        }
    }

    /// Build an enumeration value from static option lists.
    pub fn enumeration(selected: &str, options: &[&str]) -> Self {
        ParamValue::Enumeration {
            selected: selected.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
        }
    }
}

/// A parameter as stored on an object: value plus editor metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub value: ParamValue,
    pub category: Category,
    #[serde(default)]
    pub tooltip: String,
    /// Reference parameters are read-only; only the engine writes them.
    #[serde(default)]
    pub read_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<Constraint>,
}

impl Param {
    pub fn new(value: ParamValue, category: Category, tooltip: &str) -> Self {
        Self {
            read_only: category == Category::ReferenceParameters,
            value,
            category,
            tooltip: tooltip.to_string(),
            constraint: None,
        }
    }

    pub fn with_constraint(mut self, min: f64, max: f64, step: f64) -> Self {
        self.constraint = Some(Constraint::new(min, max, step));
        self
    }
}

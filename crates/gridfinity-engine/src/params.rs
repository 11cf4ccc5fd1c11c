//! Typed parameter storage for one object.

use std::collections::BTreeMap;

use gridfinity_types::{LayoutError, LayoutMatrix, Param, ParamType, ParamValue};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamError {
    #[error("no parameter named {name}")]
    NotFound { name: String },

    #[error("parameter {name} already exists")]
    AlreadyExists { name: String },

    #[error("{name} is {expected:?}, not {found:?}")]
    TypeMismatch {
        name: String,
        expected: ParamType,
        found: ParamType,
    },

    #[error("{name} is read-only")]
    ReadOnly { name: String },

    #[error("{value} is outside [{min}, {max}] for {name}")]
    OutOfRange {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("unknown value '{value}' for {name}")]
    UnknownEnumValue { name: String, value: String },

    #[error("{name} must be a whole number, got {value}")]
    NotWhole { name: String, value: f64 },

    #[error("invalid layout for {name}: {source}")]
    InvalidLayout {
        name: String,
        #[source]
        source: LayoutError,
    },
}

/// Parameters of one object plus the expressions bound to some of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamSet {
    params: BTreeMap<String, Param>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    expressions: BTreeMap<String, String>,
}

impl ParamSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `param` under `name` unless a parameter of that name exists.
    /// Returns whether it was added.
    pub fn add_property(&mut self, name: &str, param: Param) -> bool {
        if self.params.contains_key(name) {
            return false;
        }
        self.params.insert(name.to_string(), param);
        true
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    pub fn property_type(&self, name: &str) -> Option<ParamType> {
        self.params.get(name).map(|p| p.value.param_type())
    }

    pub fn remove_property(&mut self, name: &str) -> Option<Param> {
        self.expressions.remove(name);
        self.params.remove(name)
    }

    /// Moves a parameter, and any expression bound to it, to a new name.
    pub fn rename_property(&mut self, old: &str, new: &str) -> Result<(), ParamError> {
        if self.params.contains_key(new) {
            return Err(ParamError::AlreadyExists {
                name: new.to_string(),
            });
        }
        let param = self.params.remove(old).ok_or_else(|| not_found(old))?;
        self.params.insert(new.to_string(), param);
        if let Some(expr) = self.expressions.remove(old) {
            self.expressions.insert(new.to_string(), expr);
        }
        Ok(())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn param(&self, name: &str) -> Result<&Param, ParamError> {
        self.params.get(name).ok_or_else(|| not_found(name))
    }

    pub fn get(&self, name: &str) -> Result<&ParamValue, ParamError> {
        self.param(name).map(|p| &p.value)
    }

    /// User-facing assignment: checks type, read-only flag, constraint
    /// range, enumeration options and layout validity.
    pub fn set(&mut self, name: &str, value: ParamValue) -> Result<(), ParamError> {
        let param = self.params.get_mut(name).ok_or_else(|| not_found(name))?;
        if param.read_only {
            return Err(ParamError::ReadOnly {
                name: name.to_string(),
            });
        }
        let expected = param.value.param_type();
        if value.param_type() != expected {
            return Err(ParamError::TypeMismatch {
                name: name.to_string(),
                expected,
                found: value.param_type(),
            });
        }
        if let (Some(c), Some(v)) = (param.constraint, value.as_f64()) {
            if !c.contains(v) {
                return Err(ParamError::OutOfRange {
                    name: name.to_string(),
                    value: v,
                    min: c.min,
                    max: c.max,
                });
            }
        }
        match (&mut param.value, value) {
            (ParamValue::Enumeration { selected, options }, ParamValue::Enumeration { selected: new, .. }) => {
                if !options.contains(&new) {
                    return Err(ParamError::UnknownEnumValue {
                        name: name.to_string(),
                        value: new,
                    });
                }
                *selected = new;
            }
            (slot, ParamValue::Layout(layout)) => {
                layout.validate().map_err(|source| ParamError::InvalidLayout {
                    name: name.to_string(),
                    source,
                })?;
                *slot = ParamValue::Layout(layout);
            }
            (slot, value) => *slot = value,
        }
        Ok(())
    }

    /// Selects `value` on an enumeration parameter.
    pub fn select(&mut self, name: &str, value: &str) -> Result<(), ParamError> {
        self.set(
            name,
            ParamValue::Enumeration {
                selected: value.to_string(),
                options: Vec::new(),
            },
        )
    }

    /// Engine-side write of a numeric value, bypassing the read-only flag
    /// and constraints. The value is coerced to the parameter's type.
    pub(crate) fn set_computed(&mut self, name: &str, value: f64) -> Result<(), ParamError> {
        let param = self.params.get_mut(name).ok_or_else(|| not_found(name))?;
        param.value = match param.value.param_type() {
            ParamType::Length => ParamValue::Length(value),
            ParamType::Angle => ParamValue::Angle(value),
            ParamType::Float => ParamValue::Float(value),
            ParamType::Integer => ParamValue::Integer(value.round() as i64),
            ParamType::Bool => ParamValue::Bool(value != 0.0),
            found => {
                return Err(ParamError::TypeMismatch {
                    name: name.to_string(),
                    expected: ParamType::Float,
                    found,
                })
            }
        };
        Ok(())
    }

    /// Replaces the stored value without validation. Used when seeding
    /// defaults and by migration when a parameter changes type.
    pub(crate) fn overwrite(&mut self, name: &str, value: ParamValue) -> Result<(), ParamError> {
        let param = self.params.get_mut(name).ok_or_else(|| not_found(name))?;
        param.value = value;
        Ok(())
    }

    // ── Typed getters ──────────────────────────────────────────────────────

    /// Any numeric parameter as `f64`.
    pub fn number(&self, name: &str) -> Result<f64, ParamError> {
        match self.get(name)? {
            ParamValue::Length(v) | ParamValue::Angle(v) | ParamValue::Float(v) => Ok(*v),
            ParamValue::Integer(v) => Ok(*v as f64),
            other => Err(mismatch(name, ParamType::Float, other)),
        }
    }

    /// Integer parameter, or a real parameter holding a whole number.
    pub fn integer(&self, name: &str) -> Result<i64, ParamError> {
        match self.get(name)? {
            ParamValue::Integer(v) => Ok(*v),
            ParamValue::Float(v) | ParamValue::Length(v) => {
                if v.fract().abs() > 1e-9 {
                    return Err(ParamError::NotWhole {
                        name: name.to_string(),
                        value: *v,
                    });
                }
                Ok(v.round() as i64)
            }
            other => Err(mismatch(name, ParamType::Integer, other)),
        }
    }

    pub fn flag(&self, name: &str) -> Result<bool, ParamError> {
        match self.get(name)? {
            ParamValue::Bool(b) => Ok(*b),
            other => Err(mismatch(name, ParamType::Bool, other)),
        }
    }

    pub fn selection(&self, name: &str) -> Result<&str, ParamError> {
        match self.get(name)? {
            ParamValue::Enumeration { selected, .. } => Ok(selected),
            other => Err(mismatch(name, ParamType::Enumeration, other)),
        }
    }

    pub fn layout(&self, name: &str) -> Result<&LayoutMatrix, ParamError> {
        match self.get(name)? {
            ParamValue::Layout(l) => Ok(l),
            other => Err(mismatch(name, ParamType::Layout, other)),
        }
    }

    // ── Expressions ────────────────────────────────────────────────────────

    /// Binds `name` to an expression over other parameters. The value is
    /// refreshed on every recompute.
    pub fn set_expression(&mut self, name: &str, expr: &str) -> Result<(), ParamError> {
        if !self.params.contains_key(name) {
            return Err(not_found(name));
        }
        self.expressions.insert(name.to_string(), expr.to_string());
        Ok(())
    }

    pub fn clear_expression(&mut self, name: &str) -> Option<String> {
        self.expressions.remove(name)
    }

    pub fn expression(&self, name: &str) -> Option<&str> {
        self.expressions.get(name).map(String::as_str)
    }

    pub fn expressions(&self) -> impl Iterator<Item = (&str, &str)> {
        self.expressions
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn not_found(name: &str) -> ParamError {
    ParamError::NotFound {
        name: name.to_string(),
    }
}

fn mismatch(name: &str, expected: ParamType, found: &ParamValue) -> ParamError {
    ParamError::TypeMismatch {
        name: name.to_string(),
        expected,
        found: found.param_type(),
    }
}

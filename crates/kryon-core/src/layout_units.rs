// crates/kryon-core/src/layout_units.rs
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::KryonError;

/// Tolerance used for every float comparison in the layout system.
pub const EPSILON: f64 = 0.0001;

/// Unit tag of a style [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Unit {
    #[default]
    Undefined,
    Pixel,
    Percent,
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Undefined => Ok(()),
            Unit::Pixel => f.write_str("px"),
            Unit::Percent => f.write_str("%"),
        }
    }
}

/// A length that can be pixels, a percentage of the parent, or undefined.
#[derive(Debug, Clone, Copy)]
pub struct Value {
    pub magnitude: f64,
    pub unit: Unit,
}

impl Value {
    pub const UNDEFINED: Value = Value { magnitude: f64::NAN, unit: Unit::Undefined };
    pub const ZERO: Value = Value { magnitude: 0.0, unit: Unit::Pixel };

    pub const fn pixels(magnitude: f64) -> Self {
        Self { magnitude, unit: Unit::Pixel }
    }

    pub const fn percent(magnitude: f64) -> Self {
        Self { magnitude, unit: Unit::Percent }
    }

    pub fn is_defined(&self) -> bool {
        self.unit != Unit::Undefined
    }

    /// Resolve against a parent size. Undefined resolves to NaN.
    pub fn resolve(&self, parent_size: f64) -> f64 {
        match self.unit {
            Unit::Undefined => f64::NAN,
            Unit::Pixel => self.magnitude,
            Unit::Percent => self.magnitude * parent_size / 100.0,
        }
    }

    /// Like [`Value::resolve`] but an indeterminate result contributes nothing.
    pub fn resolve_or_zero(&self, parent_size: f64) -> f64 {
        let resolved = self.resolve(parent_size);
        if resolved.is_nan() { 0.0 } else { resolved }
    }

    /// Store `magnitude` with `unit`, returning whether anything changed.
    ///
    /// A NaN magnitude is written but leaves the previous unit tag in place,
    /// so writing NaN over a pixel value yields `{NaN, Pixel}`.
    pub fn assign(&mut self, magnitude: f64, unit: Unit) -> bool {
        if floats_equal(self.magnitude, magnitude) && self.unit == unit {
            return false;
        }
        self.magnitude = magnitude;
        if !magnitude.is_nan() {
            self.unit = unit;
        }
        true
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::UNDEFINED
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        if self.unit != other.unit {
            return false;
        }
        self.unit == Unit::Undefined || (self.magnitude - other.magnitude).abs() < EPSILON
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit {
            Unit::Undefined => f.write_str("undefined"),
            unit => write!(f, "{}{}", self.magnitude, unit),
        }
    }
}

impl FromStr for Value {
    type Err = KryonError;

    /// Parses `"50%"`, `"100px"`, `"100"` and `"auto"`/`"undefined"`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();

        if value == "auto" || value == "undefined" {
            return Ok(Value::UNDEFINED);
        }

        let parsed = if let Some(pct) = value.strip_suffix('%') {
            pct.trim().parse::<f64>().map(Value::percent)
        } else if let Some(px) = value.strip_suffix("px") {
            px.trim().parse::<f64>().map(Value::pixels)
        } else {
            value.parse::<f64>().map(Value::pixels)
        };

        parsed.map_err(|_| KryonError::InvalidValue(value.to_string()))
    }
}

/// Epsilon equality where NaN only equals NaN.
pub fn floats_equal(a: f64, b: f64) -> bool {
    if a.is_nan() {
        return b.is_nan();
    }
    (a - b).abs() < EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_parsing() {
        assert_eq!("50%".parse::<Value>().unwrap(), Value::percent(50.0));
        assert_eq!("100px".parse::<Value>().unwrap(), Value::pixels(100.0));
        assert_eq!("auto".parse::<Value>().unwrap(), Value::UNDEFINED);
        assert_eq!("200".parse::<Value>().unwrap(), Value::pixels(200.0));
        assert!(matches!("wide".parse::<Value>(), Err(KryonError::InvalidValue(_))));
    }

    #[test]
    fn test_value_resolve() {
        assert_eq!(Value::percent(50.0).resolve(200.0), 100.0);
        assert_eq!(Value::pixels(50.0).resolve(200.0), 50.0);
        assert!(Value::UNDEFINED.resolve(200.0).is_nan());
        assert!(Value::percent(50.0).resolve(f64::NAN).is_nan());
        assert_eq!(Value::percent(50.0).resolve_or_zero(f64::NAN), 0.0);
    }

    #[test]
    fn test_value_equality() {
        assert_eq!(Value::pixels(10.0), Value::pixels(10.00005));
        assert_ne!(Value::pixels(10.0), Value::pixels(10.001));
        assert_ne!(Value::pixels(10.0), Value::percent(10.0));
        // magnitude is ignored once both sides are undefined
        assert_eq!(Value { magnitude: 3.0, unit: Unit::Undefined }, Value::UNDEFINED);
    }

    #[test]
    fn test_floats_equal_nan() {
        assert!(floats_equal(f64::NAN, f64::NAN));
        assert!(!floats_equal(f64::NAN, 0.0));
        assert!(!floats_equal(0.0, f64::NAN));
        assert!(floats_equal(1.0, 1.00001));
    }

    #[test]
    fn test_assign_keeps_unit_on_nan() {
        let mut value = Value::UNDEFINED;
        assert!(value.assign(f64::NAN, Unit::Pixel));
        assert_eq!(value.unit, Unit::Undefined);

        assert!(value.assign(20.0, Unit::Pixel));
        assert_eq!(value, Value::pixels(20.0));
        assert!(!value.assign(20.0, Unit::Pixel));

        assert!(value.assign(f64::NAN, Unit::Pixel));
        assert!(value.magnitude.is_nan());
        assert_eq!(value.unit, Unit::Pixel);
        // {NaN, Pixel} now matches a NaN pixel write
        assert!(!value.assign(f64::NAN, Unit::Pixel));
    }
}

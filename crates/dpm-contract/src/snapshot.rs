use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single named input value carried by a [`Snapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Boolean status flag (sensor health, solver success, ...).
    Flag(bool),
    /// Single numeric quantity.
    Scalar(f64),
    /// Numeric vector (pose, velocity, force).
    Vector(Vec<f64>),
}

impl Value {
    /// Returns the numeric components, or `None` for flags.
    pub fn components(&self) -> Option<&[f64]> {
        match self {
            Value::Scalar(value) => Some(std::slice::from_ref(value)),
            Value::Vector(values) => Some(values),
            Value::Flag(_) => None,
        }
    }

    /// Returns true when the value carries no NaN or infinite component.
    pub fn is_finite(&self) -> bool {
        match self {
            Value::Flag(_) => true,
            Value::Scalar(value) => value.is_finite(),
            Value::Vector(values) => values.iter().all(|v| v.is_finite()),
        }
    }
}

/// Immutable per-tick view of every input the contracts may read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Simulation step index (the logical clock).
    pub tick: u64,
    /// Simulation time in seconds.
    pub timestamp: f64,
    /// Named inputs. Absent keys model unavailable data.
    #[serde(default)]
    pub values: BTreeMap<String, Value>,
}

impl Snapshot {
    /// Creates an empty snapshot for the given tick.
    pub fn new(tick: u64, timestamp: f64) -> Self {
        Self {
            tick,
            timestamp,
            values: BTreeMap::new(),
        }
    }

    /// Adds a scalar input.
    pub fn with_scalar(mut self, name: impl Into<String>, value: f64) -> Self {
        self.values.insert(name.into(), Value::Scalar(value));
        self
    }

    /// Adds a vector input.
    pub fn with_vector(mut self, name: impl Into<String>, values: impl Into<Vec<f64>>) -> Self {
        self.values.insert(name.into(), Value::Vector(values.into()));
        self
    }

    /// Adds a flag input.
    pub fn with_flag(mut self, name: impl Into<String>, value: bool) -> Self {
        self.values.insert(name.into(), Value::Flag(value));
        self
    }

    /// Adds an optional vector input; `None` leaves the field absent.
    pub fn with_optional_vector(self, name: impl Into<String>, values: Option<Vec<f64>>) -> Self {
        match values {
            Some(values) => self.with_vector(name, values),
            None => self,
        }
    }

    /// Adds an optional scalar input; `None` leaves the field absent.
    pub fn with_optional_scalar(self, name: impl Into<String>, value: Option<f64>) -> Self {
        match value {
            Some(value) => self.with_scalar(name, value),
            None => self,
        }
    }

    /// Returns the raw value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Returns true when the field is present and free of NaN/inf components.
    pub fn available(&self, name: &str) -> bool {
        self.values.get(name).is_some_and(Value::is_finite)
    }

    /// Returns the numeric components of an available field.
    pub fn numeric(&self, name: &str) -> Option<&[f64]> {
        self.values
            .get(name)
            .filter(|value| value.is_finite())
            .and_then(Value::components)
    }

    /// Returns a flag value; numeric values are not coerced.
    pub fn flag(&self, name: &str) -> Option<bool> {
        match self.values.get(name) {
            Some(Value::Flag(value)) => Some(*value),
            _ => None,
        }
    }
}

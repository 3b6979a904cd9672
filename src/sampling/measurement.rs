//! Raw measurement records
//!
//! A `Measurement` is the engine's input unit: one observed value with its
//! timestamp and identifying context. Measurements are immutable once
//! recorded; everything downstream is derived fresh from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Production shift the measurement was taken on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shift {
    Day,
    Evening,
    Night,
    Rotating,
}

impl std::fmt::Display for Shift {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Shift::Day => write!(f, "day"),
            Shift::Evening => write!(f, "evening"),
            Shift::Night => write!(f, "night"),
            Shift::Rotating => write!(f, "rotating"),
        }
    }
}

impl std::str::FromStr for Shift {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "day" => Ok(Shift::Day),
            "evening" => Ok(Shift::Evening),
            "night" => Ok(Shift::Night),
            "rotating" => Ok(Shift::Rotating),
            _ => Err(format!(
                "Invalid shift: {}. Use day, evening, night, or rotating",
                s
            )),
        }
    }
}

/// A single recorded measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Monitored parameter this value belongs to (e.g., "ph", "fill_weight")
    pub parameter: String,

    /// Observed value (scalar for variable data, count for attribute data)
    pub value: f64,

    /// When the value was observed
    pub timestamp: DateTime<Utc>,

    /// Operator who took the measurement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,

    /// Workstation or equipment the value came from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workstation: Option<String>,

    /// Batch / lot identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch: Option<String>,

    /// Production shift
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift: Option<Shift>,
}

impl Measurement {
    /// Create a measurement with the required fields
    pub fn new(parameter: impl Into<String>, value: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            parameter: parameter.into(),
            value,
            timestamp,
            operator: None,
            workstation: None,
            batch: None,
            shift: None,
        }
    }

    /// Attach an operator
    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = Some(operator.into());
        self
    }

    /// Attach a workstation
    pub fn with_workstation(mut self, workstation: impl Into<String>) -> Self {
        self.workstation = Some(workstation.into());
        self
    }

    /// Attach a batch identifier
    pub fn with_batch(mut self, batch: impl Into<String>) -> Self {
        self.batch = Some(batch.into());
        self
    }

    /// Attach a shift
    pub fn with_shift(mut self, shift: Shift) -> Self {
        self.shift = Some(shift);
        self
    }
}

//! Control chart types and limit calculation
//!
//! Shared chart vocabulary lives here; the calculators are split by chart
//! family: [`variables`] for X-bar/R and Individual-MR, [`attributes`] for
//! p/np/c/u counts, and [`time_weighted`] for CUSUM and EWMA.

pub mod attributes;
pub mod time_weighted;
pub mod variables;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::core::SpcError;

pub use attributes::{AttributeChartResult, AttributeLimits, SampleSizePolicy};
pub use time_weighted::{CusumChart, CusumPoint, CusumState, EwmaChart, EwmaPoint, EwmaState};
pub use variables::{IndividualMrResult, XBarRResult};

/// Control chart family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    XBarR,
    IndividualMovingRange,
    P,
    Np,
    C,
    U,
    Cusum,
    Ewma,
}

impl ChartType {
    /// Whether the chart plots measured values rather than counts
    pub fn is_variables(&self) -> bool {
        matches!(
            self,
            ChartType::XBarR
                | ChartType::IndividualMovingRange
                | ChartType::Cusum
                | ChartType::Ewma
        )
    }

    /// Whether the chart plots attribute (count) data
    pub fn is_attributes(&self) -> bool {
        matches!(self, ChartType::P | ChartType::Np | ChartType::C | ChartType::U)
    }
}

impl std::fmt::Display for ChartType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChartType::XBarR => write!(f, "X-bar R"),
            ChartType::IndividualMovingRange => write!(f, "Individual-Moving Range"),
            ChartType::P => write!(f, "p-chart"),
            ChartType::Np => write!(f, "np-chart"),
            ChartType::C => write!(f, "c-chart"),
            ChartType::U => write!(f, "u-chart"),
            ChartType::Cusum => write!(f, "CUSUM"),
            ChartType::Ewma => write!(f, "EWMA"),
        }
    }
}

impl FromStr for ChartType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace([' ', '_'], "-").as_str() {
            "x-bar-r" | "xbar-r" | "xbarr" => Ok(ChartType::XBarR),
            "individual-moving-range" | "i-mr" | "imr" | "individuals" => {
                Ok(ChartType::IndividualMovingRange)
            }
            "p-chart" | "p" => Ok(ChartType::P),
            "np-chart" | "np" => Ok(ChartType::Np),
            "c-chart" | "c" => Ok(ChartType::C),
            "u-chart" | "u" => Ok(ChartType::U),
            "cusum" => Ok(ChartType::Cusum),
            "ewma" => Ok(ChartType::Ewma),
            _ => Err(format!("Invalid chart type: {}", s)),
        }
    }
}

/// How a set of control limits was derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitMethod {
    /// Estimated from in-control historical data
    HistoricalData,
    /// Supplied from known process parameters (mean +/- 3 sigma)
    Theoretical,
    /// Derived from specification limits and a target capability
    ProcessCapability,
}

impl std::fmt::Display for LimitMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LimitMethod::HistoricalData => write!(f, "Historical Data"),
            LimitMethod::Theoretical => write!(f, "Theoretical"),
            LimitMethod::ProcessCapability => write!(f, "Process Capability"),
        }
    }
}

impl FromStr for LimitMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace([' ', '-'], "_").as_str() {
            "historical_data" | "historical" => Ok(LimitMethod::HistoricalData),
            "theoretical" => Ok(LimitMethod::Theoretical),
            "process_capability" | "capability" => Ok(LimitMethod::ProcessCapability),
            _ => Err(format!("Invalid limit method: {}", s)),
        }
    }
}

/// A calculated set of control limits for one chart
///
/// Immutable once created; recalculation produces a new set. The
/// constructor enforces LCL < CL < UCL so downstream consumers never see
/// a degenerate set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlLimitSet {
    /// Parameter the limits apply to
    pub parameter: String,

    /// Chart the limits belong to
    pub chart_type: ChartType,

    /// Center line
    pub center_line: f64,

    /// Upper control limit
    pub ucl: f64,

    /// Lower control limit
    pub lcl: f64,

    /// Sigma multiple the limits were placed at, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sigma_level: Option<f64>,

    /// Derivation method
    pub method: LimitMethod,

    /// When the limits took effect
    pub effective_from: DateTime<Utc>,
}

impl ControlLimitSet {
    /// Create a limit set, validating the ordering invariant
    ///
    /// # Errors
    ///
    /// [`SpcError::InvalidLimits`] unless LCL < CL < UCL with all three
    /// finite.
    pub fn new(
        parameter: impl Into<String>,
        chart_type: ChartType,
        center_line: f64,
        ucl: f64,
        lcl: f64,
        method: LimitMethod,
    ) -> Result<Self, SpcError> {
        let parameter = parameter.into();
        if !center_line.is_finite() || !ucl.is_finite() || !lcl.is_finite() {
            return Err(SpcError::InvalidLimits {
                parameter,
                message: "control limits must be finite".to_string(),
            });
        }
        if !(lcl < center_line && center_line < ucl) {
            return Err(SpcError::InvalidLimits {
                parameter,
                message: format!(
                    "limits must satisfy LCL < CL < UCL, got LCL={}, CL={}, UCL={}",
                    lcl, center_line, ucl
                ),
            });
        }
        Ok(Self {
            parameter,
            chart_type,
            center_line,
            ucl,
            lcl,
            sigma_level: None,
            method,
            effective_from: Utc::now(),
        })
    }

    /// Record the sigma multiple the limits were placed at
    pub fn with_sigma_level(mut self, sigma_level: f64) -> Self {
        self.sigma_level = Some(sigma_level);
        self
    }

    /// Override the effective-from timestamp
    pub fn with_effective_from(mut self, effective_from: DateTime<Utc>) -> Self {
        self.effective_from = effective_from;
        self
    }

    /// Implied one-sigma spread, (UCL - CL) / 3
    pub fn sigma(&self) -> f64 {
        (self.ucl - self.center_line) / 3.0
    }

    /// Zone boundary at the given sigma multiple above/below the center
    pub fn zone(&self, multiple: f64) -> (f64, f64) {
        let s = self.sigma();
        (self.center_line - multiple * s, self.center_line + multiple * s)
    }
}

/// Append-only history of limit sets for one chart
///
/// Old limit sets are retained so past data can still be interpreted
/// against the limits that were active when it was collected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LimitHistory {
    entries: Vec<ControlLimitSet>,
}

impl LimitHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a limit set
    ///
    /// # Errors
    ///
    /// [`SpcError::InvalidLimits`] when the new set's `effective_from` is
    /// not after the current set's.
    pub fn push(&mut self, limits: ControlLimitSet) -> Result<(), SpcError> {
        if let Some(current) = self.entries.last() {
            if limits.effective_from <= current.effective_from {
                return Err(SpcError::InvalidLimits {
                    parameter: limits.parameter.clone(),
                    message: "a new limit set must take effect after the current one".to_string(),
                });
            }
        }
        self.entries.push(limits);
        Ok(())
    }

    /// Limit set currently in effect
    pub fn current(&self) -> Option<&ControlLimitSet> {
        self.entries.last()
    }

    /// Limit set that was in effect at the given instant
    pub fn active_at(&self, at: DateTime<Utc>) -> Option<&ControlLimitSet> {
        self.entries.iter().rev().find(|l| l.effective_from <= at)
    }

    /// All limit sets, oldest first
    pub fn entries(&self) -> &[ControlLimitSet] {
        &self.entries
    }
}

/// A value plotted on a control chart, paired with its sequence position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlottedPoint {
    /// 0-based position in the plotted sequence
    pub index: usize,
    /// Plotted statistic (subgroup mean, proportion, count, ...)
    pub value: f64,
}

//! Variable (measurement) control charts
//!
//! X-bar/R for subgrouped data and Individual-Moving Range for single
//! observations, plus the theoretical and capability-derived limit methods
//! that do not require historical data.

use serde::{Deserialize, Serialize};

use crate::capability::Specification;
use crate::core::constants;
use crate::core::stats;
use crate::core::{SpcError, SpcSettings};
use crate::sampling::Subgroup;

use super::{ChartType, ControlLimitSet, LimitMethod, PlottedPoint};

/// Calculated X-bar/R chart: paired limits plus the plotted statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XBarRResult {
    /// Parameter the chart monitors
    pub parameter: String,

    /// Common subgroup size
    pub subgroup_size: usize,

    /// Grand mean (mean of subgroup means), the X-bar center line
    pub grand_mean: f64,

    /// Mean subgroup range, the range-chart center line
    pub mean_range: f64,

    /// Limits for the means chart, CL +/- A2 * R-bar
    pub x_bar_limits: ControlLimitSet,

    /// Limits for the range chart, D3 * R-bar .. D4 * R-bar
    pub range_limits: ControlLimitSet,

    /// Subgroup means in sequence order
    pub mean_points: Vec<PlottedPoint>,

    /// Subgroup ranges in sequence order
    pub range_points: Vec<PlottedPoint>,

    /// Incomplete subgroups excluded from the calculation
    pub excluded_incomplete: usize,
}

/// Calculated Individual-Moving Range chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndividualMrResult {
    /// Parameter the chart monitors
    pub parameter: String,

    /// Mean of the individual observations
    pub mean: f64,

    /// Mean moving range
    pub mean_moving_range: f64,

    /// Limits for the individuals chart, mean +/- 2.660 * MR-bar
    pub individual_limits: ControlLimitSet,

    /// Limits for the moving-range chart, 0 .. 3.267 * MR-bar
    pub moving_range_limits: ControlLimitSet,

    /// Individual observations in sequence order
    pub individual_points: Vec<PlottedPoint>,

    /// Moving ranges |x_i - x_{i-1}|; one fewer point than the individuals
    pub moving_range_points: Vec<PlottedPoint>,
}

/// Calculate X-bar/R control limits from historical subgroups
///
/// Incomplete subgroups are excluded (they stay visible in the result's
/// exclusion count); the remaining subgroups must share one size in 2..=25.
///
/// # Errors
///
/// - [`SpcError::InvalidGrouping`] for mixed or out-of-range subgroup sizes
/// - [`SpcError::InsufficientData`] below `settings.min_subgroups`
/// - [`SpcError::ZeroVariance`] when every subgroup range is zero
pub fn x_bar_r(
    parameter: &str,
    subgroups: &[Subgroup],
    settings: &SpcSettings,
) -> Result<XBarRResult, SpcError> {
    let complete: Vec<&Subgroup> = subgroups.iter().filter(|g| g.complete).collect();
    let excluded_incomplete = subgroups.len() - complete.len();

    if complete.len() < settings.min_subgroups {
        return Err(SpcError::InsufficientData {
            parameter: parameter.to_string(),
            available: complete.len(),
            required: settings.min_subgroups,
        });
    }

    let n = complete[0].count;
    if complete.iter().any(|g| g.count != n) {
        return Err(SpcError::InvalidGrouping {
            parameter: parameter.to_string(),
            message: "X-bar/R requires a constant subgroup size".to_string(),
        });
    }
    let (a2, d3, d4) = match (constants::a2(n), constants::d3(n), constants::d4(n)) {
        (Some(a2), Some(d3), Some(d4)) => (a2, d3, d4),
        _ => {
            return Err(SpcError::InvalidGrouping {
                parameter: parameter.to_string(),
                message: format!("subgroup size {} outside the tabulated range 2..=25", n),
            })
        }
    };

    let means: Vec<f64> = complete.iter().map(|g| g.mean).collect();
    let ranges: Vec<f64> = complete.iter().map(|g| g.range).collect();
    // complete is non-empty here, the means always exist
    let grand_mean = stats::mean(&means).unwrap_or(0.0);
    let mean_range = stats::mean(&ranges).unwrap_or(0.0);
    if mean_range == 0.0 {
        return Err(SpcError::ZeroVariance {
            parameter: parameter.to_string(),
        });
    }

    let x_bar_limits = ControlLimitSet::new(
        parameter,
        ChartType::XBarR,
        grand_mean,
        grand_mean + a2 * mean_range,
        grand_mean - a2 * mean_range,
        LimitMethod::HistoricalData,
    )?
    .with_sigma_level(settings.sigma_level_override.unwrap_or(3.0));

    let range_limits = ControlLimitSet::new(
        parameter,
        ChartType::XBarR,
        mean_range,
        d4 * mean_range,
        d3 * mean_range,
        LimitMethod::HistoricalData,
    )?;

    Ok(XBarRResult {
        parameter: parameter.to_string(),
        subgroup_size: n,
        grand_mean,
        mean_range,
        x_bar_limits,
        range_limits,
        mean_points: plotted(&means),
        range_points: plotted(&ranges),
        excluded_incomplete,
    })
}

/// Calculate Individual-Moving Range control limits from single observations
///
/// # Errors
///
/// - [`SpcError::InvalidGrouping`] for non-finite observations
/// - [`SpcError::InsufficientData`] below `settings.min_subgroups` points
/// - [`SpcError::ZeroVariance`] when all observations are identical
pub fn individual_mr(
    parameter: &str,
    values: &[f64],
    settings: &SpcSettings,
) -> Result<IndividualMrResult, SpcError> {
    if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
        return Err(SpcError::InvalidGrouping {
            parameter: parameter.to_string(),
            message: format!("non-finite observation at index {}", pos),
        });
    }
    if values.len() < settings.min_subgroups {
        return Err(SpcError::InsufficientData {
            parameter: parameter.to_string(),
            available: values.len(),
            required: settings.min_subgroups,
        });
    }

    let moving_ranges: Vec<f64> = values.windows(2).map(|w| (w[1] - w[0]).abs()).collect();
    let mean = stats::mean(values).unwrap_or(0.0);
    let mean_moving_range = stats::mean(&moving_ranges).unwrap_or(0.0);
    if mean_moving_range == 0.0 {
        return Err(SpcError::ZeroVariance {
            parameter: parameter.to_string(),
        });
    }

    let individual_limits = ControlLimitSet::new(
        parameter,
        ChartType::IndividualMovingRange,
        mean,
        mean + constants::E2 * mean_moving_range,
        mean - constants::E2 * mean_moving_range,
        LimitMethod::HistoricalData,
    )?
    .with_sigma_level(settings.sigma_level_override.unwrap_or(3.0));

    let moving_range_limits = ControlLimitSet::new(
        parameter,
        ChartType::IndividualMovingRange,
        mean_moving_range,
        constants::D4_MR * mean_moving_range,
        0.0,
        LimitMethod::HistoricalData,
    )?;

    Ok(IndividualMrResult {
        parameter: parameter.to_string(),
        mean,
        mean_moving_range,
        individual_limits,
        moving_range_limits,
        individual_points: plotted(values),
        moving_range_points: plotted(&moving_ranges),
    })
}

/// Theoretical limits from a known process mean and sigma: mean +/- 3 sigma
pub fn theoretical_limits(
    parameter: &str,
    chart_type: ChartType,
    mean: f64,
    sigma: f64,
) -> Result<ControlLimitSet, SpcError> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(SpcError::ZeroVariance {
            parameter: parameter.to_string(),
        });
    }
    Ok(ControlLimitSet::new(
        parameter,
        chart_type,
        mean,
        mean + 3.0 * sigma,
        mean - 3.0 * sigma,
        LimitMethod::Theoretical,
    )?
    .with_sigma_level(3.0))
}

/// Capability-derived limits from a two-sided specification and target Cp
///
/// Backs out the sigma a process at the target Cp would have,
/// sigma = (USL - LSL) / (6 * target Cp), and places 3-sigma limits around
/// the specification target (midpoint by default).
///
/// # Errors
///
/// [`SpcError::InvalidSpecification`] when either spec limit or the
/// target Cp is missing, or the target Cp is not positive.
pub fn capability_limits(
    spec: &Specification,
    chart_type: ChartType,
) -> Result<ControlLimitSet, SpcError> {
    spec.validate()?;
    let (usl, lsl) = match (spec.usl, spec.lsl) {
        (Some(u), Some(l)) => (u, l),
        _ => {
            return Err(SpcError::InvalidSpecification {
                parameter: spec.parameter.clone(),
                message: "capability-derived limits require both USL and LSL".to_string(),
            })
        }
    };
    let target_cp = spec.target_cp.ok_or_else(|| SpcError::InvalidSpecification {
        parameter: spec.parameter.clone(),
        message: "capability-derived limits require a target Cp".to_string(),
    })?;
    if !target_cp.is_finite() || target_cp <= 0.0 {
        return Err(SpcError::InvalidSpecification {
            parameter: spec.parameter.clone(),
            message: format!("target Cp must be positive, got {}", target_cp),
        });
    }

    let sigma = (usl - lsl) / (6.0 * target_cp);
    // A two-sided spec always has an effective target
    let center = spec.effective_target().unwrap_or((usl + lsl) / 2.0);

    Ok(ControlLimitSet::new(
        spec.parameter.clone(),
        chart_type,
        center,
        center + 3.0 * sigma,
        center - 3.0 * sigma,
        LimitMethod::ProcessCapability,
    )?
    .with_sigma_level(3.0))
}

fn plotted(values: &[f64]) -> Vec<PlottedPoint> {
    values
        .iter()
        .enumerate()
        .map(|(index, &value)| PlottedPoint { index, value })
        .collect()
}

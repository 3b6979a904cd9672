//! Attribute (count) control charts
//!
//! p and np charts for defective units (binomial), c and u charts for
//! defect counts (Poisson). When the sample size or area of opportunity
//! varies, limits are computed per point and the result says so explicitly
//! via [`SampleSizePolicy`].

use serde::{Deserialize, Serialize};

use crate::core::{SpcError, SpcSettings};

use super::{ChartType, ControlLimitSet, LimitMethod, PlottedPoint};

/// Whether every point shares one sample size / area of opportunity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleSizePolicy {
    Constant,
    Varies,
}

/// Control limits for a single plotted point
///
/// Attribute limits depend on the point's own sample size, so each point
/// carries its limits. Lower limits are clamped at zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttributeLimits {
    /// 0-based position in the plotted sequence
    pub index: usize,
    /// Upper control limit for this point
    pub ucl: f64,
    /// Lower control limit for this point (>= 0)
    pub lcl: f64,
}

/// Calculated attribute chart: center line, per-point limits, plotted values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeChartResult {
    /// Parameter the chart monitors
    pub parameter: String,

    /// Chart family (always one of p/np/c/u)
    pub chart_type: ChartType,

    /// Center line: p-bar, np-bar, c-bar, or u-bar
    pub center_line: f64,

    /// Whether the limits vary per point
    pub sample_size_policy: SampleSizePolicy,

    /// Per-point control limits, parallel to `points`
    pub limits: Vec<AttributeLimits>,

    /// Plotted statistic per point (proportion, count, or rate)
    pub points: Vec<PlottedPoint>,

    /// Single limit set, present only when the sample size is constant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_limits: Option<ControlLimitSet>,
}

/// p chart: proportion defective per sample
///
/// `defectives[i]` out of `sample_sizes[i]` units. Limits are
/// p-bar +/- 3 sqrt(p-bar (1 - p-bar) / n_i), clamped to [0, 1].
///
/// # Errors
///
/// - [`SpcError::InvalidGrouping`] for mismatched lengths, a zero sample
///   size, or a defective count exceeding its sample
/// - [`SpcError::InsufficientData`] below `settings.min_subgroups` samples
/// - [`SpcError::ZeroVariance`] when p-bar is exactly 0 or 1
pub fn p_chart(
    parameter: &str,
    defectives: &[usize],
    sample_sizes: &[usize],
    settings: &SpcSettings,
) -> Result<AttributeChartResult, SpcError> {
    validate_counts(parameter, defectives, sample_sizes, settings)?;

    let total_defective: usize = defectives.iter().sum();
    let total_inspected: usize = sample_sizes.iter().sum();
    let p_bar = total_defective as f64 / total_inspected as f64;
    if p_bar == 0.0 || p_bar == 1.0 {
        return Err(SpcError::ZeroVariance {
            parameter: parameter.to_string(),
        });
    }

    let policy = size_policy(sample_sizes);
    let limits: Vec<AttributeLimits> = sample_sizes
        .iter()
        .enumerate()
        .map(|(index, &n)| {
            let spread = 3.0 * (p_bar * (1.0 - p_bar) / n as f64).sqrt();
            AttributeLimits {
                index,
                ucl: (p_bar + spread).min(1.0),
                lcl: (p_bar - spread).max(0.0),
            }
        })
        .collect();
    let points: Vec<PlottedPoint> = defectives
        .iter()
        .zip(sample_sizes)
        .enumerate()
        .map(|(index, (&d, &n))| PlottedPoint {
            index,
            value: d as f64 / n as f64,
        })
        .collect();

    let chart_limits = constant_limits(parameter, ChartType::P, p_bar, policy, &limits)?;
    Ok(AttributeChartResult {
        parameter: parameter.to_string(),
        chart_type: ChartType::P,
        center_line: p_bar,
        sample_size_policy: policy,
        limits,
        points,
        chart_limits,
    })
}

/// np chart: count of defective units per constant-size sample
///
/// Limits are n p-bar +/- 3 sqrt(n p-bar (1 - p-bar)), lower clamped at 0.
/// The np chart requires a constant sample size; use [`p_chart`] when it
/// varies.
pub fn np_chart(
    parameter: &str,
    defectives: &[usize],
    sample_size: usize,
    settings: &SpcSettings,
) -> Result<AttributeChartResult, SpcError> {
    let sizes = vec![sample_size; defectives.len()];
    validate_counts(parameter, defectives, &sizes, settings)?;

    let total_defective: usize = defectives.iter().sum();
    let p_bar = total_defective as f64 / (defectives.len() * sample_size) as f64;
    if p_bar == 0.0 || p_bar == 1.0 {
        return Err(SpcError::ZeroVariance {
            parameter: parameter.to_string(),
        });
    }

    let np_bar = sample_size as f64 * p_bar;
    let spread = 3.0 * (np_bar * (1.0 - p_bar)).sqrt();
    let limits: Vec<AttributeLimits> = (0..defectives.len())
        .map(|index| AttributeLimits {
            index,
            ucl: np_bar + spread,
            lcl: (np_bar - spread).max(0.0),
        })
        .collect();
    let points: Vec<PlottedPoint> = defectives
        .iter()
        .enumerate()
        .map(|(index, &d)| PlottedPoint {
            index,
            value: d as f64,
        })
        .collect();

    let chart_limits =
        constant_limits(parameter, ChartType::Np, np_bar, SampleSizePolicy::Constant, &limits)?;
    Ok(AttributeChartResult {
        parameter: parameter.to_string(),
        chart_type: ChartType::Np,
        center_line: np_bar,
        sample_size_policy: SampleSizePolicy::Constant,
        limits,
        points,
        chart_limits,
    })
}

/// c chart: defect count per constant inspection unit
///
/// Limits are c-bar +/- 3 sqrt(c-bar), lower clamped at 0.
pub fn c_chart(
    parameter: &str,
    counts: &[usize],
    settings: &SpcSettings,
) -> Result<AttributeChartResult, SpcError> {
    if counts.len() < settings.min_subgroups {
        return Err(SpcError::InsufficientData {
            parameter: parameter.to_string(),
            available: counts.len(),
            required: settings.min_subgroups,
        });
    }

    let c_bar = counts.iter().sum::<usize>() as f64 / counts.len() as f64;
    if c_bar == 0.0 {
        return Err(SpcError::ZeroVariance {
            parameter: parameter.to_string(),
        });
    }

    let spread = 3.0 * c_bar.sqrt();
    let limits: Vec<AttributeLimits> = (0..counts.len())
        .map(|index| AttributeLimits {
            index,
            ucl: c_bar + spread,
            lcl: (c_bar - spread).max(0.0),
        })
        .collect();
    let points: Vec<PlottedPoint> = counts
        .iter()
        .enumerate()
        .map(|(index, &c)| PlottedPoint {
            index,
            value: c as f64,
        })
        .collect();

    let chart_limits =
        constant_limits(parameter, ChartType::C, c_bar, SampleSizePolicy::Constant, &limits)?;
    Ok(AttributeChartResult {
        parameter: parameter.to_string(),
        chart_type: ChartType::C,
        center_line: c_bar,
        sample_size_policy: SampleSizePolicy::Constant,
        limits,
        points,
        chart_limits,
    })
}

/// u chart: defect rate per unit when the area of opportunity varies
///
/// `counts[i]` defects over `areas[i]` inspection units. Limits are
/// u-bar +/- 3 sqrt(u-bar / a_i), lower clamped at 0.
pub fn u_chart(
    parameter: &str,
    counts: &[usize],
    areas: &[f64],
    settings: &SpcSettings,
) -> Result<AttributeChartResult, SpcError> {
    if counts.len() != areas.len() {
        return Err(SpcError::InvalidGrouping {
            parameter: parameter.to_string(),
            message: format!(
                "count and area series differ in length ({} vs {})",
                counts.len(),
                areas.len()
            ),
        });
    }
    if let Some(pos) = areas.iter().position(|a| !a.is_finite() || *a <= 0.0) {
        return Err(SpcError::InvalidGrouping {
            parameter: parameter.to_string(),
            message: format!("area of opportunity at index {} must be positive", pos),
        });
    }
    if counts.len() < settings.min_subgroups {
        return Err(SpcError::InsufficientData {
            parameter: parameter.to_string(),
            available: counts.len(),
            required: settings.min_subgroups,
        });
    }

    let total_area: f64 = areas.iter().sum();
    let u_bar = counts.iter().sum::<usize>() as f64 / total_area;
    if u_bar == 0.0 {
        return Err(SpcError::ZeroVariance {
            parameter: parameter.to_string(),
        });
    }

    let policy = if areas.windows(2).all(|w| w[0] == w[1]) {
        SampleSizePolicy::Constant
    } else {
        SampleSizePolicy::Varies
    };
    let limits: Vec<AttributeLimits> = areas
        .iter()
        .enumerate()
        .map(|(index, &a)| {
            let spread = 3.0 * (u_bar / a).sqrt();
            AttributeLimits {
                index,
                ucl: u_bar + spread,
                lcl: (u_bar - spread).max(0.0),
            }
        })
        .collect();
    let points: Vec<PlottedPoint> = counts
        .iter()
        .zip(areas)
        .enumerate()
        .map(|(index, (&c, &a))| PlottedPoint {
            index,
            value: c as f64 / a,
        })
        .collect();

    let chart_limits = constant_limits(parameter, ChartType::U, u_bar, policy, &limits)?;
    Ok(AttributeChartResult {
        parameter: parameter.to_string(),
        chart_type: ChartType::U,
        center_line: u_bar,
        sample_size_policy: policy,
        limits,
        points,
        chart_limits,
    })
}

fn validate_counts(
    parameter: &str,
    defectives: &[usize],
    sample_sizes: &[usize],
    settings: &SpcSettings,
) -> Result<(), SpcError> {
    if defectives.len() != sample_sizes.len() {
        return Err(SpcError::InvalidGrouping {
            parameter: parameter.to_string(),
            message: format!(
                "defective and sample-size series differ in length ({} vs {})",
                defectives.len(),
                sample_sizes.len()
            ),
        });
    }
    if let Some(pos) = sample_sizes.iter().position(|&n| n == 0) {
        return Err(SpcError::InvalidGrouping {
            parameter: parameter.to_string(),
            message: format!("sample size at index {} is zero", pos),
        });
    }
    if let Some(pos) = defectives
        .iter()
        .zip(sample_sizes)
        .position(|(&d, &n)| d > n)
    {
        return Err(SpcError::InvalidGrouping {
            parameter: parameter.to_string(),
            message: format!("defective count at index {} exceeds its sample size", pos),
        });
    }
    if defectives.len() < settings.min_subgroups {
        return Err(SpcError::InsufficientData {
            parameter: parameter.to_string(),
            available: defectives.len(),
            required: settings.min_subgroups,
        });
    }
    Ok(())
}

fn size_policy(sample_sizes: &[usize]) -> SampleSizePolicy {
    if sample_sizes.windows(2).all(|w| w[0] == w[1]) {
        SampleSizePolicy::Constant
    } else {
        SampleSizePolicy::Varies
    }
}

// One shared limit pair only exists when every point has the same sample
// size; per-point limits stand alone otherwise.
fn constant_limits(
    parameter: &str,
    chart_type: ChartType,
    center_line: f64,
    policy: SampleSizePolicy,
    limits: &[AttributeLimits],
) -> Result<Option<ControlLimitSet>, SpcError> {
    if policy != SampleSizePolicy::Constant {
        return Ok(None);
    }
    let first = match limits.first() {
        Some(l) => l,
        None => return Ok(None),
    };
    Ok(Some(ControlLimitSet::new(
        parameter,
        chart_type,
        center_line,
        first.ucl,
        first.lcl,
        LimitMethod::HistoricalData,
    )?))
}

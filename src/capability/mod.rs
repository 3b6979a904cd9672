//! Process capability analysis
//!
//! Relates specification width to process spread: Cp/Cpk from a short-term
//! (within-subgroup) sigma, Pp/Ppk from the long-term (overall) sigma, plus
//! sigma level, estimated defect rate in PPM, and a capability rating.
//!
//! The calculator does not itself distinguish short- from long-term
//! variance; the caller supplies the correct estimator for each (the
//! [`sigma_within_from_ranges`] and [`pooled_std_dev`] helpers cover the
//! common cases).

use serde::{Deserialize, Serialize};

use crate::core::constants;
use crate::core::stats;
use crate::core::{SpcError, SpcSettings};
use crate::sampling::Subgroup;

/// Engineering specification for a monitored parameter
///
/// Read-only input owned by configuration. At least one spec limit is
/// required; when both are present USL must exceed LSL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specification {
    /// Parameter the specification applies to
    pub parameter: String,

    /// Upper specification limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usl: Option<f64>,

    /// Lower specification limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lsl: Option<f64>,

    /// Target value; defaults to the midpoint of USL/LSL where needed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<f64>,

    /// Symmetric tolerance (+/-) around the target, informational
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,

    /// Minimum acceptable Cpk for this parameter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_cpk: Option<f64>,

    /// Minimum acceptable Cp for this parameter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_cp: Option<f64>,

    /// Target Cp used when deriving control limits from the specification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_cp: Option<f64>,
}

impl Specification {
    /// Create a specification with the given limits
    ///
    /// # Errors
    ///
    /// Returns [`SpcError::InvalidSpecification`] when both limits are
    /// missing, either is non-finite, or USL <= LSL.
    pub fn new(
        parameter: impl Into<String>,
        usl: Option<f64>,
        lsl: Option<f64>,
    ) -> Result<Self, SpcError> {
        let spec = Self {
            parameter: parameter.into(),
            usl,
            lsl,
            target: None,
            tolerance: None,
            minimum_cpk: None,
            minimum_cp: None,
            target_cp: None,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Set the target value
    pub fn with_target(mut self, target: f64) -> Self {
        self.target = Some(target);
        self
    }

    /// Set the symmetric tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    /// Set the minimum acceptable Cpk
    pub fn with_minimum_cpk(mut self, minimum: f64) -> Self {
        self.minimum_cpk = Some(minimum);
        self
    }

    /// Set the minimum acceptable Cp
    pub fn with_minimum_cp(mut self, minimum: f64) -> Self {
        self.minimum_cp = Some(minimum);
        self
    }

    /// Set the target Cp for capability-derived control limits
    pub fn with_target_cp(mut self, target_cp: f64) -> Self {
        self.target_cp = Some(target_cp);
        self
    }

    /// Check the structural invariants
    pub fn validate(&self) -> Result<(), SpcError> {
        if self.usl.is_none() && self.lsl.is_none() {
            return Err(SpcError::InvalidSpecification {
                parameter: self.parameter.clone(),
                message: "at least one specification limit (USL or LSL) is required".to_string(),
            });
        }
        for (name, limit) in [("USL", self.usl), ("LSL", self.lsl)] {
            if let Some(v) = limit {
                if !v.is_finite() {
                    return Err(SpcError::InvalidSpecification {
                        parameter: self.parameter.clone(),
                        message: format!("{} must be finite", name),
                    });
                }
            }
        }
        if let (Some(u), Some(l)) = (self.usl, self.lsl) {
            if u <= l {
                return Err(SpcError::InvalidSpecification {
                    parameter: self.parameter.clone(),
                    message: format!("USL ({}) must exceed LSL ({})", u, l),
                });
            }
        }
        Ok(())
    }

    /// Target value, falling back to the midpoint of a two-sided spec
    pub fn effective_target(&self) -> Option<f64> {
        self.target.or(match (self.usl, self.lsl) {
            (Some(u), Some(l)) => Some((u + l) / 2.0),
            _ => None,
        })
    }
}

/// Capability rating with the fixed domain thresholds
///
/// Cpk > 2.0 Excellent, 1.33 < Cpk <= 2.0 Adequate,
/// 1.0 < Cpk <= 1.33 Marginal, Cpk <= 1.0 Inadequate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityRating {
    Excellent,
    Adequate,
    Marginal,
    Inadequate,
}

impl CapabilityRating {
    /// Rating for the given Cpk
    pub fn from_cpk(cpk: f64) -> Self {
        if cpk > 2.0 {
            CapabilityRating::Excellent
        } else if cpk > 1.33 {
            CapabilityRating::Adequate
        } else if cpk > 1.0 {
            CapabilityRating::Marginal
        } else {
            CapabilityRating::Inadequate
        }
    }
}

impl std::fmt::Display for CapabilityRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CapabilityRating::Excellent => write!(f, "excellent"),
            CapabilityRating::Adequate => write!(f, "adequate"),
            CapabilityRating::Marginal => write!(f, "marginal"),
            CapabilityRating::Inadequate => write!(f, "inadequate"),
        }
    }
}

/// Computed capability study result
///
/// Derived, recomputed on demand; never mutated. One-sided specifications
/// leave Cp/Pp unset since those indices need both limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityResult {
    /// Parameter the study is for
    pub parameter: String,

    /// Process mean
    pub mean: f64,

    /// Short-term (within-subgroup) standard deviation used for Cp/Cpk
    pub std_dev_within: f64,

    /// Long-term (overall) standard deviation used for Pp/Ppk
    pub std_dev_overall: f64,

    /// Cp = (USL - LSL) / 6 sigma; requires both limits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cp: Option<f64>,

    /// Cpu = (USL - mean) / 3 sigma
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<f64>,

    /// Cpl = (mean - LSL) / 3 sigma
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpl: Option<f64>,

    /// Cpk = min(Cpu, Cpl), or the one-sided index
    pub cpk: f64,

    /// Pp, the long-term counterpart of Cp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pp: Option<f64>,

    /// Ppk, the long-term counterpart of Cpk
    pub ppk: f64,

    /// Sigma level (3 x Cpk by convention unless overridden in settings)
    pub sigma_level: f64,

    /// Estimated defect rate in parts per million
    pub defect_rate_ppm: f64,

    /// Rating against the fixed thresholds
    pub rating: CapabilityRating,

    /// Whether Cpk meets the specification's minimum, when one is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meets_minimum_cpk: Option<bool>,

    /// Whether Cp meets the specification's minimum, when one is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meets_minimum_cp: Option<bool>,
}

/// Compute a capability study from supplied process statistics
///
/// `sigma_within` drives Cp/Cpk, `sigma_overall` drives Pp/Ppk; supplying
/// the same value for both is valid when no rational subgrouping exists.
///
/// # Errors
///
/// [`SpcError::InvalidSpecification`] for a malformed specification or
/// non-finite mean, [`SpcError::ZeroVariance`] when either sigma is zero
/// (capability is undefined, never reported as infinity).
pub fn assess(
    spec: &Specification,
    mean: f64,
    sigma_within: f64,
    sigma_overall: f64,
    settings: &SpcSettings,
) -> Result<CapabilityResult, SpcError> {
    spec.validate()?;

    if !mean.is_finite() {
        return Err(SpcError::InvalidSpecification {
            parameter: spec.parameter.clone(),
            message: "process mean must be finite".to_string(),
        });
    }
    for sigma in [sigma_within, sigma_overall] {
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(SpcError::ZeroVariance {
                parameter: spec.parameter.clone(),
            });
        }
    }

    let cpu = spec.usl.map(|u| (u - mean) / (3.0 * sigma_within));
    let cpl = spec.lsl.map(|l| (mean - l) / (3.0 * sigma_within));
    let cp = match (spec.usl, spec.lsl) {
        (Some(u), Some(l)) => Some((u - l) / (6.0 * sigma_within)),
        _ => None,
    };
    // Specification validation guarantees at least one side exists
    let cpk = match (cpu, cpl) {
        (Some(u), Some(l)) => u.min(l),
        (Some(u), None) => u,
        (None, Some(l)) => l,
        (None, None) => unreachable!("specification requires at least one limit"),
    };

    let ppu = spec.usl.map(|u| (u - mean) / (3.0 * sigma_overall));
    let ppl = spec.lsl.map(|l| (mean - l) / (3.0 * sigma_overall));
    let pp = match (spec.usl, spec.lsl) {
        (Some(u), Some(l)) => Some((u - l) / (6.0 * sigma_overall)),
        _ => None,
    };
    let ppk = match (ppu, ppl) {
        (Some(u), Some(l)) => u.min(l),
        (Some(u), None) => u,
        (None, Some(l)) => l,
        (None, None) => unreachable!("specification requires at least one limit"),
    };

    let upper_ppm = cpu.map_or(0.0, |c| 1e6 * stats::normal_cdf(-3.0 * c));
    let lower_ppm = cpl.map_or(0.0, |c| 1e6 * stats::normal_cdf(-3.0 * c));
    let defect_rate_ppm = upper_ppm + lower_ppm;

    let sigma_level = settings.sigma_level_override.unwrap_or(3.0 * cpk);
    let rating = CapabilityRating::from_cpk(cpk);

    Ok(CapabilityResult {
        parameter: spec.parameter.clone(),
        mean,
        std_dev_within: sigma_within,
        std_dev_overall: sigma_overall,
        cp,
        cpu,
        cpl,
        cpk,
        pp,
        ppk,
        sigma_level,
        defect_rate_ppm,
        rating,
        meets_minimum_cpk: spec.minimum_cpk.map(|min| cpk >= min),
        meets_minimum_cp: spec.minimum_cp.and_then(|min| cp.map(|c| c >= min)),
    })
}

/// Compute a capability study directly from raw values
///
/// Uses the overall standard deviation for both the short- and long-term
/// estimates, so Cp == Pp and Cpk == Ppk.
///
/// # Errors
///
/// [`SpcError::InsufficientData`] for fewer than 2 values, plus everything
/// [`assess`] can return.
pub fn assess_from_values(
    spec: &Specification,
    values: &[f64],
    settings: &SpcSettings,
) -> Result<CapabilityResult, SpcError> {
    let mean = stats::mean(values).ok_or_else(|| SpcError::InsufficientData {
        parameter: spec.parameter.clone(),
        available: values.len(),
        required: 2,
    })?;
    let sigma = stats::std_dev(values).ok_or_else(|| SpcError::InsufficientData {
        parameter: spec.parameter.clone(),
        available: values.len(),
        required: 2,
    })?;
    if sigma == 0.0 {
        return Err(SpcError::ZeroVariance {
            parameter: spec.parameter.clone(),
        });
    }
    assess(spec, mean, sigma, sigma, settings)
}

/// Estimate the within-subgroup sigma as R-bar / d2
///
/// Standard short-term estimator from a range-based control chart study.
/// Incomplete subgroups are skipped; the remaining subgroups must share one
/// size in 2..=25.
pub fn sigma_within_from_ranges(
    parameter: &str,
    subgroups: &[Subgroup],
) -> Result<f64, SpcError> {
    let complete: Vec<&Subgroup> = subgroups.iter().filter(|g| g.complete).collect();
    let n = uniform_size(parameter, &complete)?;
    let d2 = constants::d2(n).ok_or_else(|| SpcError::InvalidGrouping {
        parameter: parameter.to_string(),
        message: format!("subgroup size {} outside the tabulated range 2..=25", n),
    })?;

    let ranges: Vec<f64> = complete.iter().map(|g| g.range).collect();
    let r_bar = stats::mean(&ranges).ok_or_else(|| SpcError::InsufficientData {
        parameter: parameter.to_string(),
        available: 0,
        required: 1,
    })?;
    if r_bar == 0.0 {
        return Err(SpcError::ZeroVariance {
            parameter: parameter.to_string(),
        });
    }
    Ok(r_bar / d2)
}

/// Estimate the within-subgroup sigma as the pooled standard deviation
///
/// sqrt(sum((n_i - 1) s_i^2) / sum(n_i - 1)) over complete subgroups;
/// subgroup sizes may vary.
pub fn pooled_std_dev(parameter: &str, subgroups: &[Subgroup]) -> Result<f64, SpcError> {
    let mut weighted_var = 0.0;
    let mut dof = 0usize;
    for g in subgroups.iter().filter(|g| g.complete) {
        if let Some(s) = g.std_dev {
            weighted_var += (g.count - 1) as f64 * s * s;
            dof += g.count - 1;
        }
    }
    if dof == 0 {
        return Err(SpcError::InsufficientData {
            parameter: parameter.to_string(),
            available: 0,
            required: 1,
        });
    }
    let pooled = (weighted_var / dof as f64).sqrt();
    if pooled == 0.0 {
        return Err(SpcError::ZeroVariance {
            parameter: parameter.to_string(),
        });
    }
    Ok(pooled)
}

/// Convert a sigma quality level to a PPM defect rate (1.5 sigma shift convention)
pub fn sigma_to_ppm(sigma: f64) -> f64 {
    1_000_000.0 * (1.0 - stats::normal_cdf(sigma - 1.5))
}

/// Convert a PPM defect rate to a sigma quality level (1.5 sigma shift convention)
///
/// Returns `None` for PPM outside the open interval (0, 1,000,000).
pub fn ppm_to_sigma(ppm: f64) -> Option<f64> {
    if ppm.is_nan() || ppm <= 0.0 || ppm >= 1_000_000.0 {
        return None;
    }
    stats::inverse_normal_cdf(1.0 - ppm / 1_000_000.0).map(|z| z + 1.5)
}

fn uniform_size(parameter: &str, subgroups: &[&Subgroup]) -> Result<usize, SpcError> {
    let first = subgroups.first().ok_or_else(|| SpcError::InsufficientData {
        parameter: parameter.to_string(),
        available: 0,
        required: 1,
    })?;
    let n = first.count;
    if subgroups.iter().any(|g| g.count != n) {
        return Err(SpcError::InvalidGrouping {
            parameter: parameter.to_string(),
            message: "range-based estimation requires a constant subgroup size".to_string(),
        });
    }
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> SpcSettings {
        SpcSettings::with_defaults()
    }

    #[test]
    fn test_specification_requires_a_limit() {
        assert!(Specification::new("ph", None, None).is_err());
        assert!(Specification::new("ph", Some(8.0), None).is_ok());
        assert!(Specification::new("ph", None, Some(6.0)).is_ok());
    }

    #[test]
    fn test_specification_rejects_usl_leq_lsl() {
        let err = Specification::new("ph", Some(6.0), Some(8.0)).unwrap_err();
        assert!(matches!(err, SpcError::InvalidSpecification { .. }));
        assert!(Specification::new("ph", Some(6.0), Some(6.0)).is_err());
    }

    #[test]
    fn test_specification_rejects_non_finite() {
        assert!(Specification::new("ph", Some(f64::NAN), Some(6.0)).is_err());
        assert!(Specification::new("ph", Some(f64::INFINITY), None).is_err());
    }

    #[test]
    fn test_effective_target_defaults_to_midpoint() {
        let spec = Specification::new("fill", Some(25.05), Some(24.95)).unwrap();
        assert!((spec.effective_target().unwrap() - 25.0).abs() < 1e-12);

        let spec = spec.with_target(25.01);
        assert!((spec.effective_target().unwrap() - 25.01).abs() < 1e-12);
    }

    /// Spec example: USL = 25.05, LSL = 24.95, mean = 25.0, sigma = 0.0125
    /// gives Cp = Cpk = 1.33 and an "adequate" rating.
    #[test]
    fn test_textbook_adequate_process() {
        let spec = Specification::new("fill_weight", Some(25.05), Some(24.95)).unwrap();
        let result = assess(&spec, 25.0, 0.0125, 0.0125, &settings()).unwrap();

        assert!((result.cp.unwrap() - 1.3333).abs() < 1e-3);
        assert!((result.cpk - 1.3333).abs() < 1e-3);
        assert_eq!(result.rating, CapabilityRating::Adequate);
        assert!((result.sigma_level - 4.0).abs() < 1e-3);
    }

    #[test]
    fn test_off_center_process() {
        // USL = 220, LSL = 200, mean = 215, sigma = 2
        // Cpu = 5/6, Cpl = 15/6, Cpk = 5/6
        let spec = Specification::new("temp", Some(220.0), Some(200.0)).unwrap();
        let result = assess(&spec, 215.0, 2.0, 2.0, &settings()).unwrap();

        assert!((result.cp.unwrap() - 20.0 / 12.0).abs() < 1e-10);
        assert!((result.cpu.unwrap() - 5.0 / 6.0).abs() < 1e-10);
        assert!((result.cpl.unwrap() - 15.0 / 6.0).abs() < 1e-10);
        assert!((result.cpk - 5.0 / 6.0).abs() < 1e-10);
        assert_eq!(result.rating, CapabilityRating::Inadequate);
    }

    #[test]
    fn test_zero_variance_is_an_error_not_infinity() {
        let spec = Specification::new("ph", Some(8.0), Some(6.0)).unwrap();
        let err = assess(&spec, 7.0, 0.0, 1.0, &settings()).unwrap_err();
        assert!(matches!(err, SpcError::ZeroVariance { .. }));

        let err = assess(&spec, 7.0, 1.0, 0.0, &settings()).unwrap_err();
        assert!(matches!(err, SpcError::ZeroVariance { .. }));
    }

    #[test]
    fn test_one_sided_specification() {
        let spec = Specification::new("impurity", Some(5.0), None).unwrap();
        let result = assess(&spec, 2.0, 0.5, 0.5, &settings()).unwrap();

        assert!(result.cp.is_none());
        assert!(result.cpl.is_none());
        assert!((result.cpk - 2.0).abs() < 1e-10);
        assert!((result.cpk - result.cpu.unwrap()).abs() < 1e-15);
        // Only the upper tail contributes to PPM
        assert!(result.defect_rate_ppm < 1.0);
    }

    #[test]
    fn test_ppm_for_centered_process() {
        // Cpk = 1 means limits at +/- 3 sigma: ~2700 PPM total
        let spec = Specification::new("ph", Some(3.0), Some(-3.0)).unwrap();
        let result = assess(&spec, 0.0, 1.0, 1.0, &settings()).unwrap();
        assert!(
            (result.defect_rate_ppm - 2700.0).abs() < 30.0,
            "ppm = {}",
            result.defect_rate_ppm
        );
    }

    #[test]
    fn test_pp_ppk_use_overall_sigma() {
        let spec = Specification::new("temp", Some(220.0), Some(200.0)).unwrap();
        let result = assess(&spec, 210.0, 1.5, 3.0, &settings()).unwrap();

        assert!(result.pp.unwrap() < result.cp.unwrap());
        assert!(result.ppk < result.cpk);
        assert!((result.pp.unwrap() - 20.0 / 18.0).abs() < 1e-10);
    }

    #[test]
    fn test_minimum_cpk_check() {
        let spec = Specification::new("ph", Some(8.0), Some(6.0))
            .unwrap()
            .with_minimum_cpk(1.33)
            .with_minimum_cp(1.33);
        let result = assess(&spec, 7.0, 0.2, 0.2, &settings()).unwrap();

        // Cpk = 1/(3*0.2) = 1.667
        assert_eq!(result.meets_minimum_cpk, Some(true));
        assert_eq!(result.meets_minimum_cp, Some(true));

        let result = assess(&spec, 7.0, 0.4, 0.4, &settings()).unwrap();
        assert_eq!(result.meets_minimum_cpk, Some(false));
    }

    #[test]
    fn test_assess_from_values() {
        let spec = Specification::new("ph", Some(10.0), Some(0.0)).unwrap();
        let values = [4.0, 4.5, 5.0, 5.5, 6.0, 4.0, 5.0, 6.0, 5.0, 5.0];
        let result = assess_from_values(&spec, &values, &settings()).unwrap();

        // Overall sigma is used for both, so Cp == Pp
        assert!((result.cp.unwrap() - result.pp.unwrap()).abs() < 1e-15);
        assert!((result.cpk - result.ppk).abs() < 1e-15);
    }

    #[test]
    fn test_assess_from_values_insufficient() {
        let spec = Specification::new("ph", Some(10.0), Some(0.0)).unwrap();
        let err = assess_from_values(&spec, &[5.0], &settings()).unwrap_err();
        assert!(matches!(err, SpcError::InsufficientData { .. }));
    }

    #[test]
    fn test_assess_from_constant_values() {
        let spec = Specification::new("ph", Some(10.0), Some(0.0)).unwrap();
        let err = assess_from_values(&spec, &[5.0; 10], &settings()).unwrap_err();
        assert!(matches!(err, SpcError::ZeroVariance { .. }));
    }

    #[test]
    fn test_rating_thresholds() {
        assert_eq!(CapabilityRating::from_cpk(2.5), CapabilityRating::Excellent);
        assert_eq!(CapabilityRating::from_cpk(2.0), CapabilityRating::Adequate);
        assert_eq!(CapabilityRating::from_cpk(1.34), CapabilityRating::Adequate);
        assert_eq!(CapabilityRating::from_cpk(1.33), CapabilityRating::Marginal);
        assert_eq!(CapabilityRating::from_cpk(1.0), CapabilityRating::Inadequate);
        assert_eq!(CapabilityRating::from_cpk(0.5), CapabilityRating::Inadequate);
    }

    #[test]
    fn test_sigma_within_from_ranges() {
        use crate::sampling::{GroupingPolicy, Measurement, SubgroupBuilder};
        use chrono::{TimeZone, Utc};

        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        // Five subgroups of 5 with ranges 2, 2, 2, 3, 1 -> R-bar = 2
        let mut values = Vec::new();
        for r in [2.0, 2.0, 2.0, 3.0, 1.0] {
            values.extend([10.0 - r / 2.0, 10.0, 10.0, 10.0, 10.0 + r / 2.0]);
        }
        let measurements: Vec<Measurement> = values
            .iter()
            .map(|&v| Measurement::new("ph", v, t0))
            .collect();
        let subgroups = SubgroupBuilder::new(GroupingPolicy::FixedSize(5))
            .build(&measurements)
            .unwrap();

        // sigma-hat = R-bar / d2(5) = 2 / 2.326
        let sigma = sigma_within_from_ranges("ph", &subgroups).unwrap();
        assert!((sigma - 2.0 / 2.326).abs() < 1e-9);

        let pooled = pooled_std_dev("ph", &subgroups).unwrap();
        assert!(pooled > 0.0);
    }

    #[test]
    fn test_estimators_reject_degenerate_input() {
        use crate::sampling::{GroupingPolicy, Measurement, SubgroupBuilder};
        use chrono::{TimeZone, Utc};

        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let measurements: Vec<Measurement> =
            (0..20).map(|_| Measurement::new("ph", 5.0, t0)).collect();
        let subgroups = SubgroupBuilder::new(GroupingPolicy::FixedSize(5))
            .build(&measurements)
            .unwrap();

        assert!(matches!(
            sigma_within_from_ranges("ph", &subgroups).unwrap_err(),
            SpcError::ZeroVariance { .. }
        ));
        assert!(matches!(
            pooled_std_dev("ph", &subgroups).unwrap_err(),
            SpcError::ZeroVariance { .. }
        ));
        assert!(matches!(
            sigma_within_from_ranges("ph", &[]).unwrap_err(),
            SpcError::InsufficientData { .. }
        ));
    }

    #[test]
    fn test_sigma_ppm_conversions() {
        // Six Sigma => ~3.4 PPM under the 1.5 sigma shift convention
        assert!((sigma_to_ppm(6.0) - 3.4).abs() < 1.0);
        assert!((sigma_to_ppm(3.0) - 66_807.0).abs() < 500.0);

        let sigma = ppm_to_sigma(3.4).unwrap();
        assert!((sigma - 6.0).abs() < 0.1);
        assert!(ppm_to_sigma(0.0).is_none());
        assert!(ppm_to_sigma(1_000_000.0).is_none());
    }

    #[test]
    fn test_capability_result_roundtrip() {
        let spec = Specification::new("ph", Some(8.0), Some(6.0)).unwrap();
        let result = assess(&spec, 7.0, 0.25, 0.3, &settings()).unwrap();

        let json = serde_json::to_string(&result).unwrap();
        let parsed: CapabilityResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result, parsed);
    }
}

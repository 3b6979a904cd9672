//! Engine settings
//!
//! A single value object passed explicitly into the calculators. There is no
//! process-wide state; callers that want different policies for different
//! parameters construct one `SpcSettings` per stream.

use serde::{Deserialize, Serialize};

/// What to do with subgroups that have fewer than 2 points
///
/// Variable charts need at least 2 points per subgroup to compute a range or
/// standard deviation. The default yields the short subgroup flagged as
/// incomplete (so it can still be displayed) but excludes it from limit
/// calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncompletePolicy {
    /// Yield the subgroup with `complete = false`; calculators skip it
    FlagAndExclude,
    /// Silently skip the subgroup during iteration
    Drop,
}

impl Default for IncompletePolicy {
    fn default() -> Self {
        IncompletePolicy::FlagAndExclude
    }
}

/// Calculation settings shared across the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpcSettings {
    /// Minimum subgroups required for historical limit calculation (default: 20)
    pub min_subgroups: usize,

    /// Relative tolerance for the +/- 3 sigma symmetry check on control
    /// limits fed to the rule detector (default: 1e-6)
    pub limit_symmetry_tolerance: f64,

    /// Policy for subgroups with fewer than 2 points
    pub incomplete_policy: IncompletePolicy,

    /// Overrides the sigma level reported on results; when `None` the
    /// 3 x Cpk convention is used for capability and 3.0 for control limits
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sigma_level_override: Option<f64>,
}

impl SpcSettings {
    /// Settings with domain-standard defaults
    pub fn with_defaults() -> Self {
        Self {
            min_subgroups: 20,
            limit_symmetry_tolerance: 1e-6,
            incomplete_policy: IncompletePolicy::default(),
            sigma_level_override: None,
        }
    }

    /// Set the minimum number of subgroups for historical calculation
    pub fn with_min_subgroups(mut self, min: usize) -> Self {
        self.min_subgroups = min;
        self
    }

    /// Set the symmetry tolerance for the rule detector
    pub fn with_limit_symmetry_tolerance(mut self, tolerance: f64) -> Self {
        self.limit_symmetry_tolerance = tolerance;
        self
    }

    /// Set the incomplete-subgroup policy
    pub fn with_incomplete_policy(mut self, policy: IncompletePolicy) -> Self {
        self.incomplete_policy = policy;
        self
    }
}

impl Default for SpcSettings {
    fn default() -> Self {
        Self::with_defaults()
    }
}

//! Rational subgroup construction
//!
//! Groups an ordered measurement sequence into subgroups by fixed size, time
//! window, or a caller-supplied key. Iteration is lazy and restartable:
//! calling [`SubgroupBuilder::subgroups`] again yields a fresh pass over the
//! same data, and the input slice is never mutated.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::core::stats;
use crate::core::{IncompletePolicy, SpcError, SpcSettings};

use super::measurement::Measurement;

/// How measurements are partitioned into subgroups
pub enum GroupingPolicy {
    /// Consecutive runs of exactly N measurements (trailing remainder is
    /// an incomplete subgroup)
    FixedSize(usize),

    /// Windows of fixed duration anchored at the first measurement's
    /// timestamp; requires monotonically non-decreasing timestamps
    TimeWindow(Duration),

    /// Consecutive runs sharing the extracted key (e.g., batch or operator)
    ByKey(Box<dyn Fn(&Measurement) -> String + Send + Sync>),
}

impl GroupingPolicy {
    /// Group by the measurement's batch field (missing batch groups as "")
    pub fn by_batch() -> Self {
        GroupingPolicy::ByKey(Box::new(|m| m.batch.clone().unwrap_or_default()))
    }

    /// Group by the measurement's operator field (missing operator groups as "")
    pub fn by_operator() -> Self {
        GroupingPolicy::ByKey(Box::new(|m| m.operator.clone().unwrap_or_default()))
    }
}

impl std::fmt::Debug for GroupingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupingPolicy::FixedSize(n) => write!(f, "FixedSize({})", n),
            GroupingPolicy::TimeWindow(w) => write!(f, "TimeWindow({})", w),
            GroupingPolicy::ByKey(_) => write!(f, "ByKey(..)"),
        }
    }
}

/// An ordered group of measurements treated as one sample
///
/// Built fresh per calculation request and never mutated afterwards. The
/// summary statistics are computed at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subgroup {
    /// 1-based position in the subgroup sequence
    pub number: usize,

    /// Grouping key (batch/operator value or time-window start); `None` for
    /// fixed-size grouping
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// Measurement values in observation order
    pub values: Vec<f64>,

    /// Timestamp of the first measurement in the subgroup
    pub started_at: DateTime<Utc>,

    /// Subgroup mean
    pub mean: f64,

    /// Subgroup range (max - min); 0 for a single point
    pub range: f64,

    /// Sample standard deviation; `None` when fewer than 2 points
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub std_dev: Option<f64>,

    /// Number of measurements
    pub count: usize,

    /// Whether the subgroup has the 2+ points variable charts need
    pub complete: bool,
}

impl Subgroup {
    fn from_run(number: usize, key: Option<String>, run: &[Measurement]) -> Self {
        let values: Vec<f64> = run.iter().map(|m| m.value).collect();
        // Finiteness was validated by the builder, so the stats always exist
        let mean = stats::mean(&values).unwrap_or(0.0);
        let range = stats::range(&values).unwrap_or(0.0);
        let std_dev = stats::std_dev(&values);
        let count = values.len();

        Self {
            number,
            key,
            values,
            started_at: run[0].timestamp,
            mean,
            range,
            std_dev,
            count,
            complete: count >= 2,
        }
    }
}

/// Builds subgroups from an ordered measurement slice
#[derive(Debug)]
pub struct SubgroupBuilder {
    policy: GroupingPolicy,
    incomplete_policy: IncompletePolicy,
}

impl SubgroupBuilder {
    /// Create a builder with the given grouping policy and the default
    /// flag-and-exclude incomplete policy
    pub fn new(policy: GroupingPolicy) -> Self {
        Self {
            policy,
            incomplete_policy: IncompletePolicy::default(),
        }
    }

    /// Create a builder taking the incomplete-subgroup policy from settings
    pub fn from_settings(policy: GroupingPolicy, settings: &SpcSettings) -> Self {
        Self {
            policy,
            incomplete_policy: settings.incomplete_policy,
        }
    }

    /// Override the incomplete-subgroup policy
    pub fn with_incomplete_policy(mut self, policy: IncompletePolicy) -> Self {
        self.incomplete_policy = policy;
        self
    }

    /// Lazily iterate subgroups in chronological order
    ///
    /// # Errors
    ///
    /// Returns [`SpcError::InvalidGrouping`] for a zero subgroup size, a
    /// non-positive time window, timestamps that go backwards under a time
    /// window, or non-finite measurement values.
    pub fn subgroups<'a>(
        &'a self,
        measurements: &'a [Measurement],
    ) -> Result<SubgroupIter<'a>, SpcError> {
        let parameter = measurements
            .first()
            .map(|m| m.parameter.clone())
            .unwrap_or_default();

        if let Some(m) = measurements.iter().find(|m| !m.value.is_finite()) {
            return Err(SpcError::InvalidGrouping {
                parameter,
                message: format!("non-finite value at {}", m.timestamp),
            });
        }

        match &self.policy {
            GroupingPolicy::FixedSize(0) => {
                return Err(SpcError::InvalidGrouping {
                    parameter,
                    message: "subgroup size must be a positive integer".to_string(),
                });
            }
            GroupingPolicy::TimeWindow(w) => {
                if w.num_milliseconds() <= 0 {
                    return Err(SpcError::InvalidGrouping {
                        parameter,
                        message: "time window must be positive".to_string(),
                    });
                }
                if let Some(pair) = measurements.windows(2).find(|p| p[1].timestamp < p[0].timestamp)
                {
                    return Err(SpcError::InvalidGrouping {
                        parameter,
                        message: format!(
                            "timestamps must be monotonically non-decreasing (violated at {})",
                            pair[1].timestamp
                        ),
                    });
                }
            }
            _ => {}
        }

        Ok(SubgroupIter {
            builder: self,
            measurements,
            pos: 0,
            next_number: 1,
        })
    }

    /// Collect all subgroups eagerly
    pub fn build(&self, measurements: &[Measurement]) -> Result<Vec<Subgroup>, SpcError> {
        Ok(self.subgroups(measurements)?.collect())
    }

    fn run_end(&self, measurements: &[Measurement], start: usize) -> usize {
        match &self.policy {
            GroupingPolicy::FixedSize(n) => (start + n).min(measurements.len()),
            GroupingPolicy::TimeWindow(w) => {
                let window_ms = w.num_milliseconds();
                let t0 = measurements[0].timestamp;
                let slot = |idx: usize| {
                    (measurements[idx].timestamp - t0).num_milliseconds() / window_ms
                };
                let current = slot(start);
                let mut end = start + 1;
                while end < measurements.len() && slot(end) == current {
                    end += 1;
                }
                end
            }
            GroupingPolicy::ByKey(extract) => {
                let key = extract(&measurements[start]);
                let mut end = start + 1;
                while end < measurements.len() && extract(&measurements[end]) == key {
                    end += 1;
                }
                end
            }
        }
    }

    fn run_key(&self, measurements: &[Measurement], start: usize) -> Option<String> {
        match &self.policy {
            GroupingPolicy::FixedSize(_) => None,
            GroupingPolicy::TimeWindow(w) => {
                let window_ms = w.num_milliseconds();
                let t0 = measurements[0].timestamp;
                let slot = (measurements[start].timestamp - t0).num_milliseconds() / window_ms;
                let window_start = t0 + Duration::milliseconds(slot * window_ms);
                Some(window_start.to_rfc3339())
            }
            GroupingPolicy::ByKey(extract) => Some(extract(&measurements[start])),
        }
    }
}

/// Lazy subgroup iterator returned by [`SubgroupBuilder::subgroups`]
pub struct SubgroupIter<'a> {
    builder: &'a SubgroupBuilder,
    measurements: &'a [Measurement],
    pos: usize,
    next_number: usize,
}

impl Iterator for SubgroupIter<'_> {
    type Item = Subgroup;

    fn next(&mut self) -> Option<Subgroup> {
        loop {
            if self.pos >= self.measurements.len() {
                return None;
            }

            let start = self.pos;
            let end = self.builder.run_end(self.measurements, start);
            self.pos = end;

            let run = &self.measurements[start..end];
            if run.len() < 2 && self.builder.incomplete_policy == IncompletePolicy::Drop {
                continue;
            }

            let key = self.builder.run_key(self.measurements, start);
            let subgroup = Subgroup::from_run(self.next_number, key, run);
            self.next_number += 1;
            return Some(subgroup);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn measurements(values: &[f64]) -> Vec<Measurement> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let ts = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap()
                    + Duration::minutes(i as i64);
                Measurement::new("ph", v, ts)
            })
            .collect()
    }

    #[test]
    fn test_fixed_size_grouping() {
        let data = measurements(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let builder = SubgroupBuilder::new(GroupingPolicy::FixedSize(3));
        let groups = builder.build(&data).unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].values, vec![1.0, 2.0, 3.0]);
        assert_eq!(groups[0].number, 1);
        assert!((groups[0].mean - 2.0).abs() < 1e-12);
        assert!((groups[0].range - 2.0).abs() < 1e-12);
        assert_eq!(groups[1].number, 2);
        assert!(groups.iter().all(|g| g.complete));
    }

    #[test]
    fn test_fixed_size_trailing_remainder_is_incomplete() {
        let data = measurements(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let builder = SubgroupBuilder::new(GroupingPolicy::FixedSize(2));
        let groups = builder.build(&data).unwrap();

        assert_eq!(groups.len(), 3);
        assert!(!groups[2].complete);
        assert_eq!(groups[2].count, 1);
        // A single point never gets a synthetic std dev
        assert!(groups[2].std_dev.is_none());
        assert_eq!(groups[2].range, 0.0);
    }

    #[test]
    fn test_drop_policy_skips_incomplete() {
        let data = measurements(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let builder = SubgroupBuilder::new(GroupingPolicy::FixedSize(2))
            .with_incomplete_policy(IncompletePolicy::Drop);
        let groups = builder.build(&data).unwrap();

        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|g| g.complete));
    }

    #[test]
    fn test_from_settings_honors_incomplete_policy() {
        let data = measurements(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let settings = SpcSettings::with_defaults()
            .with_incomplete_policy(IncompletePolicy::Drop);
        let groups = SubgroupBuilder::from_settings(GroupingPolicy::FixedSize(2), &settings)
            .build(&data)
            .unwrap();

        // The trailing size-1 subgroup is dropped, not flagged
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|g| g.complete));

        let settings = SpcSettings::with_defaults();
        let groups = SubgroupBuilder::from_settings(GroupingPolicy::FixedSize(2), &settings)
            .build(&data)
            .unwrap();
        assert_eq!(groups.len(), 3);
        assert!(!groups[2].complete);
    }

    #[test]
    fn test_zero_size_rejected() {
        let data = measurements(&[1.0, 2.0]);
        let builder = SubgroupBuilder::new(GroupingPolicy::FixedSize(0));
        let err = builder.build(&data).unwrap_err();
        assert!(matches!(err, SpcError::InvalidGrouping { .. }));
    }

    #[test]
    fn test_time_window_grouping() {
        // One measurement per minute; 5-minute windows -> groups of 5
        let data = measurements(&[1.0; 12]);
        let builder = SubgroupBuilder::new(GroupingPolicy::TimeWindow(Duration::minutes(5)));
        let groups = builder.build(&data).unwrap();

        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].count, 5);
        assert_eq!(groups[1].count, 5);
        assert_eq!(groups[2].count, 2);
        assert!(groups[0].key.is_some());
    }

    #[test]
    fn test_time_window_rejects_backwards_timestamps() {
        let mut data = measurements(&[1.0, 2.0, 3.0]);
        data[2].timestamp = data[0].timestamp - Duration::minutes(1);
        let builder = SubgroupBuilder::new(GroupingPolicy::TimeWindow(Duration::minutes(5)));
        let err = builder.build(&data).unwrap_err();
        assert!(matches!(err, SpcError::InvalidGrouping { .. }));
        assert!(err.to_string().contains("monotonically"));
    }

    #[test]
    fn test_by_key_grouping() {
        let mut data = measurements(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        data[0].batch = Some("A".to_string());
        data[1].batch = Some("A".to_string());
        data[2].batch = Some("B".to_string());
        data[3].batch = Some("B".to_string());
        data[4].batch = Some("B".to_string());

        let builder = SubgroupBuilder::new(GroupingPolicy::by_batch());
        let groups = builder.build(&data).unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key.as_deref(), Some("A"));
        assert_eq!(groups[1].key.as_deref(), Some("B"));
        assert_eq!(groups[1].count, 3);
    }

    #[test]
    fn test_iteration_is_restartable() {
        let data = measurements(&[1.0, 2.0, 3.0, 4.0]);
        let builder = SubgroupBuilder::new(GroupingPolicy::FixedSize(2));

        let first: Vec<Subgroup> = builder.subgroups(&data).unwrap().collect();
        let second: Vec<Subgroup> = builder.subgroups(&data).unwrap().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_non_finite_value_rejected() {
        let mut data = measurements(&[1.0, 2.0]);
        data[1].value = f64::NAN;
        let builder = SubgroupBuilder::new(GroupingPolicy::FixedSize(2));
        assert!(builder.build(&data).is_err());
    }

    #[test]
    fn test_subgroup_roundtrip() {
        let data = measurements(&[1.0, 2.0, 3.0]);
        let builder = SubgroupBuilder::new(GroupingPolicy::FixedSize(3));
        let groups = builder.build(&data).unwrap();

        let json = serde_json::to_string(&groups).unwrap();
        let parsed: Vec<Subgroup> = serde_json::from_str(&json).unwrap();
        assert_eq!(groups, parsed);
    }
}

//! Western Electric run-rule detection
//!
//! Evaluates the eight classic rules against a plotted point sequence and
//! its control limits. Rules are evaluated independently: a point may
//! trigger several rules at once and every qualifying window is reported,
//! with no deduplication across overlapping windows. An empty result means
//! the process is in control.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::charts::{ControlLimitSet, PlottedPoint};
use crate::core::{SpcError, SpcSettings};

/// The eight Western Electric rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WesternElectricRule {
    /// One point beyond 3 sigma
    BeyondThreeSigma,
    /// Nine consecutive points on one side of the center line
    NineOnOneSide,
    /// Six consecutive points steadily increasing or decreasing
    SixTrending,
    /// Fourteen consecutive points alternating up and down
    FourteenAlternating,
    /// Two out of three consecutive points beyond 2 sigma, same side
    TwoOfThreeBeyondTwoSigma,
    /// Four out of five consecutive points beyond 1 sigma, same side
    FourOfFiveBeyondOneSigma,
    /// Fifteen consecutive points within 1 sigma of the center line
    FifteenWithinOneSigma,
    /// Eight consecutive points beyond 1 sigma on either side
    EightBeyondOneSigma,
}

impl WesternElectricRule {
    pub const ALL: [WesternElectricRule; 8] = [
        WesternElectricRule::BeyondThreeSigma,
        WesternElectricRule::NineOnOneSide,
        WesternElectricRule::SixTrending,
        WesternElectricRule::FourteenAlternating,
        WesternElectricRule::TwoOfThreeBeyondTwoSigma,
        WesternElectricRule::FourOfFiveBeyondOneSigma,
        WesternElectricRule::FifteenWithinOneSigma,
        WesternElectricRule::EightBeyondOneSigma,
    ];

    /// Conventional rule number, 1..=8
    pub fn id(&self) -> u8 {
        match self {
            WesternElectricRule::BeyondThreeSigma => 1,
            WesternElectricRule::NineOnOneSide => 2,
            WesternElectricRule::SixTrending => 3,
            WesternElectricRule::FourteenAlternating => 4,
            WesternElectricRule::TwoOfThreeBeyondTwoSigma => 5,
            WesternElectricRule::FourOfFiveBeyondOneSigma => 6,
            WesternElectricRule::FifteenWithinOneSigma => 7,
            WesternElectricRule::EightBeyondOneSigma => 8,
        }
    }

    /// Canonical label for reports
    pub fn label(&self) -> &'static str {
        match self {
            WesternElectricRule::BeyondThreeSigma => "Rule 1: One point beyond 3\u{3c3}",
            WesternElectricRule::NineOnOneSide => {
                "Rule 2: Nine consecutive points on one side of center line"
            }
            WesternElectricRule::SixTrending => {
                "Rule 3: Six consecutive points steadily increasing or decreasing"
            }
            WesternElectricRule::FourteenAlternating => {
                "Rule 4: Fourteen consecutive points alternating up and down"
            }
            WesternElectricRule::TwoOfThreeBeyondTwoSigma => {
                "Rule 5: Two out of three consecutive points beyond 2\u{3c3}"
            }
            WesternElectricRule::FourOfFiveBeyondOneSigma => {
                "Rule 6: Four out of five consecutive points beyond 1\u{3c3}"
            }
            WesternElectricRule::FifteenWithinOneSigma => {
                "Rule 7: Fifteen consecutive points within 1\u{3c3}"
            }
            WesternElectricRule::EightBeyondOneSigma => {
                "Rule 8: Eight consecutive points beyond 1\u{3c3}"
            }
        }
    }

    /// Default severity assigned to a violation of this rule
    pub fn severity(&self) -> Severity {
        match self {
            WesternElectricRule::BeyondThreeSigma => Severity::Critical,
            WesternElectricRule::NineOnOneSide => Severity::High,
            WesternElectricRule::TwoOfThreeBeyondTwoSigma => Severity::High,
            WesternElectricRule::SixTrending => Severity::Medium,
            WesternElectricRule::FourteenAlternating => Severity::Medium,
            WesternElectricRule::FourOfFiveBeyondOneSigma => Severity::Medium,
            WesternElectricRule::EightBeyondOneSigma => Severity::Medium,
            WesternElectricRule::FifteenWithinOneSigma => Severity::Low,
        }
    }
}

impl std::fmt::Display for WesternElectricRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Violation severity for escalation and filtering
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "Low"),
            Severity::Medium => write!(f, "Medium"),
            Severity::High => write!(f, "High"),
            Severity::Critical => write!(f, "Critical"),
        }
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            _ => Err(format!("Invalid severity: {}", s)),
        }
    }
}

/// One detected rule violation over an index span
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Rule that fired
    pub rule: WesternElectricRule,
    /// First point index of the qualifying window (inclusive)
    pub start: usize,
    /// Last point index of the qualifying window (inclusive)
    pub end: usize,
    /// Severity assigned to the violation
    pub severity: Severity,
    /// Human-readable description of the signal
    pub description: String,
}

/// Detects Western Electric rule violations against a limit set
///
/// Sigma zones derive from (UCL - CL) / 3, which requires the limits to be
/// symmetric about the center line within the configured tolerance.
#[derive(Debug, Clone)]
pub struct RuleDetector {
    limits: ControlLimitSet,
    rules: Vec<WesternElectricRule>,
}

impl RuleDetector {
    /// Create a detector evaluating all eight rules
    ///
    /// # Errors
    ///
    /// [`SpcError::InvalidLimits`] when UCL and LCL are asymmetric about
    /// the center line beyond `settings.limit_symmetry_tolerance`.
    pub fn new(limits: ControlLimitSet, settings: &SpcSettings) -> Result<Self, SpcError> {
        let upper = limits.ucl - limits.center_line;
        let lower = limits.center_line - limits.lcl;
        let scale = upper.abs().max(lower.abs()).max(1.0);
        if (upper - lower).abs() > settings.limit_symmetry_tolerance * scale {
            return Err(SpcError::InvalidLimits {
                parameter: limits.parameter.clone(),
                message: format!(
                    "sigma zones need limits symmetric about the center line, got +{} / -{}",
                    upper, lower
                ),
            });
        }
        Ok(Self {
            limits,
            rules: WesternElectricRule::ALL.to_vec(),
        })
    }

    /// Restrict detection to a subset of rules
    pub fn with_rules(mut self, rules: &[WesternElectricRule]) -> Self {
        self.rules = rules.to_vec();
        self
    }

    /// Evaluate the point sequence and return all violations, ordered by
    /// start index then rule number
    ///
    /// Every rule is a fixed-width window check; each window that satisfies
    /// a rule yields its own `Violation`, with no deduplication across
    /// overlapping windows. Spans use the points' own `index` values, so a
    /// windowed tail of a longer sequence reports positions in the original
    /// sequence.
    pub fn detect(&self, points: &[PlottedPoint]) -> Vec<Violation> {
        let mut violations = Vec::new();
        for rule in &self.rules {
            match rule {
                WesternElectricRule::BeyondThreeSigma => {
                    self.check_beyond_three_sigma(points, &mut violations)
                }
                WesternElectricRule::NineOnOneSide => {
                    self.check_nine_on_one_side(points, &mut violations)
                }
                WesternElectricRule::SixTrending => {
                    self.check_six_trending(points, &mut violations)
                }
                WesternElectricRule::FourteenAlternating => {
                    self.check_fourteen_alternating(points, &mut violations)
                }
                WesternElectricRule::TwoOfThreeBeyondTwoSigma => self.check_k_of_n_beyond(
                    points,
                    WesternElectricRule::TwoOfThreeBeyondTwoSigma,
                    3,
                    2,
                    2.0,
                    &mut violations,
                ),
                WesternElectricRule::FourOfFiveBeyondOneSigma => self.check_k_of_n_beyond(
                    points,
                    WesternElectricRule::FourOfFiveBeyondOneSigma,
                    5,
                    4,
                    1.0,
                    &mut violations,
                ),
                WesternElectricRule::FifteenWithinOneSigma => {
                    self.check_fifteen_within_one_sigma(points, &mut violations)
                }
                WesternElectricRule::EightBeyondOneSigma => {
                    self.check_eight_beyond_one_sigma(points, &mut violations)
                }
            }
        }
        violations.sort_by(|a, b| a.start.cmp(&b.start).then(a.rule.id().cmp(&b.rule.id())));
        violations
    }

    fn sigma(&self) -> f64 {
        self.limits.sigma()
    }

    fn push(
        &self,
        violations: &mut Vec<Violation>,
        rule: WesternElectricRule,
        start: usize,
        end: usize,
        detail: String,
    ) {
        violations.push(Violation {
            rule,
            start,
            end,
            severity: rule.severity(),
            description: format!("{} ({})", rule.label(), detail),
        });
    }

    /// Rule 1: any single point outside UCL/LCL
    fn check_beyond_three_sigma(&self, points: &[PlottedPoint], violations: &mut Vec<Violation>) {
        for p in points {
            if p.value > self.limits.ucl || p.value < self.limits.lcl {
                self.push(
                    violations,
                    WesternElectricRule::BeyondThreeSigma,
                    p.index,
                    p.index,
                    format!("point {} at {}", p.index, p.value),
                );
            }
        }
    }

    /// Rule 2: 9 consecutive points strictly on one side of the center line
    fn check_nine_on_one_side(&self, points: &[PlottedPoint], violations: &mut Vec<Violation>) {
        const N: usize = 9;
        let cl = self.limits.center_line;
        for window in points.windows(N) {
            let qualifying = if window.iter().all(|p| p.value > cl) {
                Some("above")
            } else if window.iter().all(|p| p.value < cl) {
                Some("below")
            } else {
                None
            };
            if let Some(label) = qualifying {
                self.push(
                    violations,
                    WesternElectricRule::NineOnOneSide,
                    window[0].index,
                    window[N - 1].index,
                    format!("{} points {} center line", N, label),
                );
            }
        }
    }

    /// Rule 3: 6 consecutive points strictly increasing or decreasing
    fn check_six_trending(&self, points: &[PlottedPoint], violations: &mut Vec<Violation>) {
        const N: usize = 6;
        for window in points.windows(N) {
            let qualifying = if window.windows(2).all(|w| w[1].value > w[0].value) {
                Some("increasing")
            } else if window.windows(2).all(|w| w[1].value < w[0].value) {
                Some("decreasing")
            } else {
                None
            };
            if let Some(label) = qualifying {
                self.push(
                    violations,
                    WesternElectricRule::SixTrending,
                    window[0].index,
                    window[N - 1].index,
                    format!("{} points steadily {}", N, label),
                );
            }
        }
    }

    /// Rule 4: 14 consecutive points alternating up and down
    fn check_fourteen_alternating(&self, points: &[PlottedPoint], violations: &mut Vec<Violation>) {
        const N: usize = 14;
        for window in points.windows(N) {
            let deltas: Vec<f64> = window
                .windows(2)
                .map(|w| (w[1].value - w[0].value).signum())
                .collect();
            let alternating = deltas[0] != 0.0
                && deltas.windows(2).all(|d| d[0] != 0.0 && d[1] == -d[0]);
            if alternating {
                self.push(
                    violations,
                    WesternElectricRule::FourteenAlternating,
                    window[0].index,
                    window[N - 1].index,
                    format!("{} points alternating up and down", N),
                );
            }
        }
    }

    /// Rules 5 and 6: k of n consecutive points beyond the given sigma
    /// multiple, all on the same side
    fn check_k_of_n_beyond(
        &self,
        points: &[PlottedPoint],
        rule: WesternElectricRule,
        n: usize,
        k: usize,
        sigma_multiple: f64,
        violations: &mut Vec<Violation>,
    ) {
        if points.len() < n {
            return;
        }
        let (lower, upper) = self.limits.zone(sigma_multiple);
        for window in points.windows(n) {
            let above = window.iter().filter(|p| p.value > upper).count();
            let below = window.iter().filter(|p| p.value < lower).count();
            if above >= k || below >= k {
                let (count, label) = if above >= k {
                    (above, "above")
                } else {
                    (below, "below")
                };
                self.push(
                    violations,
                    rule,
                    window[0].index,
                    window[n - 1].index,
                    format!(
                        "{} of {} points beyond {}\u{3c3} {}",
                        count, n, sigma_multiple, label
                    ),
                );
            }
        }
    }

    /// Rule 7: 15 consecutive points within 1 sigma of the center line
    /// (either side)
    fn check_fifteen_within_one_sigma(
        &self,
        points: &[PlottedPoint],
        violations: &mut Vec<Violation>,
    ) {
        const N: usize = 15;
        let (lower, upper) = self.limits.zone(1.0);
        for window in points.windows(N) {
            if window.iter().all(|p| p.value >= lower && p.value <= upper) {
                self.push(
                    violations,
                    WesternElectricRule::FifteenWithinOneSigma,
                    window[0].index,
                    window[N - 1].index,
                    format!("{} points within 1\u{3c3} of center line", N),
                );
            }
        }
    }

    /// Rule 8: 8 consecutive points beyond 1 sigma on either side, none
    /// within 1 sigma
    fn check_eight_beyond_one_sigma(
        &self,
        points: &[PlottedPoint],
        violations: &mut Vec<Violation>,
    ) {
        const N: usize = 8;
        let (lower, upper) = self.limits.zone(1.0);
        for window in points.windows(N) {
            if window.iter().all(|p| p.value > upper || p.value < lower) {
                self.push(
                    violations,
                    WesternElectricRule::EightBeyondOneSigma,
                    window[0].index,
                    window[N - 1].index,
                    format!("{} points beyond 1\u{3c3} of center line", N),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{ChartType, LimitMethod};

    fn limits() -> ControlLimitSet {
        // CL = 10, sigma = 1
        ControlLimitSet::new("ph", ChartType::XBarR, 10.0, 13.0, 7.0, LimitMethod::Theoretical)
            .unwrap()
    }

    fn detector() -> RuleDetector {
        RuleDetector::new(limits(), &SpcSettings::with_defaults()).unwrap()
    }

    fn points(values: &[f64]) -> Vec<PlottedPoint> {
        values
            .iter()
            .enumerate()
            .map(|(index, &value)| PlottedPoint { index, value })
            .collect()
    }

    fn only(detector: &RuleDetector, rule: WesternElectricRule) -> RuleDetector {
        detector.clone().with_rules(&[rule])
    }

    #[test]
    fn test_asymmetric_limits_rejected() {
        let asymmetric =
            ControlLimitSet::new("ph", ChartType::XBarR, 10.0, 13.0, 8.0, LimitMethod::Theoretical)
                .unwrap();
        let err = RuleDetector::new(asymmetric, &SpcSettings::with_defaults()).unwrap_err();
        assert!(matches!(err, SpcError::InvalidLimits { .. }));
    }

    #[test]
    fn test_in_control_sequence_is_clean() {
        let values = [9.8, 10.3, 9.5, 10.6, 10.0, 9.4, 10.5, 9.9];
        assert!(detector().detect(&points(&values)).is_empty());
    }

    /// One value beyond the UCL produces exactly one Rule 1 violation at
    /// that index.
    #[test]
    fn test_rule1_single_point_beyond_ucl() {
        let d = only(&detector(), WesternElectricRule::BeyondThreeSigma);
        let values = [10.0, 9.5, 13.5, 10.2, 9.8];
        let violations = d.detect(&points(&values));

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule, WesternElectricRule::BeyondThreeSigma);
        assert_eq!(violations[0].start, 2);
        assert_eq!(violations[0].end, 2);
        assert_eq!(violations[0].severity, Severity::Critical);
    }

    #[test]
    fn test_rule1_point_on_limit_does_not_fire() {
        let d = only(&detector(), WesternElectricRule::BeyondThreeSigma);
        assert!(d.detect(&points(&[13.0, 7.0, 10.0])).is_empty());
    }

    /// Nine consecutive points above the center line trigger exactly one
    /// Rule 2 violation spanning indices 0-8.
    #[test]
    fn test_rule2_nine_above_center() {
        let d = only(&detector(), WesternElectricRule::NineOnOneSide);
        let violations = d.detect(&points(&[11.0; 9]));

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule, WesternElectricRule::NineOnOneSide);
        assert_eq!(violations[0].start, 0);
        assert_eq!(violations[0].end, 8);
    }

    /// A run longer than nine reports every qualifying window separately,
    /// with no deduplication across overlaps.
    #[test]
    fn test_rule2_ten_point_run_reports_each_window() {
        let d = only(&detector(), WesternElectricRule::NineOnOneSide);
        let violations = d.detect(&points(&[11.0; 10]));

        assert_eq!(violations.len(), 2);
        assert_eq!((violations[0].start, violations[0].end), (0, 8));
        assert_eq!((violations[1].start, violations[1].end), (1, 9));
    }

    #[test]
    fn test_rule2_run_broken_by_center_crossing() {
        let d = only(&detector(), WesternElectricRule::NineOnOneSide);
        let mut values = vec![11.0; 8];
        values.push(9.0);
        values.extend(vec![11.0; 8]);
        assert!(d.detect(&points(&values)).is_empty());
    }

    #[test]
    fn test_rule3_six_increasing() {
        let d = only(&detector(), WesternElectricRule::SixTrending);
        let values = [9.0, 9.2, 9.4, 9.6, 9.8, 10.0, 9.1];
        let violations = d.detect(&points(&values));

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].start, 0);
        assert_eq!(violations[0].end, 5);
        assert_eq!(violations[0].severity, Severity::Medium);
    }

    #[test]
    fn test_rule3_seven_point_trend_reports_each_window() {
        let d = only(&detector(), WesternElectricRule::SixTrending);
        let values = [9.0, 9.2, 9.4, 9.6, 9.8, 10.0, 10.2];
        let violations = d.detect(&points(&values));

        assert_eq!(violations.len(), 2);
        assert_eq!((violations[0].start, violations[0].end), (0, 5));
        assert_eq!((violations[1].start, violations[1].end), (1, 6));
    }

    #[test]
    fn test_rule3_equal_neighbors_break_trend() {
        let d = only(&detector(), WesternElectricRule::SixTrending);
        let values = [9.0, 9.2, 9.2, 9.4, 9.6, 9.8, 10.0];
        assert!(d.detect(&points(&values)).is_empty());
    }

    #[test]
    fn test_rule4_fourteen_alternating() {
        let d = only(&detector(), WesternElectricRule::FourteenAlternating);
        let values: Vec<f64> = (0..14)
            .map(|i| if i % 2 == 0 { 9.5 } else { 10.5 })
            .collect();
        let violations = d.detect(&points(&values));

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].start, 0);
        assert_eq!(violations[0].end, 13);
    }

    #[test]
    fn test_rule4_fifteen_alternating_reports_each_window() {
        let d = only(&detector(), WesternElectricRule::FourteenAlternating);
        let values: Vec<f64> = (0..15)
            .map(|i| if i % 2 == 0 { 9.5 } else { 10.5 })
            .collect();
        let violations = d.detect(&points(&values));

        assert_eq!(violations.len(), 2);
        assert_eq!((violations[0].start, violations[0].end), (0, 13));
        assert_eq!((violations[1].start, violations[1].end), (1, 14));
    }

    #[test]
    fn test_rule5_two_of_three_beyond_two_sigma() {
        let d = only(&detector(), WesternElectricRule::TwoOfThreeBeyondTwoSigma);
        // Points at 12.5 are beyond 2 sigma (zone boundary 12.0)
        let values = [10.0, 12.5, 12.5, 10.0, 10.0];
        let violations = d.detect(&points(&values));

        // Windows [0..3), [1..4), [2..5) - the first two qualify
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].start, 0);
        assert_eq!(violations[1].start, 1);
        assert!(violations.iter().all(|v| v.severity == Severity::High));
    }

    #[test]
    fn test_rule5_opposite_sides_do_not_combine() {
        let d = only(&detector(), WesternElectricRule::TwoOfThreeBeyondTwoSigma);
        let values = [12.5, 7.5, 10.0, 10.0, 10.0];
        assert!(d.detect(&points(&values)).is_empty());
    }

    #[test]
    fn test_rule6_four_of_five_beyond_one_sigma() {
        let d = only(&detector(), WesternElectricRule::FourOfFiveBeyondOneSigma);
        // 11.5 is beyond 1 sigma (zone boundary 11.0)
        let values = [11.5, 11.5, 10.0, 11.5, 11.5];
        let violations = d.detect(&points(&values));

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].start, 0);
        assert_eq!(violations[0].end, 4);
    }

    #[test]
    fn test_rule7_fifteen_within_one_sigma() {
        let d = only(&detector(), WesternElectricRule::FifteenWithinOneSigma);
        let values: Vec<f64> = (0..15)
            .map(|i| 10.0 + if i % 2 == 0 { 0.3 } else { -0.3 })
            .collect();
        let violations = d.detect(&points(&values));

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].severity, Severity::Low);
        assert_eq!(violations[0].end, 14);
    }

    #[test]
    fn test_rule8_eight_beyond_one_sigma_mixed_sides() {
        let d = only(&detector(), WesternElectricRule::EightBeyondOneSigma);
        // Alternating beyond 1 sigma on both sides, none within
        let values = [11.5, 8.5, 11.5, 8.5, 11.5, 8.5, 11.5, 8.5];
        let violations = d.detect(&points(&values));

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule, WesternElectricRule::EightBeyondOneSigma);
    }

    #[test]
    fn test_rules_fire_independently() {
        // 14.0 is beyond 3 sigma AND part of a 9-point run above center
        let mut values = vec![11.0; 8];
        values.push(14.0);
        let violations = detector().detect(&points(&values));

        let rules: Vec<WesternElectricRule> = violations.iter().map(|v| v.rule).collect();
        assert!(rules.contains(&WesternElectricRule::BeyondThreeSigma));
        assert!(rules.contains(&WesternElectricRule::NineOnOneSide));
    }

    #[test]
    fn test_violations_sorted_by_start_then_rule() {
        let mut values = vec![11.0; 8];
        values.push(14.0);
        let violations = detector().detect(&points(&values));

        for pair in violations.windows(2) {
            assert!(
                pair[0].start < pair[1].start
                    || (pair[0].start == pair[1].start
                        && pair[0].rule.id() <= pair[1].rule.id())
            );
        }
    }

    #[test]
    fn test_empty_sequence() {
        assert!(detector().detect(&[]).is_empty());
    }

    /// A windowed tail of a longer sequence reports spans in the original
    /// sequence's positions, via each point's own index.
    #[test]
    fn test_spans_follow_point_indices() {
        let d = detector().with_rules(&[
            WesternElectricRule::BeyondThreeSigma,
            WesternElectricRule::NineOnOneSide,
        ]);
        let tail: Vec<PlottedPoint> = (0..9)
            .map(|i| PlottedPoint {
                index: 100 + i,
                value: if i == 4 { 14.0 } else { 11.0 },
            })
            .collect();
        let violations = d.detect(&tail);

        let rule1 = violations
            .iter()
            .find(|v| v.rule == WesternElectricRule::BeyondThreeSigma)
            .unwrap();
        assert_eq!((rule1.start, rule1.end), (104, 104));

        let rule2 = violations
            .iter()
            .find(|v| v.rule == WesternElectricRule::NineOnOneSide)
            .unwrap();
        assert_eq!((rule2.start, rule2.end), (100, 108));
    }

    #[test]
    fn test_rule_labels() {
        assert_eq!(
            WesternElectricRule::BeyondThreeSigma.label(),
            "Rule 1: One point beyond 3\u{3c3}"
        );
        assert_eq!(WesternElectricRule::EightBeyondOneSigma.id(), 8);
    }

    #[test]
    fn test_severity_ordering_and_parse() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert_eq!("critical".parse::<Severity>().unwrap(), Severity::Critical);
        assert_eq!(Severity::Medium.to_string(), "Medium");
        assert!("urgent".parse::<Severity>().is_err());
    }

    #[test]
    fn test_violation_roundtrip() {
        let violations = only(&detector(), WesternElectricRule::BeyondThreeSigma)
            .detect(&points(&[14.0]));
        let json = serde_json::to_string(&violations).unwrap();
        let parsed: Vec<Violation> = serde_json::from_str(&json).unwrap();
        assert_eq!(violations, parsed);
    }
}

//! Time-weighted control charts
//!
//! Tabular two-sided CUSUM and EWMA. Both are sequential by nature, so the
//! running state is an explicit caller-owned accumulator struct rather than
//! hidden chart state; independent parameter streams can each carry their
//! own state and be processed in parallel.

use serde::{Deserialize, Serialize};

use crate::core::SpcError;

use super::{ChartType, ControlLimitSet, LimitMethod};

/// Tabular CUSUM chart parameters
///
/// `k` is the reference value (allowance) and `h` the decision interval,
/// both in sigma units. The common defaults k = 0.5, h = 5 detect a
/// one-sigma shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CusumChart {
    /// Parameter the chart monitors
    pub parameter: String,
    /// Target (in-control mean)
    pub target: f64,
    /// Process standard deviation
    pub sigma: f64,
    /// Reference value in sigma units
    pub k: f64,
    /// Decision interval in sigma units
    pub h: f64,
}

/// Caller-owned CUSUM accumulator
///
/// Starts at zero; feed it back into [`CusumChart::step`] for each new
/// observation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CusumState {
    /// Upper cumulative sum, detects upward shifts
    pub s_upper: f64,
    /// Lower cumulative sum, detects downward shifts
    pub s_lower: f64,
    /// Number of observations accumulated
    pub index: usize,
}

/// One evaluated CUSUM observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CusumPoint {
    /// 0-based observation position
    pub index: usize,
    /// Upper cumulative sum after this observation
    pub s_upper: f64,
    /// Lower cumulative sum after this observation
    pub s_lower: f64,
    /// Whether either sum exceeds the decision interval
    pub signal: bool,
}

impl CusumChart {
    /// Create a CUSUM chart with the conventional k = 0.5, h = 5
    pub fn new(parameter: impl Into<String>, target: f64, sigma: f64) -> Result<Self, SpcError> {
        Self::with_design(parameter, target, sigma, 0.5, 5.0)
    }

    /// Create a CUSUM chart with an explicit reference value and decision
    /// interval
    ///
    /// # Errors
    ///
    /// [`SpcError::ZeroVariance`] for a non-positive sigma,
    /// [`SpcError::InvalidLimits`] for non-positive k or h.
    pub fn with_design(
        parameter: impl Into<String>,
        target: f64,
        sigma: f64,
        k: f64,
        h: f64,
    ) -> Result<Self, SpcError> {
        let parameter = parameter.into();
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(SpcError::ZeroVariance { parameter });
        }
        if !k.is_finite() || k <= 0.0 || !h.is_finite() || h <= 0.0 {
            return Err(SpcError::InvalidLimits {
                parameter,
                message: format!("k and h must be positive, got k={}, h={}", k, h),
            });
        }
        Ok(Self {
            parameter,
            target,
            sigma,
            k,
            h,
        })
    }

    /// Fold one observation into the state, returning the new state and
    /// the evaluated point
    ///
    /// S+ = max(0, S+ + z - k), S- = max(0, S- - z - k) with
    /// z = (x - target) / sigma.
    pub fn step(&self, state: CusumState, value: f64) -> (CusumState, CusumPoint) {
        let z = (value - self.target) / self.sigma;
        let s_upper = (state.s_upper + z - self.k).max(0.0);
        let s_lower = (state.s_lower - z - self.k).max(0.0);
        let next = CusumState {
            s_upper,
            s_lower,
            index: state.index + 1,
        };
        let point = CusumPoint {
            index: state.index,
            s_upper,
            s_lower,
            signal: s_upper > self.h || s_lower > self.h,
        };
        (next, point)
    }

    /// Evaluate a whole series from the given starting state
    pub fn analyze(&self, state: CusumState, values: &[f64]) -> (CusumState, Vec<CusumPoint>) {
        let mut state = state;
        let mut points = Vec::with_capacity(values.len());
        for &value in values {
            let (next, point) = self.step(state, value);
            state = next;
            points.push(point);
        }
        (state, points)
    }

    /// Decision-interval limits for plotting: CL = 0, UCL = h, LCL = -h
    ///
    /// The lower sum is conventionally plotted negated against -h.
    pub fn limits(&self) -> Result<ControlLimitSet, SpcError> {
        ControlLimitSet::new(
            self.parameter.clone(),
            ChartType::Cusum,
            0.0,
            self.h,
            -self.h,
            LimitMethod::Theoretical,
        )
    }
}

/// EWMA chart parameters
///
/// `lambda` is the smoothing constant in (0, 1], `l` the limit width in
/// sigma units. The common defaults lambda = 0.2, L = 3.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EwmaChart {
    /// Parameter the chart monitors
    pub parameter: String,
    /// Target (in-control mean)
    pub target: f64,
    /// Process standard deviation
    pub sigma: f64,
    /// Smoothing constant
    pub lambda: f64,
    /// Limit width in sigma units
    pub l: f64,
}

/// Caller-owned EWMA accumulator
///
/// `z` starts at the target; feed it back into [`EwmaChart::step`] for
/// each new observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EwmaState {
    /// Current smoothed value
    pub z: f64,
    /// Number of observations accumulated
    pub index: usize,
}

/// One evaluated EWMA observation with its time-varying limits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EwmaPoint {
    /// 0-based observation position
    pub index: usize,
    /// Smoothed value after this observation
    pub z: f64,
    /// Upper limit at this position (widens toward the asymptote)
    pub ucl: f64,
    /// Lower limit at this position
    pub lcl: f64,
    /// Whether the smoothed value falls outside the limits
    pub signal: bool,
}

impl EwmaChart {
    /// Create an EWMA chart with the conventional lambda = 0.2, L = 3
    pub fn new(parameter: impl Into<String>, target: f64, sigma: f64) -> Result<Self, SpcError> {
        Self::with_design(parameter, target, sigma, 0.2, 3.0)
    }

    /// Create an EWMA chart with an explicit smoothing constant and width
    ///
    /// # Errors
    ///
    /// [`SpcError::ZeroVariance`] for a non-positive sigma,
    /// [`SpcError::InvalidLimits`] for lambda outside (0, 1] or a
    /// non-positive width.
    pub fn with_design(
        parameter: impl Into<String>,
        target: f64,
        sigma: f64,
        lambda: f64,
        l: f64,
    ) -> Result<Self, SpcError> {
        let parameter = parameter.into();
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(SpcError::ZeroVariance { parameter });
        }
        if !lambda.is_finite() || lambda <= 0.0 || lambda > 1.0 {
            return Err(SpcError::InvalidLimits {
                parameter,
                message: format!("lambda must be in (0, 1], got {}", lambda),
            });
        }
        if !l.is_finite() || l <= 0.0 {
            return Err(SpcError::InvalidLimits {
                parameter,
                message: format!("limit width must be positive, got {}", l),
            });
        }
        Ok(Self {
            parameter,
            target,
            sigma,
            lambda,
            l,
        })
    }

    /// Initial state for this chart: z anchored at the target
    pub fn initial_state(&self) -> EwmaState {
        EwmaState {
            z: self.target,
            index: 0,
        }
    }

    /// Fold one observation into the state, returning the new state and
    /// the evaluated point
    ///
    /// z_i = lambda x_i + (1 - lambda) z_{i-1}; the limits at position i
    /// use the exact variance factor sqrt(lambda / (2 - lambda)
    /// (1 - (1 - lambda)^{2(i+1)})).
    pub fn step(&self, state: EwmaState, value: f64) -> (EwmaState, EwmaPoint) {
        let z = self.lambda * value + (1.0 - self.lambda) * state.z;
        let i = state.index + 1;
        let factor = (self.lambda / (2.0 - self.lambda)
            * (1.0 - (1.0 - self.lambda).powi(2 * i as i32)))
        .sqrt();
        let half_width = self.l * self.sigma * factor;
        let ucl = self.target + half_width;
        let lcl = self.target - half_width;
        let next = EwmaState { z, index: i };
        let point = EwmaPoint {
            index: state.index,
            z,
            ucl,
            lcl,
            signal: z > ucl || z < lcl,
        };
        (next, point)
    }

    /// Evaluate a whole series from the given starting state
    pub fn analyze(&self, state: EwmaState, values: &[f64]) -> (EwmaState, Vec<EwmaPoint>) {
        let mut state = state;
        let mut points = Vec::with_capacity(values.len());
        for &value in values {
            let (next, point) = self.step(state, value);
            state = next;
            points.push(point);
        }
        (state, points)
    }

    /// Asymptotic (steady-state) limits: target +/- L sigma
    /// sqrt(lambda / (2 - lambda))
    pub fn limits(&self) -> Result<ControlLimitSet, SpcError> {
        let half_width = self.l * self.sigma * (self.lambda / (2.0 - self.lambda)).sqrt();
        ControlLimitSet::new(
            self.parameter.clone(),
            ChartType::Ewma,
            self.target,
            self.target + half_width,
            self.target - half_width,
            LimitMethod::Theoretical,
        )
    }
}

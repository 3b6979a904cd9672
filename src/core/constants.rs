//! Control chart constant tables (ASTM E2587), indexed by subgroup size
//!
//! Tables cover subgroup sizes n = 2..=25. Index 0 corresponds to n = 2.

/// Smallest subgroup size with tabulated factors
pub const MIN_SUBGROUP_SIZE: usize = 2;

/// Largest subgroup size with tabulated factors
pub const MAX_SUBGROUP_SIZE: usize = 25;

/// A2 factors for the X-bar chart: UCL/LCL = grand mean +/- A2 * R-bar
const A2: [f64; 24] = [
    1.880, 1.023, 0.729, 0.577, 0.483, 0.419, 0.373, 0.337, 0.308, 0.285, 0.266, 0.249, 0.235,
    0.223, 0.212, 0.203, 0.194, 0.187, 0.180, 0.173, 0.167, 0.162, 0.157, 0.153,
];

/// d2 factors (mean of the range distribution): sigma-hat = R-bar / d2
const D2: [f64; 24] = [
    1.128, 1.693, 2.059, 2.326, 2.534, 2.704, 2.847, 2.970, 3.078, 3.173, 3.258, 3.336, 3.407,
    3.472, 3.532, 3.588, 3.640, 3.689, 3.735, 3.778, 3.819, 3.858, 3.895, 3.931,
];

/// D3 factors for the R chart lower limit: LCL_R = D3 * R-bar
const D3: [f64; 24] = [
    0.0, 0.0, 0.0, 0.0, 0.0, 0.076, 0.136, 0.184, 0.223, 0.256, 0.283, 0.307, 0.328, 0.347,
    0.363, 0.378, 0.391, 0.403, 0.415, 0.425, 0.434, 0.443, 0.451, 0.459,
];

/// D4 factors for the R chart upper limit: UCL_R = D4 * R-bar
const D4: [f64; 24] = [
    3.267, 2.575, 2.282, 2.114, 2.004, 1.924, 1.864, 1.816, 1.777, 1.744, 1.717, 1.693, 1.672,
    1.653, 1.637, 1.622, 1.608, 1.597, 1.585, 1.575, 1.566, 1.557, 1.548, 1.541,
];

/// E2 factor for the Individual chart: UCL/LCL = X-bar +/- E2 * MR-bar
///
/// E2 = 3 / d2(n=2) = 3 / 1.128
pub const E2: f64 = 2.660;

/// D4 factor for the moving range chart (moving ranges span n = 2)
pub const D4_MR: f64 = 3.267;

fn lookup(table: &[f64; 24], n: usize) -> Option<f64> {
    if (MIN_SUBGROUP_SIZE..=MAX_SUBGROUP_SIZE).contains(&n) {
        Some(table[n - MIN_SUBGROUP_SIZE])
    } else {
        None
    }
}

/// A2 factor for subgroup size `n`, or `None` outside 2..=25
pub fn a2(n: usize) -> Option<f64> {
    lookup(&A2, n)
}

/// d2 factor for subgroup size `n`, or `None` outside 2..=25
pub fn d2(n: usize) -> Option<f64> {
    lookup(&D2, n)
}

/// D3 factor for subgroup size `n`, or `None` outside 2..=25
pub fn d3(n: usize) -> Option<f64> {
    lookup(&D3, n)
}

/// D4 factor for subgroup size `n`, or `None` outside 2..=25
pub fn d4(n: usize) -> Option<f64> {
    lookup(&D4, n)
}

//! Measurement intake and rational subgrouping
//!
//! Raw measurements enter here and leave as ordered subgroups ready for
//! control limit calculation. Nothing in this module performs I/O.

pub mod measurement;
pub mod subgroup;

pub use measurement::{Measurement, Shift};
pub use subgroup::{GroupingPolicy, Subgroup, SubgroupBuilder, SubgroupIter};

//! SPC Engine: statistical process control calculations
//!
//! A computation-only engine for manufacturing quality monitoring: rational
//! subgrouping of raw measurements, control limit calculation for the common
//! chart types (X-bar/R, Individual-MR, p, np, c, u, CUSUM, EWMA), process
//! capability analysis (Cp/Cpk, Pp/Ppk, sigma level, PPM), and Western
//! Electric run-rule violation detection.
//!
//! The engine has no I/O surface. Callers feed it ordered measurement data
//! and a specification, and consume plain serializable records; persistence
//! and alerting belong to the surrounding application.

pub mod capability;
pub mod charts;
pub mod core;
pub mod rules;
pub mod sampling;

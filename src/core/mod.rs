//! Core module - errors, settings, chart constants, numeric helpers

pub mod constants;
pub mod error;
pub mod settings;
pub mod stats;

pub use error::SpcError;
pub use settings::{IncompletePolicy, SpcSettings};

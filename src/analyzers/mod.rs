//! Objective scoring, feeder comparison and grouped statistics.
//!
//! This module turns normalized rows into a scored table, resolves feeder
//! baselines with the fallback-year search, computes high-school relative
//! performance and reduces scores per (year, school) for presentation.

pub mod aggregate;
pub mod feeders;
pub mod objective;
pub mod relative;
pub mod types;
pub mod utility;

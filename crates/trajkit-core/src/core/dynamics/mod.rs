//! Per-molecule dynamics: center-of-mass reduction and periodic unwrapping.
//!
//! - [`com`] - Collapses each molecule of a labelled frame onto its center of mass
//! - [`unwrap`] - Rebuilds continuous trajectories from wrapped coordinates

pub mod com;
pub mod error;
pub mod unwrap;

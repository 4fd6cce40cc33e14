//! Input/output for frames and tabular results.
//!
//! Trajectory formats are read through the [`traits::FrameSource`] trait; this
//! crate ships an in-memory source that can be snapshotted to JSON. Coordinate
//! series and free-energy tables are exchanged as CSV.

pub mod memory;
pub mod series;
pub mod tables;
pub mod traits;

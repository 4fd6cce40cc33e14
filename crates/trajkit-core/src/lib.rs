//! # trajkit
//!
//! Post-processing of molecular-dynamics trajectories: molecule detection from
//! atomic coordinates, chemical-formula labelling, center-of-mass coarse
//! graining, periodic unwrapping, and pseudo free-energy surfaces.
//!
//! ## Architecture
//!
//! The library is split into three layers:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Frame`, `SimulationBox`),
//!   pure algorithms (connectivity, labelling, center of mass, unwrapping,
//!   histograms) and I/O utilities.
//!
//! - **[`engine`]: The Logic Core.** Configuration, the `Universe` holding the reference
//!   topology, cross-frame identity policies, progress reporting and parallel
//!   per-frame tasks.
//!
//! - **[`workflows`]: The Public API.** Complete procedures such as the
//!   detect → label → reduce → unwrap pipeline.

pub mod core;
pub mod engine;
pub mod workflows;

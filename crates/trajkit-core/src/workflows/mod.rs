//! # Workflows Module
//!
//! High-level entry points that run a complete analysis from a frame source.
//!
//! - **Analysis Workflow** ([`analyze`]) - Molecule detection and labelling on a reference
//!   frame, center-of-mass reduction of the selected frames, and periodic unwrapping.

pub mod analyze;

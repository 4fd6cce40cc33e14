//! # Engine Module
//!
//! Stateful orchestration of the analysis pipeline.
//!
//! ## Overview
//!
//! The engine owns everything that spans more than one frame: the reference
//! topology of a trajectory, the policy that carries molecule identities from
//! frame to frame, the frame selection, and progress reporting. The per-frame
//! algorithms themselves live in [`crate::core`].
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Analysis parameters, frame selections and identity policies
//! - **Topology Context** ([`universe`]) - Reference connectivity and molecule labels
//! - **Progress Monitoring** ([`progress`]) - Phase and task events for front ends
//! - **Error Handling** ([`error`]) - Engine error taxonomy wrapping the core errors

pub mod config;
pub mod error;
pub mod progress;
pub(crate) mod tasks;
pub mod universe;

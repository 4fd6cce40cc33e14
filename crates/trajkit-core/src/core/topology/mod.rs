//! # Topology Module
//!
//! Turns raw atomic coordinates into molecules.
//!
//! ## Overview
//!
//! A molecule is a connected component of the bonding graph, where two atoms
//! are bonded when their minimum-image distance does not exceed the sum of
//! their scaled covalent radii. Once the components are known, each molecule
//! gets a Hill-order chemical formula and a short name.
//!
//! ## Key Components
//!
//! - [`cutoff`] - Uniform or per-species correction factors for the bonding radii
//! - [`connectivity`] - Neighbor search and connected components (molecule IDs)
//! - [`formula`] - Hill-order chemical formulas
//! - [`registry`] - Persistent formula -> name store, keyed by project
//! - [`labeler`] - Per-molecule formulas and names
//! - [`error`] - Topology error taxonomy
//!
//! ## Usage
//!
//! ```ignore
//! use trajkit::core::topology::{connectivity, cutoff::CutoffTable, labeler};
//!
//! let connectivity = connectivity::detect_molecules(&frame, &CutoffTable::Uniform(1.0))?;
//! let labels = labeler::label_molecules(&frame, connectivity.molecule_ids(), None, None)?;
//! ```

pub mod connectivity;
pub mod cutoff;
pub mod error;
pub mod formula;
pub mod labeler;
pub mod registry;

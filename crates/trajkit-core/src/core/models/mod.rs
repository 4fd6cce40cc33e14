//! # Core Models Module
//!
//! Data structures describing trajectory frames as they are handed to the
//! analysis pipeline by an external reader.
//!
//! ## Key Components
//!
//! - [`atom`] - Single atom with species, position, mass and optional charge/force
//! - [`cell`] - Orthorhombic periodic simulation box and minimum-image geometry
//! - [`frame`] - One configuration: atoms, box, trajectory index and molecule IDs
//! - [`element`] - Static covalent radius and atomic mass tables
//!
//! ## Usage
//!
//! ```ignore
//! use trajkit::core::models::{atom::Atom, cell::SimulationBox, frame::Frame};
//!
//! let atoms = vec![Atom::from_element("Li", Point3::new(1.0, 1.0, 1.0)).unwrap()];
//! let frame = Frame::new(atoms, SimulationBox::cubic(10.0).unwrap());
//! ```

pub mod atom;
pub mod cell;
pub mod element;
pub mod frame;

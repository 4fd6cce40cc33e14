//! Statistics over sampled collective variables.
//!
//! - [`histogram`] - Equal-width density histograms in one and two dimensions
//! - [`fes`] - Pseudo free-energy surfaces `-k_B T ln p`

pub mod error;
pub mod fes;
pub mod histogram;

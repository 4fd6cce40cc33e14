pub mod analyze;
pub mod fes;
pub mod registry;
pub mod unwrap;

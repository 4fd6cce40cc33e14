pub mod analysis;
pub mod dynamics;
pub mod io;
pub mod models;
pub mod topology;

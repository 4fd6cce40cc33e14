//! Per-frame computational tasks run by the [`Universe`](super::universe::Universe).

pub mod coarse_grain;

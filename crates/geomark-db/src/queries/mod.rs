//! Database query operations, one module per table.

pub mod marker_updates;
pub mod markers;

//! Persistence layer for the impact server.
//!
//! SQLite-backed storage for the airport directory, conflict zones, route
//! statistics, flight tracks and heatmap cells. Keyed entities are written
//! with upserts so repeated generation never duplicates rows.

pub mod airports;
pub mod db;
pub mod flight_tracks;
pub mod heatmap;
pub mod route_stats;
pub mod zones;

pub use db::{init_database, Database};

//! Library surface of the impact server, shared by the binary and tests.

pub mod analysis;
pub mod api;
pub mod config;
pub mod persistence;
pub mod state;

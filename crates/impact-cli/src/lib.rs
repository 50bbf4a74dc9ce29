//! Command line client for the airspace impact server.

pub mod client;
pub mod render;

pub use client::{decode, ImpactClient};

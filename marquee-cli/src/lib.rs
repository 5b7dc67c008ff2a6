//! Marquee CLI - configuration, logging and argument handling
//!
//! The binary in `main.rs` wires these into a [`marquee_fetch::RequestCoordinator`].

pub mod cli;
pub mod config;
pub mod error;
pub mod telemetry;

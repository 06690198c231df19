//! Reward condition evaluation and commission quoting for partner programs.

pub mod config;
pub mod error;
pub mod rewards;
pub mod telemetry;

#![doc = include_str!("../../../README.md")]

pub mod clock;
pub mod error;
pub mod experiment;
pub mod host;
pub mod parser;
pub mod placement_strategies;
pub mod placement_strategy;
pub mod power_model;
pub mod run_stats;
pub mod simulation;
pub mod system;
pub mod trace;
pub mod workload;

pub use error::{Error, Result};

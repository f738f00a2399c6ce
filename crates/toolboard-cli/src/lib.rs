//! Toolboard command-line library: configuration, logging, rendering and the
//! subcommands behind the `toolboard` binary.
//!
//! Separated from main.rs to enable integration testing.

pub mod commands;
pub mod config;
pub mod logging;
pub mod render;

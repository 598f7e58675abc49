//! CLI module for recsel - command-line interface and the fixture replay harness.

pub mod commands;
pub mod fixture;
pub mod replay;

pub use commands::Cli;

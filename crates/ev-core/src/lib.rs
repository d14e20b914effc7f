//! enverify command-line library.
//!
//! This crate provides the pieces behind the `enverify` binary:
//! - Exit codes for CLI operations
//! - Logging initialization
//! - Environment sources (process environment, env files, assignments)
//! - Output rendering for each command
//!
//! The binary entry point is in `main.rs`.

pub mod exit_codes;
pub mod logging;
pub mod output;
pub mod sources;

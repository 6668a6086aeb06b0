//! constgen CLI library
//!
//! Argument parsing, command handlers and console output for the
//! `constgen` binary.

pub mod commands;
pub mod error;
pub mod logging;
pub mod output;
pub mod router;

pub use error::{CliError, CliResult};
pub use logging::{init_logging, init_tracing, VerbosityLevel};
pub use router::{Cli, CommandRouter, Commands};

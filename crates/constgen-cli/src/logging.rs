// Logging and verbosity control

use std::sync::atomic::{AtomicU8, Ordering};

use tracing::Level;

use crate::error::{CliError, CliResult};

/// Global verbosity level
static VERBOSITY: AtomicU8 = AtomicU8::new(1);

/// Verbosity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum VerbosityLevel {
    /// Quiet mode - errors only
    Quiet = 0,
    /// Normal mode - standard output
    Normal = 1,
    /// Verbose mode - per-file details
    Verbose = 2,
}

impl VerbosityLevel {
    /// Get the current verbosity level
    pub fn current() -> Self {
        match VERBOSITY.load(Ordering::Relaxed) {
            0 => VerbosityLevel::Quiet,
            1 => VerbosityLevel::Normal,
            _ => VerbosityLevel::Verbose,
        }
    }

    /// Set the verbosity level
    pub fn set(level: Self) {
        VERBOSITY.store(level as u8, Ordering::Relaxed);
    }

    /// Check if we should output at this level
    pub fn should_output(&self) -> bool {
        self <= &Self::current()
    }

    fn from_flags(verbose: bool, quiet: bool) -> Self {
        if quiet {
            VerbosityLevel::Quiet
        } else if verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }

    /// Default tracing level for this verbosity
    pub fn tracing_level(&self) -> Level {
        match self {
            VerbosityLevel::Quiet => Level::ERROR,
            VerbosityLevel::Normal => Level::WARN,
            VerbosityLevel::Verbose => Level::DEBUG,
        }
    }
}

/// Initialize console verbosity based on CLI flags
pub fn init_logging(verbose: bool, quiet: bool) {
    VerbosityLevel::set(VerbosityLevel::from_flags(verbose, quiet));
}

/// Parse a `--log-level` value
pub fn parse_level(value: &str) -> CliResult<Level> {
    match value.to_ascii_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        other => Err(CliError::InvalidArgument {
            message: format!(
                "unknown log level '{}', expected one of trace, debug, info, warn, error",
                other
            ),
        }),
    }
}

/// Install the stderr tracing subscriber
///
/// An explicit `--log-level` wins over the verbosity flags. Installing a
/// second subscriber in the same process is a no-op.
pub fn init_tracing(verbose: bool, quiet: bool, log_level: Option<&str>) -> CliResult<()> {
    let level = match log_level {
        Some(value) => parse_level(value)?,
        None => VerbosityLevel::from_flags(verbose, quiet).tracing_level(),
    };

    let installed = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .try_init();
    if installed.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }

    Ok(())
}

/// Print a message to stderr at the given verbosity level
pub fn log_at_level(level: VerbosityLevel, message: &str) {
    if level.should_output() {
        eprintln!("{}", message);
    }
}

/// Print a detail message (only in verbose mode)
pub fn debug(message: &str) {
    log_at_level(VerbosityLevel::Verbose, message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_flags() {
        init_logging(false, true);
        assert_eq!(VerbosityLevel::current(), VerbosityLevel::Quiet);
        assert!(VerbosityLevel::Quiet.should_output());
        assert!(!VerbosityLevel::Normal.should_output());

        init_logging(true, false);
        assert_eq!(VerbosityLevel::current(), VerbosityLevel::Verbose);
        assert!(VerbosityLevel::Verbose.should_output());

        init_logging(false, false);
        assert_eq!(VerbosityLevel::current(), VerbosityLevel::Normal);
        assert!(!VerbosityLevel::Verbose.should_output());
    }

    #[test]
    fn test_quiet_wins_over_verbose() {
        assert_eq!(VerbosityLevel::from_flags(true, true), VerbosityLevel::Quiet);
    }

    #[test]
    fn test_tracing_level_per_verbosity() {
        assert_eq!(VerbosityLevel::Quiet.tracing_level(), Level::ERROR);
        assert_eq!(VerbosityLevel::Normal.tracing_level(), Level::WARN);
        assert_eq!(VerbosityLevel::Verbose.tracing_level(), Level::DEBUG);
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("INFO").unwrap(), Level::INFO);
        assert_eq!(parse_level("warning").unwrap(), Level::WARN);
        assert!(matches!(
            parse_level("loud"),
            Err(CliError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_init_tracing_rejects_bad_level() {
        assert!(init_tracing(false, false, Some("loud")).is_err());
    }
}

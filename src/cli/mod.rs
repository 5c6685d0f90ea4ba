//! CLI module for the Gunk front end
//!
//! ## Commands
//!
//! - `check [PATTERNS]...` - Load, type-check and validate packages
//! - `tags [PATTERNS]...` - List the `+gunk` tags of packages
//! - `descriptors <NAMES>...` - Load external descriptor files
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }

    /// Render a fatal library error with its diagnostic code and help.
    pub fn report<E>(err: E) -> Self
    where
        E: miette::Diagnostic + Send + Sync + 'static,
    {
        Self::failure(format!("{:?}", miette::Report::new(err)))
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Front end for the Gunk interface definition language
#[derive(Parser, Debug)]
#[command(name = "gunk")]
#[command(version = VERSION)]
#[command(about = "Load, check and inspect Gunk packages", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load, type-check and validate packages
    Check {
        /// Import paths, directories (`./x`), `/...` wildcards, or `.gunk` files
        #[arg(value_name = "PATTERNS", default_value = ".")]
        patterns: Vec<String>,
        /// Directory patterns are resolved against
        #[arg(short = 'C', value_name = "DIR", default_value = ".")]
        dir: PathBuf,
        /// Parse and validate without type checking
        #[arg(long)]
        no_types: bool,
        /// Print diagnostics as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the `+gunk` tags of packages
    Tags {
        #[arg(value_name = "PATTERNS", default_value = ".")]
        patterns: Vec<String>,
        #[arg(short = 'C', value_name = "DIR", default_value = ".")]
        dir: PathBuf,
    },

    /// Load external descriptor files, bundled or through protoc
    Descriptors {
        /// File names, e.g. `google/protobuf/empty.proto`
        #[arg(value_name = "NAMES", required = true)]
        names: Vec<String>,
        /// Path of the protoc binary
        #[arg(long, value_name = "PATH", default_value = "protoc")]
        protoc: PathBuf,
        /// Include directory
        #[arg(short = 'I', value_name = "DIR")]
        include: Option<PathBuf>,
        /// Write the encoded descriptor set here instead of listing the files
        #[arg(short = 'o', long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Command::Check {
            patterns,
            dir,
            no_types,
            json,
        } => commands::check(&dir, &patterns, !no_types, json),
        Command::Tags { patterns, dir } => commands::list_tags(&dir, &patterns),
        Command::Descriptors {
            names,
            protoc,
            include,
            output,
        } => commands::descriptors(&names, protoc, include, output.as_deref()),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_check() {
        let cli = Cli::try_parse_from(["gunk", "check", "--no-types", "--json", "-C", "protos", "./..."]).unwrap();
        let Command::Check {
            patterns,
            dir,
            no_types,
            json,
        } = cli.command
        else {
            panic!("Expected Check command");
        };
        assert_eq!(patterns, vec!["./..."]);
        assert_eq!(dir, PathBuf::from("protos"));
        assert!(no_types);
        assert!(json);
    }

    #[test]
    fn test_cli_parse_check_defaults() {
        let cli = Cli::try_parse_from(["gunk", "check"]).unwrap();
        if let Command::Check { patterns, dir, .. } = cli.command {
            assert_eq!(patterns, vec!["."]);
            assert_eq!(dir, PathBuf::from("."));
        } else {
            panic!("Expected Check command");
        }
    }

    #[test]
    fn test_cli_parse_tags() {
        let cli = Cli::try_parse_from(["gunk", "tags", "example.com/api"]).unwrap();
        assert!(matches!(cli.command, Command::Tags { .. }));
    }

    #[test]
    fn test_cli_parse_descriptors() {
        let cli = Cli::try_parse_from([
            "gunk",
            "descriptors",
            "--protoc",
            "/opt/protoc",
            "-I",
            "include",
            "google/protobuf/empty.proto",
        ])
        .unwrap();
        if let Command::Descriptors {
            names,
            protoc,
            include,
            output,
        } = cli.command
        {
            assert_eq!(names, vec!["google/protobuf/empty.proto"]);
            assert_eq!(protoc, PathBuf::from("/opt/protoc"));
            assert_eq!(include, Some(PathBuf::from("include")));
            assert!(output.is_none());
        } else {
            panic!("Expected Descriptors command");
        }
    }

    #[test]
    fn test_cli_descriptors_requires_names() {
        assert!(Cli::try_parse_from(["gunk", "descriptors"]).is_err());
    }
}

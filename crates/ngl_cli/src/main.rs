//! ngl CLI — the command-line interface for the Angular/Ionic linter.
//!
//! Provides `ngl lint` for checking (and optionally fixing) component sources
//! and `ngl rules` for listing the built-in rules.

#![warn(missing_docs)]

mod lint;
mod pipeline;
mod rules;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

/// ngl — lint rules for Angular and Ionic projects.
#[derive(Parser, Debug)]
#[command(name = "ngl", version, about = "Angular/Ionic linter")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a custom `ngl.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Lint the project's TypeScript sources and their templates.
    Lint(LintArgs),
    /// List the built-in rules.
    Rules,
}

/// Arguments for the `ngl lint` subcommand.
#[derive(Parser, Debug)]
pub struct LintArgs {
    /// Files or directories to lint. Defaults to the configured source
    /// directory.
    pub paths: Vec<PathBuf>,

    /// Apply suggested fixes and write the files back.
    #[arg(long)]
    pub fix: bool,

    /// Rule names or codes to suppress (e.g., `--allow prefer-readonly`).
    #[arg(long, num_args = 1..)]
    pub allow: Vec<String>,

    /// Rule names or codes to promote to errors (e.g., `--deny W105`).
    #[arg(long, num_args = 1..)]
    pub deny: Vec<String>,

    /// Output format for diagnostics.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Diagnostic output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// One JSON object per diagnostic on stdout.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => std::io::stderr().is_terminal(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
    };
    init_logging(&global);

    let result = match cli.command {
        Command::Lint(ref args) => lint::run(args, &global),
        Command::Rules => rules::run(&global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Installs the stderr log subscriber.
///
/// `NGL_LOG` takes precedence over `RUST_LOG`; without either, `-v` and `-q`
/// pick the level.
fn init_logging(global: &GlobalArgs) {
    let filter = EnvFilter::try_from_env("NGL_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_level(global)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(global.color)
        .with_target(false)
        .try_init();
}

fn default_level(global: &GlobalArgs) -> &'static str {
    if global.verbose {
        "debug"
    } else if global.quiet {
        "error"
    } else {
        "warn"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_lint_default() {
        let cli = Cli::parse_from(["ngl", "lint"]);
        match cli.command {
            Command::Lint(ref args) => {
                assert!(args.paths.is_empty());
                assert!(!args.fix);
                assert!(args.allow.is_empty());
                assert!(args.deny.is_empty());
                assert_eq!(args.format, ReportFormat::Text);
            }
            _ => panic!("expected Lint command"),
        }
    }

    #[test]
    fn parse_lint_with_args() {
        let cli = Cli::parse_from([
            "ngl",
            "lint",
            "src/app",
            "--fix",
            "--allow",
            "prefer-readonly",
            "--deny",
            "W105",
            "--format",
            "json",
        ]);
        match cli.command {
            Command::Lint(ref args) => {
                assert_eq!(args.paths, vec![PathBuf::from("src/app")]);
                assert!(args.fix);
                assert_eq!(args.allow, vec!["prefer-readonly"]);
                assert_eq!(args.deny, vec!["W105"]);
                assert_eq!(args.format, ReportFormat::Json);
            }
            _ => panic!("expected Lint command"),
        }
    }

    #[test]
    fn parse_lint_multiple_allow() {
        let cli = Cli::parse_from(["ngl", "lint", "--allow", "prefer-inject", "deny-element"]);
        match cli.command {
            Command::Lint(ref args) => {
                assert_eq!(args.allow, vec!["prefer-inject", "deny-element"]);
            }
            _ => panic!("expected Lint command"),
        }
    }

    #[test]
    fn parse_rules() {
        let cli = Cli::parse_from(["ngl", "rules"]);
        assert!(matches!(cli.command, Command::Rules));
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from(["ngl", "--quiet", "--color", "never", "lint"]);
        assert!(cli.quiet);
        assert!(!cli.verbose);
        assert_eq!(cli.color, ColorChoice::Never);
    }

    #[test]
    fn parse_config_path() {
        let cli = Cli::parse_from(["ngl", "--config", "/path/to/ngl.toml", "rules"]);
        assert_eq!(cli.config.as_deref(), Some("/path/to/ngl.toml"));
    }

    #[test]
    fn verbosity_picks_the_default_level() {
        let mut global = GlobalArgs {
            quiet: false,
            verbose: false,
            color: false,
            config: None,
        };
        assert_eq!(default_level(&global), "warn");
        global.quiet = true;
        assert_eq!(default_level(&global), "error");
        global.verbose = true;
        assert_eq!(default_level(&global), "debug");
    }
}

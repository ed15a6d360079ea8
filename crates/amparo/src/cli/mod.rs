//! Command-line interface for amparo.
//!
//! This module provides the CLI structure for the `amparo` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AuthCommand, ConfigCommand, ElderlyArgs, LocationArgs, OnboardingCommand, ReminderArgs,
    ScaleAxis, ScaleCommand, SetupCommand, StatusCommand,
};

use crate::logging::Verbosity;

/// amparo - first-run gating for the Amparo caregiver app
///
/// Walks the onboarding, sign-in and initial setup gates against a persisted
/// flag store, and evaluates the responsive scaling rules.
#[derive(Debug, Parser)]
#[command(name = "amparo")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Use a throwaway in-memory flag store
    #[arg(long, global = true)]
    pub memory: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show where the app would land on launch
    Status(StatusCommand),

    /// Onboarding slides
    #[command(subcommand)]
    Onboarding(OnboardingCommand),

    /// Sign in or out
    #[command(subcommand)]
    Auth(AuthCommand),

    /// Initial setup wizard
    #[command(subcommand)]
    Setup(SetupCommand),

    /// Scale a design size to the configured viewport
    Scale(ScaleCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::LocationCategory;
    use chrono::Weekday;
    use clap::CommandFactory;

    fn status_cli(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            memory: false,
            command: Command::Status(StatusCommand { json: false }),
        }
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "amparo");
    }

    #[test]
    fn test_verbosity() {
        assert_eq!(status_cli(0, true).verbosity(), Verbosity::Quiet);
        assert_eq!(status_cli(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(status_cli(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(status_cli(2, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_status() {
        let cli = Cli::try_parse_from(["amparo", "status", "--json"]).unwrap();
        assert!(matches!(cli.command, Command::Status(StatusCommand { json: true })));
    }

    #[test]
    fn test_parse_auth() {
        let cli = Cli::try_parse_from(["amparo", "auth", "logout"]).unwrap();
        assert!(matches!(cli.command, Command::Auth(AuthCommand::Logout)));
    }

    #[test]
    fn test_parse_register_location() {
        let cli = Cli::try_parse_from([
            "amparo",
            "setup",
            "register-location",
            "--name",
            "Clínica",
            "--address",
            "Av. Paulista, 1000",
            "--person",
            "Maria",
            "--category",
            "health",
            "--start",
            "09:00",
            "--end",
            "11:00",
            "--days",
            "tue,thu",
        ])
        .unwrap();
        let Command::Setup(SetupCommand::RegisterLocation(args)) = cli.command else {
            panic!("expected register-location");
        };
        assert_eq!(args.category, LocationCategory::Health);
        assert_eq!(args.days, vec![Weekday::Tue, Weekday::Thu]);
    }

    #[test]
    fn test_parse_reminder_weekly() {
        let cli = Cli::try_parse_from([
            "amparo",
            "setup",
            "configure-reminder",
            "--title",
            "Caminhada",
            "--description",
            "30 minutos",
            "--person",
            "Maria",
            "--time",
            "07:30",
            "--weekly",
            "1,3,5",
        ])
        .unwrap();
        let Command::Setup(SetupCommand::ConfigureReminder(args)) = cli.command else {
            panic!("expected configure-reminder");
        };
        assert_eq!(args.weekly, Some(vec![1, 3, 5]));
    }

    #[test]
    fn test_weekly_and_monthly_conflict() {
        let result = Cli::try_parse_from([
            "amparo",
            "setup",
            "configure-reminder",
            "--title",
            "t",
            "--description",
            "d",
            "--person",
            "p",
            "--time",
            "08:00",
            "--weekly",
            "1",
            "--monthly",
            "1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_scale() {
        let cli = Cli::try_parse_from([
            "amparo", "scale", "16", "--axis", "moderate", "--width", "750",
        ])
        .unwrap();
        let Command::Scale(args) = cli.command else {
            panic!("expected scale");
        };
        assert!((args.value - 16.0).abs() < f64::EPSILON);
        assert_eq!(args.axis, ScaleAxis::Moderate);
        assert_eq!(args.width, Some(750.0));
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "amparo",
            "-c",
            "/custom/config.toml",
            "-v",
            "--memory",
            "status",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
        assert_eq!(cli.verbose, 1);
        assert!(cli.memory);
    }

    #[test]
    fn test_parse_with_quiet() {
        let cli = Cli::try_parse_from(["amparo", "-q", "setup", "continue"]).unwrap();
        assert!(cli.quiet);
        assert!(matches!(cli.command, Command::Setup(SetupCommand::Continue)));
    }
}

//! `amparo` - CLI for the Amparo first-run gates
//!
//! This binary drives the launch gate and the setup wizard against the
//! configured flag store, and evaluates responsive scaling.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use amparo::cli::{
    AuthCommand, Cli, Command, ConfigCommand, OnboardingCommand, ScaleAxis, ScaleCommand,
    SetupCommand,
};
use amparo::responsive::{Scaler, ViewportMetrics};
use amparo::wizard::continue_action;
use amparo::{
    init_logging, Config, FlagStore, MemoryFlagStore, SetupGate, SetupWizard, SqliteFlagStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    let config_path = cli.config;
    let load_config = || Config::load_from(config_path.clone());

    match cli.command {
        Command::Config(ConfigCommand::Validate { file }) => {
            validate_config(file, config_path.clone())
        }
        Command::Config(ConfigCommand::Path) => {
            println!("{}", Config::default_config_path().display());
            Ok(())
        }
        Command::Config(ConfigCommand::Show { json }) => show_config(&load_config()?, json),
        Command::Scale(scale_cmd) => handle_scale(&load_config()?, &scale_cmd),
        Command::Status(status_cmd) => {
            let (gate, wizard) = open_session(&load_config()?, cli.memory)?;
            handle_status(&gate, &wizard, status_cmd.json).await
        }
        Command::Onboarding(OnboardingCommand::Complete) => {
            let (gate, _) = open_session(&load_config()?, cli.memory)?;
            gate.complete_onboarding().await?;
            println!("Onboarding marked as seen.");
            print_next_launch(&gate).await;
            Ok(())
        }
        Command::Auth(auth_cmd) => {
            let (gate, _) = open_session(&load_config()?, cli.memory)?;
            match auth_cmd {
                AuthCommand::Login => {
                    gate.sign_in().await?;
                    println!("Signed in.");
                }
                AuthCommand::Logout => {
                    gate.sign_out().await?;
                    println!("Signed out.");
                }
            }
            print_next_launch(&gate).await;
            Ok(())
        }
        Command::Setup(setup_cmd) => {
            let (gate, wizard) = open_session(&load_config()?, cli.memory)?;
            handle_setup(&wizard, setup_cmd).await?;
            print_next_launch(&gate).await;
            Ok(())
        }
    }
}

type Gate = SetupGate<dyn FlagStore>;
type Wizard = SetupWizard<dyn FlagStore>;

/// Open the flag store and build a gate and wizard sharing it.
fn open_session(config: &Config, memory: bool) -> anyhow::Result<(Gate, Wizard)> {
    let store: Arc<dyn FlagStore> = if memory {
        Arc::new(MemoryFlagStore::new())
    } else {
        let path = config.database_path();
        let store = SqliteFlagStore::open(&path)
            .with_context(|| format!("opening flag store at {}", path.display()))?;
        Arc::new(store)
    };
    Ok((SetupGate::new(Arc::clone(&store)), SetupWizard::new(store)))
}

async fn print_next_launch(gate: &Gate) {
    let launch = gate.evaluate().await;
    println!("Next launch: {} ({})", launch, launch.route());
}

async fn handle_status(gate: &Gate, wizard: &Wizard, json: bool) -> anyhow::Result<()> {
    let (state, progress) = tokio::join!(gate.snapshot(), wizard.load());
    let launch = amparo::gate::evaluate(&state);

    if json {
        let status = serde_json::json!({
            "launch_state": launch,
            "route": launch.route(),
            "flags": state,
            "wizard": progress,
            "continue": continue_action(&progress),
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("amparo status");
        println!("-------------");
        println!("Onboarding seen:    {}", state.seen_onboarding);
        println!("Signed in:          {}", state.authenticated);
        println!("Setup completed:    {}", state.completed_setup);
        println!();
        print_progress(&progress);
        println!();
        println!("Launch:             {} ({})", launch, launch.route());
    }
    Ok(())
}

fn print_progress(progress: &amparo::WizardProgress) {
    println!("[Setup wizard]");
    println!("  Elderly (required):  {}", progress.elderly_registered);
    println!("  Locations:           {}", progress.locations_registered);
    println!("  Reminders:           {}", progress.notifications_configured);
    match continue_action(progress) {
        amparo::wizard::ContinueAction::Enabled => println!("  Continue:            enabled"),
        amparo::wizard::ContinueAction::Disabled { hint } => {
            println!("  Continue:            disabled ({hint})");
        }
    }
}

async fn handle_setup(wizard: &Wizard, cmd: SetupCommand) -> anyhow::Result<()> {
    match cmd {
        SetupCommand::Show { json } => {
            let progress = wizard.load().await;
            if json {
                let show = serde_json::json!({
                    "wizard": progress,
                    "continue": continue_action(&progress),
                });
                println!("{}", serde_json::to_string_pretty(&show)?);
            } else {
                print_progress(&progress);
            }
        }
        SetupCommand::RegisterElderly(args) => {
            let today = chrono::Local::now().date_naive();
            let profile = wizard.register_elderly(&args.to_form(), today).await?;
            println!(
                "Registered {} ({} years), emergency phone {}",
                profile.name, profile.age, profile.emergency_phone
            );
        }
        SetupCommand::RegisterLocation(args) => {
            let location = wizard.save_location(&args.to_form()).await?;
            println!(
                "Saved {} [{}] {}-{}",
                location.name,
                location.category.label(),
                location.start_time.format("%H:%M"),
                location.end_time.format("%H:%M")
            );
        }
        SetupCommand::ConfigureReminder(args) => {
            let reminder = wizard.save_reminder(&args.to_form()).await?;
            println!(
                "Saved reminder {} at {} ({})",
                reminder.title,
                reminder.time_label(),
                reminder.frequency.label()
            );
        }
        SetupCommand::Continue => {
            wizard.finish().await?;
            println!("Initial setup completed.");
        }
    }
    Ok(())
}

fn handle_scale(config: &Config, cmd: &ScaleCommand) -> anyhow::Result<()> {
    let configured = config.viewport.metrics();
    let viewport = ViewportMetrics::new(
        cmd.width.unwrap_or(configured.width),
        cmd.height.unwrap_or(configured.height),
    );
    viewport.validate()?;
    let scaler = Scaler::new(viewport).with_pixel_ratio(config.viewport.pixel_ratio);

    let value = match cmd.axis {
        ScaleAxis::Width => scaler.scale_width(cmd.value),
        ScaleAxis::Height => scaler.scale_height(cmd.value),
        ScaleAxis::Font => scaler.scale_font_size(cmd.value),
        ScaleAxis::Moderate => match cmd.factor {
            Some(factor) => scaler.scale_moderate_by(cmd.value, factor),
            None => scaler.scale_moderate(cmd.value),
        },
        ScaleAxis::Wp => scaler.wp(cmd.value),
        ScaleAxis::Hp => scaler.hp(cmd.value),
    };

    println!("{value}");
    tracing::debug!(
        "Viewport {}x{} is {}",
        viewport.width,
        viewport.height,
        scaler.device_class()
    );
    Ok(())
}

fn show_config(config: &Config, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(config)?);
    } else {
        println!("Current Configuration");
        println!("=====================");
        println!();
        println!("[Storage]");
        println!("  Database path:      {}", config.database_path().display());
        println!();
        println!("[Viewport]");
        println!("  Width:              {}", config.viewport.width);
        println!("  Height:             {}", config.viewport.height);
        println!("  Pixel ratio:        {}", config.viewport.pixel_ratio);
        println!("  Device class:       {}", config.scaler().device_class());
    }
    Ok(())
}

/// Load `file`, else the `--config` file, else the default, and fail if it
/// does not validate.
fn validate_config(file: Option<PathBuf>, global: Option<PathBuf>) -> anyhow::Result<()> {
    let path = file.or(global).unwrap_or_else(Config::default_config_path);
    println!("Validating configuration: {}", path.display());
    Config::load_from(Some(path.clone()))
        .with_context(|| format!("invalid configuration in {}", path.display()))?;
    println!("Configuration is valid.");
    Ok(())
}

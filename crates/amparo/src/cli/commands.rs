//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use chrono::Weekday;
use clap::{Args, Subcommand, ValueEnum};

use crate::forms::{ElderlyForm, Frequency, LocationCategory, LocationForm, ReminderForm};

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Onboarding commands.
#[derive(Debug, Subcommand)]
pub enum OnboardingCommand {
    /// Mark the onboarding slides as seen
    Complete,
}

/// Authentication commands.
#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Record a successful sign-in
    Login,

    /// Sign out
    Logout,
}

/// Setup wizard commands.
#[derive(Debug, Subcommand)]
pub enum SetupCommand {
    /// Show wizard progress and the Continue state
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Register an elderly person (required step)
    RegisterElderly(ElderlyArgs),

    /// Register a frequented location
    RegisterLocation(LocationArgs),

    /// Configure a reminder
    ConfigureReminder(ReminderArgs),

    /// Finish the wizard
    Continue,
}

/// Elderly registration fields.
#[derive(Debug, Args)]
pub struct ElderlyArgs {
    /// Full name
    #[arg(long)]
    pub name: String,

    /// Birth date as DD/MM/YYYY (digits only are accepted too)
    #[arg(long)]
    pub birth_date: String,

    /// Six-character code printed on the watch
    #[arg(long)]
    pub watch_code: String,

    /// Emergency contact phone
    #[arg(long)]
    pub phone: String,

    /// Health conditions
    #[arg(long, default_value = "")]
    pub conditions: String,

    /// Medications
    #[arg(long, default_value = "")]
    pub medications: String,
}

impl ElderlyArgs {
    /// Build the form, masking the birth date as the screen does.
    #[must_use]
    pub fn to_form(&self) -> ElderlyForm {
        ElderlyForm {
            name: self.name.clone(),
            birth_date: crate::forms::format_birth_date(&self.birth_date),
            watch_code: self.watch_code.clone(),
            emergency_phone: self.phone.clone(),
            health_conditions: self.conditions.clone(),
            medications: self.medications.clone(),
        }
    }
}

/// Location fields.
#[derive(Debug, Args)]
pub struct LocationArgs {
    /// Place name
    #[arg(long)]
    pub name: String,

    /// Street address
    #[arg(long)]
    pub address: String,

    /// Person who frequents the place
    #[arg(long)]
    pub person: String,

    /// Category (primary_residence, work, health, leisure, family, other)
    #[arg(long)]
    pub category: LocationCategory,

    /// Arrival time, HH:MM
    #[arg(long)]
    pub start: String,

    /// Departure time, HH:MM
    #[arg(long)]
    pub end: String,

    /// Days, comma separated (e.g. mon,wed,fri)
    #[arg(long, value_delimiter = ',')]
    pub days: Vec<Weekday>,
}

impl LocationArgs {
    /// Build the form.
    #[must_use]
    pub fn to_form(&self) -> LocationForm {
        LocationForm {
            name: self.name.clone(),
            address: self.address.clone(),
            associated_to: self.person.clone(),
            category: Some(self.category),
            start_time: self.start.clone(),
            end_time: self.end.clone(),
            days: self.days.clone(),
        }
    }
}

/// Reminder fields.
#[derive(Debug, Args)]
pub struct ReminderArgs {
    /// Reminder title
    #[arg(long)]
    pub title: String,

    /// What to do
    #[arg(long)]
    pub description: String,

    /// Person the reminder is for
    #[arg(long)]
    pub person: String,

    /// Fire time, HH:MM
    #[arg(long)]
    pub time: String,

    /// Weekly on these weekdays, 0 (Sunday) to 6
    #[arg(long, value_delimiter = ',', conflicts_with = "monthly")]
    pub weekly: Option<Vec<u8>>,

    /// Monthly on these days, 1 to 31
    #[arg(long, value_delimiter = ',')]
    pub monthly: Option<Vec<u8>>,

    /// Save the reminder switched off
    #[arg(long)]
    pub disabled: bool,
}

impl ReminderArgs {
    /// Build the form. Without `--weekly` or `--monthly` the reminder is daily.
    #[must_use]
    pub fn to_form(&self) -> ReminderForm {
        let frequency = match (&self.weekly, &self.monthly) {
            (Some(weekdays), _) => Frequency::Weekly {
                weekdays: weekdays.clone(),
            },
            (None, Some(days)) => Frequency::Monthly { days: days.clone() },
            (None, None) => Frequency::Daily,
        };
        ReminderForm {
            title: self.title.clone(),
            description: self.description.clone(),
            associated_to: self.person.clone(),
            time: self.time.clone(),
            frequency,
            enabled: !self.disabled,
        }
    }
}

/// Scale command arguments.
#[derive(Debug, Args)]
pub struct ScaleCommand {
    /// Design size at the 375x812 reference
    #[arg(allow_negative_numbers = true)]
    pub value: f64,

    /// Which scaling to apply
    #[arg(short, long, value_enum, default_value = "width")]
    pub axis: ScaleAxis,

    /// Damping factor for moderate scaling
    #[arg(short, long)]
    pub factor: Option<f64>,

    /// Override the configured viewport width
    #[arg(long)]
    pub width: Option<f64>,

    /// Override the configured viewport height
    #[arg(long)]
    pub height: Option<f64>,
}

/// Scaling operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScaleAxis {
    /// Proportional to viewport width
    Width,
    /// Proportional to viewport height
    Height,
    /// Width-scaled and rounded to whole pixels
    Font,
    /// Halfway between unscaled and width-scaled
    Moderate,
    /// Percentage of viewport width
    Wp,
    /// Percentage of viewport height
    Hp,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

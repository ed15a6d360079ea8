//! `amparo` - first-run gating and layout scaling for the Amparo caregiver app
//!
//! This library decides where a caregiver lands when the app starts
//! (onboarding, sign-in, initial setup or home), drives the initial setup
//! wizard over a persisted flag store, validates the registration forms, and
//! maps design pixel sizes onto the current viewport.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod flags;
pub mod forms;
pub mod gate;
pub mod logging;
pub mod responsive;
pub mod screen;
pub mod storage;
pub mod wizard;

pub use config::Config;
pub use error::{Error, Result};
pub use flags::{Flag, FlagStore, MemoryFlagStore};
pub use gate::{LaunchState, SetupGate, SetupState};
pub use logging::init_logging;
pub use responsive::{Scaler, ViewportMetrics};
pub use storage::SqliteFlagStore;
pub use wizard::{SetupWizard, WizardProgress};

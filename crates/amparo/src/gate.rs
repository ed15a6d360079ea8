//! Launch gate.
//!
//! Decides where a user lands when the app starts. The decision is a strict
//! priority chain over persisted flags:
//!
//! 1. onboarding not seen -> [`LaunchState::NeedsOnboarding`]
//! 2. not signed in -> [`LaunchState::NeedsAuth`]
//! 3. setup not completed -> [`LaunchState::NeedsSetup`]
//! 4. otherwise -> [`LaunchState::Ready`]
//!
//! [`evaluate`] is the pure decision; [`SetupGate`] gathers the flags from a
//! [`FlagStore`] and applies it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::flags::{read_or_false, Flag, FlagStore};
use crate::screen::ScreenHandle;

/// Where the user is sent on launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchState {
    /// Show the onboarding slides.
    NeedsOnboarding,
    /// Show the sign-in chooser.
    NeedsAuth,
    /// Show the initial setup wizard.
    NeedsSetup,
    /// Show the tabbed home.
    Ready,
}

impl LaunchState {
    /// The route this state redirects to.
    #[must_use]
    pub const fn route(self) -> &'static str {
        match self {
            Self::NeedsOnboarding => "/screens/onboardingScreen",
            Self::NeedsAuth => "/screens/authScreen",
            Self::NeedsSetup => "/screens/initialSetupScreen",
            Self::Ready => "/(tabs)/home",
        }
    }
}

impl std::fmt::Display for LaunchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NeedsOnboarding => write!(f, "needs_onboarding"),
            Self::NeedsAuth => write!(f, "needs_auth"),
            Self::NeedsSetup => write!(f, "needs_setup"),
            Self::Ready => write!(f, "ready"),
        }
    }
}

/// Snapshot of the gating flags, read fresh for each decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupState {
    /// `@has_seen_onboarding`
    pub seen_onboarding: bool,
    /// `@is_authenticated`
    pub authenticated: bool,
    /// `@has_completed_setup`
    pub completed_setup: bool,
    /// `elderlyRegistered`
    pub elderly_registered: bool,
}

type Rule = (fn(&SetupState) -> bool, LaunchState);

/// Checked top-down; the first unmet predicate picks the state.
const RULES: &[Rule] = &[
    (seen_onboarding, LaunchState::NeedsOnboarding),
    (authenticated, LaunchState::NeedsAuth),
    (completed_setup, LaunchState::NeedsSetup),
];

fn seen_onboarding(state: &SetupState) -> bool {
    state.seen_onboarding
}

fn authenticated(state: &SetupState) -> bool {
    state.authenticated
}

fn completed_setup(state: &SetupState) -> bool {
    state.completed_setup
}

/// Decide the launch state for a flag snapshot.
#[must_use]
pub fn evaluate(state: &SetupState) -> LaunchState {
    RULES
        .iter()
        .find(|(satisfied, _)| !satisfied(state))
        .map_or(LaunchState::Ready, |(_, target)| *target)
}

/// Reads gating flags from a store and routes on them.
#[derive(Debug)]
pub struct SetupGate<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for SetupGate<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> SetupGate<S>
where
    S: FlagStore + ?Sized,
{
    /// Create a gate over the given store.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Read all gating flags concurrently.
    ///
    /// Unreadable flags count as unset.
    pub async fn snapshot(&self) -> SetupState {
        let store = self.store.as_ref();
        let (seen_onboarding, authenticated, completed_setup, elderly_registered) = tokio::join!(
            read_or_false(store, Flag::SeenOnboarding),
            read_or_false(store, Flag::Authenticated),
            read_or_false(store, Flag::CompletedSetup),
            read_or_false(store, Flag::ElderlyRegistered),
        );
        SetupState {
            seen_onboarding,
            authenticated,
            completed_setup,
            elderly_registered,
        }
    }

    /// Read the flags and decide where to route.
    pub async fn evaluate(&self) -> LaunchState {
        let state = self.snapshot().await;
        let launch = evaluate(&state);
        debug!("Launch gate: {:?} -> {}", state, launch);
        launch
    }

    /// Decide the route for the launch screen.
    ///
    /// Returns `None` if the screen was unmounted while the reads were in
    /// flight, so no redirect happens.
    pub async fn evaluate_for(&self, screen: &ScreenHandle) -> Option<LaunchState> {
        let launch = self.evaluate().await;
        screen.deliver(launch)
    }

    /// Record that the onboarding slides were completed.
    ///
    /// # Errors
    ///
    /// Returns an error if the flag cannot be written.
    pub async fn complete_onboarding(&self) -> Result<()> {
        self.store.set(Flag::SeenOnboarding, true).await?;
        info!("Onboarding completed");
        Ok(())
    }

    /// Record a successful sign-in.
    ///
    /// # Errors
    ///
    /// Returns an error if the flag cannot be written.
    pub async fn sign_in(&self) -> Result<()> {
        self.store.set(Flag::Authenticated, true).await?;
        info!("Caregiver signed in");
        Ok(())
    }

    /// Clear the sign-in flag, sending the next launch back to auth.
    ///
    /// # Errors
    ///
    /// Returns an error if the flag cannot be written.
    pub async fn sign_out(&self) -> Result<()> {
        self.store.set(Flag::Authenticated, false).await?;
        info!("Caregiver signed out");
        Ok(())
    }
}

//! Initial setup wizard.
//!
//! Three steps, in any order:
//!
//! | Step | Flag | Required |
//! |---|---|---|
//! | Register elderly | `elderlyRegistered` | yes |
//! | Register locations | `locationsRegistered` | no |
//! | Configure reminders | `notificationsConfigured` | no |
//!
//! Step flags only ever move to `true`. The wizard can be finished once the
//! required step is recorded, and finishing is what sets
//! `@has_completed_setup`.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::flags::{read_or_false, Flag, FlagStore};
use crate::forms::{ElderlyForm, ElderlyProfile, Location, LocationForm, Reminder, ReminderForm};
use crate::screen::ScreenHandle;

/// Hint shown while Continue is disabled.
pub const CONTINUE_HINT: &str = "Register at least one elderly person to continue";

/// A wizard step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetupStep {
    /// Register an elderly profile.
    RegisterElderly,
    /// Register frequented locations.
    RegisterLocations,
    /// Configure reminders.
    ConfigureNotifications,
}

impl SetupStep {
    /// Every step, in display order.
    pub const ALL: [Self; 3] = [
        Self::RegisterElderly,
        Self::RegisterLocations,
        Self::ConfigureNotifications,
    ];

    /// The flag recording this step.
    #[must_use]
    pub const fn flag(self) -> Flag {
        match self {
            Self::RegisterElderly => Flag::ElderlyRegistered,
            Self::RegisterLocations => Flag::LocationsRegistered,
            Self::ConfigureNotifications => Flag::NotificationsConfigured,
        }
    }

    /// Whether finishing the wizard needs this step.
    #[must_use]
    pub const fn is_required(self) -> bool {
        matches!(self, Self::RegisterElderly)
    }
}

impl std::fmt::Display for SetupStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RegisterElderly => write!(f, "register_elderly"),
            Self::RegisterLocations => write!(f, "register_locations"),
            Self::ConfigureNotifications => write!(f, "configure_notifications"),
        }
    }
}

/// Which wizard steps have been recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardProgress {
    /// Required step.
    pub elderly_registered: bool,
    /// Optional step.
    pub locations_registered: bool,
    /// Optional step.
    pub notifications_configured: bool,
}

impl WizardProgress {
    /// Whether `step` has been recorded.
    #[must_use]
    pub fn is_done(&self, step: SetupStep) -> bool {
        match step {
            SetupStep::RegisterElderly => self.elderly_registered,
            SetupStep::RegisterLocations => self.locations_registered,
            SetupStep::ConfigureNotifications => self.notifications_configured,
        }
    }

    /// Whether every required step has been recorded.
    #[must_use]
    pub fn can_finish(&self) -> bool {
        SetupStep::ALL
            .into_iter()
            .filter(|step| step.is_required())
            .all(|step| self.is_done(step))
    }
}

/// State of the Continue button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ContinueAction {
    /// Tapping finishes the wizard.
    Enabled,
    /// Greyed out, with a hint below.
    Disabled {
        /// Why Continue is unavailable.
        hint: String,
    },
}

impl ContinueAction {
    /// Whether the button can be tapped.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled)
    }
}

/// Continue is enabled iff the required step is done.
#[must_use]
pub fn continue_action(progress: &WizardProgress) -> ContinueAction {
    if progress.can_finish() {
        ContinueAction::Enabled
    } else {
        ContinueAction::Disabled {
            hint: CONTINUE_HINT.to_string(),
        }
    }
}

/// Drives the setup wizard against a flag store.
#[derive(Debug)]
pub struct SetupWizard<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for SetupWizard<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> SetupWizard<S>
where
    S: FlagStore + ?Sized,
{
    /// Create a wizard over the given store.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Read the three step flags concurrently.
    ///
    /// Unreadable flags count as not done.
    pub async fn load(&self) -> WizardProgress {
        let store = self.store.as_ref();
        let (elderly_registered, locations_registered, notifications_configured) = tokio::join!(
            read_or_false(store, Flag::ElderlyRegistered),
            read_or_false(store, Flag::LocationsRegistered),
            read_or_false(store, Flag::NotificationsConfigured),
        );
        WizardProgress {
            elderly_registered,
            locations_registered,
            notifications_configured,
        }
    }

    /// Reload progress for a screen regaining focus.
    ///
    /// Returns `None` if the screen was unmounted while the reads were in
    /// flight.
    pub async fn refresh(&self, screen: &ScreenHandle) -> Option<WizardProgress> {
        let progress = self.load().await;
        screen.deliver(progress)
    }

    /// Mark a step as done.
    ///
    /// Recording an already recorded step leaves it `true`.
    ///
    /// # Errors
    ///
    /// Returns an error if the flag cannot be written.
    pub async fn record(&self, step: SetupStep) -> Result<()> {
        self.store.set(step.flag(), true).await?;
        debug!("Recorded setup step {}", step);
        Ok(())
    }

    /// Validate an elderly profile and record the required step.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Form`] for invalid input, or a storage error if the
    /// flag cannot be written. Nothing is recorded when validation fails.
    pub async fn register_elderly(
        &self,
        form: &ElderlyForm,
        today: NaiveDate,
    ) -> Result<ElderlyProfile> {
        let profile = form.validate(today)?;
        self.record(SetupStep::RegisterElderly).await?;
        info!("Registered elderly profile for {}", profile.name);
        Ok(profile)
    }

    /// Validate a location and record the locations step.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Form`] for invalid input, or a storage error.
    pub async fn save_location(&self, form: &LocationForm) -> Result<Location> {
        let location = form.validate()?;
        self.record(SetupStep::RegisterLocations).await?;
        info!("Saved location {}", location.name);
        Ok(location)
    }

    /// Validate a reminder and record the notifications step.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Form`] for invalid input, or a storage error.
    pub async fn save_reminder(&self, form: &ReminderForm) -> Result<Reminder> {
        let reminder = form.validate()?;
        self.record(SetupStep::ConfigureNotifications).await?;
        info!("Saved reminder {} at {}", reminder.title, reminder.time_label());
        Ok(reminder)
    }

    /// Finish the wizard.
    ///
    /// The required flag is read from the store rather than taken from the
    /// caller. Finishing twice writes `@has_completed_setup` once.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SetupIncomplete`] if no elderly profile is recorded,
    /// or a storage error if the completion flag cannot be written.
    pub async fn finish(&self) -> Result<()> {
        let store = self.store.as_ref();
        if read_or_false(store, Flag::CompletedSetup).await {
            debug!("Setup already completed");
            return Ok(());
        }
        if !read_or_false(store, Flag::ElderlyRegistered).await {
            return Err(Error::SetupIncomplete {
                missing: "elderly registration",
            });
        }
        self.store.set(Flag::CompletedSetup, true).await?;
        info!("Initial setup completed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::{HeldReads, MemoryFlagStore};
    use crate::gate::{LaunchState, SetupGate};
    use crate::screen::Screen;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts flag writes.
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryFlagStore,
        writes: AtomicUsize,
    }

    #[async_trait]
    impl FlagStore for CountingStore {
        async fn get(&self, flag: Flag) -> Result<Option<bool>> {
            self.inner.get(flag).await
        }

        async fn set(&self, flag: Flag, value: bool) -> Result<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.set(flag, value).await
        }
    }

    fn elderly_form() -> ElderlyForm {
        ElderlyForm {
            name: "Maria".to_string(),
            birth_date: "10/03/1948".to_string(),
            watch_code: "AB12CD".to_string(),
            emergency_phone: "11987654321".to_string(),
            ..ElderlyForm::default()
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn signed_in() -> Arc<MemoryFlagStore> {
        Arc::new(MemoryFlagStore::with_flags(&[
            (Flag::SeenOnboarding, true),
            (Flag::Authenticated, true),
        ]))
    }

    #[test]
    fn test_continue_needs_only_elderly() {
        let mut progress = WizardProgress {
            elderly_registered: false,
            locations_registered: true,
            notifications_configured: true,
        };
        assert_eq!(
            continue_action(&progress),
            ContinueAction::Disabled {
                hint: CONTINUE_HINT.to_string()
            }
        );

        progress = WizardProgress {
            elderly_registered: true,
            ..WizardProgress::default()
        };
        assert!(continue_action(&progress).is_enabled());
    }

    #[test]
    fn test_steps() {
        assert!(SetupStep::RegisterElderly.is_required());
        assert!(!SetupStep::RegisterLocations.is_required());
        assert_eq!(
            SetupStep::ConfigureNotifications.flag().key(),
            "notificationsConfigured"
        );
    }

    #[tokio::test]
    async fn test_wizard_walkthrough() {
        let store = signed_in();
        let wizard = SetupWizard::new(Arc::clone(&store));
        let gate = SetupGate::new(Arc::clone(&store));
        assert_eq!(gate.evaluate().await, LaunchState::NeedsSetup);

        let progress = wizard.load().await;
        assert!(!continue_action(&progress).is_enabled());

        wizard.register_elderly(&elderly_form(), today()).await.unwrap();
        let progress = wizard.load().await;
        assert!(progress.elderly_registered);
        assert!(!progress.locations_registered);
        assert!(continue_action(&progress).is_enabled());

        wizard.finish().await.unwrap();
        assert_eq!(gate.evaluate().await, LaunchState::Ready);
    }

    #[tokio::test]
    async fn test_finish_without_elderly_is_refused() {
        let store = signed_in();
        let wizard = SetupWizard::new(Arc::clone(&store));
        wizard.record(SetupStep::RegisterLocations).await.unwrap();
        wizard.record(SetupStep::ConfigureNotifications).await.unwrap();

        let err = wizard.finish().await.unwrap_err();
        assert!(matches!(err, Error::SetupIncomplete { .. }));
        assert_eq!(store.get(Flag::CompletedSetup).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invalid_form_records_nothing() {
        let store = signed_in();
        let wizard = SetupWizard::new(Arc::clone(&store));
        let form = ElderlyForm {
            watch_code: "123".to_string(),
            ..elderly_form()
        };

        let err = wizard.register_elderly(&form, today()).await.unwrap_err();
        assert!(err.is_form_error());
        assert!(!wizard.load().await.elderly_registered);
    }

    #[tokio::test]
    async fn test_second_registration_keeps_flag() {
        let wizard = SetupWizard::new(signed_in());
        wizard.register_elderly(&elderly_form(), today()).await.unwrap();
        wizard.register_elderly(&elderly_form(), today()).await.unwrap();
        assert!(wizard.load().await.elderly_registered);
    }

    #[tokio::test]
    async fn test_finish_writes_once() {
        let store = Arc::new(CountingStore::default());
        let wizard = SetupWizard::new(Arc::clone(&store));
        wizard.record(SetupStep::RegisterElderly).await.unwrap();
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);

        wizard.finish().await.unwrap();
        wizard.finish().await.unwrap();
        assert_eq!(store.writes.load(Ordering::SeqCst), 2);
        assert_eq!(store.get(Flag::CompletedSetup).await.unwrap(), Some(true));
    }

    #[tokio::test]
    async fn test_finish_reads_store_not_caller() {
        let store = signed_in();
        let wizard = SetupWizard::new(Arc::clone(&store));
        let stale = WizardProgress {
            elderly_registered: true,
            ..WizardProgress::default()
        };
        assert!(continue_action(&stale).is_enabled());
        assert!(wizard.finish().await.is_err());
    }

    #[tokio::test]
    async fn test_refresh_after_unmount_is_discarded() {
        let wizard = SetupWizard::new(signed_in());
        let screen = ScreenHandle::mount(Screen::InitialSetup);
        wizard.record(SetupStep::RegisterElderly).await.unwrap();

        let progress = wizard.refresh(&screen).await.unwrap();
        assert!(progress.elderly_registered);

        screen.unmount();
        assert_eq!(wizard.refresh(&screen).await, None);
    }

    #[tokio::test]
    async fn test_unmount_during_refresh_discards_progress() {
        let store = Arc::new(HeldReads::with_flags(&[(Flag::ElderlyRegistered, true)]));
        let wizard = SetupWizard::new(Arc::clone(&store));
        let screen = ScreenHandle::mount(Screen::InitialSetup);

        let task = {
            let (wizard, screen) = (wizard.clone(), screen.clone());
            tokio::spawn(async move { wizard.refresh(&screen).await })
        };
        store.wait_for_pending(3).await;
        assert!(!task.is_finished());

        screen.unmount();
        store.release();
        assert_eq!(task.await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_optional_steps_in_any_order() {
        let wizard = SetupWizard::new(signed_in());
        let reminder = ReminderForm {
            title: "Água".to_string(),
            description: "Beber um copo".to_string(),
            associated_to: "Maria".to_string(),
            time: "10:00".to_string(),
            frequency: crate::forms::Frequency::Daily,
            enabled: false,
        };
        wizard.save_reminder(&reminder).await.unwrap();
        wizard.register_elderly(&elderly_form(), today()).await.unwrap();

        let progress = wizard.load().await;
        assert!(progress.notifications_configured);
        assert!(!progress.locations_registered);
        assert!(progress.can_finish());
    }
}

//! Screen lifetime tracking.
//!
//! A screen that starts an asynchronous flag read may be torn down before the
//! read resolves. [`ScreenHandle`] lets the reader check, once the result is
//! in, whether anyone is still there to receive it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

/// Screens that wait on setup flag reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    /// Launch redirect.
    Launch,
    /// Initial setup wizard.
    InitialSetup,
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Launch => write!(f, "launch"),
            Self::InitialSetup => write!(f, "initial_setup"),
        }
    }
}

/// Cloneable handle sharing one screen's mounted state.
#[derive(Debug, Clone)]
pub struct ScreenHandle {
    screen: Screen,
    mounted: Arc<AtomicBool>,
}

impl ScreenHandle {
    /// Create a handle for a freshly mounted screen.
    #[must_use]
    pub fn mount(screen: Screen) -> Self {
        Self {
            screen,
            mounted: Arc::new(AtomicBool::new(true)),
        }
    }

    /// The screen this handle tracks.
    #[must_use]
    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Mark the screen as torn down.
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
    }

    /// Whether the screen is still mounted.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    /// Pass `value` through if the screen is still mounted, drop it otherwise.
    #[must_use]
    pub fn deliver<T>(&self, value: T) -> Option<T> {
        if self.is_mounted() {
            Some(value)
        } else {
            debug!("Discarding late result for unmounted screen {}", self.screen);
            None
        }
    }
}

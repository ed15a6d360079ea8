//! Responsive scaling of design pixel values.
//!
//! Screens are authored against a 375x812 logical-pixel reference phone.
//! [`Scaler`] maps those design values onto the current viewport so layouts
//! keep their proportions on smaller phones and on tablets.
//!
//! Every operation is a pure function of the [`ViewportMetrics`] snapshot the
//! scaler was built with.
//!
//! # Example
//!
//! ```
//! use amparo::responsive::{Scaler, ViewportMetrics};
//!
//! let scaler = Scaler::new(ViewportMetrics::new(750.0, 1624.0));
//! assert_eq!(scaler.scale_width(20.0), 40.0);
//! assert_eq!(scaler.scale_moderate(16.0), 24.0);
//! assert!(!scaler.is_tablet());
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Width of the reference design device, in logical pixels.
pub const BASE_WIDTH: f64 = 375.0;

/// Height of the reference design device, in logical pixels.
pub const BASE_HEIGHT: f64 = 812.0;

/// Viewports at least this wide are treated as tablets.
pub const TABLET_MIN_WIDTH: f64 = 768.0;

/// Damping factor used by [`Scaler::scale_moderate`].
pub const DEFAULT_MODERATE_FACTOR: f64 = 0.5;

/// Current device screen dimensions in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportMetrics {
    /// Viewport width.
    pub width: f64,
    /// Viewport height.
    pub height: f64,
}

impl ViewportMetrics {
    /// Create a viewport snapshot.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Check that both dimensions are finite and positive.
    ///
    /// Scaling itself never fails on a degenerate viewport; this check is for
    /// the places that receive metrics from outside, such as configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidViewport`] for zero, negative or non-finite
    /// dimensions.
    pub fn validate(&self) -> Result<()> {
        let usable = |v: f64| v.is_finite() && v > 0.0;
        if usable(self.width) && usable(self.height) {
            Ok(())
        } else {
            Err(Error::InvalidViewport {
                width: self.width,
                height: self.height,
            })
        }
    }
}

impl Default for ViewportMetrics {
    fn default() -> Self {
        Self::new(BASE_WIDTH, BASE_HEIGHT)
    }
}

/// The design baseline every size is expressed against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleReference {
    /// Reference width in logical pixels.
    pub base_width: f64,
    /// Reference height in logical pixels.
    pub base_height: f64,
}

impl ScaleReference {
    /// The 375x812 reference phone.
    pub const PHONE: Self = Self {
        base_width: BASE_WIDTH,
        base_height: BASE_HEIGHT,
    };
}

impl Default for ScaleReference {
    fn default() -> Self {
        Self::PHONE
    }
}

/// Coarse size bucket of a viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    /// Narrower than the reference phone.
    Small,
    /// Between the reference phone and a tablet.
    Regular,
    /// Tablet-sized or larger.
    Tablet,
}

impl std::fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Small => write!(f, "small"),
            Self::Regular => write!(f, "regular"),
            Self::Tablet => write!(f, "tablet"),
        }
    }
}

/// Maps design-reference sizes to device-relative sizes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scaler {
    viewport: ViewportMetrics,
    reference: ScaleReference,
    pixel_ratio: f64,
}

impl Scaler {
    /// Create a scaler for the given viewport with a pixel ratio of 1.
    #[must_use]
    pub fn new(viewport: ViewportMetrics) -> Self {
        Self {
            viewport,
            reference: ScaleReference::PHONE,
            pixel_ratio: 1.0,
        }
    }

    /// Use the given device pixel ratio when rounding font sizes.
    #[must_use]
    pub fn with_pixel_ratio(mut self, pixel_ratio: f64) -> Self {
        self.pixel_ratio = pixel_ratio;
        self
    }

    /// The viewport this scaler was built with.
    #[must_use]
    pub fn dimensions(&self) -> ViewportMetrics {
        self.viewport
    }

    /// The device pixel ratio used for font rounding.
    #[must_use]
    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    /// Scale a size proportionally to the viewport width.
    #[must_use]
    pub fn scale_width(&self, size: f64) -> f64 {
        (self.viewport.width / self.reference.base_width) * size
    }

    /// Scale a size proportionally to the viewport height.
    #[must_use]
    pub fn scale_height(&self, size: f64) -> f64 {
        (self.viewport.height / self.reference.base_height) * size
    }

    /// Width-scale a font size and round it to a whole pixel.
    ///
    /// The scaled value is first snapped to the nearest device pixel, then to
    /// the nearest integer. Halves round up, so `-2.5` becomes `-2`.
    #[must_use]
    pub fn scale_font_size(&self, size: f64) -> f64 {
        round_half_up(self.round_to_nearest_pixel(self.scale_width(size)))
    }

    /// Width-scale a size with the default damping factor of 0.5.
    #[must_use]
    pub fn scale_moderate(&self, size: f64) -> f64 {
        self.scale_moderate_by(size, DEFAULT_MODERATE_FACTOR)
    }

    /// Interpolate between the unscaled size (`factor = 0`) and the fully
    /// width-scaled size (`factor = 1`).
    #[must_use]
    pub fn scale_moderate_by(&self, size: f64, factor: f64) -> f64 {
        size + (self.scale_width(size) - size) * factor
    }

    /// Whether the viewport is narrower than the reference phone.
    #[must_use]
    pub fn is_small_device(&self) -> bool {
        self.viewport.width < BASE_WIDTH
    }

    /// Whether the viewport is at least tablet width.
    #[must_use]
    pub fn is_large_device(&self) -> bool {
        self.viewport.width >= TABLET_MIN_WIDTH
    }

    /// Same as [`Scaler::is_large_device`].
    #[must_use]
    pub fn is_tablet(&self) -> bool {
        self.is_large_device()
    }

    /// Classify the viewport.
    #[must_use]
    pub fn device_class(&self) -> DeviceClass {
        if self.is_small_device() {
            DeviceClass::Small
        } else if self.is_tablet() {
            DeviceClass::Tablet
        } else {
            DeviceClass::Regular
        }
    }

    /// Percentage of the viewport width.
    #[must_use]
    pub fn wp(&self, percentage: f64) -> f64 {
        (percentage / 100.0) * self.viewport.width
    }

    /// Percentage of the viewport height.
    #[must_use]
    pub fn hp(&self, percentage: f64) -> f64 {
        (percentage / 100.0) * self.viewport.height
    }

    fn round_to_nearest_pixel(&self, size: f64) -> f64 {
        let ratio = if self.pixel_ratio.is_finite() && self.pixel_ratio > 0.0 {
            self.pixel_ratio
        } else {
            1.0
        };
        round_half_up(size * ratio) / ratio
    }
}

impl Default for Scaler {
    fn default() -> Self {
        Self::new(ViewportMetrics::default())
    }
}

/// Nearest integer, halves towards positive infinity.
///
/// Compares against the floor instead of adding `0.5`, which would round
/// before flooring and overshoot just below a half or above 2^52.
fn round_half_up(value: f64) -> f64 {
    let floor = value.floor();
    if value - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

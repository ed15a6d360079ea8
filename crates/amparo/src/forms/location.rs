//! Frequented-location form.

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use super::patterns::is_time_shaped;
use super::{required, FormError, FormResult};

/// What kind of place a location is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationCategory {
    /// Where the person lives.
    PrimaryResidence,
    /// Workplace.
    Work,
    /// Clinic, hospital or pharmacy.
    Health,
    /// Leisure.
    Leisure,
    /// Relatives' homes.
    Family,
    /// Anything else.
    Other,
}

impl LocationCategory {
    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PrimaryResidence => "Residência principal",
            Self::Work => "Trabalho",
            Self::Health => "Saúde",
            Self::Leisure => "Lazer",
            Self::Family => "Família",
            Self::Other => "Outros",
        }
    }
}

impl std::str::FromStr for LocationCategory {
    type Err = FormError;

    fn from_str(s: &str) -> FormResult<Self> {
        match s {
            "primary_residence" | "home" => Ok(Self::PrimaryResidence),
            "work" => Ok(Self::Work),
            "health" => Ok(Self::Health),
            "leisure" => Ok(Self::Leisure),
            "family" => Ok(Self::Family),
            "other" => Ok(Self::Other),
            _ => Err(FormError::Format {
                field: "category",
                expected: "primary_residence|work|health|leisure|family|other",
            }),
        }
    }
}

/// Raw input from the location form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationForm {
    /// Place name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// Person who frequents the place.
    pub associated_to: String,
    /// Selected category, if any.
    pub category: Option<LocationCategory>,
    /// Arrival time, `HH:MM`.
    pub start_time: String,
    /// Departure time, `HH:MM`.
    pub end_time: String,
    /// Selected days.
    #[serde(default)]
    pub days: Vec<Weekday>,
}

/// A validated location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Place name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// Person who frequents the place.
    pub associated_to: String,
    /// Category.
    pub category: LocationCategory,
    /// Arrival time.
    pub start_time: NaiveTime,
    /// Departure time; earlier than `start_time` for overnight stays.
    pub end_time: NaiveTime,
    /// Days of the week, Monday first, without repeats.
    pub days: Vec<Weekday>,
}

impl Location {
    /// Whether the stay runs past midnight.
    #[must_use]
    pub fn is_overnight(&self) -> bool {
        self.end_time < self.start_time
    }
}

impl LocationForm {
    /// Validate the form.
    ///
    /// # Errors
    ///
    /// Returns the [`FormError`] for the first rule the input breaks.
    pub fn validate(&self) -> FormResult<Location> {
        let name = required("location name", &self.name)?;
        let address = required("address", &self.address)?;
        let associated_to = required("associated person", &self.associated_to)?;
        let category = self
            .category
            .ok_or(FormError::Required { field: "category" })?;
        let start_time = parse_time("start time", &self.start_time)?;
        let end_time = parse_time("end time", &self.end_time)?;

        let mut days = self.days.clone();
        days.sort_by_key(Weekday::num_days_from_monday);
        days.dedup();
        if days.is_empty() {
            return Err(FormError::NothingSelected { what: "day" });
        }

        Ok(Location {
            name,
            address,
            associated_to,
            category,
            start_time,
            end_time,
            days,
        })
    }
}

/// Parse a required `HH:MM` field.
pub(super) fn parse_time(field: &'static str, value: &str) -> FormResult<NaiveTime> {
    let text = required(field, value)?;
    if !is_time_shaped(&text) {
        return Err(FormError::Format {
            field,
            expected: "HH:MM",
        });
    }
    NaiveTime::parse_from_str(&text, "%H:%M").map_err(|_| FormError::Format {
        field,
        expected: "HH:MM",
    })
}

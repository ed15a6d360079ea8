//! Reminder form.
//!
//! Weekday numbers follow the picker: `0` is Sunday, `6` is Saturday.

use chrono::{NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use super::location::parse_time;
use super::{required, FormError, FormResult};

const SUNDAY_FIRST: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// How often a reminder fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Frequency {
    /// Every day.
    Daily,
    /// On the listed weekdays, `0..=6` from Sunday.
    Weekly {
        /// Selected weekdays.
        weekdays: Vec<u8>,
    },
    /// On the listed days of the month, `1..=31`.
    Monthly {
        /// Selected days of the month.
        days: Vec<u8>,
    },
}

impl Frequency {
    /// Sort, dedupe and range-check the selected days.
    fn normalized(&self) -> FormResult<Self> {
        match self {
            Self::Daily => Ok(Self::Daily),
            Self::Weekly { weekdays } => {
                let weekdays = select(weekdays, 0..=6, "weekday")?;
                Ok(Self::Weekly { weekdays })
            }
            Self::Monthly { days } => {
                let days = select(days, 1..=31, "day of month")?;
                Ok(Self::Monthly { days })
            }
        }
    }

    /// Short description such as `Semanal: Seg, Qua`.
    #[must_use]
    pub fn label(&self) -> String {
        const NAMES: [&str; 7] = ["Dom", "Seg", "Ter", "Qua", "Qui", "Sex", "Sáb"];
        match self {
            Self::Daily => "Diário".to_string(),
            Self::Weekly { weekdays } => {
                let names: Vec<&str> = weekdays
                    .iter()
                    .filter_map(|d| NAMES.get(usize::from(*d)).copied())
                    .collect();
                format!("Semanal: {}", names.join(", "))
            }
            Self::Monthly { days } => {
                let days: Vec<String> = days.iter().map(u8::to_string).collect();
                format!("Mensal: dias {}", days.join(", "))
            }
        }
    }
}

fn select(
    values: &[u8],
    range: std::ops::RangeInclusive<u8>,
    what: &'static str,
) -> FormResult<Vec<u8>> {
    if let Some(bad) = values.iter().find(|v| !range.contains(*v)) {
        return Err(FormError::OutOfRange {
            field: what,
            value: u32::from(*bad),
        });
    }
    let mut values = values.to_vec();
    values.sort_unstable();
    values.dedup();
    if values.is_empty() {
        return Err(FormError::NothingSelected { what });
    }
    Ok(values)
}

/// Map a picker weekday number to a [`Weekday`].
#[must_use]
pub fn weekday_from_index(index: u8) -> Option<Weekday> {
    SUNDAY_FIRST.get(usize::from(index)).copied()
}

/// Raw input from the reminder form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderForm {
    /// Reminder title.
    pub title: String,
    /// What to do.
    pub description: String,
    /// Person the reminder is for.
    pub associated_to: String,
    /// Fire time, `HH:MM`.
    pub time: String,
    /// Recurrence.
    pub frequency: Frequency,
    /// Whether the reminder is active.
    pub enabled: bool,
}

/// A validated reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    /// Reminder title.
    pub title: String,
    /// What to do.
    pub description: String,
    /// Person the reminder is for.
    pub associated_to: String,
    /// Fire time.
    pub time: NaiveTime,
    /// Recurrence with sorted, unique days.
    pub frequency: Frequency,
    /// Whether the reminder is active.
    pub enabled: bool,
}

impl Reminder {
    /// Zero-padded `HH:MM`.
    #[must_use]
    pub fn time_label(&self) -> String {
        format!("{:02}:{:02}", self.time.hour(), self.time.minute())
    }

    /// Whether saving must first ask for notification permission.
    #[must_use]
    pub fn requires_permission(&self, granted: bool) -> bool {
        self.enabled && !granted
    }

    /// Weekdays the reminder fires on, if weekly.
    #[must_use]
    pub fn weekdays(&self) -> Vec<Weekday> {
        match &self.frequency {
            Frequency::Weekly { weekdays } => weekdays
                .iter()
                .filter_map(|d| weekday_from_index(*d))
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl ReminderForm {
    /// Validate the form.
    ///
    /// # Errors
    ///
    /// Returns the [`FormError`] for the first rule the input breaks.
    pub fn validate(&self) -> FormResult<Reminder> {
        let title = required("title", &self.title)?;
        let description = required("description", &self.description)?;
        let associated_to = required("associated person", &self.associated_to)?;
        let time = parse_time("time", &self.time)?;
        let frequency = self.frequency.normalized()?;

        Ok(Reminder {
            title,
            description,
            associated_to,
            time,
            frequency,
            enabled: self.enabled,
        })
    }
}

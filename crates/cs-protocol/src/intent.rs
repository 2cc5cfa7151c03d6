use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Structured action inferred from free-text input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NlIntent {
    /// Create a reminder due on a calendar date.
    ReminderByDate {
        date: NaiveDate,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        notes: Option<String>,
    },
    /// Create a reminder due at an odometer reading.
    ReminderByDistance {
        distance: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        notes: Option<String>,
    },
    /// Log a service record.
    Service {
        service_type: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        date: Option<NaiveDate>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        distance: Option<u32>,
    },
    /// Nothing actionable; hand the text to the chat responder.
    None,
}

impl NlIntent {
    pub fn is_actionable(&self) -> bool {
        !matches!(self, Self::None)
    }
}

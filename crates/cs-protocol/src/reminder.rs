use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::vehicle::VehicleId;

/// What triggers a reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReminderKind {
    /// Fires on a calendar date.
    #[serde(rename = "date")]
    ByDate,
    /// Fires when the odometer reaches a reading.
    #[serde(rename = "odometer")]
    ByDistance,
}

impl ReminderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ByDate => "date",
            Self::ByDistance => "odometer",
        }
    }
}

impl std::fmt::Display for ReminderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored reminder. Single representation shared by manual entries,
/// recommendation shortcuts and chat-created reminders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: Uuid,
    pub vehicle_id: VehicleId,
    pub kind: ReminderKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    /// Odometer reading (km) at which the reminder is due.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_distance: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_on: NaiveDate,
    #[serde(default)]
    pub done: bool,
}

/// Rejected reminder payloads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReminderError {
    #[error("due_date is required for date reminders")]
    MissingDueDate,

    #[error("due_distance is required for odometer reminders")]
    MissingDueDistance,
}

/// Payload for creating a reminder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReminder {
    pub vehicle_id: VehicleId,
    pub kind: ReminderKind,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub due_distance: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewReminder {
    pub fn by_date(vehicle_id: VehicleId, due_date: NaiveDate, notes: Option<String>) -> Self {
        Self {
            vehicle_id,
            kind: ReminderKind::ByDate,
            due_date: Some(due_date),
            due_distance: None,
            notes,
        }
    }

    pub fn by_distance(vehicle_id: VehicleId, due_distance: u32, notes: Option<String>) -> Self {
        Self {
            vehicle_id,
            kind: ReminderKind::ByDistance,
            due_date: None,
            due_distance: Some(due_distance),
            notes,
        }
    }

    /// Check that the field required by `kind` is present.
    pub fn validate(&self) -> Result<(), ReminderError> {
        match self.kind {
            ReminderKind::ByDate if self.due_date.is_none() => Err(ReminderError::MissingDueDate),
            ReminderKind::ByDistance if self.due_distance.is_none() => {
                Err(ReminderError::MissingDueDistance)
            }
            _ => Ok(()),
        }
    }

    /// Validate and materialize into a [`Reminder`] created on `today`.
    pub fn into_reminder(self, today: NaiveDate) -> Result<Reminder, ReminderError> {
        self.validate()?;
        Ok(Reminder {
            id: Uuid::now_v7(),
            vehicle_id: self.vehicle_id,
            kind: self.kind,
            due_date: self.due_date,
            due_distance: self.due_distance,
            notes: self.notes,
            created_on: today,
            done: false,
        })
    }
}

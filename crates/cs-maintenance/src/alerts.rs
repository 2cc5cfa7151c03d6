//! Reminder alert selection.

use chrono::NaiveDate;
use cs_protocol::{Reminder, Vehicle};
use serde::{Deserialize, Serialize};

/// How close a reminder must be to count as an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertWindow {
    #[serde(default = "default_days")]
    pub days: i64,
    #[serde(default = "default_distance")]
    pub distance: i64,
}

fn default_days() -> i64 {
    7
}

fn default_distance() -> i64 {
    500
}

impl Default for AlertWindow {
    fn default() -> Self {
        Self {
            days: default_days(),
            distance: default_distance(),
        }
    }
}

/// Open reminders of `vehicle` that are due within the window.
///
/// A reminder alerts when its due date is at most `window.days` away
/// (past dates included) or its due distance is at most
/// `window.distance` km above the odometer (passed readings included).
/// Completed reminders never alert. Input order is preserved.
pub fn due_alerts<'a>(
    reminders: &'a [Reminder],
    vehicle: &Vehicle,
    today: NaiveDate,
    window: AlertWindow,
) -> Vec<&'a Reminder> {
    reminders
        .iter()
        .filter(|r| r.vehicle_id == vehicle.id && !r.done)
        .filter(|r| {
            let by_date = r
                .due_date
                .is_some_and(|d| (d - today).num_days() <= window.days);
            let by_distance = r
                .due_distance
                .is_some_and(|km| i64::from(km) - i64::from(vehicle.odometer) <= window.distance);
            by_date || by_distance
        })
        .collect()
}

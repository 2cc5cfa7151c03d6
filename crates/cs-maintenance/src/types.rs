//! Derived recommendation types.

use chrono::NaiveDate;
use cs_protocol::{NewReminder, ReminderKind, VehicleId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::rules::MaintenanceRule;

// ── Due status ────────────────────────────────────────────────

/// Urgency of a rule relative to the current vehicle state.
///
/// Variant declaration order matters: `#[derive(Ord)]` uses it,
/// so Overdue < Soon < Ok and sorting puts the most urgent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DueStatus {
    Overdue,
    Soon,
    Ok,
}

impl DueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Overdue => "overdue",
            Self::Soon => "soon",
            Self::Ok => "ok",
        }
    }
}

impl std::fmt::Display for DueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Recommendation ────────────────────────────────────────────

/// Most recent service record matching a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastService {
    pub record_id: Uuid,
    pub distance: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

/// Per-rule due projection. Recomputed on every request, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub rule: MaintenanceRule,
    /// Odometer reading (km) at which the task is next due.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_distance: Option<u32>,
    /// Calendar date at which the task is next due (earlier of the
    /// distance-based and time-based projections).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    /// `due_distance - odometer`; negative when overdue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_distance: Option<i64>,
    pub status: DueStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<LastService>,
}

impl Recommendation {
    /// Reminder draft for the "remind me" action on this recommendation.
    ///
    /// Date-based when a due date exists (keeping the due distance too),
    /// distance-based otherwise. None when the rule projects nothing.
    pub fn to_reminder_draft(&self, vehicle_id: VehicleId) -> Option<NewReminder> {
        let kind = match (self.due_date, self.due_distance) {
            (Some(_), _) => ReminderKind::ByDate,
            (None, Some(_)) => ReminderKind::ByDistance,
            (None, None) => return None,
        };
        Some(NewReminder {
            vehicle_id,
            kind,
            due_date: self.due_date,
            due_distance: self.due_distance,
            notes: Some(self.rule.key.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reco(due_date: Option<NaiveDate>, due_distance: Option<u32>) -> Recommendation {
        Recommendation {
            rule: crate::rules::RuleTable::default().rules()[1].clone(),
            due_distance,
            due_date,
            remaining_distance: None,
            status: DueStatus::Ok,
            last: None,
        }
    }

    #[test]
    fn status_orders_by_severity() {
        let mut statuses = vec![DueStatus::Ok, DueStatus::Overdue, DueStatus::Soon];
        statuses.sort();
        assert_eq!(
            statuses,
            vec![DueStatus::Overdue, DueStatus::Soon, DueStatus::Ok]
        );
    }

    #[test]
    fn reminder_draft_prefers_date() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let draft = reco(Some(date), Some(56_000))
            .to_reminder_draft(VehicleId(Uuid::nil()))
            .unwrap();
        assert_eq!(draft.kind, ReminderKind::ByDate);
        assert_eq!(draft.due_date, Some(date));
        assert_eq!(draft.due_distance, Some(56_000));
        assert_eq!(draft.notes.as_deref(), Some("Cambio de aceite"));
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn reminder_draft_distance_only() {
        let draft = reco(None, Some(56_000))
            .to_reminder_draft(VehicleId(Uuid::nil()))
            .unwrap();
        assert_eq!(draft.kind, ReminderKind::ByDistance);
    }

    #[test]
    fn reminder_draft_none_without_projection() {
        assert!(reco(None, None).to_reminder_draft(VehicleId(Uuid::nil())).is_none());
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&DueStatus::Overdue).unwrap(),
            r#""overdue""#
        );
    }
}

//! Service-entry planning.
//!
//! Turns a user's "I did X" entry into a service record draft, annotated
//! with the next suggested occurrence when X matches a catalogue rule, and
//! drafts quick-add records for overdue recommendations.

use chrono::NaiveDate;
use cs_protocol::{NewReminder, NewServiceRecord, ReminderKind, ServiceRecord, Vehicle};
use serde::{Deserialize, Serialize};

use crate::normalize::{add_months, format_km};
use crate::rules::RuleTable;
use crate::types::{DueStatus, Recommendation};

/// Notes attached to records drafted by [`overdue_autofill`].
pub const AUTOFILL_NOTE: &str = "Agregado automáticamente (vencido)";

/// Raw service entry as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceEntry {
    pub service_type: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Odometer reading at service time; defaults to the vehicle odometer.
    #[serde(default)]
    pub distance: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Result of planning a service entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServicePlan {
    pub record: NewServiceRecord,
    /// Reminder for the next occurrence, when the entry matched a rule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_up: Option<NewReminder>,
}

/// Build the record (and follow-up reminder) for a service entry.
///
/// When the service type matches a rule, the next occurrence is projected
/// from the entry (`distance + interval`, `date + months`, today when the
/// entry is undated) and appended to the notes as
/// `"<notes> | Siguiente sugerido: <date|—> (~<km> km)"`.
pub fn plan_service_entry(
    table: &RuleTable,
    vehicle: &Vehicle,
    entry: ServiceEntry,
    today: NaiveDate,
) -> ServicePlan {
    let distance = entry.distance.unwrap_or(vehicle.odometer);
    let notes = entry
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(String::from);

    let Some(rule) = table.match_rule_name(&entry.service_type) else {
        return ServicePlan {
            record: NewServiceRecord {
                vehicle_id: vehicle.id,
                service_type: entry.service_type,
                date: entry.date,
                distance,
                notes,
            },
            follow_up: None,
        };
    };

    let next_distance = rule
        .distance_interval
        .map(|interval| distance.saturating_add(interval));
    let next_date = rule
        .months_interval
        .and_then(|months| add_months(entry.date.unwrap_or(today), months));

    let mut suggestion = format!(
        "{} | Siguiente sugerido: {}",
        notes.as_deref().unwrap_or("—"),
        next_date.map_or_else(|| "—".to_string(), |d| d.to_string()),
    );
    if let Some(km) = next_distance {
        suggestion.push_str(&format!(" (~{} km)", format_km(km)));
    }

    let follow_up = match (next_date, next_distance) {
        (None, None) => None,
        (date, km) => Some(NewReminder {
            vehicle_id: vehicle.id,
            kind: if date.is_some() {
                ReminderKind::ByDate
            } else {
                ReminderKind::ByDistance
            },
            due_date: date,
            due_distance: km,
            notes: Some(entry.service_type.clone()),
        }),
    };

    tracing::debug!(
        vehicle_id = %vehicle.id,
        service_type = %entry.service_type,
        rule = %rule.key,
        "service entry matched rule"
    );

    ServicePlan {
        record: NewServiceRecord {
            vehicle_id: vehicle.id,
            service_type: entry.service_type,
            date: entry.date,
            distance,
            notes: Some(suggestion),
        },
        follow_up,
    }
}

/// Draft one record per overdue recommendation, dated `today` at the
/// current odometer.
///
/// Only vehicles with service history get drafts (a fresh vehicle's
/// never-serviced rules are not assumed done). Rules that already have a
/// record dated `today` are skipped.
pub fn overdue_autofill(
    table: &RuleTable,
    recommendations: &[Recommendation],
    vehicle: &Vehicle,
    history: &[ServiceRecord],
    today: NaiveDate,
) -> Vec<NewServiceRecord> {
    let own: Vec<&ServiceRecord> = history
        .iter()
        .filter(|s| s.vehicle_id == vehicle.id)
        .collect();
    if own.is_empty() {
        return Vec::new();
    }

    recommendations
        .iter()
        .filter(|r| r.status == DueStatus::Overdue)
        .filter(|r| {
            !own.iter().any(|s| {
                s.date == Some(today) && table.canonical_key(&s.service_type) == r.rule.key
            })
        })
        .map(|r| NewServiceRecord {
            vehicle_id: vehicle.id,
            service_type: r.rule.key.clone(),
            date: Some(today),
            distance: vehicle.odometer,
            notes: Some(AUTOFILL_NOTE.into()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RecommendationEngine;
    use cs_protocol::VehicleId;
    use uuid::Uuid;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn vehicle() -> Vehicle {
        Vehicle {
            id: VehicleId(Uuid::from_u128(1)),
            make: "Toyota".into(),
            model: "Corolla".into(),
            year: Some(2018),
            odometer: 45_000,
            vin: None,
            first_seen: None,
        }
    }

    fn record(service_type: &str, date: NaiveDate, distance: u32) -> ServiceRecord {
        ServiceRecord {
            id: Uuid::now_v7(),
            vehicle_id: VehicleId(Uuid::from_u128(1)),
            service_type: service_type.into(),
            date: Some(date),
            distance,
            notes: None,
        }
    }

    #[test]
    fn matched_entry_gets_suggestion_and_follow_up() {
        let entry = ServiceEntry {
            service_type: "Cambio de aceite".into(),
            date: NaiveDate::from_ymd_opt(2024, 5, 20),
            distance: Some(40_000),
            notes: Some("  sintético 5W30 ".into()),
        };
        let plan = plan_service_entry(&RuleTable::default(), &vehicle(), entry, today());
        assert_eq!(plan.record.distance, 40_000);
        assert_eq!(
            plan.record.notes.as_deref(),
            Some("sintético 5W30 | Siguiente sugerido: 2024-11-20 (~48,000 km)")
        );
        let follow_up = plan.follow_up.unwrap();
        assert_eq!(follow_up.kind, ReminderKind::ByDate);
        assert_eq!(follow_up.due_date, NaiveDate::from_ymd_opt(2024, 11, 20));
        assert_eq!(follow_up.due_distance, Some(48_000));
        assert!(follow_up.validate().is_ok());
    }

    #[test]
    fn undated_entry_defaults_to_odometer_and_today() {
        let entry = ServiceEntry {
            service_type: "rotacion".into(),
            ..Default::default()
        };
        let plan = plan_service_entry(&RuleTable::default(), &vehicle(), entry, today());
        assert_eq!(plan.record.distance, 45_000);
        assert!(plan.record.date.is_none());
        assert_eq!(
            plan.record.notes.as_deref(),
            Some("— | Siguiente sugerido: 2025-06-01 (~57,000 km)")
        );
    }

    #[test]
    fn unmatched_entry_is_passed_through() {
        let entry = ServiceEntry {
            service_type: "Lavado".into(),
            date: Some(today()),
            distance: None,
            notes: Some("   ".into()),
        };
        let plan = plan_service_entry(&RuleTable::default(), &vehicle(), entry, today());
        assert_eq!(plan.record.service_type, "Lavado");
        assert!(plan.record.notes.is_none());
        assert!(plan.follow_up.is_none());
    }

    #[test]
    fn autofill_drafts_overdue_rules_only() {
        let table = RuleTable::default();
        let history = vec![record("aceite", NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), 30_000)];
        let recos = RecommendationEngine::default().build(&vehicle(), &history, 35.0, today());
        let drafts = overdue_autofill(&table, &recos, &vehicle(), &history, today());
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].service_type, "Cambio de aceite");
        assert_eq!(drafts[0].date, Some(today()));
        assert_eq!(drafts[0].distance, 45_000);
        assert_eq!(drafts[0].notes.as_deref(), Some(AUTOFILL_NOTE));
    }

    #[test]
    fn autofill_skips_rules_serviced_today() {
        let table = RuleTable::default();
        let history = vec![record("aceite", NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), 30_000)];
        let recos = RecommendationEngine::default().build(&vehicle(), &history, 35.0, today());

        let mut with_today = history.clone();
        with_today.push(record("Cambio de aceite", today(), 45_000));
        let drafts = overdue_autofill(&table, &recos, &vehicle(), &with_today, today());
        assert!(drafts.is_empty());
    }

    #[test]
    fn autofill_requires_history() {
        let table = RuleTable::default();
        let recos = RecommendationEngine::default().build(&vehicle(), &[], 35.0, today());
        assert!(overdue_autofill(&table, &recos, &vehicle(), &[], today()).is_empty());
    }
}

//! Recommendation engine: per-rule due projection and urgency.
//!
//! For every rule in the catalogue:
//! - find the vehicle's most recent matching service record;
//! - project the due odometer reading (last + interval, or the next strict
//!   multiple of the interval above the current odometer when there is no
//!   record);
//! - project a due date from the distance side (remaining km / km-per-day)
//!   and from the time side (last date + months), keeping the earlier;
//! - classify as overdue / soon / ok.
//!
//! Output is sorted most-urgent first, then by remaining km.

use std::cmp::Ordering;

use chrono::{NaiveDate, TimeDelta};
use cs_protocol::{ServiceRecord, Vehicle};
use serde::{Deserialize, Serialize};

use crate::normalize::add_months;
use crate::rules::{MaintenanceRule, RuleTable};
use crate::types::{DueStatus, LastService, Recommendation};

/// Tunable thresholds of the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Days after `first_seen` during which never-serviced rules stay OK.
    #[serde(default = "default_grace_period_days")]
    pub grace_period_days: i64,
    /// Remaining km at or below which a rule is "soon".
    #[serde(default = "default_soon_distance")]
    pub soon_distance: i64,
    /// Remaining days at or below which a rule is "soon".
    #[serde(default = "default_soon_days")]
    pub soon_days: i64,
}

fn default_grace_period_days() -> i64 {
    14
}

fn default_soon_distance() -> i64 {
    1000
}

fn default_soon_days() -> i64 {
    30
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            grace_period_days: default_grace_period_days(),
            soon_distance: default_soon_distance(),
            soon_days: default_soon_days(),
        }
    }
}

/// Round `value` up to the next multiple of `step`, strictly greater than
/// `value` (an exact multiple advances one more step).
pub fn next_upper_strict(value: u32, step: u32) -> u32 {
    if step == 0 {
        return value;
    }
    let (value, step) = (u64::from(value), u64::from(step));
    let mut next = value.div_ceil(step) * step;
    if next <= value {
        next += step;
    }
    u32::try_from(next).unwrap_or(u32::MAX)
}

/// Rule table plus thresholds. Stateless between calls.
#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    table: RuleTable,
    settings: EngineSettings,
}

impl RecommendationEngine {
    pub fn new(table: RuleTable, settings: EngineSettings) -> Self {
        Self { table, settings }
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Whether the vehicle is still inside its new-vehicle grace period.
    pub fn in_grace_period(&self, vehicle: &Vehicle, today: NaiveDate) -> bool {
        vehicle
            .first_seen
            .is_some_and(|seen| (today - seen).num_days() < self.settings.grace_period_days)
    }

    /// Build the sorted recommendation list for `vehicle`.
    ///
    /// `history` may contain records of other vehicles; they are ignored.
    /// `daily_rate` is the km/day estimate (see
    /// [`estimate_daily_distance`](crate::estimator::estimate_daily_distance)).
    pub fn build(
        &self,
        vehicle: &Vehicle,
        history: &[ServiceRecord],
        daily_rate: f64,
        today: NaiveDate,
    ) -> Vec<Recommendation> {
        let fresh = self.in_grace_period(vehicle, today);

        let mut recos: Vec<Recommendation> = self
            .table
            .rules()
            .iter()
            .map(|rule| self.recommend(rule, vehicle, history, daily_rate, today, fresh))
            .collect();

        recos.sort_by(|a, b| {
            a.status
                .cmp(&b.status)
                .then_with(|| cmp_remaining(a.remaining_distance, b.remaining_distance))
        });

        tracing::debug!(
            vehicle_id = %vehicle.id,
            overdue = recos.iter().filter(|r| r.status == DueStatus::Overdue).count(),
            soon = recos.iter().filter(|r| r.status == DueStatus::Soon).count(),
            daily_rate,
            "recommendations built"
        );

        recos
    }

    fn recommend(
        &self,
        rule: &MaintenanceRule,
        vehicle: &Vehicle,
        history: &[ServiceRecord],
        daily_rate: f64,
        today: NaiveDate,
        fresh: bool,
    ) -> Recommendation {
        let odometer = vehicle.odometer;

        let mut matching: Vec<&ServiceRecord> = history
            .iter()
            .filter(|s| s.vehicle_id == vehicle.id)
            .filter(|s| self.table.canonical_key(&s.service_type) == rule.key)
            .collect();
        // Undated records sort first, like an empty date string would.
        matching.sort_by_key(|s| s.date);
        let last = matching.last().copied();

        let due_distance = rule.distance_interval.map(|interval| match last {
            Some(record) => record.distance.saturating_add(interval),
            None => next_upper_strict(odometer, interval),
        });

        let remaining_distance = due_distance.map(|due| i64::from(due) - i64::from(odometer));

        let date_by_distance = remaining_distance.and_then(|remaining| {
            let days = (remaining as f64 / daily_rate.max(1.0)).ceil().max(0.0);
            today.checked_add_signed(TimeDelta::try_days(days as i64)?)
        });

        let date_by_months = rule.months_interval.and_then(|months| {
            let base = last.and_then(|s| s.date).unwrap_or(today);
            add_months(base, months)
        });

        let due_date = match (date_by_distance, date_by_months) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };

        let days_to_due = due_date.map(|d| (d - today).num_days());
        let status = self.classify(last.is_some(), fresh, remaining_distance, days_to_due);

        Recommendation {
            rule: rule.clone(),
            due_distance,
            due_date,
            remaining_distance,
            status,
            last: last.map(|s| LastService {
                record_id: s.id,
                distance: s.distance,
                date: s.date,
            }),
        }
    }

    fn classify(
        &self,
        has_last: bool,
        fresh: bool,
        remaining_distance: Option<i64>,
        days_to_due: Option<i64>,
    ) -> DueStatus {
        let soon = remaining_distance.is_some_and(|r| r <= self.settings.soon_distance)
            || days_to_due.is_some_and(|d| d <= self.settings.soon_days);

        if !has_last {
            // Never-serviced rules are never overdue.
            return if !fresh && soon {
                DueStatus::Soon
            } else {
                DueStatus::Ok
            };
        }

        let overdue =
            remaining_distance.is_some_and(|r| r <= 0) || days_to_due.is_some_and(|d| d <= 0);
        if overdue {
            DueStatus::Overdue
        } else if soon {
            DueStatus::Soon
        } else {
            DueStatus::Ok
        }
    }
}

/// Ascending remaining km, missing values last.
fn cmp_remaining(a: Option<i64>, b: Option<i64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

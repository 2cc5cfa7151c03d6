//! Average km/day estimate from service history.

use cs_protocol::ServiceRecord;

/// Lowest history-derived rate accepted as plausible (km/day).
pub const MIN_HISTORY_RATE: f64 = 5.0;
/// Cap on history-derived rates (km/day).
pub const MAX_HISTORY_RATE: f64 = 200.0;
/// Clamp range for the odometer/365 heuristic (km/day).
pub const ODOMETER_RATE_RANGE: (f64, f64) = (20.0, 120.0);
/// Rate used when there is no usable data at all (km/day).
pub const DEFAULT_RATE: f64 = 35.0;

/// Estimate how many km per day the vehicle is driven.
///
/// With two or more dated records with a positive reading, uses the
/// spread between the earliest and the latest (elapsed days floored at 1,
/// km delta floored at 0). Rates of 5 km/day or less fall through to the
/// odometer heuristic (odometer / 365, clamped to 20..=120), and with no
/// odometer either the fixed default of 35 applies.
pub fn estimate_daily_distance(history: &[ServiceRecord], current_odometer: u32) -> f64 {
    let mut dated: Vec<_> = history
        .iter()
        .filter(|s| s.distance > 0)
        .filter_map(|s| s.date.map(|d| (d, s.distance)))
        .collect();
    dated.sort_by_key(|(date, _)| *date);

    if let (Some(first), Some(last)) = (dated.first(), dated.last())
        && dated.len() >= 2
    {
        let days = (last.0 - first.0).num_days().max(1) as f64;
        let delta = (i64::from(last.1) - i64::from(first.1)).max(0) as f64;
        let rate = delta / days;
        if rate.is_finite() && rate > MIN_HISTORY_RATE {
            return rate.min(MAX_HISTORY_RATE);
        }
        tracing::debug!(rate, "history rate implausible, using odometer heuristic");
    }

    if current_odometer > 0 {
        let (lo, hi) = ODOMETER_RATE_RANGE;
        return (f64::from(current_odometer) / 365.0).clamp(lo, hi);
    }

    DEFAULT_RATE
}

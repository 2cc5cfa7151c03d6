//! Date extraction from free Spanish text, relative to an injected `today`.

use chrono::{Datelike, Days, NaiveDate};
use cs_maintenance::normalize::add_months;
use regex::Regex;
use std::sync::LazyLock;

static RE_TODAY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bhoy\b").unwrap());

static RE_TOMORROW: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bmañana\b").unwrap());

static RE_RELATIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\ben\s+(\d+)\s*(d[ií]as|semanas|meses)\b").unwrap()
});

static RE_ISO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").unwrap());

// D/M, D-M, optionally followed by a 2–4 digit year
static RE_DAY_MONTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})[/\-](\d{1,2})(?:[/\-](\d{2,4}))?\b").unwrap()
});

/// Extract a calendar date from user text.
///
/// Checked in order: `hoy`, `mañana`, `en N días|semanas|meses`, ISO
/// `YYYY-MM-DD`, then `D/M[/YY[YY]]` (also with `-`). Two-digit years are
/// 20xx; a D/M without year that falls before `today` rolls over to next
/// year. Impossible calendar dates yield `None`.
pub fn parse_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let low = text.to_lowercase();

    if RE_TODAY.is_match(&low) {
        return Some(today);
    }
    if RE_TOMORROW.is_match(&low) {
        return today.checked_add_days(Days::new(1));
    }

    if let Some(caps) = RE_RELATIVE.captures(&low) {
        let n: u32 = caps[1].parse().ok()?;
        let unit = &caps[2];
        return if unit.starts_with('d') {
            today.checked_add_days(Days::new(u64::from(n)))
        } else if unit == "semanas" {
            today.checked_add_days(Days::new(u64::from(n) * 7))
        } else {
            add_months(today, n)
        };
    }

    if let Some(caps) = RE_ISO.captures(&low) {
        return NaiveDate::from_ymd_opt(
            caps[1].parse().ok()?,
            caps[2].parse().ok()?,
            caps[3].parse().ok()?,
        );
    }

    let caps = RE_DAY_MONTH.captures(&low)?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    match caps.get(3) {
        Some(year) => {
            let mut year: i32 = year.as_str().parse().ok()?;
            if year < 100 {
                year += 2000;
            }
            NaiveDate::from_ymd_opt(year, month, day)
        }
        None => {
            let candidate = NaiveDate::from_ymd_opt(today.year(), month, day)?;
            if candidate < today {
                candidate.with_year(today.year() + 1)
            } else {
                Some(candidate)
            }
        }
    }
}

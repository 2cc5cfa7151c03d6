//! Intent detection: does the user want a reminder, a service record, or
//! just an answer?

use chrono::{Days, NaiveDate};
use cs_protocol::NlIntent;
use regex::Regex;
use std::sync::LazyLock;

use super::{parse_date, parse_distance};

static RE_REMINDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(recu[eé]rdame|recordatorio|av[ií]same|agenda(r)?)").unwrap());

static RE_SERVICE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(registrar|crear|agregar|añadir)\s+(servicio|mantenimiento)|\bservicio\s+de\b")
        .unwrap()
});

/// Keyword → label pairs, first contained keyword wins.
const SERVICE_LABELS: &[(&str, &str)] = &[
    ("aceite", "aceite"),
    ("freno", "frenos"),
    ("bater", "batería"),
    ("llanta", "llantas"),
    ("neum", "llantas"),
    ("filtro", "filtro"),
    ("rotaci", "rotación de llantas"),
    ("aline", "alineación"),
    ("balance", "balanceo"),
    ("anticong", "anticongelante"),
    ("refriger", "refrigerante"),
];

const GENERIC_SERVICE: &str = "servicio";

/// Days ahead for a reminder request that names no date or distance.
const DEFAULT_REMINDER_DAYS: u64 = 7;

fn service_label(low: &str) -> Option<&'static str> {
    SERVICE_LABELS
        .iter()
        .find(|(keyword, _)| low.contains(keyword))
        .map(|(_, label)| *label)
        .or_else(|| low.contains(GENERIC_SERVICE).then_some(GENERIC_SERVICE))
}

/// Classify user text as a reminder request, a service entry, or nothing.
///
/// Reminder triggers win over service triggers. A reminder prefers a
/// distance over a date and falls back to `today + 7` when neither is
/// present. A service entry needs a label, or at least a date or distance
/// to be logged as a generic "servicio".
pub fn detect_intent(text: &str, today: NaiveDate) -> NlIntent {
    let low = text.to_lowercase();
    let is_reminder = RE_REMINDER.is_match(&low);
    let is_service = RE_SERVICE.is_match(&low);

    let distance = parse_distance(&low);
    let date = parse_date(&low, today);
    let label = service_label(&low);

    if is_reminder {
        let notes = label.map(String::from);
        if let Some(distance) = distance {
            return NlIntent::ReminderByDistance { distance, notes };
        }
        return match date.or_else(|| today.checked_add_days(Days::new(DEFAULT_REMINDER_DAYS))) {
            Some(date) => NlIntent::ReminderByDate { date, notes },
            None => NlIntent::None,
        };
    }

    if is_service {
        let label = label.or((date.is_some() || distance.is_some()).then_some(GENERIC_SERVICE));
        if let Some(label) = label {
            return NlIntent::Service {
                service_type: label.into(),
                date,
                distance: distance.filter(|km| *km > 0),
            };
        }
    }

    NlIntent::None
}

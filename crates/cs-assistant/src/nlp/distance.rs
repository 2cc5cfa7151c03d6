//! Distance extraction from free text.

use regex::Regex;
use std::sync::LazyLock;

// Grouped or plain readings: 12.000 / 12,000 / 12000 (whitespace removed first)
static RE_GROUPED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,3}(?:[.,]?\d{3})+|\d{3,}").unwrap());

// Thousands shorthand: 15k / 1.5k / 2,5 k
static RE_THOUSANDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s?k\b").unwrap());

/// Extract a distance in km from user text.
///
/// Whitespace (including non-breaking spaces) is removed before looking
/// for a grouped number of three or more digits, whose `.`/`,` separators
/// are dropped. The number must end the text, precede a non-word
/// character, or carry a `km` suffix; "en 120 días" is a date, not a
/// distance. Otherwise a `k` suffix multiplies by 1000, with `,`
/// accepted as decimal point.
pub fn parse_distance(text: &str) -> Option<u32> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();

    if let Some(m) = RE_GROUPED
        .find_iter(&compact)
        .find(|m| ends_reading(&compact[m.end()..]))
    {
        let digits: String = m.as_str().chars().filter(char::is_ascii_digit).collect();
        return digits.parse().ok();
    }

    let caps = RE_THOUSANDS.captures(text)?;
    let value: f64 = caps[1].replace(',', ".").parse().ok()?;
    let km = (value * 1000.0).round();
    (km.is_finite() && km <= f64::from(u32::MAX)).then_some(km as u32)
}

/// Whether `rest` (the compact text after a number) closes a reading.
fn ends_reading(rest: &str) -> bool {
    let mut chars = rest.chars();
    match chars.next() {
        None => true,
        Some('k' | 'K') => matches!(chars.next(), Some('m' | 'M')),
        Some(c) => !(c.is_alphanumeric() || c == '_'),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_shorthand() {
        assert_eq!(parse_distance("15k"), Some(15_000));
        assert_eq!(parse_distance("a los 15 K"), Some(15_000));
        assert_eq!(parse_distance("1.5k"), Some(1_500));
        assert_eq!(parse_distance("2,5 k"), Some(2_500));
    }

    #[test]
    fn grouped_numbers() {
        assert_eq!(parse_distance("12,000 km"), Some(12_000));
        assert_eq!(parse_distance("12.000km"), Some(12_000));
        assert_eq!(parse_distance("a los 45200"), Some(45_200));
        assert_eq!(parse_distance("1.234.567 km"), Some(1_234_567));
    }

    #[test]
    fn spaces_inside_numbers_are_ignored() {
        assert_eq!(parse_distance("15 000 km"), Some(15_000));
        assert_eq!(parse_distance("15\u{a0}000"), Some(15_000));
    }

    #[test]
    fn short_numbers_are_not_distances() {
        assert_eq!(parse_distance("en 7 dias"), None);
        assert_eq!(parse_distance("15/03"), None);
        assert_eq!(parse_distance("sin números"), None);
    }

    #[test]
    fn reading_followed_by_more_words() {
        assert_eq!(parse_distance("a los 50,000 km para frenos"), Some(50_000));
        assert_eq!(parse_distance("a los 45200, por favor"), Some(45_200));
        assert_eq!(parse_distance("150k para la banda"), Some(150_000));
        assert_eq!(parse_distance("150KM"), Some(150));
    }

    #[test]
    fn day_counts_are_not_distances() {
        assert_eq!(parse_distance("en 120 días"), None);
        assert_eq!(parse_distance("revisar llantas en 365 dias"), None);
        assert_eq!(parse_distance("en 120 días, a los 60,000 km"), Some(60_000));
    }

    #[test]
    fn km_suffix_without_group_is_ignored() {
        // two digits and "km" are neither grouped nor a "k" shorthand
        assert_eq!(parse_distance("50km"), None);
    }
}

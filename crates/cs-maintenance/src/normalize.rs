//! Text and calendar helpers shared by the rule matcher and the engine.

use chrono::{Months, NaiveDate};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Lowercase `input` and strip diacritics ("Líquido" → "liquido").
///
/// Decomposes to NFD and drops combining marks, so "ñ" becomes "n".
/// Locale independent.
pub fn fold(input: &str) -> String {
    input
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// Calendar month advance, clamped to the last day of the target month
/// (2024-01-31 + 1 month = 2024-02-29).
pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}

/// Group thousands with commas, es-MX style: 48000 → "48,000".
pub fn format_km(value: u32) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_strips_accents_and_case() {
        assert_eq!(fold("Líquido de FRENOS"), "liquido de frenos");
        assert_eq!(fold("Cambié el filtro"), "cambie el filtro");
        assert_eq!(fold("Mañana"), "manana");
        assert_eq!(fold("Bujías"), "bujias");
    }

    #[test]
    fn add_months_clamps_to_month_end() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(add_months(d, 1), NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(add_months(d, 12), NaiveDate::from_ymd_opt(2025, 1, 31));
    }

    #[test]
    fn format_km_groups_thousands() {
        assert_eq!(format_km(0), "0");
        assert_eq!(format_km(950), "950");
        assert_eq!(format_km(8000), "8,000");
        assert_eq!(format_km(1_234_567), "1,234,567");
    }
}

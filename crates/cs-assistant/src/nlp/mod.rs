//! Offline Spanish intent parsing.
//!
//! Three pure functions, each taking the reference date explicitly where
//! it matters:
//! - [`parse_distance`]: "15k", "12,000 km", "15 000" → km.
//! - [`parse_date`]: "hoy", "mañana", "en 2 semanas", "2024-03-15", "15/03".
//! - [`detect_intent`]: reminder / service / nothing.

pub mod date;
pub mod distance;
pub mod intent;

pub use date::parse_date;
pub use distance::parse_distance;
pub use intent::detect_intent;

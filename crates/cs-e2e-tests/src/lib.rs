//! End-to-end tests for CarSense live under `tests/`; this crate has no
//! library code of its own.

//! End-to-end tests for the covariance steering pipeline live in
//! `tests/`; this crate intentionally exports nothing.

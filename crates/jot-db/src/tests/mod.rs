//! Integration tests for the PostgreSQL note store.
//!
//! All tests here require a running PostgreSQL instance and are marked
//! `#[ignore]`; run them with `cargo test -- --ignored` against the
//! database configured by `DATABASE_URL` (see `test_fixtures`).

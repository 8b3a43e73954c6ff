//! Integration tests for the scraper and the backup runner
//!
//! These tests use wiremock to create mock HTTP servers and exercise the
//! retry layer, the pagination driver and full backup runs end-to-end.

mod backup_tests;
mod fetcher_tests;
mod fixtures;

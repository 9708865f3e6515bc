//! Core business logic - framework-agnostic booking operations.

/// Catalog reads and reservation projections
pub mod catalog;
/// Guarded seat and point counters
pub mod ledger;
/// Reservation transaction manager
pub mod reservation;
/// Showtime schedule validation
pub mod schedule;
/// Show creation pipeline
pub mod show;
/// Balance-bearing user records
pub mod user;

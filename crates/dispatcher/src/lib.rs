//! `gacek-dispatcher` library crate.
//!
//! Re-exports the configuration and dispatch loop for integration
//! testing. The binary entrypoint lives in `main.rs`.

pub mod config;
pub mod dispatch;

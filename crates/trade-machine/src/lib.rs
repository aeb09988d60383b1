// Library root: re-exports all modules so integration tests and the binary
// can access the crate's public API.

pub mod cli;
pub mod config;
pub mod history;
pub mod league;
pub mod snapshot;
pub mod stats;
pub mod valuation;

//! Records sales, receipts, purchases and expenses in an xlsx workbook, one sheet per category.
//!
//! The workbook is reached through `commands`, which the `ledger` binary drives from the command
//! line and `ledger serve` exposes over HTTP.

mod api;
pub mod args;
mod backup;
pub mod commands;
mod config;
mod error;
pub mod model;
pub mod store;
mod utils;


pub use config::Config;
pub use error::{Error, ErrorType, Result};

//! Horizon Library
//!
//! Re-exports modules for integration testing and external use.

pub mod api;
pub mod cache;
pub mod domain;
pub mod handlers;
pub mod providers;
pub mod session;
pub mod store;

pub mod config;
mod error;

pub use config::{AccountSelectionPolicy, Config};
pub use error::{AppError, AppResult};
pub use domain::{AmountError, ShareableIdCodec, TransferAmount};
pub use domain::{BankRecord, TransactionRecord, UserProfile};

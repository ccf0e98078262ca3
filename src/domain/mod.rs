//! Domain module
//!
//! Core domain types: validated amounts, persisted record shapes, the
//! shareable-id codec, and list pagination.

pub mod amount;
pub mod models;
pub mod pagination;
pub mod shareable_id;

pub use amount::{AmountError, TransferAmount};
pub use models::{document_data, BankRecord, TransactionRecord, UserProfile};
pub use pagination::{paginate, Page};
pub use shareable_id::{ShareableIdCodec, ShareableIdError};

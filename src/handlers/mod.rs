//! Command handlers
//!
//! The orchestrators behind the API: each wraps a short sequential chain of
//! provider calls behind an `execute`-style method.

pub mod account_handler;
pub mod commands;
pub mod link_handler;
pub mod session_handler;
pub mod sign_in_handler;
pub mod sign_up_handler;
pub mod transfer_handler;

#[cfg(test)]
mod tests;

pub use account_handler::{AccountDetail, AccountHandler, AccountSummary, AccountsOverview};
pub use commands::{
    AuthResult, LinkAccountCommand, LinkAccountResult, LinkedBank, SignInCommand, SignUpCommand,
    TransferCommand,
};
pub use link_handler::LinkHandler;
pub use session_handler::SessionHandler;
pub use sign_in_handler::SignInHandler;
pub use sign_up_handler::SignUpHandler;
pub use transfer_handler::{TransferHandler, TransferOutcome};

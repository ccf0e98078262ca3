//! Command definitions
//!
//! Commands represent intentions to change the system state. Each carries
//! its own input validation, applied before any external call is made.

use serde::{Deserialize, Serialize};

use crate::domain::{TransferAmount, UserProfile};
use crate::error::AppError;

/// Command to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignUpCommand {
    pub first_name: String,
    pub last_name: String,
    pub address1: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    /// ISO date, e.g. "1990-01-31".
    pub date_of_birth: String,
    pub ssn: String,
    pub email: String,
    pub password: String,
}

impl SignUpCommand {
    pub fn validate(&self) -> Result<(), AppError> {
        let required = [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("address1", &self.address1),
            ("city", &self.city),
            ("state", &self.state),
            ("postal_code", &self.postal_code),
            ("date_of_birth", &self.date_of_birth),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(AppError::Validation(format!("{} is required", field)));
            }
        }
        if !self.email.contains('@') {
            return Err(AppError::Validation("invalid email address".to_string()));
        }
        if self.password.len() < 8 {
            return Err(AppError::Validation(
                "password must be at least 8 characters".to_string(),
            ));
        }
        let ssn_digits = self.ssn.chars().filter(char::is_ascii_digit).count();
        if ssn_digits < 4 || !self.ssn.chars().all(|c| c.is_ascii_digit() || c == '-') {
            return Err(AppError::Validation("invalid ssn".to_string()));
        }
        Ok(())
    }

    /// Last four digits of the ssn, the only part ever persisted.
    pub fn ssn_last4(&self) -> String {
        let digits: Vec<char> = self.ssn.chars().filter(|c| c.is_ascii_digit()).collect();
        digits[digits.len().saturating_sub(4)..].iter().collect()
    }
}

/// Command to open a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInCommand {
    pub email: String,
    pub password: String,
}

impl SignInCommand {
    pub fn validate(&self) -> Result<(), AppError> {
        if !self.email.contains('@') || self.password.is_empty() {
            return Err(AppError::Validation(
                "email and password are required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Result of a successful sign-up or sign-in. The session secret is handed
/// to the API layer, which turns it into the cookie.
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub profile: UserProfile,
    pub session_secret: String,
}

/// Command to finish the account-link flow with the token the browser-side
/// link widget produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkAccountCommand {
    pub public_token: String,
}

impl LinkAccountCommand {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.public_token.trim().is_empty() {
            return Err(AppError::Validation("public_token is required".to_string()));
        }
        Ok(())
    }
}

/// One bank record created by a link flow, in its API-safe shape (no access
/// token).
#[derive(Debug, Clone, Serialize)]
pub struct LinkedBank {
    pub bank_id: String,
    pub item_id: String,
    pub account_id: String,
    pub bank_name: String,
    pub shareable_id: String,
}

/// Result of a completed link flow.
#[derive(Debug, Clone, Serialize)]
pub struct LinkAccountResult {
    pub linked: Vec<LinkedBank>,
}

/// Command to move money to another user's shared account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferCommand {
    /// Transfer note shown in both histories.
    pub name: String,
    /// Recipient's email, recorded on the transaction.
    pub email: String,
    /// Decimal string, e.g. "25.50".
    pub amount: String,
    /// Sender's bank record id.
    pub sender_bank_id: String,
    /// Receiver's shareable account id.
    pub shareable_id: String,
}

impl TransferCommand {
    pub fn validate(&self) -> Result<TransferAmount, AppError> {
        if self.name.trim().len() < 4 {
            return Err(AppError::Validation("transfer note is too short".to_string()));
        }
        if !self.email.contains('@') {
            return Err(AppError::Validation("invalid email address".to_string()));
        }
        if self.sender_bank_id.trim().is_empty() {
            return Err(AppError::Validation("sender bank is required".to_string()));
        }
        if self.shareable_id.trim().len() < 8 {
            return Err(AppError::Validation("invalid shareable id".to_string()));
        }
        self.amount
            .parse::<TransferAmount>()
            .map_err(|e| AppError::Validation(format!("invalid amount: {}", e)))
    }
}

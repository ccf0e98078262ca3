//! Unit tests for command validation
//!
//! The full orchestration paths are covered by the integration suite with
//! fake providers; these cover the validation each command applies before
//! any external call.

use crate::error::AppError;
use crate::handlers::{LinkAccountCommand, SignInCommand, SignUpCommand, TransferCommand};

fn sign_up_command() -> SignUpCommand {
    SignUpCommand {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        address1: "1 Analytical Way".to_string(),
        city: "London".to_string(),
        state: "LN".to_string(),
        postal_code: "12345".to_string(),
        date_of_birth: "1990-01-31".to_string(),
        ssn: "123-45-6789".to_string(),
        email: "ada@example.com".to_string(),
        password: "correct horse".to_string(),
    }
}

fn transfer_command() -> TransferCommand {
    TransferCommand {
        name: "Rent split".to_string(),
        email: "friend@example.com".to_string(),
        amount: "25.50".to_string(),
        sender_bank_id: "bank_1".to_string(),
        shareable_id: "aabbccddeeff".to_string(),
    }
}

#[test]
fn test_sign_up_valid() {
    assert!(sign_up_command().validate().is_ok());
}

#[test]
fn test_sign_up_rejects_blank_required_field() {
    let mut cmd = sign_up_command();
    cmd.city = "  ".to_string();
    assert!(matches!(cmd.validate(), Err(AppError::Validation(_))));
}

#[test]
fn test_sign_up_rejects_bad_email() {
    let mut cmd = sign_up_command();
    cmd.email = "not-an-email".to_string();
    assert!(matches!(cmd.validate(), Err(AppError::Validation(_))));
}

#[test]
fn test_sign_up_rejects_short_password() {
    let mut cmd = sign_up_command();
    cmd.password = "short".to_string();
    assert!(matches!(cmd.validate(), Err(AppError::Validation(_))));
}

#[test]
fn test_sign_up_rejects_ssn_without_enough_digits() {
    for bad in ["----", "12-3", "12a4"] {
        let mut cmd = sign_up_command();
        cmd.ssn = bad.to_string();
        assert!(
            matches!(cmd.validate(), Err(AppError::Validation(_))),
            "expected rejection for ssn {:?}",
            bad
        );
    }
}

#[test]
fn test_ssn_last4() {
    assert_eq!(sign_up_command().ssn_last4(), "6789");

    let mut cmd = sign_up_command();
    cmd.ssn = "6789".to_string();
    assert_eq!(cmd.ssn_last4(), "6789");
}

#[test]
fn test_sign_in_requires_both_fields() {
    let cmd = SignInCommand {
        email: "ada@example.com".to_string(),
        password: String::new(),
    };
    assert!(matches!(cmd.validate(), Err(AppError::Validation(_))));
}

#[test]
fn test_link_requires_public_token() {
    let cmd = LinkAccountCommand {
        public_token: " ".to_string(),
    };
    assert!(matches!(cmd.validate(), Err(AppError::Validation(_))));
}

#[test]
fn test_transfer_valid_amount_parses() {
    let amount = transfer_command().validate().unwrap();
    assert_eq!(amount.as_wire(), "25.50");
}

#[test]
fn test_transfer_rejects_short_note() {
    let mut cmd = transfer_command();
    cmd.name = "abc".to_string();
    assert!(matches!(cmd.validate(), Err(AppError::Validation(_))));
}

#[test]
fn test_transfer_rejects_invalid_amounts() {
    for bad in ["0", "-5", "abc", "1.005"] {
        let mut cmd = transfer_command();
        cmd.amount = bad.to_string();
        assert!(
            matches!(cmd.validate(), Err(AppError::Validation(_))),
            "expected rejection for amount {}",
            bad
        );
    }
}

#[test]
fn test_transfer_rejects_short_shareable_id() {
    let mut cmd = transfer_command();
    cmd.shareable_id = "abcd".to_string();
    assert!(matches!(cmd.validate(), Err(AppError::Validation(_))));
}

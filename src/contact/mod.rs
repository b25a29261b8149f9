// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Contact Form
//!
//! Validation, rate limiting and delivery for the site's contact form.

pub mod delivery;
pub mod rate_limit;

use chrono::Utc;
use uuid::Uuid;

use crate::models::{ContactRequest, ContactSubmission};

pub use delivery::{ContactDelivery, DeliveryError};
pub use rate_limit::{RateLimitDecision, RateLimiter};

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_EMAIL_LEN: usize = 254;
pub const MIN_MESSAGE_LEN: usize = 10;
pub const MAX_MESSAGE_LEN: usize = 5000;
pub const MAX_COMPANY_LEN: usize = 100;
pub const MAX_PHONE_LEN: usize = 40;

/// A contact form field failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContactValidationError {
    #[error("Name is required")]
    MissingName,
    #[error("Name must be 100 characters or fewer")]
    NameTooLong,
    #[error("Email is required")]
    MissingEmail,
    #[error("Please provide a valid email address")]
    InvalidEmail,
    #[error("Message is required")]
    MissingMessage,
    #[error("Message must be at least 10 characters")]
    MessageTooShort,
    #[error("Message must be 5000 characters or fewer")]
    MessageTooLong,
    #[error("Company must be 100 characters or fewer")]
    CompanyTooLong,
    #[error("Phone must be 40 characters or fewer")]
    PhoneTooLong,
}

/// Check and normalise a submission, assigning it a reference id.
pub fn validate_submission(
    request: ContactRequest,
) -> Result<ContactSubmission, ContactValidationError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ContactValidationError::MissingName);
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ContactValidationError::NameTooLong);
    }

    let email = request.email.trim();
    if email.is_empty() {
        return Err(ContactValidationError::MissingEmail);
    }
    if email.len() > MAX_EMAIL_LEN || !is_plausible_email(email) {
        return Err(ContactValidationError::InvalidEmail);
    }

    let message = request.message.trim();
    if message.is_empty() {
        return Err(ContactValidationError::MissingMessage);
    }
    let message_len = message.chars().count();
    if message_len < MIN_MESSAGE_LEN {
        return Err(ContactValidationError::MessageTooShort);
    }
    if message_len > MAX_MESSAGE_LEN {
        return Err(ContactValidationError::MessageTooLong);
    }

    let company = optional_field(request.company);
    if company
        .as_ref()
        .is_some_and(|c| c.chars().count() > MAX_COMPANY_LEN)
    {
        return Err(ContactValidationError::CompanyTooLong);
    }

    let phone = optional_field(request.phone);
    if phone
        .as_ref()
        .is_some_and(|p| p.chars().count() > MAX_PHONE_LEN)
    {
        return Err(ContactValidationError::PhoneTooLong);
    }

    Ok(ContactSubmission {
        reference: Uuid::new_v4(),
        name: name.to_string(),
        email: email.to_string(),
        message: message.to_string(),
        company,
        phone,
        received_at: Utc::now(),
    })
}

fn optional_field(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `local@domain.tld` with no whitespace.
fn is_plausible_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => {
            !host.is_empty() && !tld.is_empty() && !domain.starts_with('.') && !domain.contains("..")
        }
        None => false,
    }
}

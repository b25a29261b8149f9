// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Contact submission delivery.
//!
//! Submissions are forwarded as JSON to `CONTACT_WEBHOOK_URL` when one is
//! configured. Without a webhook they are only written to the log.

use std::time::Duration;

use reqwest::Client;
use tracing::info;
use url::Url;

use crate::config::Settings;
use crate::models::ContactSubmission;

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("webhook request failed: {0}")]
    Request(String),

    #[error("webhook responded with status {0}")]
    Status(u16),
}

/// Where accepted submissions go.
#[derive(Debug, Clone)]
pub enum ContactDelivery {
    Webhook { url: Url, http: Client },
    Log,
}

impl ContactDelivery {
    pub fn from_settings(settings: &Settings) -> Result<Self, DeliveryError> {
        match &settings.contact_webhook_url {
            Some(url) => Self::webhook(url.clone()),
            None => Ok(ContactDelivery::Log),
        }
    }

    pub fn webhook(url: Url) -> Result<Self, DeliveryError> {
        let http = Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()
            .map_err(|e| DeliveryError::Client(e.to_string()))?;
        Ok(ContactDelivery::Webhook { url, http })
    }

    pub async fn deliver(&self, submission: &ContactSubmission) -> Result<(), DeliveryError> {
        match self {
            ContactDelivery::Webhook { url, http } => {
                let response = http
                    .post(url.clone())
                    .json(submission)
                    .send()
                    .await
                    .map_err(|e| DeliveryError::Request(e.to_string()))?;

                let status = response.status();
                if !status.is_success() {
                    return Err(DeliveryError::Status(status.as_u16()));
                }

                info!(
                    reference = %submission.reference,
                    status = status.as_u16(),
                    "contact submission forwarded to webhook"
                );
                Ok(())
            }
            ContactDelivery::Log => {
                info!(
                    reference = %submission.reference,
                    name = %submission.name,
                    email = %submission.email,
                    company = submission.company.as_deref().unwrap_or("-"),
                    message_len = submission.message.len(),
                    "contact submission received"
                );
                Ok(())
            }
        }
    }
}

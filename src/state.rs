// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::config::Settings;
use crate::contact::{ContactDelivery, DeliveryError, RateLimiter};

/// Shared state injected into every handler.
///
/// Built once at startup; each test builds its own so nothing leaks
/// between runs.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub contact_limiter: Arc<RateLimiter>,
    pub contact_delivery: ContactDelivery,
}

impl AppState {
    pub fn new(settings: Settings) -> Result<Self, DeliveryError> {
        let contact_delivery = ContactDelivery::from_settings(&settings)?;
        Ok(Self::with_delivery(settings, contact_delivery))
    }

    pub fn with_delivery(settings: Settings, contact_delivery: ContactDelivery) -> Self {
        Self {
            contact_limiter: Arc::new(RateLimiter::new(settings.contact_rate_limit)),
            settings: Arc::new(settings),
            contact_delivery,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_delivery(Settings::default(), ContactDelivery::Log)
    }
}

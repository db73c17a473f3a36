// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Order notification sink.
//!
//! Notifications are dispatched on a background task after checkout.
//! Delivery failures are logged and counted but never reach the caller;
//! the order flow does not depend on them.

use crate::error::{AppError, Result};
use crate::models::{Address, OrderItem};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

/// Which email template the sink should render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    BuyerConfirmation,
    SellerNotification,
}

/// A seller whose items are in the order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerContact {
    pub seller_id: String,
    pub seller_name: String,
    pub email: Option<String>,
}

/// Payload posted to the notification sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderNotification {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub order_number: String,
    pub customer_email: String,
    pub customer_name: String,
    pub order_total: Decimal,
    pub items: Vec<OrderItem>,
    pub shipping_address: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sellers: Vec<SellerContact>,
}

#[derive(Clone)]
enum Sink {
    Http { http: reqwest::Client, url: String },
    Recording(Arc<Mutex<Vec<OrderNotification>>>),
    Disabled,
}

/// Notification dispatcher.
#[derive(Clone)]
pub struct NotificationService {
    sink: Sink,
    failures: Arc<AtomicU64>,
}

impl NotificationService {
    /// Post to `url`, or drop notifications (after logging) when `None`.
    pub fn new(url: Option<String>) -> Self {
        let sink = match url {
            Some(url) => Sink::Http {
                http: reqwest::Client::new(),
                url,
            },
            None => Sink::Disabled,
        };
        Self {
            sink,
            failures: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Keep notifications in memory instead of sending them (tests).
    pub fn new_recording() -> Self {
        Self {
            sink: Sink::Recording(Arc::new(Mutex::new(Vec::new()))),
            failures: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Notifications captured by a recording sink.
    pub fn sent(&self) -> Vec<OrderNotification> {
        match &self.sink {
            Sink::Recording(sent) => sent.lock().map(|s| s.clone()).unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    /// Number of deliveries that failed since startup.
    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Deliver one notification and wait for the sink to accept it.
    pub async fn send(&self, notification: &OrderNotification) -> Result<()> {
        match &self.sink {
            Sink::Http { http, url } => {
                let response = http
                    .post(url)
                    .json(notification)
                    .send()
                    .await
                    .map_err(|e| {
                        AppError::Internal(anyhow::anyhow!("Notification request failed: {}", e))
                    })?;

                if !response.status().is_success() {
                    return Err(AppError::Internal(anyhow::anyhow!(
                        "Notification sink returned {}",
                        response.status()
                    )));
                }
                Ok(())
            }
            Sink::Recording(sent) => {
                sent.lock()
                    .map_err(|_| AppError::Internal(anyhow::anyhow!("Recording sink poisoned")))?
                    .push(notification.clone());
                Ok(())
            }
            Sink::Disabled => {
                tracing::debug!(
                    order_number = %notification.order_number,
                    kind = ?notification.kind,
                    "Notification sink not configured, dropping notification"
                );
                Ok(())
            }
        }
    }

    /// Fire-and-forget delivery on a background task.
    ///
    /// The returned handle may be ignored; failures are only logged.
    pub fn dispatch(&self, notifications: Vec<OrderNotification>) -> JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move {
            for notification in notifications {
                if let Err(e) = service.send(&notification).await {
                    service.failures.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(
                        order_number = %notification.order_number,
                        kind = ?notification.kind,
                        error = %e,
                        "Failed to deliver order notification"
                    );
                }
            }
        })
    }
}

// --- File: crates/bookwell_reminders/src/service.rs ---
//! Outbound notification sender.
//!
//! Posts to a simple HTTP message gateway. The reminder batch treats every
//! failure here as a per-item error, so this implementation reports gateway
//! rejections through its error type instead of panicking or retrying.

use bookwell_common::services::{BoxFuture, NotificationResult, NotificationService};
use bookwell_config::NotifyConfig;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};

#[derive(Error, Debug)]
pub enum NotifyServiceError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Gateway returned {status}: {body}")]
    GatewayError { status: u16, body: String },
    #[error("Notification gateway is not configured: {0}")]
    ConfigError(String),
}

#[derive(Deserialize, Debug)]
struct GatewayResponse {
    id: Option<String>,
}

/// HTTP gateway implementation of the notification service.
pub struct HttpNotificationService {
    config: NotifyConfig,
    client: Client,
}

impl HttpNotificationService {
    pub fn new(config: NotifyConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    async fn post_message(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<NotificationResult, NotifyServiceError> {
        let url = format!("{}/{}", self.config.api_url.trim_end_matches('/'), path);
        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            NotifyServiceError::ConfigError("api_key missing in NotifyConfig".to_string())
        })?;

        let resp = self
            .client
            .post(&url)
            .basic_auth("api", Some(api_key))
            .form(params)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!("Notification gateway returned {}: {}", status, body);
            return Err(NotifyServiceError::GatewayError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GatewayResponse = resp.json().await.unwrap_or(GatewayResponse { id: None });
        Ok(NotificationResult {
            id: parsed.id,
            status: "sent".to_string(),
        })
    }
}

impl NotificationService for HttpNotificationService {
    type Error = NotifyServiceError;

    fn send_email(
        &self,
        to: &str,
        subject: &str,
        body: &str,
    ) -> BoxFuture<'_, NotificationResult, Self::Error> {
        let to = to.to_string();
        let subject = subject.to_string();
        let body = body.to_string();

        Box::pin(async move {
            info!("Sending email to {}: {}", to, subject);
            self.post_message(
                "messages/email",
                &[
                    ("from", self.config.from_email.as_str()),
                    ("to", to.as_str()),
                    ("subject", subject.as_str()),
                    ("body", body.as_str()),
                ],
            )
            .await
        })
    }

    fn send_sms(&self, to: &str, body: &str) -> BoxFuture<'_, NotificationResult, Self::Error> {
        let to = to.to_string();
        let body = body.to_string();

        Box::pin(async move {
            let from = self.config.from_sms.as_deref().ok_or_else(|| {
                NotifyServiceError::ConfigError("from_sms missing in NotifyConfig".to_string())
            })?;
            info!("Sending SMS to {}", to);
            self.post_message(
                "messages/sms",
                &[("from", from), ("to", to.as_str()), ("body", body.as_str())],
            )
            .await
        })
    }
}

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;

use super::domain::Identity;
use super::scoring::AssessmentResult;
use crate::config::NotificationConfig;

/// Message announcing a follow-up request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    pub subject: String,
    pub body: String,
    pub name: String,
    pub email: String,
    pub total_score: u32,
    pub tier: String,
}

impl NotificationMessage {
    pub fn follow_up(contact: &Identity, result: &AssessmentResult) -> Self {
        let body = format!(
            "New data strategy workshop request\n\nName: {}\nEmail: {}\nTotal score: {} out of {}\nMaturity tier: {}\n",
            contact.name, contact.email, result.total_score, result.max_score, result.tier_label
        );

        Self {
            recipient: None,
            subject: format!("Workshop request from {}", contact.name),
            body,
            name: contact.name.clone(),
            email: contact.email.clone(),
            total_score: result.total_score,
            tier: result.tier_label.to_string(),
        }
    }
}

/// Outbound notification channel (transactional e-mail API and similar).
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: NotificationMessage) -> Result<(), NotifyError>;
}

/// Notification dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notifications are not configured")]
    Disabled,
    #[error("notification rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Used when no notification endpoint is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn send(&self, _message: NotificationMessage) -> Result<(), NotifyError> {
        Err(NotifyError::Disabled)
    }
}

/// Endpoint and template identifiers for an EmailJS-style send API.
#[derive(Debug, Clone)]
pub struct HttpNotifierSettings {
    pub endpoint: String,
    pub service_id: String,
    pub template_id: String,
    pub user_id: String,
    pub access_token: Option<String>,
    pub recipient: Option<String>,
}

impl HttpNotifierSettings {
    pub fn from_config(config: &NotificationConfig) -> Option<Self> {
        Some(Self {
            endpoint: config.endpoint.clone()?,
            service_id: config.service_id.clone()?,
            template_id: config.template_id.clone()?,
            user_id: config.user_id.clone()?,
            access_token: config.access_token.clone(),
            recipient: config.recipient.clone(),
        })
    }
}

/// Posts template parameters to a hosted e-mail API. One attempt per message.
#[derive(Debug, Clone)]
pub struct HttpNotifier {
    client: reqwest::Client,
    settings: HttpNotifierSettings,
}

impl HttpNotifier {
    pub fn new(settings: HttpNotifierSettings) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|err| NotifyError::Transport(err.to_string()))?;
        Ok(Self { client, settings })
    }

    fn payload(&self, message: &NotificationMessage) -> serde_json::Value {
        let recipient = message
            .recipient
            .clone()
            .or_else(|| self.settings.recipient.clone());

        let mut payload = json!({
            "service_id": self.settings.service_id,
            "template_id": self.settings.template_id,
            "user_id": self.settings.user_id,
            "template_params": {
                "to_email": recipient,
                "subject": message.subject,
                "message": message.body,
                "name": message.name,
                "email": message.email,
                "score": message.total_score,
                "tier": message.tier,
            },
        });
        if let Some(token) = &self.settings.access_token {
            payload["accessToken"] = json!(token);
        }
        payload
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn send(&self, message: NotificationMessage) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.settings.endpoint)
            .json(&self.payload(&message))
            .send()
            .await
            .map_err(|err| NotifyError::Transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(status = status.as_u16(), "notification accepted");
            return Ok(());
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|err| format!("unreadable response body: {err}"));
        Err(NotifyError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

use crate::core::{
    CredentialProvider, OutboundChannel, OutboundMessage, ProviderMessageId, RecipientId,
    SendFailure, SendResult,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://graph.facebook.com";
pub const DEFAULT_API_VERSION: &str = "v22.0";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct CloudApiSettings {
    pub api_base_url: String,
    pub api_version: String,
    pub timeout: Duration,
}

impl Default for CloudApiSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Serialize)]
struct TextMessageRequest<'a> {
    messaging_product: &'static str,
    to: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    text: TextBody<'a>,
}

#[derive(Debug, Serialize)]
struct TextBody<'a> {
    body: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    #[serde(default)]
    messages: Vec<SentMessageRef>,
}

#[derive(Debug, Deserialize)]
struct SentMessageRef {
    id: String,
}

/// WhatsApp Cloud API 的文字訊息發送通道
pub struct CloudApiChannel<P: CredentialProvider> {
    client: Client,
    settings: CloudApiSettings,
    credentials: P,
}

impl<P: CredentialProvider> CloudApiChannel<P> {
    pub fn new(settings: CloudApiSettings, credentials: P) -> Result<Self> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self {
            client,
            settings,
            credentials,
        })
    }

    fn messages_url(&self, sender_id: &str) -> String {
        format!(
            "{}/{}/{}/messages",
            self.settings.api_base_url.trim_end_matches('/'),
            self.settings.api_version,
            sender_id
        )
    }
}

/// 從錯誤回應中取出 `error.message`，沒有時給通用說明
fn api_error_detail(body: &str) -> String {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "Unknown error".to_string());
    format!("WhatsApp API error: {}", message)
}

#[async_trait]
impl<P: CredentialProvider> OutboundChannel for CloudApiChannel<P> {
    async fn send(&self, recipient: &RecipientId, message: &OutboundMessage) -> SendResult {
        if message.body.trim().is_empty() {
            return Err(SendFailure::InvalidInput(
                "Message body cannot be empty".to_string(),
            ));
        }

        let credentials = self
            .credentials
            .credentials()
            .map_err(|e| SendFailure::Configuration(e.to_string()))?;

        let url = self.messages_url(&credentials.sender_id);
        let payload = TextMessageRequest {
            messaging_product: "whatsapp",
            to: recipient.as_str(),
            kind: "text",
            text: TextBody {
                body: &message.body,
            },
        };

        tracing::debug!("Making API request to: {}", url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&credentials.access_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| SendFailure::Transport(e.to_string()))?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);

        let body = response
            .text()
            .await
            .map_err(|e| SendFailure::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(SendFailure::Api {
                status: status.as_u16(),
                detail: api_error_detail(&body),
            });
        }

        let parsed: SendMessageResponse = serde_json::from_str(&body)
            .map_err(|e| SendFailure::MalformedResponse(e.to_string()))?;

        parsed
            .messages
            .into_iter()
            .next()
            .map(|m| ProviderMessageId(m.id))
            .ok_or_else(|| {
                SendFailure::MalformedResponse("response contained no message id".to_string())
            })
    }
}

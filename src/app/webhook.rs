use crate::app::auto_reply::AutoReplyClassifier;
use crate::core::dispatcher::BulkDispatcher;
use crate::core::{OutboundChannel, OutboundMessage, Pacer, RecipientId, SendOutcome};
use crate::utils::error::{DispatchError, Result};
use serde::Deserialize;

/// 訂閱握手：mode 為 `subscribe` 且 token 相符時回傳 challenge
pub fn verify_subscription(
    mode: Option<&str>,
    token: Option<&str>,
    challenge: Option<&str>,
    expected_token: &str,
) -> Option<String> {
    match (mode, token) {
        (Some("subscribe"), Some(token)) if token == expected_token => {
            tracing::info!("✅ Webhook verified");
            Some(challenge.unwrap_or_default().to_string())
        }
        (Some(_), Some(_)) => {
            tracing::warn!("❌ Webhook verification failed: token mismatch");
            None
        }
        _ => {
            tracing::warn!("❌ Webhook verification failed: missing mode or token");
            None
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    pub object: Option<String>,
    #[serde(default)]
    pub entry: Vec<WebhookEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEntry {
    #[serde(default)]
    pub changes: Vec<WebhookChange>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookChange {
    #[serde(default)]
    pub value: ChangeValue,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangeValue {
    #[serde(default)]
    pub messages: Vec<WebhookMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookMessage {
    #[serde(default)]
    pub from: String,
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub text: Option<WebhookText>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookText {
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundText {
    pub from: RecipientId,
    pub body: String,
    pub message_id: Option<String>,
}

impl WebhookPayload {
    /// 解析 webhook 內容；缺少 `object` 的事件視為無效
    pub fn parse(body: &str) -> Result<Self> {
        let payload: WebhookPayload = serde_json::from_str(body)?;
        if payload.object.is_none() {
            return Err(DispatchError::validation(
                "Invalid webhook payload: missing object",
            ));
        }
        Ok(payload)
    }

    /// 所有 entry/change 中帶文字內容的訊息，依出現順序
    pub fn inbound_texts(&self) -> Vec<InboundText> {
        self.entry
            .iter()
            .flat_map(|entry| entry.changes.iter())
            .flat_map(|change| change.value.messages.iter())
            .filter_map(|message| {
                let Some(body) = message
                    .text
                    .as_ref()
                    .map(|t| t.body.as_str())
                    .filter(|b| !b.trim().is_empty())
                else {
                    tracing::debug!("⏭️ Skipping non-text message of type {:?}", message.kind);
                    return None;
                };
                let from = RecipientId::parse(&message.from).ok()?;
                Some(InboundText {
                    from,
                    body: body.to_string(),
                    message_id: message.id.clone(),
                })
            })
            .collect()
    }
}

/// 對收到的文字訊息自動回覆；每則回覆都是 n=1 的批次
pub struct AutoResponder<C: OutboundChannel, P: Pacer> {
    dispatcher: BulkDispatcher<C, P>,
    classifier: AutoReplyClassifier,
}

impl<C: OutboundChannel, P: Pacer> AutoResponder<C, P> {
    pub fn new(dispatcher: BulkDispatcher<C, P>, classifier: AutoReplyClassifier) -> Self {
        Self {
            dispatcher,
            classifier,
        }
    }

    pub async fn reply_to(&self, inbound: &InboundText) -> Result<SendOutcome> {
        let reply = OutboundMessage::new(self.classifier.reply_for(&inbound.body));
        tracing::info!("🚀 Auto-replying to {}", inbound.from);
        self.dispatcher.send_one(inbound.from.clone(), &reply).await
    }

    pub async fn handle_payload(&self, payload: &WebhookPayload) -> Vec<SendOutcome> {
        let texts = payload.inbound_texts();
        if texts.is_empty() {
            tracing::info!("No text messages found in webhook payload");
        }

        // 每則訊息各自處理；單則失敗記為 Failure，不影響後面的回覆
        let mut outcomes = Vec::with_capacity(texts.len());
        for inbound in &texts {
            let outcome = match self.reply_to(inbound).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::warn!("❌ Auto-reply to {} failed: {}", inbound.from, e);
                    SendOutcome::Failure {
                        recipient: inbound.from.clone(),
                        error_detail: e.to_string(),
                    }
                }
            };
            outcomes.push(outcome);
        }
        outcomes
    }
}

use crate::utils::error::{DispatchError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 平台上的收件人位址，例如不含 `+` 的國際格式電話號碼
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecipientId(String);

impl RecipientId {
    /// 建立收件人；去除前後空白後不可為空
    pub fn parse(value: impl AsRef<str>) -> Result<Self> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(DispatchError::validation("Recipient cannot be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RecipientId {
    type Error = DispatchError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<RecipientId> for String {
    fn from(value: RecipientId) -> Self {
        value.0
    }
}

impl fmt::Display for RecipientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub body: String,
}

impl OutboundMessage {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }
}

/// 平台回傳的訊息編號 (wamid)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderMessageId(pub String);

impl fmt::Display for ProviderMessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SendOutcome {
    Success {
        recipient: RecipientId,
        provider_message_id: ProviderMessageId,
    },
    Failure {
        recipient: RecipientId,
        error_detail: String,
    },
}

impl SendOutcome {
    pub fn recipient(&self) -> &RecipientId {
        match self {
            Self::Success { recipient, .. } | Self::Failure { recipient, .. } => recipient,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentMessage {
    pub recipient: RecipientId,
    pub provider_message_id: ProviderMessageId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedMessage {
    pub recipient: RecipientId,
    pub error_detail: String,
}

#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub recipients: Vec<RecipientId>,
    pub message: OutboundMessage,
}

impl BatchRequest {
    pub fn new(recipients: Vec<RecipientId>, message: OutboundMessage) -> Self {
        Self {
            recipients,
            message,
        }
    }

    /// 單一收件人的批次，自動回覆走這條路徑
    pub fn single(recipient: RecipientId, message: OutboundMessage) -> Self {
        Self::new(vec![recipient], message)
    }
}

/// 一個批次的成功/失敗帳本。
///
/// `successes` 與 `failures` 各自保持輸入順序；兩者長度相加必等於收件人數。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    pub successes: Vec<SentMessage>,
    pub failures: Vec<FailedMessage>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchResult {
    pub(crate) fn begin(capacity: usize) -> Self {
        let now = Utc::now();
        Self {
            successes: Vec::with_capacity(capacity),
            failures: Vec::new(),
            started_at: now,
            finished_at: now,
        }
    }

    pub(crate) fn record(&mut self, outcome: SendOutcome) {
        match outcome {
            SendOutcome::Success {
                recipient,
                provider_message_id,
            } => self.successes.push(SentMessage {
                recipient,
                provider_message_id,
            }),
            SendOutcome::Failure {
                recipient,
                error_detail,
            } => self.failures.push(FailedMessage {
                recipient,
                error_detail,
            }),
        }
    }

    pub(crate) fn finish(mut self) -> Self {
        self.finished_at = Utc::now();
        self
    }

    pub fn total(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    pub fn successful_recipients(&self) -> Vec<&str> {
        self.successes.iter().map(|s| s.recipient.as_str()).collect()
    }

    pub fn failed_recipients(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.recipient.as_str()).collect()
    }
}

/// HTTP 邊界回傳的報表格式
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkSendReport {
    pub summary: ReportSummary,
    pub details: ReportDetails,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDetails {
    pub successful: Vec<ReportSuccess>,
    pub failed: Vec<ReportFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSuccess {
    pub recipient: String,
    pub message_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportFailure {
    pub recipient: String,
    pub error: String,
}

impl From<&BatchResult> for BulkSendReport {
    fn from(result: &BatchResult) -> Self {
        Self {
            summary: ReportSummary {
                total: result.total(),
                successful: result.successes.len(),
                failed: result.failures.len(),
            },
            details: ReportDetails {
                successful: result
                    .successes
                    .iter()
                    .map(|s| ReportSuccess {
                        recipient: s.recipient.to_string(),
                        message_id: s.provider_message_id.to_string(),
                    })
                    .collect(),
                failed: result
                    .failures
                    .iter()
                    .map(|f| ReportFailure {
                        recipient: f.recipient.to_string(),
                        error: f.error_detail.clone(),
                    })
                    .collect(),
            },
        }
    }
}

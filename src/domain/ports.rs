use crate::domain::model::{OutboundMessage, ProviderMessageId, RecipientId};
use crate::utils::error::Result;
use async_trait::async_trait;
use thiserror::Error;

/// 單一收件人發送失敗的原因；只作為帳本中的說明文字
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SendFailure {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("{detail}")]
    Api { status: u16, detail: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type SendResult = std::result::Result<ProviderMessageId, SendFailure>;

/// 對平台發送一則訊息。每次呼叫恰好一個網路請求，不重試。
#[async_trait]
pub trait OutboundChannel: Send + Sync {
    async fn send(&self, recipient: &RecipientId, message: &OutboundMessage) -> SendResult;
}

/// 批次內的節流點：`index` 為收件人在批次中的位置
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn gate(&self, index: usize);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,
    pub sender_id: String,
}

pub trait CredentialProvider: Send + Sync {
    /// 在發送當下讀取憑證；缺少 token 時回傳設定錯誤
    fn credentials(&self) -> Result<Credentials>;
}

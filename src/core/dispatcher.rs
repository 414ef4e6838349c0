use crate::core::{
    BatchRequest, BatchResult, OutboundChannel, OutboundMessage, Pacer, RecipientId, SendOutcome,
};
use crate::utils::error::{DispatchError, Result};

/// 依序對每位收件人發送同一則訊息，並產出完整的成功/失敗帳本。
///
/// 批次內嚴格循序；不同批次之間互不阻擋。單一收件人的失敗不會中斷批次。
pub struct BulkDispatcher<C: OutboundChannel, P: Pacer> {
    channel: C,
    pacer: P,
    max_batch_size: Option<usize>,
}

impl<C: OutboundChannel, P: Pacer> BulkDispatcher<C, P> {
    pub fn new(channel: C, pacer: P) -> Self {
        Self {
            channel,
            pacer,
            max_batch_size: None,
        }
    }

    pub fn with_max_batch_size(mut self, max_batch_size: Option<usize>) -> Self {
        self.max_batch_size = max_batch_size;
        self
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// 在任何發送之前檢查批次
    pub fn validate(&self, request: &BatchRequest) -> Result<()> {
        if request.recipients.is_empty() {
            return Err(DispatchError::validation("No valid recipients provided"));
        }
        if request.message.body.trim().is_empty() {
            return Err(DispatchError::validation("Message body cannot be empty"));
        }
        if let Some(max) = self.max_batch_size {
            if request.recipients.len() > max {
                return Err(DispatchError::validation(format!(
                    "Batch of {} recipients exceeds the maximum of {}",
                    request.recipients.len(),
                    max
                )));
            }
        }
        Ok(())
    }

    pub async fn dispatch(&self, request: BatchRequest) -> Result<BatchResult> {
        self.validate(&request)?;

        let BatchRequest {
            recipients,
            message,
        } = request;
        let total = recipients.len();
        tracing::info!("📤 Starting bulk send to {} recipient(s)", total);

        let mut result = BatchResult::begin(total);
        for (index, recipient) in recipients.into_iter().enumerate() {
            self.pacer.gate(index).await;
            let outcome = self.attempt(recipient, &message).await;
            result.record(outcome);
        }
        let result = result.finish();

        tracing::info!(
            "✅ Bulk send finished: {} successful, {} failed (of {})",
            result.successes.len(),
            result.failures.len(),
            total
        );
        Ok(result)
    }

    /// n=1 的發送路徑（自動回覆使用），不經過節流
    pub async fn send_one(
        &self,
        recipient: RecipientId,
        message: &OutboundMessage,
    ) -> Result<SendOutcome> {
        if message.body.trim().is_empty() {
            return Err(DispatchError::validation("Message body cannot be empty"));
        }
        Ok(self.attempt(recipient, message).await)
    }

    async fn attempt(&self, recipient: RecipientId, message: &OutboundMessage) -> SendOutcome {
        match self.channel.send(&recipient, message).await {
            Ok(provider_message_id) => {
                tracing::debug!("Sent to {} ({})", recipient, provider_message_id);
                SendOutcome::Success {
                    recipient,
                    provider_message_id,
                }
            }
            Err(failure) => {
                tracing::warn!("❌ Send to {} failed: {}", recipient, failure);
                SendOutcome::Failure {
                    recipient,
                    error_detail: failure.to_string(),
                }
            }
        }
    }
}

use crate::core::Pacer;
use async_trait::async_trait;
use std::time::Duration;

pub const DEFAULT_SEND_DELAY: Duration = Duration::from_millis(1000);

/// 固定間隔節流：每次發送完成後等待固定時間再送下一筆。
///
/// 不是 token bucket，前一筆再慢也不會累積額度，第一筆不等待。
#[derive(Debug, Clone)]
pub struct FixedIntervalLimiter {
    delay: Duration,
}

impl FixedIntervalLimiter {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_millis(delay_ms: u64) -> Self {
        Self::new(Duration::from_millis(delay_ms))
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for FixedIntervalLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_SEND_DELAY)
    }
}

#[async_trait]
impl Pacer for FixedIntervalLimiter {
    async fn gate(&self, index: usize) {
        if index == 0 || self.delay.is_zero() {
            return;
        }
        tracing::debug!("⏳ Waiting {:?} before recipient #{}", self.delay, index + 1);
        tokio::time::sleep(self.delay).await;
    }
}

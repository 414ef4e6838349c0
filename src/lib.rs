pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::recipients::{recipients_from_csv, recipients_from_json, CsvRecipients};
pub use adapters::whatsapp::{CloudApiChannel, CloudApiSettings};
pub use app::auto_reply::AutoReplyClassifier;
pub use app::webhook::{AutoResponder, WebhookPayload};
pub use config::TomlConfig;
pub use crate::core::{
    dispatcher::BulkDispatcher, limiter::FixedIntervalLimiter, BatchRequest, BatchResult,
    BulkSendReport, OutboundMessage, RecipientId, SendOutcome,
};
pub use utils::error::{DispatchError, Result};

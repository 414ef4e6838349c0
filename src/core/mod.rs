pub mod dispatcher;
pub mod limiter;

pub use crate::domain::model::{
    BatchRequest, BatchResult, BulkSendReport, FailedMessage, OutboundMessage, ProviderMessageId,
    RecipientId, SendOutcome, SentMessage,
};
pub use crate::domain::ports::{
    CredentialProvider, Credentials, OutboundChannel, Pacer, SendFailure, SendResult,
};
pub use crate::utils::error::Result;

pub mod auto_reply;
pub mod webhook;

// Adapters layer: concrete implementations for external systems (messaging API, recipient files).

pub mod recipients;
pub mod whatsapp;

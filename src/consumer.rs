// 📨 Event-bus consumer stub
//
// Inbound catalog messages are only logged. Broker connection and exchange
// setup live outside this crate.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogMessage {
    pub message: String,
}

impl CatalogMessage {
    pub fn new(message: impl Into<String>) -> Self {
        CatalogMessage {
            message: message.into(),
        }
    }
}

pub trait MessageConsumer {
    fn consume(&self, message: &CatalogMessage);
}

/// Logs every message it receives
#[derive(Debug, Default)]
pub struct LoggingConsumer {
    received: AtomicU64,
}

impl LoggingConsumer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a raw JSON payload (`{"message": "..."}`) and consume it
    pub fn consume_json(&self, payload: &[u8]) -> Result<CatalogMessage, serde_json::Error> {
        let message: CatalogMessage = serde_json::from_slice(payload)?;
        self.consume(&message);
        Ok(message)
    }

    pub fn received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }
}

impl MessageConsumer for LoggingConsumer {
    fn consume(&self, message: &CatalogMessage) {
        self.received.fetch_add(1, Ordering::Relaxed);
        info!("Received message: {}", message.message);
    }
}

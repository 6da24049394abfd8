use std::sync::Mutex;

use crate::errors::{ExError, ExErrorKind, Result};

/// Outbound text message delivery
///
/// Best effort: a returned `Ok` means the gateway accepted the request,
/// not that the message arrived.
#[allow(clippy::result_large_err)]
pub trait Messenger: Send + Sync {
    /// # Errors
    ///
    /// Returns `ExternalService` if the gateway rejects or cannot be reached.
    fn send(&self, body: &str, recipient: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub body: String,
    pub recipient: String,
}

/// Messenger that keeps what it was asked to send
#[derive(Debug, Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<SentMessage>>,
    unreachable: bool,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// A messenger whose every send fails
    pub fn unreachable() -> Self {
        Self {
            sent: Mutex::default(),
            unreachable: true,
        }
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl Messenger for RecordingMessenger {
    fn send(&self, body: &str, recipient: &str) -> Result<()> {
        if self.unreachable {
            return Err(ExError::new(ExErrorKind::ExternalService)
                .with_op("send")
                .with_message("gateway unreachable"));
        }
        self.sent
            .lock()
            .map_err(|_| ExError::new(ExErrorKind::Concurrency).with_op("send"))?
            .push(SentMessage {
                body: body.to_string(),
                recipient: recipient.to_string(),
            });
        Ok(())
    }
}

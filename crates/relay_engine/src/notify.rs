use async_trait::async_trait;
use thiserror::Error;

use crate::types::{ChatId, MessageId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("notification failed: {0}")]
pub struct NotifyError(pub String);

/// The status message a run keeps editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusHandle {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// Outbound surface of the messaging platform.
#[async_trait]
pub trait StatusNotifier: Send + Sync {
    /// Posts a new status message in the chat.
    async fn send_status(&self, chat_id: ChatId, text: &str) -> Result<StatusHandle, NotifyError>;

    /// Replaces the text of an existing status message. `link_preview` leaves
    /// the platform's link preview enabled for URLs in the text.
    async fn edit_status(
        &self,
        handle: StatusHandle,
        text: &str,
        link_preview: bool,
    ) -> Result<(), NotifyError>;
}

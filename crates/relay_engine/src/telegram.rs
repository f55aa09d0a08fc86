//! Telegram Bot API client and wire types.
//!
//! Every method is a JSON `POST` to `{base}/bot{token}/{method}`; file bytes
//! are served from `{base}/file/bot{token}/{file_path}`.

use std::time::Duration;

use async_trait::async_trait;
use relay_core::{DocumentRef, MediaKind, PhotoRef, VideoRef};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::notify::{NotifyError, StatusHandle, StatusNotifier};
use crate::types::{ChatId, MessageId, UnsupportedMediaError};

pub const TELEGRAM_DEFAULT_API_BASE_URL: &str = "https://api.telegram.org";
/// Extra client-side allowance on top of the long-poll timeout.
const POLL_GRACE: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum BotApiError {
    #[error("request timed out")]
    Timeout,
    #[error("request failed: {0}")]
    Transport(String),
    #[error("http status {status}: {description}")]
    HttpStatus { status: u16, description: String },
    #[error("telegram error: {0}")]
    Api(String),
    #[error("malformed telegram response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for BotApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BotApiError::Timeout
        } else {
            BotApiError::Transport(err.without_url().to_string())
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: MessageId,
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub photo: Option<Vec<PhotoSize>>,
    #[serde(default)]
    pub video: Option<Video>,
    #[serde(default)]
    pub document: Option<Document>,
    #[serde(default)]
    pub audio: Option<Value>,
    #[serde(default)]
    pub voice: Option<Value>,
    #[serde(default)]
    pub video_note: Option<Value>,
    #[serde(default)]
    pub sticker: Option<Value>,
    #[serde(default)]
    pub animation: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: ChatId,
    #[serde(default, rename = "type")]
    pub chat_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub username: Option<String>,
}

impl User {
    pub fn display(&self) -> String {
        self.username
            .clone()
            .unwrap_or_else(|| self.id.to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub file_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Video {
    pub file_id: String,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    pub file_id: String,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
}

/// Result of `getFile`. `file_path` is absent when the file cannot be served.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramFile {
    pub file_id: String,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
}

impl Message {
    /// True when the message carries any attachment at all, recognised or not.
    pub fn has_attachment(&self) -> bool {
        self.photo.as_ref().is_some_and(|sizes| !sizes.is_empty())
            || self.video.is_some()
            || self.document.is_some()
            || self.audio.is_some()
            || self.voice.is_some()
            || self.video_note.is_some()
            || self.sticker.is_some()
            || self.animation.is_some()
    }

    /// Resolves the attachment to one of the supported media kinds. For
    /// photos the largest size (the last entry) is used.
    pub fn media_kind(&self) -> Result<MediaKind, UnsupportedMediaError> {
        if let Some(largest) = self.photo.as_ref().and_then(|sizes| sizes.last()) {
            return Ok(MediaKind::Photo(PhotoRef {
                file_id: largest.file_id.clone(),
                width: largest.width,
                height: largest.height,
            }));
        }
        if let Some(video) = &self.video {
            return Ok(MediaKind::Video(VideoRef {
                file_id: video.file_id.clone(),
                file_name: video.file_name.clone(),
                mime_type: video.mime_type.clone(),
            }));
        }
        if let Some(doc) = &self.document {
            return Ok(MediaKind::Document(DocumentRef {
                file_id: doc.file_id.clone(),
                file_name: doc.file_name.clone(),
                mime_type: doc.mime_type.clone(),
            }));
        }
        Err(UnsupportedMediaError)
    }
}

/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct BotApi {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl BotApi {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        format!("{}/bot{}/{}", base, self.token, method)
    }

    /// Download location for a `file_path` returned by `getFile`.
    pub fn file_url(&self, file_path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        format!(
            "{}/file/bot{}/{}",
            base,
            self.token,
            file_path.trim_start_matches('/')
        )
    }

    /// Masks the bot token so a URL can be logged.
    pub fn redact(&self, url: &str) -> String {
        if self.token.is_empty() {
            return url.to_string();
        }
        url.replace(&self.token, "<redacted>")
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &Value,
        timeout: Option<Duration>,
    ) -> Result<T, BotApiError> {
        let mut request = self.client.post(self.method_url(method)).json(body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let response = request.send().await?;
        let status = response.status();
        let body_text = response.text().await?;

        let envelope: ApiEnvelope<T> = match serde_json::from_str(&body_text) {
            Ok(envelope) => envelope,
            Err(err) if status.is_success() => {
                return Err(BotApiError::Decode(format!("{method}: {err}")));
            }
            Err(_) => {
                return Err(BotApiError::HttpStatus {
                    status: status.as_u16(),
                    description: truncate(&body_text),
                });
            }
        };

        if !envelope.ok {
            let description = envelope
                .description
                .unwrap_or_else(|| format!("{method} returned ok=false"));
            return Err(if status.is_success() {
                BotApiError::Api(description)
            } else {
                BotApiError::HttpStatus {
                    status: status.as_u16(),
                    description,
                }
            });
        }

        envelope
            .result
            .ok_or_else(|| BotApiError::Decode(format!("{method}: missing result")))
    }

    pub async fn get_me(&self) -> Result<User, BotApiError> {
        self.call("getMe", &json!({}), None).await
    }

    pub async fn get_file(&self, file_id: &str) -> Result<TelegramFile, BotApiError> {
        self.call("getFile", &json!({ "file_id": file_id }), None)
            .await
    }

    pub async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<Message, BotApiError> {
        self.call(
            "sendMessage",
            &json!({ "chat_id": chat_id, "text": text }),
            None,
        )
        .await
    }

    pub async fn edit_message_text(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
        link_preview: bool,
    ) -> Result<(), BotApiError> {
        let body = json!({
            "chat_id": chat_id,
            "message_id": message_id,
            "text": text,
            "link_preview_options": { "is_disabled": !link_preview },
        });
        // The result is either the edited message or `true`.
        let _: Value = self.call("editMessageText", &body, None).await?;
        Ok(())
    }

    /// Long-polls for updates. The request timeout is stretched past the
    /// server-side poll timeout so an idle poll does not look like a failure.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        poll_timeout: Duration,
    ) -> Result<Vec<Update>, BotApiError> {
        let mut body = json!({
            "timeout": poll_timeout.as_secs(),
            "allowed_updates": ["message"],
        });
        if let Some(offset) = offset {
            body["offset"] = json!(offset);
        }
        self.call("getUpdates", &body, Some(poll_timeout + POLL_GRACE))
            .await
    }
}

#[async_trait]
impl StatusNotifier for BotApi {
    async fn send_status(&self, chat_id: ChatId, text: &str) -> Result<StatusHandle, NotifyError> {
        let message = self
            .send_message(chat_id, text)
            .await
            .map_err(|err| NotifyError(err.to_string()))?;
        Ok(StatusHandle {
            chat_id: message.chat.id,
            message_id: message.message_id,
        })
    }

    async fn edit_status(
        &self,
        handle: StatusHandle,
        text: &str,
        link_preview: bool,
    ) -> Result<(), NotifyError> {
        self.edit_message_text(handle.chat_id, handle.message_id, text, link_preview)
            .await
            .map_err(|err| NotifyError(err.to_string()))
    }
}

fn truncate(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while end > 0 && !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

use async_trait::async_trait;
use futures_util::StreamExt;
use relay_core::MediaReference;
use relay_logging::{relay_debug, relay_info};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::staging::StagedFile;
use crate::telegram::BotApi;
use crate::types::RetrievalError;

#[async_trait]
pub trait FileRetriever: Send + Sync {
    /// Writes the full remote file into `staged` and returns the byte count.
    async fn fetch(
        &self,
        media: &MediaReference,
        staged: &StagedFile,
    ) -> Result<u64, RetrievalError>;
}

/// Resolves a Telegram file id through `getFile`, then streams the bytes from
/// the Bot API file endpoint.
#[derive(Debug, Clone)]
pub struct TelegramRetriever {
    bot: BotApi,
    client: reqwest::Client,
    max_bytes: u64,
}

impl TelegramRetriever {
    pub fn new(bot: BotApi, client: reqwest::Client, max_bytes: u64) -> Self {
        Self {
            bot,
            client,
            max_bytes,
        }
    }

    async fn locate(&self, file_id: &str) -> Result<String, RetrievalError> {
        let file = self
            .bot
            .get_file(file_id)
            .await
            .map_err(|err| RetrievalError::Lookup {
                file_id: file_id.to_string(),
                message: err.to_string(),
            })?;
        let file_path = file.file_path.filter(|p| !p.is_empty()).ok_or_else(|| {
            RetrievalError::Lookup {
                file_id: file_id.to_string(),
                message: "no file path returned".to_string(),
            }
        })?;
        Ok(self.bot.file_url(&file_path))
    }

    fn too_large(&self, actual: u64) -> RetrievalError {
        RetrievalError::TooLarge {
            max_bytes: self.max_bytes,
            actual,
        }
    }
}

#[async_trait]
impl FileRetriever for TelegramRetriever {
    async fn fetch(
        &self,
        media: &MediaReference,
        staged: &StagedFile,
    ) -> Result<u64, RetrievalError> {
        let url = self.locate(&media.file_id).await?;
        relay_info!(
            "Downloading {} from {} to {:?}",
            media.filename,
            self.bot.redact(&url),
            staged.path()
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RetrievalError::HttpStatus(status.as_u16()));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.max_bytes {
                return Err(self.too_large(content_len));
            }
        }

        let mut file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(staged.path())
            .await?;

        let mut written: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = written + chunk.len() as u64;
            if next_len > self.max_bytes {
                return Err(self.too_large(next_len));
            }
            file.write_all(&chunk).await?;
            written = next_len;
            relay_debug!("{}: {} bytes", staged.file_name(), written);
        }
        file.flush().await?;
        file.sync_all().await?;

        relay_info!("Downloaded {} ({} bytes)", media.filename, written);
        Ok(written)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> RetrievalError {
    if err.is_timeout() {
        return RetrievalError::Timeout;
    }
    RetrievalError::Network(err.without_url().to_string())
}

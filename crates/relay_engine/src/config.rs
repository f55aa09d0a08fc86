use std::path::PathBuf;
use std::time::Duration;

use crate::telegram::TELEGRAM_DEFAULT_API_BASE_URL;
use crate::telegraph::{TELEGRAPH_DEFAULT_API_BASE_URL, TELEGRAPH_DEFAULT_UPLOAD_ORIGIN};

/// Telegram's Bot API refuses to serve files above 20 MB.
pub const DEFAULT_MAX_DOWNLOAD_BYTES: u64 = 20 * 1024 * 1024;
pub const DEFAULT_AUTHOR_NAME: &str = "Telegraph Bot";

#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
        }
    }
}

impl HttpSettings {
    /// Client shared by every outbound call; each request is bounded by the
    /// configured timeouts.
    pub fn build_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.request_timeout)
            .build()
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub bot_token: String,
    pub telegraph_token: String,
    pub work_dir: PathBuf,
    pub author_name: String,
    pub telegram_api_base: String,
    pub telegraph_api_base: String,
    pub telegraph_upload_origin: String,
    pub http: HttpSettings,
    pub max_download_bytes: u64,
    pub poll_timeout: Duration,
}

impl EngineConfig {
    pub fn new(
        bot_token: impl Into<String>,
        telegraph_token: impl Into<String>,
        work_dir: PathBuf,
    ) -> Self {
        Self {
            bot_token: bot_token.into(),
            telegraph_token: telegraph_token.into(),
            work_dir,
            author_name: DEFAULT_AUTHOR_NAME.to_string(),
            telegram_api_base: TELEGRAM_DEFAULT_API_BASE_URL.to_string(),
            telegraph_api_base: TELEGRAPH_DEFAULT_API_BASE_URL.to_string(),
            telegraph_upload_origin: TELEGRAPH_DEFAULT_UPLOAD_ORIGIN.to_string(),
            http: HttpSettings::default(),
            max_download_bytes: DEFAULT_MAX_DOWNLOAD_BYTES,
            poll_timeout: Duration::from_secs(30),
        }
    }
}

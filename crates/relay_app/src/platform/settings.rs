use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use relay_engine::{
    EngineConfig, HttpSettings, DEFAULT_AUTHOR_NAME, DEFAULT_MAX_DOWNLOAD_BYTES,
    TELEGRAM_DEFAULT_API_BASE_URL, TELEGRAPH_DEFAULT_API_BASE_URL,
    TELEGRAPH_DEFAULT_UPLOAD_ORIGIN,
};
use serde::Deserialize;

/// Environment variable naming the settings file.
pub const CONFIG_ENV: &str = "RELAY_CONFIG";
pub const BOT_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";
pub const TELEGRAPH_TOKEN_ENV: &str = "TELEGRAPH_ACCESS_TOKEN";
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

const DEFAULT_SETTINGS_FILENAME: &str = "relay.ron";

/// Non-secret knobs read from the RON settings file. Every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub work_dir: PathBuf,
    pub log_dir: PathBuf,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_download_bytes: u64,
    pub poll_timeout_secs: u64,
    pub author_name: String,
    pub telegram_api_base: String,
    pub telegraph_api_base: String,
    pub telegraph_upload_origin: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("./temp"),
            log_dir: PathBuf::from("./logs"),
            connect_timeout_secs: 10,
            request_timeout_secs: 60,
            max_download_bytes: DEFAULT_MAX_DOWNLOAD_BYTES,
            poll_timeout_secs: 30,
            author_name: DEFAULT_AUTHOR_NAME.to_string(),
            telegram_api_base: TELEGRAM_DEFAULT_API_BASE_URL.to_string(),
            telegraph_api_base: TELEGRAPH_DEFAULT_API_BASE_URL.to_string(),
            telegraph_upload_origin: TELEGRAPH_DEFAULT_UPLOAD_ORIGIN.to_string(),
        }
    }
}

impl Settings {
    pub fn http(&self) -> HttpSettings {
        HttpSettings {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    pub fn engine_config(&self, secrets: Secrets) -> EngineConfig {
        let mut config = EngineConfig::new(
            secrets.bot_token,
            secrets.telegraph_token,
            self.work_dir.clone(),
        );
        config.author_name = self.author_name.clone();
        config.telegram_api_base = self.telegram_api_base.clone();
        config.telegraph_api_base = self.telegraph_api_base.clone();
        config.telegraph_upload_origin = self.telegraph_upload_origin.clone();
        config.http = self.http();
        config.max_download_bytes = self.max_download_bytes;
        config.poll_timeout = Duration::from_secs(self.poll_timeout_secs);
        config
    }
}

/// Loads settings from `explicit` if given (it must exist), otherwise from
/// `./relay.ron` when present, otherwise defaults.
pub fn load_settings(explicit: Option<&Path>) -> anyhow::Result<Settings> {
    match explicit {
        Some(path) => read_settings(path),
        None => {
            let fallback = Path::new(DEFAULT_SETTINGS_FILENAME);
            match fs::metadata(fallback) {
                Ok(_) => read_settings(fallback),
                Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Settings::default()),
                Err(err) => Err(err).with_context(|| format!("cannot access {fallback:?}")),
            }
        }
    }
}

fn read_settings(path: &Path) -> anyhow::Result<Settings> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read settings {path:?}"))?;
    parse_settings(&content).with_context(|| format!("invalid settings in {path:?}"))
}

fn parse_settings(content: &str) -> anyhow::Result<Settings> {
    let settings: Settings = ron::from_str(content)?;
    if settings.poll_timeout_secs == 0 {
        bail!("poll_timeout_secs must be greater than zero");
    }
    if settings.max_download_bytes == 0 {
        bail!("max_download_bytes must be greater than zero");
    }
    Ok(settings)
}

/// Credentials for the two remote services. Never logged.
pub struct Secrets {
    pub bot_token: String,
    pub telegraph_token: String,
}

impl Secrets {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        Ok(Self {
            bot_token: require(&lookup, BOT_TOKEN_ENV)?,
            telegraph_token: require(&lookup, TELEGRAPH_TOKEN_ENV)?,
        })
    }
}

fn require(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> anyhow::Result<String> {
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => bail!("{name} is not set (add it to the environment or .env)"),
    }
}

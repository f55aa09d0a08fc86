//! Relay engine: staging, retrieval, publishing and the run orchestrator.
mod config;
mod dispatch;
mod engine;
mod notify;
mod pipeline;
mod poll;
mod retrieve;
mod staging;
mod telegram;
mod telegraph;
mod types;

pub use config::{EngineConfig, HttpSettings, DEFAULT_AUTHOR_NAME, DEFAULT_MAX_DOWNLOAD_BYTES};
pub use dispatch::{classify, parse_command, Command, Dispatcher, Inbound, ReplySender};
pub use engine::{EngineError, RelayHandle};
pub use notify::{NotifyError, StatusHandle, StatusNotifier};
pub use pipeline::Pipeline;
pub use poll::run_polling;
pub use retrieve::{FileRetriever, TelegramRetriever};
pub use staging::{ensure_work_dir, StagedFile, StagingArea, StagingError};
pub use telegram::{
    BotApi, BotApiError, Chat, Document, Message, PhotoSize, TelegramFile, Update, User, Video,
    TELEGRAM_DEFAULT_API_BASE_URL,
};
pub use telegraph::{
    reference_page_text, reference_page_title, Account, Element, Node, Publisher,
    TelegraphClient, TelegraphEndpoints, TELEGRAPH_DEFAULT_API_BASE_URL,
    TELEGRAPH_DEFAULT_UPLOAD_ORIGIN,
};
pub use types::{
    ChatId, MessageId, PublishError, RetrievalError, RunError, RunReport, UnsupportedMediaError,
};

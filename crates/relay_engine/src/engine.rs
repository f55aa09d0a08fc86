use std::sync::Arc;

use relay_logging::relay_info;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::config::EngineConfig;
use crate::dispatch::Dispatcher;
use crate::pipeline::Pipeline;
use crate::poll::run_polling;
use crate::retrieve::TelegramRetriever;
use crate::staging::{ensure_work_dir, StagingArea, StagingError};
use crate::telegram::{BotApi, BotApiError};
use crate::telegraph::{TelegraphClient, TelegraphEndpoints};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
    #[error(transparent)]
    Staging(#[from] StagingError),
    #[error("bot token rejected: {0}")]
    Auth(#[from] BotApiError),
}

/// Process-wide wiring: one HTTP client, one bot client and one publisher,
/// shared by every run.
pub struct RelayHandle {
    bot: BotApi,
    dispatcher: Dispatcher,
    config: EngineConfig,
}

impl RelayHandle {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        ensure_work_dir(&config.work_dir)?;
        let client = config.http.build_client()?;

        let bot = BotApi::new(
            client.clone(),
            config.telegram_api_base.clone(),
            config.bot_token.clone(),
        );
        let retriever =
            TelegramRetriever::new(bot.clone(), client.clone(), config.max_download_bytes);
        let publisher = TelegraphClient::new(
            client,
            TelegraphEndpoints {
                upload_origin: config.telegraph_upload_origin.clone(),
                api_base: config.telegraph_api_base.clone(),
            },
            config.telegraph_token.clone(),
            config.author_name.clone(),
        );
        let pipeline = Pipeline::new(
            StagingArea::new(config.work_dir.clone()),
            Arc::new(retriever),
            Arc::new(publisher),
            Arc::new(bot.clone()),
        );
        let dispatcher = Dispatcher::new(Arc::new(pipeline), Arc::new(bot.clone()));

        Ok(Self {
            bot,
            dispatcher,
            config,
        })
    }

    /// Checks the bot token, then serves updates until `shutdown` fires.
    pub async fn run(&self, shutdown: CancellationToken) -> Result<(), EngineError> {
        let me = self.bot.get_me().await?;
        relay_info!(
            "Authorized as {} (work dir {:?})",
            me.display(),
            self.config.work_dir
        );
        run_polling(&self.bot, &self.dispatcher, self.config.poll_timeout, shutdown).await;
        Ok(())
    }
}

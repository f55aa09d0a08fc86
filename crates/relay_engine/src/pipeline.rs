use std::sync::Arc;

use relay_core::{
    advance, select_strategy, Effect, MediaReference, RunEvent, RunState, UploadStrategy,
    PROCESSING_TEXT,
};
use relay_logging::{relay_error, relay_info, relay_warn};

use crate::notify::{StatusHandle, StatusNotifier};
use crate::retrieve::FileRetriever;
use crate::staging::{StagedFile, StagingArea};
use crate::telegraph::Publisher;
use crate::types::{ChatId, RunError, RunReport};

/// Sequences one media run: stage, download, select, publish, report.
///
/// Collaborators are injected so tests can swap any of them for fakes.
#[derive(Clone)]
pub struct Pipeline {
    staging: StagingArea,
    retriever: Arc<dyn FileRetriever>,
    publisher: Arc<dyn Publisher>,
    notifier: Arc<dyn StatusNotifier>,
}

impl Pipeline {
    pub fn new(
        staging: StagingArea,
        retriever: Arc<dyn FileRetriever>,
        publisher: Arc<dyn Publisher>,
        notifier: Arc<dyn StatusNotifier>,
    ) -> Self {
        Self {
            staging,
            retriever,
            publisher,
            notifier,
        }
    }

    pub fn staging(&self) -> &StagingArea {
        &self.staging
    }

    /// Runs the whole pipeline for one media reference. Never fails: every
    /// error ends the run in [`RunState::Failed`] and is reported to the chat.
    ///
    /// If the returned future is dropped mid-run the staged file is still
    /// deleted when it goes out of scope.
    pub async fn handle_media(&self, chat_id: ChatId, media: MediaReference) -> RunReport {
        let status = match self.notifier.send_status(chat_id, PROCESSING_TEXT).await {
            Ok(handle) => Some(handle),
            Err(err) => {
                relay_warn!("Could not post status message in chat {}: {}", chat_id, err);
                None
            }
        };

        let mut driver = RunDriver {
            notifier: self.notifier.as_ref(),
            status,
            state: RunState::Idle,
        };
        let mut staged: Option<StagedFile> = None;

        driver.step(RunEvent::Begin).await;
        let result = self.execute(&mut driver, &mut staged, &media).await;

        let event = match &result {
            Ok(url) => {
                relay_info!("Published {} for chat {}: {}", media.filename, chat_id, url);
                RunEvent::Published { url: url.clone() }
            }
            Err(err) => {
                relay_error!(
                    "Run for {} in chat {} failed during {:?}: {:?}",
                    media.filename,
                    chat_id,
                    driver.state,
                    err
                );
                RunEvent::Failed {
                    message: err.to_string(),
                }
            }
        };
        let release = driver.step(event).await;
        if release {
            if let Some(file) = staged.take() {
                self.staging.release(file);
            }
        }

        RunReport {
            state: driver.state,
            result,
        }
    }

    async fn execute(
        &self,
        driver: &mut RunDriver<'_>,
        staged: &mut Option<StagedFile>,
        media: &MediaReference,
    ) -> Result<String, RunError> {
        let file = staged.insert(self.staging.acquire(&media.file_id, &media.extension())?);
        driver.step(RunEvent::Staged).await;

        self.retriever.fetch(media, file).await?;
        driver.step(RunEvent::Downloaded).await;

        let strategy = select_strategy(&media.filename);
        relay_info!("{} -> {:?}", media.filename, strategy);
        driver.step(RunEvent::StrategySelected(strategy)).await;

        let url = match strategy {
            UploadStrategy::DirectImageUpload => self.publisher.upload_image_direct(file).await?,
            UploadStrategy::PageEmbed => {
                self.publisher
                    .publish_as_page_reference(&media.filename)
                    .await?
            }
        };
        Ok(url)
    }
}

/// Applies run events and performs the notification effects. Release effects
/// are handed back to the caller, which owns the staged file.
struct RunDriver<'a> {
    notifier: &'a dyn StatusNotifier,
    status: Option<StatusHandle>,
    state: RunState,
}

impl RunDriver<'_> {
    async fn step(&mut self, event: RunEvent) -> bool {
        let (next, effects) = advance(self.state, event);
        self.state = next;
        let mut release = false;
        for effect in effects {
            match effect {
                Effect::Notify(notice) => {
                    let Some(handle) = self.status else {
                        continue;
                    };
                    if let Err(err) = self
                        .notifier
                        .edit_status(handle, &notice.text, notice.link_preview)
                        .await
                    {
                        relay_warn!("Status update failed in chat {}: {}", handle.chat_id, err);
                    }
                }
                Effect::ReleaseStaged => release = true,
            }
        }
        release
    }
}

use std::sync::Arc;

use relay_core::{MediaKind, ABOUT_TEXT, HELP_TEXT, START_TEXT, UNSUPPORTED_TEXT};
use relay_logging::{relay_debug, relay_info, relay_warn};
use tokio_util::task::TaskTracker;

use crate::pipeline::Pipeline;
use crate::telegram::{Message, Update};
use crate::types::{ChatId, RunReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    About,
}

impl Command {
    pub fn reply_text(self) -> &'static str {
        match self {
            Command::Start => START_TEXT,
            Command::Help => HELP_TEXT,
            Command::About => ABOUT_TEXT,
        }
    }
}

/// What an inbound message asks of the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Command(Command),
    Media(MediaKind),
    Unsupported,
    Ignored,
}

/// Parses `/start`, `/help@SomeBot extra`, … into a command.
pub fn parse_command(text: &str) -> Option<Command> {
    let first = text.split_whitespace().next()?;
    let name = first.strip_prefix('/')?;
    let name = name.split('@').next().unwrap_or(name);
    match name.to_ascii_lowercase().as_str() {
        "start" => Some(Command::Start),
        "help" => Some(Command::Help),
        "about" => Some(Command::About),
        _ => None,
    }
}

pub fn classify(message: &Message) -> Inbound {
    if message.from.as_ref().is_some_and(|user| user.is_bot) {
        return Inbound::Ignored;
    }
    if message.has_attachment() {
        return match message.media_kind() {
            Ok(kind) => Inbound::Media(kind),
            Err(_) => Inbound::Unsupported,
        };
    }
    message
        .text
        .as_deref()
        .and_then(parse_command)
        .map_or(Inbound::Ignored, Inbound::Command)
}

/// Routes updates to command replies or pipeline runs. Each media run gets its
/// own task; the tracker lets shutdown wait for in-flight runs.
pub struct Dispatcher {
    pipeline: Arc<Pipeline>,
    replies: Arc<dyn ReplySender>,
    tasks: TaskTracker,
}

/// Plain replies outside of a run's status message.
#[async_trait::async_trait]
pub trait ReplySender: Send + Sync {
    async fn reply(&self, chat_id: ChatId, text: &str);
}

#[async_trait::async_trait]
impl ReplySender for crate::telegram::BotApi {
    async fn reply(&self, chat_id: ChatId, text: &str) {
        if let Err(err) = self.send_message(chat_id, text).await {
            relay_warn!("Reply to chat {} failed: {}", chat_id, err);
        }
    }
}

impl Dispatcher {
    pub fn new(pipeline: Arc<Pipeline>, replies: Arc<dyn ReplySender>) -> Self {
        Self {
            pipeline,
            replies,
            tasks: TaskTracker::new(),
        }
    }

    pub fn dispatch(&self, update: Update) {
        let Some(message) = update.message else {
            relay_debug!("Skipping update {} without message", update.update_id);
            return;
        };
        let chat_id = message.chat.id;
        let sender = message
            .from
            .as_ref()
            .map(|user| user.display())
            .unwrap_or_else(|| chat_id.to_string());

        match classify(&message) {
            Inbound::Command(command) => {
                relay_info!("{:?} from {}", command, sender);
                let replies = self.replies.clone();
                self.tasks.spawn(async move {
                    replies.reply(chat_id, command.reply_text()).await;
                });
            }
            Inbound::Media(kind) => {
                relay_info!("Processing {} from {}", kind.label(), sender);
                let pipeline = self.pipeline.clone();
                self.tasks.spawn(async move {
                    let report: RunReport =
                        pipeline.handle_media(chat_id, kind.into_reference()).await;
                    relay_debug!("Run in chat {} ended in {:?}", chat_id, report.state);
                });
            }
            Inbound::Unsupported => {
                relay_info!("Unsupported attachment from {}", sender);
                let replies = self.replies.clone();
                self.tasks.spawn(async move {
                    replies.reply(chat_id, UNSUPPORTED_TEXT).await;
                });
            }
            Inbound::Ignored => {}
        }
    }

    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Stops accepting work and waits for spawned runs to finish.
    pub async fn drain(&self) {
        self.tasks.close();
        self.tasks.wait().await;
    }
}

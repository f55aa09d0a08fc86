use crate::messages::{failure_text, success_text, DOWNLOADING_TEXT, UPLOADING_TEXT};
use crate::UploadStrategy;

/// Lifecycle of one media run. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Staging,
    Downloading,
    Selecting,
    Publishing,
    Done,
    Failed,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Done | RunState::Failed)
    }

    fn can_fail(self) -> bool {
        matches!(
            self,
            RunState::Staging | RunState::Downloading | RunState::Publishing
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    Begin,
    Staged,
    Downloaded,
    StrategySelected(UploadStrategy),
    Published { url: String },
    Failed { message: String },
}

/// Text for the run's status message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub link_preview: bool,
}

impl Notice {
    fn progress(text: &str) -> Self {
        Self {
            text: text.to_string(),
            link_preview: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Notify(Notice),
    ReleaseStaged,
}

/// Pure transition function: applies an event to the run state and returns the
/// effects the orchestrator must carry out. Events that do not fit the current
/// state leave it untouched and produce nothing.
pub fn advance(state: RunState, event: RunEvent) -> (RunState, Vec<Effect>) {
    match (state, event) {
        (RunState::Idle, RunEvent::Begin) => (RunState::Staging, Vec::new()),
        (RunState::Staging, RunEvent::Staged) => (
            RunState::Downloading,
            vec![Effect::Notify(Notice::progress(DOWNLOADING_TEXT))],
        ),
        (RunState::Downloading, RunEvent::Downloaded) => (RunState::Selecting, Vec::new()),
        (RunState::Selecting, RunEvent::StrategySelected(_)) => (
            RunState::Publishing,
            vec![Effect::Notify(Notice::progress(UPLOADING_TEXT))],
        ),
        (RunState::Publishing, RunEvent::Published { url }) => (
            RunState::Done,
            vec![
                Effect::Notify(Notice {
                    text: success_text(&url),
                    link_preview: true,
                }),
                Effect::ReleaseStaged,
            ],
        ),
        (state, RunEvent::Failed { message }) if state.can_fail() => (
            RunState::Failed,
            vec![
                Effect::Notify(Notice {
                    text: failure_text(&message),
                    link_preview: false,
                }),
                Effect::ReleaseStaged,
            ],
        ),
        (state, _) => (state, Vec::new()),
    }
}

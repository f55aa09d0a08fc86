//! Relay core: media variants, strategy selection and the pure run state machine.
mod media;
mod messages;
mod run;
mod strategy;

pub use media::{DocumentRef, MediaKind, MediaReference, PhotoRef, VideoRef};
pub use messages::{
    failure_text, success_text, ABOUT_TEXT, DOWNLOADING_TEXT, HELP_TEXT, PROCESSING_TEXT,
    START_TEXT, UNSUPPORTED_TEXT, UPLOADING_TEXT,
};
pub use run::{advance, Effect, Notice, RunEvent, RunState};
pub use strategy::{select_strategy, UploadStrategy, IMAGE_EXTENSIONS};

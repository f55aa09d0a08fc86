mod app;
mod logging;
mod settings;

pub use app::{create_token, run_bot};
pub use settings::{load_settings, CONFIG_ENV};

//! User-facing texts sent back to the chat.

pub const START_TEXT: &str = "Welcome to the Media to Telegraph Link Converter Bot!\n\n\
Send me any photo, video, or document and I will convert it to a Telegraph link for you.\n\n\
Use /help for more information.";

pub const HELP_TEXT: &str = "How to use this bot:\n\n\
1. Simply send any photo, video, or document to the bot\n\
2. The bot will upload it to Telegraph and send you the link\n\
3. You can share this link with anyone\n\n\
Available commands:\n\
/start - Start the bot\n\
/help - Show this help message\n\
/about - Information about the bot";

pub const ABOUT_TEXT: &str = "Media to Telegraph Link Converter Bot\n\n\
This bot helps you convert media files to Telegraph links for easy sharing.\n\n\
Developed with Rust.";

pub const UNSUPPORTED_TEXT: &str = "Sorry, I don't support this media type.";

pub const PROCESSING_TEXT: &str = "⏳ Processing your media file...";
pub const DOWNLOADING_TEXT: &str = "⏳ Downloading your file...";
pub const UPLOADING_TEXT: &str = "⏳ Uploading to Telegraph...";

const SUCCESS_PREFIX: &str = "✅ Your media has been uploaded to Telegraph!";
const FAILURE_PREFIX: &str = "❌ Sorry, an error occurred while processing your media.";

pub fn success_text(url: &str) -> String {
    format!("{SUCCESS_PREFIX}\n\n{url}")
}

pub fn failure_text(message: &str) -> String {
    format!("{FAILURE_PREFIX}\n\nError: {message}")
}

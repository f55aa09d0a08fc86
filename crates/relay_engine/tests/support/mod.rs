#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use relay_engine::{
    BotApi, ChatId, HttpSettings, NotifyError, Pipeline, StagingArea, StatusHandle,
    StatusNotifier, TelegramRetriever, TelegraphClient, TelegraphEndpoints,
    DEFAULT_MAX_DOWNLOAD_BYTES,
};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const BOT_TOKEN: &str = "123:TEST";
pub const TELEGRAPH_TOKEN: &str = "telegraph-token";

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(relay_logging::initialize_for_tests);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Send { chat_id: ChatId, text: String },
    Edit { text: String, link_preview: bool },
}

#[derive(Default)]
pub struct RecordingNotifier {
    calls: Mutex<Vec<Call>>,
    fail_send: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_send: true,
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_edit(&self) -> Option<(String, bool)> {
        self.calls().into_iter().rev().find_map(|call| match call {
            Call::Edit { text, link_preview } => Some((text, link_preview)),
            Call::Send { .. } => None,
        })
    }
}

#[async_trait]
impl StatusNotifier for RecordingNotifier {
    async fn send_status(&self, chat_id: ChatId, text: &str) -> Result<StatusHandle, NotifyError> {
        if self.fail_send {
            return Err(NotifyError("chat not found".to_string()));
        }
        self.calls.lock().unwrap().push(Call::Send {
            chat_id,
            text: text.to_string(),
        });
        Ok(StatusHandle {
            chat_id,
            message_id: 1,
        })
    }

    async fn edit_status(
        &self,
        _handle: StatusHandle,
        text: &str,
        link_preview: bool,
    ) -> Result<(), NotifyError> {
        self.calls.lock().unwrap().push(Call::Edit {
            text: text.to_string(),
            link_preview,
        });
        Ok(())
    }
}

/// Pipeline whose Telegram and Telegraph endpoints all point at `server`.
pub fn pipeline_for(
    server: &MockServer,
    work_dir: &Path,
    notifier: Arc<dyn StatusNotifier>,
) -> Pipeline {
    let client = HttpSettings::default().build_client().unwrap();
    let bot = BotApi::new(client.clone(), server.uri(), BOT_TOKEN);
    let retriever = TelegramRetriever::new(bot, client.clone(), DEFAULT_MAX_DOWNLOAD_BYTES);
    let publisher = TelegraphClient::new(
        client,
        endpoints_for(server),
        TELEGRAPH_TOKEN,
        "Telegraph Bot",
    );
    Pipeline::new(
        StagingArea::new(work_dir.to_path_buf()),
        Arc::new(retriever),
        Arc::new(publisher),
        notifier,
    )
}

pub fn endpoints_for(server: &MockServer) -> TelegraphEndpoints {
    TelegraphEndpoints {
        upload_origin: server.uri(),
        api_base: server.uri(),
    }
}

pub async fn mount_get_file(server: &MockServer, file_id: &str, file_path: &str) {
    Mock::given(method("POST"))
        .and(path(format!("/bot{BOT_TOKEN}/getFile")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": { "file_id": file_id, "file_path": file_path }
        })))
        .mount(server)
        .await;
}

pub async fn mount_download(server: &MockServer, file_path: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(format!("/file/bot{BOT_TOKEN}/{file_path}")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

/// JSON bodies of every request the server received on `route`.
pub async fn json_bodies(server: &MockServer, route: &str) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|request| request.url.path() == route)
        .map(|request| serde_json::from_slice(&request.body).unwrap())
        .collect()
}

pub fn dir_entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

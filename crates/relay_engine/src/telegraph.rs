//! Telegraph publishing client.
//!
//! Images go through the binary `/upload` endpoint and are then wrapped in a
//! page; everything else becomes a text page naming the file, since Telegraph
//! only hosts raster images.

use std::collections::BTreeMap;

use async_trait::async_trait;
use relay_logging::{relay_info, relay_warn};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::staging::StagedFile;
use crate::types::PublishError;

pub const TELEGRAPH_DEFAULT_UPLOAD_ORIGIN: &str = "https://telegra.ph";
pub const TELEGRAPH_DEFAULT_API_BASE_URL: &str = "https://api.telegra.ph";

const IMAGE_PAGE_TITLE: &str = "Shared Media";

/// A node of Telegraph's content tree: plain text or an element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Text(String),
    Element(Element),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Node>>,
}

impl Node {
    /// `<figure><img src=…></figure>`
    pub fn image_figure(src: &str) -> Self {
        let img = Node::Element(Element {
            tag: "img".to_string(),
            attrs: Some(BTreeMap::from([("src".to_string(), src.to_string())])),
            children: None,
        });
        Node::Element(Element {
            tag: "figure".to_string(),
            attrs: None,
            children: Some(vec![img]),
        })
    }

    /// `<p>text</p>`
    pub fn paragraph(text: impl Into<String>) -> Self {
        Node::Element(Element {
            tag: "p".to_string(),
            attrs: None,
            children: Some(vec![Node::Text(text.into())]),
        })
    }
}

pub fn reference_page_title(filename: &str) -> String {
    format!("{IMAGE_PAGE_TITLE}: {filename}")
}

pub fn reference_page_text(filename: &str) -> String {
    format!(
        "This file ({filename}) cannot be directly embedded. It has been processed by the Telegraph Bot."
    )
}

#[async_trait]
pub trait Publisher: Send + Sync {
    /// Uploads the staged image and returns the URL of a page showing it.
    async fn upload_image_direct(&self, staged: &StagedFile) -> Result<String, PublishError>;

    /// Creates a text page naming `filename` and returns its URL.
    async fn publish_as_page_reference(&self, filename: &str) -> Result<String, PublishError>;
}

#[derive(Debug, Clone)]
pub struct TelegraphEndpoints {
    /// Origin of `/upload`; returned `src` paths are resolved against it.
    pub upload_origin: String,
    /// Base of the page API (`/createPage`, `/createAccount`).
    pub api_base: String,
}

impl Default for TelegraphEndpoints {
    fn default() -> Self {
        Self {
            upload_origin: TELEGRAPH_DEFAULT_UPLOAD_ORIGIN.to_string(),
            api_base: TELEGRAPH_DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

impl TelegraphEndpoints {
    fn upload_url(&self) -> String {
        format!("{}/upload", self.upload_origin.trim_end_matches('/'))
    }

    fn api_url(&self, method: &str) -> String {
        format!("{}/{}", self.api_base.trim_end_matches('/'), method)
    }

    fn absolute(&self, src: &str) -> String {
        format!(
            "{}/{}",
            self.upload_origin.trim_end_matches('/'),
            src.trim_start_matches('/')
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Account {
    pub short_name: String,
    #[serde(default)]
    pub author_name: Option<String>,
    pub access_token: String,
}

#[derive(Debug, Clone)]
pub struct TelegraphClient {
    client: reqwest::Client,
    endpoints: TelegraphEndpoints,
    access_token: String,
    author_name: String,
}

impl TelegraphClient {
    pub fn new(
        client: reqwest::Client,
        endpoints: TelegraphEndpoints,
        access_token: impl Into<String>,
        author_name: impl Into<String>,
    ) -> Self {
        Self {
            client,
            endpoints,
            access_token: access_token.into(),
            author_name: author_name.into(),
        }
    }

    /// Sends the staged file to `/upload` and returns the absolute image URL.
    pub async fn upload_file(&self, staged: &StagedFile) -> Result<String, PublishError> {
        let bytes = tokio::fs::read(staged.path()).await?;
        let mime = mime_guess::from_path(staged.path())
            .first_raw()
            .unwrap_or("application/octet-stream");
        let part = Part::bytes(bytes)
            .file_name(staged.file_name())
            .mime_str(mime)
            .map_err(|err| PublishError::Network(err.to_string()))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.endpoints.upload_url())
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(PublishError::HttpStatus(status.as_u16()));
        }
        let body = response.text().await.map_err(map_reqwest_error)?;
        let src = parse_upload_src(&body)?;
        let image_url = self.endpoints.absolute(&src);
        relay_info!("Image uploaded to Telegraph: {}", image_url);
        Ok(image_url)
    }

    /// Creates a page and returns its URL.
    pub async fn create_page(&self, title: &str, content: &[Node]) -> Result<String, PublishError> {
        let body = json!({
            "access_token": self.access_token,
            "title": title,
            "author_name": self.author_name,
            "content": content,
            "return_content": false,
        });
        let response = self
            .client
            .post(self.endpoints.api_url("createPage"))
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(PublishError::HttpStatus(status.as_u16()));
        }
        let body = response.text().await.map_err(map_reqwest_error)?;
        let url = parse_page_url(&body)?;
        relay_info!("Telegraph page created: {}", url);
        Ok(url)
    }

    /// Registers a new Telegraph account; used once to mint an access token.
    pub async fn create_account(
        client: &reqwest::Client,
        endpoints: &TelegraphEndpoints,
        short_name: &str,
        author_name: &str,
        author_url: Option<&str>,
    ) -> Result<Account, PublishError> {
        let mut body = json!({
            "short_name": short_name,
            "author_name": author_name,
        });
        if let Some(url) = author_url {
            body["author_url"] = json!(url);
        }
        let response = client
            .post(endpoints.api_url("createAccount"))
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(PublishError::HttpStatus(status.as_u16()));
        }
        let body = response.text().await.map_err(map_reqwest_error)?;
        let value = parse_api_result(&body)?;
        serde_json::from_value(value)
            .map_err(|err| PublishError::UnexpectedResponse(err.to_string()))
    }
}

#[async_trait]
impl Publisher for TelegraphClient {
    async fn upload_image_direct(&self, staged: &StagedFile) -> Result<String, PublishError> {
        let image_url = self.upload_file(staged).await?;
        self.create_page(IMAGE_PAGE_TITLE, &[Node::image_figure(&image_url)])
            .await
    }

    async fn publish_as_page_reference(&self, filename: &str) -> Result<String, PublishError> {
        let content = [Node::paragraph(reference_page_text(filename))];
        let url = self
            .create_page(&reference_page_title(filename), &content)
            .await?;
        relay_info!("Reference page for {} created: {}", filename, url);
        Ok(url)
    }
}

/// `/upload` answers `[{"src": "/file/…"}]` on success and `{"error": …}`
/// otherwise.
fn parse_upload_src(body: &str) -> Result<String, PublishError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|_| PublishError::UnexpectedResponse(snippet(body)))?;
    if let Some(src) = value
        .get(0)
        .and_then(|first| first.get("src"))
        .and_then(Value::as_str)
        .filter(|src| !src.is_empty())
    {
        return Ok(src.to_string());
    }
    if let Some(error) = value.get("error").and_then(Value::as_str) {
        return Err(PublishError::Api(error.to_string()));
    }
    relay_warn!("Unexpected upload response: {}", snippet(body));
    Err(PublishError::UnexpectedResponse(
        "missing src in upload response".to_string(),
    ))
}

fn parse_page_url(body: &str) -> Result<String, PublishError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|_| PublishError::UnexpectedResponse(snippet(body)))?;
    // Bare `{"url": …}` objects are accepted alongside the usual envelope.
    if let Some(url) = value.get("url").and_then(Value::as_str) {
        return Ok(url.to_string());
    }
    let result = parse_api_result(body)?;
    result
        .get("url")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| PublishError::UnexpectedResponse("missing url in page response".to_string()))
}

/// Unwraps `{"ok": true, "result": …}`.
fn parse_api_result(body: &str) -> Result<Value, PublishError> {
    let mut value: Value = serde_json::from_str(body)
        .map_err(|_| PublishError::UnexpectedResponse(snippet(body)))?;
    match value.get("ok").and_then(Value::as_bool) {
        Some(true) => value
            .get_mut("result")
            .map(Value::take)
            .ok_or_else(|| PublishError::UnexpectedResponse("missing result".to_string())),
        Some(false) => Err(PublishError::Api(
            value
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("request rejected")
                .to_string(),
        )),
        None => Err(PublishError::UnexpectedResponse(snippet(body))),
    }
}

fn snippet(body: &str) -> String {
    const MAX: usize = 120;
    let trimmed = body.trim();
    if trimmed.len() <= MAX {
        return trimmed.to_string();
    }
    let mut end = MAX;
    while end > 0 && !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &trimmed[..end])
}

fn map_reqwest_error(err: reqwest::Error) -> PublishError {
    if err.is_timeout() {
        return PublishError::Timeout;
    }
    PublishError::Network(err.to_string())
}

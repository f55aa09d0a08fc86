use std::path::Path;

/// Longest extension carried over to a staged file name.
const MAX_EXTENSION_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoRef {
    pub file_id: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRef {
    pub file_id: String,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    pub file_id: String,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
}

/// The recognised attachment kinds of an inbound message, resolved once at the
/// platform boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaKind {
    Photo(PhotoRef),
    Video(VideoRef),
    Document(DocumentRef),
}

impl MediaKind {
    pub fn label(&self) -> &'static str {
        match self {
            MediaKind::Photo(_) => "photo",
            MediaKind::Video(_) => "video",
            MediaKind::Document(_) => "document",
        }
    }

    pub fn file_id(&self) -> &str {
        match self {
            MediaKind::Photo(photo) => &photo.file_id,
            MediaKind::Video(video) => &video.file_id,
            MediaKind::Document(doc) => &doc.file_id,
        }
    }

    /// Infers the display filename and produces the run-scoped reference.
    ///
    /// Photos never carry a name; videos and documents fall back to a name
    /// derived from the file id when the sender's client omitted one.
    pub fn into_reference(self) -> MediaReference {
        let (file_id, filename) = match self {
            MediaKind::Photo(photo) => {
                let name = format!("photo_{}.jpg", photo.file_id);
                (photo.file_id, name)
            }
            MediaKind::Video(video) => {
                let name = non_empty(video.file_name)
                    .unwrap_or_else(|| format!("video_{}.mp4", video.file_id));
                (video.file_id, name)
            }
            MediaKind::Document(doc) => {
                let name =
                    non_empty(doc.file_name).unwrap_or_else(|| format!("document_{}", doc.file_id));
                (doc.file_id, name)
            }
        };
        MediaReference { file_id, filename }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Remote file identifier plus the display filename used for strategy
/// selection and page text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaReference {
    pub file_id: String,
    pub filename: String,
}

impl MediaReference {
    pub fn new(file_id: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            file_id: file_id.into(),
            filename: filename.into(),
        }
    }

    /// Extension of the display filename including the leading dot, or an
    /// empty string when there is none usable on a local filesystem.
    pub fn extension(&self) -> String {
        Path::new(&self.filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| {
                !ext.is_empty()
                    && ext.len() <= MAX_EXTENSION_LEN
                    && ext.chars().all(|c| c.is_ascii_alphanumeric())
            })
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default()
    }
}

use std::path::Path;

/// Extensions that always go through direct upload, whatever the MIME table says.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadStrategy {
    /// Binary upload of the file followed by a page embedding the image.
    DirectImageUpload,
    /// Text-only page naming the file.
    PageEmbed,
}

/// Picks the publishing strategy for a display filename.
///
/// Precedence: a guessed `image/*` MIME type, then the fixed extension list
/// (case-insensitive), otherwise a text page.
pub fn select_strategy(filename: &str) -> UploadStrategy {
    if guessed_image_type(filename) || has_image_extension(filename) {
        UploadStrategy::DirectImageUpload
    } else {
        UploadStrategy::PageEmbed
    }
}

fn guessed_image_type(filename: &str) -> bool {
    mime_guess::from_path(filename)
        .first_raw()
        .is_some_and(|mime| mime.starts_with("image/"))
}

fn has_image_extension(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

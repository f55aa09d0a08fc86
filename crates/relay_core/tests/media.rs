use pretty_assertions::assert_eq;
use relay_core::{DocumentRef, MediaKind, MediaReference, PhotoRef, VideoRef};

#[test]
fn photo_name_is_derived_from_file_id() {
    let media = MediaKind::Photo(PhotoRef {
        file_id: "AgAC123".to_string(),
        width: 1280,
        height: 720,
    });
    assert_eq!(media.label(), "photo");
    assert_eq!(
        media.into_reference(),
        MediaReference::new("AgAC123", "photo_AgAC123.jpg")
    );
}

#[test]
fn video_keeps_declared_name_or_falls_back() {
    let named = MediaKind::Video(VideoRef {
        file_id: "BAAD1".to_string(),
        file_name: Some("clip.mov".to_string()),
        mime_type: Some("video/quicktime".to_string()),
    });
    assert_eq!(named.into_reference().filename, "clip.mov");

    let unnamed = MediaKind::Video(VideoRef {
        file_id: "BAAD2".to_string(),
        file_name: None,
        mime_type: None,
    });
    assert_eq!(unnamed.into_reference().filename, "video_BAAD2.mp4");
}

#[test]
fn document_blank_name_falls_back() {
    let media = MediaKind::Document(DocumentRef {
        file_id: "BQAC9".to_string(),
        file_name: Some("  ".to_string()),
        mime_type: None,
    });
    assert_eq!(media.file_id(), "BQAC9");
    assert_eq!(media.into_reference().filename, "document_BQAC9");
}

#[test]
fn extension_keeps_dot_and_rejects_odd_suffixes() {
    assert_eq!(MediaReference::new("x", "report.pdf").extension(), ".pdf");
    assert_eq!(MediaReference::new("x", "photo.JPG").extension(), ".JPG");
    assert_eq!(MediaReference::new("x", "document_x").extension(), "");
    assert_eq!(MediaReference::new("x", "weird.p d f").extension(), "");
}

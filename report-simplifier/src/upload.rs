use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::ImageFormat;
use tracing::debug;

use crate::model::Part;

/// Content type declared when nothing better can be determined
pub const FALLBACK_MIME_TYPE: &str = "image/jpeg";

/// An uploaded report image, ready to be sent inline to the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

impl InlineImage {
    /// Build from an upload: bare base64, or `<metadata>,<base64>` as a
    /// browser data URI would produce. Everything up to the first comma is
    /// stripped before transmission.
    pub fn from_upload(upload: &str) -> Self {
        let upload = upload.trim();
        let (header, data) = match upload.split_once(',') {
            Some((header, data)) if !data.is_empty() => (Some(header), data),
            _ => (None, upload),
        };

        let mime_type = header
            .and_then(mime_from_header)
            .or_else(|| sniff_mime_type(data))
            .unwrap_or_else(|| FALLBACK_MIME_TYPE.to_string());

        debug!(mime_type = %mime_type, bytes = data.len(), "Prepared inline image");

        Self {
            mime_type,
            data: data.to_string(),
        }
    }

    pub fn into_part(self) -> Part {
        Part::inline_data(self.mime_type, self.data)
    }
}

/// `data:image/png;base64` -> `image/png`
fn mime_from_header(header: &str) -> Option<String> {
    let media_type = header
        .strip_prefix("data:")?
        .split(';')
        .next()?
        .trim()
        .to_ascii_lowercase();

    media_type.starts_with("image/").then_some(media_type)
}

/// Look at the decoded magic bytes
fn sniff_mime_type(data: &str) -> Option<String> {
    let bytes = STANDARD.decode(data.trim()).ok()?;
    let format = image::guess_format(&bytes).ok()?;

    let mime_type = match format {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Gif => "image/gif",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Bmp => "image/bmp",
        ImageFormat::Tiff => "image/tiff",
        _ => return None,
    };
    Some(mime_type.to_string())
}

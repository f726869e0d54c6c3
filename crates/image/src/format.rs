//! Output format selection from the uploaded file name.
//!
//! The policy is deliberately name-based: a `.png` upload is answered with
//! PNG, anything else with JPEG. Decoded content is never inspected.

use serde::{Deserialize, Serialize};

/// Output container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// Lossless PNG
    Png,
    /// Lossy JPEG
    Jpeg,
}

impl ImageFormat {
    /// Get the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }
}

/// The outcome of [`select_format`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatSelection {
    /// Container to encode into
    pub format: ImageFormat,
    /// `Content-Type` value for the response
    pub mime_type: &'static str,
    /// Lowercased extension of the uploaded name (with the dot), or empty
    pub extension: String,
}

/// Choose the output format for an upload called `filename`.
///
/// # Example
/// ```
/// use citra_image::{select_format, ImageFormat};
///
/// assert_eq!(select_format("photo.PNG").format, ImageFormat::Png);
/// assert_eq!(select_format("photo.gif").format, ImageFormat::Jpeg);
/// assert_eq!(select_format("photo.gif").extension, ".gif");
/// ```
pub fn select_format(filename: &str) -> FormatSelection {
    let extension = file_extension(filename);
    let format = if extension == ".png" {
        ImageFormat::Png
    } else {
        ImageFormat::Jpeg
    };

    FormatSelection {
        format,
        mime_type: format.mime_type(),
        extension,
    }
}

/// Lowercased extension of the last path component, including the dot.
///
/// Leading dots of the component never start an extension, so `.png` has
/// none while `archive.tar.PNG` yields `.png`.
pub fn file_extension(filename: &str) -> String {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let stem_start = name.len() - name.trim_start_matches('.').len();

    match name[stem_start..].rfind('.') {
        Some(dot) => name[stem_start + dot..].to_lowercase(),
        None => String::new(),
    }
}

//! The decode → transform → encode pipeline behind each route.

use crate::config::ServerConfig;
use crate::error::ServiceError;
use axum::body::Bytes;
use citra_image::{
    blur_edges, decode, encode, grayscale, resize, select_format, ImageFormat,
};

/// Plaintext returned from `GET /`
pub const SERVICE_BANNER: &str = "Citra image services";

/// A transformation the service can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Luminance conversion
    Grayscale,
    /// Sharp centre circle over a blurred frame
    BlurEdges,
    /// Scale both axes by a percentage
    Resize {
        /// Integer percentage, any sign
        percentage: i64,
    },
}

impl Operation {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Grayscale => "grayscale",
            Self::BlurEdges => "blur_edges",
            Self::Resize { .. } => "resize",
        }
    }

    /// Attachment name prefix; `None` means the result is sent inline
    pub fn download_stem(&self) -> Option<&'static str> {
        match self {
            Self::Grayscale => None,
            Self::BlurEdges => Some("output_blur_edges"),
            Self::Resize { .. } => Some("output_resized"),
        }
    }
}

/// An upload taken from the request, owned by that request only.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client-supplied name, used only for format selection
    pub filename: String,
    /// Raw file bytes
    pub bytes: Bytes,
}

/// Encoded output ready to be written to the response.
#[derive(Debug, Clone)]
pub struct TransformResult {
    /// Encoded image
    pub bytes: Vec<u8>,
    /// Container used
    pub format: ImageFormat,
    /// `Content-Type` value
    pub mime_type: &'static str,
    /// Attachment file name, if the route sends one
    pub download_name: Option<String>,
}

/// The image service. Holds configuration only; every call is independent.
#[derive(Debug, Clone)]
pub struct ImageService {
    config: ServerConfig,
}

impl ImageService {
    /// Create a service from validated configuration
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Service configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Run `operation` on `upload` from start to finish.
    ///
    /// CPU-bound; call from a blocking context.
    pub fn process(
        &self,
        operation: Operation,
        upload: UploadedFile,
    ) -> Result<TransformResult, ServiceError> {
        let timer = citra_telemetry::Timer::start(operation.name());
        let selection = select_format(&upload.filename);

        let grid = decode(&upload.bytes)?;
        tracing::debug!(
            operation = operation.name(),
            filename = %upload.filename,
            width = grid.width(),
            height = grid.height(),
            "Decoded upload"
        );
        drop(upload);

        let output = match operation {
            Operation::Grayscale => grayscale(&grid),
            Operation::BlurEdges => blur_edges(&grid),
            Operation::Resize { percentage } => resize(&grid, percentage)?,
        };
        drop(grid);

        let bytes = encode(output, selection.format, self.config.jpeg_quality)?;
        let download_name = operation
            .download_stem()
            .map(|stem| format!("{stem}{}", header_safe(&selection.extension)));

        let elapsed = timer.stop();
        tracing::info!(
            operation = operation.name(),
            format = ?selection.format,
            bytes = bytes.len(),
            duration_ms = elapsed.as_millis() as u64,
            "Processed upload"
        );

        Ok(TransformResult {
            bytes,
            format: selection.format,
            mime_type: selection.mime_type,
            download_name,
        })
    }
}

/// Keep only visible ASCII that can sit inside a quoted header parameter.
fn header_safe(extension: &str) -> String {
    extension
        .chars()
        .filter(|c| c.is_ascii_graphic() && !matches!(*c, '"' | '\\' | ';'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use citra_image::{Channels, ImageError, PixelGrid, DEFAULT_PERCENTAGE};

    fn png(width: u32, height: u32) -> Bytes {
        let grid = PixelGrid::filled(width, height, Channels::Rgb, &[30, 60, 90]).unwrap();
        Bytes::from(encode(grid, ImageFormat::Png, 95).unwrap())
    }

    fn upload(filename: &str, bytes: Bytes) -> UploadedFile {
        UploadedFile {
            filename: filename.to_string(),
            bytes,
        }
    }

    #[test]
    fn test_grayscale_is_inline() {
        let service = ImageService::new(ServerConfig::default());
        let result = service
            .process(Operation::Grayscale, upload("a.png", png(8, 8)))
            .unwrap();

        assert_eq!(result.format, ImageFormat::Png);
        assert_eq!(result.mime_type, "image/png");
        assert!(result.download_name.is_none());
    }

    #[test]
    fn test_download_names_keep_original_extension() {
        let service = ImageService::new(ServerConfig::default());

        let blurred = service
            .process(Operation::BlurEdges, upload("a.JPEG", png(8, 8)))
            .unwrap();
        assert_eq!(blurred.format, ImageFormat::Jpeg);
        assert_eq!(blurred.download_name.as_deref(), Some("output_blur_edges.jpeg"));

        let resized = service
            .process(Operation::Resize { percentage: DEFAULT_PERCENTAGE }, upload("a.gif", png(8, 8)))
            .unwrap();
        assert_eq!(resized.mime_type, "image/jpeg");
        assert_eq!(resized.download_name.as_deref(), Some("output_resized.gif"));

        let bare = service
            .process(Operation::Resize { percentage: DEFAULT_PERCENTAGE }, upload("a", png(8, 8)))
            .unwrap();
        assert_eq!(bare.download_name.as_deref(), Some("output_resized"));
    }

    #[test]
    fn test_download_name_drops_unsafe_bytes() {
        let service = ImageService::new(ServerConfig::default());
        let result = service
            .process(
                Operation::BlurEdges,
                upload("a.p\u{7f}n\"g\u{e9}", png(4, 4)),
            )
            .unwrap();

        assert_eq!(result.format, ImageFormat::Jpeg);
        assert_eq!(result.download_name.as_deref(), Some("output_blur_edges.png"));
        assert_eq!(header_safe(".a b;c\\d"), ".abcd");
    }

    #[test]
    fn test_errors_surface_typed() {
        let service = ImageService::new(ServerConfig::default());

        let err = service
            .process(Operation::Grayscale, upload("a.png", Bytes::from_static(b"text")))
            .unwrap_err();
        assert!(matches!(err, ServiceError::Image(ImageError::Decode)));

        let err = service
            .process(Operation::Resize { percentage: 5 }, upload("a.png", png(10, 10)))
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Image(ImageError::InvalidDimension { .. })
        ));
    }
}

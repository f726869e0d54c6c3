//! HTTP routes: multipart extraction and response shaping.

use crate::error::ServiceError;
use crate::service::{ImageService, Operation, TransformResult, UploadedFile, SERVICE_BANNER};
use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use citra_image::DEFAULT_PERCENTAGE;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Form field carrying the image
const IMAGE_FIELD: &str = "image";

/// Optional resize form field
const PERCENTAGE_FIELD: &str = "percentage";

/// Build the application router around `service`.
pub fn router(service: Arc<ImageService>) -> Router {
    let body_limit = service.config().max_upload_bytes;

    Router::new()
        .route("/", get(index))
        .route("/grayscale", post(grayscale))
        .route("/blur_edges", post(blur_edges))
        .route("/resize", post(resize))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

async fn index() -> &'static str {
    SERVICE_BANNER
}

async fn grayscale(
    State(service): State<Arc<ImageService>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<TransformResult, ServiceError> {
    let form = UploadForm::read(multipart?).await?;
    run(service, Operation::Grayscale, form.into_image()?).await
}

async fn blur_edges(
    State(service): State<Arc<ImageService>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<TransformResult, ServiceError> {
    let form = UploadForm::read(multipart?).await?;
    run(service, Operation::BlurEdges, form.into_image()?).await
}

async fn resize(
    State(service): State<Arc<ImageService>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<TransformResult, ServiceError> {
    let form = UploadForm::read(multipart?).await?;
    let percentage = form.percentage();
    run(service, Operation::Resize { percentage }, form.into_image()?).await
}

async fn run(
    service: Arc<ImageService>,
    operation: Operation,
    upload: UploadedFile,
) -> Result<TransformResult, ServiceError> {
    let result = tokio::task::spawn_blocking(move || service.process(operation, upload)).await??;
    tracing::debug!(
        operation = operation.name(),
        format = ?result.format,
        bytes = result.bytes.len(),
        "Transform complete"
    );
    Ok(result)
}

/// Fields read from a multipart body. Unknown fields are skipped.
#[derive(Debug, Default)]
struct UploadForm {
    image: Option<UploadedFile>,
    percentage: Option<String>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ServiceError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().map(str::to_owned);
            match name.as_deref() {
                Some(IMAGE_FIELD) if form.image.is_none() && field.file_name().is_some() => {
                    let filename = field.file_name().unwrap_or_default().to_string();
                    let bytes = field.bytes().await?;
                    form.image = Some(UploadedFile { filename, bytes });
                }
                Some(PERCENTAGE_FIELD) if form.percentage.is_none() => {
                    form.percentage = Some(field.text().await?);
                }
                _ => {}
            }
        }

        Ok(form)
    }

    fn into_image(self) -> Result<UploadedFile, ServiceError> {
        self.image.ok_or(ServiceError::MissingField(IMAGE_FIELD))
    }

    /// The `percentage` field, or the default when absent or not an integer.
    fn percentage(&self) -> i64 {
        match self.percentage.as_deref().map(str::trim) {
            None => DEFAULT_PERCENTAGE,
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::debug!(value = raw, "Unparsable percentage, using default");
                DEFAULT_PERCENTAGE
            }),
        }
    }
}

impl IntoResponse for TransformResult {
    fn into_response(self) -> Response {
        match self.download_name {
            Some(name) => (
                [
                    (header::CONTENT_TYPE, self.mime_type.to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{name}\""),
                    ),
                ],
                self.bytes,
            )
                .into_response(),
            None => ([(header::CONTENT_TYPE, self.mime_type)], self.bytes).into_response(),
        }
    }
}

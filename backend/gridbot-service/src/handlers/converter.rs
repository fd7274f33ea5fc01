/// Image converter endpoint
///
/// Accepts a multipart form with an `image` file and a `dimensions` JSON
/// field, and answers with the AVIF re-encoding as base64.
use crate::error::Result;
use crate::handlers::multipart::{read_form, MAX_FORM_BYTES};
use crate::services::{image, Dimensions};
use actix_multipart::Multipart;
use actix_web::HttpResponse;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertedImageResponse {
    pub b64_data: String,
    pub content_type: &'static str,
    pub extension: &'static str,
}

/// POST /api/v1/converter/image
pub async fn convert_image(payload: Multipart) -> Result<HttpResponse> {
    let mut form = read_form(payload, MAX_FORM_BYTES).await?;
    let dimensions: Dimensions = form.json("dimensions")?;
    let input = form.take("image")?;

    let converted = image::convert(input, dimensions).await?;
    tracing::debug!(
        width = converted.width,
        height = converted.height,
        bytes = converted.bytes.len(),
        "image converted"
    );

    Ok(HttpResponse::Accepted().json(ConvertedImageResponse {
        b64_data: STANDARD.encode(&converted.bytes),
        content_type: converted.content_type,
        extension: converted.extension,
    }))
}

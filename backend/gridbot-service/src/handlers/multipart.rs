use crate::error::AppError;
use actix_multipart::Multipart;
use futures::StreamExt;
use std::collections::HashMap;

/// Upper bound on the whole form (image plus JSON fields)
pub const MAX_FORM_BYTES: usize = 20 * 1024 * 1024;

/// Named parts of a buffered multipart form
#[derive(Debug, Default)]
pub struct FormParts {
    parts: HashMap<String, Vec<u8>>,
}

impl FormParts {
    /// Remove and return the raw bytes of part `name`
    pub fn take(&mut self, name: &str) -> Result<Vec<u8>, AppError> {
        self.parts
            .remove(name)
            .filter(|bytes| !bytes.is_empty())
            .ok_or_else(|| AppError::bad_request(format!("missing form field `{}`", name)))
    }

    /// Part `name` parsed as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&mut self, name: &str) -> Result<T, AppError> {
        let raw = self.take(name)?;
        serde_json::from_slice(&raw)
            .map_err(|e| AppError::bad_request(format!("invalid `{}` field: {}", name, e)))
    }
}

/// Buffer every named part of `payload`, failing once `limit` bytes are exceeded
///
/// Unnamed parts are drained and dropped.
pub async fn read_form(mut payload: Multipart, limit: usize) -> Result<FormParts, AppError> {
    let mut form = FormParts::default();
    let mut total: usize = 0;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| {
            tracing::warn!("Error reading multipart form: {}", e);
            AppError::bad_request(format!("malformed multipart body: {}", e))
        })?;
        let name = field.name().map(str::to_string);

        let mut buf = Vec::new();
        while let Some(chunk) = field.next().await {
            let bytes = chunk.map_err(|e| {
                tracing::warn!("Error reading upload field: {}", e);
                AppError::bad_request(format!("malformed multipart field: {}", e))
            })?;
            total += bytes.len();
            if total > limit {
                return Err(AppError::PayloadTooLarge(format!(
                    "form exceeds {} bytes",
                    limit
                )));
            }
            buf.extend_from_slice(&bytes);
        }

        if let Some(name) = name {
            form.parts.insert(name, buf);
        }
    }

    Ok(form)
}

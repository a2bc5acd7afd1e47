use actix_multipart::{Field, Multipart};
use futures_util::TryStreamExt;

use super::ShareError;

/// Raw text fields plus the optional attachment, exactly as the form posts
/// them. Validation happens after collection, in the handler.
#[derive(Default)]
pub struct ShareForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub file: Option<UploadedFile>,
}

pub struct UploadedFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Drains the multipart stream, rejecting the attachment mid-stream once it
/// crosses `max_file_bytes` so oversized uploads never buffer fully.
pub async fn collect(
    mut payload: Multipart,
    max_file_bytes: usize,
) -> Result<ShareForm, ShareError> {
    let mut form = ShareForm::default();

    while let Some(mut field) = payload.try_next().await.map_err(malformed)? {
        let (field_name, filename) = {
            let disposition = field.content_disposition();
            (
                disposition.get_name().unwrap_or_default().to_string(),
                disposition.get_filename().map(ToString::to_string),
            )
        };

        match field_name.as_str() {
            "file" => {
                let content_type = field
                    .content_type()
                    .map(|mime| mime.essence_str().to_string());
                let bytes = read_file(&mut field, max_file_bytes).await?;

                // An empty file part means "no attachment" to the browser.
                if !bytes.is_empty() {
                    form.file = Some(UploadedFile {
                        filename: filename.unwrap_or_default(),
                        content_type,
                        bytes,
                    });
                }
            }
            other => {
                let value = read_text(&mut field).await?;
                match other {
                    "name" => form.name = Some(value),
                    "email" => form.email = Some(value),
                    "type" => form.category = Some(value),
                    "description" => form.description = Some(value),
                    "website" => form.website = Some(value),
                    _ => {}
                }
            }
        }
    }

    Ok(form)
}

async fn read_file(field: &mut Field, max_file_bytes: usize) -> Result<Vec<u8>, ShareError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(malformed)? {
        if bytes.len() + chunk.len() > max_file_bytes {
            return Err(ShareError::ValidationError(format!(
                "File too large. Maximum {}MB allowed.",
                max_file_bytes / (1024 * 1024)
            )));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

async fn read_text(field: &mut Field) -> Result<String, ShareError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(malformed)? {
        bytes.extend_from_slice(&chunk);
    }
    String::from_utf8(bytes)
        .map_err(|_| ShareError::ValidationError("Invalid form data".into()))
}

fn malformed(err: actix_multipart::MultipartError) -> ShareError {
    tracing::warn!("Failed to read the multipart payload: {err}");
    ShareError::ValidationError("Invalid form data".into())
}

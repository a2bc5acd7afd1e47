mod form;

use actix_multipart::Multipart;
use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::{HttpRequest, HttpResponse, ResponseError, web};
use anyhow::Context;
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::configuration::IntakeSettings;
use crate::domain::{SubmissionCategory, SubmissionRecord, SubmitterName, SubscriberEmail};
use crate::rate_limit;
use crate::startup::{PublicFileBase, SubmissionBucket, SubmissionStore};
use crate::storage::{KeyValueStore, ObjectMetadata};

use form::UploadedFile;

use super::helpers::{cors, error_chain_fmt, source_address};

#[derive(thiserror::Error)]
pub enum ShareError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Please wait a few minutes between submissions")]
    RateLimited,
    #[error("Storage not configured. Contact admin.")]
    StorageUnconfigured,
    #[error("Failed to upload file. Please try again.")]
    UploadError(#[source] anyhow::Error),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for ShareError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for ShareError {
    fn error_response(&self) -> HttpResponse {
        let (status, message) = match self {
            ShareError::ValidationError(message) => (StatusCode::BAD_REQUEST, message.clone()),
            ShareError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, self.to_string()),
            ShareError::StorageUnconfigured | ShareError::UploadError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            ShareError::UnexpectedError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong. Please try again.".to_string(),
            ),
        };

        cors(&mut HttpResponse::build(status)).json(json!({ "error": message }))
    }
}

#[tracing::instrument(
    name = "Recording a new submission",
    skip_all,
    fields(category = tracing::field::Empty, source_address = tracing::field::Empty)
)]
pub async fn share(
    req: HttpRequest,
    payload: Multipart,
    store: web::Data<SubmissionStore>,
    bucket: web::Data<SubmissionBucket>,
    public_base: web::Data<PublicFileBase>,
    intake: web::Data<IntakeSettings>,
) -> Result<HttpResponse, ShareError> {
    let Some(bucket) = bucket.0.as_ref() else {
        return Err(ShareError::StorageUnconfigured);
    };

    let form = form::collect(payload, intake.max_file_bytes).await?;

    if form.website.as_deref().is_some_and(|v| !v.is_empty()) {
        return Err(ShareError::ValidationError("Invalid submission".into()));
    }

    let (Some(name), Some(email), Some(category), Some(description)) = (
        form.name.filter(|v| !v.is_empty()),
        form.email.filter(|v| !v.is_empty()),
        form.category.filter(|v| !v.is_empty()),
        form.description.filter(|v| !v.is_empty()),
    ) else {
        return Err(ShareError::ValidationError(
            "Please fill in all fields".into(),
        ));
    };

    let name = SubmitterName::parse(name).map_err(ShareError::ValidationError)?;
    let email = SubscriberEmail::parse(email)
        .map_err(|_| ShareError::ValidationError("Invalid email address".into()))?;
    let category =
        SubmissionCategory::parse(&category).map_err(ShareError::ValidationError)?;
    tracing::Span::current().record("category", tracing::field::display(category));

    let ip = source_address(&req);
    tracing::Span::current().record("source_address", tracing::field::display(&ip));

    let marker_key = format!("share_ratelimit:{ip}");
    if let Some(kv) = store.0.as_ref() {
        if rate_limit::is_limited(kv.as_ref(), &marker_key, intake.share_cooldown())
            .await
            .context("Failed to check the share rate limit.")?
        {
            return Err(ShareError::RateLimited);
        }
    }

    let mut file_key = None;
    let mut file_url = None;
    if let Some(file) = form.file {
        let declared_type = file
            .content_type
            .clone()
            .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string());
        if !intake.allowed_file_types.contains(&declared_type) {
            return Err(ShareError::ValidationError(
                "Invalid file type. Allowed: PDF, DOC, DOCX, TXT, PNG, JPG".into(),
            ));
        }

        let key = storage_key(category, &file.filename);
        upload(bucket.as_ref(), &key, file, &name, &email, category, &description).await?;

        file_url = public_base
            .0
            .as_ref()
            .map(|base| format!("{}/{}", base.trim_end_matches('/'), key));
        file_key = Some(key);
    }

    let record = SubmissionRecord::new(
        name,
        email,
        category,
        description,
        file_key,
        file_url,
        ip,
    );

    if let Some(kv) = store.0.as_ref() {
        let payload = serde_json::to_string(&record)
            .context("Failed to serialize the submission record.")?;
        kv.put(&SubmissionRecord::key(record.id), payload, None)
            .await
            .context("Failed to persist the submission record.")?;

        rate_limit::mark(kv.as_ref(), &marker_key, intake.share_cooldown())
            .await
            .context("Failed to write the share rate-limit marker.")?;

        append_to_day_index(kv.as_ref(), record.id)
            .await
            .context("Failed to index the submission.")?;
    }

    Ok(cors(&mut HttpResponse::Ok()).json(json!({
        "success": true,
        "message": "Thanks for sharing! Your submission is in.",
        "id": record.id,
    })))
}

#[tracing::instrument(name = "Storing the submitted file", skip(bucket, file, name, email))]
async fn upload(
    bucket: &dyn crate::storage::ObjectStore,
    key: &str,
    file: UploadedFile,
    name: &SubmitterName,
    email: &SubscriberEmail,
    category: SubmissionCategory,
    description: &str,
) -> Result<(), ShareError> {
    let metadata = ObjectMetadata {
        content_type: file.content_type.clone(),
        custom: [
            ("submitter".to_string(), name.as_ref().to_string()),
            ("email".to_string(), email.as_ref().to_string()),
            ("type".to_string(), category.to_string()),
            ("description".to_string(), description.to_string()),
            ("timestamp".to_string(), Utc::now().to_rfc3339()),
        ]
        .into(),
    };

    bucket
        .put(key, file.bytes.into(), metadata)
        .await
        .map_err(|err| ShareError::UploadError(err.into()))
}

/// Non-atomic read-modify-write; concurrent submitters can drop each
/// other's entry. The index is best-effort by design.
async fn append_to_day_index(store: &dyn KeyValueStore, id: Uuid) -> Result<(), anyhow::Error> {
    let key = SubmissionRecord::day_index_key(Utc::now().date_naive());
    let mut ids: Vec<Uuid> = match store.get(&key).await? {
        Some(raw) => serde_json::from_str(&raw).unwrap_or_default(),
        None => Vec::new(),
    };
    ids.push(id);
    store.put(&key, serde_json::to_string(&ids)?, None).await?;
    Ok(())
}

/// `<type>/<epoch-ms>_<sanitized-filename>`; collision resistance comes
/// from the timestamp, readability from the original name.
fn storage_key(category: SubmissionCategory, filename: &str) -> String {
    format!(
        "{}/{}_{}",
        category.as_str(),
        Utc::now().timestamp_millis(),
        sanitize_filename(filename)
    )
}

fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

pub async fn share_info() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body("Share API - POST to submit")
}

use actix_web::http::StatusCode;
use actix_web::http::header::{self, HeaderValue};
use actix_web::{HttpRequest, HttpResponse, ResponseError, web};
use anyhow::Context;

use crate::authentication::{ExpectedCredentials, check_basic_auth};
use crate::startup::SubmissionBucket;

use super::helpers::error_chain_fmt;

#[derive(serde::Deserialize)]
pub struct QueryParams {
    file: Option<String>,
}

#[derive(thiserror::Error)]
pub enum DownloadError {
    #[error("File not specified")]
    MissingFileParam,
    #[error("Authentication required")]
    AuthError(#[source] anyhow::Error),
    #[error("Storage not configured")]
    StorageUnconfigured,
    #[error("File not found")]
    NotFound,
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for DownloadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for DownloadError {
    fn error_response(&self) -> HttpResponse {
        match self {
            DownloadError::MissingFileParam => {
                HttpResponse::build(StatusCode::BAD_REQUEST).body(self.to_string())
            }
            DownloadError::AuthError(_) => HttpResponse::build(StatusCode::UNAUTHORIZED)
                .insert_header((
                    header::WWW_AUTHENTICATE,
                    HeaderValue::from_static(r#"Basic realm="admin""#),
                ))
                .body(self.to_string()),
            DownloadError::StorageUnconfigured => {
                HttpResponse::build(StatusCode::INTERNAL_SERVER_ERROR).body(self.to_string())
            }
            DownloadError::NotFound => {
                HttpResponse::build(StatusCode::NOT_FOUND).body(self.to_string())
            }
            DownloadError::UnexpectedError(_) => {
                HttpResponse::build(StatusCode::INTERNAL_SERVER_ERROR)
                    .body("Error downloading file")
            }
        }
    }
}

#[tracing::instrument(
    name = "Serving a stored file",
    skip(req, query, bucket, expected),
    fields(file_key = tracing::field::Empty)
)]
pub async fn download_file(
    req: HttpRequest,
    query: web::Query<QueryParams>,
    bucket: web::Data<SubmissionBucket>,
    expected: web::Data<ExpectedCredentials>,
) -> Result<HttpResponse, DownloadError> {
    // Checked before credentials, matching the long-observed behavior of
    // this route.
    let file_key = query
        .0
        .file
        .filter(|key| !key.is_empty())
        .ok_or(DownloadError::MissingFileParam)?;
    tracing::Span::current().record("file_key", tracing::field::display(&file_key));

    check_basic_auth(req.headers(), &expected).map_err(DownloadError::AuthError)?;

    let Some(bucket) = bucket.0.as_ref() else {
        return Err(DownloadError::StorageUnconfigured);
    };

    let object = bucket
        .get(&file_key)
        .await
        .context("Failed to fetch the stored object.")?
        .ok_or(DownloadError::NotFound)?;

    let filename = file_key.rsplit('/').next().unwrap_or(file_key.as_str());
    let content_type = object
        .metadata
        .content_type
        .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string());

    Ok(HttpResponse::Ok()
        .content_type(content_type)
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ))
        .body(object.body))
}

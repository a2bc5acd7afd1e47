use actix_web::http::StatusCode;
use actix_web::http::header::{self, ContentType, HeaderValue};
use actix_web::{HttpRequest, HttpResponse, ResponseError, web};
use anyhow::Context;

use crate::authentication::{ExpectedCredentials, check_basic_auth};
use crate::domain::{SubmissionRecord, SubscriberRecord};
use crate::startup::{SubmissionStore, SubscriberStore};
use crate::storage::KeyValueStore;

use super::helpers::{error_chain_fmt, prepare_html_template};

#[derive(serde::Deserialize)]
pub struct QueryParams {
    view: Option<String>,
}

#[derive(thiserror::Error)]
pub enum AdminError {
    #[error("Authentication required")]
    AuthError(#[source] anyhow::Error),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for AdminError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for AdminError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AdminError::AuthError(_) => HttpResponse::build(StatusCode::UNAUTHORIZED)
                .insert_header((
                    header::WWW_AUTHENTICATE,
                    HeaderValue::from_static(r#"Basic realm="admin""#),
                ))
                .body("Authentication required"),
            AdminError::UnexpectedError(_) => {
                HttpResponse::build(StatusCode::INTERNAL_SERVER_ERROR)
                    .body("Error loading admin panel")
            }
        }
    }
}

#[derive(serde::Serialize)]
struct SubscriberRow {
    email: String,
    date: String,
    source: String,
}

#[derive(serde::Serialize)]
struct SubmissionRow {
    date: String,
    name: String,
    email: String,
    category: String,
    description: String,
    file_link: Option<String>,
}

#[tracing::instrument(
    name = "Rendering the admin panel",
    skip(req, query, subscribers, submissions, expected),
    fields(view = tracing::field::Empty)
)]
pub async fn admin_panel(
    req: HttpRequest,
    query: web::Query<QueryParams>,
    subscribers: web::Data<SubscriberStore>,
    submissions: web::Data<SubmissionStore>,
    expected: web::Data<ExpectedCredentials>,
) -> Result<HttpResponse, AdminError> {
    check_basic_auth(req.headers(), &expected).map_err(AdminError::AuthError)?;

    let view = query.view.as_deref().unwrap_or("dashboard");
    tracing::Span::current().record("view", tracing::field::display(view));

    let html = match view {
        "dashboard" => render_dashboard(&subscribers, &submissions).await?,
        "emails" => match subscribers.0.as_ref() {
            Some(kv) => render_emails(kv.as_ref()).await?,
            None => render_no_data()?,
        },
        "submissions" => match submissions.0.as_ref() {
            Some(kv) => render_submissions(kv.as_ref()).await?,
            None => render_no_data()?,
        },
        _ => render_no_data()?,
    };

    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(html))
}

async fn render_dashboard(
    subscribers: &SubscriberStore,
    submissions: &SubmissionStore,
) -> Result<String, anyhow::Error> {
    let email_count = count_keys(subscribers.0.as_deref(), "email:").await?;
    let submission_count = count_keys(submissions.0.as_deref(), "submission:").await?;

    let mut ctx = tera::Context::new();
    ctx.insert("email_count", &email_count);
    ctx.insert("submission_count", &submission_count);
    prepare_html_template(&ctx, "admin/dashboard.html")
}

async fn count_keys(
    store: Option<&dyn KeyValueStore>,
    prefix: &str,
) -> Result<usize, anyhow::Error> {
    match store {
        Some(kv) => Ok(kv
            .list_keys(prefix)
            .await
            .context("Failed to enumerate stored keys.")?
            .len()),
        None => Ok(0),
    }
}

#[tracing::instrument(name = "Listing subscribers", skip_all)]
async fn render_emails(store: &dyn KeyValueStore) -> Result<String, anyhow::Error> {
    let mut rows = Vec::new();
    for key in store
        .list_keys("email:")
        .await
        .context("Failed to enumerate subscribers.")?
    {
        let Some(raw) = store
            .get(&key)
            .await
            .context("Failed to read a subscriber record.")?
        else {
            continue;
        };
        match serde_json::from_str::<SubscriberRecord>(&raw) {
            Ok(record) => rows.push(SubscriberRow {
                email: record.email,
                date: record.timestamp.format("%Y-%m-%d").to_string(),
                source: record.source,
            }),
            Err(err) => {
                tracing::warn!(
                    error.cause_chain = ?err,
                    "Skipping a subscriber record that failed to deserialize. Key: {key}"
                );
            }
        }
    }

    let mut ctx = tera::Context::new();
    ctx.insert("rows", &rows);
    prepare_html_template(&ctx, "admin/emails.html")
}

#[tracing::instrument(name = "Listing submissions", skip_all)]
async fn render_submissions(store: &dyn KeyValueStore) -> Result<String, anyhow::Error> {
    let mut rows = Vec::new();
    for key in store
        .list_keys("submission:")
        .await
        .context("Failed to enumerate submissions.")?
    {
        let Some(raw) = store
            .get(&key)
            .await
            .context("Failed to read a submission record.")?
        else {
            continue;
        };
        match serde_json::from_str::<SubmissionRecord>(&raw) {
            Ok(record) => rows.push(SubmissionRow {
                date: record.timestamp.format("%Y-%m-%d").to_string(),
                name: record.name,
                email: record.email,
                category: record.category.to_string(),
                description: record.description,
                file_link: file_link(record.file_key, record.file_url),
            }),
            Err(err) => {
                tracing::warn!(
                    error.cause_chain = ?err,
                    "Skipping a submission record that failed to deserialize. Key: {key}"
                );
            }
        }
    }

    let mut ctx = tera::Context::new();
    ctx.insert("rows", &rows);
    prepare_html_template(&ctx, "admin/submissions.html")
}

/// Stored files link to their public URL when the bucket is exposed,
/// otherwise through the authenticated download route.
fn file_link(file_key: Option<String>, file_url: Option<String>) -> Option<String> {
    file_url.or_else(|| file_key.map(|key| format!("/api/download?file={key}")))
}

fn render_no_data() -> Result<String, anyhow::Error> {
    prepare_html_template(&tera::Context::new(), "admin/no_data.html")
}

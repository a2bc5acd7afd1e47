use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::{HttpRequest, HttpResponse, ResponseError, web};
use anyhow::Context;
use serde_json::json;

use crate::configuration::IntakeSettings;
use crate::domain::{SubscriberEmail, SubscriberRecord};
use crate::email_client::EmailClient;
use crate::rate_limit;
use crate::startup::{AdminEmail, ApplicationBaseURL, SubscriberStore};

use super::helpers::{cors, error_chain_fmt, source_address, success_json};

#[derive(serde::Deserialize)]
pub struct FormData {
    email: Option<String>,
    /// Honeypot. Hidden on the real form; anything filling it in is a bot.
    website: Option<String>,
}

#[derive(thiserror::Error)]
pub enum SubscribeError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Please wait before subscribing again")]
    RateLimited,
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for SubscribeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for SubscribeError {
    fn error_response(&self) -> HttpResponse {
        let (status, message) = match self {
            SubscribeError::ValidationError(message) => {
                (StatusCode::BAD_REQUEST, message.clone())
            }
            SubscribeError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, self.to_string()),
            // Internal detail stays in the logs.
            SubscribeError::UnexpectedError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong. Try again.".to_string(),
            ),
        };

        cors(&mut HttpResponse::build(status)).json(json!({ "error": message }))
    }
}

#[tracing::instrument(
    name = "Adding a new subscriber",
    skip(form, store, email_client, admin_email, base_url, intake),
    fields(subscriber_email = tracing::field::Empty, source_address = tracing::field::Empty)
)]
pub async fn subscribe(
    req: HttpRequest,
    form: web::Form<FormData>,
    store: web::Data<SubscriberStore>,
    email_client: web::Data<EmailClient>,
    admin_email: web::Data<AdminEmail>,
    base_url: web::Data<ApplicationBaseURL>,
    intake: web::Data<IntakeSettings>,
) -> Result<HttpResponse, SubscribeError> {
    if form.website.as_deref().is_some_and(|v| !v.is_empty()) {
        return Err(SubscribeError::ValidationError("Invalid submission".into()));
    }

    let email = form
        .0
        .email
        .ok_or_else(|| SubscribeError::ValidationError("Invalid email address".into()))
        .and_then(|raw| {
            SubscriberEmail::parse(raw)
                .map_err(|_| SubscribeError::ValidationError("Invalid email address".into()))
        })?;
    tracing::Span::current().record("subscriber_email", tracing::field::display(&email));

    let Some(store) = store.0.as_ref() else {
        // Subscriber namespace not bound in this environment; accept the
        // request without persisting so local setups keep working.
        tracing::info!("Email submission (test mode): {}", email.as_ref());
        return Ok(success_json("Email received (test mode)"));
    };

    let ip = source_address(&req);
    tracing::Span::current().record("source_address", tracing::field::display(&ip));

    // Dedup before the cooldown so re-subscribing stays idempotent from the
    // caller's point of view.
    let record_key = SubscriberRecord::key(&email);
    let already_subscribed = store
        .get(&record_key)
        .await
        .context("Failed to look up an existing subscriber.")?
        .is_some();
    if already_subscribed {
        return Ok(success_json("You're already on the list!"));
    }

    let marker_key = format!("ratelimit:{ip}");
    if rate_limit::is_limited(store.as_ref(), &marker_key, intake.subscribe_cooldown())
        .await
        .context("Failed to check the subscribe rate limit.")?
    {
        return Err(SubscribeError::RateLimited);
    }

    let record = SubscriberRecord::new(&email, &ip);
    let payload =
        serde_json::to_string(&record).context("Failed to serialize the subscriber record.")?;
    store
        .put(&record_key, payload, None)
        .await
        .context("Failed to persist the new subscriber.")?;

    rate_limit::mark(store.as_ref(), &marker_key, intake.subscribe_cooldown())
        .await
        .context("Failed to write the subscribe rate-limit marker.")?;

    notify_admin(&email_client, &admin_email, &base_url, &email).await;

    Ok(success_json("Welcome aboard! Check your inbox soon."))
}

/// Best effort only: a notification outage must never block a subscription.
#[tracing::instrument(name = "Notifying the admin about a new subscriber", skip_all)]
async fn notify_admin(
    email_client: &EmailClient,
    admin_email: &AdminEmail,
    base_url: &ApplicationBaseURL,
    subscriber: &SubscriberEmail,
) {
    let Some(recipient) = admin_email.0.as_ref() else {
        return;
    };

    let dashboard_link = format!("{}/api/admin", base_url.0);
    let text = format!(
        "New subscriber: {}\n\nView the dashboard: {}",
        subscriber.as_ref(),
        dashboard_link
    );
    let html = format!(
        "<p>New subscriber: <strong>{}</strong></p>\
         <p><a href=\"{}\">Open the dashboard</a></p>",
        subscriber.as_ref(),
        dashboard_link
    );

    if let Err(err) = email_client
        .send_email(recipient, "New subscriber", &html, &text)
        .await
    {
        tracing::warn!(
            error.cause_chain = ?err,
            "Failed to send the new-subscriber notification."
        );
    }
}

pub async fn subscribe_info() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body("Subscription API - POST to subscribe")
}

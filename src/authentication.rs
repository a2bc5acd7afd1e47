//! HTTP Basic authentication shared by the admin and download routes.
//!
//! One configured credential pair covers both; the expected values come
//! from the `[auth]` section of the configuration, never from code.

use actix_web::http::header::HeaderMap;
use anyhow::Context;
use base64::Engine;
use secrecy::{ExposeSecret, SecretString};

use crate::configuration::AuthSettings;

#[derive(Debug)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

/// The credential pair every protected route is checked against.
#[derive(Clone)]
pub struct ExpectedCredentials {
    username: String,
    password: SecretString,
}

impl ExpectedCredentials {
    pub fn new(settings: &AuthSettings) -> Self {
        Self {
            username: settings.username.clone(),
            password: settings.password.clone(),
        }
    }
}

pub fn basic_auth(headers: &HeaderMap) -> Result<Credentials, anyhow::Error> {
    let header_value = headers
        .get("Authorization")
        .context("The 'Authorization' header is missing.")?
        .to_str()
        .context("The 'Authorization' header was not a valid UTF8 string.")?;

    let base64_encoded_segment = header_value
        .strip_prefix("Basic ")
        .context("The authorization scheme is not 'Basic'")?;

    let decoded_bytes = base64::engine::general_purpose::STANDARD
        .decode(base64_encoded_segment)
        .context("Failed to base64-decode 'Basic' credentials")?;

    let decoded_creds =
        String::from_utf8(decoded_bytes).context("The decoded credential string is not UTF8")?;

    let mut creds = decoded_creds.splitn(2, ":");
    let username = creds
        .next()
        .ok_or_else(|| anyhow::anyhow!("A username must be provided in 'Basic' auth."))?
        .to_string();

    let password = creds
        .next()
        .ok_or_else(|| anyhow::anyhow!("A password must be provided in 'Basic' auth."))?
        .to_string();

    Ok(Credentials {
        username,
        password: SecretString::from(password),
    })
}

/// Parses the `Authorization` header and compares it against the configured
/// pair. Callers map the error onto their 401 response.
pub fn check_basic_auth(
    headers: &HeaderMap,
    expected: &ExpectedCredentials,
) -> Result<(), anyhow::Error> {
    let candidate = basic_auth(headers)?;

    if candidate.username != expected.username
        || candidate.password.expose_secret() != expected.password.expose_secret()
    {
        anyhow::bail!("Invalid credentials.");
    }

    Ok(())
}

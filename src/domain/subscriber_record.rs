use chrono::{DateTime, Utc};

use super::SubscriberEmail;

/// Stored under `email:<address>` in the subscriber namespace. Written once
/// on the first successful subscription, never mutated or deleted.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SubscriberRecord {
    pub email: String,
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub ip: String,
}

impl SubscriberRecord {
    pub fn new(email: &SubscriberEmail, ip: &str) -> Self {
        Self {
            email: email.as_ref().to_string(),
            timestamp: Utc::now(),
            source: "website".to_string(),
            ip: ip.to_string(),
        }
    }

    pub fn key(email: &SubscriberEmail) -> String {
        format!("email:{}", email.as_ref())
    }
}

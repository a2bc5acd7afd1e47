use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::{SubmissionCategory, SubmitterName, SubscriberEmail};

/// Stored under `submission:<id>` in the submission namespace; immutable
/// once written. `file_key`/`file_url` are present only when the share
/// request carried an attachment.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SubmissionRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(rename = "type")]
    pub category: SubmissionCategory,
    pub description: String,
    pub file_key: Option<String>,
    pub file_url: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub ip: String,
}

impl SubmissionRecord {
    pub fn new(
        name: SubmitterName,
        email: SubscriberEmail,
        category: SubmissionCategory,
        description: String,
        file_key: Option<String>,
        file_url: Option<String>,
        ip: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into_inner(),
            email: email.as_ref().to_string(),
            category,
            description,
            file_key,
            file_url,
            timestamp: Utc::now(),
            ip,
        }
    }

    pub fn key(id: Uuid) -> String {
        format!("submission:{id}")
    }

    /// Key of the per-day index list the admin enumeration leans on.
    pub fn day_index_key(date: NaiveDate) -> String {
        format!("submissions_list:{}", date.format("%Y-%m-%d"))
    }
}

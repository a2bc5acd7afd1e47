//! Per-source-address cooldown markers, shared by the intake handlers.
//!
//! A marker is an epoch-milliseconds string written with a TTL equal to the
//! cooldown window. The check-then-mark sequence is not atomic; two
//! concurrent requests from one address can both pass. Best-effort
//! throttling only.

use std::time::Duration;

use chrono::Utc;

use crate::storage::{KeyValueStore, StorageError};

/// True when a marker younger than `cooldown` exists under `key`.
pub async fn is_limited(
    store: &dyn KeyValueStore,
    key: &str,
    cooldown: Duration,
) -> Result<bool, StorageError> {
    let Some(raw) = store.get(key).await? else {
        return Ok(false);
    };

    // The TTL already bounds the marker's lifetime; the timestamp
    // comparison covers backends with coarse expiry.
    let Ok(marked_at) = raw.parse::<i64>() else {
        return Ok(false);
    };

    let elapsed = Utc::now().timestamp_millis().saturating_sub(marked_at);
    Ok(elapsed < cooldown.as_millis() as i64)
}

pub async fn mark(
    store: &dyn KeyValueStore,
    key: &str,
    cooldown: Duration,
) -> Result<(), StorageError> {
    store
        .put(
            key,
            Utc::now().timestamp_millis().to_string(),
            Some(cooldown),
        )
        .await
}

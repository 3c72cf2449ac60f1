//! Upvotes a bot received.

use super::PartialUser;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Upvote {
    pub user: PartialUser,
    /// Milliseconds since the Unix epoch
    pub timestamp: Option<i64>,
    raw: Value,
}

impl Upvote {
    pub fn from_value(raw: Value) -> Result<Self> {
        let user = raw
            .get("user")
            .cloned()
            .ok_or_else(|| Error::UnexpectedPayload("upvote without a user".to_string()))?;
        let user = PartialUser::from_value(user)?;
        let timestamp = raw.get("timestamp").and_then(Value::as_i64);
        Ok(Self {
            user,
            timestamp,
            raw,
        })
    }

    /// When the upvote was cast
    pub fn voted_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp.and_then(DateTime::<Utc>::from_timestamp_millis)
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn into_raw(self) -> Value {
        self.raw
    }
}

impl fmt::Display for Upvote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.user, f)
    }
}

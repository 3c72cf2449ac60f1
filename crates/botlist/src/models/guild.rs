//! Servers listed on botlist.space.

use super::{non_empty, null_as_default, Accessors};
use crate::error::Result;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// A Discord server, as embedded in a user's `servers`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Guild {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub full_description: Option<String>,
    #[serde(default)]
    pub member_count: Option<u64>,
    /// Invite link
    #[serde(default)]
    pub invite: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(skip)]
    raw: Value,
}

impl Guild {
    pub fn from_value(raw: Value) -> Result<Self> {
        let mut guild = Guild::deserialize(&raw)?;
        guild.raw = raw;
        Ok(guild)
    }

    /// The server's page on botlist.space
    pub fn url(&self) -> String {
        format!("https://botlist.space/server/{}", self.id)
    }

    pub fn invite_url(&self) -> Option<&str> {
        non_empty(&self.invite)
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn into_raw(self) -> Value {
        self.raw
    }
}

impl Accessors for Guild {
    fn accessor(&self, name: &str) -> Option<Value> {
        match name {
            "url" => Some(Value::from(self.url())),
            "invite_url" => Some(self.invite_url().map_or(Value::Null, Value::from)),
            _ => None,
        }
    }
}

impl fmt::Display for Guild {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

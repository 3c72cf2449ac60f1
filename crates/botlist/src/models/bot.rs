//! Bot listings.

use super::{non_empty, null_as_default, project, Accessors, PartialUser, Projected, Projection};
use crate::error::Result;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// A bot listed on botlist.space
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Bot {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub username: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub discriminator: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub full_description: Option<String>,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub library: Option<String>,
    #[serde(default)]
    pub server_count: Option<u64>,
    #[serde(default)]
    pub shards: Option<Vec<u64>>,
    /// Invite link
    #[serde(default)]
    pub invite: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    /// Support server invite code
    #[serde(default)]
    pub support: Option<String>,
    #[serde(default)]
    pub github: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    owners: Vec<Value>,
    #[serde(skip)]
    raw: Value,
}

impl Bot {
    pub fn from_value(raw: Value) -> Result<Self> {
        let mut bot = Bot::deserialize(&raw)?;
        bot.raw = raw;
        Ok(bot)
    }

    /// `username#discriminator`
    pub fn tag(&self) -> String {
        format!("{}#{}", self.username, self.discriminator)
    }

    /// The bot's page on botlist.space
    pub fn url(&self) -> String {
        format!("https://botlist.space/bot/{}", self.id)
    }

    pub fn invite_url(&self) -> Option<&str> {
        non_empty(&self.invite)
    }

    pub fn support_url(&self) -> Option<String> {
        non_empty(&self.support).map(|code| format!("https://discord.gg/{code}"))
    }

    /// Repository URL; bare `owner/repo` names are expanded to GitHub
    pub fn github_url(&self) -> Option<String> {
        non_empty(&self.github).map(|repo| {
            if repo.starts_with("http://") || repo.starts_with("https://") {
                repo.to_string()
            } else {
                format!("https://github.com/{repo}")
            }
        })
    }

    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }

    /// The bot's owners, presented according to `projection`
    pub fn owners(&self, projection: &Projection) -> Result<Projected<PartialUser>> {
        project(&self.owners, projection, PartialUser::from_value)
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn into_raw(self) -> Value {
        self.raw
    }
}

impl Accessors for Bot {
    fn accessor(&self, name: &str) -> Option<Value> {
        let value = match name {
            "tag" => Value::from(self.tag()),
            "url" => Value::from(self.url()),
            "mention" => Value::from(self.mention()),
            "invite_url" => self.invite_url().map_or(Value::Null, Value::from),
            "support_url" => self.support_url().map_or(Value::Null, Value::from),
            "github_url" => self.github_url().map_or(Value::Null, Value::from),
            _ => return None,
        };
        Some(value)
    }
}

impl fmt::Display for Bot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.mention())
    }
}

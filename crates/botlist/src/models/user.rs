//! User profiles.

use super::{
    array_field, non_empty, null_as_default, project, Accessors, Bot, Guild, Projected, Projection,
};
use crate::error::Result;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// Profile fields shared by full and partial users
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub username: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub discriminator: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub links: UserLinks,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserLinks {
    #[serde(default)]
    pub github: Option<String>,
    #[serde(default)]
    pub gitlab: Option<String>,
}

impl Profile {
    pub fn github_url(&self) -> Option<String> {
        non_empty(&self.links.github).map(|name| format!("https://github.com/{name}"))
    }

    pub fn gitlab_url(&self) -> Option<String> {
        non_empty(&self.links.gitlab).map(|name| format!("https://gitlab.com/{name}"))
    }

    /// `username#discriminator`
    pub fn tag(&self) -> String {
        format!("{}#{}", self.username, self.discriminator)
    }

    /// The user's page on botlist.space
    pub fn url(&self) -> String {
        format!("https://botlist.space/user/{}", self.id)
    }

    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }
}

impl Accessors for Profile {
    fn accessor(&self, name: &str) -> Option<Value> {
        let value = match name {
            "tag" => Value::from(self.tag()),
            "url" => Value::from(self.url()),
            "mention" => Value::from(self.mention()),
            "github_url" => self.github_url().map_or(Value::Null, Value::from),
            "gitlab_url" => self.gitlab_url().map_or(Value::Null, Value::from),
            _ => return None,
        };
        Some(value)
    }
}

/// A user as embedded in bot owners and upvotes
#[derive(Debug, Clone, PartialEq)]
pub struct PartialUser {
    pub profile: Profile,
    raw: Value,
}

impl PartialUser {
    pub fn from_value(raw: Value) -> Result<Self> {
        let profile = Profile::deserialize(&raw)?;
        Ok(Self { profile, raw })
    }

    pub fn id(&self) -> &str {
        &self.profile.id
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn into_raw(self) -> Value {
        self.raw
    }
}

impl Accessors for PartialUser {
    fn accessor(&self, name: &str) -> Option<Value> {
        self.profile.accessor(name)
    }
}

impl fmt::Display for PartialUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.profile.mention())
    }
}

/// A full user, as returned by the user route
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub profile: Profile,
    bots: Vec<Value>,
    servers: Vec<Value>,
    raw: Value,
}

impl User {
    pub fn from_value(raw: Value) -> Result<Self> {
        let profile = Profile::deserialize(&raw)?;
        let bots = array_field(&raw, "bots");
        let servers = array_field(&raw, "servers");
        Ok(Self {
            profile,
            bots,
            servers,
            raw,
        })
    }

    pub fn id(&self) -> &str {
        &self.profile.id
    }

    /// Bots the user owns, presented according to `projection`
    pub fn bots(&self, projection: &Projection) -> Result<Projected<Bot>> {
        project(&self.bots, projection, Bot::from_value)
    }

    /// Servers the user owns, presented according to `projection`
    pub fn guilds(&self, projection: &Projection) -> Result<Projected<Guild>> {
        project(&self.servers, projection, Guild::from_value)
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn into_raw(self) -> Value {
        self.raw
    }
}

impl From<PartialUser> for User {
    fn from(partial: PartialUser) -> Self {
        let bots = array_field(&partial.raw, "bots");
        let servers = array_field(&partial.raw, "servers");
        Self {
            profile: partial.profile,
            bots,
            servers,
            raw: partial.raw,
        }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.profile.mention())
    }
}

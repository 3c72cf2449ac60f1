//! Client and per-call options.
//!
//! Client options are an immutable snapshot built by overlaying a
//! [`ClientOptionsPatch`] onto a base (the defaults or the previous snapshot).
//! Per-call options only carry overrides and are resolved against the client
//! snapshot when a request is made.

use crate::error::{Error, Result};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};

/// Reserved string meaning "explicitly unset", distinct from omitting the key
pub const NONE_SENTINEL: &str = "none";

/// Default API version
pub const DEFAULT_VERSION: u8 = 1;

/// Default number of statistics snapshots the history is trimmed against
pub const DEFAULT_STATS_LIMIT: usize = 3;

/// Default cache update interval in milliseconds (informational only)
pub const DEFAULT_CACHE_UPDATE_TIMER_MS: u64 = 180_000;

/// A single field of an options patch.
///
/// Presence is decided by whether the key exists, never by its value:
/// a missing key is `Absent`, `"none"` or `null` is `Unset`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Patch<T> {
    /// Key not present, inherit from the base
    #[default]
    Absent,
    /// Key present with the sentinel, reset to the field's falsy value
    Unset,
    /// Key present with a value
    Set(T),
}

impl<T> Patch<T> {
    /// Resolve against `base`, using `unset` when the field was cleared
    pub fn resolve(self, base: T, unset: T) -> T {
        match self {
            Patch::Absent => base,
            Patch::Unset => unset,
            Patch::Set(value) => value,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    fn map_set<U>(self, f: impl FnOnce(T) -> U) -> Patch<U> {
        match self {
            Patch::Absent => Patch::Absent,
            Patch::Unset => Patch::Unset,
            Patch::Set(value) => Patch::Set(f(value)),
        }
    }
}

impl<T> From<T> for Patch<T> {
    fn from(value: T) -> Self {
        Patch::Set(value)
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(Patch::Unset),
            Value::String(s) if s == NONE_SENTINEL => Ok(Patch::Unset),
            other => serde_json::from_value(other)
                .map(Patch::Set)
                .map_err(D::Error::custom),
        }
    }
}

/// Fully resolved client options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// Whether fetched entities are stored in the client caches
    pub cache: bool,
    /// General API token, used when no dedicated bot token is set
    pub token: Option<String>,
    /// Token for bot-authenticated routes
    pub bot_token: Option<String>,
    /// Token for user-authenticated routes
    pub user_token: Option<String>,
    /// Default bot ID for bot routes
    pub bot_id: Option<String>,
    /// Log every request at info level instead of debug
    pub log: bool,
    /// Cache refresh interval in milliseconds; nothing schedules on it
    pub cache_update_timer: u64,
    /// API version
    pub version: u8,
    /// Bound for the statistics history
    pub stats_limit: usize,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            cache: false,
            token: None,
            bot_token: None,
            user_token: None,
            bot_id: None,
            log: false,
            cache_update_timer: DEFAULT_CACHE_UPDATE_TIMER_MS,
            version: DEFAULT_VERSION,
            stats_limit: DEFAULT_STATS_LIMIT,
        }
    }
}

impl ClientOptions {
    /// Overlay `patch` onto these options, producing a new snapshot
    pub fn merge(&self, patch: ClientOptionsPatch) -> Result<Self> {
        let base = self.clone();
        let merged = Self {
            cache: patch.cache.resolve(base.cache, false),
            token: patch.token.map_set(Some).resolve(base.token, None),
            bot_token: patch.bot_token.map_set(Some).resolve(base.bot_token, None),
            user_token: patch.user_token.map_set(Some).resolve(base.user_token, None),
            bot_id: patch.bot_id.map_set(Some).resolve(base.bot_id, None),
            log: patch.log.resolve(base.log, false),
            cache_update_timer: patch.cache_update_timer.resolve(base.cache_update_timer, 0),
            version: patch.version.resolve(base.version, DEFAULT_VERSION),
            stats_limit: patch.stats_limit.resolve(base.stats_limit, DEFAULT_STATS_LIMIT),
        };
        merged.check()?;
        Ok(merged)
    }

    fn check(&self) -> Result<()> {
        check_version(self.version)?;
        for (name, value) in [
            ("token", &self.token),
            ("botToken", &self.bot_token),
            ("userToken", &self.user_token),
            ("botID", &self.bot_id),
        ] {
            if matches!(value, Some(v) if v.is_empty()) {
                return Err(Error::InvalidArgument(format!(
                    "options.{name} must be a non-empty string"
                )));
            }
        }
        Ok(())
    }

    /// Credential for bot routes: the bot token, falling back to the general token
    pub fn effective_bot_token(&self) -> Option<&str> {
        self.bot_token.as_deref().or(self.token.as_deref())
    }
}

fn check_version(version: u8) -> Result<()> {
    if version == 0 {
        return Err(Error::InvalidArgument(
            "options.version must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Partial client options, as supplied on construction or to `edit`.
///
/// Keys are accepted in the API's camelCase and in snake_case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientOptionsPatch {
    /// See [`ClientOptions`] for what each field controls
    pub cache: Patch<bool>,
    pub token: Patch<String>,
    #[serde(rename = "botToken", alias = "bot_token")]
    pub bot_token: Patch<String>,
    #[serde(rename = "userToken", alias = "user_token")]
    pub user_token: Patch<String>,
    #[serde(rename = "botID", alias = "botId", alias = "bot_id")]
    pub bot_id: Patch<String>,
    pub log: Patch<bool>,
    #[serde(rename = "cacheUpdateTimer", alias = "cache_update_timer")]
    pub cache_update_timer: Patch<u64>,
    pub version: Patch<u8>,
    #[serde(rename = "statsLimit", alias = "stats_limit")]
    pub stats_limit: Patch<usize>,
}

impl ClientOptionsPatch {
    /// Parse a patch from a JSON value, which must be an object
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::InvalidArgument("options must be an object".to_string()));
        }
        serde_json::from_value(value).map_err(|e| Error::InvalidArgument(e.to_string()))
    }

    /// Set whether fetched entities are cached
    pub fn cache(mut self, cache: bool) -> Self {
        self.cache = Patch::Set(cache);
        self
    }

    /// Set the general API token
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Patch::Set(token.into());
        self
    }

    /// Set the token for bot-authenticated routes
    pub fn bot_token(mut self, token: impl Into<String>) -> Self {
        self.bot_token = Patch::Set(token.into());
        self
    }

    /// Set the token for user-authenticated routes
    pub fn user_token(mut self, token: impl Into<String>) -> Self {
        self.user_token = Patch::Set(token.into());
        self
    }

    /// Set the default bot ID
    pub fn bot_id(mut self, bot_id: impl Into<String>) -> Self {
        self.bot_id = Patch::Set(bot_id.into());
        self
    }

    /// Log every request at info level
    pub fn log(mut self, log: bool) -> Self {
        self.log = Patch::Set(log);
        self
    }

    /// Set the cache refresh interval in milliseconds
    pub fn cache_update_timer(mut self, millis: u64) -> Self {
        self.cache_update_timer = Patch::Set(millis);
        self
    }

    /// Set the API version
    pub fn version(mut self, version: u8) -> Self {
        self.version = Patch::Set(version);
        self
    }

    /// Set the bound for the statistics history
    pub fn stats_limit(mut self, limit: usize) -> Self {
        self.stats_limit = Patch::Set(limit);
        self
    }
}

/// Overrides for single-entity fetches
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Client setting when `None`
    pub cache: Option<bool>,
    /// Return the untransformed payload
    pub raw: bool,
    /// Client setting when `None`
    pub version: Option<u8>,
}

impl FetchOptions {
    /// Create options that inherit everything from the client
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the client's cache setting for this call
    pub fn cache(mut self, cache: bool) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Return the untransformed payload
    pub fn raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }

    /// Override the API version for this call
    pub fn version(mut self, version: u8) -> Self {
        self.version = Some(version);
        self
    }

    pub(crate) fn resolve(&self, client: &ClientOptions) -> Result<ResolvedFetch> {
        let version = self.version.unwrap_or(client.version);
        check_version(version)?;
        Ok(ResolvedFetch {
            cache: self.cache.unwrap_or(client.cache),
            raw: self.raw,
            version,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResolvedFetch {
    pub cache: bool,
    pub raw: bool,
    pub version: u8,
}

/// Overrides for paged list fetches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiFetchOptions {
    /// Client setting when `None`
    pub cache: Option<bool>,
    /// Return the untransformed payload
    pub raw: bool,
    /// Client setting when `None`
    pub version: Option<u8>,
    /// 1-based page number
    pub page: u32,
    /// Return an id-keyed map instead of a list; wins over `raw`
    pub mapify: bool,
    /// Bot token for this call, over the client's
    pub bot_token: Option<String>,
    /// User token for this call, over the client's
    pub user_token: Option<String>,
}

impl Default for MultiFetchOptions {
    fn default() -> Self {
        Self {
            cache: None,
            raw: false,
            version: None,
            page: 1,
            mapify: false,
            bot_token: None,
            user_token: None,
        }
    }
}

impl MultiFetchOptions {
    /// Create options for the first page, inheriting the rest from the client
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the client's cache setting for this call
    pub fn cache(mut self, cache: bool) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Return the untransformed payload
    pub fn raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }

    /// Override the API version for this call
    pub fn version(mut self, version: u8) -> Self {
        self.version = Some(version);
        self
    }

    /// Select the page to fetch
    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Key the results by id
    pub fn mapify(mut self, mapify: bool) -> Self {
        self.mapify = mapify;
        self
    }

    /// Use this bot token instead of the client's
    pub fn bot_token(mut self, token: impl Into<String>) -> Self {
        self.bot_token = Some(token.into());
        self
    }

    /// Use this user token instead of the client's
    pub fn user_token(mut self, token: impl Into<String>) -> Self {
        self.user_token = Some(token.into());
        self
    }

    pub(crate) fn resolve(&self, client: &ClientOptions) -> Result<ResolvedMulti> {
        let version = self.version.unwrap_or(client.version);
        check_version(version)?;
        Ok(ResolvedMulti {
            cache: self.cache.unwrap_or(client.cache),
            raw: self.raw,
            mapify: self.mapify,
            version,
            page: self.page,
            bot_token: non_empty(self.bot_token.as_deref())
                .or_else(|| client.effective_bot_token())
                .map(str::to_string),
            user_token: non_empty(self.user_token.as_deref())
                .or(client.user_token.as_deref())
                .map(str::to_string),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResolvedMulti {
    pub cache: bool,
    pub raw: bool,
    pub mapify: bool,
    pub version: u8,
    pub page: u32,
    pub bot_token: Option<String>,
    pub user_token: Option<String>,
}

/// Either a total server count or per-shard counts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountOrShards {
    /// Total server count
    Count(u64),
    /// Server count of each shard
    Shards(Vec<u64>),
}

impl CountOrShards {
    /// JSON body posted to the bot route
    pub fn to_body(&self) -> Value {
        match self {
            CountOrShards::Count(count) => json!({ "server_count": count }),
            CountOrShards::Shards(shards) => json!({ "shards": shards }),
        }
    }
}

impl From<u64> for CountOrShards {
    fn from(count: u64) -> Self {
        CountOrShards::Count(count)
    }
}

impl From<Vec<u64>> for CountOrShards {
    fn from(shards: Vec<u64>) -> Self {
        CountOrShards::Shards(shards)
    }
}

impl From<&[u64]> for CountOrShards {
    fn from(shards: &[u64]) -> Self {
        CountOrShards::Shards(shards.to_vec())
    }
}

impl<const N: usize> From<[u64; N]> for CountOrShards {
    fn from(shards: [u64; N]) -> Self {
        CountOrShards::Shards(shards.to_vec())
    }
}

/// Overrides for posting server counts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostOptions {
    /// Client setting when `None`
    pub version: Option<u8>,
    /// Bot token for this call, over the client's
    pub bot_token: Option<String>,
    /// Count to post, required
    pub count_or_shards: Option<CountOrShards>,
}

impl PostOptions {
    /// Create empty post options
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the API version for this call
    pub fn version(mut self, version: u8) -> Self {
        self.version = Some(version);
        self
    }

    /// Use this bot token instead of the client's
    pub fn bot_token(mut self, token: impl Into<String>) -> Self {
        self.bot_token = Some(token.into());
        self
    }

    /// Set the server count or per-shard counts to post
    pub fn count_or_shards(mut self, value: impl Into<CountOrShards>) -> Self {
        self.count_or_shards = Some(value.into());
        self
    }

    pub(crate) fn resolve(&self, client: &ClientOptions) -> Result<ResolvedPost> {
        let version = self.version.unwrap_or(client.version);
        check_version(version)?;

        let bot_token = non_empty(self.bot_token.as_deref())
            .or_else(|| client.effective_bot_token())
            .ok_or_else(|| {
                Error::MissingValue(
                    "options.botToken must be defined, or in ClientOptions".to_string(),
                )
            })?
            .to_string();

        let count_or_shards = self.count_or_shards.clone().ok_or_else(|| {
            Error::MissingValue("options.countOrShards must be defined".to_string())
        })?;

        Ok(ResolvedPost {
            version,
            bot_token,
            count_or_shards,
        })
    }
}

// Bare numbers and lists are shorthand for `{ count_or_shards }`
impl From<CountOrShards> for PostOptions {
    fn from(value: CountOrShards) -> Self {
        PostOptions::new().count_or_shards(value)
    }
}

impl From<u64> for PostOptions {
    fn from(count: u64) -> Self {
        CountOrShards::from(count).into()
    }
}

impl From<Vec<u64>> for PostOptions {
    fn from(shards: Vec<u64>) -> Self {
        CountOrShards::from(shards).into()
    }
}

impl<const N: usize> From<[u64; N]> for PostOptions {
    fn from(shards: [u64; N]) -> Self {
        CountOrShards::from(shards).into()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResolvedPost {
    pub version: u8,
    pub bot_token: String,
    pub count_or_shards: CountOrShards,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> ClientOptions {
        ClientOptions::default()
            .merge(
                ClientOptionsPatch::default()
                    .cache(true)
                    .token("general")
                    .bot_id("111")
                    .log(true)
                    .stats_limit(5),
            )
            .unwrap()
    }

    #[test]
    fn test_default_options() {
        let options = ClientOptions::default();
        assert!(!options.cache);
        assert_eq!(options.token, None);
        assert_eq!(options.bot_id, None);
        assert!(!options.log);
        assert_eq!(options.cache_update_timer, 180_000);
        assert_eq!(options.version, 1);
        assert_eq!(options.stats_limit, 3);
    }

    #[test]
    fn test_absent_fields_inherit_base() {
        let base = configured();
        let merged = base.merge(ClientOptionsPatch::default()).unwrap();
        assert_eq!(merged, base);
    }

    #[test]
    fn test_set_fields_override_base() {
        let merged = configured()
            .merge(ClientOptionsPatch::default().bot_id("222").cache(false))
            .unwrap();
        assert_eq!(merged.bot_id.as_deref(), Some("222"));
        assert!(!merged.cache);
        assert_eq!(merged.token.as_deref(), Some("general"));
        assert_eq!(merged.stats_limit, 5);
    }

    #[test]
    fn test_none_sentinel_unsets_fields() {
        let patch = ClientOptionsPatch::from_value(json!({
            "cache": "none",
            "token": "none",
            "botID": "none",
            "log": "none",
            "cacheUpdateTimer": "none",
            "statsLimit": "none"
        }))
        .unwrap();

        let merged = configured().merge(patch).unwrap();
        assert!(!merged.cache);
        assert_eq!(merged.token, None);
        assert_eq!(merged.bot_id, None);
        assert!(!merged.log);
        assert_eq!(merged.cache_update_timer, 0);
        assert_eq!(merged.stats_limit, DEFAULT_STATS_LIMIT);
    }

    #[test]
    fn test_explicit_null_is_present() {
        let patch = ClientOptionsPatch::from_value(json!({ "botID": null })).unwrap();
        assert_eq!(patch.bot_id, Patch::Unset);
        assert!(patch.token.is_absent());

        let merged = configured().merge(patch).unwrap();
        assert_eq!(merged.bot_id, None);
        assert_eq!(merged.token.as_deref(), Some("general"));
    }

    #[test]
    fn test_patch_accepts_snake_case_keys() {
        let patch = ClientOptionsPatch::from_value(json!({
            "bot_id": "333",
            "stats_limit": 10,
            "bot_token": "secret"
        }))
        .unwrap();
        assert_eq!(patch.bot_id, Patch::Set("333".to_string()));
        assert_eq!(patch.stats_limit, Patch::Set(10));
        assert_eq!(patch.bot_token, Patch::Set("secret".to_string()));
    }

    #[test]
    fn test_patch_rejects_non_object() {
        for value in [json!("cache"), json!(42), json!([1, 2]), json!(null)] {
            let err = ClientOptionsPatch::from_value(value).unwrap_err();
            assert!(matches!(err, Error::InvalidArgument(_)));
        }
    }

    #[test]
    fn test_patch_rejects_wrong_field_type() {
        let err = ClientOptionsPatch::from_value(json!({ "cache": "yes" })).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_merge_rejects_zero_version() {
        let err = ClientOptions::default()
            .merge(ClientOptionsPatch::default().version(0))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_merge_rejects_empty_token() {
        let err = ClientOptions::default()
            .merge(ClientOptionsPatch::default().token(""))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_bot_token_falls_back_to_token() {
        let options = configured();
        assert_eq!(options.effective_bot_token(), Some("general"));

        let options = options
            .merge(ClientOptionsPatch::default().bot_token("dedicated"))
            .unwrap();
        assert_eq!(options.effective_bot_token(), Some("dedicated"));
    }

    #[test]
    fn test_fetch_options_resolve() {
        let client = configured();
        let resolved = FetchOptions::new().resolve(&client).unwrap();
        assert_eq!(
            resolved,
            ResolvedFetch {
                cache: true,
                raw: false,
                version: 1
            }
        );

        let resolved = FetchOptions::new()
            .cache(false)
            .raw(true)
            .version(2)
            .resolve(&client)
            .unwrap();
        assert!(!resolved.cache);
        assert!(resolved.raw);
        assert_eq!(resolved.version, 2);
    }

    #[test]
    fn test_multi_fetch_options_resolve_tokens() {
        let client = configured();
        let resolved = MultiFetchOptions::new().resolve(&client).unwrap();
        assert_eq!(resolved.page, 1);
        assert_eq!(resolved.bot_token.as_deref(), Some("general"));
        assert_eq!(resolved.user_token, None);

        let resolved = MultiFetchOptions::new()
            .bot_token("override")
            .user_token("user")
            .page(4)
            .resolve(&client)
            .unwrap();
        assert_eq!(resolved.page, 4);
        assert_eq!(resolved.bot_token.as_deref(), Some("override"));
        assert_eq!(resolved.user_token.as_deref(), Some("user"));
    }

    #[test]
    fn test_post_options_shorthand() {
        assert_eq!(
            PostOptions::from(42u64).count_or_shards,
            Some(CountOrShards::Count(42))
        );
        assert_eq!(
            PostOptions::from(vec![1u64, 2, 3]).count_or_shards,
            Some(CountOrShards::Shards(vec![1, 2, 3]))
        );
        assert_eq!(
            PostOptions::from([4u64, 5]).count_or_shards,
            Some(CountOrShards::Shards(vec![4, 5]))
        );
    }

    #[test]
    fn test_count_or_shards_body() {
        assert_eq!(
            CountOrShards::Shards(vec![1, 2, 3]).to_body(),
            json!({ "shards": [1, 2, 3] })
        );
        assert_eq!(
            CountOrShards::Count(42).to_body(),
            json!({ "server_count": 42 })
        );
    }

    #[test]
    fn test_post_options_require_token_and_count() {
        let err = PostOptions::from(1u64)
            .resolve(&ClientOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::MissingValue(_)));

        let err = PostOptions::new().resolve(&configured()).unwrap_err();
        assert!(matches!(err, Error::MissingValue(_)));

        let resolved = PostOptions::from(7u64).resolve(&configured()).unwrap();
        assert_eq!(resolved.bot_token, "general");
        assert_eq!(resolved.count_or_shards, CountOrShards::Count(7));
    }
}

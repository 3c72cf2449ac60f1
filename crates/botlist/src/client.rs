//! botlist.space API client.
//!
//! Each fetch resolves its id argument, resolves the call options against the
//! client's option snapshot, performs one request, optionally caches the
//! mapped entities and returns the shape the options asked for.

use crate::cache::Cache;
use crate::error::{Error, Result};
use crate::models::{Bot, Stats, Upvote, User};
use crate::options::{
    ClientOptions, ClientOptionsPatch, FetchOptions, MultiFetchOptions, PostOptions,
    ResolvedMulti,
};
use crate::transport::{Transport, TransportConfig};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Result of a single-entity fetch
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    Raw(Value),
    Mapped(T),
}

impl<T> Fetched<T> {
    pub fn into_mapped(self) -> Option<T> {
        match self {
            Fetched::Mapped(entity) => Some(entity),
            Fetched::Raw(_) => None,
        }
    }

    pub fn into_raw(self) -> Option<Value> {
        match self {
            Fetched::Raw(value) => Some(value),
            Fetched::Mapped(_) => None,
        }
    }
}

/// Result of a list fetch
#[derive(Debug, Clone, PartialEq)]
pub enum FetchedList<T> {
    Raw(Value),
    List(Vec<T>),
    /// Entities keyed by id (user id for upvotes)
    Map(HashMap<String, T>),
}

impl<T> FetchedList<T> {
    pub fn into_list(self) -> Option<Vec<T>> {
        match self {
            FetchedList::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn into_map(self) -> Option<HashMap<String, T>> {
        match self {
            FetchedList::Map(items) => Some(items),
            _ => None,
        }
    }

    pub fn into_raw(self) -> Option<Value> {
        match self {
            FetchedList::Raw(value) => Some(value),
            _ => None,
        }
    }
}

/// Client for the botlist.space API
pub struct Client {
    options: ClientOptions,
    transport: Transport,
    cache: Cache,
}

impl Client {
    /// Create a client against the production API.
    ///
    /// `options` is merged onto the default options.
    pub fn new(options: ClientOptionsPatch) -> Result<Self> {
        Self::with_transport(options, TransportConfig::default())
    }

    /// Create a client with custom HTTP settings
    pub fn with_transport(options: ClientOptionsPatch, transport: TransportConfig) -> Result<Self> {
        let options = ClientOptions::default().merge(options)?;
        let transport = Transport::new(transport)?;

        debug!(
            base_url = %transport.base_url(),
            version = options.version,
            cache = options.cache,
            "Client created"
        );

        Ok(Self {
            options,
            transport,
            cache: Cache::new(),
        })
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Replace the option snapshot.
    ///
    /// With `preset` the patch is applied to the default options, otherwise to
    /// the current ones.
    pub fn edit(&mut self, patch: ClientOptionsPatch, preset: bool) -> Result<&ClientOptions> {
        let base = if preset {
            ClientOptions::default()
        } else {
            self.options.clone()
        };
        self.options = base.merge(patch)?;
        Ok(&self.options)
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    pub async fn cached_bot(&self, id: &str) -> Option<Bot> {
        self.cache.bot(id).await
    }

    pub async fn cached_user(&self, id: &str) -> Option<User> {
        self.cache.user(id).await
    }

    /// Cached statistics, oldest first
    pub async fn cached_stats(&self) -> Vec<Stats> {
        self.cache.stats().await
    }

    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    /// Fetch site statistics
    pub async fn fetch_stats(&self, options: FetchOptions) -> Result<Fetched<Stats>> {
        let opts = options.resolve(&self.options)?;
        self.log_request("fetch_stats", "/statistics");

        let contents = self.transport.get("/statistics", opts.version, &[]).await?;

        if opts.cache {
            let stats = Stats::from_value(contents.clone())?;
            self.cache.push_stats(stats, self.options.stats_limit).await;
        }

        if opts.raw {
            Ok(Fetched::Raw(contents))
        } else {
            Ok(Fetched::Mapped(Stats::from_value(contents)?))
        }
    }

    /// Fetch one page of listed bots
    pub async fn fetch_bots(&self, options: MultiFetchOptions) -> Result<FetchedList<Bot>> {
        let opts = options.resolve(&self.options)?;
        self.log_request("fetch_bots", "/bots");

        let contents = self
            .transport
            .get("/bots", opts.version, &page_query(opts.page))
            .await?;

        let bots = if needs_entities(&opts) {
            map_items(&contents, "bots", Bot::from_value)?
        } else {
            Vec::new()
        };
        if opts.cache {
            self.cache.insert_bots(bots.clone()).await;
        }

        Ok(shape(&opts, contents, bots, |bot| bot.id.clone()))
    }

    #[deprecated(note = "use `fetch_bots` instead")]
    pub async fn fetch_all_bots(&self, options: MultiFetchOptions) -> Result<FetchedList<Bot>> {
        warn!("Client::fetch_all_bots is deprecated; use Client::fetch_bots instead");
        self.fetch_bots(options).await
    }

    /// Fetch a bot; `None` uses the configured bot ID
    pub async fn fetch_bot(&self, id: Option<&str>, options: FetchOptions) -> Result<Fetched<Bot>> {
        let id = self.resolve_bot_id(id)?;
        let opts = options.resolve(&self.options)?;
        let path = format!("/bots/{id}");
        self.log_request("fetch_bot", &path);

        let contents = self.transport.get(&path, opts.version, &[]).await?;

        if opts.cache {
            let bot = Bot::from_value(contents.clone())?;
            self.cache.insert_bots([bot]).await;
        }

        if opts.raw {
            Ok(Fetched::Raw(contents))
        } else {
            Ok(Fetched::Mapped(Bot::from_value(contents)?))
        }
    }

    /// Fetch a bot's upvotes from the past month; requires a bot token.
    ///
    /// Upvoters are cached as users.
    pub async fn fetch_upvotes(
        &self,
        id: Option<&str>,
        options: MultiFetchOptions,
    ) -> Result<FetchedList<Upvote>> {
        let id = self.resolve_bot_id(id)?;
        let opts = options.resolve(&self.options)?;
        let token = opts
            .bot_token
            .as_deref()
            .ok_or_else(|| Error::MissingValue("options.botToken must be defined".to_string()))?;
        let path = format!("/bots/{id}/upvotes");
        self.log_request("fetch_upvotes", &path);

        let contents = self
            .transport
            .auth_get(&path, opts.version, token, &page_query(opts.page))
            .await?;

        let upvotes = if needs_entities(&opts) {
            map_items(&contents, "upvotes", Upvote::from_value)?
        } else {
            Vec::new()
        };
        if opts.cache {
            self.cache
                .insert_users(upvotes.iter().map(|upvote| User::from(upvote.user.clone())))
                .await;
        }

        Ok(shape(&opts, contents, upvotes, |upvote| {
            upvote.user.id().to_string()
        }))
    }

    /// Fetch a user
    pub async fn fetch_user(&self, id: &str, options: FetchOptions) -> Result<Fetched<User>> {
        validate_id(id)?;
        let opts = options.resolve(&self.options)?;
        let path = format!("/users/{id}");
        self.log_request("fetch_user", &path);

        let contents = match self.options.user_token.as_deref() {
            Some(token) => self.transport.auth_get(&path, opts.version, token, &[]).await?,
            None => self.transport.get(&path, opts.version, &[]).await?,
        };

        if opts.cache {
            let user = User::from_value(contents.clone())?;
            self.cache.insert_users([user]).await;
        }

        if opts.raw {
            Ok(Fetched::Raw(contents))
        } else {
            Ok(Fetched::Mapped(User::from_value(contents)?))
        }
    }

    /// Fetch one page of the bots a user owns
    pub async fn fetch_bots_of_user(
        &self,
        id: &str,
        options: MultiFetchOptions,
    ) -> Result<FetchedList<Bot>> {
        validate_id(id)?;
        let opts = options.resolve(&self.options)?;
        let path = format!("/users/{id}/bots");
        self.log_request("fetch_bots_of_user", &path);

        let query = page_query(opts.page);
        let contents = match opts.user_token.as_deref() {
            Some(token) => self.transport.auth_get(&path, opts.version, token, &query).await?,
            None => self.transport.get(&path, opts.version, &query).await?,
        };

        let bots = if needs_entities(&opts) {
            map_items(&contents, "bots", Bot::from_value)?
        } else {
            Vec::new()
        };
        if opts.cache {
            self.cache.insert_bots(bots.clone()).await;
        }

        Ok(shape(&opts, contents, bots, |bot| bot.id.clone()))
    }

    /// Post a server count or per-shard counts; requires a bot token.
    ///
    /// `options` also accepts a bare `u64` or a list of `u64` as shorthand.
    pub async fn post_count(
        &self,
        id: Option<&str>,
        options: impl Into<PostOptions>,
    ) -> Result<Value> {
        let id = self.resolve_bot_id(id)?;
        let opts = options.into().resolve(&self.options)?;
        let path = format!("/bots/{id}");
        self.log_request("post_count", &path);

        let body = opts.count_or_shards.to_body();
        self.transport
            .post(&path, opts.version, &opts.bot_token, &body)
            .await
    }

    fn resolve_bot_id(&self, id: Option<&str>) -> Result<String> {
        let id = id
            .or(self.options.bot_id.as_deref())
            .ok_or_else(|| Error::MissingValue("id must be defined".to_string()))?;
        validate_id(id)?;
        Ok(id.to_string())
    }

    fn log_request(&self, operation: &'static str, path: &str) {
        if self.options.log {
            info!(operation, path = %path, version = self.options.version, "Requesting");
        } else {
            debug!(operation, path = %path, version = self.options.version, "Requesting");
        }
    }
}

fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(Error::InvalidArgument("id must be a non-empty string".to_string()));
    }
    if !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(Error::InvalidArgument(format!("id must be a snowflake, got {id:?}")));
    }
    Ok(())
}

fn page_query(page: u32) -> [(&'static str, String); 1] {
    [("page", page.to_string())]
}

fn needs_entities(opts: &ResolvedMulti) -> bool {
    opts.cache || opts.mapify || !opts.raw
}

fn map_items<T>(contents: &Value, key: &str, map: impl Fn(Value) -> Result<T>) -> Result<Vec<T>> {
    contents
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| Error::UnexpectedPayload(format!("response has no `{key}` array")))?
        .iter()
        .cloned()
        .map(map)
        .collect()
}

/// `mapify` wins over `raw`
fn shape<T>(
    opts: &ResolvedMulti,
    contents: Value,
    items: Vec<T>,
    key: impl Fn(&T) -> String,
) -> FetchedList<T> {
    if opts.mapify {
        FetchedList::Map(items.into_iter().map(|item| (key(&item), item)).collect())
    } else if opts.raw {
        FetchedList::Raw(contents)
    } else {
        FetchedList::List(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(patch: ClientOptionsPatch) -> Client {
        Client::with_transport(patch, TransportConfig::with_base_url("http://127.0.0.1:9")).unwrap()
    }

    #[test]
    fn test_client_creation() {
        let client = client(ClientOptionsPatch::default().cache(true));
        assert!(client.options().cache);
        assert_eq!(client.options().version, 1);
    }

    #[test]
    fn test_edit_overlays_current_options() {
        let mut client = client(ClientOptionsPatch::default().bot_id("1").cache(true));
        let options = client
            .edit(ClientOptionsPatch::default().log(true), false)
            .unwrap();
        assert!(options.log);
        assert!(options.cache);
        assert_eq!(options.bot_id.as_deref(), Some("1"));
    }

    #[test]
    fn test_edit_preset_overlays_defaults() {
        let mut client = client(ClientOptionsPatch::default().bot_id("1").cache(true));
        let options = client
            .edit(ClientOptionsPatch::default().log(true), true)
            .unwrap();
        assert!(options.log);
        assert!(!options.cache);
        assert_eq!(options.bot_id, None);
    }

    #[test]
    fn test_failed_edit_keeps_options() {
        let mut client = client(ClientOptionsPatch::default().bot_id("1"));
        assert!(client.edit(ClientOptionsPatch::default().version(0), false).is_err());
        assert_eq!(client.options().bot_id.as_deref(), Some("1"));
    }

    #[test]
    fn test_resolve_bot_id() {
        let client = client(ClientOptionsPatch::default().bot_id("123"));
        assert_eq!(client.resolve_bot_id(None).unwrap(), "123");
        assert_eq!(client.resolve_bot_id(Some("456")).unwrap(), "456");
        assert!(matches!(
            client.resolve_bot_id(Some("")),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            client.resolve_bot_id(Some("../users")),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_bot_without_id() {
        let client = client(ClientOptionsPatch::default());
        let err = client.fetch_bot(None, FetchOptions::new()).await.unwrap_err();
        assert!(matches!(err, Error::MissingValue(_)));
    }

    #[tokio::test]
    async fn test_fetch_upvotes_without_token() {
        let client = client(ClientOptionsPatch::default().bot_id("123"));
        let err = client
            .fetch_upvotes(None, MultiFetchOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingValue(_)));
    }

    #[tokio::test]
    async fn test_post_count_without_token() {
        let client = client(ClientOptionsPatch::default().bot_id("123"));
        let err = client.post_count(None, 10u64).await.unwrap_err();
        assert!(matches!(err, Error::MissingValue(_)));
    }

    #[tokio::test]
    async fn test_fetch_user_rejects_empty_id() {
        let client = client(ClientOptionsPatch::default());
        let err = client.fetch_user("", FetchOptions::new()).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_fetched_accessors() {
        let fetched: Fetched<u8> = Fetched::Mapped(1);
        assert_eq!(fetched.clone().into_mapped(), Some(1));
        assert_eq!(fetched.into_raw(), None);

        let list: FetchedList<u8> = FetchedList::List(vec![1, 2]);
        assert_eq!(list.clone().into_list(), Some(vec![1, 2]));
        assert_eq!(list.into_map(), None);
    }
}

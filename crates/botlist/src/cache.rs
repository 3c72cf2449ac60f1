//! In-memory caches for fetched entities.
//!
//! Bots and users are kept in id-keyed maps with no eviction; the last write
//! for an id wins. Statistics are kept as a short history, oldest first.

use crate::models::{Bot, Stats, User};
use std::collections::{HashMap, VecDeque};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
struct CacheState {
    bots: HashMap<String, Bot>,
    users: HashMap<String, User>,
    stats: VecDeque<Stats>,
}

/// Entity caches shared by concurrent calls on one client
#[derive(Debug, Default)]
pub struct Cache {
    state: RwLock<CacheState>,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_bots(&self, bots: impl IntoIterator<Item = Bot>) {
        let mut state = self.state.write().await;
        for bot in bots {
            state.bots.insert(bot.id.clone(), bot);
        }
        debug!(cached_bots = state.bots.len(), "Bots cached");
    }

    pub async fn insert_users(&self, users: impl IntoIterator<Item = User>) {
        let mut state = self.state.write().await;
        for user in users {
            state.users.insert(user.id().to_string(), user);
        }
        debug!(cached_users = state.users.len(), "Users cached");
    }

    /// Append a statistics snapshot, then drop from the front while the
    /// history holds `limit` or more entries.
    pub async fn push_stats(&self, stats: Stats, limit: usize) {
        let mut state = self.state.write().await;
        state.stats.push_back(stats);
        while state.stats.len() >= limit {
            if state.stats.pop_front().is_none() {
                break;
            }
        }
        debug!(cached_stats = state.stats.len(), limit = limit, "Statistics cached");
    }

    pub async fn bot(&self, id: &str) -> Option<Bot> {
        self.state.read().await.bots.get(id).cloned()
    }

    pub async fn user(&self, id: &str) -> Option<User> {
        self.state.read().await.users.get(id).cloned()
    }

    pub async fn bots(&self) -> HashMap<String, Bot> {
        self.state.read().await.bots.clone()
    }

    pub async fn users(&self) -> HashMap<String, User> {
        self.state.read().await.users.clone()
    }

    /// Statistics history, oldest first
    pub async fn stats(&self) -> Vec<Stats> {
        self.state.read().await.stats.iter().cloned().collect()
    }

    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        *state = CacheState::default();
        debug!("Cache cleared");
    }

    /// Number of cached bots, users and statistics snapshots
    pub async fn stats_summary(&self) -> CacheStats {
        let state = self.state.read().await;
        CacheStats {
            bots: state.bots.len(),
            users: state.users.len(),
            stats: state.stats.len(),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub bots: usize,
    pub users: usize,
    pub stats: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bot(id: &str, name: &str) -> Bot {
        Bot::from_value(json!({ "id": id, "username": name })).unwrap()
    }

    fn stats(bots: u64) -> Stats {
        Stats::from_value(json!({ "bots": bots })).unwrap()
    }

    #[tokio::test]
    async fn test_bots_last_write_wins() {
        let cache = Cache::new();
        cache.insert_bots(vec![bot("1", "old"), bot("2", "other")]).await;
        cache.insert_bots(vec![bot("1", "new")]).await;

        assert_eq!(cache.bot("1").await.map(|b| b.username), Some("new".to_string()));
        assert_eq!(cache.bots().await.len(), 2);
        assert!(cache.bot("3").await.is_none());
    }

    #[tokio::test]
    async fn test_users_cached_by_id() {
        let cache = Cache::new();
        let user = User::from_value(json!({ "id": "42", "username": "someone" })).unwrap();
        cache.insert_users(vec![user.clone()]).await;

        assert_eq!(cache.user("42").await, Some(user));
        assert_eq!(cache.users().await.len(), 1);
    }

    #[tokio::test]
    async fn test_stats_trim_keeps_most_recent() {
        let cache = Cache::new();
        for n in 1..=6 {
            cache.push_stats(stats(n), 3).await;
            assert!(cache.stats().await.len() < 3);
        }

        let retained: Vec<_> = cache.stats().await.into_iter().map(|s| s.bots).collect();
        assert_eq!(retained, vec![Some(5), Some(6)]);
    }

    #[tokio::test]
    async fn test_stats_trim_small_limits() {
        let cache = Cache::new();
        cache.push_stats(stats(1), 1).await;
        assert!(cache.stats().await.is_empty());

        cache.push_stats(stats(2), 0).await;
        assert!(cache.stats().await.is_empty());

        cache.push_stats(stats(3), 2).await;
        assert_eq!(cache.stats().await.len(), 1);
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = Cache::new();
        cache.insert_bots(vec![bot("1", "a")]).await;
        cache.push_stats(stats(1), 5).await;
        assert_eq!(
            cache.stats_summary().await,
            CacheStats {
                bots: 1,
                users: 0,
                stats: 1
            }
        );

        cache.clear().await;
        assert_eq!(
            cache.stats_summary().await,
            CacheStats {
                bots: 0,
                users: 0,
                stats: 0
            }
        );
    }
}

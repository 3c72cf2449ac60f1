//! Site-wide statistics.

use crate::error::Result;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Stats {
    #[serde(default)]
    pub bots: Option<u64>,
    #[serde(default)]
    pub users: Option<u64>,
    #[serde(default)]
    pub servers: Option<u64>,
    #[serde(skip)]
    raw: Value,
}

impl Stats {
    pub fn from_value(raw: Value) -> Result<Self> {
        let mut stats = Stats::deserialize(&raw)?;
        stats.raw = raw;
        Ok(stats)
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn into_raw(self) -> Value {
        self.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stats_from_value() {
        let stats = Stats::from_value(json!({ "bots": 120, "users": 4000, "code": 200 })).unwrap();
        assert_eq!(stats.bots, Some(120));
        assert_eq!(stats.users, Some(4000));
        assert_eq!(stats.servers, None);
        assert_eq!(stats.raw()["code"], json!(200));
    }
}

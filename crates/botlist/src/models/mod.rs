//! Typed views over botlist.space payloads.
//!
//! Every entity keeps the payload it was built from, so nothing is lost when
//! the API adds fields this crate does not model.

pub mod bot;
pub mod guild;
pub mod stats;
pub mod upvote;
pub mod user;

pub use bot::Bot;
pub use guild::Guild;
pub use stats::Stats;
pub use upvote::Upvote;
pub use user::{PartialUser, Profile, User, UserLinks};

use crate::error::Result;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;

/// How a list accessor such as [`User::bots`] presents its items
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Projection {
    /// Raw sub-objects as found in the payload
    Raw,
    /// Wrapped entity objects
    #[default]
    Entities,
    /// Each entity's mention string
    Mentions,
    /// A single field of each item: a payload key, or an accessor such as
    /// `tag` or `url` when the payload has no key of that name
    Field(String),
}

impl Projection {
    /// Build a projection from the `{ specified, stringify }` option shape.
    ///
    /// A specified field wins over `stringify`.
    pub fn from_options(specified: Option<&str>, stringify: bool) -> Self {
        match (specified, stringify) {
            (Some(field), _) => Projection::Field(field.to_string()),
            (None, true) => Projection::Mentions,
            (None, false) => Projection::Entities,
        }
    }
}

/// Output of a projected list accessor
#[derive(Debug, Clone, PartialEq)]
pub enum Projected<T> {
    Raw(Vec<Value>),
    Entities(Vec<T>),
    Mentions(Vec<String>),
    Field(Vec<Value>),
}

impl<T> Projected<T> {
    pub fn len(&self) -> usize {
        match self {
            Projected::Raw(items) | Projected::Field(items) => items.len(),
            Projected::Entities(items) => items.len(),
            Projected::Mentions(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Entities that expose computed accessors to [`Projection::Field`]
pub(crate) trait Accessors {
    /// Value of the accessor called `name`, if the entity has one
    fn accessor(&self, name: &str) -> Option<Value>;
}

pub(crate) fn project<T, F>(items: &[Value], projection: &Projection, wrap: F) -> Result<Projected<T>>
where
    T: fmt::Display + Accessors,
    F: Fn(Value) -> Result<T>,
{
    let projected = match projection {
        Projection::Raw => Projected::Raw(items.to_vec()),
        Projection::Entities => Projected::Entities(
            items
                .iter()
                .cloned()
                .map(&wrap)
                .collect::<Result<Vec<_>>>()?,
        ),
        Projection::Mentions => Projected::Mentions(
            items
                .iter()
                .cloned()
                .map(|item| wrap(item).map(|entity| entity.to_string()))
                .collect::<Result<Vec<_>>>()?,
        ),
        Projection::Field(name) => Projected::Field(
            items
                .iter()
                .map(|item| match item.get(name) {
                    Some(value) => Ok(value.clone()),
                    None => Ok(wrap(item.clone())?.accessor(name).unwrap_or(Value::Null)),
                })
                .collect::<Result<Vec<_>>>()?,
        ),
    };
    Ok(projected)
}

/// Treat an explicit `null` like a missing key
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

pub(crate) fn array_field(raw: &Value, key: &str) -> Vec<Value> {
    match raw.get(key) {
        Some(Value::Array(items)) => items.clone(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_from_options() {
        assert_eq!(Projection::from_options(None, false), Projection::Entities);
        assert_eq!(Projection::from_options(None, true), Projection::Mentions);
        assert_eq!(
            Projection::from_options(Some("username"), true),
            Projection::Field("username".to_string())
        );
    }
}

//! Client library for the botlist.space API.
//!
//! This library fetches bots, users, upvotes and site statistics, posts
//! server counts, and can keep fetched entities in in-memory caches.

pub mod cache;
pub mod client;
pub mod error;
pub mod models;
pub mod options;
pub mod transport;

pub use cache::{Cache, CacheStats};
pub use client::{Client, Fetched, FetchedList};
pub use error::{Error, Result};
pub use models::{Bot, Guild, PartialUser, Profile, Projected, Projection, Stats, Upvote, User};
pub use options::{
    ClientOptions, ClientOptionsPatch, CountOrShards, FetchOptions, MultiFetchOptions, Patch,
    PostOptions,
};
pub use transport::{Transport, TransportConfig};

//! Core business logic module
//!
//! This module contains the import and query components:
//! - `traits` - Store and cache contracts
//! - `normalizer` - Folding validated lines into users, orders and products
//! - `store` - In-memory store with atomic generation swap
//! - `cache` - Details cache backends and the cache-aside gateway
//! - `range` - Purchase-date range validation
//! - `service` - Import and query orchestration

pub mod cache;
pub mod normalizer;
pub mod range;
pub mod service;
pub mod store;
pub mod traits;

pub use cache::{CacheConfig, CacheGateway, MemoryCache, NoopCache, DEFAULT_CACHE_TTL};
pub use normalizer::Normalizer;
pub use range::{parse_iso_date, RangeValidator, MAX_RANGE_DAYS};
pub use service::{ImportSession, OrderService};
pub use store::InMemoryStore;
pub use traits::{details_key, DetailsCache, OrderRepository};

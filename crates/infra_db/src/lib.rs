//! PostgreSQL infrastructure layer
//!
//! Provides the connection pool and the transactional store sessions that
//! implement the domain storage ports. Schema lives in `migrations/`; apply
//! it with `sqlx migrate run` before starting the server.

pub mod error;
pub mod pool;
pub mod stores;

pub use error::DatabaseError;
pub use pool::{create_pool, create_pool_from_url, DatabaseConfig, DatabasePool};
pub use stores::{PgCountryStore, PgProviderStore};

//! bookly-db: persistence layer for the bookly catalog
//!
//! Schema for users, books, reviews and tags, a `Storage` engine that owns
//! the connection pool, and scoped sessions for units of work.
//!
//! ```ignore
//! let config = DatabaseConfig::load(None, None)?;
//! let storage = Storage::connect(&config).await?;
//! storage.initialize().await?;
//!
//! let mut session = storage.session().await?;
//! let user = UserRepo::new(&mut session).create(new_user).await?;
//! session.commit().await?;
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod repos;
pub mod schema;
pub mod session;
pub mod storage;

pub use config::DatabaseConfig;
pub use error::{DbError, Result};
pub use repos::{BookRepo, ReviewRepo, TagRepo, UserRepo};
pub use session::Session;
pub use storage::{PoolStatus, Storage};

//! # FireDB
//!
//! A hierarchical, path-addressed document store on top of a single
//! fixed-schema relational table.
//!
//! Clients read and write values by slash-separated path, Firebase
//! Realtime Database style. Nested documents are transparently flattened
//! into flat rows on write and reconstructed on read. Range queries over
//! sibling properties are served by an emulated secondary index: a stable
//! fingerprint groups "all values of property P under parent X" without a
//! per-field index table.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       FireDb (facade)                       │
//! │  • get(path) / get_range(path, spec) / set(path, value)     │
//! │  • generate_key() for ordered child insertion               │
//! └─────────────────────────────────────────────────────────────┘
//!                │                │                 │
//!                ▼                ▼                 ▼
//! ┌──────────────────┐ ┌──────────────────┐ ┌──────────────────┐
//! │    Path codec    │ │    Row mapper    │ │  Key generator   │
//! │  validate/split  │ │ flatten ⇄ rebuild│ │ sortable push-ID │
//! └──────────────────┘ └──────────────────┘ └──────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 TableStore (collaborator)                   │
//! │  • SqlStore: SQLite/MySQL via sqlx Any driver               │
//! │  • MemoryStore: embedded, for tests and ephemeral use       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use firedb::{FireDb, FireDbConfig};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), firedb::FireDbError> {
//!     let config = FireDbConfig {
//!         sql_url: Some("sqlite:fire.db?mode=rwc".into()),
//!         ..Default::default()
//!     };
//!     let db = FireDb::connect(&config).await?;
//!
//!     // Write a nested document; it is flattened into one row per leaf
//!     db.set("users/alice", &json!({"name": "Alice", "age": 30})).await?;
//!
//!     // Read it back, reconstructed from rows
//!     let doc = db.get("users/alice").await?;
//!     assert_eq!(doc["name"], "Alice");
//!
//!     // Ordered child insertion
//!     let key = db.generate_key()?;
//!     db.set(&format!("posts/{}", key), &json!({"title": "hello"})).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`store`]: The [`FireDb`] facade orchestrating all components
//! - [`path`]: Path validation and tokenization
//! - [`mapper`]: Document ⇄ row flattening and reconstruction
//! - [`index`]: Sibling-property fingerprints (emulated secondary index)
//! - [`range`]: Range query specification and predicate assembly
//! - [`keygen`]: Lexicographically sortable unique key generation
//! - [`storage`]: Storage collaborators (SQL, memory)
//! - [`resilience`]: Retry logic for the SQL collaborator

pub mod config;
pub mod error;
pub mod path;
pub mod value;
pub mod row;
pub mod index;
pub mod mapper;
pub mod range;
pub mod keygen;
pub mod storage;
pub mod resilience;
pub mod store;

pub use config::FireDbConfig;
pub use error::FireDbError;
pub use path::{Path, MAX_DEPTH};
pub use row::{Row, ValueKind};
pub use range::RangeSpec;
pub use keygen::{Clock, KeyGenerator, SystemClock, KEY_LEN};
pub use storage::traits::{StorageError, TableStore};
pub use storage::sql::SqlStore;
pub use storage::memory::MemoryStore;
pub use store::FireDb;

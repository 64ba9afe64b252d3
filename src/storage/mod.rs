//! Storage collaborators.
//!
//! The core is storage-agnostic: it speaks to anything implementing
//! [`traits::TableStore`]. Two backends ship in-tree — [`sql::SqlStore`]
//! for SQLite/MySQL and [`memory::MemoryStore`] for tests and ephemeral
//! use.

pub mod traits;
pub mod sql;
pub mod memory;

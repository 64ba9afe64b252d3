// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! The flat persisted row and the fixed table schema.
//!
//! One row encodes one scalar leaf plus its full path. Objects are never
//! stored as a unit; only their transitive leaves become rows.
//!
//! Schema (single table, fixed arity):
//! ```sql
//! CREATE TABLE fire_tree (
//!   path0 VARCHAR(255) NOT NULL,  -- leading path segment
//!   path1..path9 VARCHAR(255),    -- remaining slots, NULL past the leaf depth
//!   type VARCHAR(8) NOT NULL,     -- bool | int | varchar | text
//!   int_value BIGINT,             -- ints, and bools as 0/1
//!   varchar_value VARCHAR(255),   -- strings shorter than 255
//!   text_value LONGTEXT,          -- strings of 255 and up
//!   index_hash VARCHAR(64)        -- sibling-property fingerprint, numeric leaves only
//! )
//! ```

use serde_json::Value;

use crate::index::sibling_fingerprint;
use crate::path::{Path, MAX_DEPTH};
use crate::value::Scalar;

/// Table name embedded in generated SQL. Never derived from request input.
pub const TABLE: &str = "fire_tree";

/// Path slot column names, indexed by depth.
pub const PATH_COLUMNS: [&str; MAX_DEPTH] = [
    "path0", "path1", "path2", "path3", "path4", "path5", "path6", "path7", "path8", "path9",
];

/// Strings below this length go to `varchar_value`, the rest to `text_value`.
pub const MAX_VARCHAR_LEN: usize = 255;

/// Discriminant for which value column a row populates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    Int,
    Varchar,
    Text,
}

impl ValueKind {
    /// The tag stored in the `type` column.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Varchar => "varchar",
            ValueKind::Text => "text",
        }
    }

    /// Parse a `type` column tag read back from storage.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "bool" => Some(ValueKind::Bool),
            "int" => Some(ValueKind::Int),
            "varchar" => Some(ValueKind::Varchar),
            "text" => Some(ValueKind::Text),
            _ => None,
        }
    }
}

/// One flat persisted leaf.
///
/// Exactly one of the three value fields is populated, determined by `kind`.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Path slots; `path[i]` is `None` for every slot at or past the leaf depth.
    pub path: [Option<String>; MAX_DEPTH],
    pub kind: ValueKind,
    pub int_value: Option<i64>,
    pub varchar_value: Option<String>,
    pub text_value: Option<String>,
    /// Sibling-property fingerprint; populated only for numeric leaves
    /// deep enough to have a grouping grandparent.
    pub index_hash: Option<String>,
}

impl Row {
    /// Build the row for a scalar leaf at `path`.
    pub fn leaf(path: &Path, scalar: &Scalar) -> Self {
        let mut slots: [Option<String>; MAX_DEPTH] = Default::default();
        for (slot, segment) in slots.iter_mut().zip(path.segments()) {
            *slot = Some(segment.clone());
        }

        let index_hash = if scalar.is_numeric() {
            sibling_fingerprint(path.segments())
        } else {
            None
        };

        let (kind, int_value, varchar_value, text_value) = match scalar {
            Scalar::Bool(b) => (ValueKind::Bool, Some(i64::from(*b)), None, None),
            Scalar::Int(i) => (ValueKind::Int, Some(*i), None, None),
            Scalar::Str(s) if s.len() < MAX_VARCHAR_LEN => {
                (ValueKind::Varchar, None, Some(s.clone()), None)
            }
            Scalar::Str(s) => (ValueKind::Text, None, None, Some(s.clone())),
        };

        Self {
            path: slots,
            kind,
            int_value,
            varchar_value,
            text_value,
            index_hash,
        }
    }

    /// Leaf depth: the number of populated path slots.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.path.iter().take_while(|slot| slot.is_some()).count()
    }

    /// True when the leading path slots equal `prefix` in order.
    #[must_use]
    pub fn matches_prefix(&self, prefix: &[String]) -> bool {
        prefix.len() <= MAX_DEPTH
            && prefix
                .iter()
                .zip(&self.path)
                .all(|(want, slot)| slot.as_deref() == Some(want.as_str()))
    }

    /// Decode the stored leaf back into a document value.
    ///
    /// Bools come back from their 0/1 encoding in `int_value`; missing
    /// value columns (possible only on a corrupted table) decode to the
    /// kind's zero value.
    #[must_use]
    pub fn document_value(&self) -> Value {
        match self.kind {
            ValueKind::Bool => Value::Bool(self.int_value.unwrap_or(0) != 0),
            ValueKind::Int => Value::from(self.int_value.unwrap_or(0)),
            ValueKind::Varchar => Value::String(self.varchar_value.clone().unwrap_or_default()),
            ValueKind::Text => Value::String(self.text_value.clone().unwrap_or_default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(raw: &str) -> Path {
        Path::parse(raw).unwrap()
    }

    #[test]
    fn test_bool_row_uses_int_column() {
        let row = Row::leaf(&path("x"), &Scalar::Bool(true));
        assert_eq!(row.kind, ValueKind::Bool);
        assert_eq!(row.int_value, Some(1));
        assert!(row.varchar_value.is_none());
        assert!(row.text_value.is_none());
        assert_eq!(row.document_value(), Value::Bool(true));
    }

    #[test]
    fn test_int_row() {
        let row = Row::leaf(&path("x"), &Scalar::Int(42));
        assert_eq!(row.kind, ValueKind::Int);
        assert_eq!(row.int_value, Some(42));
        assert_eq!(row.document_value(), Value::from(42));
    }

    #[test]
    fn test_string_length_dispatch() {
        let short = Row::leaf(&path("x"), &Scalar::Str("a".repeat(10)));
        assert_eq!(short.kind, ValueKind::Varchar);
        assert!(short.varchar_value.is_some());
        assert!(short.text_value.is_none());

        let exact = Row::leaf(&path("x"), &Scalar::Str("a".repeat(255)));
        assert_eq!(exact.kind, ValueKind::Text);

        let long = Row::leaf(&path("x"), &Scalar::Str("a".repeat(300)));
        assert_eq!(long.kind, ValueKind::Text);
        assert!(long.text_value.is_some());
        assert!(long.varchar_value.is_none());
    }

    #[test]
    fn test_path_slots_padded_with_null() {
        let row = Row::leaf(&path("a/b/c"), &Scalar::Int(1));
        assert_eq!(row.depth(), 3);
        assert_eq!(row.path[0].as_deref(), Some("a"));
        assert_eq!(row.path[2].as_deref(), Some("c"));
        assert!(row.path[3..].iter().all(Option::is_none));
    }

    #[test]
    fn test_index_hash_only_for_deep_numeric_leaves() {
        assert!(Row::leaf(&path("a/b/c"), &Scalar::Int(1)).index_hash.is_some());
        assert!(Row::leaf(&path("a/b/c"), &Scalar::Bool(true)).index_hash.is_some());
        assert!(Row::leaf(&path("a/b/c"), &Scalar::Str("s".into())).index_hash.is_none());
        // No grouping grandparent above depth 2
        assert!(Row::leaf(&path("a/b"), &Scalar::Int(1)).index_hash.is_none());
        assert!(Row::leaf(&path("a"), &Scalar::Int(1)).index_hash.is_none());
    }

    #[test]
    fn test_matches_prefix() {
        let row = Row::leaf(&path("a/b/c"), &Scalar::Int(1));
        assert!(row.matches_prefix(&["a".into()]));
        assert!(row.matches_prefix(&["a".into(), "b".into()]));
        assert!(row.matches_prefix(&["a".into(), "b".into(), "c".into()]));
        assert!(!row.matches_prefix(&["a".into(), "x".into()]));
        assert!(!row.matches_prefix(&["a".into(), "b".into(), "c".into(), "d".into()]));
    }

    #[test]
    fn test_kind_tags_round_trip() {
        for kind in [ValueKind::Bool, ValueKind::Int, ValueKind::Varchar, ValueKind::Text] {
            assert_eq!(ValueKind::from_tag(kind.as_str()), Some(kind));
        }
        assert_eq!(ValueKind::from_tag("float"), None);
    }
}

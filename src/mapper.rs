// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Bidirectional mapping between tree documents and flat rows.
//!
//! Write path: [`flatten`] turns a document at a path into one row per
//! scalar leaf. `Null` produces no rows, which encodes deletion. Objects
//! contribute no row of their own.
//!
//! Read path: [`reconstruct`] folds a set of rows sharing a path prefix
//! back into a nested document.
//!
//! Recursion is bounded by [`MAX_DEPTH`](crate::path::MAX_DEPTH), so
//! direct recursive descent is safe.

use serde_json::{Map, Value};

use crate::error::FireDbError;
use crate::path::Path;
use crate::row::Row;
use crate::value::Scalar;

/// Flatten a document value at `path` into its leaf rows.
///
/// An empty result means "delete only": `set` still clears the path
/// prefix, it just inserts nothing after.
pub fn flatten(path: &Path, value: &Value) -> Result<Vec<Row>, FireDbError> {
    let mut rows = Vec::new();
    flatten_into(path, value, &mut rows)?;
    Ok(rows)
}

fn flatten_into(path: &Path, value: &Value, rows: &mut Vec<Row>) -> Result<(), FireDbError> {
    match value {
        Value::Null => Ok(()),
        Value::Object(children) => {
            for (key, child) in children {
                // Null children are absent leaves, not rows
                if child.is_null() {
                    continue;
                }
                let child_path = path.child(key)?;
                flatten_into(&child_path, child, rows)?;
            }
            Ok(())
        }
        scalar => {
            rows.push(Row::leaf(path, &Scalar::from_json(scalar)?));
            Ok(())
        }
    }
}

/// Rebuild a document from rows that matched a path prefix of depth
/// `query_depth`.
///
/// Each row's slots past `query_depth` name the position of its leaf
/// inside the result; a row with no further slots makes the whole
/// document that scalar. No rows yields `Null`, never an empty object.
#[must_use]
pub fn reconstruct(rows: &[Row], query_depth: usize) -> Value {
    let mut root = Map::new();
    let mut scalar_root = None;

    for row in rows {
        let mut sub_path = Vec::new();
        for slot in row.path.iter().skip(query_depth) {
            match slot {
                Some(segment) => sub_path.push(segment.as_str()),
                None => break,
            }
        }

        let leaf = row.document_value();
        if sub_path.is_empty() {
            scalar_root = Some(leaf);
        } else {
            insert_leaf(&mut root, &sub_path, leaf);
        }
    }

    // A row matching exactly at query_depth IS the document
    if let Some(scalar) = scalar_root {
        return scalar;
    }
    if root.is_empty() {
        return Value::Null;
    }
    Value::Object(root)
}

fn insert_leaf(node: &mut Map<String, Value>, sub_path: &[&str], leaf: Value) {
    let (first, rest) = match sub_path.split_first() {
        Some(parts) => parts,
        None => return,
    };

    if rest.is_empty() {
        node.insert((*first).to_owned(), leaf);
        return;
    }

    let child = node
        .entry((*first).to_owned())
        .or_insert_with(|| Value::Object(Map::new()));
    if !child.is_object() {
        // A scalar and a subtree can only collide on a corrupted table;
        // the deeper leaves win, matching the read-side walk order.
        *child = Value::Object(Map::new());
    }
    if let Value::Object(map) = child {
        insert_leaf(map, rest, leaf);
    }
}

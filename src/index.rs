// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Sibling-property fingerprints: the emulated secondary index.
//!
//! Every leaf with the same segment name, sitting at the same relative
//! depth under the same grandparent, shares one fingerprint. Grouping rows
//! by that fingerprint answers "the set of values of property P across all
//! children of X" with a single indexed equality scan, and no index
//! metadata table.
//!
//! The fingerprint is computed over an *extended path* whose last two
//! elements are the child-id slot and the property name. On the write side
//! a leaf's own path already has that shape (its parent segment is the
//! child id); on the query side the caller appends [`CHILD_ID_PLACEHOLDER`]
//! and the property name to the query path. The child-id element never
//! contributes to the digest, so both sides agree.

use sha2::{Digest, Sha256};

/// Stand-in for the child-id slot when extending a query path. Any value
/// works; the slot is skipped when hashing.
pub const CHILD_ID_PLACEHOLDER: &str = "*";

/// Compute the grouping fingerprint for an extended path.
///
/// Returns `None` when the extended path has two or fewer elements: there
/// is no grandparent to group under. Otherwise the fingerprint is the
/// hex-encoded SHA-256 of `root + ":" + property`, where `root` is every
/// element but the last two joined by `/` and `property` is the last.
pub fn sibling_fingerprint<S: AsRef<str>>(extended: &[S]) -> Option<String> {
    if extended.len() <= 2 {
        return None;
    }

    let property = extended[extended.len() - 1].as_ref();
    let root_segments: Vec<&str> = extended[..extended.len() - 2]
        .iter()
        .map(AsRef::as_ref)
        .collect();
    let root = root_segments.join("/");

    let mut hasher = Sha256::new();
    hasher.update(root.as_bytes());
    hasher.update(b":");
    hasher.update(property.as_bytes());
    Some(hex::encode(hasher.finalize()))
}

/// Fingerprint for "property `property` across the children of `parent`".
///
/// Builds the extended path the range query stage needs: parent segments,
/// a placeholder for the child-id slot, then the property name.
pub fn property_fingerprint<S: AsRef<str>>(parent: &[S], property: &str) -> Option<String> {
    let mut extended: Vec<&str> = parent.iter().map(AsRef::as_ref).collect();
    extended.push(CHILD_ID_PLACEHOLDER);
    extended.push(property);
    sibling_fingerprint(&extended)
}

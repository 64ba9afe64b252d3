// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Path validation and tokenization.
//!
//! A path addresses a position in the document tree as an ordered list of
//! slash-separated segments: `users/alice/age`. Segments are limited to
//! `[A-Za-z0-9-_@]` and paths to [`MAX_DEPTH`] segments, which also bounds
//! the arity of the flat row schema.

use std::fmt;

use crate::error::FireDbError;

/// Maximum number of path segments, and the number of `pathN` row columns.
pub const MAX_DEPTH: usize = 10;

/// A validated, tokenized tree path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    /// Parse and validate a slash-separated path string.
    ///
    /// Fails when any segment is empty or contains a character outside
    /// `[A-Za-z0-9-_@]`, or when the segment count exceeds [`MAX_DEPTH`].
    pub fn parse(raw: &str) -> Result<Self, FireDbError> {
        let segments: Vec<String> = raw.split('/').map(str::to_owned).collect();

        for segment in &segments {
            if !valid_segment(segment) {
                return Err(FireDbError::InvalidPath(format!(
                    "segment '{}' in '{}'",
                    segment, raw
                )));
            }
        }

        if segments.len() > MAX_DEPTH {
            return Err(FireDbError::InvalidPath(format!(
                "'{}' is deeper than the allowed max of {}",
                raw, MAX_DEPTH
            )));
        }

        Ok(Self { segments })
    }

    /// Number of segments.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// The validated segments, in order.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Extend the path by one child segment, re-validating charset and depth.
    pub fn child(&self, segment: &str) -> Result<Self, FireDbError> {
        if !valid_segment(segment) {
            return Err(FireDbError::InvalidPath(format!(
                "segment '{}' under '{}'",
                segment, self
            )));
        }
        if self.segments.len() >= MAX_DEPTH {
            return Err(FireDbError::InvalidPath(format!(
                "'{}/{}' is deeper than the allowed max of {}",
                self, segment, MAX_DEPTH
            )));
        }
        let mut segments = self.segments.clone();
        segments.push(segment.to_owned());
        Ok(Self { segments })
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

/// A segment can't be empty and can't contain anything except allowed chars.
fn valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b'@')
}

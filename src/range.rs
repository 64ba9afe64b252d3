// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Range query specification over one sibling property.
//!
//! The only query shape beyond path-prefix equality: select the children
//! of a path whose property `P` falls inside an inclusive numeric range.
//! Execution is two-staged — an inner scan over the property's sibling
//! fingerprint picks the matching child ids, an outer prefix scan pulls
//! those children whole. Both stages run as one parameterized statement
//! through the collaborator's raw-query escape hatch.

use serde::Deserialize;
use serde_json::Value;

use crate::error::FireDbError;
use crate::index::property_fingerprint;
use crate::path::Path;

/// Inclusive bounds on a numeric property value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Bounds {
    #[serde(default)]
    pub start: Option<i64>,
    #[serde(default)]
    pub end: Option<i64>,
}

/// A single-property range condition: `property` within `[start, end]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeSpec {
    pub property: String,
    pub start: Option<i64>,
    pub end: Option<i64>,
}

impl RangeSpec {
    /// Range with both bounds.
    pub fn between(property: impl Into<String>, start: i64, end: i64) -> Self {
        Self {
            property: property.into(),
            start: Some(start),
            end: Some(end),
        }
    }

    /// Lower-bounded range.
    pub fn at_least(property: impl Into<String>, start: i64) -> Self {
        Self {
            property: property.into(),
            start: Some(start),
            end: None,
        }
    }

    /// Upper-bounded range.
    pub fn at_most(property: impl Into<String>, end: i64) -> Self {
        Self {
            property: property.into(),
            end: Some(end),
            start: None,
        }
    }

    /// Parse the wire shape `{"score": {"start": 15, "end": 40}}`.
    ///
    /// Fails with [`FireDbError::InvalidRangeQuery`] unless the map names
    /// exactly one property with at least one bound.
    pub fn from_json(spec: &Value) -> Result<Self, FireDbError> {
        let map = match spec {
            Value::Object(map) => map,
            other => {
                return Err(FireDbError::InvalidRangeQuery(format!(
                    "expected an object, got {}",
                    other
                )))
            }
        };

        let mut entries = map.iter();
        let (property, bounds_value) = entries.next().ok_or_else(|| {
            FireDbError::InvalidRangeQuery("no property name given".into())
        })?;
        if entries.next().is_some() {
            return Err(FireDbError::InvalidRangeQuery(format!(
                "more than one property name given ({})",
                map.len()
            )));
        }

        let bounds: Bounds = serde_json::from_value(bounds_value.clone())
            .map_err(|e| FireDbError::InvalidRangeQuery(e.to_string()))?;

        let spec = Self {
            property: property.clone(),
            start: bounds.start,
            end: bounds.end,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Reject specs with neither bound.
    pub fn validate(&self) -> Result<(), FireDbError> {
        if self.start.is_none() && self.end.is_none() {
            return Err(FireDbError::InvalidRangeQuery(format!(
                "property '{}' has neither start nor end",
                self.property
            )));
        }
        Ok(())
    }

    /// The child-id slot index: one past the queried path's depth.
    #[must_use]
    pub fn ids_slot(path: &Path) -> usize {
        path.depth()
    }

    /// The inner-stage grouping fingerprint for this spec under `path`.
    ///
    /// Every valid path has one; the extended path is always at least
    /// three elements long.
    #[must_use]
    pub fn fingerprint(&self, path: &Path) -> Option<String> {
        property_fingerprint(path.segments(), &self.property)
    }
}

//! Scalar leaf values.
//!
//! Documents travel through the public API as [`serde_json::Value`], but
//! only null, bool, integer, string, and object nodes are storable. The
//! [`Scalar`] union pins down the three persistable leaf kinds so the row
//! mapping is an exhaustive match rather than a string-tagged dispatch.

use serde_json::Value;

use crate::error::FireDbError;

/// A persistable leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl Scalar {
    /// Classify a JSON node as a scalar leaf.
    ///
    /// Objects and nulls are handled by the mapper before this point, so
    /// here they are rejected alongside the genuinely unsupported shapes
    /// (floats, arrays).
    pub fn from_json(value: &Value) -> Result<Self, FireDbError> {
        match value {
            Value::Bool(b) => Ok(Scalar::Bool(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(Scalar::Int(i)),
                None => Err(FireDbError::UnsupportedValue(format!(
                    "non-integer number {}",
                    n
                ))),
            },
            Value::String(s) => Ok(Scalar::Str(s.clone())),
            Value::Array(_) => Err(FireDbError::UnsupportedValue("array".into())),
            Value::Null => Err(FireDbError::UnsupportedValue("null".into())),
            Value::Object(_) => Err(FireDbError::UnsupportedValue("object".into())),
        }
    }

    /// True for bool and int leaves, the kinds covered by the emulated index.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Scalar::Bool(_) | Scalar::Int(_))
    }
}

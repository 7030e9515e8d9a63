//! Newtype IDs for type-safe record references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different collections of the backend.
//!
//! The backend assigns record ids. Older `json-server` releases hand out
//! integers (`4`), newer ones short strings (`"9f3a"`), and a single
//! collection can hold both once records are created by a newer server.
//! IDs are therefore kept as text and compared as text, so `4` and `"4"`
//! name the same record.

use serde::Deserialize;
use serde::de::{Deserializer, Error as _};
use serde::ser::Serializer;
use thiserror::Error;

/// Error parsing an ID from a form field or path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("record id is empty")]
pub struct InvalidId;

/// An ID as it appears on the wire.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireId {
    Number(i64),
    Text(String),
}

/// Deserialize an ID from either a JSON number or a non-blank string.
///
/// Used by [`define_id!`]; not meant to be called directly.
#[doc(hidden)]
pub fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match WireId::deserialize(deserializer)? {
        WireId::Number(n) => Ok(n.to_string()),
        WireId::Text(s) if !s.trim().is_empty() => Ok(s),
        WireId::Text(_) => Err(D::Error::custom(InvalidId)),
    }
}

/// Serialize an ID back the way the backend wrote it: canonical integers as
/// JSON numbers, everything else as strings.
///
/// Used by [`define_id!`]; not meant to be called directly.
///
/// # Errors
///
/// Returns the serializer's error.
#[doc(hidden)]
pub fn serialize_id<S>(id: &str, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match id.parse::<i64>() {
        Ok(n) if n.to_string() == id => serializer.serialize_i64(n),
        _ => serializer.serialize_str(id),
    }
}

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around the textual record id with:
/// - `Serialize`/`Deserialize` accepting numbers and strings
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_str()`
/// - `From<i64>`, `From<&str>` and `From<String>` implementations
/// - `FromStr`, so IDs can be read straight out of form fields
///
/// # Example
///
/// ```rust
/// # use kasir_core::define_id;
/// define_id!(ShelfId);
/// define_id!(DrawerId);
///
/// let shelf = ShelfId::new(1);
/// let drawer = DrawerId::new("9f3a");
/// assert_eq!(shelf.as_str(), "1");
///
/// // These are different types, so this won't compile:
/// // let _: ShelfId = drawer;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from anything displayable, e.g. `4` or `"9f3a"`.
            #[must_use]
            pub fn new(id: impl ::core::fmt::Display) -> Self {
                Self(id.to_string())
            }

            /// Get the ID as the backend spells it.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::types::id::InvalidId;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                let s = s.trim();
                if s.is_empty() {
                    return Err($crate::types::id::InvalidId);
                }
                Ok(Self(s.to_string()))
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id.to_string())
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::core::result::Result<S::Ok, S::Error>
            where
                S: ::serde::Serializer,
            {
                $crate::types::id::serialize_id(&self.0, serializer)
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                $crate::types::id::deserialize_id(deserializer).map(Self)
            }
        }
    };
}

define_id!(CategoryId);
define_id!(ProductId);
define_id!(CartItemId);

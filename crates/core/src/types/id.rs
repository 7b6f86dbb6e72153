//! Newtype IDs for type-safe entity references.
//!
//! The commerce backend hands out opaque string identifiers. Use the
//! `define_id!` macro to wrap them so product IDs can't be confused with
//! order references or user IDs.

use core::fmt;

/// Errors that can occur when parsing an ID.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The input string is empty or only whitespace.
    #[error("id cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("id must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// Maximum accepted length of a backend identifier.
pub const MAX_ID_LENGTH: usize = 128;

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - `parse()` (trims, rejects empty and over-long input) and `as_str()`
/// - `Display` and `AsRef<str>`
///
/// # Example
///
/// ```rust
/// # use soar_core::define_id;
/// define_id!(SkuId);
/// define_id!(WarehouseId);
///
/// let sku = SkuId::parse("sku-1").unwrap();
/// let warehouse = WarehouseId::parse("sku-1").unwrap();
///
/// // These are different types, so this won't compile:
/// // let _: SkuId = warehouse;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Parse an ID from a string, trimming surrounding whitespace.
            ///
            /// # Errors
            ///
            /// Returns an error if the trimmed input is empty or too long.
            pub fn parse(s: &str) -> ::core::result::Result<Self, $crate::IdError> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err($crate::IdError::Empty);
                }
                if trimmed.len() > $crate::MAX_ID_LENGTH {
                    return Err($crate::IdError::TooLong {
                        max: $crate::MAX_ID_LENGTH,
                    });
                }
                Ok(Self(trimmed.to_owned()))
            }

            /// Get the underlying string value.
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

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(ProductId);
define_id!(UserId);

/// Reference attached to a payment-link request so the backend can correlate
/// the hosted payment session with this storefront order.
///
/// Format: `order_{unix_millis}_{user_id|guest}_{suffix}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct OrderReference(String);

impl OrderReference {
    /// Marker used in place of a user ID for anonymous checkouts.
    pub const GUEST: &'static str = "guest";

    /// Build a reference from its parts.
    #[must_use]
    pub fn new(timestamp_millis: i64, user_id: Option<&UserId>, suffix: &str) -> Self {
        let owner = user_id.map_or(Self::GUEST, UserId::as_str);
        Self(format!("order_{timestamp_millis}_{owner}_{suffix}"))
    }

    /// Generate a fresh reference from the current time and a random suffix.
    #[must_use]
    pub fn generate(user_id: Option<&UserId>) -> Self {
        use rand::Rng;

        let suffix: String = rand::rng()
            .sample_iter(rand::distr::Alphanumeric)
            .take(6)
            .map(char::from)
            .collect();
        Self::new(chrono::Utc::now().timestamp_millis(), user_id, &suffix)
    }

    /// Returns the reference as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

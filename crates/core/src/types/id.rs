//! Newtype IDs for type-safe entity references.
//!
//! Catalog records (products, categories) carry numeric IDs assigned by the
//! persistence service. User, order and address records carry string keys:
//! user IDs come from the identity provider, and order/address keys are
//! generated client-side with a readable prefix (`ORD-…`, `ADDR-…`).

use uuid::Uuid;

/// Macro to define a numeric, type-safe ID wrapper.
///
/// Creates a newtype wrapper around `i64` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `Ord`
/// - Conversion methods: `new()`, `as_i64()`
/// - `From<i64>`, `Into<i64>`, `Display` and `FromStr` implementations
///
/// # Example
///
/// ```rust
/// # use storekeeper_core::define_id;
/// define_id!(WidgetId);
/// define_id!(GadgetId);
///
/// let widget = WidgetId::new(1);
/// let gadget = GadgetId::new(1);
/// assert_eq!(widget.as_i64(), gadget.as_i64());
///
/// // These are different types, so this won't compile:
/// // let _: WidgetId = gadget;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Create a new ID from an i64 value.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the underlying i64 value.
            #[must_use]
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

/// Macro to define a string-keyed, type-safe ID wrapper.
///
/// Same shape as [`define_id!`] but backed by a `String`, for keys that are
/// assigned outside the persistence service.
///
/// # Example
///
/// ```rust
/// # use storekeeper_core::define_key;
/// define_key!(TicketId);
///
/// let ticket = TicketId::new("T-1");
/// assert_eq!(ticket.as_str(), "T-1");
/// ```
#[macro_export]
macro_rules! define_key {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new key from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the key as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the key and returns its inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
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

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

// Catalog IDs (assigned by the persistence service)
define_id!(ProductId);
define_id!(CategoryId);

// Keys assigned by the identity provider or generated client-side
define_key!(UserId);
define_key!(OrderId);
define_key!(AddressId);

/// Build a fresh `PREFIX-<hex>` key.
///
/// Every call yields a distinct key, so two orders placed from the same cart
/// in quick succession never collide.
fn prefixed_key(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple()).to_uppercase()
}

impl OrderId {
    /// Prefix carried by every generated order key.
    pub const PREFIX: &'static str = "ORD";

    /// Generate a new unique order key.
    #[must_use]
    pub fn generate() -> Self {
        Self(prefixed_key(Self::PREFIX))
    }
}

impl AddressId {
    /// Prefix carried by every generated address key.
    pub const PREFIX: &'static str = "ADDR";

    /// Generate a new unique address key.
    #[must_use]
    pub fn generate() -> Self {
        Self(prefixed_key(Self::PREFIX))
    }
}

//! Newtype IDs for type-safe entity references.
//!
//! The order backend hands out opaque string identifiers for stations, pickup
//! stores and orders. Use the `define_id!` macro to wrap them so a station id
//! can never be passed where a store id is expected.

/// Macro to define a type-safe, string-backed ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - `new()`, `as_str()` and `Display`
/// - `From<String>` and `From<&str>`
///
/// # Example
///
/// ```rust
/// # use lemanshop_core::define_id;
/// define_id!(WarehouseId);
///
/// let id = WarehouseId::new("wh-lausanne");
/// assert_eq!(id.as_str(), "wh-lausanne");
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
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying identifier.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the identifier is blank.
            #[must_use]
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }
    };
}

define_id!(StationId);
define_id!(StoreId);
define_id!(OrderId);
define_id!(ProductId);
define_id!(ContactId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_distinct_types() {
        let station = StationId::new("lausanne");
        let store = StoreId::from("nyon-market");
        assert_eq!(station.to_string(), "lausanne");
        assert_eq!(store.as_str(), "nyon-market");
        assert!(StationId::new("  ").is_blank());
    }
}

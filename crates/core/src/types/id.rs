//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types.
//!
//! IDs are opaque strings in storage (`prod-…`, `order-…`). Freshly generated
//! IDs carry the entity prefix followed by a v4 UUID; IDs loaded from storage
//! are accepted verbatim so seeded records like `demo-1` keep working.

/// Macro to define a type-safe, string-backed ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `generate()`, `as_str()`
/// - `From<&str>`, `From<String>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use anonshop_core::define_id;
/// define_id!(WidgetId, "widget");
/// define_id!(GadgetId, "gadget");
///
/// let widget = WidgetId::generate();
/// assert!(widget.as_str().starts_with("widget-"));
///
/// // These are different types, so this won't compile:
/// // let _: WidgetId = GadgetId::generate();
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
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
            /// Prefix used for freshly generated IDs.
            pub const PREFIX: &'static str = $prefix;

            /// Wrap an existing ID value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a new unique ID of the form `<prefix>-<uuid>`.
            #[must_use]
            pub fn generate() -> Self {
                Self(format!("{}-{}", $prefix, ::uuid::Uuid::new_v4().simple()))
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

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.to_owned()))
            }
        }
    };
}

// Define standard entity IDs
define_id!(ProductId, "prod");
define_id!(OrderId, "order");
define_id!(CustomerId, "cust");
define_id!(VendorCodeId, "code");
define_id!(StatId, "stat");
define_id!(MessageId, "MSG");

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_carry_prefix() {
        let id = ProductId::generate();
        assert!(id.as_str().starts_with("prod-"));

        let id = OrderId::generate();
        assert!(id.as_str().starts_with("order-"));
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = OrderId::generate();
        let b = OrderId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_existing_ids_round_trip_verbatim() {
        let id = ProductId::new("demo-1");
        assert_eq!(id.to_string(), "demo-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"demo-1\"");
    }
}

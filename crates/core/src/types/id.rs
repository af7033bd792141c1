//! Newtype IDs for restaurant entities.
//!
//! Every table keyed by a `SERIAL` column gets its own wrapper so a menu item
//! id can never be passed where a promo code id is expected.

/// Define a type-safe `i32` ID wrapper.
///
/// The generated type is `Copy`, ordered, hashable, serializes as a bare
/// number and parses from a decimal string (for path parameters). With the
/// `postgres` feature it also maps to a Postgres `INTEGER`.
///
/// # Example
///
/// ```rust
/// # use saffron_core::define_id;
/// define_id!(TableId, "A dine-in table.");
/// define_id!(ReservationId, "A table reservation.");
///
/// let table = TableId::new(4);
/// assert_eq!(table.as_i32(), 4);
/// assert_eq!("4".parse::<TableId>().unwrap(), table);
///
/// // Different types, so this won't compile:
/// // let _: ReservationId = table;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
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
        pub struct $name(i32);

        impl $name {
            /// Wrap a raw database id.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// The raw database id.
            #[must_use]
            pub const fn as_i32(&self) -> i32 {
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

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.trim().parse::<i32>().map(Self)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <i32 as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <i32 as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $name {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
                let id = <i32 as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
                Ok(Self(id))
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <i32 as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

define_id!(UserId, "A customer or staff account.");
define_id!(BranchId, "A restaurant branch that fulfils orders.");
define_id!(MenuItemId, "A dish or drink on the menu.");
define_id!(PromoCodeId, "An administrator-defined promo code.");
define_id!(OrderId, "A placed order.");

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(" 17 ".parse::<MenuItemId>().unwrap(), MenuItemId::new(17));
        assert!("seventeen".parse::<MenuItemId>().is_err());
    }

    #[test]
    fn test_serializes_as_bare_number() {
        let json = serde_json::to_string(&PromoCodeId::new(3)).unwrap();
        assert_eq!(json, "3");

        let parsed: OrderId = serde_json::from_str("42").unwrap();
        assert_eq!(parsed, OrderId::new(42));
    }
}

//! String identifiers for catalog entries.
//!
//! Content refers to resources, buildings, passives and tiers by name. Each
//! kind gets its own newtype so a building id can never be passed where a
//! resource id is expected.

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::ops::Deref for $name {
            type Target = str;

            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl core::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id! {
    /// Identifier of a tracked quantity (gold, happiness, fortification, ...).
    ///
    /// Stats share this namespace: a stat is a resource flagged as such.
    ResourceId
}

string_id! {
    /// Identifier of a building definition.
    BuildingId
}

string_id! {
    /// Identifier of a passive registered on a player.
    PassiveId
}

string_id! {
    /// Identifier of one tier inside a tier track.
    TierId
}

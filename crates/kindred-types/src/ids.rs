//! Type-safe identifier wrappers.
//!
//! Persons carry a [`Uuid`] (v7, time-ordered) so ids minted by separate
//! group generators never collide. Items and recipes are addressed by their
//! position in the registry, wrapped so the two index spaces cannot be mixed.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

/// Generates a newtype wrapper around a registry position.
macro_rules! define_index {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub u32);

        impl $name {
            /// Return the position as a `usize` for slice lookups.
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(id: u32) -> Self {
                Self(id)
            }
        }
    };
}

define_id! {
    /// Unique identifier for a person in the simulation.
    PersonId
}

define_index! {
    /// Position of an item definition in the registry. Id 0 is the sentinel
    /// "no item".
    ItemId
}

define_index! {
    /// Position of a recipe definition in the registry.
    RecipeId
}

impl ItemId {
    /// The reserved sentinel id.
    pub const NONE: Self = Self(0);

    /// Whether this is the sentinel id.
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn person_ids_are_unique() {
        assert_ne!(PersonId::new(), PersonId::new());
    }

    #[test]
    fn item_id_serializes_as_bare_number() {
        let json = serde_json::to_string(&ItemId(7)).ok();
        assert_eq!(json.as_deref(), Some("7"));
    }

    #[test]
    fn sentinel_item_id() {
        assert!(ItemId::NONE.is_none());
        assert!(!ItemId(3).is_none());
        assert_eq!(ItemId::default(), ItemId::NONE);
    }
}

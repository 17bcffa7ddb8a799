//! Error types for the `kindred-content` crate.
//!
//! Only loading can fail. Lookups of unknown ids return the sentinel item or
//! `None`, and the condition engine is total.

use kindred_types::{ItemId, RecipeId};

/// Errors raised while building a [`Registry`](crate::Registry) from content.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// The content pack is not valid JSON for the record shapes.
    #[error("failed to parse content pack: {source}")]
    Parse {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// A recipe refers to an item id that does not exist.
    #[error("recipe {recipe} refers to unknown item {item}")]
    DanglingItem {
        /// The offending recipe.
        recipe: RecipeId,
        /// The missing item id.
        item: ItemId,
    },

    /// A recipe declares no outcomes.
    #[error("recipe {0} has no results")]
    EmptyResults(RecipeId),

    /// The content pack holds more records than ids can address.
    #[error("too many {kind} records: {count}")]
    TooMany {
        /// Which record kind overflowed.
        kind: &'static str,
        /// How many records were supplied.
        count: usize,
    },
}

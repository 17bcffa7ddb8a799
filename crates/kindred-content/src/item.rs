//! Item definitions and runtime item instances.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use kindred_types::{ItemDisplay, ItemId, ItemRecord};

/// Tag marking an item as a gathering terminal.
pub const TAG_ROOT: &str = "root";
/// Alternative spelling of [`TAG_ROOT`] used by natural features.
pub const TAG_NATURAL: &str = "natural";
/// Tag for cells nobody can walk through.
pub const TAG_BLOCKING: &str = "blocking";

/// An immutable, content-defined item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Registry position. 0 is the sentinel.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Tags.
    pub tags: Vec<String>,
    /// Ordered display glyphs.
    pub display: Vec<ItemDisplay>,
    /// Numeric properties.
    pub properties: BTreeMap<String, f64>,
}

impl Item {
    /// Build an item from its record at the given position.
    pub fn from_record(id: ItemId, record: ItemRecord) -> Self {
        Self {
            id,
            name: record.name,
            tags: record.tags,
            display: record.display,
            properties: record.properties,
        }
    }

    /// The "no item" sentinel: id 0, no tags, no properties, one blank glyph.
    pub fn sentinel() -> Self {
        Self {
            id: ItemId::NONE,
            name: String::new(),
            tags: Vec::new(),
            display: vec![ItemDisplay::default()],
            properties: BTreeMap::new(),
        }
    }

    /// Convert back into a record (the id is dropped).
    pub fn to_record(&self) -> ItemRecord {
        ItemRecord {
            name: self.name.clone(),
            tags: self.tags.clone(),
            display: self.display.clone(),
            properties: self.properties.clone(),
        }
    }

    /// Whether the item carries `tag`.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Numeric property value; absent properties read as zero.
    pub fn property(&self, name: &str) -> f64 {
        self.properties.get(name).copied().unwrap_or(0.0)
    }

    /// Whether the item is tagged as a root or natural feature. Items with
    /// no producing recipe are roots too; ask the registry for that.
    pub fn tagged_root(&self) -> bool {
        self.has_tag(TAG_ROOT) || self.has_tag(TAG_NATURAL)
    }

    /// Whether the item blocks movement.
    pub fn is_blocking(&self) -> bool {
        self.has_tag(TAG_BLOCKING)
    }
}

/// A live instance of an item in the world or in a person's hands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemState {
    /// Which item this is an instance of.
    pub item: ItemId,
    /// Durability, fill level, or any other per-instance scalar.
    pub value: f64,
    /// Tick of the last transformation.
    pub time: u64,
    /// Container contents. Stored but not interpreted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inside: Option<Vec<ItemState>>,
}

impl ItemState {
    /// A fresh instance with zero value, transformed at tick 0.
    pub const fn new(item: ItemId) -> Self {
        Self {
            item,
            value: 0.0,
            time: 0,
            inside: None,
        }
    }

    /// A fresh instance stamped with the tick it was created at.
    pub const fn created_at(item: ItemId, now: u64) -> Self {
        Self {
            item,
            value: 0.0,
            time: now,
            inside: None,
        }
    }

    /// Copy of this instance carrying over value and timestamp but not
    /// container contents.
    pub const fn successor(&self) -> Self {
        Self {
            item: self.item,
            value: self.value,
            time: self.time,
            inside: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_property_reads_zero() {
        let item = Item::sentinel();
        assert!(item.property("heat").abs() < f64::EPSILON);
    }

    #[test]
    fn root_tags() {
        let mut item = Item::sentinel();
        assert!(!item.tagged_root());
        item.tags.push(String::from("natural"));
        assert!(item.tagged_root());
    }

    #[test]
    fn successor_drops_contents() {
        let mut state = ItemState::created_at(ItemId(2), 10);
        state.value = 3.0;
        state.inside = Some(vec![ItemState::new(ItemId(1))]);
        let next = state.successor();
        assert_eq!(next.item, ItemId(2));
        assert_eq!(next.time, 10);
        assert!(next.inside.is_none());
    }
}

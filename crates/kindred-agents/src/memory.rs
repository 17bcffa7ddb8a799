//! Timestamped memories and their maintenance.
//!
//! Memories are kept in insertion order; lookups return the first match.
//! They expire after a fixed time-to-live and are also invalidated
//! opportunistically whenever the remembered subject is inside the
//! perception window and observed to be gone.
//!
//! Two windows are in play: remembered *things* are checked within the
//! full perception radius, remembered *person* locations within the smaller
//! person-prune radius. A person who moves away right at the edge can
//! therefore be forgotten a tick early or late.

use serde::{Deserialize, Serialize};

use kindred_content::{Item, Registry, matches};
use kindred_types::{Conditions, ItemId, PersonId};
use kindred_world::World;

use crate::view::PersonView;

/// Tags whose items are always remembered when seen.
pub const NOTABLE_TAGS: [&str; 5] = ["important", "foodSource", "heatSource", "healing", "edible"];

/// What a memory is about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Noun {
    /// Another person.
    Person(PersonId),
    /// A spot on the grid.
    Place {
        /// Column.
        x: i64,
        /// Row.
        y: i64,
    },
    /// Something matching a descriptor.
    Thing(Conditions),
}

impl Noun {
    /// A thing identified by its item id.
    pub fn item(id: ItemId) -> Self {
        Self::Thing(Conditions::is(id))
    }

    fn descriptor(&self) -> Option<&Conditions> {
        match self {
            Self::Thing(descriptor) => Some(descriptor),
            Self::Person(_) | Self::Place { .. } => None,
        }
    }
}

/// The content of a memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MemoryKind {
    /// The noun was seen at a position.
    Location {
        /// What was seen.
        noun: Noun,
        /// Column.
        x: i64,
        /// Row.
        y: i64,
    },
    /// The noun exists.
    Exists {
        /// What exists.
        noun: Noun,
    },
}

/// One timestamped memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    /// The content.
    pub kind: MemoryKind,
    /// Tick it was formed.
    pub time: u64,
}

impl Memory {
    /// `noun` was seen at `(x, y)`.
    pub const fn location(noun: Noun, x: i64, y: i64, now: u64) -> Self {
        Self {
            kind: MemoryKind::Location { noun, x, y },
            time: now,
        }
    }

    /// `noun` exists.
    pub const fn exists(noun: Noun, now: u64) -> Self {
        Self {
            kind: MemoryKind::Exists { noun },
            time: now,
        }
    }

    /// Descriptor and position of a thing-location memory.
    fn thing_location(&self) -> Option<(&Conditions, i64, i64)> {
        match &self.kind {
            MemoryKind::Location { noun, x, y } => noun.descriptor().map(|d| (d, *x, *y)),
            MemoryKind::Exists { .. } => None,
        }
    }

    /// Person and position of a person-location memory.
    fn person_location(&self) -> Option<(PersonId, i64, i64)> {
        match &self.kind {
            MemoryKind::Location {
                noun: Noun::Person(id),
                x,
                y,
            } => Some((*id, *x, *y)),
            _ => None,
        }
    }

    fn exists_person(&self) -> Option<PersonId> {
        match &self.kind {
            MemoryKind::Exists {
                noun: Noun::Person(id),
            } => Some(*id),
            _ => None,
        }
    }
}

/// Whether `(x, y)` lies in the inclusive square of `radius` around the
/// centre.
const fn within(cx: i64, cy: i64, radius: i64, x: i64, y: i64) -> bool {
    x >= cx.saturating_sub(radius)
        && x <= cx.saturating_add(radius)
        && y >= cy.saturating_sub(radius)
        && y <= cy.saturating_add(radius)
}

/// A person's memories, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryBook {
    entries: Vec<Memory>,
}

impl MemoryBook {
    /// An empty book.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// All memories, oldest first.
    pub fn entries(&self) -> &[Memory] {
        &self.entries
    }

    /// Number of memories.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is remembered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add a memory.
    pub fn remember(&mut self, memory: Memory) {
        self.entries.push(memory);
    }

    /// Forget everything at least `ttl` ticks old.
    pub fn forget_expired(&mut self, now: u64, ttl: u64) {
        self.entries.retain(|m| now.saturating_sub(m.time) < ttl);
    }

    /// Refresh what is known about a person seen this tick: replace the
    /// existence and location memories about them. Nothing is recorded
    /// about oneself.
    pub fn observe_person(&mut self, person: &PersonView, me: PersonId, now: u64) {
        self.entries.retain(|m| m.exists_person() != Some(person.id));
        if person.id != me {
            self.remember(Memory::exists(Noun::Person(person.id), now));
        }
        self.entries
            .retain(|m| m.person_location().is_none_or(|(id, _, _)| id != person.id));
        if person.id != me {
            self.remember(Memory::location(
                Noun::Person(person.id),
                person.x,
                person.y,
                now,
            ));
        }
    }

    /// Drop thing-location memories inside the window whose cell is now
    /// empty or holds something that no longer matches.
    pub fn prune_missing_things(&mut self, world: &World, x: i64, y: i64, radius: i64) {
        let registry = world.registry();
        self.entries.retain(|m| {
            let Some((descriptor, mx, my)) = m.thing_location() else {
                return true;
            };
            if !within(x, y, radius, mx, my) {
                return true;
            }
            world
                .get(mx, my)
                .is_some_and(|state| matches(registry.item_of(state), descriptor))
        });
    }

    /// Drop person-location memories inside the window when nobody else
    /// stands at the remembered spot.
    pub fn prune_moved_people(
        &mut self,
        people: &[PersonView],
        me: PersonId,
        x: i64,
        y: i64,
        radius: i64,
    ) {
        self.entries.retain(|m| {
            let Some((_, mx, my)) = m.person_location() else {
                return true;
            };
            if !within(x, y, radius, mx, my) {
                return true;
            }
            people
                .iter()
                .find(|p| p.is_at(mx, my))
                .is_some_and(|p| p.id != me)
        });
    }

    /// Record where a notable item was seen, replacing any location memory
    /// that names the same item id.
    pub fn remember_notable(&mut self, item: ItemId, x: i64, y: i64, now: u64) {
        self.entries.retain(|m| {
            m.thing_location()
                .is_none_or(|(descriptor, _, _)| !descriptor.names_item(item))
        });
        self.remember(Memory::location(Noun::item(item), x, y, now));
    }

    /// Every item id matched by some remembered thing location, in
    /// first-seen order.
    pub fn known_items(&self, registry: &Registry) -> Vec<ItemId> {
        let mut known = Vec::new();
        for (descriptor, _, _) in self.entries.iter().filter_map(Memory::thing_location) {
            for id in registry.query(descriptor) {
                if !known.contains(&id) {
                    known.push(id);
                }
            }
        }
        known
    }

    /// First remembered position of a thing whose descriptor matches `item`.
    pub fn location_of(&self, item: &Item) -> Option<(i64, i64)> {
        self.entries
            .iter()
            .filter_map(Memory::thing_location)
            .find(|(descriptor, _, _)| matches(item, descriptor))
            .map(|(_, x, y)| (x, y))
    }

    /// First remembered position whose thing (represented by the first item
    /// its descriptor names) matches `descriptor`.
    pub fn where_is(&self, descriptor: &Conditions, registry: &Registry) -> Option<(i64, i64)> {
        self.entries
            .iter()
            .filter_map(Memory::thing_location)
            .find(|(remembered, _, _)| {
                matches(registry.item(registry.first_match(remembered)), descriptor)
            })
            .map(|(_, x, y)| (x, y))
    }

    /// Whether the person is known to exist.
    pub fn knows_person(&self, id: PersonId) -> bool {
        self.entries.iter().any(|m| m.exists_person() == Some(id))
    }
}

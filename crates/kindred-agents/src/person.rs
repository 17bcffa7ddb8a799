//! Person state, identity, and display.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use kindred_content::{ItemState, Registry};
use kindred_types::{Action, ItemDisplay, ItemId, PersonId};

use crate::memory::MemoryBook;
use crate::needs::Needs;
use crate::objective::{Objective, ObjectiveId, ObjectiveStack};
use crate::view::PersonView;

/// Display glyph of a person with a trait below one half.
pub const GLYPH_LOW_TRAIT: u32 = 11;
/// Display glyph of a person with a trait above one half.
pub const GLYPH_HIGH_TRAIT: u32 = 12;

/// Scratch state tied to the current leaf objective. Cleared whenever an
/// objective is pushed or completed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scratch {
    /// Pending destination.
    pub goto: Option<(i64, i64)>,
    /// Set after deciding to put the held item down; suppresses
    /// "found it" checks so the dropped item is not picked right back up.
    pub just_dropped: bool,
    /// Positions exploration already started from.
    pub searched: Vec<(i64, i64)>,
}

impl Scratch {
    /// Forget everything.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// One simulated person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    /// Identity.
    pub id: PersonId,
    /// Given name.
    pub name: String,
    /// Family name shared with the group.
    pub surname: String,
    /// Tick of birth.
    pub born: u64,
    /// Column.
    pub x: i64,
    /// Row.
    pub y: i64,
    /// Fixed trait in `[0, 1)`.
    pub gender: f64,
    /// Where the group started out.
    pub home: Option<(i64, i64)>,

    /// Health, 0 to 100.
    pub health: f64,
    /// Satiation, 0 to 100.
    pub hunger: f64,
    /// Body temperature.
    pub temperature: f64,
    /// Accumulated well-being.
    pub score: f64,

    /// Opinion of other persons.
    pub reputations: BTreeMap<PersonId, f64>,
    /// Need pressures of the current tick.
    pub needs: Needs,
    /// Memories.
    pub memory: MemoryBook,
    /// Goals, root first.
    pub objectives: ObjectiveStack,
    /// Scratch state of the current leaf objective.
    pub scratch: Scratch,
    /// How often each root item has been seen.
    pub common: BTreeMap<ItemId, u32>,
    /// The item in hand.
    pub holding: Option<ItemState>,
    /// The action chosen for this tick.
    pub next_action: Action,
}

impl Person {
    /// A new person at full health and fully fed.
    pub fn new(name: String, surname: String, born: u64, (x, y): (i64, i64), gender: f64) -> Self {
        Self {
            id: PersonId::new(),
            name,
            surname,
            born,
            x,
            y,
            gender,
            home: None,
            health: 100.0,
            hunger: 100.0,
            temperature: 0.0,
            score: 0.0,
            reputations: BTreeMap::new(),
            needs: Needs::default(),
            memory: MemoryBook::new(),
            objectives: ObjectiveStack::new(),
            scratch: Scratch::default(),
            common: BTreeMap::new(),
            holding: None,
            next_action: Action::Nothing,
        }
    }

    /// Given name and surname.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }

    /// Trait below one half.
    pub fn is_male(&self) -> bool {
        self.gender < 0.5
    }

    /// Trait above one half.
    pub fn is_female(&self) -> bool {
        self.gender > 0.5
    }

    /// Palette index derived from the surname, shared by a family.
    pub fn color(&self) -> u32 {
        hash_name(&self.surname).unsigned_abs() & 63
    }

    /// Palette index derived from the given name.
    pub fn alt_color(&self) -> u32 {
        hash_name(&self.name).unsigned_abs() & 63
    }

    /// The person's glyph followed by the glyphs of the held item.
    pub fn glyphs(&self, registry: &Registry) -> Vec<ItemDisplay> {
        let own = ItemDisplay {
            character: if self.is_male() {
                GLYPH_LOW_TRAIT
            } else {
                GLYPH_HIGH_TRAIT
            },
            color: self.color(),
        };
        let held = self
            .holding
            .as_ref()
            .map(|state| registry.item_of(state).display.clone())
            .unwrap_or_default();
        std::iter::once(own).chain(held).collect()
    }

    /// Tick-start snapshot.
    pub const fn view(&self) -> PersonView {
        PersonView {
            id: self.id,
            x: self.x,
            y: self.y,
        }
    }

    /// The action chosen by the last [`think`](Self::think).
    pub const fn act(&self) -> Action {
        self.next_action
    }

    /// Id of the item in hand.
    pub fn held_item(&self) -> Option<ItemId> {
        self.holding.as_ref().map(|state| state.item)
    }

    // -------------------------------------------------------------------
    // Objective bookkeeping
    // -------------------------------------------------------------------

    /// Push a new leaf objective and clear scratch state.
    pub fn push_objective(&mut self, objective: Objective, parent: Option<ObjectiveId>) -> ObjectiveId {
        debug!(person = %self.full_name(), ?objective, "Objective pushed");
        let id = self.objectives.push(objective, parent);
        self.scratch.reset();
        id
    }

    /// The leaf is satisfied: pop it and clear scratch state.
    pub fn complete_objective(&mut self) {
        if let Some(done) = self.objectives.complete_leaf() {
            debug!(person = %self.full_name(), objective = ?done, "Objective completed");
        }
        self.scratch.reset();
    }

    /// A non-leaf objective was satisfied by something seen: drop it with
    /// its whole sub-tree and abandon the pending destination.
    pub fn complete_alternative(&mut self, id: ObjectiveId) {
        self.scratch.goto = None;
        match self.objectives.complete_branch(id) {
            Ok(removed) => {
                debug!(person = %self.full_name(), removed = removed.len(), "Objective completed opportunistically");
            }
            Err(error) => {
                debug!(person = %self.full_name(), %error, "Opportunistic completion skipped");
            }
        }
    }
}

/// Jenkins-style one-at-a-time string hash over UTF-16 code units.
fn hash_name(name: &str) -> i32 {
    let mut hash: i32 = 0;
    for unit in name.encode_utf16() {
        hash = hash.wrapping_add(i32::from(unit));
        hash = hash.wrapping_add(hash.wrapping_shl(10));
        hash ^= hash.wrapping_shr(6);
        hash = hash.wrapping_add(hash.wrapping_shl(3));
    }
    hash
}

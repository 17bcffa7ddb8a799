//! Content records: item and recipe definitions as they are loaded from and
//! written back to a content pack.
//!
//! The wire shapes are camelCase JSON. Condition and result payloads are
//! `{ "type": ..., "data": ... }` objects, modeled here as adjacently tagged
//! enums so each kind only carries the fields it needs. Operator strings are
//! kept verbatim when unrecognized so a pack survives a load/save round trip
//! unchanged.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ids::ItemId;

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

/// Numeric comparison operator used by property conditions and value gates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `>=`
    Ge,
    /// `<=`
    Le,
    /// Any other string. Comparisons with it are always false.
    Unrecognized(String),
}

impl From<String> for CompareOp {
    fn from(op: String) -> Self {
        match op.as_str() {
            "=" => Self::Eq,
            ">" => Self::Gt,
            "<" => Self::Lt,
            ">=" => Self::Ge,
            "<=" => Self::Le,
            _ => Self::Unrecognized(op),
        }
    }
}

impl From<CompareOp> for String {
    fn from(op: CompareOp) -> Self {
        match op {
            CompareOp::Eq => Self::from("="),
            CompareOp::Gt => Self::from(">"),
            CompareOp::Lt => Self::from("<"),
            CompareOp::Ge => Self::from(">="),
            CompareOp::Le => Self::from("<="),
            CompareOp::Unrecognized(other) => other,
        }
    }
}

/// Arithmetic applied to an instance value when a recipe mutates an item
/// in place.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ArithmeticOp {
    /// `=` replaces the value.
    Set,
    /// `+` adds to the value.
    Add,
    /// `-` subtracts from the value.
    Sub,
    /// Any other string. Leaves the value unchanged.
    Unrecognized(String),
}

impl From<String> for ArithmeticOp {
    fn from(op: String) -> Self {
        match op.as_str() {
            "=" => Self::Set,
            "+" => Self::Add,
            "-" => Self::Sub,
            _ => Self::Unrecognized(op),
        }
    }
}

impl From<ArithmeticOp> for String {
    fn from(op: ArithmeticOp) -> Self {
        match op {
            ArithmeticOp::Set => Self::from("="),
            ArithmeticOp::Add => Self::from("+"),
            ArithmeticOp::Sub => Self::from("-"),
            ArithmeticOp::Unrecognized(other) => other,
        }
    }
}

// ---------------------------------------------------------------------------
// Conditions
// ---------------------------------------------------------------------------

/// A gate on an instance's numeric value (`value <op> ref`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueGate {
    /// Comparison operator.
    pub op: CompareOp,
    /// Reference value.
    #[serde(rename = "ref")]
    pub reference: f64,
}

/// Compare a named item property against a reference value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyComparison {
    /// Property name. Absent properties read as zero.
    pub property: String,
    /// Comparison operator.
    pub op: CompareOp,
    /// Reference value.
    #[serde(rename = "ref")]
    pub reference: f64,
}

/// One atomic predicate over an item definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ItemCondition {
    /// Never matches. Written as an empty type string.
    #[serde(rename = "")]
    Nothing,
    /// Matches every item.
    All,
    /// Item id equals.
    Is(ItemId),
    /// Item id differs.
    IsNot(ItemId),
    /// Item carries the tag.
    WithTag(String),
    /// Item does not carry the tag.
    WithoutTag(String),
    /// Property comparison holds.
    PropertyIs(PropertyComparison),
    /// Property comparison does not hold.
    PropertyIsNot(PropertyComparison),
}

/// A conjunction of [`ItemCondition`]s, used both as a recipe filter and as
/// a search descriptor ("a thing matching these predicates").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conditions {
    /// The predicates, all of which must hold.
    pub conditions: Vec<ItemCondition>,
}

impl Conditions {
    /// Descriptor for exactly one item id.
    pub fn is(id: ItemId) -> Self {
        Self {
            conditions: vec![ItemCondition::Is(id)],
        }
    }

    /// Descriptor matching every item.
    pub fn all() -> Self {
        Self {
            conditions: vec![ItemCondition::All],
        }
    }

    /// Descriptor matching items with the given tag.
    pub fn with_tag(tag: &str) -> Self {
        Self {
            conditions: vec![ItemCondition::WithTag(String::from(tag))],
        }
    }

    /// Whether any predicate is `Is(id)`.
    pub fn names_item(&self, id: ItemId) -> bool {
        self.conditions
            .iter()
            .any(|c| matches!(c, ItemCondition::Is(other) if *other == id))
    }
}

// ---------------------------------------------------------------------------
// Recipe outcomes
// ---------------------------------------------------------------------------

/// Value arithmetic applied by [`RecipeResult::SameItem`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueChange {
    /// Operation.
    pub op: ArithmeticOp,
    /// Operand.
    #[serde(rename = "ref")]
    pub reference: f64,
}

/// What happens to one participating instance when a recipe fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum RecipeResult {
    /// The instance is consumed. Written as an empty type string.
    #[serde(rename = "")]
    Nothing,
    /// The instance survives, optionally with its value changed.
    SameItem(Option<ValueChange>),
    /// The instance is replaced by a fresh instance of another item.
    NewItem(ItemId),
}

impl RecipeResult {
    /// The item id spawned by a notable (new-item) result.
    pub const fn new_item(&self) -> Option<ItemId> {
        match self {
            Self::NewItem(id) => Some(*id),
            _ => None,
        }
    }

    /// Whether the instance is mutated in place.
    pub const fn is_same_item(&self) -> bool {
        matches!(self, Self::SameItem(_))
    }
}

/// One weighted outcome of a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeOutcome {
    /// Transformation of the origin instance.
    pub origin: RecipeResult,
    /// Transformation of the actor instance, when the recipe has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<RecipeResult>,
    /// Relative weight. Missing weights count as 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chance: Option<f64>,
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One display glyph of an item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemDisplay {
    /// Glyph index.
    pub character: u32,
    /// Palette index.
    pub color: u32,
}

/// An item definition as stored in a content pack. The id is implied by
/// position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    /// Display name.
    pub name: String,
    /// Tags such as `root`, `edible`, `blocking`.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Ordered display glyphs.
    #[serde(default)]
    pub display: Vec<ItemDisplay>,
    /// Numeric properties such as `food`, `heal`, `heat`.
    #[serde(default)]
    pub properties: BTreeMap<String, f64>,
}

/// A recipe definition as stored in a content pack.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeRecord {
    /// What the origin item must match.
    pub origin: Conditions,
    /// Gate on the origin instance's value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_value: Option<ValueGate>,
    /// Minimum ticks since the origin's last transformation. Zero or absent
    /// means no gate and an instantaneous recipe.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<u64>,
    /// What the co-located actor item must match, if one is required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<Conditions>,
    /// Gate on the actor instance's value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_value: Option<ValueGate>,
    /// Weighted outcomes.
    #[serde(default)]
    pub results: Vec<RecipeOutcome>,
}

/// A complete set of content: items (without the sentinel) and recipes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentPack {
    /// Item definitions; the first one receives id 1.
    #[serde(default)]
    pub items: Vec<ItemRecord>,
    /// Recipe definitions; the first one receives id 0.
    #[serde(default)]
    pub recipes: Vec<RecipeRecord>,
}

impl ContentPack {
    /// Parse a pack from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the pack as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

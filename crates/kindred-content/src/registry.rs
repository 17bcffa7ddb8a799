//! The registry: every item and recipe plus the indices derived from them.
//!
//! A [`Registry`] is built once from a [`ContentPack`] and shared read-only
//! (behind an `Arc`) by the world and every person. [`Registry::refresh`]
//! rebuilds all derived state from the records and may be called whenever
//! content changes.
//!
//! # Derived state
//!
//! - `uses[item]` -- recipes in which the item can take part (as origin or
//!   actor).
//! - `results[item]` -- recipes with a new-item outcome spawning the item.
//!   In-place mutations are not counted.
//! - `depth[item]` -- crafting tier, computed by fixpoint iteration. Roots
//!   sit at depth 0. A non-root item is assigned once every item required by
//!   at least one of its producing recipes already has a depth. Items caught
//!   in a cycle with no fully resolved producer never get one and report 0.

use std::collections::{BTreeMap, BTreeSet};

use kindred_types::{
    Conditions, ContentPack, ItemCondition, ItemId, RecipeId, RecipeRecord, RecipeResult,
};
use tracing::debug;

use crate::condition::matches;
use crate::error::ContentError;
use crate::item::{Item, ItemState};
use crate::recipe::Recipe;

/// Items, recipes, and derived indices.
#[derive(Debug, Clone)]
pub struct Registry {
    /// Item definitions; position 0 is the sentinel.
    items: Vec<Item>,
    /// Recipe definitions.
    recipes: Vec<Recipe>,
    /// Returned for out-of-range item lookups.
    sentinel: Item,
    /// Per recipe: every item id matching its origin condition.
    origins: Vec<Vec<ItemId>>,
    /// Per recipe: every item id matching its actor condition (empty when
    /// the recipe has no actor).
    actors: Vec<Vec<ItemId>>,
    /// Item -> recipes it takes part in.
    uses: BTreeMap<ItemId, Vec<RecipeId>>,
    /// Item -> recipes notably producing it.
    results: BTreeMap<ItemId, Vec<RecipeId>>,
    /// Item -> crafting depth, for resolved items only.
    depths: BTreeMap<ItemId, u32>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// An empty registry holding only the sentinel item.
    pub fn new() -> Self {
        let mut registry = Self {
            items: vec![Item::sentinel()],
            recipes: Vec::new(),
            sentinel: Item::sentinel(),
            origins: Vec::new(),
            actors: Vec::new(),
            uses: BTreeMap::new(),
            results: BTreeMap::new(),
            depths: BTreeMap::new(),
        };
        registry.refresh();
        registry
    }

    /// Build a registry from a content pack: inject the sentinel at id 0,
    /// validate references, and compute all derived state.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::DanglingItem`] when a recipe names an item id
    /// that does not exist, [`ContentError::EmptyResults`] when a recipe
    /// has no outcome, or [`ContentError::TooMany`] when ids would overflow.
    pub fn from_pack(pack: ContentPack) -> Result<Self, ContentError> {
        let item_count = pack.items.len().saturating_add(1);
        if u32::try_from(item_count).is_err() {
            return Err(ContentError::TooMany {
                kind: "item",
                count: pack.items.len(),
            });
        }
        if u32::try_from(pack.recipes.len()).is_err() {
            return Err(ContentError::TooMany {
                kind: "recipe",
                count: pack.recipes.len(),
            });
        }

        let mut items = Vec::with_capacity(item_count);
        items.push(Item::sentinel());
        for (position, record) in (1_u32..).zip(pack.items) {
            items.push(Item::from_record(ItemId(position), record));
        }

        let mut recipes = Vec::with_capacity(pack.recipes.len());
        for (position, record) in (0_u32..).zip(pack.recipes) {
            let id = RecipeId(position);
            validate_recipe(id, &record, items.len())?;
            recipes.push(Recipe::from_record(id, record));
        }

        let mut registry = Self {
            items,
            recipes,
            ..Self::new()
        };
        registry.refresh();
        Ok(registry)
    }

    /// Parse a JSON content pack and build a registry from it.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Parse`] for malformed JSON, or any error of
    /// [`Registry::from_pack`].
    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        Self::from_pack(ContentPack::from_json(json)?)
    }

    /// Re-emit the content as records. The sentinel and all ids are
    /// omitted; loading the pack again reproduces an equivalent registry.
    pub fn to_pack(&self) -> ContentPack {
        ContentPack {
            items: self.items.iter().skip(1).map(Item::to_record).collect(),
            recipes: self.recipes.iter().map(Recipe::to_record).collect(),
        }
    }

    /// Rebuild every derived index and the depth map from the records.
    /// Idempotent.
    pub fn refresh(&mut self) {
        let origins: Vec<Vec<ItemId>> = self
            .recipes
            .iter()
            .map(|recipe| self.query(&recipe.origin))
            .collect();
        let actors: Vec<Vec<ItemId>> = self
            .recipes
            .iter()
            .map(|recipe| {
                recipe
                    .actor
                    .as_ref()
                    .map(|actor| self.query(actor))
                    .unwrap_or_default()
            })
            .collect();

        let mut uses: BTreeMap<ItemId, Vec<RecipeId>> = BTreeMap::new();
        let mut results: BTreeMap<ItemId, Vec<RecipeId>> = BTreeMap::new();
        for (recipe, (origin_ids, actor_ids)) in
            self.recipes.iter().zip(origins.iter().zip(actors.iter()))
        {
            for id in origin_ids.iter().chain(actor_ids) {
                let entry = uses.entry(*id).or_default();
                if !entry.contains(&recipe.id) {
                    entry.push(recipe.id);
                }
            }
            for id in recipe.notable_results() {
                let entry = results.entry(id).or_default();
                if !entry.contains(&recipe.id) {
                    entry.push(recipe.id);
                }
            }
        }

        let depths = compute_depths(&self.items, &results, &origins, &actors);
        debug!(
            items = self.items.len(),
            recipes = self.recipes.len(),
            resolved_depths = depths.len(),
            "Registry refreshed"
        );

        self.origins = origins;
        self.actors = actors;
        self.uses = uses;
        self.results = results;
        self.depths = depths;
    }

    // -------------------------------------------------------------------
    // Lookups
    // -------------------------------------------------------------------

    /// All items, sentinel first.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// All recipes.
    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    /// Number of items including the sentinel.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Item by id; unknown ids return the sentinel.
    pub fn item(&self, id: ItemId) -> &Item {
        self.items.get(id.index()).unwrap_or(&self.sentinel)
    }

    /// Item definition of an instance.
    pub fn item_of(&self, state: &ItemState) -> &Item {
        self.item(state.item)
    }

    /// Recipe by id. Callers must handle `None`.
    pub fn recipe(&self, id: RecipeId) -> Option<&Recipe> {
        self.recipes.get(id.index())
    }

    /// First item with the given name.
    pub fn item_by_name(&self, name: &str) -> Option<&Item> {
        self.items.iter().skip(1).find(|item| item.name == name)
    }

    /// Ids of every item matching `conditions`, ascending. The sentinel is
    /// included when it matches.
    pub fn query(&self, conditions: &Conditions) -> Vec<ItemId> {
        self.items
            .iter()
            .filter(|item| matches(item, conditions))
            .map(|item| item.id)
            .collect()
    }

    /// First item id matching `conditions`, or the sentinel.
    pub fn first_match(&self, conditions: &Conditions) -> ItemId {
        self.items
            .iter()
            .find(|item| matches(item, conditions))
            .map_or(ItemId::NONE, |item| item.id)
    }

    // -------------------------------------------------------------------
    // Derived item facts
    // -------------------------------------------------------------------

    /// Recipes the item can take part in.
    pub fn used_in(&self, id: ItemId) -> Vec<&Recipe> {
        self.recipes_for(self.uses.get(&id))
    }

    /// Recipes that notably produce the item.
    pub fn resulted_by(&self, id: ItemId) -> Vec<&Recipe> {
        self.recipes_for(self.results.get(&id))
    }

    fn recipes_for(&self, ids: Option<&Vec<RecipeId>>) -> Vec<&Recipe> {
        ids.map(|ids| ids.iter().filter_map(|id| self.recipe(*id)).collect())
            .unwrap_or_default()
    }

    /// Whether any consuming recipe has a duration: the item "works" on its
    /// own over time.
    pub fn is_active(&self, id: ItemId) -> bool {
        self.used_in(id).iter().any(|recipe| recipe.has_duration())
    }

    /// Whether the item is a gathering terminal: tagged root/natural, or
    /// produced by no recipe.
    pub fn is_root(&self, id: ItemId) -> bool {
        is_root(self.item(id), &self.results)
    }

    /// Crafting depth, or 0 for items the fixpoint never resolved.
    pub fn depth(&self, id: ItemId) -> u32 {
        self.resolved_depth(id).unwrap_or(0)
    }

    /// Crafting depth if the fixpoint resolved one.
    pub fn resolved_depth(&self, id: ItemId) -> Option<u32> {
        self.depths.get(&id).copied()
    }

    // -------------------------------------------------------------------
    // Recipe participants
    // -------------------------------------------------------------------

    /// Every item id matching the recipe's origin condition.
    pub fn origins(&self, recipe: RecipeId) -> &[ItemId] {
        self.origins.get(recipe.index()).map_or(&[][..], Vec::as_slice)
    }

    /// Every item id matching the recipe's actor condition.
    pub fn actors(&self, recipe: RecipeId) -> &[ItemId] {
        self.actors.get(recipe.index()).map_or(&[][..], Vec::as_slice)
    }

    /// All items the recipe requires: origins followed by actors.
    pub fn used(&self, recipe: RecipeId) -> Vec<ItemId> {
        self.origins(recipe)
            .iter()
            .chain(self.actors(recipe))
            .copied()
            .collect()
    }

    /// One representative origin item, or the sentinel.
    pub fn an_origin(&self, recipe: RecipeId) -> ItemId {
        self.origins(recipe).first().copied().unwrap_or(ItemId::NONE)
    }

    /// One representative actor item, or the sentinel when the recipe has
    /// no actor.
    pub fn an_actor(&self, recipe: RecipeId) -> ItemId {
        let declares_actor = self.recipe(recipe).is_some_and(|r| r.actor.is_some());
        if declares_actor {
            self.actors(recipe).first().copied().unwrap_or(ItemId::NONE)
        } else {
            ItemId::NONE
        }
    }

    /// The representative origin and actor, skipping sentinels.
    pub fn simple_used(&self, recipe: RecipeId) -> Vec<ItemId> {
        [self.an_origin(recipe), self.an_actor(recipe)]
            .into_iter()
            .filter(|id| !id.is_none())
            .collect()
    }

    /// Whether the recipe fires for these instances at tick `now`.
    pub fn will_occur(
        &self,
        recipe: &Recipe,
        origin: &ItemState,
        actor: Option<&ItemState>,
        now: u64,
    ) -> bool {
        recipe.will_occur(
            self.item_of(origin),
            origin,
            actor.map(|state| (self.item_of(state), state)),
            now,
        )
    }

    // -------------------------------------------------------------------
    // Cost heuristics
    // -------------------------------------------------------------------

    /// Estimated number of gathered items needed before holding `id`.
    ///
    /// Zero if the item is in `have` or was already counted in this walk;
    /// one for a root; otherwise the sum over *every* producing recipe of
    /// the sum over every item it uses. The sum over all producers (rather
    /// than the cheapest) is intentional and balances the food scoring.
    pub fn required(&self, id: ItemId, have: &[ItemId], seen: &mut BTreeSet<ItemId>) -> u64 {
        if have.contains(&id) || !seen.insert(id) {
            return 0;
        }
        if self.is_root(id) {
            return 1;
        }
        let mut total: u64 = 0;
        for recipe in self.results.get(&id).into_iter().flatten() {
            for used in self.used(*recipe) {
                total = total.saturating_add(self.required(used, have, seen));
            }
        }
        total
    }

    /// Whether `candidate` lies on a crafting path toward `target`: it is
    /// the target itself, or some recipe producing it has a representative
    /// origin or actor that does.
    pub fn is_needed_to_make(&self, candidate: ItemId, target: ItemId) -> bool {
        self.is_needed_to_make_inner(candidate, target, &mut BTreeSet::new())
    }

    fn is_needed_to_make_inner(
        &self,
        candidate: ItemId,
        target: ItemId,
        visited: &mut BTreeSet<ItemId>,
    ) -> bool {
        if candidate == target {
            return true;
        }
        if self.is_root(candidate) || !visited.insert(candidate) {
            return false;
        }
        self.results
            .get(&candidate)
            .into_iter()
            .flatten()
            .any(|recipe| {
                let declares_actor = self.recipe(*recipe).is_some_and(|r| r.actor.is_some());
                self.is_needed_to_make_inner(self.an_origin(*recipe), target, visited)
                    || (declares_actor
                        && self.is_needed_to_make_inner(self.an_actor(*recipe), target, visited))
            })
    }

    /// Root items reachable down the crafting graph from `id` (the item
    /// itself when it is a root). Used to weigh how common an item's raw
    /// materials are.
    pub fn resources(&self, id: ItemId) -> Vec<ItemId> {
        let mut out = Vec::new();
        let mut visited = BTreeSet::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            if self.is_root(current) {
                if !current.is_none() {
                    out.push(current);
                }
                continue;
            }
            for recipe in self.results.get(&current).into_iter().flatten() {
                stack.extend(self.used(*recipe));
            }
        }
        out.sort_unstable();
        out
    }
}

fn is_root(item: &Item, results: &BTreeMap<ItemId, Vec<RecipeId>>) -> bool {
    item.tagged_root() || results.get(&item.id).is_none_or(Vec::is_empty)
}

/// Fixpoint depth assignment over the recipe hyper-graph.
fn compute_depths(
    items: &[Item],
    results: &BTreeMap<ItemId, Vec<RecipeId>>,
    origins: &[Vec<ItemId>],
    actors: &[Vec<ItemId>],
) -> BTreeMap<ItemId, u32> {
    let mut depths: BTreeMap<ItemId, u32> = items
        .iter()
        .filter(|item| is_root(item, results))
        .map(|item| (item.id, 0))
        .collect();

    let mut changed = true;
    while changed {
        changed = false;
        for item in items {
            if depths.contains_key(&item.id) {
                continue;
            }
            let mut deepest: Option<u32> = None;
            for recipe in results.get(&item.id).into_iter().flatten() {
                let origin_ids = origins.get(recipe.index()).map_or(&[][..], Vec::as_slice);
                let actor_ids = actors.get(recipe.index()).map_or(&[][..], Vec::as_slice);
                let used = origin_ids.iter().chain(actor_ids);
                if !used.clone().all(|id| depths.contains_key(id)) {
                    continue;
                }
                let recipe_max = used.filter_map(|id| depths.get(id)).max().copied().unwrap_or(0);
                deepest = Some(deepest.map_or(recipe_max, |d| d.max(recipe_max)));
            }
            if let Some(deepest) = deepest {
                depths.insert(item.id, deepest.saturating_add(1));
                changed = true;
            }
        }
    }
    depths
}

/// Reject recipes referring to item ids outside the pack.
fn validate_recipe(
    id: RecipeId,
    record: &RecipeRecord,
    item_count: usize,
) -> Result<(), ContentError> {
    if record.results.is_empty() {
        return Err(ContentError::EmptyResults(id));
    }
    let in_range = |item: ItemId| item.index() < item_count;
    let conditions = record
        .origin
        .conditions
        .iter()
        .chain(record.actor.iter().flat_map(|a| a.conditions.iter()));
    for condition in conditions {
        match condition {
            ItemCondition::Is(item) | ItemCondition::IsNot(item) if !in_range(*item) => {
                return Err(ContentError::DanglingItem { recipe: id, item: *item });
            }
            _ => {}
        }
    }
    let spawned = record.results.iter().flat_map(|outcome| {
        [Some(&outcome.origin), outcome.actor.as_ref()]
            .into_iter()
            .flatten()
            .filter_map(RecipeResult::new_item)
    });
    for item in spawned {
        if !in_range(item) {
            return Err(ContentError::DanglingItem { recipe: id, item });
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use kindred_types::{ItemRecord, RecipeOutcome};

    use super::*;

    fn record(name: &str, tags: &[&str]) -> ItemRecord {
        ItemRecord {
            name: String::from(name),
            tags: tags.iter().map(|t| String::from(*t)).collect(),
            ..ItemRecord::default()
        }
    }

    fn make(origin: u32, actor: Option<u32>, result: u32) -> RecipeRecord {
        RecipeRecord {
            origin: Conditions::is(ItemId(origin)),
            actor: actor.map(|a| Conditions::is(ItemId(a))),
            results: vec![RecipeOutcome {
                origin: RecipeResult::NewItem(ItemId(result)),
                actor: None,
                chance: None,
            }],
            ..RecipeRecord::default()
        }
    }

    #[test]
    fn out_of_range_item_is_sentinel() {
        let registry = Registry::new();
        assert_eq!(registry.item(ItemId(99)).id, ItemId::NONE);
        assert!(registry.recipe(RecipeId(0)).is_none());
    }

    #[test]
    fn chain_depths() {
        // 1 wood -> 2 plank -> 3 table (with 4 nail as actor, root)
        let pack = ContentPack {
            items: vec![
                record("wood", &["root"]),
                record("plank", &[]),
                record("table", &[]),
                record("nail", &[]),
            ],
            recipes: vec![make(1, None, 2), make(2, Some(4), 3)],
        };
        let registry = Registry::from_pack(pack).unwrap();
        assert_eq!(registry.resolved_depth(ItemId(1)), Some(0));
        assert_eq!(registry.resolved_depth(ItemId(4)), Some(0));
        assert_eq!(registry.resolved_depth(ItemId(2)), Some(1));
        assert_eq!(registry.resolved_depth(ItemId(3)), Some(2));
    }

    #[test]
    fn cycle_without_resolved_producer_reports_zero() {
        // 1 <-> 2 produce each other, neither tagged root.
        let pack = ContentPack {
            items: vec![record("egg", &[]), record("hen", &[])],
            recipes: vec![make(1, None, 2), make(2, None, 1)],
        };
        let registry = Registry::from_pack(pack).unwrap();
        assert_eq!(registry.resolved_depth(ItemId(1)), None);
        assert_eq!(registry.resolved_depth(ItemId(2)), None);
        assert_eq!(registry.depth(ItemId(1)), 0);
        assert!(!registry.is_root(ItemId(1)));
    }

    #[test]
    fn dangling_reference_fails_fast() {
        let pack = ContentPack {
            items: vec![record("wood", &["root"])],
            recipes: vec![make(1, None, 7)],
        };
        assert!(matches!(
            Registry::from_pack(pack),
            Err(ContentError::DanglingItem { item: ItemId(7), .. })
        ));
    }

    #[test]
    fn empty_results_fail_fast() {
        let mut recipe = make(1, None, 1);
        recipe.results.clear();
        let pack = ContentPack {
            items: vec![record("wood", &["root"])],
            recipes: vec![recipe],
        };
        assert!(matches!(
            Registry::from_pack(pack),
            Err(ContentError::EmptyResults(RecipeId(0)))
        ));
    }

    #[test]
    fn refresh_is_idempotent() {
        let pack = ContentPack {
            items: vec![record("wood", &["root"]), record("stick", &[])],
            recipes: vec![make(1, None, 2)],
        };
        let mut registry = Registry::from_pack(pack).unwrap();
        let before = (registry.depths.clone(), registry.uses.clone(), registry.results.clone());
        registry.refresh();
        registry.refresh();
        assert_eq!(before, (registry.depths.clone(), registry.uses.clone(), registry.results.clone()));
    }

    #[test]
    fn required_sums_over_all_producers() {
        // 3 made either from 1 or from 2 (both roots): required = 2.
        let pack = ContentPack {
            items: vec![record("a", &["root"]), record("b", &["root"]), record("c", &[])],
            recipes: vec![make(1, None, 3), make(2, None, 3)],
        };
        let registry = Registry::from_pack(pack).unwrap();
        assert_eq!(registry.required(ItemId(3), &[], &mut BTreeSet::new()), 2);
        assert_eq!(registry.required(ItemId(3), &[ItemId(1)], &mut BTreeSet::new()), 1);
        assert_eq!(registry.required(ItemId(3), &[ItemId(3)], &mut BTreeSet::new()), 0);
    }

    #[test]
    fn resources_collect_roots() {
        let pack = ContentPack {
            items: vec![
                record("wood", &["root"]),
                record("plank", &[]),
                record("table", &[]),
                record("nail", &["root"]),
            ],
            recipes: vec![make(1, None, 2), make(2, Some(4), 3)],
        };
        let registry = Registry::from_pack(pack).unwrap();
        assert_eq!(registry.resources(ItemId(3)), vec![ItemId(1), ItemId(4)]);
        assert_eq!(registry.resources(ItemId(1)), vec![ItemId(1)]);
    }
}

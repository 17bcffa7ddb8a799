//! Perception and action selection.
//!
//! [`Person::think`] runs once per tick against a read-only snapshot:
//!
//! 1. Recompute needs from body state.
//! 2. Perceive: expire and invalidate memories, track visible persons,
//!    tally root items, complete non-leaf objectives satisfied by what is in
//!    view, and remember notable items.
//! 3. Re-root the objective stack when the dominant need changed; a hungry
//!    person occasionally drops its sub-objectives and replans.
//! 4. With a pending destination, take one greedy step toward it.
//!    Otherwise dispatch on the leaf objective (see [`Strategy`]).
//! 5. If nothing was chosen, sometimes wander.
//!
//! The chosen action is stored in `next_action`; nothing is applied here.

use std::collections::BTreeSet;
use std::f64::consts::E;

use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{debug, trace};

use kindred_content::{Item, Recipe, Registry, matches};
use kindred_types::{Action, Conditions, Direction, ItemId, Need};
use kindred_world::{LocalCell, World};

use crate::config::PlannerConfig;
use crate::memory::{Memory, NOTABLE_TAGS, Noun};
use crate::movement::{goto_no_blocking, move_randomly, neighborhood, step_toward};
use crate::needs::Needs;
use crate::objective::{Objective, ObjectiveId, Obtain};
use crate::person::Person;
use crate::view::PersonView;

/// Tag of items that restore health when eaten.
const TAG_HEALING: &str = "healing";
/// Tag of items that can be eaten.
const TAG_EDIBLE: &str = "edible";
/// Half-width of the region around a searched spot that exploration avoids.
const SEARCHED_RADIUS: i64 = 10;
/// Base half-width of an exploration jump.
const SEARCH_SPREAD: i64 = 10;
/// Half-width of the random spot picked after tending a fire.
const FIRE_WANDER: i64 = 5;

/// Everything a person reads while thinking. All of it reflects the state
/// at the start of the tick.
#[derive(Debug, Clone, Copy)]
pub struct Surroundings<'a> {
    /// The world.
    pub world: &'a World,
    /// Every person's tick-start position, the thinker included.
    pub people: &'a [PersonView],
    /// Current tick.
    pub now: u64,
    /// Planner tunables.
    pub config: &'a PlannerConfig,
}

impl Surroundings<'_> {
    fn registry(&self) -> &Registry {
        self.world.registry()
    }
}

/// What the leaf objective asks for this tick.
#[derive(Debug, Clone)]
enum Strategy {
    /// Eat something healing, or go get some.
    SeekHealing,
    /// Eat, or go get the best food.
    SeekFood,
    /// Stay warm by a fire and keep it fed.
    SeekWarmth,
    /// Acquire something matching a descriptor.
    Obtain(ObjectiveId, Obtain),
}

impl Strategy {
    fn for_leaf(person: &Person) -> Option<Self> {
        let id = person.objectives.leaf_id()?;
        Some(match person.objectives.leaf()? {
            Objective::FulfillNeed(Need::Health) => Self::SeekHealing,
            Objective::FulfillNeed(Need::Hunger) => Self::SeekFood,
            Objective::FulfillNeed(Need::Temperature | Need::Boredom) => Self::SeekWarmth,
            Objective::Obtain(obtain) => Self::Obtain(id, obtain.clone()),
        })
    }
}

/// `u64` count as `f64`, saturating at `u32::MAX`.
fn count(n: u64) -> f64 {
    f64::from(u32::try_from(n).unwrap_or(u32::MAX))
}

impl Person {
    /// Decide this tick's action.
    pub fn think(&mut self, env: &Surroundings<'_>, rng: &mut impl Rng) {
        self.needs = Needs::compute(self.health, self.hunger, self.temperature);

        let world = env.world;
        let local = world.local_world(self.x, self.y, env.config.perception_radius);
        self.perceive(env, &local);

        let focus = self.needs.dominant();
        self.focus_on(focus);
        if focus == Need::Hunger && rng.random::<f64>() < env.config.replan_chance {
            trace!(person = %self.full_name(), "Replanning from root");
            self.objectives.reset_to_root();
            self.scratch.reset();
        }

        self.next_action = Action::Nothing;
        if let Some(goto) = self.scratch.goto {
            self.navigate(env, goto, rng);
        } else if let Some(strategy) = Strategy::for_leaf(self) {
            match strategy {
                Strategy::SeekHealing => self.seek_healing(env, rng),
                Strategy::SeekFood => self.seek_food(env, rng),
                Strategy::SeekWarmth => self.seek_warmth(env, rng),
                Strategy::Obtain(id, obtain) => self.pursue(env, &local, id, &obtain, rng),
            }
        }

        if self.next_action.is_nothing() && rng.random::<f64>() < env.config.idle_wander_chance {
            self.next_action = move_randomly(world, self.x, self.y, rng);
        }
    }

    // -------------------------------------------------------------------
    // Perception
    // -------------------------------------------------------------------

    fn perceive(&mut self, env: &Surroundings<'_>, local: &[LocalCell<'_>]) {
        let (world, config, now) = (env.world, env.config, env.now);
        let registry = env.registry();
        let radius = config.perception_radius;

        self.memory.forget_expired(now, config.memory_ttl);

        let (x, y) = (self.x, self.y);
        let visible: Vec<PersonView> = env
            .people
            .iter()
            .filter(|p| {
                p.x.saturating_sub(x).saturating_abs() < radius
                    && p.y.saturating_sub(y).saturating_abs() < radius
            })
            .copied()
            .collect();
        for person in &visible {
            self.memory.observe_person(person, self.id, now);
        }

        self.memory.prune_missing_things(world, x, y, radius);
        self.memory
            .prune_moved_people(&visible, self.id, x, y, config.person_prune_radius);

        for cell in local {
            let Some(state) = cell.item else {
                continue;
            };
            let item = registry.item_of(state);
            if registry.is_root(item.id) {
                let seen = self.common.entry(item.id).or_insert(0);
                *seen = seen.saturating_add(1);
            }
            if !self.scratch.just_dropped {
                self.complete_if_seen(item, cell.x, cell.y, now);
            }
            if NOTABLE_TAGS.iter().any(|tag| item.has_tag(tag)) {
                self.memory.remember_notable(item.id, cell.x, cell.y, now);
            }
        }
    }

    /// Complete the first non-leaf, non-duplicate `Obtain` that `item`
    /// satisfies, and remember where it was seen.
    fn complete_if_seen(&mut self, item: &Item, x: i64, y: i64, now: u64) {
        let leaf = self.objectives.leaf_id();
        let satisfied = self
            .objectives
            .iter()
            .filter(|(id, _)| Some(*id) != leaf)
            .find_map(|(id, objective)| {
                objective
                    .as_obtain()
                    .filter(|o| !o.duplicate && matches(item, &o.descriptor))
                    .map(|o| (id, o.descriptor.clone()))
            });
        if let Some((id, descriptor)) = satisfied {
            self.complete_alternative(id);
            self.memory
                .remember(Memory::location(Noun::Thing(descriptor), x, y, now));
        }
    }

    /// Make sure the root pursues `focus`, replacing the whole stack if not.
    fn focus_on(&mut self, focus: Need) {
        let aligned = matches!(self.objectives.root(), Some(Objective::FulfillNeed(need)) if *need == focus);
        if !aligned {
            self.objectives.clear();
            self.push_objective(Objective::FulfillNeed(focus), None);
        }
    }

    fn navigate(&mut self, env: &Surroundings<'_>, goto: (i64, i64), rng: &mut impl Rng) {
        if (self.x, self.y) == goto {
            self.scratch.goto = None;
            return;
        }
        let (action, goto) = step_toward(env.world, env.people, self.id, (self.x, self.y), goto, rng);
        self.scratch.goto = Some(goto);
        self.next_action = action;
    }

    // -------------------------------------------------------------------
    // Needs
    // -------------------------------------------------------------------

    /// Eat a held item with `tag`, or take one from the current cell.
    /// Returns whether an action was chosen.
    fn consume_nearby(&mut self, env: &Surroundings<'_>, tag: &str, rng: &mut impl Rng) -> bool {
        let registry = env.registry();
        let holds = self
            .holding
            .as_ref()
            .is_some_and(|state| registry.item_of(state).has_tag(tag));
        if holds {
            self.next_action = Action::Eat;
            return true;
        }
        let underfoot = env
            .world
            .item_at(self.x, self.y)
            .is_some_and(|item| item.has_tag(tag));
        if underfoot {
            if self.holding.is_some() {
                self.try_to_drop(env, rng);
            } else {
                self.next_action = Action::Interact {
                    direction: Direction::Here,
                };
            }
            return true;
        }
        false
    }

    fn seek_healing(&mut self, env: &Surroundings<'_>, rng: &mut impl Rng) {
        if self.consume_nearby(env, TAG_HEALING, rng) {
            return;
        }
        let healing: Vec<ItemId> = env
            .registry()
            .items()
            .iter()
            .filter(|item| item.has_tag(TAG_HEALING))
            .map(|item| item.id)
            .collect();
        if let Some(id) = healing.choose(rng) {
            self.push_objective(Objective::obtain(Conditions::is(*id), false), None);
        }
    }

    fn seek_food(&mut self, env: &Surroundings<'_>, rng: &mut impl Rng) {
        if self.consume_nearby(env, TAG_EDIBLE, rng) {
            return;
        }
        let registry = env.registry();
        let known = self.memory.known_items(registry);
        let best = registry
            .items()
            .iter()
            .filter(|item| item.has_tag(TAG_EDIBLE))
            .map(|item| (item.id, self.food_score(registry, item, &known, rng)))
            .filter(|(_, score)| *score > 0.0)
            .min_by(|a, b| b.1.total_cmp(&a.1));
        if let Some((id, score)) = best {
            debug!(person = %self.full_name(), item = %registry.item(id).name, score, "Chose food");
            self.push_objective(Objective::obtain(Conditions::is(id), false), None);
        }
    }

    /// Nutrition over effort, jittered by up to 20% either way.
    ///
    /// Nutrition is `(food + log2(heal + 1))^2`. Effort is
    /// `(log2(depth) * required)` squared unless a location is remembered,
    /// plus one. Gathered (depth 0) food comes out non-positive or NaN and is
    /// never chosen here.
    pub fn food_score(&self, registry: &Registry, item: &Item, known: &[ItemId], rng: &mut impl Rng) -> f64 {
        let nutrition = (item.property("food") + (item.property("heal") + 1.0).log2()).powi(2);
        let depth = f64::from(registry.depth(item.id));
        let required = count(registry.required(item.id, known, &mut BTreeSet::new()));
        let base = depth.log2() * required;
        let effort = if self.memory.location_of(item).is_some() {
            base
        } else {
            base.powi(2)
        } + 1.0;
        nutrition / effort * rng.random_range(0.8..1.2)
    }

    fn seek_warmth(&mut self, env: &Surroundings<'_>, rng: &mut impl Rng) {
        let (world, config) = (env.world, env.config);
        let registry = env.registry();
        let (Some(fire), Some(kindling)) = (
            registry.item_by_name(&config.fire_item),
            registry.item_by_name(&config.kindling_item),
        ) else {
            trace!(fire = %config.fire_item, kindling = %config.kindling_item, "Fire items missing from content");
            return;
        };

        let Some((fx, fy)) = self.memory.location_of(fire) else {
            self.push_objective(Objective::obtain(Conditions::is(fire.id), false), None);
            return;
        };
        let fire_in_chunk = self.chunk_holds(world, fire.id);

        if self.temperature < config.warm_threshold {
            if fire_in_chunk {
                self.next_action = self.wander_within_chunk(world, rng);
            } else {
                self.next_action = move_randomly(world, self.x, self.y, rng);
                self.scratch.goto = Some(goto_no_blocking(world, fx, fy));
            }
        } else if self.held_item() == Some(kindling.id) {
            if fire_in_chunk {
                self.try_to_drop(env, rng);
                self.scratch.goto = Some(self.random_nearby(world, FIRE_WANDER, rng));
            } else {
                self.next_action = move_randomly(world, self.x, self.y, rng);
                self.scratch.goto = Some(goto_no_blocking(world, fx, fy));
            }
        } else if world.get(self.x, self.y).is_some_and(|s| s.item == kindling.id) {
            self.next_action = Action::Interact {
                direction: Direction::Here,
            };
        } else {
            self.push_objective(Objective::obtain(Conditions::is(kindling.id), true), None);
            self.scratch.goto = Some(self.random_nearby(world, FIRE_WANDER, rng));
        }
    }

    fn chunk_holds(&self, world: &World, item: ItemId) -> bool {
        world
            .chunk_index_of(self.x, self.y)
            .and_then(|index| world.chunks().get(index))
            .is_some_and(|chunk| chunk.occupied().any(|(_, _, state)| state.item == item))
    }

    /// A random step that stays inside the current chunk.
    fn wander_within_chunk(&self, world: &World, rng: &mut impl Rng) -> Action {
        let here = world.chunk_index_of(self.x, self.y);
        let inside: Vec<Direction> = Direction::MOVES
            .into_iter()
            .filter(|d| {
                let (nx, ny) = d.apply(self.x, self.y);
                world.chunk_index_of(nx, ny) == here
            })
            .collect();
        inside
            .choose(rng)
            .map_or(Action::Nothing, |direction| Action::Move {
                direction: *direction,
            })
    }

    /// A random open spot within `[-spread, spread)` on each axis.
    fn random_nearby(&self, world: &World, spread: i64, rng: &mut impl Rng) -> (i64, i64) {
        let x = self.x.saturating_add(rng.random_range(-spread..spread));
        let y = self.y.saturating_add(rng.random_range(-spread..spread));
        goto_no_blocking(world, x, y)
    }

    // -------------------------------------------------------------------
    // Obtain
    // -------------------------------------------------------------------

    fn pursue(
        &mut self,
        env: &Surroundings<'_>,
        local: &[LocalCell<'_>],
        leaf: ObjectiveId,
        obtain: &Obtain,
        rng: &mut impl Rng,
    ) {
        let (world, now) = (env.world, env.now);
        let registry = env.registry();
        let target = registry.item(registry.first_match(&obtain.descriptor));

        // Already holding it.
        let holds_match = self
            .holding
            .as_ref()
            .is_some_and(|state| matches(registry.item_of(state), &obtain.descriptor));
        if !obtain.duplicate && holds_match {
            self.complete_objective();
            return;
        }

        // Standing next to it.
        if !self.scratch.just_dropped {
            let adjacent = neighborhood(self.x, self.y)
                .into_iter()
                .find(|(_, nx, ny)| world.get(*nx, *ny).is_some_and(|s| s.item == target.id));
            if let Some((_, nx, ny)) = adjacent {
                self.memory
                    .remember(Memory::location(Noun::item(target.id), nx, ny, now));
                self.complete_objective();
                return;
            }
        }

        // Remembered somewhere.
        if !obtain.duplicate && !self.scratch.just_dropped {
            if let Some((mx, my)) = self.memory.location_of(target) {
                self.scratch.goto = Some(goto_no_blocking(world, mx, my));
                return;
            }
        }

        if registry.is_root(target.id) {
            self.explore(env, local, &obtain.descriptor, rng);
        } else {
            self.craft(env, local, leaf, target.id, rng);
        }
    }

    fn craft(
        &mut self,
        env: &Surroundings<'_>,
        local: &[LocalCell<'_>],
        leaf: ObjectiveId,
        target: ItemId,
        rng: &mut impl Rng,
    ) {
        let registry = env.registry();
        let recipes = registry.resulted_by(target);

        let feasible = recipes.iter().copied().find(|recipe| {
            registry.simple_used(recipe.id).into_iter().all(|id| {
                self.held_item() == Some(id) || self.memory.location_of(registry.item(id)).is_some()
            })
        });
        if let Some(recipe) = feasible {
            self.work_recipe(env, leaf, recipe, rng);
            return;
        }

        let mut best: Option<(&Recipe, f64)> = None;
        for recipe in recipes {
            let effort = self.recipe_effort(registry, local, recipe, rng);
            if best.is_none_or(|(_, lowest)| effort < lowest) {
                best = Some((recipe, effort));
            }
        }
        let Some((recipe, _)) = best else {
            return;
        };

        let mut inputs: Vec<&Item> = registry
            .simple_used(recipe.id)
            .into_iter()
            .map(|id| registry.item(id))
            .collect();
        inputs.sort_by_key(|item| {
            let active = registry.is_active(item.id);
            (!active, if active { 0 } else { registry.depth(item.id) })
        });

        // A repeated input is requested twice; the later push, which becomes
        // the leaf, carries the duplicate flag.
        let mut seen = BTreeSet::new();
        for item in inputs {
            let duplicate = !seen.insert(item.id);
            self.push_objective(Objective::obtain(Conditions::is(item.id), duplicate), Some(leaf));
        }
        self.next_action = Action::Nothing;
    }

    /// Everything a recipe needs is held or remembered: get into position
    /// (actor in hand, origin adjacent) and use it.
    fn work_recipe(&mut self, env: &Surroundings<'_>, leaf: ObjectiveId, recipe: &Recipe, rng: &mut impl Rng) {
        let world = env.world;
        let registry = env.registry();
        let held = self.holding.as_ref().map(|state| registry.item_of(state));
        let neighbors = neighborhood(self.x, self.y);

        let holds_actor = match (&recipe.actor, held) {
            (Some(actor), Some(item)) => matches(item, actor),
            (None, None) => true,
            _ => false,
        };
        let holds_wrong = held.is_some_and(|item| recipe.actor.as_ref().is_none_or(|actor| !matches(item, actor)));
        let adjacent = |conditions: &Conditions| {
            neighbors
                .iter()
                .find(|(_, nx, ny)| world.item_at(*nx, *ny).is_some_and(|item| matches(item, conditions)))
                .map(|(direction, _, _)| *direction)
        };

        if !holds_actor {
            if holds_wrong {
                self.try_to_drop(env, rng);
            } else if let Some(direction) = recipe.actor.as_ref().and_then(adjacent) {
                self.next_action = Action::Interact { direction };
            } else {
                self.fetch(env, leaf, registry.an_actor(recipe.id));
            }
        } else if let Some(direction) = adjacent(&recipe.origin) {
            self.next_action = Action::Interact { direction };
        } else if holds_wrong {
            self.try_to_drop(env, rng);
        } else {
            self.fetch(env, leaf, registry.an_origin(recipe.id));
        }
    }

    /// Head for a remembered instance of `item`, or request it as a
    /// duplicate sub-objective of `parent`.
    fn fetch(&mut self, env: &Surroundings<'_>, parent: ObjectiveId, item: ItemId) {
        let registry = env.registry();
        let Some((x, y)) = self.memory.location_of(registry.item(item)) else {
            self.push_objective(Objective::obtain(Conditions::is(item), true), Some(parent));
            self.next_action = Action::Nothing;
            return;
        };
        self.scratch.goto = Some(goto_no_blocking(env.world, x, y));
    }

    /// Estimated effort of acquiring one input item. Items already pursued
    /// by a non-duplicate objective are ruled out.
    fn item_effort(&self, registry: &Registry, local: &[LocalCell<'_>], item: &Item, rng: &mut impl Rng) -> f64 {
        let pursued = self.objectives.iter().any(|(_, objective)| {
            objective
                .as_obtain()
                .is_some_and(|o| !o.duplicate && matches(item, &o.descriptor))
        });
        if pursued {
            return f64::INFINITY;
        }
        let craft = f64::from(registry.depth(item.id)).powi(2) + 1.0;
        let easy = self.memory.location_of(item).is_some()
            || local
                .iter()
                .any(|cell| cell.item.is_some_and(|s| s.item == item.id));
        let how_common = registry
            .resources(item.id)
            .iter()
            .map(|id| self.common.get(id).copied().unwrap_or(0))
            .fold(0_u32, u32::saturating_add);
        let base = if easy { craft.sqrt() / 2.0 } else { craft };
        base / (f64::from(how_common) + E).ln() * rng.random_range(0.8..1.2)
    }

    /// Estimated effort of a recipe: input efforts times duration. Recipes
    /// that wear down the held actor in place are ruled out.
    fn recipe_effort(&self, registry: &Registry, local: &[LocalCell<'_>], recipe: &Recipe, rng: &mut impl Rng) -> f64 {
        if recipe.mutates_actor_in_place() {
            return f64::INFINITY;
        }
        let origin = self.item_effort(registry, local, registry.item(registry.an_origin(recipe.id)), rng);
        let actor = if recipe.actor.is_some() {
            self.item_effort(registry, local, registry.item(registry.an_actor(recipe.id)), rng)
        } else {
            1.0
        };
        origin * actor * recipe.effort_time()
    }

    /// Look for a root item: nearest in view, then remembered, then go
    /// somewhere not searched yet.
    fn explore(&mut self, env: &Surroundings<'_>, local: &[LocalCell<'_>], descriptor: &Conditions, rng: &mut impl Rng) {
        let world = env.world;
        let registry = env.registry();
        let (x, y) = (self.x, self.y);

        let nearest = local
            .iter()
            .filter(|cell| {
                cell.item
                    .is_some_and(|state| matches(registry.item_of(state), descriptor))
            })
            .min_by_key(|cell| {
                let dx = cell.x.saturating_sub(x);
                let dy = cell.y.saturating_sub(y);
                dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
            });
        if let Some(cell) = nearest {
            self.scratch.goto = Some(goto_no_blocking(world, cell.x, cell.y));
            return;
        }
        if let Some((wx, wy)) = self.memory.where_is(descriptor, registry) {
            self.scratch.goto = Some(goto_no_blocking(world, wx, wy));
            return;
        }

        self.scratch.searched.push((x, y));
        let max = world.size().saturating_sub(1).max(0);
        let mut pick = |spread: i64, origin: i64| {
            origin
                .saturating_add(rng.random_range(-spread..=spread))
                .clamp(0, max)
        };
        let (mut tx, mut ty) = (pick(SEARCH_SPREAD, x), pick(SEARCH_SPREAD, y));
        let mut expansions: u32 = 0;
        while self.scratch.searched.iter().any(|(sx, sy)| {
            sx.saturating_sub(tx).saturating_abs() < SEARCHED_RADIUS
                && sy.saturating_sub(ty).saturating_abs() < SEARCHED_RADIUS
        }) {
            let spread = SEARCH_SPREAD.saturating_add(i64::from(expansions).saturating_mul(2));
            tx = pick(spread, x);
            ty = pick(spread, y);
            expansions = expansions.saturating_add(1);
            if expansions > env.config.search_expansions {
                break;
            }
        }
        trace!(person = %self.full_name(), x = tx, y = ty, "Exploring");
        self.scratch.goto = Some(goto_no_blocking(world, tx, ty));
    }

    /// Put the held item down on the first free cell around, remembering
    /// where; step randomly if there is none.
    fn try_to_drop(&mut self, env: &Surroundings<'_>, rng: &mut impl Rng) {
        self.scratch.just_dropped = true;
        if let Some(held) = self.held_item() {
            let free = neighborhood(self.x, self.y)
                .into_iter()
                .find(|(_, nx, ny)| env.world.is_free(*nx, *ny));
            if let Some((direction, nx, ny)) = free {
                self.next_action = Action::Interact { direction };
                self.memory
                    .remember(Memory::location(Noun::item(held), nx, ny, env.now));
                return;
            }
        }
        self.next_action = move_randomly(env.world, self.x, self.y, rng);
    }
}

//! Applying chosen actions to the world, and recipe timers.
//!
//! Persons plan against the tick-start snapshot; this module then applies
//! their actions one after another, so a later person's move sees an
//! earlier person's new position. Nothing here chooses what to do.
//!
//! # Interact
//!
//! On the target cell, in order:
//!
//! 1. If it holds an item and a recipe fires with it as origin and the held
//!    item as actor, apply the recipe to both.
//! 2. Else if holding and the cell is empty, drop the held item there.
//! 3. Else if not holding and the cell holds a non-blocking item, pick it
//!    up.
//!
//! Every replacement instance is stamped with the current tick so timed
//! recipes count from the transformation.

use std::sync::Arc;

use rand::Rng;
use tracing::{debug, trace};

use kindred_agents::Person;
use kindred_content::{ItemState, Registry};
use kindred_types::{Action, Direction, ItemId, RecipeId};
use kindred_world::{World, WorldError};

/// What applying one action did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionOutcome {
    /// The person chose to do nothing.
    Idle,
    /// The person stepped to a neighboring cell.
    Moved,
    /// The step was refused: off the grid, blocking, or occupied.
    Blocked,
    /// A recipe fired.
    Crafted(RecipeId),
    /// The held item was put down.
    Dropped,
    /// An item was taken into the hand.
    PickedUp,
    /// The held item was eaten.
    Ate(ItemId),
    /// The action had nothing to act on.
    NoEffect,
}

impl ActionOutcome {
    /// Short name used for per-tick tallies.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Moved => "moved",
            Self::Blocked => "blocked",
            Self::Crafted(_) => "crafted",
            Self::Dropped => "dropped",
            Self::PickedUp => "picked_up",
            Self::Ate(_) => "ate",
            Self::NoEffect => "no_effect",
        }
    }
}

fn stamped(state: Option<ItemState>, now: u64) -> Option<ItemState> {
    state.map(|mut s| {
        s.time = now;
        s
    })
}

/// Apply `person`'s chosen action.
///
/// `occupied` holds the current positions of every other person.
///
/// # Errors
///
/// Returns [`WorldError::OutOfBounds`] only if a write lands off the grid,
/// which the bounds checks here rule out.
pub fn resolve_action(
    person: &mut Person,
    world: &mut World,
    occupied: &[(i64, i64)],
    now: u64,
    rng: &mut impl Rng,
) -> Result<ActionOutcome, WorldError> {
    let outcome = match person.act() {
        Action::Nothing => ActionOutcome::Idle,
        Action::Move { direction } => step(person, world, occupied, direction),
        Action::Interact { direction } => interact(person, world, direction, now, rng)?,
        Action::Eat => eat(person, world.registry()),
    };
    trace!(person = %person.full_name(), ?outcome, "Action resolved");
    Ok(outcome)
}

fn step(person: &mut Person, world: &World, occupied: &[(i64, i64)], direction: Direction) -> ActionOutcome {
    let (x, y) = direction.apply(person.x, person.y);
    if !world.in_bounds(x, y) || world.is_blocking(x, y) || occupied.contains(&(x, y)) {
        return ActionOutcome::Blocked;
    }
    person.x = x;
    person.y = y;
    ActionOutcome::Moved
}

fn interact(
    person: &mut Person,
    world: &mut World,
    direction: Direction,
    now: u64,
    rng: &mut impl Rng,
) -> Result<ActionOutcome, WorldError> {
    let (x, y) = direction.apply(person.x, person.y);
    if !world.in_bounds(x, y) {
        return Ok(ActionOutcome::NoEffect);
    }
    let registry = Arc::clone(world.registry());

    let Some(origin) = world.get(x, y).cloned() else {
        return Ok(match person.holding.take() {
            Some(held) => {
                world.set(x, y, Some(held))?;
                ActionOutcome::Dropped
            }
            None => ActionOutcome::NoEffect,
        });
    };

    let held = person.holding.as_ref();
    let fired = registry
        .used_in(origin.item)
        .into_iter()
        .find(|recipe| registry.will_occur(recipe, &origin, held, now));
    if let Some(recipe) = fired {
        let (origin_next, actor_next) = recipe.outcome_states(&origin, held, Some(rng.random()));
        world.set(x, y, stamped(origin_next, now))?;
        if recipe.actor.is_some() {
            person.holding = stamped(actor_next, now);
        }
        debug!(
            person = %person.full_name(),
            recipe = %recipe.id,
            origin = %registry.item(origin.item).name,
            x,
            y,
            "Recipe fired"
        );
        return Ok(ActionOutcome::Crafted(recipe.id));
    }

    if person.holding.is_none() && !registry.item_of(&origin).is_blocking() {
        person.holding = world.take(x, y);
        return Ok(ActionOutcome::PickedUp);
    }
    Ok(ActionOutcome::NoEffect)
}

fn eat(person: &mut Person, registry: &Registry) -> ActionOutcome {
    let Some(held) = person.holding.take() else {
        return ActionOutcome::NoEffect;
    };
    let item = registry.item_of(&held);
    person.hunger += item.property("food");
    person.health += item.property("heal");
    debug!(person = %person.full_name(), item = %item.name, "Ate");
    ActionOutcome::Ate(held.item)
}

/// Fire every timed recipe that has come due on an item lying in the
/// world. Only actor-less recipes can fire on their own. Returns how many
/// instances were transformed.
///
/// # Errors
///
/// Propagates [`WorldError`] from writing a replacement back.
pub fn advance_timers(world: &mut World, now: u64, rng: &mut impl Rng) -> Result<usize, WorldError> {
    let registry = Arc::clone(world.registry());
    let mut due = Vec::new();
    for cell in world.active() {
        let Some(state) = cell.item else {
            continue;
        };
        let fired = registry
            .used_in(state.item)
            .into_iter()
            .filter(|recipe| recipe.has_duration())
            .find(|recipe| registry.will_occur(recipe, state, None, now));
        if let Some(recipe) = fired {
            let (next, _) = recipe.outcome_states(state, None, Some(rng.random()));
            due.push((cell.x, cell.y, recipe.id, stamped(next, now)));
        }
    }

    for (x, y, recipe, next) in &due {
        trace!(x, y, %recipe, "Timed recipe fired");
        world.set(*x, *y, next.clone())?;
    }
    Ok(due.len())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use kindred_world::WorldDimensions;

    use super::*;

    const CONTENT: &str = r#"{
        "items": [
            { "name": "bush" },
            { "name": "berries", "tags": ["edible"], "properties": { "food": 20, "heal": 3 } },
            { "name": "rock", "tags": ["blocking"] },
            { "name": "fire" },
            { "name": "ash" },
            { "name": "axe" },
            { "name": "log" }
        ],
        "recipes": [
            {
                "origin": { "conditions": [{ "type": "Is", "data": 1 }] },
                "results": [{ "origin": { "type": "NewItem", "data": 2 } }]
            },
            {
                "origin": { "conditions": [{ "type": "Is", "data": 4 }] },
                "time": 10,
                "results": [{ "origin": { "type": "NewItem", "data": 5 } }]
            },
            {
                "origin": { "conditions": [{ "type": "Is", "data": 3 }] },
                "actor": { "conditions": [{ "type": "Is", "data": 6 }] },
                "results": [{
                    "origin": { "type": "NewItem", "data": 7 },
                    "actor": { "type": "SameItem", "data": { "op": "-", "ref": 1 } }
                }]
            }
        ]
    }"#;

    const BUSH: ItemId = ItemId(1);
    const BERRIES: ItemId = ItemId(2);
    const ROCK: ItemId = ItemId(3);
    const FIRE: ItemId = ItemId(4);
    const ASH: ItemId = ItemId(5);
    const AXE: ItemId = ItemId(6);
    const LOG: ItemId = ItemId(7);

    fn world() -> World {
        World::new(
            WorldDimensions {
                chunks_per_side: 2,
                chunk_size: 5,
            },
            Arc::new(Registry::from_json(CONTENT).unwrap()),
        )
    }

    fn person_doing(action: Action) -> Person {
        let mut person = Person::new("Ada".into(), "Reed".into(), 0, (4, 4), 0.5);
        person.next_action = action;
        person
    }

    fn resolve(person: &mut Person, world: &mut World, occupied: &[(i64, i64)]) -> ActionOutcome {
        let mut rng = SmallRng::seed_from_u64(0);
        resolve_action(person, world, occupied, 50, &mut rng).unwrap()
    }

    #[test]
    fn moves_respect_blocking_and_people() {
        let mut world = world();
        world.set(4, 3, Some(ItemState::new(ROCK))).unwrap();

        let mut person = person_doing(Action::Move { direction: Direction::Up });
        assert_eq!(resolve(&mut person, &mut world, &[]), ActionOutcome::Blocked);

        person.next_action = Action::Move { direction: Direction::Left };
        assert_eq!(resolve(&mut person, &mut world, &[(3, 4)]), ActionOutcome::Blocked);
        assert_eq!((person.x, person.y), (4, 4));

        person.next_action = Action::Move { direction: Direction::Down };
        assert_eq!(resolve(&mut person, &mut world, &[]), ActionOutcome::Moved);
        assert_eq!((person.x, person.y), (4, 5));
    }

    #[test]
    fn moves_stay_on_the_grid() {
        let mut world = world();
        let mut person = person_doing(Action::Move { direction: Direction::Left });
        person.x = 0;
        assert_eq!(resolve(&mut person, &mut world, &[]), ActionOutcome::Blocked);
        assert_eq!(person.x, 0);
    }

    #[test]
    fn interact_crafts_before_picking_up() {
        let mut world = world();
        world.set(5, 4, Some(ItemState::new(BUSH))).unwrap();
        let mut person = person_doing(Action::Interact { direction: Direction::Right });

        let outcome = resolve(&mut person, &mut world, &[]);
        assert_eq!(outcome, ActionOutcome::Crafted(RecipeId(0)));
        let crafted = world.get(5, 4).unwrap();
        assert_eq!(crafted.item, BERRIES);
        assert_eq!(crafted.time, 50);

        assert_eq!(resolve(&mut person, &mut world, &[]), ActionOutcome::PickedUp);
        assert_eq!(person.held_item(), Some(BERRIES));
        assert!(world.get(5, 4).is_none());
    }

    #[test]
    fn actor_recipe_wears_the_tool() {
        let mut world = world();
        world.set(4, 5, Some(ItemState::new(ROCK))).unwrap();
        let mut person = person_doing(Action::Interact { direction: Direction::Down });

        assert_eq!(resolve(&mut person, &mut world, &[]), ActionOutcome::NoEffect);

        person.holding = Some(ItemState::new(AXE));
        assert_eq!(resolve(&mut person, &mut world, &[]), ActionOutcome::Crafted(RecipeId(2)));
        assert_eq!(world.get(4, 5).unwrap().item, LOG);
        let axe = person.holding.as_ref().unwrap();
        assert_eq!(axe.item, AXE);
        assert_eq!(axe.value, -1.0);
    }

    #[test]
    fn drop_then_nothing_to_do() {
        let mut world = world();
        let mut person = person_doing(Action::Interact { direction: Direction::Here });
        person.holding = Some(ItemState::new(BERRIES));

        assert_eq!(resolve(&mut person, &mut world, &[]), ActionOutcome::Dropped);
        assert!(person.holding.is_none());
        assert_eq!(world.get(4, 4).unwrap().item, BERRIES);

        person.holding = Some(ItemState::new(AXE));
        assert_eq!(resolve(&mut person, &mut world, &[]), ActionOutcome::NoEffect);
        assert_eq!(person.held_item(), Some(AXE));
    }

    #[test]
    fn eating_feeds_and_heals() {
        let mut world = world();
        let mut person = person_doing(Action::Eat);
        assert_eq!(resolve(&mut person, &mut world, &[]), ActionOutcome::NoEffect);

        person.hunger = 50.0;
        person.health = 60.0;
        person.holding = Some(ItemState::new(BERRIES));
        assert_eq!(resolve(&mut person, &mut world, &[]), ActionOutcome::Ate(BERRIES));
        assert_eq!(person.hunger, 70.0);
        assert_eq!(person.health, 63.0);
        assert!(person.holding.is_none());
    }

    #[test]
    fn timers_fire_when_due() {
        let mut world = world();
        world.set(1, 1, Some(ItemState::created_at(FIRE, 5))).unwrap();
        world.set(2, 2, Some(ItemState::new(BUSH))).unwrap();
        let mut rng = SmallRng::seed_from_u64(1);

        assert_eq!(advance_timers(&mut world, 14, &mut rng).unwrap(), 0);
        assert_eq!(world.get(1, 1).unwrap().item, FIRE);

        assert_eq!(advance_timers(&mut world, 15, &mut rng).unwrap(), 1);
        let ash = world.get(1, 1).unwrap();
        assert_eq!(ash.item, ASH);
        assert_eq!(ash.time, 15);
        assert_eq!(world.get(2, 2).unwrap().item, BUSH);
    }
}

//! Tick cycle: the phase sequence that drives the Kindred simulation.
//!
//! Each tick runs through these phases:
//!
//! 1. **World Wake** -- advance the clock, relax the heat field toward the
//!    ambient temperature of the hour, apply vitals, remove the dead.
//!
//! 2. **Perception + Decision** -- every person thinks against the same
//!    tick-start snapshot: the world as it is and every person's position
//!    as a [`PersonView`]. Nobody sees another person's decision.
//!
//! 3. **Resolution** -- chosen actions are applied serially, in population
//!    order.
//!
//! 4. **Timers** -- timed recipes on items lying in the world fire.
//!
//! The cycle is deterministic given the same initial state and random
//! source.

use std::collections::BTreeMap;

use rand::Rng;
use tracing::{debug, info, warn};

use kindred_agents::{Person, PersonView, PlannerConfig, Surroundings};
use kindred_content::Registry;
use kindred_world::{World, WorldError};

use crate::clock::{ClockError, WorldClock};
use crate::config::SimulationConfig;
use crate::population::{scatter_items, spawn_population};
use crate::resolution::{advance_timers, resolve_action};

/// Errors that can occur during tick execution.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// A world operation failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone, PartialEq)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Ambient temperature handed to the heat field.
    pub ambient: f64,
    /// Number of living persons at end of tick.
    pub population: usize,
    /// Names of persons who died during this tick.
    pub deaths: Vec<String>,
    /// Actions applied, by outcome label.
    pub outcomes: BTreeMap<&'static str, u32>,
    /// Instances transformed by timed recipes.
    pub transformations: usize,
}

/// The mutable simulation state passed through the tick cycle.
#[derive(Debug)]
pub struct SimulationState {
    /// The world clock.
    pub clock: WorldClock,
    /// The grid, its heat field, and the shared content.
    pub world: World,
    /// Living persons.
    pub people: Vec<Person>,
}

impl SimulationState {
    /// An empty world built from `config` around `registry`, at ambient
    /// temperature, with no items and no people.
    pub fn new(config: &SimulationConfig, registry: Registry) -> Self {
        let clock = WorldClock::new();
        let mut world = World::new(config.world.dimensions(), registry.into());
        world.fill_heat(clock.ambient_temperature(&config.climate));
        Self {
            clock,
            world,
            people: Vec::new(),
        }
    }

    /// A world populated per `config`: starting items scattered and family
    /// groups spawned.
    ///
    /// # Errors
    ///
    /// Returns [`TickError::World`] if an item cannot be placed.
    pub fn populated(
        config: &SimulationConfig,
        registry: Registry,
        rng: &mut impl Rng,
    ) -> Result<Self, TickError> {
        warn_missing_planner_items(&registry, &config.planner);
        let mut state = Self::new(config, registry);
        let now = state.clock.tick();
        let placed = scatter_items(&mut state.world, &config.world.items, now, rng)?;
        state.people = spawn_population(
            config.population.initial_groups,
            now,
            &state.world,
            &config.vitals,
            rng,
        );
        info!(
            world = %config.world.name,
            side = state.world.size(),
            items = placed,
            people = state.people.len(),
            "Simulation populated"
        );
        Ok(state)
    }

    /// Tick-start positions of every person.
    pub fn views(&self) -> Vec<PersonView> {
        self.people.iter().map(Person::view).collect()
    }
}

/// Warn about named planner items the content lacks; warmth-seeking is
/// skipped while they are missing.
fn warn_missing_planner_items(registry: &Registry, planner: &PlannerConfig) {
    for name in [&planner.fire_item, &planner.kindling_item] {
        if registry.item_by_name(name).is_none() {
            warn!(item = %name, "Planner item missing from content, warmth-seeking disabled");
        }
    }
}

/// Execute one complete tick of the simulation.
///
/// # Phases
///
/// 1. World Wake
/// 2. Perception + Decision
/// 3. Resolution
/// 4. Timers
///
/// # Errors
///
/// Returns [`TickError::Clock`] if the tick counter overflows and
/// [`TickError::World`] if a world write fails.
pub fn run_tick(
    state: &mut SimulationState,
    config: &SimulationConfig,
    rng: &mut impl Rng,
) -> Result<TickSummary, TickError> {
    // --- Phase 1: World Wake ---
    let now = state.clock.advance()?;
    let ambient = state.clock.ambient_temperature(&config.climate);
    state.world.update(ambient);
    for person in &mut state.people {
        person.update_vitals(&state.world, &config.vitals);
    }
    let mut deaths = Vec::new();
    state.people.retain(|person| {
        if person.is_dead() {
            info!(tick = now, person = %person.full_name(), score = person.score, "Person died");
            deaths.push(person.full_name());
            return false;
        }
        true
    });

    // --- Phase 2: Perception + Decision ---
    let views = state.views();
    let env = Surroundings {
        world: &state.world,
        people: &views,
        now,
        config: &config.planner,
    };
    for person in &mut state.people {
        person.think(&env, rng);
    }

    // --- Phase 3: Resolution ---
    let mut positions: Vec<(i64, i64)> = views.iter().map(|v| (v.x, v.y)).collect();
    let mut outcomes: BTreeMap<&'static str, u32> = BTreeMap::new();
    for (index, person) in state.people.iter_mut().enumerate() {
        let others: Vec<(i64, i64)> = positions
            .iter()
            .enumerate()
            .filter(|(other, _)| *other != index)
            .map(|(_, position)| *position)
            .collect();
        let outcome = resolve_action(person, &mut state.world, &others, now, rng)?;
        if let Some(position) = positions.get_mut(index) {
            *position = (person.x, person.y);
        }
        let count = outcomes.entry(outcome.label()).or_insert(0);
        *count = count.saturating_add(1);
    }

    // --- Phase 4: Timers ---
    let transformations = advance_timers(&mut state.world, now, rng)?;

    debug!(tick = now, ambient, transformations, "Tick complete");
    Ok(TickSummary {
        tick: now,
        ambient,
        population: state.people.len(),
        deaths,
        outcomes,
        transformations,
    })
}

//! Integration tests for the tick cycle: a small populated world run for a
//! few hundred ticks, plus targeted single-tick scenarios.

#![allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]

use std::collections::BTreeSet;

use rand::SeedableRng;
use rand::rngs::SmallRng;

use kindred_agents::Person;
use kindred_content::{ItemState, Registry};
use kindred_core::{SimulationConfig, SimulationState, run_tick};
use kindred_types::ItemId;

const CONTENT: &str = r#"{
    "items": [
        { "name": "bush", "tags": ["foodSource"] },
        { "name": "berries", "tags": ["edible"], "properties": { "food": 20 } },
        { "name": "kindling" },
        { "name": "fire", "tags": ["heatSource"], "properties": { "heat": 50 } },
        { "name": "ash" },
        { "name": "rock", "tags": ["blocking"] }
    ],
    "recipes": [
        {
            "origin": { "conditions": [{ "type": "Is", "data": 1 }] },
            "results": [{ "origin": { "type": "NewItem", "data": 2 } }]
        },
        {
            "origin": { "conditions": [{ "type": "Is", "data": 3 }] },
            "results": [{ "origin": { "type": "NewItem", "data": 4 } }]
        },
        {
            "origin": { "conditions": [{ "type": "Is", "data": 4 }] },
            "time": 20,
            "results": [{ "origin": { "type": "NewItem", "data": 5 } }]
        }
    ]
}"#;

const FIRE: ItemId = ItemId(4);
const ASH: ItemId = ItemId(5);

const CONFIG: &str = "
world:
  chunks_per_side: 4
  chunk_size: 10
  items:
    bush: 40
    kindling: 20
    rock: 30
population:
  initial_groups: 2
";

fn registry() -> Registry {
    Registry::from_json(CONTENT).unwrap()
}

#[test]
fn populated_world_runs_and_keeps_people_apart() {
    let config = SimulationConfig::parse(CONFIG).unwrap();
    let mut rng = SmallRng::seed_from_u64(42);
    let mut state = SimulationState::populated(&config, registry(), &mut rng).unwrap();
    assert!(state.people.len() >= 2);
    assert_eq!(state.world.occupied_count(), 90);

    for expected in 1..=300 {
        let summary = run_tick(&mut state, &config, &mut rng).unwrap();
        assert_eq!(summary.tick, expected);
        assert_eq!(summary.population, state.people.len());
        assert_eq!(
            summary.outcomes.values().sum::<u32>() as usize,
            state.people.len()
        );

        let mut seen = BTreeSet::new();
        for person in &state.people {
            assert!(state.world.in_bounds(person.x, person.y));
            assert!(!state.world.is_blocking(person.x, person.y));
            assert!(seen.insert((person.x, person.y)), "two persons share a cell");
        }
    }
    assert_eq!(state.clock.tick(), 300);
}

#[test]
fn same_seed_same_world() {
    let config = SimulationConfig::parse(CONFIG).unwrap();
    let run = |seed| {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut state = SimulationState::populated(&config, registry(), &mut rng).unwrap();
        for _ in 0..50 {
            run_tick(&mut state, &config, &mut rng).unwrap();
        }
        state
            .people
            .iter()
            .map(|p| (p.full_name(), p.x, p.y, p.held_item()))
            .collect::<Vec<_>>()
    };
    assert_eq!(run(7), run(7));
}

#[test]
fn fire_burns_down_on_its_timer() {
    let config = SimulationConfig::parse("world: { chunks_per_side: 2, chunk_size: 5 }").unwrap();
    let mut rng = SmallRng::seed_from_u64(1);
    let mut state = SimulationState::new(&config, registry());
    state.world.set(3, 3, Some(ItemState::new(FIRE))).unwrap();

    let mut burned_at = None;
    for _ in 0..25 {
        let summary = run_tick(&mut state, &config, &mut rng).unwrap();
        if summary.transformations > 0 {
            burned_at = Some(summary.tick);
            break;
        }
    }
    assert_eq!(burned_at, Some(20));
    assert_eq!(state.world.get(3, 3).unwrap().item, ASH);
}

#[test]
fn starving_person_dies() {
    let config = SimulationConfig::parse("climate: { ambient_temperature: -30, daily_swing: 0 }").unwrap();
    let mut rng = SmallRng::seed_from_u64(3);
    let mut state = SimulationState::new(&config, registry());

    let mut doomed = Person::new("Ada".into(), "Reed".into(), 0, (5, 5), 0.5);
    doomed.hunger = 0.0;
    doomed.health = 0.5;
    doomed.temperature = -30.0;
    let survivor = Person::new("Bo".into(), "Reed".into(), 0, (9, 9), 0.5);
    state.people = vec![doomed, survivor];

    let summary = run_tick(&mut state, &config, &mut rng).unwrap();
    assert_eq!(summary.deaths, vec!["Ada Reed".to_owned()]);
    assert_eq!(summary.population, 1);
    assert_eq!(state.people[0].name, "Bo");
}

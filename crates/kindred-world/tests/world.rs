//! Integration tests for the `kindred-world` grid and heat field, driven by
//! a small JSON content pack.

#![allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]

use std::sync::Arc;

use kindred_content::{ItemState, Registry};
use kindred_types::ItemId;
use kindred_world::{World, WorldDimensions};

const CONTENT: &str = r#"{
    "items": [
        { "name": "fire", "properties": { "heat": 50 } },
        { "name": "ash" },
        { "name": "boulder", "tags": ["blocking", "root"] }
    ],
    "recipes": [
        {
            "origin": { "conditions": [{ "type": "Is", "data": 1 }] },
            "time": 100,
            "results": [{ "origin": { "type": "NewItem", "data": 2 } }]
        }
    ]
}"#;

const FIRE: ItemId = ItemId(1);
const ASH: ItemId = ItemId(2);
const BOULDER: ItemId = ItemId(3);

fn world() -> World {
    let registry = Arc::new(Registry::from_json(CONTENT).unwrap());
    World::new(
        WorldDimensions {
            chunks_per_side: 5,
            chunk_size: 4,
        },
        registry,
    )
}

#[test]
fn ambient_field_without_sources_is_stable() {
    let mut world = world();
    world.fill_heat(15.0);
    world.set(3, 3, Some(ItemState::new(ASH))).unwrap();
    for _ in 0..100 {
        world.update(15.0);
    }
    assert!(world.heat().values().iter().all(|v| *v == 15.0));
}

#[test]
fn fire_warms_its_chunk_and_spreads() {
    let mut world = world();
    world.set(9, 9, Some(ItemState::new(FIRE))).unwrap();
    for _ in 0..200 {
        world.update(0.0);
    }
    let here = world.heat_at(9, 9).unwrap();
    let next_door = world.heat_at(13, 9).unwrap();
    let far = world.heat_at(19, 19).unwrap();
    assert!(here > next_door);
    assert!(next_door > far);
    assert!(far > 0.0);
}

#[test]
fn active_lists_items_with_timed_consumers() {
    let mut world = world();
    world.set(1, 1, Some(ItemState::new(FIRE))).unwrap();
    world.set(17, 6, Some(ItemState::new(FIRE))).unwrap();
    world.set(2, 2, Some(ItemState::new(ASH))).unwrap();

    let active = world.active();
    assert_eq!(active.len(), 2);
    assert_eq!((active[0].x, active[0].y), (1, 1));
    assert_eq!((active[1].x, active[1].y), (17, 6));
    assert!(active.iter().all(|c| c.item.unwrap().item == FIRE));
}

#[test]
fn blocking_and_free_cells() {
    let mut world = world();
    world.set(4, 4, Some(ItemState::new(BOULDER))).unwrap();
    world.set(5, 4, Some(ItemState::new(ASH))).unwrap();
    assert!(world.is_blocking(4, 4));
    assert!(!world.is_blocking(5, 4));
    assert!(!world.is_free(5, 4));
    assert!(world.is_free(6, 4));
    assert!(!world.is_free(-1, 4));
    assert_eq!(world.occupied_count(), 2);
}

//! Starting population and starting items.
//!
//! People arrive in family groups: two to six persons sharing a surname and
//! a home point, placed on free cells around it and knowing each other.
//! Once every group exists, reputations are filled in across the whole
//! population.

use std::collections::BTreeMap;

use rand::Rng;
use tracing::{debug, warn};

use kindred_agents::{Memory, Noun, Person, VitalsConfig};
use kindred_content::ItemState;
use kindred_types::PersonId;
use kindred_world::{World, WorldError};

const VOWELS: &[u8] = b"eaiou";
/// Ordered most to least frequent; draws favor the front.
const CONSONANTS: &[u8] = b"tnsrhldcymfwgpbvkxjqz";

/// Smallest family group.
const MIN_GROUP: usize = 2;
/// Largest family group.
const MAX_GROUP: usize = 6;
/// Half-width of the square group members scatter in around the home.
const GROUP_SPREAD: i64 = 10;
/// Placement attempts per person or item before giving up.
const PLACEMENT_ATTEMPTS: u32 = 1_000;

/// Reputation between members of the same family.
const FAMILY_REPUTATION: f64 = 100.0;
/// Bonus between persons of opposite trait.
const ATTRACTION: f64 = 50.0;
/// Largest random reputation adjustment either way.
const DRIFT: i32 = 10;

/// Index into a table of `len` entries, biased toward the front by
/// squaring a uniform draw.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn biased_index(len: usize, rng: &mut impl Rng) -> usize {
    let draw: f64 = rng.random();
    ((draw * draw * len as f64).floor() as usize).min(len.saturating_sub(1))
}

/// A random syllable name such as `Tenar` or `Hol`: one to four
/// consonant-vowel syllables, each with an optional trailing consonant.
pub fn generate_name(rng: &mut impl Rng) -> String {
    let syllables = rng.random_range(1..=4);
    let mut name = String::new();
    for _ in 0..syllables {
        if let Some(c) = CONSONANTS.get(biased_index(CONSONANTS.len(), rng)) {
            name.push(char::from(*c));
        }
        if let Some(v) = VOWELS.get(rng.random_range(0..VOWELS.len())) {
            name.push(char::from(*v));
        }
        if rng.random_bool(0.5)
            && let Some(c) = CONSONANTS.get(biased_index(CONSONANTS.len(), rng))
        {
            name.push(char::from(*c));
        }
    }
    capitalize(&name)
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// A random empty cell near `(x, y)`, not in `taken`.
fn free_cell_near(
    world: &World,
    (x, y): (i64, i64),
    taken: &[(i64, i64)],
    rng: &mut impl Rng,
) -> Option<(i64, i64)> {
    let max = world.size().saturating_sub(1);
    let mut candidate = (x, y);
    for _ in 0..PLACEMENT_ATTEMPTS {
        if world.in_bounds(candidate.0, candidate.1)
            && world.get(candidate.0, candidate.1).is_none()
            && !taken.contains(&candidate)
        {
            return Some(candidate);
        }
        candidate = (
            x.saturating_add(rng.random_range(-GROUP_SPREAD..=GROUP_SPREAD))
                .clamp(0, max),
            y.saturating_add(rng.random_range(-GROUP_SPREAD..=GROUP_SPREAD))
                .clamp(0, max),
        );
    }
    None
}

/// A family of two to six persons born at `now` around a random home.
///
/// Members share a surname and home, start with health between 80% and
/// 100% of the configured starting health, rate each other at 100, and
/// know that each other exists. Cells in `occupied` are avoided. Members
/// that find no free cell are left out; an empty world yields no one.
pub fn generate_group(
    now: u64,
    world: &World,
    occupied: &[(i64, i64)],
    vitals: &VitalsConfig,
    rng: &mut impl Rng,
) -> Vec<Person> {
    let size = world.size();
    if size <= 0 {
        return Vec::new();
    }
    let surname = generate_name(rng);
    let home = (rng.random_range(0..size), rng.random_range(0..size));
    let members = rng.random_range(MIN_GROUP..=MAX_GROUP);

    let mut taken = occupied.to_vec();
    let mut group = Vec::with_capacity(members);
    for _ in 0..members {
        let Some(position) = free_cell_near(world, home, &taken, rng) else {
            warn!(surname = %surname, "No free cell for group member");
            continue;
        };
        taken.push(position);
        let mut person = Person::new(generate_name(rng), surname.clone(), now, position, rng.random());
        person.home = Some(home);
        person.health = vitals.starting_health * rng.random_range(0.8..1.0);
        person.hunger = vitals.starting_hunger;
        group.push(person);
    }

    let ids: Vec<PersonId> = group.iter().map(|p| p.id).collect();
    for person in &mut group {
        for other in ids.iter().copied().filter(|id| *id != person.id) {
            person.reputations.insert(other, FAMILY_REPUTATION);
            person.memory.remember(Memory::exists(Noun::Person(other), now));
        }
    }
    debug!(surname = %surname, members = group.len(), x = home.0, y = home.1, "Group generated");
    group
}

/// Fill in reputations across the whole population: strangers start at 0,
/// persons of opposite trait gain 50, and every pair drifts by up to 10
/// either way.
pub fn assign_reputations(people: &mut [Person], rng: &mut impl Rng) {
    let traits: Vec<(PersonId, bool)> = people.iter().map(|p| (p.id, p.is_female())).collect();
    for person in people.iter_mut() {
        let female = person.is_female();
        for (other, other_female) in traits.iter().copied().filter(|(id, _)| *id != person.id) {
            let reputation = person.reputations.entry(other).or_insert(0.0);
            if female != other_female {
                *reputation += ATTRACTION;
            }
            *reputation += f64::from(rng.random_range(-DRIFT..=DRIFT));
        }
    }
}

/// `groups` family groups with reputations assigned across all of them.
pub fn spawn_population(
    groups: u32,
    now: u64,
    world: &World,
    vitals: &VitalsConfig,
    rng: &mut impl Rng,
) -> Vec<Person> {
    let mut people = Vec::new();
    for _ in 0..groups {
        let taken: Vec<(i64, i64)> = people.iter().map(|p: &Person| (p.x, p.y)).collect();
        let group = generate_group(now, world, &taken, vitals, rng);
        people.extend(group);
    }
    assign_reputations(&mut people, rng);
    people
}

/// Scatter the configured number of instances of each named item on empty
/// cells, stamped `now`. Unknown names are skipped with a warning. Returns
/// how many instances were placed.
pub fn scatter_items(
    world: &mut World,
    items: &BTreeMap<String, u32>,
    now: u64,
    rng: &mut impl Rng,
) -> Result<usize, WorldError> {
    let size = world.size();
    if size <= 0 {
        return Ok(0);
    }
    let mut placed: usize = 0;
    for (name, count) in items {
        let Some(id) = world.registry().item_by_name(name).map(|item| item.id) else {
            warn!(item = %name, "Unknown item in world.items, skipping");
            continue;
        };
        for _ in 0..*count {
            let cell = (0..PLACEMENT_ATTEMPTS)
                .map(|_| (rng.random_range(0..size), rng.random_range(0..size)))
                .find(|(x, y)| world.get(*x, *y).is_none());
            let Some((x, y)) = cell else {
                warn!(item = %name, "World full, stopped scattering");
                return Ok(placed);
            };
            world.set(x, y, Some(ItemState::created_at(id, now)))?;
            placed = placed.saturating_add(1);
        }
    }
    Ok(placed)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::float_cmp,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use std::sync::Arc;

    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use kindred_content::Registry;
    use kindred_world::WorldDimensions;

    use super::*;

    fn world() -> World {
        let registry = Registry::from_json(r#"{"items":[{"name":"rock"},{"name":"bush"}]}"#).unwrap();
        World::new(
            WorldDimensions {
                chunks_per_side: 4,
                chunk_size: 10,
            },
            Arc::new(registry),
        )
    }

    #[test]
    fn names_are_capitalized_syllables() {
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..50 {
            let name = generate_name(&mut rng);
            assert!((2..=12).contains(&name.len()), "{name}");
            assert!(name.chars().next().unwrap().is_ascii_uppercase());
            assert!(name.chars().skip(1).all(|c| c.is_ascii_lowercase()));
        }
    }

    #[test]
    fn group_members_know_each_other() {
        let world = world();
        let mut rng = SmallRng::seed_from_u64(2);
        let group = generate_group(5, &world, &[], &VitalsConfig::default(), &mut rng);
        assert!((MIN_GROUP..=MAX_GROUP).contains(&group.len()));

        let surname = &group.first().unwrap().surname;
        for person in &group {
            assert_eq!(&person.surname, surname);
            assert_eq!(person.born, 5);
            assert!(world.in_bounds(person.x, person.y));
            assert!((80.0..100.0).contains(&person.health));
            assert_eq!(person.reputations.len(), group.len() - 1);
            assert!(person.reputations.values().all(|r| *r == FAMILY_REPUTATION));
            for other in group.iter().filter(|o| o.id != person.id) {
                assert!(person.memory.knows_person(other.id));
            }
            assert!(!person.memory.knows_person(person.id));
        }

        let mut positions: Vec<_> = group.iter().map(|p| (p.x, p.y)).collect();
        positions.sort_unstable();
        positions.dedup();
        assert_eq!(positions.len(), group.len());
    }

    #[test]
    fn reputations_cover_everyone() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut people = vec![
            Person::new("A".into(), "X".into(), 0, (0, 0), 0.2),
            Person::new("B".into(), "Y".into(), 0, (1, 0), 0.8),
            Person::new("C".into(), "Y".into(), 0, (2, 0), 0.9),
        ];
        assign_reputations(&mut people, &mut rng);

        let (a, b, c) = (&people[0], &people[1], &people[2]);
        assert_eq!(a.reputations.len(), 2);
        let ab = a.reputations[&b.id];
        assert!((40.0..=60.0).contains(&ab), "{ab}");
        let bc = b.reputations[&c.id];
        assert!((-10.0..=10.0).contains(&bc), "{bc}");
        assert!(!c.reputations.contains_key(&c.id));
    }

    #[test]
    fn scatter_places_known_items_only() {
        let mut world = world();
        let mut rng = SmallRng::seed_from_u64(4);
        let items = BTreeMap::from([("bush".to_owned(), 25), ("unicorn".to_owned(), 3)]);
        let placed = scatter_items(&mut world, &items, 9, &mut rng).unwrap();
        assert_eq!(placed, 25);
        assert_eq!(world.occupied_count(), 25);
    }

    #[test]
    fn crowded_population_only_knows_the_living() {
        let registry = Registry::from_json(r#"{"items":[{"name":"rock"}]}"#).unwrap();
        let world = World::new(
            WorldDimensions {
                chunks_per_side: 1,
                chunk_size: 5,
            },
            Arc::new(registry),
        );
        let mut rng = SmallRng::seed_from_u64(6);
        let people = spawn_population(8, 0, &world, &VitalsConfig::default(), &mut rng);
        assert!(!people.is_empty());
        assert!(people.len() <= 25);

        let mut positions: Vec<_> = people.iter().map(|p| (p.x, p.y)).collect();
        positions.sort_unstable();
        positions.dedup();
        assert_eq!(positions.len(), people.len());

        let ids: Vec<PersonId> = people.iter().map(|p| p.id).collect();
        for person in &people {
            assert_eq!(person.reputations.len(), people.len() - 1);
            assert!(person.reputations.keys().all(|id| ids.contains(id)));
            for memory in person.memory.entries() {
                if let kindred_agents::MemoryKind::Exists {
                    noun: Noun::Person(id),
                } = &memory.kind
                {
                    assert!(ids.contains(id));
                }
            }
        }
    }
}

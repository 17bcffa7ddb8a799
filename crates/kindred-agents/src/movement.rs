//! Greedy single-step movement.
//!
//! There is no path search. A person steps along the axis with the larger
//! remaining offset; when that cell is blocked by a blocking item or by
//! another person, a random open direction is taken instead.

use rand::Rng;
use rand::seq::IndexedRandom;

use kindred_types::{Action, Direction, PersonId};
use kindred_world::World;

use crate::view::PersonView;

/// The five cells around `(x, y)` in [`Direction::ALL`] order.
pub fn neighborhood(x: i64, y: i64) -> [(Direction, i64, i64); 5] {
    Direction::ALL.map(|d| {
        let (nx, ny) = d.apply(x, y);
        (d, nx, ny)
    })
}

/// If the destination holds a blocking item, the first open orthogonal
/// neighbor (below, above, right, left); otherwise the destination itself.
pub fn goto_no_blocking(world: &World, x: i64, y: i64) -> (i64, i64) {
    if !world.is_blocking(x, y) {
        return (x, y);
    }
    let candidates = [
        (x, y.saturating_add(1)),
        (x, y.saturating_sub(1)),
        (x.saturating_add(1), y),
        (x.saturating_sub(1), y),
    ];
    candidates
        .into_iter()
        .find(|(cx, cy)| !world.is_blocking(*cx, *cy))
        .unwrap_or((x, y))
}

/// A step in a random non-blocked direction; any direction when boxed in.
pub fn move_randomly(world: &World, x: i64, y: i64, rng: &mut impl Rng) -> Action {
    let open: Vec<Direction> = Direction::MOVES
        .into_iter()
        .filter(|d| {
            let (nx, ny) = d.apply(x, y);
            !world.is_blocking(nx, ny)
        })
        .collect();
    let moves = Direction::MOVES;
    let direction = open
        .choose(rng)
        .or_else(|| moves.choose(rng))
        .copied()
        .unwrap_or(Direction::Up);
    Action::Move { direction }
}

/// Direction of the greedy step from `(x, y)` toward `(gx, gy)`.
pub const fn greedy_direction(x: i64, y: i64, gx: i64, gy: i64) -> Direction {
    let dx = gx.saturating_sub(x);
    let dy = gy.saturating_sub(y);
    if dx.saturating_abs() > dy.saturating_abs() {
        if dx > 0 { Direction::Right } else { Direction::Left }
    } else if dy > 0 {
        Direction::Down
    } else {
        Direction::Up
    }
}

/// One step toward `goto`. Returns the action and the (possibly adjusted)
/// destination: a blocking destination is first moved to an open neighbor.
pub fn step_toward(
    world: &World,
    people: &[PersonView],
    me: PersonId,
    (x, y): (i64, i64),
    goto: (i64, i64),
    rng: &mut impl Rng,
) -> (Action, (i64, i64)) {
    let goto = goto_no_blocking(world, goto.0, goto.1);
    let direction = greedy_direction(x, y, goto.0, goto.1);
    let (nx, ny) = direction.apply(x, y);
    let occupied = people.iter().any(|p| p.id != me && p.is_at(nx, ny));
    let action = if world.is_blocking(nx, ny) || occupied {
        move_randomly(world, x, y, rng)
    } else {
        Action::Move { direction }
    };
    (action, goto)
}

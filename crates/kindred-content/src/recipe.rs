//! Recipes: gates, weighted outcome selection, and instance transformation.
//!
//! A recipe fires on an *origin* instance, optionally together with a
//! co-located *actor* instance. When it fires, one of its weighted outcomes
//! is drawn and applied to both participants.

use kindred_types::{
    ArithmeticOp, Conditions, RecipeId, RecipeOutcome, RecipeRecord, RecipeResult, ValueChange,
    ValueGate,
};
use serde::{Deserialize, Serialize};

use crate::condition::{compare, matches};
use crate::item::{Item, ItemState};

/// Outcome returned when a recipe has no outcomes at all.
static NO_OUTCOME: RecipeOutcome = RecipeOutcome {
    origin: RecipeResult::Nothing,
    actor: None,
    chance: None,
};

/// An immutable, content-defined recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Registry position.
    pub id: RecipeId,
    /// What the origin item must match.
    pub origin: Conditions,
    /// Gate on the origin instance's value.
    pub origin_value: Option<ValueGate>,
    /// Minimum ticks since the origin's last transformation.
    pub time: Option<u64>,
    /// What the actor item must match, if the recipe needs one.
    pub actor: Option<Conditions>,
    /// Gate on the actor instance's value.
    pub actor_value: Option<ValueGate>,
    /// Weighted outcomes.
    pub results: Vec<RecipeOutcome>,
}

impl Recipe {
    /// Build a recipe from its record at the given position.
    pub fn from_record(id: RecipeId, record: RecipeRecord) -> Self {
        Self {
            id,
            origin: record.origin,
            origin_value: record.origin_value,
            time: record.time,
            actor: record.actor,
            actor_value: record.actor_value,
            results: record.results,
        }
    }

    /// Convert back into a record (the id is dropped).
    pub fn to_record(&self) -> RecipeRecord {
        RecipeRecord {
            origin: self.origin.clone(),
            origin_value: self.origin_value.clone(),
            time: self.time,
            actor: self.actor.clone(),
            actor_value: self.actor_value.clone(),
            results: self.results.clone(),
        }
    }

    /// Whether the recipe takes time to complete. Items consumed by such a
    /// recipe are "active": they transform on their own.
    pub fn has_duration(&self) -> bool {
        self.time.is_some_and(|t| t > 0)
    }

    /// The duration used when weighing the recipe against alternatives;
    /// instantaneous recipes count as 1.
    #[allow(clippy::cast_precision_loss)]
    pub fn effort_time(&self) -> f64 {
        match self.time {
            Some(t) if t > 0 => t as f64,
            _ => 1.0,
        }
    }

    /// Whether any outcome mutates the actor in place, i.e. the actor is
    /// used up gradually rather than consumed or replaced.
    pub fn mutates_actor_in_place(&self) -> bool {
        self.actor.is_some()
            && self
                .results
                .iter()
                .any(|r| r.actor.as_ref().is_some_and(RecipeResult::is_same_item))
    }

    /// Item ids spawned by new-item outcomes, deduplicated in first-seen
    /// order.
    pub fn notable_results(&self) -> Vec<kindred_types::ItemId> {
        let mut out = Vec::new();
        for result in &self.results {
            let spawned = [
                result.origin.new_item(),
                result.actor.as_ref().and_then(RecipeResult::new_item),
            ];
            for id in spawned.into_iter().flatten() {
                if !out.contains(&id) {
                    out.push(id);
                }
            }
        }
        out
    }

    /// Whether the recipe fires for these participants at tick `now`.
    ///
    /// The origin condition must hold; then the value gate, the time gate
    /// and, if an actor is declared, the actor condition and actor value
    /// gate must all hold too. A declared actor with no actor instance fails.
    pub fn will_occur(
        &self,
        origin_item: &Item,
        origin: &ItemState,
        actor: Option<(&Item, &ItemState)>,
        now: u64,
    ) -> bool {
        if !matches(origin_item, &self.origin) {
            return false;
        }
        let value_ok = self
            .origin_value
            .as_ref()
            .is_none_or(|gate| compare(origin.value, &gate.op, gate.reference));
        let time_ok = match self.time {
            Some(t) if t > 0 => now.saturating_sub(origin.time) >= t,
            _ => true,
        };
        let actor_ok = match &self.actor {
            None => true,
            Some(conditions) => actor.is_some_and(|(item, state)| {
                matches(item, conditions)
                    && self
                        .actor_value
                        .as_ref()
                        .is_none_or(|gate| compare(state.value, &gate.op, gate.reference))
            }),
        };
        value_ok && time_ok && actor_ok
    }

    /// Pick an outcome for a uniform draw `random` in `[0, 1)`.
    ///
    /// A single outcome is always returned as is; no outcomes yield a
    /// consume-nothing sentinel. Otherwise outcomes are weighted by
    /// `chance` (default 1).
    pub fn select_outcome(results: &[RecipeOutcome], random: f64) -> &RecipeOutcome {
        match results {
            [] => &NO_OUTCOME,
            [only] => only,
            [first, ..] => {
                let total: f64 = results.iter().map(|r| r.chance.unwrap_or(1.0)).sum();
                let mut cumulative = 0.0;
                for result in results {
                    cumulative += result.chance.unwrap_or(1.0) / total;
                    if cumulative >= random {
                        return result;
                    }
                }
                first
            }
        }
    }

    /// Transform the participants. `random` selects a weighted outcome; with
    /// no draw the first outcome is used.
    ///
    /// Returns the replacement for the origin and for the actor; `None`
    /// means the instance is gone.
    pub fn outcome_states(
        &self,
        origin: &ItemState,
        actor: Option<&ItemState>,
        random: Option<f64>,
    ) -> (Option<ItemState>, Option<ItemState>) {
        let Some(first) = self.results.first() else {
            return (None, None);
        };
        let outcome = random.map_or(first, |r| Self::select_outcome(&self.results, r));
        let origin_result = apply_result(Some(origin), &outcome.origin);
        let actor_result = outcome
            .actor
            .as_ref()
            .and_then(|result| apply_result(actor, result));
        (origin_result, actor_result)
    }
}

/// Apply one result to an (optional) instance.
///
/// Mutating a missing instance yields nothing; a new-item result always
/// yields a fresh instance.
pub fn apply_result(instance: Option<&ItemState>, result: &RecipeResult) -> Option<ItemState> {
    match result {
        RecipeResult::Nothing => None,
        RecipeResult::NewItem(id) => Some(ItemState::new(*id)),
        RecipeResult::SameItem(change) => {
            let mut next = instance?.successor();
            if let Some(change) = change {
                apply_change(&mut next, change);
            }
            Some(next)
        }
    }
}

fn apply_change(state: &mut ItemState, change: &ValueChange) {
    match change.op {
        ArithmeticOp::Set => state.value = change.reference,
        ArithmeticOp::Add => state.value += change.reference,
        ArithmeticOp::Sub => state.value -= change.reference,
        ArithmeticOp::Unrecognized(_) => {}
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use kindred_types::{CompareOp, ItemId};

    use super::*;

    fn item(id: u32, tags: &[&str]) -> Item {
        Item {
            id: ItemId(id),
            tags: tags.iter().map(|t| String::from(*t)).collect(),
            ..Item::sentinel()
        }
    }

    fn outcome(origin: RecipeResult, chance: Option<f64>) -> RecipeOutcome {
        RecipeOutcome {
            origin,
            actor: None,
            chance,
        }
    }

    fn recipe(origin: u32) -> Recipe {
        Recipe {
            id: RecipeId(0),
            origin: Conditions::is(ItemId(origin)),
            origin_value: None,
            time: None,
            actor: None,
            actor_value: None,
            results: vec![outcome(RecipeResult::NewItem(ItemId(2)), None)],
        }
    }

    #[test]
    fn origin_condition_gates_everything() {
        let mut r = recipe(1);
        r.origin_value = Some(ValueGate {
            op: CompareOp::Ge,
            reference: 0.0,
        });
        let wrong = item(3, &[]);
        let state = ItemState::new(ItemId(3));
        assert!(!r.will_occur(&wrong, &state, None, 1000));
        let right = item(1, &[]);
        assert!(r.will_occur(&right, &ItemState::new(ItemId(1)), None, 1000));
    }

    #[test]
    fn time_gate_counts_from_last_transformation() {
        let mut r = recipe(1);
        r.time = Some(50);
        let origin = item(1, &[]);
        let state = ItemState::created_at(ItemId(1), 100);
        assert!(!r.will_occur(&origin, &state, None, 149));
        assert!(r.will_occur(&origin, &state, None, 150));
    }

    #[test]
    fn declared_actor_must_be_present_and_match() {
        let mut r = recipe(1);
        r.actor = Some(Conditions::with_tag("sharp"));
        r.actor_value = Some(ValueGate {
            op: CompareOp::Gt,
            reference: 0.0,
        });
        let origin = item(1, &[]);
        let state = ItemState::new(ItemId(1));
        let knife = item(5, &["sharp"]);
        let mut knife_state = ItemState::new(ItemId(5));
        assert!(!r.will_occur(&origin, &state, None, 0));
        assert!(!r.will_occur(&origin, &state, Some((&knife, &knife_state)), 0));
        knife_state.value = 3.0;
        assert!(r.will_occur(&origin, &state, Some((&knife, &knife_state)), 0));
        let rock = item(6, &[]);
        assert!(!r.will_occur(&origin, &state, Some((&rock, &knife_state)), 0));
    }

    #[test]
    fn single_outcome_ignores_draw() {
        let results = vec![outcome(RecipeResult::NewItem(ItemId(9)), Some(0.01))];
        for draw in [0.0, 0.5, 0.999] {
            assert_eq!(
                Recipe::select_outcome(&results, draw).origin,
                RecipeResult::NewItem(ItemId(9))
            );
        }
    }

    #[test]
    fn no_outcomes_yield_sentinel() {
        let picked = Recipe::select_outcome(&[], 0.3);
        assert_eq!(picked.origin, RecipeResult::Nothing);
        assert!(picked.actor.is_none());
    }

    #[test]
    fn weighted_selection_uses_cumulative_share() {
        let results = vec![
            outcome(RecipeResult::NewItem(ItemId(1)), Some(1.0)),
            outcome(RecipeResult::NewItem(ItemId(2)), Some(3.0)),
        ];
        assert_eq!(Recipe::select_outcome(&results, 0.2).origin.new_item(), Some(ItemId(1)));
        assert_eq!(Recipe::select_outcome(&results, 0.25).origin.new_item(), Some(ItemId(1)));
        assert_eq!(Recipe::select_outcome(&results, 0.3).origin.new_item(), Some(ItemId(2)));
    }

    #[test]
    fn same_item_applies_arithmetic() {
        let mut state = ItemState::created_at(ItemId(1), 7);
        state.value = 10.0;
        let minus = RecipeResult::SameItem(Some(ValueChange {
            op: ArithmeticOp::Sub,
            reference: 4.0,
        }));
        let next = apply_result(Some(&state), &minus).unwrap();
        assert_eq!(next.value, 6.0);
        assert_eq!(next.time, 7);
        let odd = RecipeResult::SameItem(Some(ValueChange {
            op: ArithmeticOp::Unrecognized(String::from("*")),
            reference: 4.0,
        }));
        assert_eq!(apply_result(Some(&state), &odd).unwrap().value, 10.0);
        assert!(apply_result(None, &minus).is_none());
    }

    #[test]
    fn outcome_states_without_results() {
        let mut r = recipe(1);
        r.results.clear();
        let state = ItemState::new(ItemId(1));
        assert_eq!(r.outcome_states(&state, None, Some(0.5)), (None, None));
    }

    #[test]
    fn notable_results_are_deduplicated() {
        let mut r = recipe(1);
        r.results.push(RecipeOutcome {
            origin: RecipeResult::NewItem(ItemId(2)),
            actor: Some(RecipeResult::NewItem(ItemId(3))),
            chance: None,
        });
        r.results.push(outcome(RecipeResult::SameItem(None), None));
        assert_eq!(r.notable_results(), vec![ItemId(2), ItemId(3)]);
    }
}

//! The condition engine.
//!
//! [`matches`] decides whether an item definition satisfies a
//! [`Conditions`] conjunction. It is pure and total: it never fails, an
//! empty conjunction is vacuously true, and absent properties read as zero.

use kindred_types::{CompareOp, Conditions, ItemCondition};

use crate::item::Item;

/// Evaluate `input <op> reference`. Unrecognized operators compare false.
#[allow(clippy::float_cmp)]
pub fn compare(input: f64, op: &CompareOp, reference: f64) -> bool {
    match op {
        CompareOp::Eq => input == reference,
        CompareOp::Gt => input > reference,
        CompareOp::Lt => input < reference,
        CompareOp::Ge => input >= reference,
        CompareOp::Le => input <= reference,
        CompareOp::Unrecognized(_) => false,
    }
}

/// Evaluate one atomic predicate.
pub fn matches_one(item: &Item, condition: &ItemCondition) -> bool {
    match condition {
        ItemCondition::Nothing => false,
        ItemCondition::All => true,
        ItemCondition::Is(id) => item.id == *id,
        ItemCondition::IsNot(id) => item.id != *id,
        ItemCondition::WithTag(tag) => item.has_tag(tag),
        ItemCondition::WithoutTag(tag) => !item.has_tag(tag),
        ItemCondition::PropertyIs(cmp) => {
            compare(item.property(&cmp.property), &cmp.op, cmp.reference)
        }
        ItemCondition::PropertyIsNot(cmp) => {
            !compare(item.property(&cmp.property), &cmp.op, cmp.reference)
        }
    }
}

/// Whether `item` satisfies every predicate in `conditions`.
pub fn matches(item: &Item, conditions: &Conditions) -> bool {
    conditions.conditions.iter().all(|c| matches_one(item, c))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use kindred_types::{ItemId, PropertyComparison};

    use super::*;

    fn berry() -> Item {
        Item {
            id: ItemId(4),
            name: String::from("berry"),
            tags: vec![String::from("edible")],
            display: Vec::new(),
            properties: BTreeMap::from([(String::from("food"), 5.0)]),
        }
    }

    fn property(name: &str, op: &str, reference: f64) -> PropertyComparison {
        PropertyComparison {
            property: String::from(name),
            op: CompareOp::from(String::from(op)),
            reference,
        }
    }

    #[test]
    fn empty_conditions_match_everything() {
        assert!(matches(&berry(), &Conditions::default()));
        assert!(matches(&Item::sentinel(), &Conditions::default()));
    }

    #[test]
    fn identity_and_tags() {
        let item = berry();
        assert!(matches_one(&item, &ItemCondition::Is(ItemId(4))));
        assert!(!matches_one(&item, &ItemCondition::IsNot(ItemId(4))));
        assert!(matches_one(&item, &ItemCondition::WithTag(String::from("edible"))));
        assert!(matches_one(&item, &ItemCondition::WithoutTag(String::from("blocking"))));
        assert!(!matches_one(&item, &ItemCondition::Nothing));
    }

    #[test]
    fn property_comparisons() {
        let item = berry();
        assert!(matches_one(&item, &ItemCondition::PropertyIs(property("food", ">=", 5.0))));
        assert!(matches_one(&item, &ItemCondition::PropertyIs(property("food", "=", 5.0))));
        assert!(!matches_one(&item, &ItemCondition::PropertyIs(property("food", "<", 5.0))));
        assert!(matches_one(&item, &ItemCondition::PropertyIsNot(property("food", ">", 5.0))));
    }

    #[test]
    fn absent_property_compares_as_zero() {
        let item = berry();
        assert!(matches_one(&item, &ItemCondition::PropertyIs(property("heat", "=", 0.0))));
        assert!(!matches_one(&item, &ItemCondition::PropertyIs(property("heat", ">", 0.0))));
    }

    #[test]
    fn unknown_operator_is_false_and_its_negation_true() {
        let item = berry();
        assert!(!matches_one(&item, &ItemCondition::PropertyIs(property("food", "~", 5.0))));
        assert!(matches_one(&item, &ItemCondition::PropertyIsNot(property("food", "~", 5.0))));
    }

    #[test]
    fn conjunction_requires_all() {
        let item = berry();
        let both = Conditions {
            conditions: vec![
                ItemCondition::WithTag(String::from("edible")),
                ItemCondition::IsNot(ItemId(4)),
            ],
        };
        assert!(!matches(&item, &both));
    }
}

//! Candidate fixtures shared by the integration tests.

use optionset_engine::domains::option_sets::models::{ItemCandidate, OptionSetCandidate};
use rust_decimal::Decimal;

pub fn price(s: &str) -> Decimal {
    s.parse().expect("valid decimal literal")
}

pub fn item_candidate(name: &str, price_delta: &str) -> ItemCandidate {
    ItemCandidate {
        name: name.to_string(),
        price_delta: price(price_delta),
        is_default: false,
        description: None,
    }
}

/// A typical "Add Sides" modifier group: pick up to two priced sides.
pub fn add_sides_candidate() -> OptionSetCandidate {
    OptionSetCandidate {
        name: "Add Sides".to_string(),
        description: Some("Pick up to two sides".to_string()),
        min_selections: 0,
        max_selections: Some(2),
        required: false,
        allow_multiple_per_item: false,
        items: vec![
            item_candidate("Fries", "2.50"),
            item_candidate("Coleslaw", "1.99"),
            item_candidate("Side Salad", "3.25"),
        ],
    }
}

/// A required single-choice group, distinct content from `add_sides`.
pub fn choose_size_candidate() -> OptionSetCandidate {
    OptionSetCandidate {
        name: "Choose Size".to_string(),
        description: None,
        min_selections: 1,
        max_selections: Some(1),
        required: true,
        allow_multiple_per_item: false,
        items: vec![
            item_candidate("Small", "0.00"),
            item_candidate("Large", "1.50"),
        ],
    }
}

/// An unbounded add-ons group, distinct content from the other fixtures.
pub fn extra_toppings_candidate() -> OptionSetCandidate {
    OptionSetCandidate {
        name: "Extra Toppings".to_string(),
        description: None,
        min_selections: 0,
        max_selections: None,
        required: false,
        allow_multiple_per_item: true,
        items: vec![
            item_candidate("Bacon", "1.25"),
            item_candidate("Avocado", "2.00"),
        ],
    }
}

/// min > max: rejected by the canonicalizer.
pub fn malformed_candidate() -> OptionSetCandidate {
    OptionSetCandidate {
        name: "Broken Group".to_string(),
        description: None,
        min_selections: 3,
        max_selections: Some(1),
        required: true,
        allow_multiple_per_item: false,
        items: vec![item_candidate("Anything", "0.50")],
    }
}

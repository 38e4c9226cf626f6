//! Canonicalization of option-set candidates.
//!
//! Produces a deterministic, order-independent representation used as hash
//! input. Normalization rules for comparison fields:
//! - Trim and lowercase names, collapse runs of whitespace
//! - Sort items by (normalized name, price in minor units)
//! - Normalize price deltas to integer minor currency units, so `6.99` and
//!   `6.990` canonicalize identically
//!
//! Original casing and descriptions are preserved in a display side channel;
//! they never participate in the canonical byte sequence.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domains::option_sets::error::EngineError;
use crate::domains::option_sets::models::OptionSetCandidate;

/// Stable hash input. serde_json writes struct fields in declaration order,
/// so the serialized bytes are deterministic for equal content.
#[derive(Debug, Clone, Serialize)]
struct CanonicalForm {
    name: String,
    min_selections: i32,
    max_selections: Option<i32>,
    required: bool,
    allow_multiple_per_item: bool,
    items: Vec<CanonicalItem>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq, PartialOrd, Ord)]
struct CanonicalItem {
    name: String,
    price_minor: i64,
    is_default: bool,
}

/// A line item as it will be persisted: original casing, normalized price.
#[derive(Debug, Clone)]
pub struct DisplayItem {
    pub name: String,
    pub price_delta: Decimal,
    pub is_default: bool,
    pub description: Option<String>,
    pub display_order: i32,
}

/// A validated, canonicalized candidate: the stable byte sequence for
/// hashing plus the display fields persisted when the candidate turns out to
/// be the first sighting of its fingerprint.
#[derive(Debug, Clone)]
pub struct CanonicalOptionSet {
    pub display_name: String,
    pub description: Option<String>,
    pub min_selections: i32,
    pub max_selections: Option<i32>,
    pub required: bool,
    pub allow_multiple_per_item: bool,
    /// Items in extraction order (display concern only).
    pub display_items: Vec<DisplayItem>,
    canonical_bytes: Vec<u8>,
}

impl CanonicalOptionSet {
    /// The stable byte sequence fed to the fingerprint hash.
    pub fn canonical_bytes(&self) -> &[u8] {
        &self.canonical_bytes
    }
}

/// Normalize a string for comparison: trim, lowercase, collapse whitespace.
fn normalize(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Convert a price delta to integer minor currency units (cents).
/// Returns `None` when the value does not fit, including when the
/// multiplication itself would overflow `Decimal`.
fn to_minor_units(price: Decimal) -> Option<i64> {
    price
        .round_dp(2)
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|minor| minor.to_i64())
}

/// Canonicalize a raw candidate.
///
/// Fails with [`EngineError::MalformedCandidate`] when the name is
/// empty/whitespace-only, selection counts are negative or inverted
/// (finite `min > max`), an item name is empty, or a price delta does not
/// fit in minor units.
pub fn canonicalize(candidate: &OptionSetCandidate) -> Result<CanonicalOptionSet, EngineError> {
    let normalized_name = normalize(&candidate.name);
    if normalized_name.is_empty() {
        return Err(EngineError::MalformedCandidate(
            "option set name is empty".to_string(),
        ));
    }

    if candidate.min_selections < 0 {
        return Err(EngineError::MalformedCandidate(format!(
            "min_selections is negative: {}",
            candidate.min_selections
        )));
    }
    match candidate.max_selections {
        Some(max) if max < 0 => {
            return Err(EngineError::MalformedCandidate(format!(
                "max_selections is negative: {max}"
            )));
        }
        Some(max) if candidate.min_selections > max => {
            return Err(EngineError::MalformedCandidate(format!(
                "min_selections {} exceeds max_selections {max}",
                candidate.min_selections
            )));
        }
        _ => {}
    }

    let mut canonical_items = Vec::with_capacity(candidate.items.len());
    let mut display_items = Vec::with_capacity(candidate.items.len());
    for (position, item) in candidate.items.iter().enumerate() {
        let item_name = normalize(&item.name);
        if item_name.is_empty() {
            return Err(EngineError::MalformedCandidate(format!(
                "item name at position {position} is empty"
            )));
        }
        let price_minor = to_minor_units(item.price_delta).ok_or_else(|| {
            EngineError::MalformedCandidate(format!(
                "price delta {} for item '{}' is out of range",
                item.price_delta,
                item.name.trim()
            ))
        })?;

        canonical_items.push(CanonicalItem {
            name: item_name,
            price_minor,
            is_default: item.is_default,
        });
        display_items.push(DisplayItem {
            name: item.name.trim().to_string(),
            price_delta: item.price_delta.round_dp(2),
            is_default: item.is_default,
            description: item
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            display_order: position as i32,
        });
    }

    // Extraction order never influences the hash.
    canonical_items.sort();

    let form = CanonicalForm {
        name: normalized_name,
        min_selections: candidate.min_selections,
        max_selections: candidate.max_selections,
        required: candidate.required,
        allow_multiple_per_item: candidate.allow_multiple_per_item,
        items: canonical_items,
    };
    let canonical_bytes = serde_json::to_vec(&form).map_err(|e| {
        EngineError::MalformedCandidate(format!("candidate is not encodable: {e}"))
    })?;

    Ok(CanonicalOptionSet {
        display_name: candidate.name.trim().to_string(),
        description: candidate
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string),
        min_selections: candidate.min_selections,
        max_selections: candidate.max_selections,
        required: candidate.required,
        allow_multiple_per_item: candidate.allow_multiple_per_item,
        display_items,
        canonical_bytes,
    })
}

//! Raw option-set candidates as produced by the extraction pipeline.
//!
//! Candidates are ephemeral: the same group (e.g. "Add Sides") arrives once
//! per menu item that offers it. Only the canonical/hashed form is persisted.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One selectable modifier group extracted for a menu item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionSetCandidate {
    pub name: String,
    pub description: Option<String>,
    /// Minimum number of selections the diner must make.
    pub min_selections: i32,
    /// Maximum number of selections. `None` means unbounded; it is never
    /// coerced to a finite number.
    pub max_selections: Option<i32>,
    pub required: bool,
    /// Whether the same line item may be chosen more than once.
    pub allow_multiple_per_item: bool,
    /// Line items in extraction order. Order does not affect deduplication.
    pub items: Vec<ItemCandidate>,
}

/// One priced line item inside a candidate option set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemCandidate {
    pub name: String,
    /// Price adjustment when selected. May be negative, zero or positive.
    pub price_delta: Decimal,
    pub is_default: bool,
    pub description: Option<String>,
}

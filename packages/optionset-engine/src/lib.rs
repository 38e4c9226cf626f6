// Menu Option-Set Deduplication Engine
//
// Content-addressed storage for the selectable modifier groups ("option sets")
// that menu extraction produces redundantly per menu item. Candidates are
// canonicalized, fingerprinted per tenant, deduplicated into master records,
// and linked to menu items through a reconciled many-to-many junction.

pub mod common;
pub mod config;
pub mod domains;

pub use config::*;

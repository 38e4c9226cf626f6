// Option-set deduplication and reconciliation domain
//
// Pipeline: canonicalize → fingerprint → master store get-or-create →
// per-menu-item link reconciliation, driven across a whole extraction result
// by the batch coordinator.

pub mod canonical;
pub mod coordinator;
pub mod error;
pub mod fingerprint;
pub mod models;
pub mod reconciler;
pub mod store;

// Re-export commonly used types
pub use canonical::{canonicalize, CanonicalOptionSet};
pub use coordinator::{run, BatchReport};
pub use error::EngineError;
pub use fingerprint::{fingerprint, ContentFingerprint};
pub use models::{
    ItemCandidate, MasterOptionSet, MasterOptionSetItem, MenuItemOptionSetLink, OptionSetCandidate,
};
pub use reconciler::{reconcile, ReconciliationResult};
pub use store::ResolvedMasters;

// Common types shared across the engine

pub mod entity_ids;
pub mod id;

pub use entity_ids::*;
pub use id::Id;

pub mod candidate;
pub mod master_option_set;
pub mod option_set_link;

// Re-export commonly used types
pub use candidate::{ItemCandidate, OptionSetCandidate};
pub use master_option_set::{MasterOptionSet, MasterOptionSetItem};
pub use option_set_link::MenuItemOptionSetLink;

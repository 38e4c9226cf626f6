//! Typed ID definitions for the engine's entities.
//!
//! Each alias is backed by a zero-sized marker type so the compiler rejects
//! code that mixes IDs of different entities.

pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for tenants (customer organizations). Tenancy enforcement is
/// an external concern; the engine treats the id as trusted input.
pub struct Tenant;

/// Marker type for menu items. Menu items are owned by the surrounding
/// application; the engine only stores links against their ids.
pub struct MenuItem;

/// Marker type for deduplicated master option-set records.
pub struct MasterOptionSetEntity;

/// Marker type for the priced line items of a master option set.
pub struct MasterOptionSetItemEntity;

/// Marker type for menu-item ↔ master-option-set junction rows.
pub struct OptionSetLink;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

/// Typed ID for tenants.
pub type TenantId = Id<Tenant>;

/// Typed ID for menu items.
pub type MenuItemId = Id<MenuItem>;

/// Typed ID for master option sets.
pub type MasterOptionSetId = Id<MasterOptionSetEntity>;

/// Typed ID for master option-set items.
pub type MasterOptionSetItemId = Id<MasterOptionSetItemEntity>;

/// Typed ID for menu-item option-set links.
pub type OptionSetLinkId = Id<OptionSetLink>;

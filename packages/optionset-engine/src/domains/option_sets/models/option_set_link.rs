//! MenuItemOptionSetLink model - junction between menu items and masters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{MasterOptionSetId, MenuItemId, OptionSetLinkId, TenantId};
use crate::domains::option_sets::error::EngineError;

/// One menu-item → master-option-set association. The pair
/// (menu_item_id, master_option_set_id) is unique; rows are created and
/// deleted only by the link reconciler.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MenuItemOptionSetLink {
    pub id: OptionSetLinkId,
    pub menu_item_id: MenuItemId,
    pub master_option_set_id: MasterOptionSetId,
    pub display_order: i32,
    pub tenant_id: TenantId,
    pub created_at: DateTime<Utc>,
}

impl MenuItemOptionSetLink {
    /// All links for a menu item, in display order.
    pub async fn find_for_menu_item(
        menu_item_id: MenuItemId,
        pool: &PgPool,
    ) -> Result<Vec<Self>, EngineError> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM menu_item_option_set_links
            WHERE menu_item_id = $1
            ORDER BY display_order
            "#,
        )
        .bind(menu_item_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Count links referencing a master record. Zero means the master is an
    /// orphan, eligible for the sweep job.
    pub async fn count_for_master(
        master_option_set_id: MasterOptionSetId,
        pool: &PgPool,
    ) -> Result<i64, EngineError> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM menu_item_option_set_links WHERE master_option_set_id = $1",
        )
        .bind(master_option_set_id)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }
}

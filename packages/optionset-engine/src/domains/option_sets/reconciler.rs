//! Link reconciliation: minimal diff between a menu item's desired and
//! existing option-set links.
//!
//! Additions, removals and display-order updates are applied in a single
//! transaction per menu item, so a partial failure never leaves an item with
//! duplicate or missing links. Links present in both sides are never
//! delete-and-recreated. Transactions are scoped per menu item; concurrent
//! reconciliation of the same menu item is unsupported input and must be
//! serialized by the caller.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;

use crate::common::{MasterOptionSetId, MenuItemId, OptionSetLinkId, TenantId};
use crate::domains::option_sets::error::EngineError;
use crate::domains::option_sets::models::MenuItemOptionSetLink;

/// Net effect of one reconciliation. Display-order updates count as
/// unchanged: the link row survives.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ReconciliationResult {
    pub added: usize,
    pub removed: usize,
    pub unchanged: usize,
}

/// Reconcile a menu item's links against the desired ordered list of master
/// option-set ids.
///
/// Order is significant and preserved exactly as given; positions in
/// `desired` become display orders. Duplicate ids keep their first
/// occurrence (the junction table admits each pair at most once). Calling
/// twice with the same list is a no-op on the second call.
pub async fn reconcile(
    menu_item_id: MenuItemId,
    tenant_id: TenantId,
    desired: &[MasterOptionSetId],
    pool: &PgPool,
) -> Result<ReconciliationResult, EngineError> {
    let existing = MenuItemOptionSetLink::find_for_menu_item(menu_item_id, pool).await?;
    let existing_orders: HashMap<MasterOptionSetId, i32> = existing
        .iter()
        .map(|link| (link.master_option_set_id, link.display_order))
        .collect();

    // First occurrence wins; the deduped position is the display order.
    let mut desired_orders: Vec<(MasterOptionSetId, i32)> = Vec::with_capacity(desired.len());
    let mut seen = HashSet::with_capacity(desired.len());
    for &master_id in desired {
        if seen.insert(master_id) {
            desired_orders.push((master_id, desired_orders.len() as i32));
        }
    }

    let to_remove: Vec<MasterOptionSetId> = existing
        .iter()
        .map(|link| link.master_option_set_id)
        .filter(|master_id| !seen.contains(master_id))
        .collect();
    let to_add: Vec<(MasterOptionSetId, i32)> = desired_orders
        .iter()
        .copied()
        .filter(|(master_id, _)| !existing_orders.contains_key(master_id))
        .collect();
    let to_reorder: Vec<(MasterOptionSetId, i32)> = desired_orders
        .iter()
        .copied()
        .filter(|(master_id, order)| {
            existing_orders
                .get(master_id)
                .is_some_and(|current| current != order)
        })
        .collect();

    let result = ReconciliationResult {
        added: to_add.len(),
        removed: to_remove.len(),
        unchanged: desired_orders.len() - to_add.len(),
    };

    if to_remove.is_empty() && to_add.is_empty() && to_reorder.is_empty() {
        debug!(menu_item_id = %menu_item_id, "Links already reconciled");
        return Ok(result);
    }

    let mut tx = pool.begin().await?;

    if !to_remove.is_empty() {
        sqlx::query(
            r#"
            DELETE FROM menu_item_option_set_links
            WHERE menu_item_id = $1 AND master_option_set_id = ANY($2)
            "#,
        )
        .bind(menu_item_id)
        .bind(&to_remove)
        .execute(&mut *tx)
        .await?;
    }

    if !to_add.is_empty() {
        let mut builder = QueryBuilder::<Postgres>::new(
            "INSERT INTO menu_item_option_set_links \
             (id, menu_item_id, master_option_set_id, display_order, tenant_id) ",
        );
        builder.push_values(to_add.iter(), |mut row, (master_id, order)| {
            row.push_bind(OptionSetLinkId::new())
                .push_bind(menu_item_id)
                .push_bind(master_id)
                .push_bind(order)
                .push_bind(tenant_id);
        });
        builder.build().execute(&mut *tx).await?;
    }

    for (master_id, order) in &to_reorder {
        sqlx::query(
            r#"
            UPDATE menu_item_option_set_links
            SET display_order = $3
            WHERE menu_item_id = $1 AND master_option_set_id = $2
            "#,
        )
        .bind(menu_item_id)
        .bind(master_id)
        .bind(order)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    debug!(
        menu_item_id = %menu_item_id,
        added = result.added,
        removed = result.removed,
        reordered = to_reorder.len(),
        "Reconciled option set links"
    );
    Ok(result)
}

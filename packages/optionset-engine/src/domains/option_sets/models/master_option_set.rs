//! MasterOptionSet model - the deduplicated, persisted form of an option set

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{MasterOptionSetId, MasterOptionSetItemId, TenantId};
use crate::domains::option_sets::error::EngineError;
use crate::domains::option_sets::fingerprint::ContentFingerprint;

/// One deduplicated option set. The fingerprint is a creation-time dedup key:
/// it is written once and never recomputed, so later human edits mutate the
/// row in place and stay visible to every linked menu item.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MasterOptionSet {
    pub id: MasterOptionSetId,
    pub tenant_id: TenantId,
    pub fingerprint: ContentFingerprint,
    pub display_name: String,
    pub description: Option<String>,
    pub min_selections: i32,
    /// NULL means unbounded.
    pub max_selections: Option<i32>,
    pub required: bool,
    pub allow_multiple_per_item: bool,
    pub created_at: DateTime<Utc>,
}

/// One priced line item of a master option set. Deleted by cascade with its
/// parent.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MasterOptionSetItem {
    pub id: MasterOptionSetItemId,
    pub master_option_set_id: MasterOptionSetId,
    pub name: String,
    pub price_delta: Decimal,
    pub is_default: bool,
    pub description: Option<String>,
    pub display_order: i32,
}

impl MasterOptionSet {
    /// Find a master record by its tenant-scoped fingerprint.
    pub async fn find_by_fingerprint(
        tenant_id: TenantId,
        fingerprint: &ContentFingerprint,
        pool: &PgPool,
    ) -> Result<Option<Self>, EngineError> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM master_option_sets WHERE tenant_id = $1 AND fingerprint = $2",
        )
        .bind(tenant_id)
        .bind(fingerprint)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// Batch-load masters for a list of fingerprints in one read.
    pub async fn find_by_fingerprints(
        tenant_id: TenantId,
        fingerprints: &[String],
        pool: &PgPool,
    ) -> Result<Vec<Self>, EngineError> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM master_option_sets WHERE tenant_id = $1 AND fingerprint = ANY($2)",
        )
        .bind(tenant_id)
        .bind(fingerprints)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Find a master record by id.
    pub async fn find_by_id(
        id: MasterOptionSetId,
        pool: &PgPool,
    ) -> Result<Option<Self>, EngineError> {
        sqlx::query_as::<_, Self>("SELECT * FROM master_option_sets WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// All line items of this master, in display order.
    pub async fn items(&self, pool: &PgPool) -> Result<Vec<MasterOptionSetItem>, EngineError> {
        MasterOptionSetItem::find_for_master(self.id, pool).await
    }

    /// Apply a human edit in place. Deliberately leaves the fingerprint
    /// untouched: it is a dedup key, not a live content hash, and the edit
    /// is visible to every menu item linked to this record.
    #[allow(clippy::too_many_arguments)]
    pub async fn update_content(
        id: MasterOptionSetId,
        display_name: &str,
        description: Option<&str>,
        min_selections: i32,
        max_selections: Option<i32>,
        required: bool,
        allow_multiple_per_item: bool,
        pool: &PgPool,
    ) -> Result<Self, EngineError> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE master_option_sets
            SET display_name = $2,
                description = $3,
                min_selections = $4,
                max_selections = $5,
                required = $6,
                allow_multiple_per_item = $7
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(display_name)
        .bind(description)
        .bind(min_selections)
        .bind(max_selections)
        .bind(required)
        .bind(allow_multiple_per_item)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Count master records for a tenant.
    pub async fn count_for_tenant(tenant_id: TenantId, pool: &PgPool) -> Result<i64, EngineError> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM master_option_sets WHERE tenant_id = $1",
        )
        .bind(tenant_id)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }
}

impl MasterOptionSetItem {
    /// All items belonging to one master option set, in display order.
    pub async fn find_for_master(
        master_option_set_id: MasterOptionSetId,
        pool: &PgPool,
    ) -> Result<Vec<Self>, EngineError> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM master_option_set_items
            WHERE master_option_set_id = $1
            ORDER BY display_order, name
            "#,
        )
        .bind(master_option_set_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }
}

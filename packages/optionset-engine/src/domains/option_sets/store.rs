//! Master store: content-addressed get-or-create for option sets.
//!
//! Concurrency policy: creation relies on the (tenant_id, fingerprint)
//! uniqueness constraint instead of application-level locking. When two batch
//! runs race to create the same fingerprint, the loser's insert fails with a
//! unique violation, its transaction rolls back, and it re-reads the winner's
//! row.

use std::collections::{HashMap, HashSet};

use sqlx::error::ErrorKind;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use tracing::{debug, info};

use crate::common::{MasterOptionSetId, MasterOptionSetItemId, TenantId};
use crate::domains::option_sets::canonical::{CanonicalOptionSet, DisplayItem};
use crate::domains::option_sets::error::EngineError;
use crate::domains::option_sets::fingerprint::ContentFingerprint;
use crate::domains::option_sets::models::MasterOptionSet;

/// Constraint backing the fingerprint race; violations of it are auto-healed
/// by re-reading, every other violation surfaces as unexpected.
const FINGERPRINT_UNIQUE_CONSTRAINT: &str = "master_option_sets_tenant_id_fingerprint_key";

/// Attempts before giving up on a fingerprint that keeps racing. More than
/// one retry only happens if the winner row disappears between attempts.
const CREATE_RETRY_ATTEMPTS: usize = 3;

/// Result of a batch resolution: every requested fingerprint mapped to its
/// persisted master record, plus creation counts for reporting.
#[derive(Debug)]
pub struct ResolvedMasters {
    pub by_fingerprint: HashMap<ContentFingerprint, MasterOptionSet>,
    pub created: usize,
    pub reused: usize,
}

/// Resolve one fingerprint to its master record, creating it on first sight.
///
/// When the record already exists the representative candidate's data is
/// discarded, even if it differs cosmetically from what was persisted:
/// canonical equality wins.
pub async fn get_or_create(
    tenant_id: TenantId,
    fingerprint: &ContentFingerprint,
    candidate: &CanonicalOptionSet,
    pool: &PgPool,
) -> Result<MasterOptionSet, EngineError> {
    for _ in 0..CREATE_RETRY_ATTEMPTS {
        if let Some(existing) =
            MasterOptionSet::find_by_fingerprint(tenant_id, fingerprint, pool).await?
        {
            return Ok(existing);
        }

        match insert_master(tenant_id, fingerprint, candidate, pool).await? {
            Some(master) => return Ok(master),
            // Lost the race: loop back and read the winner's row.
            None => {
                debug!(
                    tenant_id = %tenant_id,
                    fingerprint = %fingerprint,
                    "Fingerprint race lost, re-reading winner"
                );
            }
        }
    }

    Err(EngineError::UnexpectedConstraintViolation(format!(
        "fingerprint {fingerprint} could not be resolved after {CREATE_RETRY_ATTEMPTS} attempts"
    )))
}

/// Resolve a whole batch of distinct fingerprints: one read for everything
/// that already exists, one transaction of batched inserts for the rest.
pub async fn get_or_create_batch(
    tenant_id: TenantId,
    candidates: &[(ContentFingerprint, CanonicalOptionSet)],
    pool: &PgPool,
) -> Result<ResolvedMasters, EngineError> {
    let mut by_fingerprint: HashMap<ContentFingerprint, MasterOptionSet> =
        HashMap::with_capacity(candidates.len());
    let mut created = 0usize;

    if candidates.is_empty() {
        return Ok(ResolvedMasters {
            by_fingerprint,
            created,
            reused: 0,
        });
    }

    let all_fingerprints: Vec<String> = candidates
        .iter()
        .map(|(fp, _)| fp.as_str().to_owned())
        .collect();
    for master in
        MasterOptionSet::find_by_fingerprints(tenant_id, &all_fingerprints, pool).await?
    {
        by_fingerprint.insert(master.fingerprint.clone(), master);
    }

    for _ in 0..CREATE_RETRY_ATTEMPTS {
        let mut seen = HashSet::new();
        let missing: Vec<&(ContentFingerprint, CanonicalOptionSet)> = candidates
            .iter()
            .filter(|(fp, _)| !by_fingerprint.contains_key(fp) && seen.insert(fp.clone()))
            .collect();
        if missing.is_empty() {
            let reused = by_fingerprint.len() - created;
            info!(
                tenant_id = %tenant_id,
                created = created,
                reused = reused,
                "Resolved option set fingerprints"
            );
            return Ok(ResolvedMasters {
                by_fingerprint,
                created,
                reused,
            });
        }

        match insert_masters(tenant_id, &missing, pool).await? {
            Some(masters) => {
                created += masters.len();
                for master in masters {
                    by_fingerprint.insert(master.fingerprint.clone(), master);
                }
            }
            // A concurrent batch created at least one of these; pick up
            // whatever now exists and retry the remainder.
            None => {
                let missing_fps: Vec<String> = missing
                    .iter()
                    .map(|(fp, _)| fp.as_str().to_owned())
                    .collect();
                debug!(
                    tenant_id = %tenant_id,
                    contended = missing_fps.len(),
                    "Batch fingerprint insert raced, re-reading"
                );
                for master in
                    MasterOptionSet::find_by_fingerprints(tenant_id, &missing_fps, pool).await?
                {
                    by_fingerprint.insert(master.fingerprint.clone(), master);
                }
            }
        }
    }

    // An insert on the final attempt may have resolved everything.
    if candidates
        .iter()
        .all(|(fp, _)| by_fingerprint.contains_key(fp))
    {
        let reused = by_fingerprint.len() - created;
        return Ok(ResolvedMasters {
            by_fingerprint,
            created,
            reused,
        });
    }

    Err(EngineError::UnexpectedConstraintViolation(format!(
        "batch of {} fingerprints could not be resolved after {CREATE_RETRY_ATTEMPTS} attempts",
        candidates.len()
    )))
}

/// Delete master records with no remaining links. This is the explicit,
/// idempotent orphan sweep; reconciliation never deletes masters implicitly.
/// Items are removed by cascade.
pub async fn sweep_orphans(tenant_id: TenantId, pool: &PgPool) -> Result<u64, EngineError> {
    let result = sqlx::query(
        r#"
        DELETE FROM master_option_sets m
        WHERE m.tenant_id = $1
          AND NOT EXISTS (
              SELECT 1 FROM menu_item_option_set_links l
              WHERE l.master_option_set_id = m.id
          )
        "#,
    )
    .bind(tenant_id)
    .execute(pool)
    .await?;

    let swept = result.rows_affected();
    if swept > 0 {
        info!(tenant_id = %tenant_id, swept = swept, "Swept orphaned master option sets");
    }
    Ok(swept)
}

/// Insert one master plus its items atomically. Returns `None` when the
/// insert lost the fingerprint race.
async fn insert_master(
    tenant_id: TenantId,
    fingerprint: &ContentFingerprint,
    candidate: &CanonicalOptionSet,
    pool: &PgPool,
) -> Result<Option<MasterOptionSet>, EngineError> {
    let mut tx = pool.begin().await?;

    let inserted = sqlx::query_as::<_, MasterOptionSet>(
        r#"
        INSERT INTO master_option_sets
            (id, tenant_id, fingerprint, display_name, description,
             min_selections, max_selections, required, allow_multiple_per_item)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(MasterOptionSetId::new())
    .bind(tenant_id)
    .bind(fingerprint)
    .bind(&candidate.display_name)
    .bind(candidate.description.as_deref())
    .bind(candidate.min_selections)
    .bind(candidate.max_selections)
    .bind(candidate.required)
    .bind(candidate.allow_multiple_per_item)
    .fetch_one(&mut *tx)
    .await;

    let master = match inserted {
        Ok(master) => master,
        Err(err) if is_fingerprint_race(&err) => return Ok(None),
        Err(err) => return Err(err.into()),
    };

    insert_items(&mut tx, master.id, &candidate.display_items).await?;
    tx.commit().await?;

    Ok(Some(master))
}

/// Insert several masters plus all their items in one transaction. Returns
/// `None` when any row lost the fingerprint race (the whole transaction rolls
/// back; the caller re-reads and retries the remainder).
async fn insert_masters(
    tenant_id: TenantId,
    candidates: &[&(ContentFingerprint, CanonicalOptionSet)],
    pool: &PgPool,
) -> Result<Option<Vec<MasterOptionSet>>, EngineError> {
    let mut tx = pool.begin().await?;

    let mut builder = QueryBuilder::<Postgres>::new(
        "INSERT INTO master_option_sets \
         (id, tenant_id, fingerprint, display_name, description, \
          min_selections, max_selections, required, allow_multiple_per_item) ",
    );
    builder.push_values(candidates.iter(), |mut row, (fp, candidate)| {
        row.push_bind(MasterOptionSetId::new())
            .push_bind(tenant_id)
            .push_bind(fp)
            .push_bind(&candidate.display_name)
            .push_bind(candidate.description.as_deref())
            .push_bind(candidate.min_selections)
            .push_bind(candidate.max_selections)
            .push_bind(candidate.required)
            .push_bind(candidate.allow_multiple_per_item);
    });
    builder.push(" RETURNING *");

    let inserted = builder
        .build_query_as::<MasterOptionSet>()
        .fetch_all(&mut *tx)
        .await;

    let masters = match inserted {
        Ok(masters) => masters,
        Err(err) if is_fingerprint_race(&err) => return Ok(None),
        Err(err) => return Err(err.into()),
    };

    let by_fingerprint: HashMap<&str, MasterOptionSetId> = masters
        .iter()
        .map(|m| (m.fingerprint.as_str(), m.id))
        .collect();
    for (fp, candidate) in candidates {
        // Inserted just above, present by construction.
        if let Some(&master_id) = by_fingerprint.get(fp.as_str()) {
            insert_items(&mut tx, master_id, &candidate.display_items).await?;
        }
    }
    tx.commit().await?;

    Ok(Some(masters))
}

async fn insert_items(
    tx: &mut Transaction<'_, Postgres>,
    master_option_set_id: MasterOptionSetId,
    items: &[DisplayItem],
) -> Result<(), EngineError> {
    if items.is_empty() {
        return Ok(());
    }

    let mut builder = QueryBuilder::<Postgres>::new(
        "INSERT INTO master_option_set_items \
         (id, master_option_set_id, name, price_delta, is_default, description, display_order) ",
    );
    builder.push_values(items.iter(), |mut row, item| {
        row.push_bind(MasterOptionSetItemId::new())
            .push_bind(master_option_set_id)
            .push_bind(&item.name)
            .push_bind(item.price_delta)
            .push_bind(item.is_default)
            .push_bind(item.description.as_deref())
            .push_bind(item.display_order);
    });
    builder.build().execute(&mut **tx).await?;

    Ok(())
}

/// The one unique violation the store expects and heals on its own.
fn is_fingerprint_race(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(dbe) => {
            matches!(dbe.kind(), ErrorKind::UniqueViolation)
                && dbe.constraint() == Some(FINGERPRINT_UNIQUE_CONSTRAINT)
        }
        _ => false,
    }
}

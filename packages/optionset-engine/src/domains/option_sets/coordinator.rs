//! Batch coordinator: drives canonicalization, fingerprinting, master
//! resolution and per-item link reconciliation across a whole extraction
//! result.
//!
//! Identical fingerprints are deduplicated within the batch before the store
//! is touched, so 26 items sharing "Add Sides" cost one resolution, not 26.
//! Failure policy: a malformed candidate or a failed per-item reconciliation
//! is recorded and the batch continues; a failure resolving the master
//! records aborts the batch, since no item can proceed without resolved ids.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::common::{MasterOptionSetId, MenuItemId, TenantId};
use crate::domains::option_sets::canonical::{canonicalize, CanonicalOptionSet};
use crate::domains::option_sets::error::EngineError;
use crate::domains::option_sets::fingerprint::{fingerprint, ContentFingerprint};
use crate::domains::option_sets::models::OptionSetCandidate;
use crate::domains::option_sets::{reconciler, store};

/// Summary of one batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    /// Distinct fingerprints seen across the whole batch.
    pub distinct_fingerprints: usize,
    pub masters_created: usize,
    pub masters_reused: usize,
    pub links_added: usize,
    pub links_removed: usize,
    /// Candidates rejected by the canonicalizer. Never aborts the batch.
    pub rejected_candidates: Vec<RejectedCandidate>,
    /// Menu items whose link reconciliation failed. The rest of the batch
    /// still ran.
    pub item_failures: Vec<ItemFailure>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RejectedCandidate {
    pub menu_item_id: MenuItemId,
    pub candidate_name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemFailure {
    pub menu_item_id: MenuItemId,
    pub error: String,
}

/// Run the engine over a whole extraction result: zero or more option-set
/// candidates per menu item. This is the sole entry point consumed by the
/// extraction pipeline.
pub async fn run(
    tenant_id: TenantId,
    extraction: &HashMap<MenuItemId, Vec<OptionSetCandidate>>,
    pool: &PgPool,
) -> Result<BatchReport, EngineError> {
    info!(
        tenant_id = %tenant_id,
        menu_items = extraction.len(),
        "Starting option set batch run"
    );

    let mut report = BatchReport::default();

    // Canonicalize and hash everything up front, deduplicating fingerprints
    // within the batch before the store is involved.
    let mut distinct: Vec<(ContentFingerprint, CanonicalOptionSet)> = Vec::new();
    let mut seen: HashSet<ContentFingerprint> = HashSet::new();
    let mut per_item: Vec<(MenuItemId, Vec<ContentFingerprint>)> =
        Vec::with_capacity(extraction.len());

    for (&menu_item_id, candidates) in extraction {
        let mut item_fingerprints: Vec<ContentFingerprint> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let canonical = match canonicalize(candidate) {
                Ok(canonical) => canonical,
                Err(EngineError::MalformedCandidate(reason)) => {
                    warn!(
                        menu_item_id = %menu_item_id,
                        candidate_name = %candidate.name,
                        reason = %reason,
                        "Rejected malformed option set candidate"
                    );
                    report.rejected_candidates.push(RejectedCandidate {
                        menu_item_id,
                        candidate_name: candidate.name.clone(),
                        reason,
                    });
                    continue;
                }
                Err(other) => return Err(other),
            };

            let fp = fingerprint(tenant_id, &canonical);
            if !item_fingerprints.contains(&fp) {
                item_fingerprints.push(fp.clone());
            }
            if seen.insert(fp.clone()) {
                distinct.push((fp, canonical));
            }
        }
        per_item.push((menu_item_id, item_fingerprints));
    }
    report.distinct_fingerprints = distinct.len();

    // One resolution round trip for the full distinct set. Fatal on failure:
    // without master ids no item-level progress is safe.
    let resolved = store::get_or_create_batch(tenant_id, &distinct, pool).await?;
    report.masters_created = resolved.created;
    report.masters_reused = resolved.reused;

    for (menu_item_id, item_fingerprints) in per_item {
        let mut desired: Vec<MasterOptionSetId> = Vec::with_capacity(item_fingerprints.len());
        for fp in &item_fingerprints {
            match resolved.by_fingerprint.get(fp) {
                Some(master) => desired.push(master.id),
                None => {
                    // Unreachable when the store upholds its contract; fail
                    // just this item rather than the batch.
                    report.item_failures.push(ItemFailure {
                        menu_item_id,
                        error: format!("fingerprint {fp} missing from batch resolution"),
                    });
                }
            }
        }
        if desired.len() != item_fingerprints.len() {
            continue;
        }

        match reconciler::reconcile(menu_item_id, tenant_id, &desired, pool).await {
            Ok(result) => {
                report.links_added += result.added;
                report.links_removed += result.removed;
            }
            Err(source) => {
                let error = EngineError::ReconciliationFailure {
                    menu_item_id,
                    source: Box::new(source),
                };
                warn!(
                    menu_item_id = %menu_item_id,
                    error = %error,
                    "Link reconciliation failed, continuing batch"
                );
                report.item_failures.push(ItemFailure {
                    menu_item_id,
                    error: error.to_string(),
                });
            }
        }
    }

    info!(
        tenant_id = %tenant_id,
        distinct_fingerprints = report.distinct_fingerprints,
        masters_created = report.masters_created,
        masters_reused = report.masters_reused,
        links_added = report.links_added,
        links_removed = report.links_removed,
        rejected = report.rejected_candidates.len(),
        failed_items = report.item_failures.len(),
        "Completed option set batch run"
    );
    Ok(report)
}

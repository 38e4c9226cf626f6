//! Integration tests for link reconciliation: minimal diffs, idempotence and
//! display-order preservation.

mod common;

use common::*;
use optionset_engine::common::{MasterOptionSetId, MenuItemId, TenantId};
use optionset_engine::domains::option_sets::models::{MenuItemOptionSetLink, OptionSetCandidate};
use optionset_engine::domains::option_sets::{canonicalize, fingerprint, reconciler, store};
use sqlx::PgPool;

/// Create a master record for each candidate and return the ids in order.
async fn masters_for(
    tenant: TenantId,
    candidates: &[OptionSetCandidate],
    pool: &PgPool,
) -> Vec<MasterOptionSetId> {
    let mut ids = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let canonical = canonicalize(candidate).unwrap();
        let fp = fingerprint(tenant, &canonical);
        let master = store::get_or_create(tenant, &fp, &canonical, pool)
            .await
            .unwrap();
        ids.push(master.id);
    }
    ids
}

fn named_candidate(name: &str) -> OptionSetCandidate {
    let mut candidate = add_sides_candidate();
    candidate.name = name.to_string();
    candidate
}

#[tokio::test]
async fn first_reconcile_adds_all_links_in_order() {
    let pool = test_pool().await;
    let tenant = TenantId::new();
    let menu_item = MenuItemId::new();

    let masters = masters_for(
        tenant,
        &[named_candidate("A"), named_candidate("B"), named_candidate("C")],
        &pool,
    )
    .await;

    let result = reconciler::reconcile(menu_item, tenant, &masters, &pool)
        .await
        .unwrap();
    assert_eq!(result.added, 3);
    assert_eq!(result.removed, 0);
    assert_eq!(result.unchanged, 0);

    let links = MenuItemOptionSetLink::find_for_menu_item(menu_item, &pool)
        .await
        .unwrap();
    let linked: Vec<_> = links.iter().map(|l| l.master_option_set_id).collect();
    assert_eq!(linked, masters);
    let orders: Vec<_> = links.iter().map(|l| l.display_order).collect();
    assert_eq!(orders, vec![0, 1, 2]);
}

#[tokio::test]
async fn reconcile_applies_minimal_diff() {
    let pool = test_pool().await;
    let tenant = TenantId::new();
    let menu_item = MenuItemId::new();

    let masters = masters_for(
        tenant,
        &[
            named_candidate("A"),
            named_candidate("B"),
            named_candidate("C"),
            named_candidate("D"),
        ],
        &pool,
    )
    .await;
    let (a, b, c, d) = (masters[0], masters[1], masters[2], masters[3]);

    reconciler::reconcile(menu_item, tenant, &[a, b, c], &pool)
        .await
        .unwrap();
    let before = MenuItemOptionSetLink::find_for_menu_item(menu_item, &pool)
        .await
        .unwrap();

    // {A, B, C} -> {B, C, D}: exactly A removed, exactly D added
    let result = reconciler::reconcile(menu_item, tenant, &[b, c, d], &pool)
        .await
        .unwrap();
    assert_eq!(result.added, 1);
    assert_eq!(result.removed, 1);
    assert_eq!(result.unchanged, 2);

    let after = MenuItemOptionSetLink::find_for_menu_item(menu_item, &pool)
        .await
        .unwrap();
    let linked: Vec<_> = after.iter().map(|l| l.master_option_set_id).collect();
    assert_eq!(linked, vec![b, c, d]);

    // B and C were not delete-and-recreated: their row ids survive
    let before_id = |master| {
        before
            .iter()
            .find(|l| l.master_option_set_id == master)
            .map(|l| l.id)
            .unwrap()
    };
    let after_id = |master| {
        after
            .iter()
            .find(|l| l.master_option_set_id == master)
            .map(|l| l.id)
            .unwrap()
    };
    assert_eq!(before_id(b), after_id(b));
    assert_eq!(before_id(c), after_id(c));
}

#[tokio::test]
async fn reconcile_is_idempotent() {
    let pool = test_pool().await;
    let tenant = TenantId::new();
    let menu_item = MenuItemId::new();

    let masters = masters_for(tenant, &[named_candidate("A"), named_candidate("B")], &pool).await;

    reconciler::reconcile(menu_item, tenant, &masters, &pool)
        .await
        .unwrap();
    let second = reconciler::reconcile(menu_item, tenant, &masters, &pool)
        .await
        .unwrap();

    assert_eq!(second.added, 0);
    assert_eq!(second.removed, 0);
    assert_eq!(second.unchanged, 2);
}

#[tokio::test]
async fn reorder_updates_display_order_without_recreating_links() {
    let pool = test_pool().await;
    let tenant = TenantId::new();
    let menu_item = MenuItemId::new();

    let masters = masters_for(tenant, &[named_candidate("A"), named_candidate("B")], &pool).await;
    let (a, b) = (masters[0], masters[1]);

    reconciler::reconcile(menu_item, tenant, &[a, b], &pool)
        .await
        .unwrap();
    let before = MenuItemOptionSetLink::find_for_menu_item(menu_item, &pool)
        .await
        .unwrap();

    let result = reconciler::reconcile(menu_item, tenant, &[b, a], &pool)
        .await
        .unwrap();
    assert_eq!(result.added, 0);
    assert_eq!(result.removed, 0);
    assert_eq!(result.unchanged, 2);

    let after = MenuItemOptionSetLink::find_for_menu_item(menu_item, &pool)
        .await
        .unwrap();
    let linked: Vec<_> = after.iter().map(|l| l.master_option_set_id).collect();
    assert_eq!(linked, vec![b, a]);

    let mut before_ids: Vec<_> = before.iter().map(|l| l.id).collect();
    let mut after_ids: Vec<_> = after.iter().map(|l| l.id).collect();
    before_ids.sort();
    after_ids.sort();
    assert_eq!(before_ids, after_ids);
}

#[tokio::test]
async fn duplicate_desired_ids_keep_first_occurrence() {
    let pool = test_pool().await;
    let tenant = TenantId::new();
    let menu_item = MenuItemId::new();

    let masters = masters_for(tenant, &[named_candidate("A"), named_candidate("B")], &pool).await;
    let (a, b) = (masters[0], masters[1]);

    let result = reconciler::reconcile(menu_item, tenant, &[a, b, a], &pool)
        .await
        .unwrap();
    assert_eq!(result.added, 2);

    let links = MenuItemOptionSetLink::find_for_menu_item(menu_item, &pool)
        .await
        .unwrap();
    let linked: Vec<_> = links.iter().map(|l| l.master_option_set_id).collect();
    assert_eq!(linked, vec![a, b]);
}

#[tokio::test]
async fn empty_desired_list_removes_all_links() {
    let pool = test_pool().await;
    let tenant = TenantId::new();
    let menu_item = MenuItemId::new();

    let masters = masters_for(tenant, &[named_candidate("A"), named_candidate("B")], &pool).await;
    reconciler::reconcile(menu_item, tenant, &masters, &pool)
        .await
        .unwrap();

    let result = reconciler::reconcile(menu_item, tenant, &[], &pool)
        .await
        .unwrap();
    assert_eq!(result.added, 0);
    assert_eq!(result.removed, 2);
    assert_eq!(result.unchanged, 0);

    let links = MenuItemOptionSetLink::find_for_menu_item(menu_item, &pool)
        .await
        .unwrap();
    assert!(links.is_empty());
}

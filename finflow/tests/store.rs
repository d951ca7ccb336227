use chrono::{Days, Local};
use finflow::entity::is_tentative;
use finflow::testing::{fixtures, ScriptedRemote};
use finflow::Store;
use finflow_api::endpoints::{
    budgets::BudgetUpdate,
    categories::NewCategory,
    transactions::{TransactionFilters, TransactionUpdate},
    TransactionType,
};
use finflow_api::{ApiError, ErrorKind};
use rust_decimal::Decimal;
use std::sync::Arc;

fn setup() -> (Arc<ScriptedRemote>, Arc<Store<ScriptedRemote>>) {
    let remote = Arc::new(ScriptedRemote::new());
    let store = Arc::new(Store::new(remote.clone()));
    (remote, store)
}

/// Let spawned operations run up to their next suspension point.
async fn run_pending() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

fn transaction_ids(store: &Store<ScriptedRemote>) -> Vec<String> {
    store.transactions().into_iter().map(|t| t.id).collect()
}

async fn seed(remote: &ScriptedRemote, store: &Store<ScriptedRemote>, ids: &[&str]) {
    let items = ids
        .iter()
        .enumerate()
        .map(|(i, id)| fixtures::transaction(id, (i as i64 + 1) * 10))
        .collect();
    remote.transactions.list.ok(items);
    store
        .load_transactions(TransactionFilters::new())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_create_shows_placeholder_then_server_entity() {
    let (remote, store) = setup();
    let reply = remote.transactions.create.defer();
    assert!(store.transactions().is_empty());

    let task = tokio::spawn({
        let store = store.clone();
        async move { store.create_transaction(fixtures::new_transaction(50)).await }
    });
    run_pending().await;

    let during = store.transactions();
    assert_eq!(during.len(), 1);
    assert!(is_tentative(&during[0].id));
    assert_eq!(during[0].amount, Decimal::from(50));
    assert!(store.loading());

    reply.send(Ok(fixtures::transaction("txn-1", 50))).unwrap();
    let created = task.await.unwrap().unwrap();

    assert_eq!(created.id, "txn-1");
    assert_eq!(transaction_ids(&store), vec!["txn-1"]);
    assert!(!store.loading());
    assert_eq!(store.error(), None);
}

#[tokio::test]
async fn test_created_entity_keeps_placeholder_position() {
    let (remote, store) = setup();
    seed(&remote, &store, &["txn-1", "txn-2"]).await;

    remote.transactions.create.ok(fixtures::transaction("txn-3", 30));
    store
        .create_transaction(fixtures::new_transaction(30))
        .await
        .unwrap();

    assert_eq!(transaction_ids(&store), vec!["txn-3", "txn-1", "txn-2"]);
}

#[tokio::test]
async fn test_failed_create_removes_placeholder() {
    let (remote, store) = setup();
    seed(&remote, &store, &["txn-1"]).await;

    remote
        .transactions
        .create
        .err(ApiError::from_status(422, r#"{"message":"Category not found"}"#));
    let err = store
        .create_transaction(fixtures::new_transaction(5))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Category not found");
    assert_eq!(err.kind(), ErrorKind::Rejection);
    assert_eq!(transaction_ids(&store), vec!["txn-1"]);
    assert_eq!(store.error().as_deref(), Some("Category not found"));
    assert!(!store.loading());
}

#[tokio::test]
async fn test_concurrent_creates_get_distinct_placeholders() {
    let (remote, store) = setup();
    let first = remote.transactions.create.defer();
    let second = remote.transactions.create.defer();

    let a = tokio::spawn({
        let store = store.clone();
        async move { store.create_transaction(fixtures::new_transaction(1)).await }
    });
    let b = tokio::spawn({
        let store = store.clone();
        async move { store.create_transaction(fixtures::new_transaction(2)).await }
    });
    run_pending().await;

    let ids = transaction_ids(&store);
    assert_eq!(ids.len(), 2);
    assert!(ids.iter().all(|id| is_tentative(id)));
    assert_ne!(ids[0], ids[1]);

    // A failed create sweeps every placeholder, including the other one
    first.send(Err(ApiError::transport("reset"))).unwrap();
    assert!(a.await.unwrap().is_err());
    assert!(store.transactions().is_empty());
    assert!(store.loading());

    // The surviving call still lands its entity
    second.send(Ok(fixtures::transaction("txn-2", 2))).unwrap();
    b.await.unwrap().unwrap();
    assert_eq!(transaction_ids(&store), vec!["txn-2"]);
    assert!(!store.loading());
}

#[tokio::test]
async fn test_failed_update_restores_collection() {
    let (remote, store) = setup();
    seed(&remote, &store, &["txn-1", "txn-2", "txn-3"]).await;
    let before = store.transactions();

    let reply = remote.transactions.update.defer();
    let task = tokio::spawn({
        let store = store.clone();
        async move {
            store
                .update_transaction("txn-2", TransactionUpdate::new().amount(Decimal::from(999)))
                .await
        }
    });
    run_pending().await;
    assert_eq!(store.transactions()[1].amount, Decimal::from(999));

    reply
        .send(Err(ApiError::status(500, "Server error, please try again later")))
        .unwrap();
    let err = task.await.unwrap().unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Server);
    assert_eq!(store.transactions(), before);
    assert!(store.error().is_some());
    assert!(!store.loading());
}

#[tokio::test]
async fn test_successful_update_takes_server_entity() {
    let (remote, store) = setup();
    seed(&remote, &store, &["txn-1", "txn-2", "txn-3"]).await;

    let mut server = fixtures::transaction("txn-2", 75);
    server.description = Some("normalized by server".to_string());
    remote.transactions.update.ok(server.clone());

    let updated = store
        .update_transaction("txn-2", TransactionUpdate::new().amount(Decimal::from(70)))
        .await
        .unwrap();

    assert_eq!(updated, server);
    assert_eq!(store.transactions()[1], server);
    assert_eq!(
        remote.transactions.update.requests()[0].0,
        "txn-2".to_string()
    );
}

#[tokio::test]
async fn test_late_failure_does_not_clobber_newer_commit() {
    let (remote, store) = setup();
    seed(&remote, &store, &["txn-1"]).await;

    let older = remote.transactions.update.defer();
    let newer = remote.transactions.update.defer();

    let a = tokio::spawn({
        let store = store.clone();
        async move {
            store
                .update_transaction("txn-1", TransactionUpdate::new().amount(Decimal::from(11)))
                .await
        }
    });
    run_pending().await;
    let b = tokio::spawn({
        let store = store.clone();
        async move {
            store
                .update_transaction("txn-1", TransactionUpdate::new().amount(Decimal::from(12)))
                .await
        }
    });
    run_pending().await;

    let server = fixtures::transaction("txn-1", 12);
    newer.send(Ok(server.clone())).unwrap();
    b.await.unwrap().unwrap();

    older.send(Err(ApiError::status(409, "Conflict"))).unwrap();
    assert!(a.await.unwrap().is_err());

    assert_eq!(store.transactions(), vec![server]);
    assert_eq!(store.error().as_deref(), Some("Conflict"));
}

#[tokio::test]
async fn test_failed_update_keeps_position_during_create() {
    let (remote, store) = setup();
    seed(&remote, &store, &["txn-1", "txn-2", "txn-3"]).await;

    let update_reply = remote.transactions.update.defer();
    let create_reply = remote.transactions.create.defer();
    let update = tokio::spawn({
        let store = store.clone();
        async move {
            store
                .update_transaction("txn-2", TransactionUpdate::new().amount(Decimal::from(99)))
                .await
        }
    });
    run_pending().await;
    let create = tokio::spawn({
        let store = store.clone();
        async move { store.create_transaction(fixtures::new_transaction(40)).await }
    });
    run_pending().await;

    update_reply
        .send(Err(ApiError::status(500, "Server error, please try again later")))
        .unwrap();
    assert!(update.await.unwrap().is_err());

    let confirmed: Vec<String> = transaction_ids(&store)
        .into_iter()
        .filter(|id| !is_tentative(id))
        .collect();
    assert_eq!(confirmed, vec!["txn-1", "txn-2", "txn-3"]);
    assert_eq!(store.transactions()[2].amount, Decimal::from(20));

    create_reply.send(Ok(fixtures::transaction("txn-4", 40))).unwrap();
    create.await.unwrap().unwrap();
    assert_eq!(transaction_ids(&store), vec!["txn-4", "txn-1", "txn-2", "txn-3"]);
}

#[tokio::test]
async fn test_overlapping_updates_that_both_fail_restore_original() {
    let (remote, store) = setup();
    seed(&remote, &store, &["txn-1"]).await;
    let before = store.transactions();

    let older = remote.transactions.update.defer();
    let newer = remote.transactions.update.defer();
    let a = tokio::spawn({
        let store = store.clone();
        async move {
            store
                .update_transaction("txn-1", TransactionUpdate::new().amount(Decimal::from(11)))
                .await
        }
    });
    run_pending().await;
    let b = tokio::spawn({
        let store = store.clone();
        async move {
            store
                .update_transaction("txn-1", TransactionUpdate::new().amount(Decimal::from(12)))
                .await
        }
    });
    run_pending().await;

    newer.send(Err(ApiError::status(409, "Conflict"))).unwrap();
    assert!(b.await.unwrap().is_err());
    older.send(Err(ApiError::status(409, "Conflict"))).unwrap();
    assert!(a.await.unwrap().is_err());

    assert_eq!(store.transactions(), before);
    assert_eq!(store.transactions()[0].amount, Decimal::from(10));
    assert!(!store.loading());
}

#[tokio::test]
async fn test_update_and_delete_that_both_fail_restore_original() {
    let (remote, store) = setup();
    seed(&remote, &store, &["txn-1", "txn-2", "txn-3"]).await;
    let before = store.transactions();

    let update_reply = remote.transactions.update.defer();
    let delete_reply = remote.transactions.delete.defer();
    let update = tokio::spawn({
        let store = store.clone();
        async move {
            store
                .update_transaction("txn-2", TransactionUpdate::new().amount(Decimal::from(99)))
                .await
        }
    });
    run_pending().await;
    let delete = tokio::spawn({
        let store = store.clone();
        async move { store.delete_transaction("txn-2").await }
    });
    run_pending().await;
    assert_eq!(transaction_ids(&store), vec!["txn-1", "txn-3"]);

    delete_reply
        .send(Err(ApiError::status(400, "Delete failed")))
        .unwrap();
    assert!(delete.await.unwrap().is_err());
    update_reply
        .send(Err(ApiError::status(400, "Update failed")))
        .unwrap();
    assert!(update.await.unwrap().is_err());

    assert_eq!(store.transactions(), before);
}

#[tokio::test]
async fn test_failed_delete_keeps_entity_and_reports_error() {
    let (remote, store) = setup();
    seed(&remote, &store, &["txn-1"]).await;

    let reply = remote.transactions.delete.defer();
    let task = tokio::spawn({
        let store = store.clone();
        async move { store.delete_transaction("txn-1").await }
    });
    run_pending().await;
    assert!(store.transactions().is_empty());

    reply.send(Err(ApiError::status(400, "Delete failed"))).unwrap();
    let err = task.await.unwrap().unwrap_err();

    assert_eq!(err.to_string(), "Delete failed");
    assert_eq!(transaction_ids(&store), vec!["txn-1"]);
    assert_eq!(store.error().as_deref(), Some("Delete failed"));
    assert!(!store.loading());
}

#[tokio::test]
async fn test_delete_restores_middle_entity_in_place() {
    let (remote, store) = setup();
    seed(&remote, &store, &["txn-1", "txn-2", "txn-3"]).await;

    remote
        .transactions
        .delete
        .err(ApiError::from_status(404, ""));
    let err = store.delete_transaction("txn-2").await.unwrap_err();

    assert_eq!(err.to_string(), "Resource not found");
    assert_eq!(transaction_ids(&store), vec!["txn-1", "txn-2", "txn-3"]);
}

#[tokio::test]
async fn test_successful_delete() {
    let (remote, store) = setup();
    seed(&remote, &store, &["txn-1", "txn-2"]).await;

    remote.transactions.delete.ok(());
    store.delete_transaction("txn-1").await.unwrap();

    assert_eq!(transaction_ids(&store), vec!["txn-2"]);
    assert_eq!(remote.transactions.delete.requests(), vec!["txn-1".to_string()]);
}

#[tokio::test]
async fn test_failed_load_keeps_previous_collection() {
    let (remote, store) = setup();
    seed(&remote, &store, &["txn-1", "txn-2"]).await;

    remote
        .transactions
        .list
        .err(ApiError::transport("connection refused"));
    let err = store
        .load_transactions(TransactionFilters::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(transaction_ids(&store), vec!["txn-1", "txn-2"]);
    assert_eq!(
        store.error().as_deref(),
        Some("Unable to connect to server")
    );
    assert!(!store.loading());
}

#[tokio::test]
async fn test_loading_stays_set_until_last_operation_settles() {
    let (remote, store) = setup();
    let first = remote.transactions.list.defer();
    let second = remote.categories.list.defer();

    let a = tokio::spawn({
        let store = store.clone();
        async move { store.load_transactions(TransactionFilters::new()).await }
    });
    let b = tokio::spawn({
        let store = store.clone();
        async move { store.load_categories(None).await }
    });
    run_pending().await;
    assert!(store.loading());

    first.send(Ok(vec![fixtures::transaction("txn-1", 1)])).unwrap();
    a.await.unwrap().unwrap();
    assert!(store.loading());

    second.send(Ok(vec![fixtures::category("cat-1", "Food")])).unwrap();
    b.await.unwrap().unwrap();
    assert!(!store.loading());
    assert_eq!(store.categories().len(), 1);
}

#[tokio::test]
async fn test_aborted_operation_releases_loading() {
    let (remote, store) = setup();
    let _reply = remote.transactions.list.defer();

    let task = tokio::spawn({
        let store = store.clone();
        async move { store.load_transactions(TransactionFilters::new()).await }
    });
    run_pending().await;
    assert!(store.loading());

    task.abort();
    assert!(task.await.unwrap_err().is_cancelled());
    assert!(!store.loading());
}

#[tokio::test]
async fn test_racing_loads_last_response_wins() {
    let (remote, store) = setup();
    let first = remote.transactions.list.defer();
    let second = remote.transactions.list.defer();

    let a = tokio::spawn({
        let store = store.clone();
        async move { store.load_transactions(TransactionFilters::new()).await }
    });
    run_pending().await;
    let b = tokio::spawn({
        let store = store.clone();
        async move { store.load_transactions(TransactionFilters::new().page(2u32)).await }
    });
    run_pending().await;

    second.send(Ok(vec![fixtures::transaction("txn-2", 2)])).unwrap();
    b.await.unwrap().unwrap();
    first.send(Ok(vec![fixtures::transaction("txn-1", 1)])).unwrap();
    a.await.unwrap().unwrap();

    assert_eq!(transaction_ids(&store), vec!["txn-1"]);
}

#[tokio::test]
async fn test_operations_clear_previous_error() {
    let (remote, store) = setup();
    store.set_error(Some("stale banner".to_string()));

    remote.budgets.list.ok(vec![fixtures::budget("b-1", 300)]);
    store.load_budgets().await.unwrap();
    assert_eq!(store.error(), None);

    store.set_error(Some("another".to_string()));
    store.clear_error();
    assert_eq!(store.error(), None);
}

#[tokio::test]
async fn test_category_create_and_budget_update_follow_same_rules() {
    let (remote, store) = setup();

    remote
        .categories
        .create
        .ok(fixtures::category("cat-9", "Travel"));
    let category = store
        .create_category(NewCategory::new("Travel", TransactionType::Expense, "#0ea5e9"))
        .await
        .unwrap();
    assert_eq!(category.id, "cat-9");
    assert_eq!(store.categories(), vec![category]);

    remote.budgets.list.ok(vec![fixtures::budget("b-1", 300)]);
    store.load_budgets().await.unwrap();
    let before = store.budgets();

    remote
        .budgets
        .update
        .err(ApiError::from_status(422, r#"{"detail":"Amount must be positive"}"#));
    let err = store
        .update_budget("b-1", BudgetUpdate::new().amount(Decimal::from(-5)))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Amount must be positive");
    assert_eq!(store.budgets(), before);
}

#[tokio::test]
async fn test_analytics_default_to_last_thirty_days() {
    let (remote, store) = setup();
    let today = Local::now().date_naive();
    let month_ago = today.checked_sub_days(Days::new(30)).unwrap();

    remote.summary.ok(fixtures::summary(1000, 400));
    store.load_summary(None, None).await.unwrap();
    assert_eq!(remote.summary.requests(), vec![(month_ago, today)]);
    assert_eq!(store.summary().unwrap().balance, Decimal::from(600));

    remote.top_categories.ok(Vec::new());
    store
        .load_top_categories(None, None, None, None)
        .await
        .unwrap();
    assert_eq!(
        remote.top_categories.requests(),
        vec![(5, None, month_ago, today)]
    );
}

#[tokio::test]
async fn test_failed_analytics_load_reports_error() {
    let (remote, store) = setup();
    remote.trends.err(ApiError::from_status(500, ""));

    let err = store.load_trends(None, None, None).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Server);
    assert!(store.trends().is_empty());
    assert_eq!(
        store.error().as_deref(),
        Some("Server error, please try again later")
    );
}

mod common;

use std::sync::Arc;

use nutrition_tracker::server::ProfilePayload;
use nutrition_tracker::{JsonFileStore, SqliteStore, StateStore};

use common::{StaticFdc, start_with};

/// Logs a day through the server, restarts on the same store, and checks
/// that the recomputed report is unchanged.
async fn totals_survive_restart(open: impl AsyncFn() -> Arc<dyn StateStore>) {
    let before = {
        let h = start_with(open().await, StaticFdc::default());
        h.handle
            .create_profile(ProfilePayload {
                first_name: "Lee".into(),
                last_name: "Kim".into(),
                age: 28,
                weight: 62.5,
                height: 168.0,
                gender: "female".into(),
                goal: "endurance".into(),
            })
            .await
            .unwrap();
        h.handle.add_meal("breakfast").await.unwrap();
        h.handle.add_food(0, "f2", 80.0).await.unwrap();
        h.handle.add_food(0, "f3", 120.0).await.unwrap();
        h.handle.add_meal("dinner").await.unwrap();
        h.handle.add_food(1, "f5", 150.0).await.unwrap();
        let report = h.handle.get_report().await.unwrap();
        drop(h.handle);
        h.server.await.unwrap();
        report
    };

    let h = start_with(open().await, StaticFdc::default());
    let after = h.handle.get_report().await.unwrap();
    assert_eq!(after.meal_count, 2);
    assert!(after.totals.approx_eq(&before.totals, 1e-9));
    assert!((after.totals.calories - (293.6 + 106.8 + 312.0)).abs() < 1e-9);

    let meals = h.handle.list_meals().await.unwrap();
    assert_eq!(meals[0].food_items.len(), 2);
    assert_eq!(meals[1].food_items[0].food_id, "f5");
    assert_eq!(h.handle.get_profile().await.unwrap().first_name, "Lee");
}

#[tokio::test]
async fn json_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("user.json");
    totals_survive_restart(async || {
        Arc::new(JsonFileStore::open(&path).await.unwrap()) as Arc<dyn StateStore>
    })
    .await;
}

#[tokio::test]
async fn sqlite_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nutrition.db");
    totals_survive_restart(async || {
        Arc::new(SqliteStore::open(&path).await.unwrap()) as Arc<dyn StateStore>
    })
    .await;
}

//! Integration tests for the full stack: facade, mapper, and the SQL
//! collaborator against throwaway SQLite databases.
//!
//! # Running Tests
//! ```bash
//! cargo test --test integration
//! ```

use serde_json::{json, Value};
use std::path::PathBuf;

use firedb::{FireDb, FireDbConfig, FireDbError, RangeSpec, SqlStore, ValueKind};

// =============================================================================
// Database Helpers
// =============================================================================

fn temp_db_path(name: &str) -> PathBuf {
    let dir = PathBuf::from("temp");
    let _ = std::fs::create_dir_all(&dir);
    dir.join(format!("integration_{}.db", name))
}

/// Clean up SQLite database and its WAL files
fn cleanup_db(path: &PathBuf) {
    let _ = std::fs::remove_file(path);
    let _ = std::fs::remove_file(format!("{}-wal", path.display()));
    let _ = std::fs::remove_file(format!("{}-shm", path.display()));
}

async fn sqlite_db(name: &str) -> (FireDb<SqlStore>, PathBuf) {
    let db_path = temp_db_path(name);
    cleanup_db(&db_path);
    let config = FireDbConfig {
        sql_url: Some(format!("sqlite://{}?mode=rwc", db_path.display())),
        ..Default::default()
    };
    let db = FireDb::connect(&config).await.unwrap();
    (db, db_path)
}

// =============================================================================
// Round Trips
// =============================================================================

#[tokio::test]
async fn round_trip_nested_document() {
    let (db, db_path) = sqlite_db("round_trip").await;

    let doc = json!({
        "name": "Alice",
        "age": 30,
        "active": true,
        "bio": "b".repeat(300),
        "prefs": {"dark": true, "lang": "en", "depth": {"nested": 1}},
    });
    db.set("users/alice", &doc).await.unwrap();
    assert_eq!(db.get("users/alice").await.unwrap(), doc);

    cleanup_db(&db_path);
}

#[tokio::test]
async fn round_trip_drops_null_fields() {
    let (db, db_path) = sqlite_db("null_fields").await;

    db.set("users/carol", &json!({"name": "Carol", "email": null}))
        .await
        .unwrap();
    assert_eq!(
        db.get("users/carol").await.unwrap(),
        json!({"name": "Carol"})
    );

    cleanup_db(&db_path);
}

#[tokio::test]
async fn scalar_leaf_round_trip() {
    let (db, db_path) = sqlite_db("scalar_leaf").await;

    db.set("counters/visits", &json!(1234)).await.unwrap();
    assert_eq!(db.get("counters/visits").await.unwrap(), json!(1234));

    // Reading one level up nests the leaf under its segment
    assert_eq!(db.get("counters").await.unwrap(), json!({"visits": 1234}));

    cleanup_db(&db_path);
}

// =============================================================================
// Type Dispatch (raw row shapes)
// =============================================================================

#[tokio::test]
async fn bool_stored_as_int_one() {
    let (db, db_path) = sqlite_db("bool_raw").await;

    db.set("x", &json!(true)).await.unwrap();
    let rows = db.get_raw("x").await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].kind, ValueKind::Bool);
    assert_eq!(rows[0].int_value, Some(1));

    cleanup_db(&db_path);
}

#[tokio::test]
async fn int_stored_in_int_column() {
    let (db, db_path) = sqlite_db("int_raw").await;

    db.set("x", &json!(42)).await.unwrap();
    let rows = db.get_raw("x").await.unwrap();
    assert_eq!(rows[0].kind, ValueKind::Int);
    assert_eq!(rows[0].int_value, Some(42));

    cleanup_db(&db_path);
}

#[tokio::test]
async fn string_length_picks_column() {
    let (db, db_path) = sqlite_db("string_raw").await;

    db.set("short", &json!("a".repeat(10))).await.unwrap();
    db.set("long", &json!("a".repeat(300))).await.unwrap();

    assert_eq!(db.get_raw("short").await.unwrap()[0].kind, ValueKind::Varchar);
    assert_eq!(db.get_raw("long").await.unwrap()[0].kind, ValueKind::Text);

    cleanup_db(&db_path);
}

// =============================================================================
// Deletion and Overwrite
// =============================================================================

#[tokio::test]
async fn set_null_deletes_subtree() {
    let (db, db_path) = sqlite_db("delete").await;

    db.set("x/y", &json!(5)).await.unwrap();
    db.set("x/y", &Value::Null).await.unwrap();

    assert_eq!(db.get("x/y").await.unwrap(), Value::Null);
    assert!(db.get_raw("x/y").await.unwrap().is_empty());

    cleanup_db(&db_path);
}

#[tokio::test]
async fn overwrite_replaces_whole_subtree() {
    let (db, db_path) = sqlite_db("overwrite").await;

    db.set("cfg", &json!({"a": 1, "b": {"c": 2}, "d": 3})).await.unwrap();
    db.set("cfg", &json!({"a": 9})).await.unwrap();

    // No stale siblings resurrected
    assert_eq!(db.get("cfg").await.unwrap(), json!({"a": 9}));
    assert_eq!(db.get_raw("cfg").await.unwrap().len(), 1);

    cleanup_db(&db_path);
}

#[tokio::test]
async fn sibling_paths_are_untouched() {
    let (db, db_path) = sqlite_db("siblings").await;

    db.set("users/alice", &json!({"age": 30})).await.unwrap();
    db.set("users/bob", &json!({"age": 25})).await.unwrap();
    db.set("users/alice", &Value::Null).await.unwrap();

    assert_eq!(db.get("users/bob").await.unwrap(), json!({"age": 25}));
    assert_eq!(db.get("users").await.unwrap(), json!({"bob": {"age": 25}}));

    cleanup_db(&db_path);
}

// =============================================================================
// Emulated Index and Range Queries
// =============================================================================

#[tokio::test]
async fn index_hash_groups_siblings() {
    let (db, db_path) = sqlite_db("index_grouping").await;

    db.set("list/a", &json!({"score": 10})).await.unwrap();
    db.set("list/b", &json!({"score": 20})).await.unwrap();
    db.set("other/a", &json!({"score": 10})).await.unwrap();

    let a = &db.get_raw("list/a/score").await.unwrap()[0];
    let b = &db.get_raw("list/b/score").await.unwrap()[0];
    let other = &db.get_raw("other/a/score").await.unwrap()[0];

    assert!(a.index_hash.is_some());
    assert_eq!(a.index_hash, b.index_hash);
    assert_ne!(a.index_hash, other.index_hash);

    cleanup_db(&db_path);
}

#[tokio::test]
async fn range_query_filters_and_returns_whole_children() {
    let (db, db_path) = sqlite_db("range_query").await;

    db.set("list/a", &json!({"score": 10, "label": "low"})).await.unwrap();
    db.set("list/b", &json!({"score": 20, "label": "high"})).await.unwrap();

    let result = db
        .get_range("list", &RangeSpec::at_least("score", 15))
        .await
        .unwrap();
    assert_eq!(result, json!({"b": {"score": 20, "label": "high"}}));

    // Inclusive bounds
    let result = db
        .get_range("list", &RangeSpec::between("score", 10, 20))
        .await
        .unwrap();
    assert_eq!(result.as_object().unwrap().len(), 2);

    let result = db
        .get_range("list", &RangeSpec::at_most("score", 15))
        .await
        .unwrap();
    assert_eq!(result, json!({"a": {"score": 10, "label": "low"}}));

    cleanup_db(&db_path);
}

#[tokio::test]
async fn range_query_ignores_other_parents_and_properties() {
    let (db, db_path) = sqlite_db("range_scoped").await;

    db.set("list/a", &json!({"score": 50, "rank": 1})).await.unwrap();
    db.set("other/z", &json!({"score": 50})).await.unwrap();

    let result = db
        .get_range("list", &RangeSpec::at_least("score", 40))
        .await
        .unwrap();
    assert_eq!(result, json!({"a": {"score": 50, "rank": 1}}));

    // rank=1 doesn't satisfy a score range even though it is in range
    let result = db
        .get_range("list", &RangeSpec::between("rank", 40, 60))
        .await
        .unwrap();
    assert_eq!(result, Value::Null);

    cleanup_db(&db_path);
}

#[tokio::test]
async fn range_spec_wire_shape_errors() {
    assert!(matches!(
        RangeSpec::from_json(&json!({"a": {"start": 1}, "b": {"end": 2}})),
        Err(FireDbError::InvalidRangeQuery(_))
    ));
    assert!(matches!(
        RangeSpec::from_json(&json!({"score": {}})),
        Err(FireDbError::InvalidRangeQuery(_))
    ));
    assert!(matches!(
        RangeSpec::from_json(&json!({})),
        Err(FireDbError::InvalidRangeQuery(_))
    ));

    let spec = RangeSpec::from_json(&json!({"score": {"start": 15}})).unwrap();
    assert_eq!(spec.property, "score");
    assert_eq!(spec.start, Some(15));
}

// =============================================================================
// Persistence Across Connections
// =============================================================================

#[tokio::test]
async fn data_survives_reconnect() {
    let db_path = temp_db_path("reconnect");
    cleanup_db(&db_path);
    let config = FireDbConfig {
        sql_url: Some(format!("sqlite://{}?mode=rwc", db_path.display())),
        ..Default::default()
    };

    {
        let db = FireDb::connect(&config).await.unwrap();
        db.set("persist/me", &json!({"v": 1})).await.unwrap();
    }

    let db = FireDb::connect(&config).await.unwrap();
    assert_eq!(db.get("persist/me").await.unwrap(), json!({"v": 1}));

    cleanup_db(&db_path);
}

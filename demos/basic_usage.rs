// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Basic firedb usage example.
//!
//! Demonstrates:
//! 1. Connecting to a throwaway SQLite database
//! 2. Writing nested documents by path
//! 3. Reading subtrees and single leaves back
//! 4. A range query over a sibling property
//! 5. Ordered child insertion with generated keys
//!
//! # Run
//!
//! ```bash
//! cargo run --example basic_usage
//! ```

use firedb::{FireDb, FireDbConfig, RangeSpec};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Simple logging (no filter for simplicity)
    tracing_subscriber::fmt()
        .with_target(false)
        .compact()
        .init();

    let config = FireDbConfig {
        sql_url: Some("sqlite://basic_usage.db?mode=rwc".into()),
        ..Default::default()
    };
    let db = FireDb::connect(&config).await?;

    // ─────────────────────────────────────────────────────────────────────────
    // 1. Write nested documents; each scalar leaf becomes one row
    db.set(
        "users/alice",
        &json!({"name": "Alice", "age": 30, "prefs": {"dark": true}}),
    )
    .await?;
    db.set("users/bob", &json!({"name": "Bob", "age": 25})).await?;

    // 2. Read back a subtree or a single leaf
    println!("alice     = {}", db.get("users/alice").await?);
    println!("alice/age = {}", db.get("users/alice/age").await?);

    // 3. Range query: users with age >= 28, returned whole
    let grown = db.get_range("users", &RangeSpec::at_least("age", 28)).await?;
    println!("age >= 28 = {}", grown);

    // 4. Ordered child insertion
    for n in 0..3 {
        let key = db.generate_key()?;
        db.set(&format!("feed/{}", key), &json!({"n": n})).await?;
    }
    println!("feed      = {}", db.get("feed").await?);

    // 5. Null deletes the subtree
    db.set("users/bob", &serde_json::Value::Null).await?;
    println!("bob       = {}", db.get("users/bob").await?);

    std::fs::remove_file("basic_usage.db").ok();
    Ok(())
}

mod common;

use assert_matches::assert_matches;
use common::{csv, inventory_row, TestDb, INVENTORY_HEADER};
use retail_seed::schema::{ensure_schema, INVENTORY};
use retail_seed::{load, SeedError};

const TABLE_COUNT_SQL: &str = "SELECT COUNT(*) AS n FROM sqlite_master WHERE type = 'table' AND name IN ('inventory', 'sales_transactions', 'financial_tracking', 'exceptions', 'conversations')";
const INDEX_COUNT_SQL: &str =
    "SELECT COUNT(*) AS n FROM sqlite_master WHERE type = 'index' AND name LIKE 'idx_%'";

#[tokio::test]
async fn creates_all_tables_and_indexes() {
    let db = TestDb::new().await;

    ensure_schema(&db.pool).await.expect("schema creation failed");

    assert_eq!(db.count(TABLE_COUNT_SQL).await, 5);
    assert_eq!(db.count(INDEX_COUNT_SQL).await, 6);
}

#[tokio::test]
async fn ensure_schema_twice_is_a_no_op() {
    let db = TestDb::new().await;

    ensure_schema(&db.pool).await.unwrap();
    ensure_schema(&db.pool).await.expect("second run must not fail");

    assert_eq!(db.count(TABLE_COUNT_SQL).await, 5);
    assert_eq!(db.count(INDEX_COUNT_SQL).await, 6);
}

#[tokio::test]
async fn rerunning_schema_keeps_loaded_rows() {
    let db = TestDb::new().await;
    ensure_schema(&db.pool).await.unwrap();

    let path = db.write_csv(
        "inventory.csv",
        &csv(
            INVENTORY_HEADER,
            &[
                inventory_row("B1", "S1", "2024-07-01", "false"),
                inventory_row("B2", "S2", "2024-08-01", "false"),
            ],
        ),
    );
    assert_eq!(load(&path, &INVENTORY, &db.pool).await.unwrap(), 2);

    ensure_schema(&db.pool).await.unwrap();
    assert_eq!(db.rows_in("inventory").await, 2);
}

#[tokio::test]
async fn generated_columns_fill_themselves() {
    let db = TestDb::new().await;
    ensure_schema(&db.pool).await.unwrap();

    db.execute("INSERT INTO exceptions (outlet_id, exception_type, amount) VALUES ('OUT-1', 'void', 12.5)")
        .await;
    db.execute("INSERT INTO conversations (user_id, prompt, response, tokens_used) VALUES ('u1', 'hi', 'hello', 7)")
        .await;

    let exceptions = db
        .count("SELECT COUNT(*) AS n FROM exceptions WHERE id IS NOT NULL AND occurred_at IS NOT NULL")
        .await;
    let conversations = db
        .count("SELECT COUNT(*) AS n FROM conversations WHERE conv_id IS NOT NULL AND created_at IS NOT NULL")
        .await;
    assert_eq!(exceptions, 1);
    assert_eq!(conversations, 1);
}

#[tokio::test]
async fn failed_schema_statement_leaves_no_partial_schema() {
    let db = TestDb::new().await;
    // Occupies the name of the last index, so only the final statement fails.
    db.execute("CREATE TABLE idx_exc_outlet_time (x INTEGER)").await;

    let result = ensure_schema(&db.pool).await;

    assert_matches!(result, Err(SeedError::Schema(_)));
    assert_eq!(db.count(TABLE_COUNT_SQL).await, 0);
    assert_eq!(db.count(INDEX_COUNT_SQL).await, 0);
}

#![allow(dead_code)]

use std::path::PathBuf;

use retail_seed::config::AppConfig;
use retail_seed::db::{self, DbConfig, DbPool};
use sea_orm::{ConnectionTrait, DatabaseBackend as DbBackend, Statement};
use tempfile::TempDir;

pub const INVENTORY_HEADER: &str = "batch_no,sku_id,sku_name,category,supplier_id,supplier_name,warehouse_id,manufactured_date,expiry_date,shelf_life_days,shelf_life_remaining_pct,quantity_in_stock,unit,cost_per_unit,reorder_level,reorder_quantity,stock_status,is_damaged,damaged_qty,damage_reason,financial_loss_damage,inventory_turnover_rate,last_updated";

pub const SALES_HEADER: &str = "order_id,order_date,order_time,order_hour,sku_id,sku_name,category,channel,region,distributor_id,qty_ordered,qty_delivered,fulfillment_rate_pct,is_partial_delivery,unit_cost,selling_price_per_unit,discount_pct,total_revenue,gross_margin,payment_status,days_to_payment,transaction_type,return_reason,original_order_id";

pub const FINANCIAL_HEADER: &str = "transaction_id,date,sku_id,sku_name,category,transaction_type,channel,region,quantity,unit_cost,selling_price,total_value,gross_margin,discount_pct,payment_status,days_to_payment,reference_id,damage_reason";

/// Inventory row with the given batch, SKU, expiry and damage flag.
pub fn inventory_row(batch: &str, sku: &str, expiry: &str, damaged: &str) -> String {
    format!(
        "{batch},{sku},Basmati Rice 5kg,Staples,SUP-1,Acme Foods,WH-1,2024-01-01,{expiry},180,62.5,120,bag,8.75,20,100,in_stock,{damaged},0,,0.00,4.2,2024-03-01 10:15:00"
    )
}

/// Sales row with the given order id and return reason.
pub fn sales_row(order_id: &str, return_reason: &str) -> String {
    format!(
        "{order_id},2024-03-02,14:30:00,14,S1,Basmati Rice 5kg,Staples,modern_trade,North,DIST-9,10,8,80.0,True,8.75,12.50,5.0,95.00,25.00,paid,12,sale,{return_reason},"
    )
}

/// Financial row with the given transaction id and reference.
pub fn financial_row(txn_id: &str, reference: &str) -> String {
    format!(
        "{txn_id},2024-03-02,S1,Basmati Rice 5kg,Staples,sale,modern_trade,North,8,8.75,12.50,100.00,30.00,0.0,paid,12,{reference},"
    )
}

pub fn csv(header: &str, rows: &[String]) -> String {
    let mut body = String::from(header);
    body.push('\n');
    for row in rows {
        body.push_str(row);
        body.push('\n');
    }
    body
}

/// File-backed SQLite database and data directory in a temp dir.
pub struct TestDb {
    pub pool: DbPool,
    pub url: String,
    dir: TempDir,
}

impl TestDb {
    pub async fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        std::fs::create_dir(dir.path().join("data")).expect("failed to create data dir");
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("seed.db").display());

        let pool = db::establish_connection_with_config(&DbConfig {
            url: url.clone(),
            max_connections: 1,
            ..Default::default()
        })
        .await
        .expect("failed to open test database");

        Self { pool, url, dir }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    pub fn config(&self) -> AppConfig {
        let mut cfg = AppConfig::new(self.url.clone());
        cfg.data_dir = self.data_dir();
        cfg.db_max_connections = 1;
        cfg
    }

    pub fn write_csv(&self, file_name: &str, contents: &str) -> PathBuf {
        let path = self.data_dir().join(file_name);
        std::fs::write(&path, contents).expect("failed to write csv");
        path
    }

    /// Runs a `SELECT COUNT(*) AS n ...` style query.
    pub async fn count(&self, sql: &str) -> i64 {
        let row = self
            .pool
            .query_one(Statement::from_string(DbBackend::Sqlite, sql.to_string()))
            .await
            .expect("count query failed")
            .expect("count query returned no row");
        row.try_get::<i64>("", "n").expect("missing n column")
    }

    pub async fn rows_in(&self, table: &str) -> i64 {
        self.count(&format!("SELECT COUNT(*) AS n FROM {table}")).await
    }

    pub async fn execute(&self, sql: &str) {
        self.pool
            .execute(Statement::from_string(DbBackend::Sqlite, sql.to_string()))
            .await
            .expect("statement failed");
    }
}

use super::ColumnKind::*;
use super::{Column, Generated, IndexColumn, IndexDef, TableDef};

/// Stock batches per SKU. `damaged_qty`, `damage_reason` and
/// `financial_loss_damage` only carry meaning when `is_damaged` is set.
pub static INVENTORY: TableDef = TableDef {
    name: "inventory",
    source_file: Some("inventory.csv"),
    columns: &[
        Column::new("batch_no", Varchar(50)).primary_key(),
        Column::new("sku_id", Varchar(50)).not_null(),
        Column::new("sku_name", Varchar(200)),
        Column::new("category", Varchar(100)),
        Column::new("supplier_id", Varchar(50)),
        Column::new("supplier_name", Varchar(200)),
        Column::new("warehouse_id", Varchar(50)),
        Column::new("manufactured_date", Date),
        Column::new("expiry_date", Date),
        Column::new("shelf_life_days", Integer),
        Column::new("shelf_life_remaining_pct", Float),
        Column::new("quantity_in_stock", Integer),
        Column::new("unit", Varchar(20)),
        Column::new("cost_per_unit", Decimal(10, 2)),
        Column::new("reorder_level", Integer),
        Column::new("reorder_quantity", Integer),
        Column::new("stock_status", Varchar(30)),
        Column::new("is_damaged", Boolean),
        Column::new("damaged_qty", Integer),
        Column::new("damage_reason", Text),
        Column::new("financial_loss_damage", Decimal(12, 2)),
        Column::new("inventory_turnover_rate", Float),
        Column::new("last_updated", Timestamp),
    ],
};

/// One row per order line. `original_order_id` points back at the order a
/// return or adjustment came from; it is not enforced and may not resolve.
pub static SALES_TRANSACTIONS: TableDef = TableDef {
    name: "sales_transactions",
    source_file: Some("sales_transactions.csv"),
    columns: &[
        Column::new("order_id", Varchar(50)).primary_key(),
        Column::new("order_date", Date),
        Column::new("order_time", Time),
        Column::new("order_hour", Integer),
        Column::new("sku_id", Varchar(50)),
        Column::new("sku_name", Varchar(200)),
        Column::new("category", Varchar(100)),
        Column::new("channel", Varchar(50)),
        Column::new("region", Varchar(100)),
        Column::new("distributor_id", Varchar(50)),
        Column::new("qty_ordered", Integer),
        Column::new("qty_delivered", Integer),
        Column::new("fulfillment_rate_pct", Float),
        Column::new("is_partial_delivery", Boolean),
        Column::new("unit_cost", Decimal(10, 2)),
        Column::new("selling_price_per_unit", Decimal(10, 2)),
        Column::new("discount_pct", Float),
        Column::new("total_revenue", Decimal(12, 2)),
        Column::new("gross_margin", Decimal(12, 2)),
        Column::new("payment_status", Varchar(30)),
        Column::new("days_to_payment", Integer),
        Column::new("transaction_type", Varchar(20)),
        Column::new("return_reason", Text).blank_as_empty(),
        Column::new("original_order_id", Varchar(50)).blank_as_empty(),
    ],
};

/// Ledger-style value flow per SKU. `reference_id` is a soft reference to
/// another record.
pub static FINANCIAL_TRACKING: TableDef = TableDef {
    name: "financial_tracking",
    source_file: Some("financial_tracking.csv"),
    columns: &[
        Column::new("transaction_id", Varchar(50)).primary_key(),
        Column::new("date", Date),
        Column::new("sku_id", Varchar(50)),
        Column::new("sku_name", Varchar(200)),
        Column::new("category", Varchar(100)),
        Column::new("transaction_type", Varchar(20)),
        Column::new("channel", Varchar(50)),
        Column::new("region", Varchar(100)),
        Column::new("quantity", Integer),
        Column::new("unit_cost", Decimal(10, 2)),
        Column::new("selling_price", Decimal(10, 2)),
        Column::new("total_value", Decimal(12, 2)),
        Column::new("gross_margin", Decimal(12, 2)),
        Column::new("discount_pct", Float),
        Column::new("payment_status", Varchar(30)),
        Column::new("days_to_payment", Integer),
        Column::new("reference_id", Varchar(50)).blank_as_empty(),
        Column::new("damage_reason", Text).blank_as_empty(),
    ],
};

/// Append-only anomaly log per outlet, written by other services.
pub static EXCEPTIONS: TableDef = TableDef {
    name: "exceptions",
    source_file: None,
    columns: &[
        Column::new("id", Uuid)
            .primary_key()
            .generated(Generated::RandomUuid),
        Column::new("outlet_id", Varchar(50)),
        Column::new("exception_type", Varchar(50)),
        Column::new("amount", Decimal(10, 2)),
        Column::new("authority_status", Varchar(50)),
        Column::new("occurred_at", TimestampTz).generated(Generated::CurrentTimestamp),
        Column::new("source", Varchar(20)),
        Column::new("shift", Varchar(20)),
        Column::new("day_type", Varchar(20)),
    ],
};

/// Append-only prompt/response log, written by other services.
pub static CONVERSATIONS: TableDef = TableDef {
    name: "conversations",
    source_file: None,
    columns: &[
        Column::new("conv_id", Uuid)
            .primary_key()
            .generated(Generated::RandomUuid),
        Column::new("user_id", Varchar(50)),
        Column::new("prompt", Text),
        Column::new("response", Text),
        Column::new("tokens_used", Integer),
        Column::new("domain", Varchar(30)),
        Column::new("created_at", TimestampTz).generated(Generated::CurrentTimestamp),
    ],
};

/// Creation order of the tables.
pub static TABLES: &[&TableDef] = &[
    &INVENTORY,
    &SALES_TRANSACTIONS,
    &FINANCIAL_TRACKING,
    &EXCEPTIONS,
    &CONVERSATIONS,
];

pub static INDEXES: &[IndexDef] = &[
    IndexDef {
        name: "idx_inv_sku",
        table: &INVENTORY,
        columns: &[IndexColumn::asc("sku_id")],
    },
    IndexDef {
        name: "idx_inv_expiry",
        table: &INVENTORY,
        columns: &[IndexColumn::asc("expiry_date")],
    },
    IndexDef {
        name: "idx_sal_date_sku",
        table: &SALES_TRANSACTIONS,
        columns: &[IndexColumn::asc("order_date"), IndexColumn::asc("sku_id")],
    },
    IndexDef {
        name: "idx_sal_channel",
        table: &SALES_TRANSACTIONS,
        columns: &[IndexColumn::asc("channel")],
    },
    IndexDef {
        name: "idx_fin_date",
        table: &FINANCIAL_TRACKING,
        columns: &[IndexColumn::asc("date")],
    },
    IndexDef {
        name: "idx_exc_outlet_time",
        table: &EXCEPTIONS,
        columns: &[IndexColumn::asc("outlet_id"), IndexColumn::desc("occurred_at")],
    },
];

/// Tables fed from CSV exports, in load order.
pub fn seeded_tables() -> impl Iterator<Item = &'static TableDef> {
    TABLES.iter().copied().filter(|t| t.source_file.is_some())
}

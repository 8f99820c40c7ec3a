use sea_orm::sea_query::{
    Alias, ColumnDef, Expr, Index, IndexCreateStatement, IndexOrder, SimpleExpr, Table,
    TableCreateStatement,
};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, Statement};
use tracing::{debug, info};

use super::{Column, ColumnKind, Generated, IndexDef, TableDef, INDEXES, TABLES};
use crate::db::transaction_scope;
use crate::errors::{SeedError, SeedResult};

/// Creates every table and index that does not exist yet.
///
/// All statements run in one transaction: either the whole batch commits or
/// nothing from this call is kept. Existing tables and their rows are left
/// untouched, so calling this on every run is safe.
pub async fn ensure_schema(db: &DatabaseConnection) -> SeedResult<()> {
    let backend = db.get_database_backend();
    let statements: Vec<Statement> = table_statements(backend)
        .iter()
        .map(|stmt| backend.build(stmt))
        .chain(index_statements().iter().map(|stmt| backend.build(stmt)))
        .collect();

    transaction_scope(db, move |txn| {
        Box::pin(async move {
            for stmt in statements {
                debug!(sql = %stmt.sql, "executing DDL");
                txn.execute(stmt).await.map_err(SeedError::Schema)?;
            }
            Ok(())
        })
    })
    .await?;

    info!(
        tables = TABLES.len(),
        indexes = INDEXES.len(),
        "Schema ensured"
    );
    Ok(())
}

/// `CREATE TABLE IF NOT EXISTS` for every table, in creation order.
pub fn table_statements(backend: DbBackend) -> Vec<TableCreateStatement> {
    TABLES
        .iter()
        .map(|table| create_table(table, backend))
        .collect()
}

/// `CREATE INDEX IF NOT EXISTS` for every index.
pub fn index_statements() -> Vec<IndexCreateStatement> {
    INDEXES.iter().map(create_index).collect()
}

fn create_table(table: &TableDef, backend: DbBackend) -> TableCreateStatement {
    let mut stmt = Table::create();
    stmt.table(Alias::new(table.name)).if_not_exists();
    for column in table.columns {
        stmt.col(&mut column_def(column, backend));
    }
    stmt.to_owned()
}

fn column_def(column: &Column, backend: DbBackend) -> ColumnDef {
    let mut def = ColumnDef::new(Alias::new(column.name));
    match column.kind {
        ColumnKind::Varchar(len) => def.string_len(len),
        ColumnKind::Text => def.text(),
        ColumnKind::Integer => def.integer(),
        ColumnKind::Float => def.double(),
        ColumnKind::Decimal(precision, scale) => def.decimal_len(precision, scale),
        ColumnKind::Boolean => def.boolean(),
        ColumnKind::Date => def.date(),
        ColumnKind::Time => def.time(),
        ColumnKind::Timestamp => def.timestamp(),
        ColumnKind::TimestampTz => def.timestamp_with_time_zone(),
        ColumnKind::Uuid => def.uuid(),
    };
    if column.primary_key {
        def.primary_key();
    }
    if column.not_null {
        def.not_null();
    }
    if let Some(generated) = column.generated {
        def.default(default_expr(generated, backend));
    }
    def
}

fn default_expr(generated: Generated, backend: DbBackend) -> SimpleExpr {
    match (generated, backend) {
        (Generated::CurrentTimestamp, _) => Expr::current_timestamp().into(),
        (Generated::RandomUuid, DbBackend::Postgres) => Expr::cust("gen_random_uuid()"),
        // SQLite only accepts parenthesised expressions as column defaults.
        (Generated::RandomUuid, _) => Expr::cust("(lower(hex(randomblob(16))))"),
    }
}

fn create_index(index: &IndexDef) -> IndexCreateStatement {
    let mut stmt = Index::create();
    stmt.if_not_exists()
        .name(index.name)
        .table(Alias::new(index.table.name));
    for col in index.columns {
        if col.descending {
            stmt.col((Alias::new(col.name), IndexOrder::Desc));
        } else {
            stmt.col(Alias::new(col.name));
        }
    }
    stmt.to_owned()
}

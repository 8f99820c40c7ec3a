//! Reads a CSV export into memory, normalizes it against the target table's
//! definition and appends it with batched multi-row INSERTs.

use csv::{ReaderBuilder, StringRecord};
use sea_orm::sea_query::{Alias, Query, SimpleExpr};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, Value};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::errors::{SeedError, SeedResult};
use crate::normalize::{is_missing, normalize_cell, Rule};
use crate::schema::{Column, TableDef};

/// Rows per INSERT statement unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Upper bound on bind parameters in one statement. SQLite's default limit is
/// the lower of the two supported backends.
const MAX_BIND_PARAMS: usize = 32_766;

/// A fully normalized CSV file, ready to insert.
#[derive(Debug)]
pub struct ParsedFile {
    pub table: &'static TableDef,
    /// Target columns in file order.
    pub columns: Vec<&'static Column>,
    pub rows: Vec<Vec<Value>>,
    /// Date/timestamp cells that held text but did not parse and load as NULL.
    pub coerced_nulls: usize,
}

impl ParsedFile {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Loads `source_path` into `table` with the default batch size and returns
/// the number of inserted rows.
pub async fn load(
    source_path: &Path,
    table: &'static TableDef,
    db: &DatabaseConnection,
) -> SeedResult<u64> {
    load_with_batch_size(source_path, table, db, DEFAULT_BATCH_SIZE).await
}

pub async fn load_with_batch_size(
    source_path: &Path,
    table: &'static TableDef,
    db: &DatabaseConnection,
    batch_size: usize,
) -> SeedResult<u64> {
    let start = Instant::now();
    let parsed = parse_file(source_path, table)?;
    if parsed.coerced_nulls > 0 {
        warn!(
            table = table.name,
            cells = parsed.coerced_nulls,
            "Unparseable dates loaded as NULL"
        );
    }

    let inserted = insert_rows(db, &parsed.columns, table, parsed.rows, batch_size).await?;
    debug!(table = table.name, rows = inserted, elapsed = ?start.elapsed(), "Load finished");
    Ok(inserted)
}

/// Reads and normalizes a whole file without touching the database.
pub fn parse_file(path: &Path, table: &'static TableDef) -> SeedResult<ParsedFile> {
    let bytes = std::fs::read(path).map_err(|e| SeedError::io(path, e))?;
    parse_bytes(&bytes, path, table)
}

fn parse_bytes(bytes: &[u8], path: &Path, table: &'static TableDef) -> SeedResult<ParsedFile> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(bytes);

    let headers = reader.headers().map_err(|e| SeedError::csv(path, e))?.clone();
    let columns = map_headers(&headers, table, path)?;

    let mut rows = Vec::new();
    let mut coerced_nulls = 0;
    for result in reader.records() {
        let record = result.map_err(|e| SeedError::csv(path, e))?;
        let line = record.position().map_or(0, |p| p.line());

        let mut values = Vec::with_capacity(columns.len());
        for (column, raw) in columns.iter().zip(record.iter()) {
            let value = normalize_cell(column, raw).map_err(|_| SeedError::InvalidValue {
                table: table.name,
                column: column.name,
                line,
                value: raw.to_string(),
            })?;
            if is_coerced_null(column, raw, &value) {
                debug!(table = table.name, column = column.name, line, raw, "Coerced to NULL");
                coerced_nulls += 1;
            }
            values.push(value);
        }
        rows.push(values);
    }

    Ok(ParsedFile {
        table,
        columns,
        rows,
        coerced_nulls,
    })
}

/// Resolves each header to a column of `table`. Columns with an explicit
/// coercion rule must be present.
fn map_headers(
    headers: &StringRecord,
    table: &'static TableDef,
    path: &Path,
) -> SeedResult<Vec<&'static Column>> {
    let mut columns: Vec<&'static Column> = Vec::with_capacity(headers.len());
    for header in headers.iter() {
        let name = header.trim_start_matches('\u{feff}').trim();
        let column = table.column(name).ok_or_else(|| SeedError::UnknownColumn {
            table: table.name,
            column: name.to_string(),
            path: path.to_path_buf(),
        })?;
        if columns.iter().any(|c| c.name == column.name) {
            return Err(SeedError::DuplicateColumn {
                column: name.to_string(),
                path: path.to_path_buf(),
            });
        }
        columns.push(column);
    }

    if let Some(missing) = table.columns.iter().find(|c| {
        Rule::for_column(c).is_explicit() && !columns.iter().any(|found| found.name == c.name)
    }) {
        return Err(SeedError::MissingColumn {
            table: table.name,
            column: missing.name,
            path: path.to_path_buf(),
        });
    }

    Ok(columns)
}

fn is_coerced_null(column: &Column, raw: &str, value: &Value) -> bool {
    let coerces = matches!(
        Rule::for_column(column),
        Rule::CoerceDate | Rule::CoerceTimestamp | Rule::CoerceTimestampTz
    );
    coerces && !is_missing(raw) && !value_is_some(value)
}

fn value_is_some(value: &Value) -> bool {
    match value {
        Value::ChronoDate(v) => v.is_some(),
        Value::ChronoDateTime(v) => v.is_some(),
        Value::ChronoDateTimeUtc(v) => v.is_some(),
        _ => true,
    }
}

/// Appends `rows` to `table` in file order. Each batch is its own statement;
/// a failing batch aborts the load and leaves earlier batches in place.
pub async fn insert_rows(
    db: &DatabaseConnection,
    columns: &[&'static Column],
    table: &TableDef,
    rows: Vec<Vec<Value>>,
    batch_size: usize,
) -> SeedResult<u64> {
    if rows.is_empty() || columns.is_empty() {
        return Ok(0);
    }

    let batch_size = batch_size.clamp(1, (MAX_BIND_PARAMS / columns.len()).max(1));
    let backend = db.get_database_backend();
    let mut inserted = 0;
    let mut rows = rows.into_iter().peekable();

    while rows.peek().is_some() {
        let mut stmt = Query::insert();
        stmt.into_table(Alias::new(table.name))
            .columns(columns.iter().map(|c| Alias::new(c.name)));
        for row in rows.by_ref().take(batch_size) {
            stmt.values(row.into_iter().map(SimpleExpr::Value))
                .map_err(|e| SeedError::Database(DbErr::Custom(e.to_string())))?;
        }

        let result = db.execute(backend.build(&stmt)).await?;
        inserted += result.rows_affected();
        debug!(table = table.name, inserted, "Batch inserted");
    }

    info!(table = table.name, rows = inserted, "Rows appended");
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FINANCIAL_TRACKING, INVENTORY, SALES_TRANSACTIONS};
    use assert_matches::assert_matches;
    use chrono::NaiveDate;

    const INVENTORY_HEADER: &str = "batch_no,sku_id,manufactured_date,expiry_date,is_damaged,quantity_in_stock,last_updated";

    fn parse(table: &'static TableDef, body: &str) -> SeedResult<ParsedFile> {
        parse_bytes(body.as_bytes(), Path::new("test.csv"), table)
    }

    #[test]
    fn parses_rows_in_file_order() {
        let csv = format!(
            "{INVENTORY_HEADER}\nB1,S1,2024-01-01,2024-06-01,TRUE,10,2024-01-02 09:00:00\nB2,S2,2024-01-03,not-a-date,false,,2024-01-04\n"
        );
        let parsed = parse(&INVENTORY, &csv).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.columns.len(), 7);
        assert_eq!(parsed.coerced_nulls, 1);

        let second = &parsed.rows[1];
        assert_eq!(second[0], Value::from(Some("B2".to_string())));
        assert_eq!(second[3], Value::from(None::<NaiveDate>));
        assert_eq!(second[4], Value::from(false));
        assert_eq!(second[5], Value::from(None::<i32>));
    }

    #[test]
    fn header_only_file_has_no_rows() {
        let parsed = parse(&INVENTORY, &format!("{INVENTORY_HEADER}\n")).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn unknown_header_is_rejected() {
        let csv = format!("{INVENTORY_HEADER},colour\nB1,S1,,,true,1,,red\n");
        assert_matches!(
            parse(&INVENTORY, &csv),
            Err(SeedError::UnknownColumn { column, .. }) if column == "colour"
        );
    }

    #[test]
    fn duplicate_header_is_rejected() {
        let csv = format!("{INVENTORY_HEADER},sku_id\n");
        assert_matches!(
            parse(&INVENTORY, &csv),
            Err(SeedError::DuplicateColumn { column, .. }) if column == "sku_id"
        );
    }

    #[test]
    fn missing_coerced_column_is_rejected() {
        let csv = "order_id,order_date,is_partial_delivery,original_order_id\nO1,2024-01-01,false,\n";
        assert_matches!(
            parse(&SALES_TRANSACTIONS, csv),
            Err(SeedError::MissingColumn { column: "return_reason", .. })
        );
    }

    #[test]
    fn ragged_row_is_a_csv_error() {
        let csv = "transaction_id,date,reference_id,damage_reason\nT1,2024-01-01,,\nT2,2024-01-02\n";
        assert_matches!(parse(&FINANCIAL_TRACKING, csv), Err(SeedError::Csv { .. }));
    }

    #[test]
    fn bad_number_names_line_and_column() {
        let csv = format!("{INVENTORY_HEADER}\nB1,S1,,,true,1,\nB2,S2,,,true,many,\n");
        assert_matches!(
            parse(&INVENTORY, &csv),
            Err(SeedError::InvalidValue { column: "quantity_in_stock", line: 3, .. })
        );
    }

    #[test]
    fn headers_are_trimmed_and_bom_stripped() {
        let csv = "\u{feff}transaction_id , date,reference_id,damage_reason\nT1,2024-01-01,,\n";
        let parsed = parse(&FINANCIAL_TRACKING, csv).unwrap();
        assert_eq!(parsed.columns[0].name, "transaction_id");
        assert_eq!(parsed.rows[0][2], Value::from(String::new()));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert_matches!(
            parse_file(Path::new("/nonexistent/inventory.csv"), &INVENTORY),
            Err(SeedError::Io { .. })
        );
    }
}

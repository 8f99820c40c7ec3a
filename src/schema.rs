//! Declarative description of the retail analytics schema.
//!
//! [`tables`] is the only place table and column names are spelled out. DDL
//! generation ([`ddl`]), header mapping in the loader and the per-column
//! normalization rules are all derived from these definitions.

mod ddl;
pub mod tables;

pub use ddl::{ensure_schema, index_statements, table_statements};
pub use tables::{
    CONVERSATIONS, EXCEPTIONS, FINANCIAL_TRACKING, INDEXES, INVENTORY, SALES_TRANSACTIONS, TABLES,
};

/// SQL type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Varchar(u32),
    Text,
    Integer,
    /// Double precision float
    Float,
    /// `DECIMAL(precision, scale)`
    Decimal(u32, u32),
    Boolean,
    Date,
    Time,
    Timestamp,
    TimestampTz,
    Uuid,
}

impl ColumnKind {
    pub fn is_textual(self) -> bool {
        matches!(self, ColumnKind::Varchar(_) | ColumnKind::Text)
    }
}

/// Value the database fills in when an insert omits the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generated {
    RandomUuid,
    CurrentTimestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub primary_key: bool,
    pub not_null: bool,
    /// Missing or empty cells load as `""` instead of NULL.
    pub blank_as_empty: bool,
    pub generated: Option<Generated>,
}

impl Column {
    pub const fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            primary_key: false,
            not_null: false,
            blank_as_empty: false,
            generated: None,
        }
    }

    pub const fn primary_key(self) -> Self {
        Self {
            primary_key: true,
            not_null: true,
            ..self
        }
    }

    pub const fn not_null(self) -> Self {
        Self {
            not_null: true,
            ..self
        }
    }

    pub const fn blank_as_empty(self) -> Self {
        Self {
            blank_as_empty: true,
            ..self
        }
    }

    pub const fn generated(self, generated: Generated) -> Self {
        Self {
            generated: Some(generated),
            ..self
        }
    }
}

#[derive(Debug)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [Column],
    /// CSV export loaded into this table, if any.
    pub source_file: Option<&'static str>,
}

impl TableDef {
    pub fn column(&self, name: &str) -> Option<&'static Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn primary_key(&self) -> Option<&'static Column> {
        self.columns.iter().find(|c| c.primary_key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexColumn {
    pub name: &'static str,
    pub descending: bool,
}

impl IndexColumn {
    pub const fn asc(name: &'static str) -> Self {
        Self {
            name,
            descending: false,
        }
    }

    pub const fn desc(name: &'static str) -> Self {
        Self {
            name,
            descending: true,
        }
    }
}

#[derive(Debug)]
pub struct IndexDef {
    pub name: &'static str,
    pub table: &'static TableDef,
    pub columns: &'static [IndexColumn],
}

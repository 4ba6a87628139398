//! Tables: column definitions, an optional repeating header, data rows.
//!
//! A table's shape is checked when it is built, whether through
//! [`TableBuilder::build`] or JSON deserialization: every row must have
//! exactly one cell per column.

use super::{ItemSize, Node};
use crate::error::{FolioError, Result};
use serde::{Deserialize, Serialize};

/// Width of one table column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ColumnWidth {
    /// A share of the width left after constant columns.
    Relative(f64),
    /// A fixed width in points.
    Constant(f64),
}

impl ColumnWidth {
    pub(crate) fn as_item_size(self) -> ItemSize {
        match self {
            ColumnWidth::Relative(w) => ItemSize::Relative(w),
            ColumnWidth::Constant(w) => ItemSize::Constant(w),
        }
    }
}

/// One row of cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub cells: Vec<Node>,
}

impl TableRow {
    pub fn new(cells: Vec<Node>) -> Self {
        Self { cells }
    }
}

/// A validated table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TableDef")]
pub struct Table {
    pub columns: Vec<ColumnWidth>,
    /// Repeated at the top of every page the table spans.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<TableRow>,
    pub rows: Vec<TableRow>,
}

/// Unchecked wire form of [`Table`].
#[derive(Deserialize)]
struct TableDef {
    columns: Vec<ColumnWidth>,
    #[serde(default)]
    header: Option<TableRow>,
    #[serde(default)]
    rows: Vec<TableRow>,
}

impl TryFrom<TableDef> for Table {
    type Error = String;

    fn try_from(def: TableDef) -> std::result::Result<Self, Self::Error> {
        let table = Table {
            columns: def.columns,
            header: def.header,
            rows: def.rows,
        };
        table.check_shape()?;
        Ok(table)
    }
}

impl Table {
    pub fn builder() -> TableBuilder {
        TableBuilder::default()
    }

    /// Every row, header included, has exactly one cell per column.
    pub(crate) fn check_shape(&self) -> std::result::Result<(), String> {
        if self.columns.is_empty() {
            return Err("table defines no columns".to_string());
        }
        let expected = self.columns.len();
        if let Some(header) = &self.header {
            if header.cells.len() != expected {
                return Err(format!(
                    "header has {} cells, expected {}",
                    header.cells.len(),
                    expected
                ));
            }
        }
        for (i, row) in self.rows.iter().enumerate() {
            if row.cells.len() != expected {
                return Err(format!(
                    "row {} has {} cells, expected {}",
                    i,
                    row.cells.len(),
                    expected
                ));
            }
        }
        Ok(())
    }
}

/// Fluent construction of a [`Table`].
///
/// Rows are added whole with [`row`](TableBuilder::row), or cell by cell
/// with [`cell`](TableBuilder::cell), where a pending row is closed as soon
/// as it holds one cell per column. Every row is checked as given in
/// [`build`](TableBuilder::build).
#[derive(Debug, Clone, Default)]
pub struct TableBuilder {
    columns: Vec<ColumnWidth>,
    header: Option<Vec<Node>>,
    rows: Vec<Vec<Node>>,
    pending: Vec<Node>,
}

impl TableBuilder {
    pub fn relative_column(mut self, weight: f64) -> Self {
        self.columns.push(ColumnWidth::Relative(weight));
        self
    }

    pub fn constant_column(mut self, width: f64) -> Self {
        self.columns.push(ColumnWidth::Constant(width));
        self
    }

    pub fn header(mut self, cells: Vec<Node>) -> Self {
        self.header = Some(cells);
        self
    }

    pub fn cell(mut self, cell: Node) -> Self {
        self.pending.push(cell);
        if !self.columns.is_empty() && self.pending.len() == self.columns.len() {
            self.rows.push(std::mem::take(&mut self.pending));
        }
        self
    }

    /// Add a complete row. Any partly filled row from [`cell`](Self::cell)
    /// is closed first, as is.
    pub fn row(mut self, cells: Vec<Node>) -> Self {
        if !self.pending.is_empty() {
            self.rows.push(std::mem::take(&mut self.pending));
        }
        self.rows.push(cells);
        self
    }

    pub fn build(mut self) -> Result<Node> {
        if !self.pending.is_empty() {
            self.rows.push(std::mem::take(&mut self.pending));
        }
        let table = Table {
            columns: self.columns,
            header: self.header.map(TableRow::new),
            rows: self.rows.into_iter().map(TableRow::new).collect(),
        };
        table.check_shape().map_err(FolioError::Structure)?;
        Ok(table.into())
    }
}

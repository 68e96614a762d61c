use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Columns added to the portal's own table headers.
pub mod columns {
    pub const PRIME_CONTRACTOR: &str = "Prime Contractor";
    pub const ORIG_CONTRACT_AMOUNT: &str = "Orig. Contract Amt";
    pub const PROJECT_NUMBER: &str = "Project Number";
}

/// A project identifier as typed into the portal's search form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    /// Trims the token; blank input is not an identifier.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    Text(String),
    Number(f64),
    #[default]
    Empty,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value)
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Empty => Ok(()),
        }
    }
}

/// A grid of cells under named columns. Every row has exactly
/// `columns.len()` cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultTable {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl ResultTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Pads short rows with empty cells and drops cells past the last column.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::Empty);
        self.rows.push(row);
    }

    /// Row-wise concatenation. Columns of `other` missing here are added at
    /// the end, and cells a row has no value for stay empty.
    pub fn append(&mut self, other: ResultTable) {
        let mapping: Vec<usize> = other
            .columns
            .iter()
            .map(|name| match self.column_index(name) {
                Some(idx) => idx,
                None => {
                    self.add_column(name.clone(), Cell::Empty);
                    self.columns.len() - 1
                }
            })
            .collect();

        let width = self.columns.len();
        for row in other.rows {
            let mut merged = vec![Cell::Empty; width];
            for (cell, &target) in row.into_iter().zip(&mapping) {
                merged[target] = cell;
            }
            self.rows.push(merged);
        }
    }

    /// Adds (or overwrites) a column holding the same value on every row.
    pub fn set_constant_column(&mut self, name: &str, value: Cell) {
        match self.column_index(name) {
            Some(idx) => {
                for row in &mut self.rows {
                    row[idx] = value.clone();
                }
            }
            None => self.add_column(name.to_string(), value),
        }
    }

    pub fn rename_columns(&mut self, mut rename: impl FnMut(&str) -> String) {
        for column in &mut self.columns {
            *column = rename(column);
        }
    }

    pub fn column_cells_mut(&mut self, idx: usize) -> impl Iterator<Item = &mut Cell> {
        self.rows.iter_mut().map(move |row| &mut row[idx])
    }

    /// Cells of every row rearranged to `header`, empty where this table has
    /// no such column.
    pub fn rows_aligned_to<'a>(
        &'a self,
        header: &'a [String],
    ) -> impl Iterator<Item = Vec<&'a Cell>> + 'a {
        const EMPTY: &Cell = &Cell::Empty;
        let mapping: Vec<Option<usize>> = header.iter().map(|h| self.column_index(h)).collect();
        self.rows.iter().map(move |row| {
            mapping
                .iter()
                .map(|idx| idx.map(|i| &row[i]).unwrap_or(EMPTY))
                .collect()
        })
    }

    fn add_column(&mut self, name: String, value: Cell) {
        self.columns.push(name);
        for row in &mut self.rows {
            row.push(value.clone());
        }
    }
}

/// What scraping one project produced. Fatal failures are the `Err` side of
/// `Result<ProjectOutcome>` and abort the run.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectOutcome {
    Scraped(ResultTable),
    /// The portal has no subcontract rows for this identifier.
    NoData,
    /// Still failing after the retry budget; the portal may be slow or down.
    Transient { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportedProject {
    pub project: ProjectId,
    pub rows: usize,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedProject {
    pub project: ProjectId,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub exported: Vec<ExportedProject>,
    pub no_data: Vec<ProjectId>,
    pub failed: Vec<FailedProject>,
}

impl RunReport {
    pub fn total_rows(&self) -> usize {
        self.exported.iter().map(|p| p.rows).sum()
    }

    pub fn processed(&self) -> usize {
        self.exported.len() + self.no_data.len() + self.failed.len()
    }
}

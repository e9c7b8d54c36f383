use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use crate::engine::natural::NaturalOrder;
use crate::value::Value;
use crate::{Error, Result};

/// The reserved label occupying position 0 of every label set.
pub const ID_LABEL: &str = "id";

/// Synthetic identifiers count up from here, in row order.
const ID_BASE: u64 = 10_000;

/// Addresses a column either by numeric position or by label.
///
/// Labels resolve to the first match when duplicates exist. How a numeric
/// index is interpreted depends on the operation: queries count from the
/// full layout (0 is the `id` column), mutations count data columns only
/// (0 is the first column after `id`), so the reserved column is out of
/// numeric reach for mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRef {
    /// A zero-based column position.
    Index(usize),
    /// A column label.
    Label(String),
}

impl From<usize> for ColumnRef {
    fn from(index: usize) -> Self {
        ColumnRef::Index(index)
    }
}

impl From<&str> for ColumnRef {
    fn from(label: &str) -> Self {
        ColumnRef::Label(label.to_string())
    }
}

impl From<String> for ColumnRef {
    fn from(label: String) -> Self {
        ColumnRef::Label(label)
    }
}

/// One row of the grid: a synthetic identifier plus one cell per data column.
///
/// The identifier is regenerated for every row on each structural mutation
/// and is a positional display number, not a durable key.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    id: u64,
    cells: Vec<Value>,
}

impl Row {
    pub(crate) fn new(id: u64, cells: Vec<Value>) -> Self {
        Self { id, cells }
    }

    /// The row's current synthetic identifier.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The row's cells, excluding the identifier.
    pub fn cells(&self) -> &[Value] {
        &self.cells
    }
}

/// An in-memory labeled grid of rows and columns.
///
/// A table starts empty; [`create`](Table::create) establishes the label
/// set with the reserved `id` label prepended, after which rows and
/// columns are added, removed, updated and sorted through the methods
/// below. Each batch method over a slice behaves exactly as its scalar
/// counterpart applied once per element.
#[derive(Debug, Default)]
pub struct Table {
    labels: Vec<String>,
    rows: Vec<Row>,
    cols: usize,
}

impl Table {
    /// Creates an empty table: no labels, no rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current label set, leading `id` included.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Number of columns, counting the `id` column. Always equals the
    /// label count.
    pub fn column_count(&self) -> usize {
        self.cols
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// All rows in order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Replaces the label set with `id` followed by `labels`.
    ///
    /// Existing rows are not touched; callers are expected to create
    /// labels only on an empty table.
    pub fn create<S: AsRef<str>>(&mut self, labels: &[S]) -> Result<()> {
        if labels.is_empty() {
            return Err(Error::MissingArguments);
        }

        let mut set = Vec::with_capacity(labels.len() + 1);
        set.push(ID_LABEL.to_string());
        set.extend(labels.iter().map(|l| l.as_ref().to_string()));

        self.labels = set;
        self.cols = self.labels.len();
        Ok(())
    }

    /// Appends one column, backfilling every row with an empty cell.
    pub fn add_column(&mut self, name: &str) -> Result<()> {
        self.add_columns(&[name])
    }

    /// Appends one or more columns, backfilling every row with empty
    /// cells in row order.
    pub fn add_columns<S: AsRef<str>>(&mut self, names: &[S]) -> Result<()> {
        if names.is_empty() {
            return Err(Error::MissingArguments);
        }

        for name in names {
            self.labels.push(name.as_ref().to_string());
            for row in &mut self.rows {
                row.cells.push(Value::empty());
            }
        }

        self.cols = self.labels.len();
        Ok(())
    }

    /// Appends a row. Missing trailing values default to the empty
    /// string; supplying more values than there are data columns is an
    /// overflow. Regenerates all identifiers.
    pub fn add_row(&mut self, values: Vec<Value>) -> Result<()> {
        let cells = self.fit_row_cells(values)?;
        self.rows.push(Row::new(0, cells));
        self.regenerate_ids();
        Ok(())
    }

    /// Removes one column by data-column index or label.
    pub fn delete_column(&mut self, column: impl Into<ColumnRef>) -> Result<()> {
        self.delete_columns(&[column.into()])
    }

    /// Removes one or more columns. Every reference is resolved against
    /// the layout as it was before the call, then all resolved positions
    /// are compacted in a single pass, so the order of the slice cannot
    /// shift positions mid-operation.
    pub fn delete_columns(&mut self, columns: &[ColumnRef]) -> Result<()> {
        if columns.is_empty() {
            return Err(Error::MissingArguments);
        }

        // Mark: resolve against the pre-deletion layout.
        let mut marked = BTreeSet::new();
        for column in columns {
            marked.insert(self.resolve_data_column(column)?);
        }

        // Compact: drop all marked positions at once, highest first.
        for pos in marked.iter().rev() {
            self.labels.remove(*pos);
            for row in &mut self.rows {
                row.cells.remove(*pos - 1);
            }
        }

        self.cols = self.labels.len();
        Ok(())
    }

    /// Removes one row by position. Regenerates all identifiers.
    pub fn delete_row(&mut self, index: usize) -> Result<()> {
        self.delete_rows(&[index])
    }

    /// Removes one or more rows, resolving every index against the
    /// pre-deletion layout. Regenerates all identifiers.
    pub fn delete_rows(&mut self, indices: &[usize]) -> Result<()> {
        if indices.is_empty() {
            return Err(Error::MissingArguments);
        }

        let mut marked = BTreeSet::new();
        for &index in indices {
            if index >= self.rows.len() {
                return Err(Error::IndexOutOfRange(index));
            }
            marked.insert(index);
        }

        for index in marked.iter().rev() {
            self.rows.remove(*index);
        }

        self.regenerate_ids();
        Ok(())
    }

    /// Empties labels and rows. Persisted files are not touched.
    pub fn clear(&mut self) {
        self.labels.clear();
        self.rows.clear();
        self.cols = 0;
    }

    /// Returns one column as its label followed by each row's value.
    /// Numeric indices count the full layout here, so index 0 reads the
    /// `id` column.
    pub fn get_column(&self, column: impl Into<ColumnRef>) -> Result<Vec<Value>> {
        let pos = self.resolve_query_column(&column.into())?;
        let mut out = Vec::with_capacity(self.rows.len() + 1);
        out.push(Value::Str(self.labels[pos].clone()));
        for row in &self.rows {
            out.push(self.cell_at(row, pos));
        }
        Ok(out)
    }

    /// Returns several columns, one label-headed sequence per reference.
    pub fn get_columns(&self, columns: &[ColumnRef]) -> Result<Vec<Vec<Value>>> {
        if columns.is_empty() {
            return Err(Error::MissingArguments);
        }
        columns.iter().map(|c| self.get_column(c.clone())).collect()
    }

    /// Returns columns as a label-to-values mapping, without the label
    /// header inside each sequence. Duplicate labels collapse onto one
    /// entry, later references overwriting earlier ones.
    pub fn get_columns_map(&self, columns: &[ColumnRef]) -> Result<BTreeMap<String, Vec<Value>>> {
        if columns.is_empty() {
            return Err(Error::MissingArguments);
        }

        let mut out = BTreeMap::new();
        for column in columns {
            let pos = self.resolve_query_column(column)?;
            let values = self.rows.iter().map(|row| self.cell_at(row, pos)).collect();
            out.insert(self.labels[pos].clone(), values);
        }
        Ok(out)
    }

    /// Returns the row at `index`, identifier included.
    pub fn get_row(&self, index: usize) -> Result<&Row> {
        self.rows.get(index).ok_or(Error::IndexOutOfRange(index))
    }

    /// Returns the rows at the given positions, in the order requested.
    pub fn get_rows(&self, indices: &[usize]) -> Result<Vec<&Row>> {
        if indices.is_empty() {
            return Err(Error::MissingArguments);
        }
        indices.iter().map(|&i| self.get_row(i)).collect()
    }

    /// Replaces every non-identifier cell of the row at `index`, with
    /// the same padding and overflow rules as [`add_row`](Table::add_row).
    /// Regenerates all identifiers.
    pub fn update_row(&mut self, index: usize, values: Vec<Value>) -> Result<()> {
        if index >= self.rows.len() {
            return Err(Error::IndexOutOfRange(index));
        }
        let cells = self.fit_row_cells(values)?;
        self.rows[index].cells = cells;
        self.regenerate_ids();
        Ok(())
    }

    /// Replaces a single cell. `column` is a zero-based data-column
    /// index; the identifier cannot be addressed. Identifiers are not
    /// regenerated.
    pub fn update_cell(&mut self, row: usize, column: usize, value: Value) -> Result<()> {
        if row >= self.rows.len() {
            return Err(Error::IndexOutOfRange(row));
        }
        if column >= self.cols.saturating_sub(1) {
            return Err(Error::IndexOutOfRange(column));
        }
        self.rows[row].cells[column] = value;
        Ok(())
    }

    /// Replaces a column's label and values in one call. Missing values
    /// default to the empty string; more values than rows is an
    /// overflow. The reserved `id` column cannot be targeted.
    pub fn update_column(
        &mut self,
        column: impl Into<ColumnRef>,
        new_label: &str,
        values: Vec<Value>,
    ) -> Result<()> {
        let pos = self.resolve_data_column(&column.into())?;
        if values.len() > self.rows.len() {
            return Err(Error::ColumnOverflow);
        }

        let mut values = values;
        values.resize(self.rows.len(), Value::empty());

        self.labels[pos] = new_label.to_string();
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.cells[pos - 1] = value;
        }
        Ok(())
    }

    /// Sorts one column's values in natural order, leaving every other
    /// column untouched. The reserved `id` column cannot be targeted.
    pub fn sort_column(&mut self, column: impl Into<ColumnRef>, reverse: bool) -> Result<()> {
        self.sort_column_with(column, reverse, &NaturalOrder::new())
    }

    /// [`sort_column`](Table::sort_column) with a caller-configured
    /// comparator, e.g. one carrying an alphabet override.
    pub fn sort_column_with(
        &mut self,
        column: impl Into<ColumnRef>,
        reverse: bool,
        order: &NaturalOrder,
    ) -> Result<()> {
        let pos = self.resolve_data_column(&column.into())?;

        let mut values: Vec<Value> = self.rows.iter().map(|r| r.cells[pos - 1].clone()).collect();
        values.sort_by(|a, b| order.compare(&a.to_string(), &b.to_string()));
        if reverse {
            values.reverse();
        }

        for (row, value) in self.rows.iter_mut().zip(values) {
            row.cells[pos - 1] = value;
        }
        Ok(())
    }

    /// Renders the table as an aligned text grid of labels over
    /// formatted cell values. Presentation only.
    pub fn render(&self) -> String {
        let formatted: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                let mut line = Vec::with_capacity(self.cols);
                line.push(row.id.to_string());
                line.extend(row.cells.iter().map(Value::to_string));
                line
            })
            .collect();

        let mut widths: Vec<usize> = self.labels.iter().map(|l| l.chars().count()).collect();
        for line in &formatted {
            for (w, cell) in widths.iter_mut().zip(line) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let rules: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();

        let mut out = String::new();
        render_line(&mut out, self.labels.iter().map(String::as_str), &widths);
        render_line(&mut out, rules.iter().map(String::as_str), &widths);
        for line in &formatted {
            render_line(&mut out, line.iter().map(String::as_str), &widths);
        }
        out
    }

    /// Prints [`render`](Table::render) to standard output.
    pub fn view(&self) {
        print!("{}", self.render());
    }

    /// Replaces the whole table contents. Used by retrieval.
    pub(crate) fn restore(&mut self, labels: Vec<String>, rows: Vec<Row>) {
        self.cols = labels.len();
        self.labels = labels;
        self.rows = rows;
    }

    /// Pads or rejects incoming row values against the current layout.
    fn fit_row_cells(&self, values: Vec<Value>) -> Result<Vec<Value>> {
        let data_cols = self.cols.saturating_sub(1);
        if self.cols == 0 || values.len() > data_cols {
            return Err(Error::RowOverflow);
        }
        let mut cells = values;
        cells.resize(data_cols, Value::empty());
        Ok(cells)
    }

    /// Resolves a query reference against the full layout; position 0 is
    /// the `id` column.
    fn resolve_query_column(&self, column: &ColumnRef) -> Result<usize> {
        match column {
            ColumnRef::Index(index) => {
                if *index >= self.cols {
                    return Err(Error::IndexOutOfRange(*index));
                }
                Ok(*index)
            }
            ColumnRef::Label(label) => self
                .labels
                .iter()
                .position(|l| l == label)
                .ok_or_else(|| Error::ColumnNotFound(label.clone())),
        }
    }

    /// Resolves a mutation reference to a full-layout position at least
    /// 1; numeric indices count data columns and the `id` label is
    /// rejected outright.
    fn resolve_data_column(&self, column: &ColumnRef) -> Result<usize> {
        match column {
            ColumnRef::Index(index) => {
                if *index >= self.cols.saturating_sub(1) {
                    return Err(Error::IndexOutOfRange(*index));
                }
                Ok(index + 1)
            }
            ColumnRef::Label(label) => {
                if label == ID_LABEL {
                    return Err(Error::ProtectedColumn(label.clone()));
                }
                self.labels
                    .iter()
                    .position(|l| l == label)
                    .ok_or_else(|| Error::ColumnNotFound(label.clone()))
            }
        }
    }

    /// The value at a full-layout position; position 0 yields the
    /// identifier in its string form.
    fn cell_at(&self, row: &Row, pos: usize) -> Value {
        if pos == 0 {
            Value::Str(row.id.to_string())
        } else {
            row.cells[pos - 1].clone()
        }
    }

    /// Reassigns identifiers sequentially from 10001, in row order.
    fn regenerate_ids(&mut self) {
        for (offset, row) in self.rows.iter_mut().enumerate() {
            row.id = ID_BASE + 1 + offset as u64;
        }
    }
}

fn render_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    for (i, (cell, width)) in cells.zip(widths).enumerate() {
        if i > 0 {
            out.push_str("  ");
        }
        let _ = write!(out, "{:<width$}", cell, width = *width);
    }
    out.push('\n');
}

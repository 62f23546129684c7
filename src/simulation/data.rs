//! Trial, block and dataset containers plus the tabular output of `eval`/`sim`.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// A single cell: numbers for stimuli, choices and outcomes; text for labels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Num(f64),
    Text(String),
}

impl Value {
    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Num(x) => Some(*x),
            Self::Text(_) => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Num(_) => None,
            Self::Text(s) => Some(s),
        }
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Num(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Num(if b { 1.0 } else { 0.0 })
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// One row of observed (or generated) data, keyed by column name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trial {
    fields: IndexMap<String, Value>,
}

impl Trial {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<Value>) {
        self.fields.insert(name.to_owned(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.shift_remove(name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Reads a numeric field.
    ///
    /// # Errors
    /// `MissingField` if absent, `NotNumeric` if the cell holds text.
    pub fn num(&self, name: &str) -> Result<f64> {
        self.get(name)
            .ok_or_else(|| ModelError::MissingField(name.to_owned()))?
            .as_f64()
            .ok_or_else(|| ModelError::NotNumeric(name.to_owned()))
    }

    /// Reads a text field.
    ///
    /// # Errors
    /// `MissingField` if absent or not text.
    pub fn text(&self, name: &str) -> Result<&str> {
        self.get(name)
            .and_then(Value::as_str)
            .ok_or_else(|| ModelError::MissingField(name.to_owned()))
    }

    /// Reads a numeric field holding a zero-based index, such as a choice.
    ///
    /// # Errors
    /// As [`Trial::num`], plus `InvalidField` when the value is negative,
    /// fractional or not finite.
    pub fn index(&self, name: &str) -> Result<usize> {
        let x = self.num(name)?;
        if !x.is_finite() || x < 0.0 || x.fract() != 0.0 {
            return Err(ModelError::InvalidField(format!("{name} = {x} is not an index")));
        }
        Ok(x as usize)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

/// An ordered run of trials sharing one `block_type`.
///
/// Trials are processed strictly in order; no state crosses block boundaries.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Block {
    pub trials: Vec<Trial>,
}

impl Block {
    #[must_use]
    pub const fn new(trials: Vec<Trial>) -> Self {
        Self { trials }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.trials.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }

    /// Block type, read from the first trial's `block_type` column.
    ///
    /// # Errors
    /// `EmptyBlock` with the given id when there are no trials,
    /// `MissingField` when the column is absent.
    pub fn block_type(&self, id: &str) -> Result<&str> {
        self.trials
            .first()
            .ok_or_else(|| ModelError::EmptyBlock(id.to_owned()))?
            .text("block_type")
    }

    /// Drops a column from every trial.
    pub fn drop_column(&mut self, name: &str) {
        for trial in &mut self.trials {
            trial.remove(name);
        }
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.trials.iter().any(|t| t.contains(name))
    }
}

/// Blocks keyed by a unique block id, iterated in insertion order.
pub type Dataset = IndexMap<String, Block>;

/// Row-oriented output of `eval` and `sim`.
///
/// Column order is the order of first appearance across rows; a row that
/// lacks a column holds no value there.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Trial>,
}

impl Table {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Trial] {
        &self.rows
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// All cells of one column in row order.
    #[must_use]
    pub fn column(&self, name: &str) -> Vec<Option<&Value>> {
        self.rows.iter().map(|r| r.get(name)).collect()
    }

    /// Numeric cells of one column; text and unset cells are `None`.
    #[must_use]
    pub fn numbers(&self, name: &str) -> Vec<Option<f64>> {
        self.rows
            .iter()
            .map(|r| r.get(name).and_then(Value::as_f64))
            .collect()
    }

    pub fn push_row(&mut self, row: Trial) {
        for col in row.columns() {
            if !self.has_column(col) {
                self.columns.push(col.to_owned());
            }
        }
        self.rows.push(row);
    }

    /// Appends another table's rows below this one.
    pub fn append(&mut self, other: Self) {
        for row in other.rows {
            self.push_row(row);
        }
    }
}

/// Per-trial values recorded while running one block.
///
/// Cells start unset; columns never set for any trial are dropped
/// before the predictions are attached to the block's data.
#[derive(Debug)]
pub(crate) struct Predictions {
    columns: Vec<String>,
    cells: Vec<Vec<Option<Value>>>,
}

impl Predictions {
    pub(crate) fn new(columns: Vec<String>, n_rows: usize) -> Self {
        let width = columns.len();
        Self {
            columns,
            cells: vec![vec![None; width]; n_rows],
        }
    }

    pub(crate) fn set(&mut self, row: usize, col: usize, value: Option<Value>) {
        self.cells[row][col] = value;
    }

    /// Removes every column that holds no value in any row.
    pub(crate) fn drop_empty(&mut self) {
        let keep: Vec<bool> = (0..self.columns.len())
            .map(|c| self.cells.iter().any(|row| row[c].is_some()))
            .collect();
        let mut idx = 0;
        self.columns.retain(|_| {
            idx += 1;
            keep[idx - 1]
        });
        for row in &mut self.cells {
            let mut idx = 0;
            row.retain(|_| {
                idx += 1;
                keep[idx - 1]
            });
        }
    }

    #[cfg(test)]
    pub(crate) fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Joins the recorded columns onto the block's trials, row by row.
    pub(crate) fn attach(mut self, trials: Vec<Trial>) -> Table {
        self.drop_empty();
        let mut table = Table::new();
        for (mut trial, row) in trials.into_iter().zip(self.cells) {
            for (name, cell) in self.columns.iter().zip(row) {
                if let Some(value) = cell {
                    trial.insert(name, value);
                }
            }
            table.push_row(trial);
        }
        for col in &self.columns {
            if !table.has_column(col) {
                table.columns.push(col.clone());
            }
        }
        table
    }
}

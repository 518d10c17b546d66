//! Result sets produced by a procedure call

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::ProcValue;

/// A row from a result set.
///
/// Column lookup is case-insensitive. Columns keep the order in which they
/// were inserted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<ProcValue>,
}

impl Row {
    /// Create an empty row
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from column names and values paired by position
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, ProcValue)>,
        S: Into<String>,
    {
        let mut row = Self::new();
        for (name, value) in pairs {
            row.insert(name, value);
        }
        row
    }

    /// Set a column value.
    ///
    /// A name that matches an existing column case-insensitively replaces
    /// that column's value and keeps its original spelling.
    pub fn insert(&mut self, name: impl Into<String>, value: ProcValue) {
        let name = name.into();
        match self.position(&name) {
            Some(idx) => self.values[idx] = value,
            None => {
                self.columns.push(name);
                self.values.push(value);
            }
        }
    }

    /// Get a value by column name, ignoring case
    pub fn get(&self, name: &str) -> Option<&ProcValue> {
        self.position(name).map(|idx| &self.values[idx])
    }

    /// Get a value by column index
    pub fn get_index(&self, index: usize) -> Option<&ProcValue> {
        self.values.get(index)
    }

    /// Get column names
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Get column values
    pub fn values(&self) -> &[ProcValue] {
        &self.values
    }

    /// Iterate (column, value) pairs in column order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProcValue)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the row has no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| eq_ignore_case(c, name))
    }
}

/// Case-insensitive comparison that only walks the Unicode lowercase mapping
/// when the names are not ASCII
fn eq_ignore_case(a: &str, b: &str) -> bool {
    if a.is_ascii() && b.is_ascii() {
        return a.eq_ignore_ascii_case(b);
    }
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// One tabular output of a procedure call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl ResultSet {
    /// Create an empty result set with the given column names
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row given its values in column order.
    ///
    /// Extra values beyond the known columns are ignored; missing values are
    /// filled with NULL.
    pub fn push_values(&mut self, values: Vec<ProcValue>) {
        let mut values = values.into_iter();
        let row = Row::from_pairs(
            self.columns
                .iter()
                .map(|name| (name.clone(), values.next().unwrap_or(ProcValue::Null))),
        );
        self.rows.push(row);
    }

    /// Append an already-built row
    pub fn push_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Column names as reported by the database
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows in the order they were produced
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Whether the set has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Serialize for ResultSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(row)?;
        }
        seq.end()
    }
}

/// Every result set of one procedure call, in production order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSets {
    sets: Vec<ResultSet>,
}

impl ResultSets {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a result set
    pub fn push(&mut self, set: ResultSet) {
        self.sets.push(set);
    }

    /// The most recently appended result set
    pub fn last(&self) -> Option<&ResultSet> {
        self.sets.last()
    }

    /// Mutable access to the most recently appended result set
    pub fn last_mut(&mut self) -> Option<&mut ResultSet> {
        self.sets.last_mut()
    }

    /// Get a result set by position
    pub fn get(&self, index: usize) -> Option<&ResultSet> {
        self.sets.get(index)
    }

    /// Iterate result sets in order
    pub fn iter(&self) -> std::slice::Iter<'_, ResultSet> {
        self.sets.iter()
    }

    /// Row count of each result set, in order
    pub fn row_counts(&self) -> Vec<usize> {
        self.sets.iter().map(ResultSet::row_count).collect()
    }

    /// Total rows across all result sets
    pub fn total_rows(&self) -> usize {
        self.sets.iter().map(ResultSet::row_count).sum()
    }

    /// Number of result sets
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Whether no result set was produced
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

impl From<Vec<ResultSet>> for ResultSets {
    fn from(sets: Vec<ResultSet>) -> Self {
        Self { sets }
    }
}

impl IntoIterator for ResultSets {
    type Item = ResultSet;
    type IntoIter = std::vec::IntoIter<ResultSet>;

    fn into_iter(self) -> Self::IntoIter {
        self.sets.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultSets {
    type Item = &'a ResultSet;
    type IntoIter = std::slice::Iter<'a, ResultSet>;

    fn into_iter(self) -> Self::IntoIter {
        self.sets.iter()
    }
}

impl Serialize for ResultSets {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.sets.len()))?;
        for set in &self.sets {
            seq.serialize_element(set)?;
        }
        seq.end()
    }
}

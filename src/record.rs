//! Ordered column-to-value maps used for rows and statement arguments.

use indexmap::IndexMap;

use crate::error::Error;
use crate::error::Result;
use crate::value::FromValue;
use crate::value::IntoValue;
use crate::value::Value;

/// An ordered map of column names to values.
///
/// Query results come back as records, and the insert/update builders take
/// their column sets from one. Iteration order is insertion order, which is
/// what keeps a generated column list aligned with its parameter vector.
/// Setting an existing column overwrites the value in place, so duplicate
/// keys cannot occur. Equality compares contents; two records with the same
/// columns in different orders are equal.
///
/// # Example
///
/// ```ignore
/// use tabletalk::record;
///
/// let movie = record! {
///     "title" => "A New Hope",
///     "director" => "George Lucas",
///     "release_year" => 1977,
/// };
/// assert_eq!(movie.get_as::<i64>("release_year")?, 1977);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Record {
    columns: IndexMap<String, Value>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Record { columns: IndexMap::new() }
    }

    /// Creates an empty record with room for `capacity` columns.
    pub fn with_capacity(capacity: usize) -> Self {
        Record { columns: IndexMap::with_capacity(capacity) }
    }

    /// Sets a column, overwriting in place if it already exists.
    pub fn set(&mut self, column: impl Into<String>, value: impl IntoValue) {
        self.columns.insert(column.into(), value.into_value());
    }

    /// Fluent form of [`Record::set`].
    pub fn with(mut self, column: impl Into<String>, value: impl IntoValue) -> Self {
        self.set(column, value);
        self
    }

    /// Returns the value for `column`, if present.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns.get(column)
    }

    /// Returns the value for `column`, matching the name case-insensitively.
    ///
    /// Exact matches win over case-insensitive ones.
    pub fn get_ignore_case(&self, column: &str) -> Option<&Value> {
        if let Some(value) = self.columns.get(column) {
            return Some(value);
        }
        self.columns
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(column))
            .map(|(_, value)| value)
    }

    /// Returns the value for `column` converted to `T`.
    ///
    /// # Errors
    ///
    /// [`Error::ColumnNotFound`] when the column is missing, or the
    /// conversion error from [`FromValue`].
    pub fn get_as<T: FromValue>(&self, column: &str) -> Result<T> {
        match self.columns.get(column) {
            Some(value) => T::from_value(value.clone()),
            None => Err(Error::ColumnNotFound(column.to_string())),
        }
    }

    /// Removes a column, preserving the order of the remaining ones.
    pub fn remove(&mut self, column: &str) -> Option<Value> {
        self.columns.shift_remove(column)
    }

    /// Returns `true` if the record has a column with this exact name.
    pub fn contains_key(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if the record has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column names in insertion order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.columns.values()
    }

    /// `(column, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl std::ops::Index<&str> for Record {
    type Output = Value;

    /// Panics if the column is missing; use [`Record::get`] for a fallible
    /// lookup.
    fn index(&self, column: &str) -> &Value {
        self.columns
            .get(column)
            .unwrap_or_else(|| panic!("no column named {:?}", column))
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Record { columns: iter.into_iter().collect() }
    }
}

impl Extend<(String, Value)> for Record {
    fn extend<I: IntoIterator<Item = (String, Value)>>(&mut self, iter: I) {
        self.columns.extend(iter);
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.into_iter()
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

/// Builds a [`Record`] from `column => value` pairs.
///
/// # Example
///
/// ```ignore
/// use tabletalk::record;
///
/// let rec = record! { "name" => "Luke", "movie_id" => 1 };
/// ```
#[macro_export]
macro_rules! record {
    () => {
        $crate::Record::new()
    };
    ($($column:expr => $value:expr),+ $(,)?) => {{
        let mut record = $crate::Record::new();
        $(record.set($column, $value);)+
        record
    }};
}

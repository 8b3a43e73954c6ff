//! Column-oriented dataset buffers
//!
//! A `ColumnBuffers` value maps field names (in schema order) to ordered
//! string values. Records appended through [`ColumnBuffers::push_record`]
//! always add exactly one value to every column, so scraped datasets keep
//! equal column lengths. Sets built column by column (for example, loaded
//! back from a CSV file) may be uneven; consumers pad with empty strings.

/// A typed record that can be flattened onto a fixed column schema
pub trait Record {
    /// Column names, in output order
    const FIELDS: &'static [&'static str];

    /// One value per entry of `FIELDS`, in the same order
    fn values(&self) -> Vec<String>;
}

/// Ordered mapping of field name to ordered column values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnBuffers {
    columns: Vec<(String, Vec<String>)>,
}

impl ColumnBuffers {
    /// Creates an empty buffer set with no columns
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty buffer set with the given column schema
    pub fn with_schema(fields: &[&str]) -> Self {
        Self {
            columns: fields
                .iter()
                .map(|name| (name.to_string(), Vec::new()))
                .collect(),
        }
    }

    /// Builds a buffer set from typed records, one row per record
    pub fn from_records<'a, R, I>(records: I) -> Self
    where
        R: Record + 'a,
        I: IntoIterator<Item = &'a R>,
    {
        let mut buffers = Self::with_schema(R::FIELDS);
        for record in records {
            buffers.push_record(record);
        }
        buffers
    }

    /// Appends one record, adding exactly one value to every column
    ///
    /// Columns the record does not know about receive an empty string; record
    /// fields without a matching column are added as new columns padded to the
    /// current row count.
    pub fn push_record<R: Record>(&mut self, record: &R) {
        let rows = self.row_count();
        let values = record.values();
        let mut touched = vec![false; self.columns.len()];

        for (field, value) in R::FIELDS.iter().zip(values) {
            match self.position(field) {
                Some(index) => {
                    self.columns[index].1.push(value);
                    touched[index] = true;
                }
                None => {
                    let mut column = vec![String::new(); rows];
                    column.push(value);
                    self.columns.push((field.to_string(), column));
                    touched.push(true);
                }
            }
        }

        for (index, was_touched) in touched.into_iter().enumerate() {
            if !was_touched {
                self.columns[index].1.push(String::new());
            }
        }
    }

    /// Inserts or replaces a whole column
    pub fn insert_column(&mut self, name: &str, values: Vec<String>) {
        match self.position(name) {
            Some(index) => self.columns[index].1 = values,
            None => self.columns.push((name.to_string(), values)),
        }
    }

    /// Returns the values of a column, if present
    pub fn column(&self, name: &str) -> Option<&[String]> {
        self.position(name)
            .map(|index| self.columns[index].1.as_slice())
    }

    /// Returns the value at `row` in column `name`, padding with "" when missing
    pub fn value(&self, name: &str, row: usize) -> &str {
        self.column(name)
            .and_then(|values| values.get(row))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Column names in schema order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows, taken as the longest column
    pub fn row_count(&self) -> usize {
        self.columns
            .iter()
            .map(|(_, values)| values.len())
            .max()
            .unwrap_or(0)
    }

    /// True when no column holds any value
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Returns row `index` with every column right-padded to the longest one
    pub fn padded_row(&self, index: usize) -> Vec<&str> {
        self.columns
            .iter()
            .map(|(_, values)| values.get(index).map(String::as_str).unwrap_or(""))
            .collect()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|(column, _)| column == name)
    }
}

//! Builder pattern for constructing DataFrames

use indexmap::IndexMap;

use super::*;

/// Builder for creating DataFrames
pub struct DataFrameBuilder {
    columns: IndexMap<String, Series>,
    nrows: Option<usize>,
    index: Option<Index>,
}

impl Default for DataFrameBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DataFrameBuilder {
    /// Create a new DataFrameBuilder
    pub fn new() -> Self {
        Self {
            columns: IndexMap::new(),
            nrows: None,
            index: None,
        }
    }

    /// Add a column to the DataFrame
    pub fn with_column<S: Into<String>>(mut self, name: S, series: Series) -> Result<Self> {
        let name = name.into();

        if self.columns.contains_key(&name) {
            return Err(DataError::DuplicateColumn(name));
        }

        // Check dimension consistency
        match self.nrows {
            Some(n) if series.len() != n => {
                return Err(DataError::DimensionMismatch {
                    expected: format!("{} rows", n),
                    actual: format!("{} rows", series.len()),
                });
            }
            None => {
                self.nrows = Some(series.len());
            }
            _ => {}
        }

        self.columns.insert(name, series);
        Ok(self)
    }

    /// Set the index
    pub fn with_index(mut self, index: Index) -> Self {
        self.index = Some(index);
        self
    }

    /// Shorthand for a monthly index
    pub fn with_months(self, months: Vec<Month>) -> Self {
        self.with_index(Index::monthly(months))
    }

    /// Build the DataFrame
    pub fn build(self) -> Result<DataFrame> {
        let nrows = match (&self.index, self.nrows) {
            (Some(index), Some(n)) if index.len() != n => {
                return Err(DataError::DimensionMismatch {
                    expected: format!("index of length {}", n),
                    actual: format!("index of length {}", index.len()),
                });
            }
            (Some(index), None) => index.len(),
            (_, Some(n)) => n,
            (None, None) => 0,
        };

        Ok(DataFrame {
            columns: self.columns,
            index: self.index.unwrap_or_else(|| Index::range(nrows)),
            nrows,
        })
    }
}

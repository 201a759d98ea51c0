use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use std::collections::HashMap;

/// A sheet representing a 2D grid of cells (row-major storage)
#[derive(Debug, Clone)]
pub struct Sheet {
    name: String,
    data: Vec<Vec<CellValue>>,
    column_names: Option<Vec<String>>,
    column_index: Option<HashMap<String, usize>>,
    /// 0-based spreadsheet row that `data[0]` was loaded from
    first_row: usize,
}

impl Sheet {
    /// Create a new empty sheet
    #[must_use]
    pub fn new() -> Self {
        Self::with_name("Sheet1")
    }

    /// Create a new empty sheet with a name
    #[must_use]
    pub fn with_name(name: &str) -> Self {
        Sheet {
            name: name.to_string(),
            data: Vec::new(),
            column_names: None,
            column_index: None,
            first_row: 0,
        }
    }

    /// Create a sheet from a 2D vector of values
    #[must_use]
    pub fn from_data<T: Into<CellValue>>(data: Vec<Vec<T>>) -> Self {
        let converted: Vec<Vec<CellValue>> = data
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();

        let mut sheet = Self::new();
        sheet.data = converted;
        sheet
    }

    /// Get the sheet name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of rows (header row included)
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    /// Get the number of columns
    #[must_use]
    pub fn col_count(&self) -> usize {
        self.data.first().map_or(0, Vec::len)
    }

    /// 1-based spreadsheet row number for a row index, counting any empty
    /// rows above the loaded data.
    #[must_use]
    pub fn spreadsheet_row(&self, index: usize) -> usize {
        self.first_row + index + 1
    }

    pub(crate) fn set_first_row(&mut self, first_row: usize) {
        self.first_row = first_row;
    }

    // ===== Cell Access =====

    /// Get a cell value by row and column index (0-based)
    pub fn get(&self, row: usize, col: usize) -> Result<&CellValue> {
        self.data
            .get(row)
            .and_then(|r| r.get(col))
            .ok_or(SheetError::IndexOutOfBounds {
                row,
                col,
                rows: self.row_count(),
                cols: self.col_count(),
            })
    }

    /// Get a cell by row index and column name. Cells past the end of a
    /// short row read as `Null`.
    pub fn get_by_name(&self, row: usize, col_name: &str) -> Result<&CellValue> {
        let col = self.column_index_by_name(col_name)?;
        let cells = self.row(row)?;
        Ok(cells.get(col).unwrap_or(&CellValue::Null))
    }

    // ===== Row Operations =====

    /// Get a row by index
    pub fn row(&self, index: usize) -> Result<&Vec<CellValue>> {
        self.data.get(index).ok_or(SheetError::RowIndexOutOfBounds {
            index,
            count: self.row_count(),
        })
    }

    /// Append a row; its length must match the existing column count
    pub fn row_append<T: Into<CellValue>>(&mut self, data: Vec<T>) -> Result<()> {
        if !self.data.is_empty() && data.len() != self.col_count() {
            return Err(SheetError::LengthMismatch {
                expected: self.col_count(),
                actual: data.len(),
            });
        }
        self.data.push(data.into_iter().map(Into::into).collect());
        Ok(())
    }

    /// Iterate over all rows, header row included
    pub fn rows(&self) -> impl Iterator<Item = &Vec<CellValue>> {
        self.data.iter()
    }

    /// Iterate over the rows below the header, paired with their 0-based
    /// row index. Yields every row when columns are not named.
    pub fn data_rows(&self) -> impl Iterator<Item = (usize, &Vec<CellValue>)> {
        let start_row = usize::from(self.column_names.is_some());
        self.data.iter().enumerate().skip(start_row)
    }

    /// Get mutable access to the raw data. Column names are cleared since the
    /// header row may change.
    pub fn data_mut(&mut self) -> &mut Vec<Vec<CellValue>> {
        self.column_names = None;
        self.column_index = None;
        &mut self.data
    }

    // ===== Named Access =====

    /// Use the specified row as column headers.
    ///
    /// Header cells are stringified. An empty header at column `i` becomes
    /// `Unnamed: i`; repeated names get `.1`, `.2`, ... suffixes.
    pub fn name_columns_by_row(&mut self, row_index: usize) -> Result<()> {
        let header_row = self.row(row_index)?;

        let mut names = Vec::with_capacity(header_row.len());
        let mut index_map = HashMap::new();
        let mut seen: HashMap<String, usize> = HashMap::new();

        for (i, cell) in header_row.iter().enumerate() {
            let base = match cell.as_str() {
                s if s.is_empty() => format!("Unnamed: {i}"),
                s => s,
            };

            let mut name = base.clone();
            while index_map.contains_key(&name) {
                let count = seen.entry(base.clone()).or_insert(0);
                *count += 1;
                name = format!("{base}.{count}");
            }

            index_map.insert(name.clone(), i);
            names.push(name);
        }

        self.column_names = Some(names);
        self.column_index = Some(index_map);
        Ok(())
    }

    /// Get column names (if set)
    #[must_use]
    pub fn column_names(&self) -> Option<&Vec<String>> {
        self.column_names.as_ref()
    }

    /// Check whether a named column exists
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index
            .as_ref()
            .is_some_and(|index| index.contains_key(name))
    }

    /// Get the column index by name
    pub fn column_index_by_name(&self, name: &str) -> Result<usize> {
        self.column_index
            .as_ref()
            .ok_or_else(|| {
                SheetError::ColumnsNotNamed("Call name_columns_by_row() first".to_string())
            })?
            .get(name)
            .copied()
            .ok_or_else(|| SheetError::ColumnNotFound {
                name: name.to_string(),
            })
    }
}

impl Default for Sheet {
    fn default() -> Self {
        Self::new()
    }
}

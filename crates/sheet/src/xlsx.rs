use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use crate::sheet::Sheet;
use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use chrono::Timelike;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

/// Options for reading Excel files
#[derive(Debug, Clone, Default)]
pub struct XlsxReadOptions {
    /// Whether the first row contains headers
    pub has_headers: bool,
}

impl XlsxReadOptions {
    /// Set whether the first row contains headers
    #[must_use]
    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }
}

/// Convert calamine Data to CellValue
fn data_to_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Null,
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::String(s.clone()),
        // Durations have no calendar date and stay numeric
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) if dt.is_datetime() => CellValue::Date(datetime),
            _ => CellValue::Float(dt.as_f64()),
        },
        Data::DateTimeIso(s) => CellValue::String(s.clone()),
        Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::String(format!("#ERROR: {e:?}")),
    }
}

fn range_to_sheet(name: &str, range: &Range<Data>, options: &XlsxReadOptions) -> Result<Sheet> {
    let data: Vec<Vec<CellValue>> = range
        .rows()
        .map(|row| row.iter().map(data_to_cell_value).collect())
        .collect();

    let mut sheet = Sheet::with_name(name);
    *sheet.data_mut() = data;
    // the range begins at the first used cell, not at A1
    if let Some((first_row, _)) = range.start() {
        sheet.set_first_row(first_row as usize);
    }

    if options.has_headers && sheet.row_count() > 0 {
        sheet.name_columns_by_row(0)?;
    }

    Ok(sheet)
}

/// Read the first worksheet of an opened workbook; other sheets are ignored.
fn first_sheet<RS: Read + Seek>(
    workbook: &mut Xlsx<RS>,
    options: &XlsxReadOptions,
) -> Result<Sheet> {
    let Some(name) = workbook.sheet_names().first().cloned() else {
        return Ok(Sheet::new());
    };

    match workbook.worksheet_range_at(0) {
        Some(range) => range_to_sheet(&name, &range?, options),
        None => Ok(Sheet::with_name(&name)),
    }
}

impl Sheet {
    /// Load the first sheet of an Excel file
    pub fn from_xlsx<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_xlsx_with_options(path, XlsxReadOptions::default())
    }

    /// Load the first sheet of an Excel file with options
    pub fn from_xlsx_with_options<P: AsRef<Path>>(
        path: P,
        options: XlsxReadOptions,
    ) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SheetError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            )));
        }
        let mut workbook: Xlsx<BufReader<File>> = open_workbook(path)?;
        first_sheet(&mut workbook, &options)
    }

    /// Load the first sheet of an in-memory Excel workbook
    pub fn from_xlsx_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_xlsx_bytes_with_options(bytes, XlsxReadOptions::default())
    }

    /// Load the first sheet of an in-memory Excel workbook with options
    pub fn from_xlsx_bytes_with_options(bytes: &[u8], options: XlsxReadOptions) -> Result<Self> {
        let mut workbook = Xlsx::new(Cursor::new(bytes))?;
        first_sheet(&mut workbook, &options)
    }

    /// Save the sheet to an Excel file
    pub fn save_as_xlsx<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut workbook = self.to_workbook()?;
        workbook.save(path.as_ref())?;
        Ok(())
    }

    /// Serialize the sheet to an in-memory single-sheet workbook
    pub fn to_xlsx_bytes(&self) -> Result<Vec<u8>> {
        let mut workbook = self.to_workbook()?;
        Ok(workbook.save_to_buffer()?)
    }

    fn to_workbook(&self) -> Result<Workbook> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        self.write_to_worksheet(worksheet)?;
        Ok(workbook)
    }

    /// Write sheet data to a worksheet
    fn write_to_worksheet(&self, worksheet: &mut Worksheet) -> Result<()> {
        worksheet.set_name(self.name())?;

        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        let datetime_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

        for (row_idx, row) in self.rows().enumerate() {
            let row_num = u32::try_from(row_idx)
                .map_err(|_| SheetError::Write("Row index overflow".to_string()))?;

            for (col_idx, cell) in row.iter().enumerate() {
                let col_num = u16::try_from(col_idx)
                    .map_err(|_| SheetError::Write("Column index overflow".to_string()))?;

                match cell {
                    CellValue::Null => {} // Leave empty
                    CellValue::Bool(b) => {
                        worksheet.write_boolean(row_num, col_num, *b)?;
                    }
                    CellValue::Int(i) => {
                        // Excel stores all numbers as f64, so integers > 2^53 lose precision
                        worksheet.write_number(row_num, col_num, *i as f64)?;
                    }
                    CellValue::Float(f) => {
                        worksheet.write_number(row_num, col_num, *f)?;
                    }
                    CellValue::String(s) => {
                        worksheet.write_string(row_num, col_num, s)?;
                    }
                    CellValue::Date(dt) => {
                        let format = if dt.num_seconds_from_midnight() == 0 {
                            &date_format
                        } else {
                            &datetime_format
                        };
                        worksheet.write_datetime_with_format(row_num, col_num, dt, format)?;
                    }
                }
            }
        }

        Ok(())
    }
}

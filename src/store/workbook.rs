//! An in-memory, values-only view of an `.xlsx` workbook. Reading is done with `calamine` and
//! writing with `rust_xlsxwriter`; formatting, formulas and other workbook parts are not kept.

use crate::error::Res;
use crate::model::{Category, Cell};
use anyhow::Context;
use calamine::{Reader, Xlsx};
use std::io::Cursor;

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Workbook {
    sheets: Vec<Sheet>,
}

/// A sheet is a name and its rows. Rows are stored from physical row 1 and have no trailing
/// empty cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Sheet {
    pub(crate) name: String,
    pub(crate) rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }
}

impl Workbook {
    /// A workbook with one empty sheet per category and nothing else.
    pub(crate) fn new_ledger() -> Self {
        Self {
            sheets: Category::ALL
                .iter()
                .map(|c| Sheet::new(c.sheet_name()))
                .collect(),
        }
    }

    /// Parses the bytes of an `.xlsx` file.
    ///
    /// # Errors
    /// - If the bytes are not a readable `.xlsx` workbook.
    pub(crate) fn decode(bytes: Vec<u8>) -> Res<Self> {
        let mut xlsx: Xlsx<_> =
            Xlsx::new(Cursor::new(bytes)).context("Unable to open the data as an xlsx workbook")?;
        let sheet_names = xlsx.sheet_names().to_owned();

        let mut sheets = Vec::with_capacity(sheet_names.len());
        for name in sheet_names {
            let range = xlsx
                .worksheet_range(&name)
                .with_context(|| format!("Unable to read worksheet '{name}'"))?;

            let (row_offset, col_offset) = range.start().unwrap_or((0, 0));
            let row_offset = row_offset as usize;
            let col_offset = col_offset as usize;

            let mut rows: Vec<Vec<Cell>> = Vec::new();
            for (row, col, data) in range.cells() {
                let cell = Cell::from(data);
                if cell == Cell::Empty {
                    continue;
                }
                let (row, col) = (row_offset + row, col_offset + col);
                if rows.len() <= row {
                    rows.resize_with(row + 1, Vec::new);
                }
                let cells = &mut rows[row];
                if cells.len() <= col {
                    cells.resize(col + 1, Cell::Empty);
                }
                cells[col] = cell;
            }
            sheets.push(Sheet { name, rows });
        }
        Ok(Self { sheets })
    }

    /// Serializes the workbook to `.xlsx` bytes.
    pub(crate) fn encode(&self) -> Res<Vec<u8>> {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        for sheet in &self.sheets {
            let worksheet = workbook.add_worksheet();
            worksheet
                .set_name(&sheet.name)
                .with_context(|| format!("Invalid sheet name '{}'", sheet.name))?;
            for (row_ix, row) in sheet.rows.iter().enumerate() {
                let row_num = u32::try_from(row_ix)
                    .with_context(|| format!("Too many rows in sheet '{}'", sheet.name))?;
                for (col_ix, cell) in row.iter().enumerate() {
                    let col_num = u16::try_from(col_ix)
                        .with_context(|| format!("Too many columns in sheet '{}'", sheet.name))?;
                    let written = match cell {
                        Cell::Empty => continue,
                        Cell::Text(s) if s.is_empty() => continue,
                        Cell::Text(s) => worksheet.write_string(row_num, col_num, s),
                        Cell::Number(n) => worksheet.write_number(row_num, col_num, *n),
                        Cell::Bool(b) => worksheet.write_boolean(row_num, col_num, *b),
                    };
                    written.with_context(|| {
                        format!(
                            "Unable to write cell ({row_ix}, {col_ix}) of sheet '{}'",
                            sheet.name
                        )
                    })?;
                }
            }
        }
        workbook
            .save_to_buffer()
            .context("Unable to serialize the workbook")
    }

    #[cfg(test)]
    pub(crate) fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub(crate) fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub(crate) fn sheet_mut(&mut self, name: &str) -> Option<&mut Sheet> {
        self.sheets.iter_mut().find(|s| s.name == name)
    }

    /// Appends an empty sheet and returns it.
    pub(crate) fn add_sheet(&mut self, name: impl Into<String>) -> &mut Sheet {
        let index = self.sheets.len();
        self.sheets.push(Sheet::new(name));
        &mut self.sheets[index]
    }
}

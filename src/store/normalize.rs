//! Brings every category sheet of a workbook into its canonical shape: one header row matching the
//! category's columns, followed by data rows.

use crate::model::mapping::Mapping;
use crate::model::schema::Column;
use crate::model::{Category, Cell};
use crate::store::workbook::{Sheet, Workbook};
use tracing::{debug, warn};

/// What `normalize` changed. Empty when the workbook was already canonical.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub(crate) struct Normalized {
    pub(crate) changes: Vec<String>,
    /// Categories whose data rows were rearranged to follow a new header.
    pub(crate) remapped: Vec<Category>,
}

impl Normalized {
    pub(crate) fn is_changed(&self) -> bool {
        !self.changes.is_empty()
    }
}

/// Normalizes all category sheets in place. Running it a second time changes nothing.
pub(crate) fn normalize(workbook: &mut Workbook) -> Normalized {
    let mut out = Normalized::default();
    for category in Category::ALL {
        let name = category.sheet_name();
        if workbook.sheet(name).is_none() {
            out.changes.push(format!("Created sheet '{name}'"));
            workbook.add_sheet(name);
        }
        if let Some(sheet) = workbook.sheet_mut(name) {
            normalize_sheet(category, sheet, &mut out);
        }
    }
    for change in &out.changes {
        debug!("{change}");
    }
    out
}

fn normalize_sheet(category: Category, sheet: &mut Sheet, out: &mut Normalized) {
    let name = sheet.name.clone();
    let header: Vec<Cell> = category.headers().into_iter().map(Cell::text).collect();

    let blank = sheet.rows.iter().take_while(|r| is_blank_row(r)).count();
    if blank > 0 {
        sheet.rows.drain(..blank);
        out.changes.push(format!(
            "Removed {blank} blank leading row(s) from '{name}'"
        ));
    }

    match sheet.rows.first() {
        None => {
            sheet.rows.push(header.clone());
            out.changes.push(format!("Wrote the header row of '{name}'"));
        }
        Some(first) if row_equals(first, &header) => {}
        Some(first) => match stale_header(first) {
            Some(mapping) => {
                let stale = first.clone();
                let data: Vec<Vec<Cell>> = sheet
                    .rows
                    .drain(1..)
                    .filter(|r| !row_equals(r, &stale))
                    .map(|r| remap_row(category, &mapping, r))
                    .collect();
                sheet.rows = std::iter::once(header.clone()).chain(data).collect();
                warn!("The header row of '{name}' did not match its columns, the rows were remapped");
                out.changes
                    .push(format!("Remapped '{name}' from an outdated header row"));
                out.remapped.push(category);
            }
            None => {
                sheet.rows.insert(0, header.clone());
                out.changes
                    .push(format!("Inserted the header row above the data in '{name}'"));
            }
        },
    }

    let before = sheet.rows.len();
    let mut rows = std::mem::take(&mut sheet.rows).into_iter();
    sheet.rows.extend(rows.next());
    sheet.rows.extend(rows.filter(|r| !row_equals(r, &header)));
    let removed = before - sheet.rows.len();
    if removed > 0 {
        out.changes.push(format!(
            "Removed {removed} duplicate header row(s) from '{name}'"
        ));
    }
}

fn is_blank_row(row: &[Cell]) -> bool {
    row.iter().all(Cell::is_blank)
}

/// Compares a row to the expected cells, ignoring trailing blanks.
fn row_equals(row: &[Cell], expected: &[Cell]) -> bool {
    let len = row.len().max(expected.len());
    (0..len).all(|ix| {
        let a = row.get(ix).unwrap_or(&Cell::Empty);
        let b = expected.get(ix).unwrap_or(&Cell::Empty);
        match (a.is_blank(), b.is_blank()) {
            (true, true) => true,
            (false, false) => a == b,
            _ => false,
        }
    })
}

/// A first row is a stale header if at least two of its cells are headers of known columns. Other
/// cells, including repeats of a known header, are ignored. Returns the mapping of the known
/// headers by position.
fn stale_header(row: &[Cell]) -> Option<Mapping> {
    let mut seen: Vec<Column> = Vec::new();
    let headers: Vec<&str> = row
        .iter()
        .map(|cell| {
            let known = cell
                .as_str()
                .and_then(|s| Column::from_header(s.trim()))
                .filter(|column| !seen.contains(column));
            match known {
                Some(column) => {
                    seen.push(column);
                    column.header()
                }
                None => "",
            }
        })
        .collect();
    if seen.len() < 2 {
        return None;
    }
    Mapping::new(headers).ok()
}

fn remap_row(category: Category, mapping: &Mapping, row: Vec<Cell>) -> Vec<Cell> {
    let mut row: Vec<Option<Cell>> = row.into_iter().map(Some).collect();
    let mut out: Vec<Cell> = category
        .columns()
        .iter()
        .map(|column| {
            let source = mapping.header_index(column.header()).or_else(|| {
                category
                    .aliases(*column)
                    .iter()
                    .find_map(|alias| mapping.field_index(alias))
            });
            source
                .and_then(|ix| row.get_mut(ix).and_then(Option::take))
                .unwrap_or_default()
        })
        .collect();
    while out.last().is_some_and(|c| *c == Cell::Empty) {
        out.pop();
    }
    out
}

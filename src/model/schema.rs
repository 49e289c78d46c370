//! The columns that can appear in a category sheet, with their header text, logical field name
//! and value kind.

use serde::{Deserialize, Serialize};

/// A known column of a category sheet.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Name,
    Date,
    Description,
    Reference,
    Amount,
    Vat,
    Total,
    Notes,
    Method,
    Actions,
    Done,
}

serde_plain::derive_display_from_serialize!(Column);

/// How the values of a column are stored and coerced.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Free text.
    Text,
    /// An ISO-8601 date string, `YYYY-MM-DD`.
    Date,
    /// A decimal amount stored as a spreadsheet number.
    Decimal,
    /// A list of short tags stored as one comma-joined string.
    Tags,
    /// A boolean.
    Flag,
}

/// Columns of the sales, purchases and expenses sheets.
pub const STANDARD_COLUMNS: &[Column] = &[
    Column::Name,
    Column::Date,
    Column::Description,
    Column::Reference,
    Column::Amount,
    Column::Vat,
    Column::Total,
    Column::Actions,
    Column::Done,
];

/// Columns of the received sheet.
pub const RECEIVED_COLUMNS: &[Column] = &[
    Column::Name,
    Column::Date,
    Column::Amount,
    Column::Notes,
    Column::Method,
    Column::Actions,
    Column::Done,
];

/// Every column, used to recognize header rows written by an older schema.
pub const ALL_COLUMNS: &[Column] = &[
    Column::Name,
    Column::Date,
    Column::Description,
    Column::Reference,
    Column::Amount,
    Column::Vat,
    Column::Total,
    Column::Notes,
    Column::Method,
    Column::Actions,
    Column::Done,
];

impl Column {
    pub fn from_header(header: impl AsRef<str>) -> Option<Column> {
        let header = header.as_ref();
        ALL_COLUMNS.iter().find(|c| c.header() == header).copied()
    }

    pub fn from_field(field: impl AsRef<str>) -> Option<Column> {
        let field = field.as_ref();
        ALL_COLUMNS.iter().find(|c| c.field() == field).copied()
    }

    /// The text of this column's header cell.
    pub fn header(&self) -> &'static str {
        match self {
            Column::Name => NAME_STR,
            Column::Date => DATE_STR,
            Column::Description => DESCRIPTION_STR,
            Column::Reference => REFERENCE_STR,
            Column::Amount => AMOUNT_STR,
            Column::Vat => VAT_STR,
            Column::Total => TOTAL_STR,
            Column::Notes => NOTES_STR,
            Column::Method => METHOD_STR,
            Column::Actions => ACTIONS_STR,
            Column::Done => DONE_STR,
        }
    }

    /// The logical field name used by API payloads.
    pub fn field(&self) -> &'static str {
        match self {
            Column::Name => NAME_COL,
            Column::Date => DATE_COL,
            Column::Description => DESCRIPTION_COL,
            Column::Reference => REFERENCE_COL,
            Column::Amount => AMOUNT_COL,
            Column::Vat => VAT_COL,
            Column::Total => TOTAL_COL,
            Column::Notes => NOTES_COL,
            Column::Method => METHOD_COL,
            Column::Actions => ACTIONS_COL,
            Column::Done => DONE_COL,
        }
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            Column::Name
            | Column::Description
            | Column::Reference
            | Column::Notes
            | Column::Method => ColumnKind::Text,
            Column::Date => ColumnKind::Date,
            Column::Amount | Column::Vat | Column::Total => ColumnKind::Decimal,
            Column::Actions => ColumnKind::Tags,
            Column::Done => ColumnKind::Flag,
        }
    }
}

pub(super) const NAME_STR: &str = "Name";
pub(super) const NAME_COL: &str = "name";

pub(super) const DATE_STR: &str = "Date";
pub(super) const DATE_COL: &str = "date";

pub(super) const DESCRIPTION_STR: &str = "Description";
pub(super) const DESCRIPTION_COL: &str = "description";

pub(super) const REFERENCE_STR: &str = "Reference";
pub(super) const REFERENCE_COL: &str = "reference";

pub(super) const AMOUNT_STR: &str = "Amount";
pub(super) const AMOUNT_COL: &str = "amount";

pub(super) const VAT_STR: &str = "VAT";
pub(super) const VAT_COL: &str = "vat";

pub(super) const TOTAL_STR: &str = "Total";
pub(super) const TOTAL_COL: &str = "total";

pub(super) const NOTES_STR: &str = "Notes";
pub(super) const NOTES_COL: &str = "notes";

pub(super) const METHOD_STR: &str = "Method";
pub(super) const METHOD_COL: &str = "method";

pub(super) const ACTIONS_STR: &str = "Actions";
pub(super) const ACTIONS_COL: &str = "actions";

pub(super) const DONE_STR: &str = "Done";
pub(super) const DONE_COL: &str = "done";

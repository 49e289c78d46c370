use crate::error::{ErrorType, IntoResult};
use crate::model::schema::{Column, RECEIVED_COLUMNS, STANDARD_COLUMNS};
use crate::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};

/// The kinds of transaction that the ledger records. Each category is stored in its own sheet
/// and has its own set of columns.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Sales,
    Received,
    Purchases,
    Expenses,
}

serde_plain::derive_display_from_serialize!(Category);
serde_plain::derive_fromstr_from_deserialize!(Category);

impl Category {
    /// All categories, in the order their sheets appear in a new workbook.
    pub const ALL: [Category; 4] = [
        Category::Sales,
        Category::Received,
        Category::Purchases,
        Category::Expenses,
    ];

    /// Parses a category name as it arrives from a request path or payload.
    ///
    /// # Errors
    /// - `ErrorType::InvalidCategory` if `name` is not one of the four categories.
    pub fn parse(name: &str) -> Result<Self> {
        name.parse::<Category>()
            .with_context(|| format!("Invalid transaction type '{name}'"))
            .pub_result(ErrorType::InvalidCategory)
    }

    /// The name of the sheet that holds this category's rows.
    pub fn sheet_name(&self) -> &'static str {
        match self {
            Category::Sales => SALES_SHEET,
            Category::Received => RECEIVED_SHEET,
            Category::Purchases => PURCHASES_SHEET,
            Category::Expenses => EXPENSES_SHEET,
        }
    }

    /// The ordered columns of this category's sheet.
    pub fn columns(&self) -> &'static [Column] {
        match self {
            Category::Received => RECEIVED_COLUMNS,
            Category::Sales | Category::Purchases | Category::Expenses => STANDARD_COLUMNS,
        }
    }

    /// The header row of this category's sheet.
    pub fn headers(&self) -> Vec<&'static str> {
        self.columns().iter().map(|c| c.header()).collect()
    }

    /// Other logical field names that feed `column` in this category. For `received`, a
    /// `description` is stored as `Notes`.
    pub fn aliases(&self, column: Column) -> &'static [&'static str] {
        match (self, column) {
            (Category::Received, Column::Notes) => &[DESCRIPTION_ALIAS],
            _ => &[],
        }
    }

    /// The keys that may carry a value for `column` in a request payload, in order of precedence:
    /// the logical field name, any aliases, then the header.
    pub fn keys(&self, column: Column) -> Vec<&'static str> {
        let mut keys = vec![column.field()];
        keys.extend_from_slice(self.aliases(column));
        keys.push(column.header());
        keys
    }

    /// Resolves a key from a request payload to one of this category's columns. The key may be the
    /// logical field name (`vat`), the header (`VAT`) or an alias.
    pub fn resolve(&self, key: &str) -> Option<Column> {
        self.columns()
            .iter()
            .find(|c| self.keys(**c).contains(&key))
            .copied()
    }
}

const DESCRIPTION_ALIAS: &str = "description";

const SALES_SHEET: &str = "Sales";
const RECEIVED_SHEET: &str = "Received";
const PURCHASES_SHEET: &str = "Purchases";
const EXPENSES_SHEET: &str = "Expenses";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert_eq!(Category::parse("sales").unwrap(), Category::Sales);
        assert_eq!(Category::parse("received").unwrap(), Category::Received);
        assert_eq!(Category::parse("purchases").unwrap(), Category::Purchases);
        assert_eq!(Category::parse("expenses").unwrap(), Category::Expenses);
    }

    #[test]
    fn test_parse_invalid() {
        for bad in ["refunds", "Sales", "", "sales "] {
            let err = Category::parse(bad).unwrap_err();
            assert_eq!(err.error_type(), ErrorType::InvalidCategory, "{bad}");
        }
    }

    #[test]
    fn test_display_round_trip() {
        for category in Category::ALL {
            let s = category.to_string();
            assert_eq!(Category::parse(&s).unwrap(), category);
        }
    }

    #[test]
    fn test_sheet_names() {
        let names: Vec<&str> = Category::ALL.iter().map(|c| c.sheet_name()).collect();
        assert_eq!(names, vec!["Sales", "Received", "Purchases", "Expenses"]);
    }

    #[test]
    fn test_headers() {
        assert_eq!(
            Category::Purchases.headers(),
            vec!["Name", "Date", "Description", "Reference", "Amount", "VAT", "Total", "Actions", "Done"]
        );
        assert_eq!(
            Category::Received.headers(),
            vec!["Name", "Date", "Amount", "Notes", "Method", "Actions", "Done"]
        );
    }

    #[test]
    fn test_resolve_field_and_header() {
        assert_eq!(Category::Sales.resolve("vat"), Some(Column::Vat));
        assert_eq!(Category::Sales.resolve("VAT"), Some(Column::Vat));
        assert_eq!(Category::Sales.resolve("description"), Some(Column::Description));
        assert_eq!(Category::Sales.resolve("method"), None);
        assert_eq!(Category::Sales.resolve("notes"), None);
        assert_eq!(Category::Sales.resolve("paidStatus"), None);
    }

    #[test]
    fn test_resolve_received() {
        assert_eq!(Category::Received.resolve("method"), Some(Column::Method));
        assert_eq!(Category::Received.resolve("Notes"), Some(Column::Notes));
        assert_eq!(Category::Received.resolve("description"), Some(Column::Notes));
        assert_eq!(Category::Received.resolve("vat"), None);
        assert_eq!(Category::Received.resolve("Total"), None);
        assert_eq!(Category::Received.resolve("reference"), None);
    }

    #[test]
    fn test_keys_precedence() {
        assert_eq!(Category::Sales.keys(Column::Vat), vec!["vat", "VAT"]);
        assert_eq!(
            Category::Received.keys(Column::Notes),
            vec!["notes", "description", "Notes"]
        );
        assert!(Category::Sales.aliases(Column::Notes).is_empty());
    }
}

use crate::model::cell::{join_tags, Cell, DATE_FORMAT};
use crate::model::schema::Column;
use crate::model::{Amount, Category};
use crate::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The payload used to create a transaction.
///
/// The `type` field names the category. It is kept as a string so that an unknown category is
/// reported as an invalid category rather than as a malformed body. Fields that do not belong to
/// the category's sheet are accepted and ignored, as are unknown fields.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    #[serde(rename = "type")]
    pub category: String,
    pub name: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    pub amount: Amount,
    #[serde(default)]
    pub vat: Option<Amount>,
    #[serde(default)]
    pub total: Option<Amount>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub actions: Option<Vec<String>>,
    #[serde(default)]
    pub done: bool,
}

impl NewTransaction {
    pub fn new(
        category: impl Into<String>,
        name: impl Into<String>,
        date: NaiveDate,
        amount: Amount,
    ) -> Self {
        Self {
            category: category.into(),
            name: name.into(),
            date,
            amount,
            ..Default::default()
        }
    }

    /// # Errors
    /// - `ErrorType::InvalidCategory` if `type` is not a known category.
    pub fn category(&self) -> Result<Category> {
        Category::parse(&self.category)
    }

    pub fn vat(&self) -> Amount {
        self.vat.unwrap_or(Amount::ZERO)
    }

    /// The given total, or `amount + vat`.
    pub fn total(&self) -> Amount {
        self.total.unwrap_or_else(|| self.amount + self.vat())
    }

    /// Builds the sheet row for `category`, in that category's column order.
    pub fn to_row(&self, category: Category) -> Vec<Cell> {
        category
            .columns()
            .iter()
            .map(|column| match column {
                Column::Name => Cell::text(self.name.as_str()),
                Column::Date => Cell::Text(self.date.format(DATE_FORMAT).to_string()),
                Column::Description => optional(self.description.as_ref()),
                Column::Reference => optional(self.reference.as_ref()),
                Column::Amount => self.amount.into(),
                Column::Vat => self.vat().into(),
                Column::Total => self.total().into(),
                Column::Notes => optional(self.notes.as_ref().or(self.description.as_ref())),
                Column::Method => optional(self.method.as_ref()),
                Column::Actions => join_tags(self.actions.as_deref().unwrap_or_default()),
                Column::Done => Cell::Bool(self.done),
            })
            .collect()
    }
}

fn optional(value: Option<&String>) -> Cell {
    match value {
        Some(s) => Cell::text(s.as_str()),
        None => Cell::Empty,
    }
}

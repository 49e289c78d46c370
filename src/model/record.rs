use crate::model::cell::Cell;
use crate::model::Category;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// One data row of a category sheet, decoded into header -> value pairs in column order.
///
/// Serializes as a JSON object keyed by header, e.g. `{"Name": "ACME", "VAT": 20, ...}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    values: Vec<(String, Value)>,
}

impl Record {
    /// Decodes a sheet row using the columns of `category`. Missing trailing cells decode as empty.
    pub fn from_row(category: Category, row: &[Cell]) -> Self {
        let values = category
            .columns()
            .iter()
            .enumerate()
            .map(|(ix, column)| {
                let cell = row.get(ix).unwrap_or(&Cell::Empty);
                (column.header().to_string(), cell.to_json(column.kind()))
            })
            .collect();
        Self { values }
    }

    pub fn get(&self, header: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(h, v)| (h.as_str(), v))
    }
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (header, value) in &self.values {
            map.serialize_entry(header, value)?;
        }
        map.end()
    }
}

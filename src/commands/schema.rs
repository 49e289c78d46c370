use crate::commands::Out;
use crate::model::{Category, ColumnKind};
use serde::Serialize;

/// Describes the sheet of one category.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaInfo {
    pub category: Category,
    pub sheet: &'static str,
    pub columns: Vec<ColumnInfo>,
}

/// Describes one column of a category sheet.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnInfo {
    pub header: &'static str,
    pub field: &'static str,
    pub kind: ColumnKind,
    #[serde(skip_serializing_if = "no_aliases")]
    pub aliases: &'static [&'static str],
}

fn no_aliases(aliases: &&'static [&'static str]) -> bool {
    aliases.is_empty()
}

/// Describes the columns of every category sheet.
pub fn schema() -> Out<Vec<SchemaInfo>> {
    let info: Vec<SchemaInfo> = Category::ALL
        .iter()
        .map(|&category| SchemaInfo {
            category,
            sheet: category.sheet_name(),
            columns: category
                .columns()
                .iter()
                .map(|&column| ColumnInfo {
                    header: column.header(),
                    field: column.field(),
                    kind: column.kind(),
                    aliases: category.aliases(column),
                })
                .collect(),
        })
        .collect();
    Out::new("The ledger has 4 categories", info)
}

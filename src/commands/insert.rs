use crate::commands::Out;
use crate::model::{NewTransaction, Record};
use crate::{Config, Result};
use serde::Serialize;
use tracing::debug;

pub(crate) const SAVED: &str = "Transaction saved.";

/// The result of an insert: where the row landed and what was stored.
#[derive(Debug, Clone, Serialize)]
pub struct Created {
    pub index: usize,
    pub record: Record,
}

/// Appends a transaction to the sheet of the category named by its `type`.
///
/// `vat` defaults to 0 and `total` to `amount + vat`. Fields that the category's sheet does not
/// have are dropped, e.g. `vat` for `received` or `method` for `sales`.
///
/// # Errors
/// - `ErrorType::InvalidCategory` if `type` is not a known category.
/// - `ErrorType::Storage` if the workbook cannot be read or written.
pub async fn insert(config: &Config, transaction: NewTransaction) -> Result<Out<Created>> {
    let category = transaction.category()?;
    let row = transaction.to_row(category);
    let record = Record::from_row(category, &row);
    let index = config.store().append(category, row).await?;
    debug!("Inserted {category} transaction at index {index}");
    Ok(Out::new(SAVED, Created { index, record }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorType;
    use crate::test::TestEnv;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_returns_index_and_record() {
        let env = TestEnv::new().await;
        let tx: NewTransaction = serde_json::from_value(json!({
            "type": "expenses",
            "name": "Fuel",
            "date": "2025-04-01",
            "amount": "45.50",
            "vat": 9.1,
            "actions": ["receipt"]
        }))
        .unwrap();

        let out = insert(&env.config(), tx.clone()).await.unwrap();
        assert_eq!(out.message(), "Transaction saved.");
        let created = out.structure().unwrap();
        assert_eq!(created.index, 0);
        assert_eq!(created.record.get("Total"), Some(&json!(54.6)));
        assert_eq!(created.record.get("Actions"), Some(&json!(["receipt"])));

        let out = insert(&env.config(), tx).await.unwrap();
        assert_eq!(out.structure().unwrap().index, 1);
    }

    #[tokio::test]
    async fn test_insert_invalid_category_writes_nothing() {
        let env = TestEnv::new().await;
        let mut tx = env.transaction("sales", "ACME");
        tx.category = "refunds".into();
        let err = insert(&env.config(), tx).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::InvalidCategory);
        assert!(!env.config().workbook_path().exists());
    }
}

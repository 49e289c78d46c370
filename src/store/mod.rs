//! The workbook store owns the `.xlsx` file. Every operation opens the file, normalizes it, does
//! its work and persists the whole workbook again.
//!
//! Operations on one `WorkbookStore`, and on its clones, are serialized by an async mutex so that
//! concurrent requests in one process cannot lose each other's writes. Nothing guards against a
//! second process writing the same file.

mod normalize;
mod workbook;

use crate::error::{Error, ErrorType, IntoResult};
use crate::model::{Category, Cell, Record};
use crate::{backup, utils, Result};
use anyhow::Context;
use normalize::normalize;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use workbook::{Sheet, Workbook};

/// Describes what happened when the workbook was opened.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
pub struct OpenReport {
    /// The workbook did not exist and was created.
    pub created: bool,
    /// The workbook could not be read. It was moved to this path and a new workbook was created.
    pub recovered_from: Option<PathBuf>,
    /// The workbook was copied here before its rows were remapped to a new header.
    pub snapshot: Option<PathBuf>,
    /// Repairs made to the category sheets.
    pub repairs: Vec<String>,
}

impl OpenReport {
    pub fn is_clean(&self) -> bool {
        !self.created && self.recovered_from.is_none() && self.repairs.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct WorkbookStore {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl WorkbookStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens the workbook, creating, recovering or repairing it as needed.
    pub async fn open(&self) -> Result<OpenReport> {
        let _guard = self.lock.lock().await;
        let (_, report) = self.load().await?;
        Ok(report)
    }

    /// Appends `row` to the category's sheet and returns the new row's index.
    pub async fn append(&self, category: Category, row: Vec<Cell>) -> Result<usize> {
        let _guard = self.lock.lock().await;
        let (mut workbook, _) = self.load().await?;
        let sheet = category_sheet_mut(&mut workbook, category)?;
        sheet.rows.push(row);
        let index = sheet.rows.len() - 2;
        self.persist(&workbook).await?;
        debug!("Appended row {index} to '{}'", category.sheet_name());
        Ok(index)
    }

    /// All data rows of the category, in sheet order.
    pub async fn list(&self, category: Category) -> Result<Vec<Record>> {
        let _guard = self.lock.lock().await;
        let (workbook, _) = self.load().await?;
        let sheet = category_sheet(&workbook, category)?;
        Ok(sheet
            .rows
            .iter()
            .skip(1)
            .map(|row| Record::from_row(category, row))
            .collect())
    }

    /// Replaces the cells named in `partial` on the row at `index` and returns the updated record.
    ///
    /// Keys may be logical field names, headers or aliases; unknown keys are ignored. Every value
    /// is coerced before anything is written, so a bad value leaves the file untouched.
    pub async fn update(
        &self,
        category: Category,
        index: usize,
        partial: &Map<String, Value>,
    ) -> Result<Record> {
        let _guard = self.lock.lock().await;
        let (mut workbook, _) = self.load().await?;
        let sheet = category_sheet_mut(&mut workbook, category)?;
        let row_ix = data_row(sheet, category, index)?;

        let mut row = sheet.rows[row_ix].clone();
        let columns = category.columns();
        if row.len() < columns.len() {
            row.resize(columns.len(), Cell::Empty);
        }
        for (ix, column) in columns.iter().enumerate() {
            let value = category
                .keys(*column)
                .into_iter()
                .find_map(|key| partial.get(key));
            if let Some(value) = value {
                row[ix] = Cell::from_update(*column, value)
                    .with_context(|| format!("Unable to update transaction {index}"))
                    .pub_result(ErrorType::Request)?;
            }
        }

        let record = Record::from_row(category, &row);
        sheet.rows[row_ix] = row;
        self.persist(&workbook).await?;
        debug!("Updated row {index} of '{}'", category.sheet_name());
        Ok(record)
    }

    /// Removes the row at `index` and returns it. Later rows move up by one.
    pub async fn delete(&self, category: Category, index: usize) -> Result<Record> {
        let _guard = self.lock.lock().await;
        let (mut workbook, _) = self.load().await?;
        let sheet = category_sheet_mut(&mut workbook, category)?;
        let row_ix = data_row(sheet, category, index)?;
        let row = sheet.rows.remove(row_ix);
        self.persist(&workbook).await?;
        debug!("Deleted row {index} of '{}'", category.sheet_name());
        Ok(Record::from_row(category, &row))
    }

    /// Reads and normalizes the workbook. Must be called with the lock held.
    async fn load(&self) -> Result<(Workbook, OpenReport)> {
        let mut report = OpenReport::default();

        let exists = utils::exists(&self.path)
            .await
            .pub_result(ErrorType::Storage)?;

        let mut workbook = if !exists {
            info!("Creating a new workbook at {}", self.path.display());
            report.created = true;
            Workbook::new_ledger()
        } else {
            let bytes = utils::read_bytes(&self.path)
                .await
                .pub_result(ErrorType::Storage)?;
            match Workbook::decode(bytes) {
                Ok(workbook) => workbook,
                Err(e) => {
                    let backup = backup::quarantine(&self.path)
                        .await
                        .context("Unable to move the unreadable workbook aside")
                        .pub_result(ErrorType::Storage)?;
                    warn!(
                        "The workbook at {} could not be read ({e:#}). It was moved to {} and a \
                        new workbook was created",
                        self.path.display(),
                        backup.display()
                    );
                    report.recovered_from = Some(backup);
                    Workbook::new_ledger()
                }
            }
        };

        let normalized = normalize(&mut workbook);
        if !normalized.remapped.is_empty() && !report.created && report.recovered_from.is_none() {
            let snapshot = backup::snapshot(&self.path)
                .await
                .context("Unable to back up the workbook before remapping its rows")
                .pub_result(ErrorType::Storage)?;
            warn!("A copy of the workbook was saved to {}", snapshot.display());
            report.snapshot = Some(snapshot);
        }
        let changed = normalized.is_changed();
        report.repairs = normalized.changes;

        if changed || report.created || report.recovered_from.is_some() {
            self.persist(&workbook).await?;
        }
        Ok((workbook, report))
    }

    async fn persist(&self, workbook: &Workbook) -> Result<()> {
        let bytes = workbook.encode().pub_result(ErrorType::Internal)?;
        utils::write_replace(&self.path, bytes)
            .await
            .context("Unable to save the workbook")
            .pub_result(ErrorType::Storage)
    }
}

fn category_sheet(workbook: &Workbook, category: Category) -> Result<&Sheet> {
    workbook.sheet(category.sheet_name()).ok_or_else(|| {
        Error::msg(
            ErrorType::Internal,
            format!("The sheet '{}' is missing", category.sheet_name()),
        )
    })
}

fn category_sheet_mut(workbook: &mut Workbook, category: Category) -> Result<&mut Sheet> {
    workbook.sheet_mut(category.sheet_name()).ok_or_else(|| {
        Error::msg(
            ErrorType::Internal,
            format!("The sheet '{}' is missing", category.sheet_name()),
        )
    })
}

/// The physical position of data row `index`, or `NotFound`.
fn data_row(sheet: &Sheet, category: Category, index: usize) -> Result<usize> {
    let count = sheet.rows.len().saturating_sub(1);
    if index >= count {
        return Err(Error::msg(
            ErrorType::NotFound,
            format!("Transaction {index} not found in {category}, which has {count} transaction(s)"),
        ));
    }
    Ok(index + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewTransaction;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::str::FromStr;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        store: WorkbookStore,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let store = WorkbookStore::new(dir.path().join("transactions.xlsx"));
        Fixture { _dir: dir, store }
    }

    fn tx(category: &str, name: &str) -> NewTransaction {
        NewTransaction::new(
            category,
            name,
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            crate::model::Amount::from_str("100").unwrap(),
        )
    }

    async fn append(store: &WorkbookStore, category: Category, name: &str) -> usize {
        let row = tx(&category.to_string(), name).to_row(category);
        store.append(category, row).await.unwrap()
    }

    async fn bytes(store: &WorkbookStore) -> Vec<u8> {
        utils::read_bytes(store.path()).await.unwrap()
    }

    fn backups(dir: &Path) -> Vec<PathBuf> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| p.to_string_lossy().contains("_backup_"))
            .collect()
    }

    #[tokio::test]
    async fn test_fresh_store_is_empty() {
        let f = fixture();
        let report = f.store.open().await.unwrap();
        assert!(report.created);
        for category in Category::ALL {
            assert!(f.store.list(category).await.unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_append_and_list() {
        let f = fixture();
        let mut new = tx("sales", "ACME");
        new.vat = Some(crate::model::Amount::from_str("20").unwrap());
        new.actions = Some(vec!["a".into(), "".into(), "b".into()]);
        let index = f
            .store
            .append(Category::Sales, new.to_row(Category::Sales))
            .await
            .unwrap();
        assert_eq!(index, 0);

        let records = f.store.list(Category::Sales).await.unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.get("Name"), Some(&json!("ACME")));
        assert_eq!(record.get("Date"), Some(&json!("2025-01-15")));
        assert_eq!(record.get("Amount"), Some(&json!(100)));
        assert_eq!(record.get("VAT"), Some(&json!(20)));
        assert_eq!(record.get("Total"), Some(&json!(120)));
        assert_eq!(record.get("Actions"), Some(&json!(["a", "b"])));
        assert_eq!(record.get("Done"), Some(&json!(false)));
    }

    #[tokio::test]
    async fn test_open_is_idempotent() {
        let f = fixture();
        append(&f.store, Category::Expenses, "Fuel").await;
        let before = bytes(&f.store).await;

        let report = f.store.open().await.unwrap();
        assert!(report.is_clean(), "{report:?}");
        f.store.list(Category::Expenses).await.unwrap();
        assert_eq!(bytes(&f.store).await, before);
    }

    #[tokio::test]
    async fn test_indices_are_stable_and_shift_on_delete() {
        let f = fixture();
        for name in ["a", "b", "c"] {
            append(&f.store, Category::Purchases, name).await;
        }
        let first = f.store.list(Category::Purchases).await.unwrap();
        let second = f.store.list(Category::Purchases).await.unwrap();
        assert_eq!(first, second);

        let removed = f.store.delete(Category::Purchases, 1).await.unwrap();
        assert_eq!(removed.get("Name"), Some(&json!("b")));

        let names: Vec<Value> = f
            .store
            .list(Category::Purchases)
            .await
            .unwrap()
            .iter()
            .map(|r| r.get("Name").unwrap().clone())
            .collect();
        assert_eq!(names, vec![json!("a"), json!("c")]);
    }

    #[tokio::test]
    async fn test_update_preserves_other_fields() {
        let f = fixture();
        append(&f.store, Category::Sales, "ACME").await;
        let before = f.store.list(Category::Sales).await.unwrap().remove(0);

        let partial = json!({"done": true, "paidStatus": "paid"});
        let updated = f
            .store
            .update(Category::Sales, 0, partial.as_object().unwrap())
            .await
            .unwrap();

        assert_eq!(updated.get("Done"), Some(&json!(true)));
        for (header, value) in before.iter().filter(|(h, _)| *h != "Done") {
            assert_eq!(updated.get(header), Some(value), "{header}");
        }
        assert_eq!(f.store.list(Category::Sales).await.unwrap()[0], updated);
    }

    #[tokio::test]
    async fn test_update_logical_key_wins_over_header() {
        let f = fixture();
        append(&f.store, Category::Received, "Client").await;
        let partial = json!({"Method": "cash", "method": "bank", "description": "deposit"});
        let updated = f
            .store
            .update(Category::Received, 0, partial.as_object().unwrap())
            .await
            .unwrap();
        assert_eq!(updated.get("Method"), Some(&json!("bank")));
        assert_eq!(updated.get("Notes"), Some(&json!("deposit")));
    }

    #[tokio::test]
    async fn test_out_of_range_leaves_file_unchanged() {
        let f = fixture();
        append(&f.store, Category::Sales, "ACME").await;
        let before = bytes(&f.store).await;

        let partial = json!({"done": true});
        let err = f
            .store
            .update(Category::Sales, 1, partial.as_object().unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::NotFound);
        let err = f.store.delete(Category::Sales, 5).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::NotFound);
        let err = f.store.delete(Category::Expenses, 0).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::NotFound);

        assert_eq!(bytes(&f.store).await, before);
    }

    #[tokio::test]
    async fn test_bad_update_value_leaves_file_unchanged() {
        let f = fixture();
        append(&f.store, Category::Sales, "ACME").await;
        let before = bytes(&f.store).await;

        let partial = json!({"name": "New Name", "date": "yesterday"});
        let err = f
            .store
            .update(Category::Sales, 0, partial.as_object().unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Request);
        assert_eq!(bytes(&f.store).await, before);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_backed_up_and_replaced() {
        let f = fixture();
        let garbage = b"definitely not a zip archive".to_vec();
        utils::write(f.store.path(), &garbage).await.unwrap();

        let report = f.store.open().await.unwrap();
        let backup = report.recovered_from.unwrap();
        assert_eq!(utils::read_bytes(&backup).await.unwrap(), garbage);
        assert!(backup
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("transactions_backup_"));

        for category in Category::ALL {
            assert!(f.store.list(category).await.unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_columns_are_category_specific() {
        let f = fixture();
        let mut received = tx("received", "Client");
        received.vat = Some(crate::model::Amount::from_str("5").unwrap());
        received.reference = Some("REF".into());
        received.method = Some("bank".into());
        f.store
            .append(Category::Received, received.to_row(Category::Received))
            .await
            .unwrap();
        let mut sale = tx("sales", "ACME");
        sale.method = Some("bank".into());
        sale.notes = Some("note".into());
        f.store
            .append(Category::Sales, sale.to_row(Category::Sales))
            .await
            .unwrap();

        let received = f.store.list(Category::Received).await.unwrap().remove(0);
        for header in ["VAT", "Total", "Reference"] {
            assert_eq!(received.get(header), None);
        }
        assert_eq!(received.get("Method"), Some(&json!("bank")));

        let sale = f.store.list(Category::Sales).await.unwrap().remove(0);
        for header in ["Method", "Notes"] {
            assert_eq!(sale.get(header), None);
        }

        let workbook = Workbook::decode(bytes(&f.store).await).unwrap();
        let received_sheet = workbook.sheet("Received").unwrap();
        assert!(received_sheet.rows[1].len() <= Category::Received.columns().len());
    }

    #[tokio::test]
    async fn test_stale_header_is_remapped_with_snapshot() {
        let f = fixture();
        let mut workbook = Workbook::new_ledger();
        workbook.sheet_mut("Received").unwrap().rows = vec![
            Category::Sales.headers().into_iter().map(Cell::text).collect(),
            vec![
                Cell::text("Client"),
                Cell::text("2025-02-01"),
                Cell::text("deposit"),
                Cell::Empty,
                Cell::Number(50.0),
            ],
        ];
        let original = workbook.encode().unwrap();
        utils::write(f.store.path(), &original).await.unwrap();

        let report = f.store.open().await.unwrap();
        let snapshot = report.snapshot.unwrap();
        assert_eq!(utils::read_bytes(&snapshot).await.unwrap(), original);

        let records = f.store.list(Category::Received).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("Notes"), Some(&json!("deposit")));
        assert_eq!(records[0].get("Amount"), Some(&json!(50)));
        assert_eq!(backups(f._dir.path()).len(), 1);
    }

    #[tokio::test]
    async fn test_header_with_extra_column_is_not_listed() {
        let f = fixture();
        let mut header: Vec<Cell> = Category::Sales.headers().into_iter().map(Cell::text).collect();
        header.push(Cell::text("Paid"));
        let mut row = tx("sales", "ACME").to_row(Category::Sales);
        row.push(Cell::text("yes"));
        let mut workbook = Workbook::new_ledger();
        workbook.sheet_mut("Sales").unwrap().rows = vec![header, row];
        let original = workbook.encode().unwrap();
        utils::write(f.store.path(), &original).await.unwrap();

        let records = f.store.list(Category::Sales).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("Name"), Some(&json!("ACME")));
        assert_eq!(records[0].get("Amount"), Some(&json!(100)));

        let snapshots = backups(f._dir.path());
        assert_eq!(snapshots.len(), 1);
        assert_eq!(utils::read_bytes(&snapshots[0]).await.unwrap(), original);

        f.store.delete(Category::Sales, 0).await.unwrap();
        assert!(f.store.list(Category::Sales).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_to_all_null_keeps_the_row() {
        let f = fixture();
        append(&f.store, Category::Sales, "ACME").await;

        let partial = json!({
            "name": null,
            "date": null,
            "description": null,
            "reference": null,
            "amount": null,
            "vat": null,
            "total": null,
            "actions": null,
            "done": null
        });
        let record = f
            .store
            .update(Category::Sales, 0, partial.as_object().unwrap())
            .await
            .unwrap();
        assert_eq!(record.get("Done"), Some(&json!(false)));
        assert_eq!(record.get("Name"), Some(&Value::Null));

        let records = f.store.list(Category::Sales).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0], record);
        f.store.delete(Category::Sales, 0).await.unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_appends_all_land() {
        let f = fixture();
        f.store.open().await.unwrap();
        let mut handles = Vec::new();
        for i in 0..10 {
            let store = f.store.clone();
            handles.push(tokio::spawn(async move {
                let row = tx("expenses", &format!("item {i}")).to_row(Category::Expenses);
                store.append(Category::Expenses, row).await.unwrap()
            }));
        }
        let mut indices = Vec::new();
        for handle in handles {
            indices.push(handle.await.unwrap());
        }
        indices.sort();
        assert_eq!(indices, (0..10).collect::<Vec<_>>());
        assert_eq!(f.store.list(Category::Expenses).await.unwrap().len(), 10);
    }
}

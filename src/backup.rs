//! Backup copies of the workbook, taken before it is replaced or rewritten.
//!
//! Backups sit next to the workbook and are named `{stem}_backup_{YYYYmmdd_HHMMSS}.{ext}`, e.g.
//! `transactions_backup_20250114_093012.xlsx`. If that name is taken a sequence number is added:
//! `transactions_backup_20250114_093012_001.xlsx`.

use crate::error::Res;
use crate::utils;
use anyhow::{bail, Context};
use chrono::{Local, NaiveDateTime};
use std::path::{Path, PathBuf};

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const MAX_SEQUENCE: u32 = 999;

/// Moves the file at `path` to a new backup name and returns that name. Used when the file cannot
/// be read as a workbook and will be recreated.
pub(crate) async fn quarantine(path: &Path) -> Res<PathBuf> {
    let backup = next_free(path).await?;
    utils::rename(path, &backup).await?;
    Ok(backup)
}

/// Copies the file at `path` to a new backup name and returns that name.
pub(crate) async fn snapshot(path: &Path) -> Res<PathBuf> {
    let backup = next_free(path).await?;
    utils::copy(path, &backup).await?;
    Ok(backup)
}

async fn next_free(path: &Path) -> Res<PathBuf> {
    let now = Local::now().naive_local();
    for seq in 0..=MAX_SEQUENCE {
        let candidate = backup_path(path, now, seq)?;
        if !utils::exists(&candidate).await? {
            return Ok(candidate);
        }
    }
    bail!(
        "Unable to find a free backup name for {} after {MAX_SEQUENCE} attempts",
        path.display()
    )
}

/// Builds the backup name for `path` at `time`. A `seq` of zero has no sequence suffix.
fn backup_path(path: &Path, time: NaiveDateTime, seq: u32) -> Res<PathBuf> {
    let stem = path
        .file_stem()
        .with_context(|| format!("The path {} has no file name", path.display()))?
        .to_string_lossy();
    let timestamp = time.format(TIMESTAMP_FORMAT);
    let mut name = format!("{stem}_backup_{timestamp}");
    if seq > 0 {
        name.push_str(&format!("_{seq:03}"));
    }
    if let Some(ext) = path.extension() {
        name.push('.');
        name.push_str(&ext.to_string_lossy());
    }
    Ok(path.with_file_name(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 14)
            .unwrap()
            .and_hms_opt(9, 30, 12)
            .unwrap()
    }

    #[test]
    fn test_backup_path() {
        let path = Path::new("/data/transactions.xlsx");
        assert_eq!(
            backup_path(path, time(), 0).unwrap(),
            PathBuf::from("/data/transactions_backup_20250114_093012.xlsx")
        );
        assert_eq!(
            backup_path(path, time(), 7).unwrap(),
            PathBuf::from("/data/transactions_backup_20250114_093012_007.xlsx")
        );
    }

    #[test]
    fn test_backup_path_without_extension() {
        let path = Path::new("ledger");
        assert_eq!(
            backup_path(path, time(), 0).unwrap(),
            PathBuf::from("ledger_backup_20250114_093012")
        );
    }

    #[tokio::test]
    async fn test_quarantine_and_snapshot_do_not_collide() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("transactions.xlsx");
        utils::write(&path, b"first").await.unwrap();

        let copied = snapshot(&path).await.unwrap();
        let moved = quarantine(&path).await.unwrap();

        assert_ne!(copied, moved);
        assert!(!path.exists());
        assert_eq!(utils::read_bytes(&copied).await.unwrap(), b"first");
        assert_eq!(utils::read_bytes(&moved).await.unwrap(), b"first");
        let name = moved.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("transactions_backup_"), "{name}");
        assert!(name.ends_with(".xlsx"), "{name}");
    }
}

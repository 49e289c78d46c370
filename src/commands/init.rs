use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{utils, Config, Result};
use anyhow::Context;
use std::path::{Path, PathBuf};

/// Creates the ledger home directory and:
/// - Creates an initial `config.json` file with default settings, or with the given `workbook`
///   path and `listen` address
/// - Creates the workbook with one sheet per category
///
/// # Arguments
/// - `ledger_home` - The directory that will be the ledger home, e.g. `$HOME/ledger`
/// - `workbook` - The workbook location, relative to `ledger_home` or absolute
/// - `listen` - The address that `ledger serve` binds to
///
/// # Errors
/// - Returns an error if the home is already initialized or any file operation fails.
pub async fn init(
    ledger_home: &Path,
    workbook: Option<PathBuf>,
    listen: Option<String>,
) -> Result<Out<()>> {
    let config = Config::create(ledger_home, workbook, listen).await?;

    if let Some(parent) = config.workbook_path().parent() {
        utils::make_dir(parent)
            .await
            .context("Unable to create the workbook directory")
            .pub_result(ErrorType::Storage)?;
    }
    config.store().open().await?;

    Ok(format!(
        "Successfully created the ledger directory at {} with the workbook {}",
        config.root().display(),
        config.workbook_path().display()
    )
    .into())
}

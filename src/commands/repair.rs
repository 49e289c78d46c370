use crate::commands::Out;
use crate::store::OpenReport;
use crate::{Config, Result};

/// Opens the workbook, which creates, recovers or normalizes it as needed, and reports what was
/// done.
pub async fn repair(config: &Config) -> Result<Out<OpenReport>> {
    let report = config.store().open().await?;
    let path = config.workbook_path().display();
    let message = if report.created {
        format!("Created a new workbook at {path}")
    } else if let Some(backup) = &report.recovered_from {
        format!(
            "The workbook at {path} was unreadable. It was moved to {} and replaced",
            backup.display()
        )
    } else if report.is_clean() {
        format!("The workbook at {path} is in good shape")
    } else {
        format!("Repaired the workbook at {path}")
    };
    Ok(Out::new(message, report))
}

//! Delete command handler.

use crate::commands::Out;
use crate::model::{Category, Record};
use crate::{Config, Result};

pub(crate) const DELETED: &str = "Transaction deleted.";

/// Deletes the transaction at `index` and returns it. Every later transaction's index goes down
/// by one.
pub async fn delete(config: &Config, category: &str, index: usize) -> Result<Out<Record>> {
    let category = Category::parse(category)?;
    let record = config.store().delete(category, index).await?;
    Ok(Out::new(DELETED, record))
}

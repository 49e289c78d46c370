//! Update command handler.

use crate::commands::Out;
use crate::error::{Error, ErrorType};
use crate::model::{Category, Record};
use crate::{Config, Result};
use serde_json::Value;

pub(crate) const UPDATED: &str = "Transaction updated.";

/// Updates the transaction at `index` with the values in `partial`.
///
/// `partial` must be a JSON object. Its keys may be logical field names (`vat`), headers (`VAT`)
/// or, for `received`, `description` (stored as `Notes`). A logical key takes precedence over a
/// header key for the same column. `actions` may be a list of strings. Unknown keys are ignored.
///
/// # Errors
/// - `ErrorType::InvalidCategory` if `category` is not a known category.
/// - `ErrorType::NotFound` if there is no transaction at `index`.
/// - `ErrorType::Request` if `partial` is not an object or a value does not fit its column.
pub async fn update(
    config: &Config,
    category: &str,
    index: usize,
    partial: Value,
) -> Result<Out<Record>> {
    let category = Category::parse(category)?;
    let Value::Object(partial) = partial else {
        return Err(Error::msg(
            ErrorType::Request,
            "The update must be a JSON object",
        ));
    };
    let record = config.store().update(category, index, &partial).await?;
    Ok(Out::new(UPDATED, record))
}

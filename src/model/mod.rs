//! Types that represent the core data model: categories and their column schemas, cells, records
//! and the payload used to create a transaction.
mod amount;
mod category;
pub(crate) mod cell;
pub(crate) mod mapping;
pub(crate) mod schema;
mod record;
mod transaction;

pub use amount::{Amount, AmountError};
pub use category::Category;
pub use cell::Cell;
pub use record::Record;
pub use schema::{Column, ColumnKind};
pub use transaction::NewTransaction;

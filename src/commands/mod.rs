//! Command handlers for the ledger CLI and HTTP API.
//!
//! Each handler validates its input, delegates to the workbook store and returns an `Out` value.

mod delete;
mod init;
mod insert;
mod list;
mod repair;
mod schema;
mod serve;
mod update;

use serde::Serialize;
use std::fmt::Debug;
use tracing::info;

pub use delete::delete;
pub use init::init;
pub use insert::{insert, Created};
pub use list::list;
pub use repair::repair;
pub use schema::{schema, ColumnInfo, SchemaInfo};
pub use serve::serve;
pub use update::update;

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data to both the command line and HTTP interfaces.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    #[serde(skip_serializing_if = "Option::is_none")]
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Takes the structured data.
    pub fn into_structure(self) -> Option<T> {
        self.structure
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to stdout.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                println!("{json}");
            }
        }
    }
}

/// Formats a count with a singular or plural noun, e.g. `1 transaction`, `2 transactions`.
fn plural(count: usize, noun: &str) -> String {
    format!("{count} {noun}{}", if count == 1 { "" } else { "s" })
}

//! These structs provide the CLI interface for the ledger CLI.

use crate::model::{Amount, Category, ColumnKind, NewTransaction};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// ledger: Records sales, receipts, purchases and expenses in an xlsx workbook.
///
/// Each kind of transaction is kept in its own sheet of the workbook. Transactions can be added,
/// listed, updated and deleted from the command line or through an HTTP API (see `ledger serve`).
/// A transaction is addressed by its position in its sheet, starting at 0. Deleting a transaction
/// moves every later transaction up by one.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the ledger directory, its configuration file and an empty workbook.
    ///
    /// This is the first command you should run. By default the ledger lives in $HOME/ledger, pass
    /// --ledger-home to put it somewhere else.
    Init(InitArgs),
    /// Serve the HTTP API until interrupted.
    Serve(ServeArgs),
    /// Add a transaction.
    Insert(Box<InsertArgs>),
    /// Print every transaction of a category as JSON.
    List(ListArgs),
    /// Change fields of one transaction.
    Update(UpdateArgs),
    /// Delete one transaction.
    Delete(DeleteArgs),
    /// Open the workbook and fix it: create it if missing, replace it if unreadable (keeping a
    /// backup) and restore the header row of each sheet.
    Repair,
    /// Print the columns of each category.
    Schema,
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the ledger configuration and workbook are held. Defaults to ~/ledger
    #[arg(long, env = "LEDGER_HOME", default_value_t = default_ledger_home())]
    ledger_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, ledger_home: PathBuf) -> Self {
        Self {
            log_level,
            ledger_home: ledger_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn ledger_home(&self) -> &DisplayPath {
        &self.ledger_home
    }
}

/// Args for the `ledger init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// Where to keep the workbook, relative to the ledger home or absolute. Defaults to
    /// transactions.xlsx
    #[arg(long)]
    workbook: Option<PathBuf>,

    /// The address for `ledger serve` to listen on. Defaults to 127.0.0.1:8000
    #[arg(long)]
    listen: Option<String>,
}

impl InitArgs {
    pub fn workbook(&self) -> Option<&Path> {
        self.workbook.as_deref()
    }

    pub fn listen(&self) -> Option<&str> {
        self.listen.as_deref()
    }
}

/// Args for the `ledger serve` command.
#[derive(Debug, Parser, Clone)]
pub struct ServeArgs {
    /// Overrides the address in the config file, e.g. 0.0.0.0:8000
    #[arg(long)]
    listen: Option<String>,
}

impl ServeArgs {
    pub fn listen(&self) -> Option<&str> {
        self.listen.as_deref()
    }
}

/// Args for the `ledger insert` command.
#[derive(Debug, Parser, Clone)]
pub struct InsertArgs {
    /// One of sales, received, purchases or expenses
    category: String,

    /// The customer or vendor
    #[arg(long)]
    name: String,

    /// The date, YYYY-MM-DD
    #[arg(long)]
    date: NaiveDate,

    /// The net amount, e.g. 100 or "1,250.00"
    #[arg(long, allow_hyphen_values = true)]
    amount: Amount,

    /// VAT, defaults to 0. Not stored for received
    #[arg(long, allow_hyphen_values = true)]
    vat: Option<Amount>,

    /// Defaults to amount + VAT. Not stored for received
    #[arg(long, allow_hyphen_values = true)]
    total: Option<Amount>,

    /// Not stored for received, where it is used as the notes if --notes is absent
    #[arg(long)]
    description: Option<String>,

    /// Not stored for received
    #[arg(long)]
    reference: Option<String>,

    /// Only stored for received
    #[arg(long)]
    notes: Option<String>,

    /// The payment method. Only stored for received
    #[arg(long)]
    method: Option<String>,

    /// A follow-up tag, may be given more than once
    #[arg(long = "action")]
    actions: Vec<String>,

    /// Mark the transaction as done
    #[arg(long)]
    done: bool,
}

impl InsertArgs {
    pub fn transaction(&self) -> NewTransaction {
        NewTransaction {
            category: self.category.clone(),
            name: self.name.clone(),
            date: self.date,
            description: self.description.clone(),
            reference: self.reference.clone(),
            amount: self.amount,
            vat: self.vat,
            total: self.total,
            notes: self.notes.clone(),
            method: self.method.clone(),
            actions: Some(self.actions.clone()),
            done: self.done,
        }
    }
}

/// Args for the `ledger list` command.
#[derive(Debug, Parser, Clone)]
pub struct ListArgs {
    /// One of sales, received, purchases or expenses
    category: String,
}

impl ListArgs {
    pub fn category(&self) -> &str {
        &self.category
    }
}

/// Args for the `ledger update` command.
#[derive(Debug, Parser, Clone)]
pub struct UpdateArgs {
    /// One of sales, received, purchases or expenses
    category: String,

    /// The position of the transaction, starting at 0
    index: usize,

    /// A field to change, e.g. `--set done=true` or `--set 'actions=["call","email"]'`. The value
    /// is read as JSON if it parses, otherwise as text. Keys may be field names (vat) or headers
    /// (VAT).
    #[arg(long = "set", required = true)]
    values: Vec<KeyValue>,
}

impl UpdateArgs {
    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// The `--set` values as a JSON object. A later key replaces an earlier one. Values for text
    /// columns are kept as typed, so `reference=1e3` stays `1e3`.
    pub fn partial(&self) -> Value {
        let category = Category::parse(&self.category).ok();
        let map: Map<String, Value> = self
            .values
            .iter()
            .map(|kv| {
                let is_text = category
                    .and_then(|c| c.resolve(&kv.key))
                    .is_some_and(|column| column.kind() == ColumnKind::Text);
                let value = if is_text && !kv.value.is_string() && !kv.value.is_null() {
                    Value::String(kv.raw.clone())
                } else {
                    kv.value.clone()
                };
                (kv.key.clone(), value)
            })
            .collect();
        Value::Object(map)
    }
}

/// Args for the `ledger delete` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    /// One of sales, received, purchases or expenses
    category: String,

    /// The position of the transaction, starting at 0
    index: usize,
}

impl DeleteArgs {
    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

/// A `key=value` pair from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyValue {
    key: String,
    raw: String,
    value: Value,
}

impl FromStr for KeyValue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, raw) = s
            .split_once('=')
            .ok_or_else(|| format!("Expected key=value but got '{s}'"))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(format!("The key is empty in '{s}'"));
        }
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        Ok(Self {
            key: key.to_string(),
            raw: raw.to_string(),
            value,
        })
    }
}

fn default_ledger_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("ledger"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --ledger-home or LEDGER_HOME instead of relying on the default \
                ledger home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("ledger")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(args: &[&str]) -> Args {
        let mut argv = vec!["ledger", "--ledger-home", "/tmp/ledger"];
        argv.extend_from_slice(args);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_insert_args() {
        let args = parse(&[
            "insert", "received", "--name", "Client", "--date", "2025-02-01", "--amount",
            "-1,200.50", "--method", "bank", "--action", "a", "--action", "b", "--done",
        ]);
        let Command::Insert(insert) = args.command() else {
            panic!("expected insert, got {:?}", args.command());
        };
        let tx = insert.transaction();
        assert_eq!(tx.category, "received");
        assert_eq!(tx.amount, Amount::from_str("-1200.5").unwrap());
        assert_eq!(tx.method.as_deref(), Some("bank"));
        assert_eq!(tx.actions, Some(vec!["a".to_string(), "b".to_string()]));
        assert!(tx.done);
        assert_eq!(args.common().ledger_home().path(), Path::new("/tmp/ledger"));
    }

    #[test]
    fn test_update_args() {
        let args = parse(&[
            "update", "sales", "2", "--set", "done=true", "--set", "VAT=20", "--set",
            "notes=paid in full", "--set", r#"actions=["a","b"]"#,
        ]);
        let Command::Update(update) = args.command() else {
            panic!("expected update, got {:?}", args.command());
        };
        assert_eq!(update.index(), 2);
        assert_eq!(
            update.partial(),
            json!({"done": true, "VAT": 20, "notes": "paid in full", "actions": ["a", "b"]})
        );
    }

    #[test]
    fn test_update_text_values_keep_their_spelling() {
        let args = parse(&[
            "update", "sales", "0", "--set", "reference=1e3", "--set", "Description=007",
            "--set", "amount=1e3", "--set", "name=null",
        ]);
        let Command::Update(update) = args.command() else {
            panic!("expected update, got {:?}", args.command());
        };
        assert_eq!(
            update.partial(),
            json!({"reference": "1e3", "Description": "007", "amount": 1000.0, "name": null})
        );
    }

    #[test]
    fn test_update_requires_set() {
        let res = Args::try_parse_from(["ledger", "update", "sales", "0"]);
        assert!(res.is_err());
    }

    #[test]
    fn test_key_value() {
        assert!(KeyValue::from_str("novalue").is_err());
        assert!(KeyValue::from_str("=1").is_err());
        let kv = KeyValue::from_str("name=a=b").unwrap();
        assert_eq!(kv.value, json!("a=b"));
    }

    #[test]
    fn test_log_level() {
        let args = parse(&["--log-level", "debug", "schema"]);
        assert_eq!(args.common().log_level(), LevelFilter::DEBUG);
    }
}

//! Command handlers for the ledger CLI.
//!
//! Each handler performs one user operation and returns an `Out`. The CLI and the interactive
//! menu both call these functions, so they behave the same way in either.

mod delete;
mod init;
mod insert;
mod query;
mod render;
mod settings;
mod update;

use crate::args::SelectArgs;
use crate::error::{ErrorType, IntoResult};
use crate::model::Selector;
use crate::store::Backend;
use crate::{Config, Result};
use anyhow::anyhow;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::Debug;
use tracing::debug;

pub use delete::delete;
pub use init::init;
pub use insert::add;
pub use query::{list, search, summary, Grouped};
pub use render::{chart_category, chart_month, export, report};
pub use settings::{configure, Settings};
pub use update::update;

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data to both the command line and the interactive menu.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
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

    /// Consumes the `Out` and returns the structured data.
    pub fn into_structure(self) -> Option<T> {
        self.structure
    }

    /// Print the message to stdout and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        println!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Builds the selector the options describe. `--id` is rejected for a CSV ledger, which has no
/// identifiers.
fn selector(config: &Config, args: &SelectArgs) -> Result<Selector> {
    let selector = args.selector().pub_result(ErrorType::Validation)?;
    if matches!(selector, Selector::Id(_)) && config.backend() == Backend::Csv {
        return Err(anyhow!(
            "A CSV ledger has no IDs, select the expense with --date, --category, --amount and \
            --description"
        ))
        .pub_result(ErrorType::Validation);
    }
    Ok(selector)
}

fn not_found(selector: &Selector) -> String {
    match selector {
        Selector::Id(id) => format!("No expense with ID {id}"),
        Selector::Exact(expense) => format!(
            "No expense of {} for {} on {}",
            expense.amount().rounded(),
            expense.category(),
            expense.date()
        ),
    }
}

/// Today's date in the local time zone.
pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn plural(count: usize, singular: &str, plural: &str) -> String {
    format!("{count} {}", if count == 1 { singular } else { plural })
}

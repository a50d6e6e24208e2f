//! The crate-wide error type and the public error taxonomy.
//!
//! Internally everything is an `anyhow::Error` with context attached. When an error leaves a
//! command handler it is tagged with an `ErrorType` so that callers (the CLI and the interactive
//! shell) can tell a bad input from a broken store without parsing messages.

use serde::{Deserialize, Serialize};

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// The kinds of failure a command can report to the user.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// The ledger home, its config or its backing store does not exist.
    NotFound,
    /// A date, amount or month could not be parsed, or a record violates a constraint.
    Validation,
    /// Reading or writing the CSV file or the database failed.
    Persistence,
    /// The database could not be opened.
    Connection,
    /// The configuration file is missing or invalid.
    Config,
    /// A chart, PDF or export could not be produced.
    Render,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

/// Tags the error of a `Result` with an `ErrorType`.
pub trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| {
            let e: Error = e.into();
            // Keep the innermost tag if the error was already classified further down.
            if error_type_of(&e).is_some() {
                e
            } else {
                e.context(error_type)
            }
        })
    }
}

/// Returns the `ErrorType` an error was tagged with, if any.
pub fn error_type_of(e: &Error) -> Option<ErrorType> {
    e.downcast_ref::<ErrorType>().copied()
}

//! Insert command handler.

use crate::args::AddArgs;
use crate::commands::{today, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::{Expense, Row};
use crate::{Config, Result};

/// Records a new expense at the end of the ledger.
///
/// The date defaults to today. The category is title-cased and an empty category is stored as
/// `Misc`.
///
/// # Returns
///
/// On success, returns an `Out` containing:
/// - A message describing the stored expense.
/// - The stored record, with its ID for a SQLite ledger.
///
/// # Errors
///
/// - Returns a validation error if the amount is not greater than zero.
/// - Returns a persistence error if the store cannot be written.
pub async fn add(config: &Config, args: AddArgs) -> Result<Out<Row<Expense>>> {
    let date = args.date.unwrap_or_else(today);
    let expense = Expense::new(date, args.category, args.amount, args.description)
        .pub_result(ErrorType::Validation)?;

    let row = config
        .store()
        .append(&expense)
        .await
        .pub_result(ErrorType::Persistence)?;

    let mut message = format!(
        "Added {} for {} on {}",
        expense.amount().display(config.currency()),
        expense.category(),
        expense.date()
    );
    if let Some(id) = row.id() {
        message.push_str(&format!(" (ID {id})"));
    }
    Ok(Out::new(message, row))
}

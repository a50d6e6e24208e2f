use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::store::Backend;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the ledger home directory with:
/// - an initial `config.json` naming `backend` along with default settings
/// - an empty store, `expenses.csv` with only its header row or `ledger.sqlite` with the schema
///
/// # Errors
/// - Returns an error if a ledger already exists at `ledger_home` or any file operation fails.
pub async fn init(ledger_home: &Path, backend: Backend) -> Result<Out<()>> {
    let config = Config::create(ledger_home, backend)
        .await
        .context("Unable to create the ledger home directory")
        .pub_result(ErrorType::Config)?;
    Ok(format!(
        "Created a {backend} ledger at {}",
        config.root().display()
    )
    .into())
}

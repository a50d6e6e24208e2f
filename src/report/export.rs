//! Per-month CSV exports in the ledger's own file format.

use crate::error::{ErrorType, IntoResult};
use crate::ledger;
use crate::model::{Expense, Period};
use crate::report::Rendered;
use crate::store::serialize_csv;
use crate::{utils, Result};
use anyhow::Context;
use std::path::Path;
use tracing::debug;

/// Writes the records dated within `period` to `path`, header first, in their stored order.
/// Writes nothing when the month has no records.
pub async fn month<R>(records: &[R], period: Period, path: &Path) -> Result<Rendered>
where
    R: AsRef<Expense> + Clone,
{
    let selected = ledger::for_period(records, period);
    if selected.is_empty() {
        debug!("No records in {period}, nothing to export");
        return Ok(Rendered::NoData);
    }
    let bytes = serialize_csv(selected.iter().map(AsRef::<Expense>::as_ref))
        .pub_result(ErrorType::Render)?;
    utils::write(path, bytes)
        .await
        .with_context(|| format!("Unable to export {period}"))
        .pub_result(ErrorType::Render)?;
    debug!("Exported {} record(s) to {}", selected.len(), path.display());
    Ok(Rendered::Written(path.to_path_buf()))
}

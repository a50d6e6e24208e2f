use crate::args::DeleteArgs;
use crate::commands::{not_found, selector, Out};
use crate::error::{ErrorType, IntoResult};
use crate::store::Removal;
use crate::{Config, Result};
use tracing::info;

/// Deletes one expense, located by `--id` or by all four of its fields. With duplicates only the
/// first one stored is deleted. Not finding the expense is reported, not treated as an error.
pub async fn delete(config: &Config, args: DeleteArgs) -> Result<Out<Removal>> {
    let selector = selector(config, &args.select)?;
    let removal = config
        .store()
        .remove(&selector)
        .await
        .pub_result(ErrorType::Persistence)?;

    let message = match &removal {
        Removal::Removed(row) => {
            let expense = row.data();
            info!("Deleted {expense:?}");
            format!(
                "Deleted {} for {} on {}",
                expense.amount().display(config.currency()),
                expense.category(),
                expense.date()
            )
        }
        Removal::NotFound => not_found(&selector),
    };
    Ok(Out::new(message, removal))
}

use crate::args::UpdateArgs;
use crate::commands::{not_found, selector, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::Expense;
use crate::store::Update;
use crate::{Config, Result};
use tracing::debug;

/// Changes one expense. The record is located by `--id` or by all four of its fields; fields
/// without a `--set-*` option keep their current value. The record keeps its position in the
/// ledger and, for SQLite, its ID.
///
/// # Errors
/// - Returns a validation error for an incomplete selection, for `--id` on a CSV ledger or when the
///   new amount is not greater than zero.
/// - Returns a persistence error if the store cannot be read or written.
pub async fn update(config: &Config, args: UpdateArgs) -> Result<Out<Update>> {
    let selector = selector(config, &args.select)?;

    let current = config
        .store()
        .all()
        .await
        .pub_result(ErrorType::Persistence)?
        .into_iter()
        .find(|row| selector.matches(row));
    let Some(current) = current else {
        return Ok(Out::new(not_found(&selector), Update::NotFound));
    };

    let old = current.data();
    let new = Expense::new(
        args.set_date.unwrap_or(old.date()),
        args.set_category
            .as_deref()
            .unwrap_or(old.category().name()),
        args.set_amount.unwrap_or(old.amount()),
        args.set_description
            .clone()
            .unwrap_or_else(|| old.description().to_string()),
    )
    .pub_result(ErrorType::Validation)?;
    if &new == old {
        debug!("The update leaves {old:?} unchanged");
    }

    let outcome = config
        .store()
        .update(&selector, &new)
        .await
        .pub_result(ErrorType::Persistence)?;
    let currency = config.currency();
    let message = match &outcome {
        Update::Updated { before, after } => format!(
            "Updated {} {} on {} to {} {} on {}",
            before.data().category(),
            before.data().amount().display(currency),
            before.data().date(),
            after.data().category(),
            after.data().amount().display(currency),
            after.data().date()
        ),
        Update::NotFound => not_found(&selector),
    };
    Ok(Out::new(message, outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::SelectArgs;
    use crate::error::error_type_of;
    use crate::model::Amount;
    use crate::store::Backend;
    use crate::test::TestEnv;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn lunch() -> SelectArgs {
        SelectArgs {
            id: None,
            date: NaiveDate::from_ymd_opt(2025, 10, 14),
            category: Some("food".to_string()),
            amount: Some(Amount::from_str("250").unwrap()),
            description: Some("Lunch with friends".to_string()),
        }
    }

    #[tokio::test]
    async fn test_update_by_fields() {
        let env = TestEnv::new().await;
        env.seed_scenario_b().await;
        let config = env.config();
        let args = UpdateArgs {
            select: lunch(),
            set_amount: Some(Amount::from_str("300").unwrap()),
            set_description: Some("Updated lunch expense".to_string()),
            ..UpdateArgs::default()
        };
        let out = update(&config, args).await.unwrap();
        assert_eq!(
            out.message(),
            "Updated Food ₹250.00 on 2025-10-14 to Food ₹300.00 on 2025-10-14"
        );

        let all = config.store().expenses().await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].amount(), Amount::from_str("300").unwrap());
        assert_eq!(all[0].description(), "Updated lunch expense");
        assert_eq!(all[0].category().name(), "Food");
    }

    #[tokio::test]
    async fn test_update_by_id() {
        let env = TestEnv::with_backend(Backend::Sqlite).await;
        env.seed_scenario_b().await;
        let config = env.config();
        let args = UpdateArgs {
            select: SelectArgs {
                id: Some(2),
                ..SelectArgs::default()
            },
            set_category: Some("commute".to_string()),
            ..UpdateArgs::default()
        };
        let out = update(&config, args).await.unwrap();
        match out.structure().unwrap() {
            Update::Updated { before, after } => {
                assert_eq!(before.id(), Some(2));
                assert_eq!(after.id(), Some(2));
                assert_eq!(after.data().category().name(), "Commute");
                assert_eq!(after.data().description(), "Cab to office");
            }
            Update::NotFound => panic!("expected the record to be updated"),
        }
    }

    #[tokio::test]
    async fn test_update_missing() {
        let env = TestEnv::new().await;
        let args = UpdateArgs {
            select: lunch(),
            set_amount: Some(Amount::from_str("1").unwrap()),
            ..UpdateArgs::default()
        };
        let out = update(&env.config(), args).await.unwrap();
        assert_eq!(out.structure(), Some(&Update::NotFound));
        assert!(out.message().starts_with("No expense of 250.00 for Food"));
    }

    #[tokio::test]
    async fn test_update_id_on_csv_is_rejected() {
        let env = TestEnv::new().await;
        let args = UpdateArgs {
            select: SelectArgs {
                id: Some(1),
                ..SelectArgs::default()
            },
            ..UpdateArgs::default()
        };
        let err = update(&env.config(), args).await.unwrap_err();
        assert_eq!(error_type_of(&err), Some(ErrorType::Validation));
    }

    #[tokio::test]
    async fn test_update_to_zero_is_rejected() {
        let env = TestEnv::new().await;
        env.seed_scenario_b().await;
        let config = env.config();
        let args = UpdateArgs {
            select: lunch(),
            set_amount: Some(Amount::ZERO),
            ..UpdateArgs::default()
        };
        let err = update(&config, args).await.unwrap_err();
        assert_eq!(error_type_of(&err), Some(ErrorType::Validation));
        assert_eq!(config.store().expenses().await.unwrap()[0].amount().rounded(), "250.00");
    }

    #[tokio::test]
    async fn test_incomplete_selection_is_rejected() {
        let env = TestEnv::new().await;
        let args = UpdateArgs {
            select: SelectArgs {
                date: NaiveDate::from_ymd_opt(2025, 10, 14),
                ..SelectArgs::default()
            },
            ..UpdateArgs::default()
        };
        let err = update(&env.config(), args).await.unwrap_err();
        assert_eq!(error_type_of(&err), Some(ErrorType::Validation));
    }
}

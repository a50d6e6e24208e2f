use crate::args::ConfigArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::model::Currency;
use crate::store::Backend;
use crate::{Config, Result};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// The settings of a ledger home as shown by `ledger config`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Settings {
    pub home: PathBuf,
    pub backend: Backend,
    pub currency: Currency,
    pub recent_count: usize,
}

impl Settings {
    fn of(config: &Config) -> Self {
        Self {
            home: config.root().to_path_buf(),
            backend: config.backend(),
            currency: config.currency(),
            recent_count: config.recent_count(),
        }
    }
}

/// Shows the settings and applies any that are given. The config file is only written when
/// something changed.
pub async fn configure(config: &mut Config, args: ConfigArgs) -> Result<Out<Settings>> {
    let before = Settings::of(config);
    if let Some(currency) = args.currency {
        config.set_currency(currency);
    }
    if let Some(recent_count) = args.recent_count {
        config
            .set_recent_count(recent_count)
            .pub_result(ErrorType::Validation)?;
    }

    let after = Settings::of(config);
    if after != before {
        config.save().await.pub_result(ErrorType::Config)?;
        info!("Saved settings to {}", config.config_path().display());
    }

    let message = format!(
        "Ledger home:    {}\nBackend:        {}\nCurrency:       {} ({})\nRecent records: {}",
        after.home.display(),
        after.backend,
        after.currency,
        after.currency.symbol(),
        after.recent_count
    );
    Ok(Out::new(message, after))
}

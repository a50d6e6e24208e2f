use serde::{Deserialize, Serialize};

/// The currency symbol used when rendering amounts. This is a display preference only, amounts
/// are never converted.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Currency {
    #[default]
    Inr,
    Usd,
    Eur,
    Gbp,
}

serde_plain::derive_display_from_serialize!(Currency);
serde_plain::derive_fromstr_from_deserialize!(Currency);

impl Currency {
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Inr => "₹",
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Gbp => "£",
        }
    }

    /// The ISO 4217 code, e.g. `INR`.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Inr => "INR",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
        }
    }

    /// A prefix that only uses ASCII characters, for outputs with limited font coverage.
    pub fn ascii_prefix(&self) -> String {
        let symbol = self.symbol();
        if symbol.is_ascii() {
            symbol.to_string()
        } else {
            format!("{} ", self.code())
        }
    }
}

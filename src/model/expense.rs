use crate::model::{Amount, Category};
use crate::Result;
use anyhow::{ensure, Context};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The date format used everywhere in the ledger.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .with_context(|| format!("Invalid date '{s}', use YYYY-MM-DD (e.g. 2025-10-13)"))
}

/// A single expense: the unit of the ledger.
///
/// Values are validated on construction, so an `Expense` always has a strictly positive amount
/// and a normalized, non-empty category.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Expense {
    date: NaiveDate,
    category: Category,
    amount: Amount,
    description: String,
}

impl Expense {
    pub fn new(
        date: NaiveDate,
        category: impl Into<Category>,
        amount: Amount,
        description: impl Into<String>,
    ) -> Result<Self> {
        ensure!(
            amount.is_positive(),
            "Amount must be greater than zero, got {amount}"
        );
        ensure!(
            amount.digits() <= Amount::MAX_DIGITS,
            "Amount {amount} has more than {} digits",
            Amount::MAX_DIGITS
        );
        Ok(Self {
            date,
            category: category.into(),
            amount,
            description: description.into().trim().to_string(),
        })
    }

    /// Builds an expense from the four textual fields, as found in a CSV row or typed by a user.
    pub fn parse(date: &str, category: &str, amount: &str, description: &str) -> Result<Self> {
        let date = parse_date(date)?;
        let amount = Amount::from_str(amount)?;
        Expense::new(date, category, amount, description)
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// A stored value and, when the backing store assigns one, its identifier.
///
/// The SQLite store always sets `id`. The CSV store has no identifiers; a row there is identified
/// by the values of all its fields.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Row<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
    #[serde(flatten)]
    data: T,
}

impl<T> Row<T> {
    pub fn new(id: Option<i64>, data: T) -> Self {
        Self { id, data }
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn into_data(self) -> T {
        self.data
    }
}

impl AsRef<Expense> for Expense {
    fn as_ref(&self) -> &Expense {
        self
    }
}

impl AsRef<Expense> for Row<Expense> {
    fn as_ref(&self) -> &Expense {
        self.data()
    }
}

/// How a record to remove or update is located.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Selector {
    /// By the identifier the store assigned.
    Id(i64),
    /// By equality of all four fields. The first matching record is selected.
    Exact(Expense),
}

impl Selector {
    pub fn matches(&self, row: &Row<Expense>) -> bool {
        match self {
            Selector::Id(id) => row.id() == Some(*id),
            Selector::Exact(expense) => row.data() == expense,
        }
    }
}

// Date,Category,Amount,Description
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct CsvRecord {
    pub(crate) date: String,
    pub(crate) category: String,
    pub(crate) amount: String,
    #[serde(default)]
    pub(crate) description: String,
}

impl From<&Expense> for CsvRecord {
    fn from(expense: &Expense) -> Self {
        Self {
            date: expense.date().format(DATE_FORMAT).to_string(),
            category: expense.category().to_string(),
            amount: expense.amount().to_string(),
            description: expense.description().to_string(),
        }
    }
}

impl TryFrom<CsvRecord> for Expense {
    type Error = anyhow::Error;

    fn try_from(record: CsvRecord) -> Result<Self> {
        Expense::parse(
            &record.date,
            &record.category,
            &record.amount,
            &record.description,
        )
    }
}

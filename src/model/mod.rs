//! Types that represent the core data model, such as `Expense`, `Amount` and `Period`.
mod amount;
mod category;
mod currency;
mod expense;
mod period;

pub use amount::{Amount, AmountError};
pub use category::{Category, DEFAULT_CATEGORY};
pub use currency::Currency;
pub(crate) use expense::CsvRecord;
pub use expense::{parse_date, Expense, Row, Selector, DATE_FORMAT};
pub use period::Period;

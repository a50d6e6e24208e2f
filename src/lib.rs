pub mod args;
pub mod commands;
mod config;
mod db;
mod error;
pub mod ledger;
pub mod model;
pub mod report;
pub mod shell;
pub mod store;
mod utils;

#[cfg(test)]
mod test;

pub use config::Config;
pub use error::{error_type_of, Error, ErrorType, IntoResult, Result};
pub use model::Amount;

//! These structs provide the CLI interface for the ledger CLI.

use crate::model::{Amount, Currency, Expense, Period, Selector};
use crate::report::chart::{CategoryChart, MonthlyChart};
use crate::store::Backend;
use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// ledger: record personal expenses and see where the money goes.
///
/// Expenses are kept in a CSV file or a SQLite database inside the ledger home directory. From
/// there you can list, search, edit and delete them, total them by category or by month, draw
/// charts and write a PDF summary or a per-month CSV export.
///
/// Run `ledger init` once to create the ledger home, then `ledger add` to record expenses, or
/// `ledger menu` for an interactive numbered menu.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the ledger home directory, its config file and an empty store.
    ///
    /// The ledger home is $HOME/ledger unless --ledger-home or LEDGER_HOME says otherwise. Choose
    /// the backend once here: a CSV file (the default) or a SQLite database.
    Init(InitArgs),
    /// Record an expense.
    Add(AddArgs),
    /// Show recorded expenses as a table.
    List(ListArgs),
    /// Show the expenses whose category contains some text, ignoring case.
    Search(SearchArgs),
    /// Change an expense. Fields that are not given keep their current value.
    Update(UpdateArgs),
    /// Delete an expense.
    Delete(DeleteArgs),
    /// Show totals: an overview, or sums per category or per month.
    Summary(SummaryArgs),
    /// Draw a chart of category or monthly totals as an SVG file.
    Chart(ChartArgs),
    /// Write a PDF summary with the total, the top category and the most recent expenses.
    Report(ReportArgs),
    /// Write the expenses of one month to a CSV file.
    Export(ExportArgs),
    /// Show or change the display settings.
    Config(ConfigArgs),
    /// Run the interactive numbered menu.
    Menu,
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the ledger and its configuration are held. Defaults to ~/ledger
    #[arg(long, env = "LEDGER_HOME", default_value_t = default_ledger_home())]
    ledger_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, ledger_home: PathBuf) -> Self {
        Self {
            log_level,
            ledger_home: ledger_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn ledger_home(&self) -> &DisplayPath {
        &self.ledger_home
    }
}

/// Args for the `ledger init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// Where expenses are stored.
    #[arg(long, value_enum, default_value_t = Backend::Csv)]
    backend: Backend,
}

impl InitArgs {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }
}

/// The fields of a new expense.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    /// The amount spent, greater than zero, e.g. 250 or 1,299.50.
    #[arg(long)]
    pub amount: Amount,

    /// The category, e.g. Food. Title-cased when stored; empty means Misc.
    #[arg(long, default_value = "")]
    pub category: String,

    /// The date in YYYY-MM-DD format. Defaults to today.
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// A free-text note.
    #[arg(long, default_value = "")]
    pub description: String,
}

/// Args for the `ledger list` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct ListArgs {
    /// Only show this many of the most recent expenses.
    #[arg(long)]
    pub limit: Option<usize>,
}

/// Args for the `ledger search` command.
#[derive(Debug, Parser, Clone)]
pub struct SearchArgs {
    /// Text to look for in category names.
    pub text: String,
}

/// Locates the expense to change or delete: either `--id` (SQLite ledgers only) or all four of
/// `--date`, `--category`, `--amount` and `--description`. With duplicates, the first one stored
/// is selected.
#[derive(Debug, Parser, Clone, Default)]
pub struct SelectArgs {
    /// The identifier shown by `ledger list` for a SQLite ledger.
    #[arg(long, conflicts_with_all = ["date", "category", "amount", "description"])]
    pub id: Option<i64>,

    /// The date of the expense to select.
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// The category of the expense to select.
    #[arg(long)]
    pub category: Option<String>,

    /// The amount of the expense to select.
    #[arg(long)]
    pub amount: Option<Amount>,

    /// The description of the expense to select. Defaults to empty.
    #[arg(long)]
    pub description: Option<String>,
}

impl SelectArgs {
    /// Builds the selector these options describe. Without `--id`, `--date` and `--amount` are
    /// required and a missing category or description means the default.
    pub fn selector(&self) -> crate::Result<Selector> {
        if let Some(id) = self.id {
            return Ok(Selector::Id(id));
        }
        let date = self
            .date
            .context("Select the expense with --id, or with --date and --amount")?;
        let amount = self
            .amount
            .context("Select the expense with --id, or with --date and --amount")?;
        let expense = Expense::new(
            date,
            self.category.as_deref().unwrap_or_default(),
            amount,
            self.description.clone().unwrap_or_default(),
        )?;
        Ok(Selector::Exact(expense))
    }
}

/// Args for the `ledger update` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct UpdateArgs {
    #[clap(flatten)]
    pub select: SelectArgs,

    /// The new date.
    #[arg(long)]
    pub set_date: Option<NaiveDate>,

    /// The new category.
    #[arg(long)]
    pub set_category: Option<String>,

    /// The new amount.
    #[arg(long)]
    pub set_amount: Option<Amount>,

    /// The new description.
    #[arg(long)]
    pub set_description: Option<String>,
}

/// Args for the `ledger delete` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct DeleteArgs {
    #[clap(flatten)]
    pub select: SelectArgs,
}

/// What `ledger summary` groups by.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    /// Total, top category, this month and the most recent expenses.
    #[default]
    Overview,
    /// Sums per category, largest first.
    Category,
    /// Sums per month, oldest first.
    Month,
}

serde_plain::derive_display_from_serialize!(GroupBy);
serde_plain::derive_fromstr_from_deserialize!(GroupBy);

/// Args for the `ledger summary` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct SummaryArgs {
    #[arg(value_enum, default_value_t = GroupBy::Overview)]
    pub by: GroupBy,
}

/// Args for the `ledger chart` command.
#[derive(Debug, Parser, Clone)]
pub struct ChartArgs {
    #[command(subcommand)]
    pub chart: ChartSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ChartSubcommand {
    /// Category totals as a pie or bar chart. Written to category_chart.svg by default.
    Category(CategoryChartArgs),
    /// Monthly totals as a bar or line chart. Written to monthly_chart.svg by default.
    Month(MonthlyChartArgs),
}

#[derive(Debug, Parser, Clone, Default)]
pub struct CategoryChartArgs {
    #[arg(long, value_enum, default_value_t = CategoryChart::Pie)]
    pub kind: CategoryChart,

    /// Only chart the expenses of this month (YYYY-MM).
    #[arg(long)]
    pub month: Option<Period>,

    /// Where to write the SVG file.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone, Default)]
pub struct MonthlyChartArgs {
    #[arg(long, value_enum, default_value_t = MonthlyChart::Bar)]
    pub kind: MonthlyChart,

    /// Where to write the SVG file.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

/// Args for the `ledger report` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct ReportArgs {
    /// Where to write the PDF file. Defaults to Expense_Report.pdf.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

/// Which month to export.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub enum MonthSelection {
    /// The most recent month with any expenses.
    #[default]
    Latest,
    Month(Period),
}

impl FromStr for MonthSelection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("latest") {
            Ok(MonthSelection::Latest)
        } else {
            Ok(MonthSelection::Month(s.parse()?))
        }
    }
}

impl Display for MonthSelection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MonthSelection::Latest => f.write_str("latest"),
            MonthSelection::Month(period) => Display::fmt(period, f),
        }
    }
}

/// Args for the `ledger export` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct ExportArgs {
    /// The month to export as YYYY-MM, or `latest` for the most recent month with expenses.
    #[arg(default_value_t = MonthSelection::Latest)]
    pub month: MonthSelection,

    /// Where to write the CSV file. Defaults to expense_report_<YYYY-MM>.csv.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

/// Args for the `ledger config` command. Without options the current settings are shown.
#[derive(Debug, Parser, Clone, Default)]
pub struct ConfigArgs {
    /// The currency symbol used when showing amounts: inr, usd, eur or gbp.
    #[arg(long)]
    pub currency: Option<Currency>,

    /// How many recent expenses the overview and the PDF report show.
    #[arg(long)]
    pub recent_count: Option<usize>,
}

fn default_ledger_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("ledger"),
        None => {
            error!(
                "Unable to determine your home directory. Provide --ledger-home or LEDGER_HOME \
                instead of relying on the default ledger home directory."
            );
            PathBuf::from("ledger")
        }
    })
}

/// A path that clap can print as a default value.
#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Args {
        let mut full = vec!["ledger", "--ledger-home", "/tmp/ledger-test"];
        full.extend_from_slice(args);
        Args::try_parse_from(full).unwrap()
    }

    #[test]
    fn test_cli_is_consistent() {
        <Args as CommandFactory>::command().debug_assert();
    }

    #[test]
    fn test_add() {
        let args = parse(&[
            "add",
            "--amount",
            "1,250.50",
            "--category",
            "eating out",
            "--date",
            "2025-10-14",
        ]);
        match args.command() {
            Command::Add(add) => {
                assert_eq!(add.amount, Amount::from_str("1250.50").unwrap());
                assert_eq!(add.category, "eating out");
                assert_eq!(add.date, NaiveDate::from_ymd_opt(2025, 10, 14));
                assert_eq!(add.description, "");
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(args.common().ledger_home().path(), Path::new("/tmp/ledger-test"));
    }

    #[test]
    fn test_bad_amount_is_rejected() {
        let result = Args::try_parse_from(["ledger", "add", "--amount", "lots"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_export_month() {
        match parse(&["export"]).command() {
            Command::Export(export) => assert_eq!(export.month, MonthSelection::Latest),
            other => panic!("unexpected command {other:?}"),
        }
        match parse(&["export", "2025-10"]).command() {
            Command::Export(export) => {
                assert_eq!(export.month, MonthSelection::Month("2025-10".parse().unwrap()))
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(Args::try_parse_from(["ledger", "export", "2025-13"]).is_err());
    }

    #[test]
    fn test_id_conflicts_with_fields() {
        let result =
            Args::try_parse_from(["ledger", "delete", "--id", "3", "--date", "2025-10-14"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_summary_defaults_to_overview() {
        match parse(&["summary"]).command() {
            Command::Summary(summary) => assert_eq!(summary.by, GroupBy::Overview),
            other => panic!("unexpected command {other:?}"),
        }
    }
}

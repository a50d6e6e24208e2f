//! The interactive numbered menu behind `ledger menu`.
//!
//! Every menu entry prompts for its inputs and then calls the same command function as the
//! corresponding subcommand, so the menu and the CLI behave alike. Bad dates, amounts and months
//! are re-prompted. Any other failure is printed and the menu is shown again. Choosing `0` or
//! closing the input (Ctrl-D) leaves the menu.

use crate::args::{
    AddArgs, CategoryChartArgs, DeleteArgs, ExportArgs, GroupBy, ListArgs, MonthSelection,
    MonthlyChartArgs, ReportArgs, SearchArgs, SelectArgs, SummaryArgs, UpdateArgs,
};
use crate::commands::{self, today};
use crate::model::{parse_date, Amount};
use crate::report::chart::{CategoryChart, MonthlyChart};
use crate::report::{self, export_file_name};
use crate::store::Backend;
use crate::{ledger, Config, Result};
use chrono::NaiveDate;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::collections::VecDeque;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, warn};

const MENU: &str = "\
==== Expense Ledger ====
1. Add expense
2. View all expenses
3. Update expense
4. Delete expense
5. Search by category
6. Category totals
7. Monthly totals
8. Charts
9. PDF report
10. Export month to CSV
0. Exit";

const CHART_MENU: &str = "\
1. Category pie chart
2. Category bar chart
3. Monthly bar chart
4. Monthly line chart";

/// Where the menu reads its input lines from.
pub trait LineSource {
    /// Shows `prompt` and reads one line without its line ending. Returns `None` at the end of the
    /// input.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Reads lines from the terminal with line editing and history.
pub struct Terminal {
    editor: DefaultEditor,
}

impl Terminal {
    pub fn new() -> Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl LineSource for Terminal {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    self.editor.add_history_entry(line.as_str()).ok();
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// A fixed list of input lines, for driving the menu without a terminal.
#[derive(Debug, Default, Clone)]
pub struct Script {
    lines: VecDeque<String>,
}

impl Script {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

impl LineSource for Script {
    fn read_line(&mut self, _prompt: &str) -> Result<Option<String>> {
        Ok(self.lines.pop_front())
    }
}

/// Whether the menu keeps running after an entry.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum Step {
    Continue,
    Exit,
}

/// Reads a line or leaves the menu at the end of the input.
macro_rules! ask {
    ($value:expr) => {
        match $value {
            Some(value) => value,
            None => return Ok(Step::Exit),
        }
    };
}

/// Everything a menu entry needs: the open ledger, where input comes from, where output goes and
/// the directory that charts, reports and exports are written to.
pub struct AppContext<L, W> {
    config: Config,
    input: L,
    output: W,
    out_dir: PathBuf,
}

impl<L, W> AppContext<L, W>
where
    L: LineSource,
    W: Write,
{
    pub fn new(config: Config, input: L, output: W, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            input,
            output,
            out_dir: out_dir.into(),
        }
    }

    /// Gives back the output, e.g. to inspect what was printed.
    pub fn into_output(self) -> W {
        self.output
    }

    /// Shows the menu and runs entries until `0` is chosen or the input ends.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            writeln!(self.output, "\n{MENU}")?;
            let Some(choice) = self.input.read_line("Choose an option: ")? else {
                break;
            };
            let step = match self.dispatch(choice.trim()).await {
                Ok(step) => step,
                Err(e) => {
                    warn!("Menu entry '{}' failed: {e:#}", choice.trim());
                    writeln!(self.output, "Error: {e:#}")?;
                    Step::Continue
                }
            };
            if step == Step::Exit {
                break;
            }
        }
        writeln!(self.output, "Goodbye")?;
        Ok(())
    }

    async fn dispatch(&mut self, choice: &str) -> Result<Step> {
        debug!("Menu choice '{choice}'");
        match choice {
            "1" => self.add().await,
            "2" => self.view().await,
            "3" => self.update().await,
            "4" => self.delete().await,
            "5" => self.search().await,
            "6" => self.totals(GroupBy::Category).await,
            "7" => self.totals(GroupBy::Month).await,
            "8" => self.chart().await,
            "9" => self.report().await,
            "10" => self.export().await,
            "0" => Ok(Step::Exit),
            _ => {
                writeln!(self.output, "Invalid choice '{choice}', enter a number from the menu")?;
                Ok(Step::Continue)
            }
        }
    }

    fn say(&mut self, message: &str) -> Result<Step> {
        writeln!(self.output, "{message}")?;
        Ok(Step::Continue)
    }

    fn text(&mut self, prompt: &str) -> Result<Option<String>> {
        Ok(self
            .input
            .read_line(prompt)?
            .map(|line| line.trim().to_string()))
    }

    /// Re-prompts until `parse` accepts the input. An empty answer yields `None` inside the outer
    /// `Some` when `optional` is set.
    fn parsed<T>(
        &mut self,
        prompt: &str,
        optional: bool,
        parse: impl Fn(&str) -> Result<T>,
    ) -> Result<Option<Option<T>>> {
        loop {
            let Some(line) = self.text(prompt)? else {
                return Ok(None);
            };
            if line.is_empty() && optional {
                return Ok(Some(None));
            }
            match parse(&line) {
                Ok(value) => return Ok(Some(Some(value))),
                Err(e) => writeln!(self.output, "{e:#}, try again")?,
            }
        }
    }

    fn date(&mut self, prompt: &str, optional: bool) -> Result<Option<Option<NaiveDate>>> {
        self.parsed(prompt, optional, parse_date)
    }

    fn amount(&mut self, prompt: &str, optional: bool) -> Result<Option<Option<Amount>>> {
        self.parsed(prompt, optional, |s| {
            let amount = Amount::from_str(s)?;
            anyhow::ensure!(amount.is_positive(), "The amount must be greater than zero");
            Ok(amount)
        })
    }

    fn blank_as_none(value: String) -> Option<String> {
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }

    async fn add(&mut self) -> Result<Step> {
        let date = ask!(self.date("Date (YYYY-MM-DD, blank for today): ", true)?);
        let category = ask!(self.text("Category: ")?);
        let amount = ask!(self.amount("Amount: ", false)?);
        let description = ask!(self.text("Description: ")?);
        let Some(amount) = amount else {
            return Ok(Step::Continue);
        };
        let args = AddArgs {
            amount,
            category,
            date: Some(date.unwrap_or_else(today)),
            description,
        };
        let out = commands::add(&self.config, args).await?;
        self.say(out.message())
    }

    async fn view(&mut self) -> Result<Step> {
        let out = commands::list(&self.config, ListArgs::default()).await?;
        self.say(out.message())
    }

    /// Asks which record to change: its ID for SQLite, its four fields for CSV.
    fn select(&mut self) -> Result<Option<SelectArgs>> {
        if self.config.backend() == Backend::Sqlite {
            let id = self.parsed("Expense ID: ", false, |s| Ok(i64::from_str(s)?))?;
            return Ok(id.map(|id| SelectArgs {
                id,
                ..SelectArgs::default()
            }));
        }
        let Some(date) = self.date("Date of the expense: ", false)? else {
            return Ok(None);
        };
        let Some(category) = self.text("Category of the expense: ")? else {
            return Ok(None);
        };
        let Some(amount) = self.amount("Amount of the expense: ", false)? else {
            return Ok(None);
        };
        let Some(description) = self.text("Description of the expense: ")? else {
            return Ok(None);
        };
        Ok(Some(SelectArgs {
            id: None,
            date,
            category: Some(category),
            amount,
            description: Some(description),
        }))
    }

    async fn update(&mut self) -> Result<Step> {
        let select = ask!(self.select()?);
        let set_date = ask!(self.date("New date (blank to keep): ", true)?);
        let set_category = ask!(self.text("New category (blank to keep): ")?);
        let set_amount = ask!(self.amount("New amount (blank to keep): ", true)?);
        let set_description = ask!(self.text("New description (blank to keep): ")?);
        let args = UpdateArgs {
            select,
            set_date,
            set_category: Self::blank_as_none(set_category),
            set_amount,
            set_description: Self::blank_as_none(set_description),
        };
        let out = commands::update(&self.config, args).await?;
        self.say(out.message())
    }

    async fn delete(&mut self) -> Result<Step> {
        let select = ask!(self.select()?);
        let out = commands::delete(&self.config, DeleteArgs { select }).await?;
        self.say(out.message())
    }

    async fn search(&mut self) -> Result<Step> {
        let text = ask!(self.text("Category contains: ")?);
        let out = commands::search(&self.config, SearchArgs { text }).await?;
        self.say(out.message())
    }

    async fn totals(&mut self, by: GroupBy) -> Result<Step> {
        let out = commands::summary(&self.config, SummaryArgs { by }).await?;
        self.say(out.message())
    }

    async fn chart(&mut self) -> Result<Step> {
        writeln!(self.output, "{CHART_MENU}")?;
        let choice = ask!(self.parsed("Choose a chart: ", false, |s| match s {
            "1" | "2" | "3" | "4" => Ok(s.to_string()),
            _ => Err(anyhow::anyhow!("Invalid chart '{s}'")),
        })?);
        let out = match choice.as_deref() {
            Some("1") | Some("2") => {
                let kind = if choice.as_deref() == Some("1") {
                    CategoryChart::Pie
                } else {
                    CategoryChart::Bar
                };
                let args = CategoryChartArgs {
                    kind,
                    month: None,
                    output: Some(self.out_dir.join(report::CATEGORY_CHART)),
                };
                commands::chart_category(&self.config, args).await?
            }
            _ => {
                let kind = if choice.as_deref() == Some("3") {
                    MonthlyChart::Bar
                } else {
                    MonthlyChart::Line
                };
                let args = MonthlyChartArgs {
                    kind,
                    output: Some(self.out_dir.join(report::MONTHLY_CHART)),
                };
                commands::chart_month(&self.config, args).await?
            }
        };
        self.say(out.message())
    }

    async fn report(&mut self) -> Result<Step> {
        let args = ReportArgs {
            output: Some(self.out_dir.join(report::PDF_REPORT)),
        };
        let out = commands::report(&self.config, args).await?;
        self.say(out.message())
    }

    async fn export(&mut self) -> Result<Step> {
        let month = ask!(self.parsed(
            "Month (YYYY-MM, blank for the latest): ",
            false,
            MonthSelection::from_str
        )?);
        let month = month.unwrap_or_default();
        let output = match month {
            MonthSelection::Month(period) => Some(self.out_dir.join(export_file_name(period))),
            MonthSelection::Latest => self.latest_export_path().await?,
        };
        let out = commands::export(&self.config, ExportArgs { month, output }).await?;
        self.say(out.message())
    }

    async fn latest_export_path(&self) -> Result<Option<PathBuf>> {
        let rows = self.config.store().all().await?;
        Ok(ledger::latest_period(&rows).map(|period| self.out_dir.join(export_file_name(period))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    async fn run(env: &TestEnv, lines: &[&str]) -> String {
        let script = Script::new(lines.to_vec());
        let mut shell = AppContext::new(env.config(), script, Vec::new(), env.dir());
        shell.run().await.unwrap();
        String::from_utf8(shell.into_output()).unwrap()
    }

    #[tokio::test]
    async fn test_exit() {
        let env = TestEnv::new().await;
        let out = run(&env, &["0", "1"]).await;
        assert!(out.contains("1. Add expense"));
        assert!(out.ends_with("Goodbye\n"));
        assert_eq!(out.matches("==== Expense Ledger ====").count(), 1);
    }

    #[tokio::test]
    async fn test_end_of_input_exits() {
        let env = TestEnv::new().await;
        let out = run(&env, &[]).await;
        assert!(out.ends_with("Goodbye\n"));
    }

    #[tokio::test]
    async fn test_invalid_choice_reprompts() {
        let env = TestEnv::new().await;
        let out = run(&env, &["11", "abc", "0"]).await;
        assert!(out.contains("Invalid choice '11'"));
        assert!(out.contains("Invalid choice 'abc'"));
        assert_eq!(out.matches("==== Expense Ledger ====").count(), 3);
    }

    #[tokio::test]
    async fn test_add_and_view() {
        let env = TestEnv::new().await;
        let out = run(
            &env,
            &[
                "1", "2025-13-01", "2025-10-14", "eating out", "-5", "abc", "250", "Lunch", "2",
                "0",
            ],
        )
        .await;
        assert!(out.contains("Added ₹250.00 for Eating Out on 2025-10-14"));
        assert_eq!(out.matches(", try again").count(), 3);
        assert!(out.contains("| 2025-10-14 | Eating Out | ₹250.00 | Lunch       |"));
        assert_eq!(env.config().store().all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_add_blank_date_is_today() {
        let env = TestEnv::new().await;
        run(&env, &["1", "", "Food", "10", "", "0"]).await;
        let all = env.config().store().expenses().await.unwrap();
        assert_eq!(all[0].date(), today());
        assert_eq!(all[0].description(), "");
    }

    #[tokio::test]
    async fn test_update_and_delete_csv() {
        let env = TestEnv::new().await;
        env.seed_scenario_b().await;
        let out = run(
            &env,
            &[
                "3", "2025-10-14", "Food", "250", "Lunch with friends", "", "", "300", "", "4",
                "2025-10-13", "Travel", "120.50", "Cab to office", "0",
            ],
        )
        .await;
        assert!(out.contains(
            "Updated Food ₹250.00 on 2025-10-14 to Food ₹300.00 on 2025-10-14"
        ));
        assert!(out.contains("Deleted ₹120.50 for Travel on 2025-10-13"));
        let all = env.config().store().expenses().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].description(), "Lunch with friends");
    }

    #[tokio::test]
    async fn test_delete_by_id_sqlite() {
        let env = TestEnv::with_backend(Backend::Sqlite).await;
        env.seed_scenario_b().await;
        let out = run(&env, &["4", "two", "2", "4", "2", "0"]).await;
        assert!(out.contains("Deleted ₹120.50 for Travel on 2025-10-13"));
        assert!(out.contains("No expense with ID 2"));
    }

    #[tokio::test]
    async fn test_totals_and_search() {
        let env = TestEnv::new().await;
        env.seed_scenario_b().await;
        let out = run(&env, &["6", "7", "5", "shop", "0"]).await;
        assert!(out.contains("| Shopping |   ₹950.00 |"));
        assert!(out.contains("| 2025-10 | ₹1,320.50 |"));
        assert!(out.contains("1 expense matching 'shop'"));
    }

    #[tokio::test]
    async fn test_files_go_to_output_dir() {
        let env = TestEnv::new().await;
        env.seed_scenario_b().await;
        run(&env, &["8", "9", "1", "8", "4", "9", "10", "", "0"]).await;
        assert!(env.output(report::CATEGORY_CHART).is_file());
        assert!(env.output(report::MONTHLY_CHART).is_file());
        assert!(env.output(report::PDF_REPORT).is_file());
        assert!(env.output("expense_report_2025-10.csv").is_file());
    }

    #[tokio::test]
    async fn test_export_without_data() {
        let env = TestEnv::new().await;
        env.seed_scenario_b().await;
        let out = run(&env, &["10", "Sept", "2025-09", "0"]).await;
        assert!(out.contains("No data for 2025-09"));
        assert!(!env.output("expense_report_2025-09.csv").exists());
    }

    #[tokio::test]
    async fn test_error_keeps_menu_running() {
        let env = TestEnv::new().await;
        env.seed_scenario_b().await;
        let missing = env.output("missing");
        let script = Script::new(["9", "2", "0"]);
        let mut shell = AppContext::new(env.config(), script, Vec::new(), missing);
        shell.run().await.unwrap();
        let out = String::from_utf8(shell.into_output()).unwrap();
        assert!(out.contains("Error: "));
        assert!(out.contains("Shopping"));
        assert!(out.ends_with("Goodbye\n"));
    }
}

//! Read-only commands: listing, searching and summarizing the ledger.

use crate::args::{GroupBy, ListArgs, SearchArgs, SummaryArgs};
use crate::commands::{plural, today, Out};
use crate::error::{ErrorType, IntoResult};
use crate::ledger::{self, Summary};
use crate::model::{Amount, Category, Currency, Expense, Period, Row, DATE_FORMAT};
use crate::report::table;
use crate::{Config, Result};
use serde::Serialize;
use tracing::warn;

const EMPTY: &str = "No expenses recorded yet";

/// Shows the ledger as a table, in stored order. With `--limit N` only the N most recent records
/// are shown, newest first.
pub async fn list(config: &Config, args: ListArgs) -> Result<Out<Vec<Row<Expense>>>> {
    let rows = config
        .store()
        .all()
        .await
        .pub_result(ErrorType::Persistence)?;
    if rows.is_empty() {
        warn!("The ledger at {} is empty", config.store_path().display());
        return Ok(Out::new(EMPTY, rows));
    }
    let rows = match args.limit {
        Some(n) => ledger::recent(&rows, n),
        None => rows,
    };
    let message = format!(
        "{}\n{}",
        table::expenses(&rows, config.currency()),
        plural(rows.len(), "expense", "expenses")
    );
    Ok(Out::new(message, rows))
}

/// Shows the records whose category contains `text`, ignoring case.
pub async fn search(config: &Config, args: SearchArgs) -> Result<Out<Vec<Row<Expense>>>> {
    let rows = config
        .store()
        .search(&args.text)
        .await
        .pub_result(ErrorType::Persistence)?;
    if rows.is_empty() {
        return Ok(Out::new(
            format!("No expenses in a category matching '{}'", args.text.trim()),
            rows,
        ));
    }
    let message = format!(
        "{}\n{} matching '{}', {} in total",
        table::expenses(&rows, config.currency()),
        plural(rows.len(), "expense", "expenses"),
        args.text.trim(),
        ledger::total_spent(&rows).display(config.currency())
    );
    Ok(Out::new(message, rows))
}

/// The structured output of `summary`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case", tag = "by", content = "totals")]
pub enum Grouped {
    Overview(Summary),
    Category(Vec<(Category, Amount)>),
    Month(Vec<(Period, Amount)>),
}

/// Shows the overview or the totals per category or per month.
pub async fn summary(config: &Config, args: SummaryArgs) -> Result<Out<Grouped>> {
    let expenses = config
        .store()
        .expenses()
        .await
        .pub_result(ErrorType::Persistence)?;
    let currency = config.currency();

    let (message, grouped) = match args.by {
        GroupBy::Overview => {
            let summary = ledger::summarize(&expenses, today(), config.recent_count());
            (overview(&summary, currency), Grouped::Overview(summary))
        }
        GroupBy::Category => {
            let entries = ledger::sorted_desc(&ledger::totals_by_category(&expenses));
            (
                table::totals("Category", &entries, currency),
                Grouped::Category(entries),
            )
        }
        GroupBy::Month => {
            let entries: Vec<(Period, Amount)> =
                ledger::totals_by_month(&expenses).into_iter().collect();
            (
                table::totals("Month", &entries, currency),
                Grouped::Month(entries),
            )
        }
    };

    if expenses.is_empty() {
        return Ok(Out::new(EMPTY, grouped));
    }
    Ok(Out::new(message, grouped))
}

fn overview(summary: &Summary, currency: Currency) -> String {
    let top = match &summary.top {
        Some(top) => format!("{} ({})", top.category, top.total.display(currency)),
        None => "N/A".to_string(),
    };
    let mut lines = vec![
        format!("Total spent:      {}", summary.total.display(currency)),
        format!("Top category:     {top}"),
        format!("Expenses:         {}", summary.count),
        format!(
            "Spent in {}:  {}",
            summary.period,
            summary.period_total.display(currency)
        ),
    ];
    if !summary.recent.is_empty() {
        lines.push(format!("Most recent {}:", summary.recent.len()));
        for expense in &summary.recent {
            lines.push(format!(
                "  {}  {:<14} {:>12}  {}",
                expense.date().format(DATE_FORMAT),
                expense.category().name(),
                expense.amount().display(currency),
                expense.description()
            ));
        }
    }
    lines.join("\n")
}

//! Commands that write charts, the PDF summary and CSV exports.

use crate::args::{CategoryChartArgs, ExportArgs, MonthSelection, MonthlyChartArgs, ReportArgs};
use crate::commands::{today, Out};
use crate::error::{ErrorType, IntoResult};
use crate::ledger;
use crate::model::Expense;
use crate::report::{
    chart, export_file_name, pdf, Rendered, CATEGORY_CHART, MONTHLY_CHART, PDF_REPORT,
};
use crate::{Config, Result};
use std::path::{Path, PathBuf};

async fn expenses(config: &Config) -> Result<Vec<Expense>> {
    config
        .store()
        .expenses()
        .await
        .pub_result(ErrorType::Persistence)
}

fn output_or(output: Option<PathBuf>, default: impl AsRef<Path>) -> PathBuf {
    output.unwrap_or_else(|| default.as_ref().to_path_buf())
}

fn written(what: &str, rendered: Rendered, empty: String) -> Out<Rendered> {
    match rendered.path() {
        Some(path) => Out::new(format!("Wrote {what} to {}", path.display()), rendered),
        None => Out::new(empty, rendered),
    }
}

/// Draws the category totals, optionally of a single month, as a pie or bar chart.
pub async fn chart_category(config: &Config, args: CategoryChartArgs) -> Result<Out<Rendered>> {
    let mut expenses = expenses(config).await?;
    if let Some(period) = args.month {
        expenses = ledger::for_period(&expenses, period);
    }
    let totals = ledger::totals_by_category(&expenses);
    let path = output_or(args.output, CATEGORY_CHART);
    let rendered = chart::category(&totals, args.kind, config.currency(), &path).await?;
    let empty = match args.month {
        Some(period) => format!("No data for {period}"),
        None => "No data to chart".to_string(),
    };
    Ok(written(&format!("the {} chart", args.kind), rendered, empty))
}

/// Draws the monthly totals as a bar or line chart.
pub async fn chart_month(config: &Config, args: MonthlyChartArgs) -> Result<Out<Rendered>> {
    let totals = ledger::totals_by_month(&expenses(config).await?);
    let path = output_or(args.output, MONTHLY_CHART);
    let rendered = chart::monthly(&totals, args.kind, config.currency(), &path).await?;
    Ok(written(
        &format!("the monthly {} chart", args.kind),
        rendered,
        "No data to chart".to_string(),
    ))
}

/// Writes the PDF summary of the whole ledger.
pub async fn report(config: &Config, args: ReportArgs) -> Result<Out<Rendered>> {
    let summary = ledger::summarize(&expenses(config).await?, today(), config.recent_count());
    let path = output_or(args.output, PDF_REPORT);
    let rendered = pdf::render(&summary, config.currency(), &path).await?;
    Ok(written(
        "the report",
        rendered,
        "No expenses to report".to_string(),
    ))
}

/// Writes the expenses of one month, by default the most recent month with any, to a CSV file.
pub async fn export(config: &Config, args: ExportArgs) -> Result<Out<Rendered>> {
    let rows = config
        .store()
        .all()
        .await
        .pub_result(ErrorType::Persistence)?;
    let period = match args.month {
        MonthSelection::Month(period) => period,
        MonthSelection::Latest => match ledger::latest_period(&rows) {
            Some(period) => period,
            None => return Ok(Out::new("No expenses to export", Rendered::NoData)),
        },
    };
    let path = output_or(args.output, export_file_name(period));
    let rendered = crate::report::export::month(&rows, period, &path).await?;
    Ok(written(
        &format!("the expenses of {period}"),
        rendered,
        format!("No data for {period}"),
    ))
}

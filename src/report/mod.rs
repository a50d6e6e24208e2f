//! Rendering of ledger data for people: console tables, SVG charts, a PDF summary and per-month
//! CSV exports.
//!
//! Every renderer is a pure transform of its input plus, for the file-based ones, a single write.
//! A renderer that is handed nothing to show returns `Rendered::NoData` and writes nothing.

pub mod chart;
pub mod export;
pub mod pdf;
pub mod table;

use crate::model::Period;
use serde::Serialize;
use std::path::PathBuf;

/// Default file name of the category chart.
pub const CATEGORY_CHART: &str = "category_chart.svg";

/// Default file name of the monthly chart.
pub const MONTHLY_CHART: &str = "monthly_chart.svg";

/// Default file name of the PDF summary.
pub const PDF_REPORT: &str = "Expense_Report.pdf";

/// Default file name of the CSV export for `period`, e.g. `expense_report_2025-10.csv`.
pub fn export_file_name(period: Period) -> String {
    format!("expense_report_{period}.csv")
}

/// The outcome of a renderer that writes a file.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "path")]
pub enum Rendered {
    /// The file was written at this path.
    Written(PathBuf),
    /// There was nothing to render, no file was written.
    NoData,
}

impl Rendered {
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Rendered::Written(path) => Some(path),
            Rendered::NoData => None,
        }
    }
}

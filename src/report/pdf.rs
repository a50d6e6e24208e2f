//! The PDF summary report.
//!
//! Rendering happens in two steps. `layout` places every line of text on a page in PDF points,
//! starting a new page when the next line would fall below `BOTTOM_MARGIN`. `draw` then turns the
//! pages into a document with the built-in Helvetica fonts.

use crate::error::{ErrorType, IntoResult};
use crate::ledger::Summary;
use crate::model::{Currency, Expense, DATE_FORMAT};
use crate::report::Rendered;
use crate::{utils, Result};
use anyhow::anyhow;
use printpdf::{BuiltinFont, Mm, PdfDocument};
use std::path::Path;
use tracing::debug;

const TITLE: &str = "Expense Report";

// A4 in millimetres.
const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;

const LEFT: f64 = 100.0;
const TITLE_X: f64 = 200.0;
const TITLE_Y: f64 = 800.0;
const TITLE_SIZE: f64 = 18.0;
const BODY_SIZE: f64 = 12.0;
const ROW_SIZE: f64 = 10.0;
const ROW_HEIGHT: f64 = 15.0;

/// A line is never placed below this height.
pub(crate) const BOTTOM_MARGIN: f64 = 100.0;

/// Where lines continue on a new page.
pub(crate) const CONTINUE_AT: f64 = 750.0;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum Style {
    Title,
    Body,
    Row,
}

impl Style {
    fn size(&self) -> f64 {
        match self {
            Style::Title => TITLE_SIZE,
            Style::Body => BODY_SIZE,
            Style::Row => ROW_SIZE,
        }
    }
}

/// A line of text at a position on a page, in points from the bottom left corner.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Placed {
    pub(crate) x: f64,
    pub(crate) y: f64,
    pub(crate) style: Style,
    pub(crate) text: String,
}

impl Placed {
    fn new(x: f64, y: f64, style: Style, text: impl Into<String>) -> Self {
        Self {
            x,
            y,
            style,
            text: ascii(&text.into()),
        }
    }
}

pub(crate) type Page = Vec<Placed>;

/// Writes the summary as a PDF to `path`. Writes nothing when the ledger has no records.
pub async fn render(summary: &Summary, currency: Currency, path: &Path) -> Result<Rendered> {
    if summary.count == 0 {
        return Ok(Rendered::NoData);
    }
    let pages = layout(summary, currency);
    let bytes = draw(&pages).pub_result(ErrorType::Render)?;
    utils::write(path, bytes)
        .await
        .pub_result(ErrorType::Render)?;
    debug!("Wrote {} page(s) to {}", pages.len(), path.display());
    Ok(Rendered::Written(path.to_path_buf()))
}

/// Places the header figures and the recent records on as many pages as they need.
pub(crate) fn layout(summary: &Summary, currency: Currency) -> Vec<Page> {
    let prefix = currency.ascii_prefix();
    let top = match &summary.top {
        Some(top) => format!("{} ({})", top.category, top.total.display_with(&prefix)),
        None => "N/A".to_string(),
    };

    let mut page = vec![
        Placed::new(TITLE_X, TITLE_Y, Style::Title, TITLE),
        Placed::new(
            LEFT,
            760.0,
            Style::Body,
            format!("Total Expenses: {}", summary.total.display_with(&prefix)),
        ),
        Placed::new(LEFT, 740.0, Style::Body, format!("Top Category: {top}")),
        Placed::new(
            LEFT,
            720.0,
            Style::Body,
            format!("Number of Expenses: {}", summary.count),
        ),
        Placed::new(
            LEFT,
            700.0,
            Style::Body,
            format!(
                "Spent in {}: {}",
                summary.period,
                summary.period_total.display_with(&prefix)
            ),
        ),
        Placed::new(LEFT, 670.0, Style::Body, "Recent Transactions:"),
    ];

    let mut pages = Vec::new();
    let mut y = 650.0;
    for expense in &summary.recent {
        if y < BOTTOM_MARGIN {
            pages.push(std::mem::take(&mut page));
            y = CONTINUE_AT;
        }
        page.push(Placed::new(LEFT, y, Style::Row, row_text(expense, &prefix)));
        y -= ROW_HEIGHT;
    }
    pages.push(page);
    pages
}

fn row_text(expense: &Expense, prefix: &str) -> String {
    format!(
        "{} | {:<14} | {:>14} | {}",
        expense.date().format(DATE_FORMAT),
        expense.category().name(),
        expense.amount().display_with(prefix),
        expense.description()
    )
}

/// Text is written to the built-in fonts as raw bytes, so only ASCII survives; every other
/// character, Latin-1 included, becomes `?`.
fn ascii(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii() { c } else { '?' })
        .collect()
}

fn points(pt: f64) -> Mm {
    Mm((pt * 25.4 / 72.0) as f32)
}

fn draw(pages: &[Page]) -> Result<Vec<u8>> {
    let (doc, first_page, first_layer) =
        PdfDocument::new(TITLE, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| anyhow!("Unable to load the Helvetica font: {e:?}"))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| anyhow!("Unable to load the Helvetica Bold font: {e:?}"))?;

    for (ix, page) in pages.iter().enumerate() {
        let layer = if ix == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (p, l) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            doc.get_page(p).get_layer(l)
        };
        for line in page {
            let font = match line.style {
                Style::Title => &bold,
                Style::Body | Style::Row => &regular,
            };
            layer.use_text(
                line.text.clone(),
                line.style.size() as f32,
                points(line.x),
                points(line.y),
                font,
            );
        }
    }

    doc.save_to_bytes()
        .map_err(|e| anyhow!("Unable to produce the PDF document: {e:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 20).unwrap()
    }

    fn records(n: usize) -> Vec<Expense> {
        (0..n)
            .map(|i| {
                let date = today() - chrono::Duration::days(i as i64);
                Expense::new(date, "Food", format!("{}.50", i + 1).parse().unwrap(), "Tea").unwrap()
            })
            .collect()
    }

    #[test]
    fn test_header() {
        let summary = ledger::summarize(&records(3), today(), 10);
        let pages = layout(&summary, Currency::Inr);
        assert_eq!(pages.len(), 1);
        let page = &pages[0];
        assert_eq!(page[0].text, "Expense Report");
        assert_eq!(page[0].style, Style::Title);
        assert_eq!(page[1].text, "Total Expenses: INR 7.50");
        assert_eq!(page[2].text, "Top Category: Food (INR 7.50)");
        // Header plus three rows
        assert_eq!(page.len(), 9);
        assert!(page[6].text.starts_with("2025-10-20 | Food"));
    }

    #[test]
    fn test_no_top_category() {
        let summary = ledger::summarize(&Vec::<Expense>::new(), today(), 10);
        let pages = layout(&summary, Currency::Usd);
        assert_eq!(pages[0][2].text, "Top Category: N/A");
    }

    #[test]
    fn test_page_breaks_at_bottom_margin() {
        let summary = ledger::summarize(&records(50), today(), 50);
        let pages = layout(&summary, Currency::Usd);
        assert_eq!(pages.len(), 2);
        // 650 down to 110 fits 37 rows on the first page.
        assert_eq!(pages[0].len(), 6 + 37);
        assert_eq!(pages[1].len(), 13);
        assert_eq!(pages[1][0].y, CONTINUE_AT);
        for page in &pages {
            assert!(page.iter().all(|line| line.y >= BOTTOM_MARGIN));
        }
    }

    #[test]
    fn test_recent_count_limits_rows() {
        let summary = ledger::summarize(&records(50), today(), 10);
        let pages = layout(&summary, Currency::Usd);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].len(), 6 + 10);
    }

    #[test]
    fn test_only_ascii_is_kept() {
        assert_eq!(ascii("Café ₹"), "Caf? ?");
        assert_eq!(ascii("£5 Größe"), "?5 Gr??e");
        assert_eq!(ascii("Lunch, 2 x $5"), "Lunch, 2 x $5");
    }

    #[tokio::test]
    async fn test_render_writes_pdf() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Expense_Report.pdf");
        let summary = ledger::summarize(&records(60), today(), 60);
        let rendered = render(&summary, Currency::Eur, &path).await.unwrap();
        assert_eq!(rendered, Rendered::Written(path.clone()));
        let bytes = tokio::fs::read(&path).await.unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_render_empty_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Expense_Report.pdf");
        let summary = ledger::summarize(&Vec::<Expense>::new(), today(), 10);
        let rendered = render(&summary, Currency::Eur, &path).await.unwrap();
        assert_eq!(rendered, Rendered::NoData);
        assert!(!path.exists());
    }
}

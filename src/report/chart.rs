//! SVG charts of grouped totals.
//!
//! Category totals are drawn as a pie or as bars sorted from the largest sum down. Monthly totals
//! are drawn as bars or as a trend line, oldest month on the left.

use crate::error::{ErrorType, IntoResult};
use crate::ledger::{self, Totals};
use crate::model::{Amount, Category, Currency, Period};
use crate::report::Rendered;
use crate::{utils, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::path::Path;
use svg::node::element::path::Data;
use svg::node::element::{Circle, Line, Path as SvgPath, Polyline, Rectangle, Text};
use svg::Document;
use tracing::debug;

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 500.0;
const MARGIN: f64 = 60.0;
const FONT: &str = "sans-serif";

const COLORS: &[&str] = &[
    "#4e79a7", "#f28e2b", "#e15759", "#76b7b2", "#59a14f", "#edc948", "#b07aa1", "#ff9da7",
    "#9c755f", "#bab0ac",
];

/// How category totals are drawn.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CategoryChart {
    #[default]
    Pie,
    Bar,
}

/// How monthly totals are drawn.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum MonthlyChart {
    #[default]
    Bar,
    Line,
}

serde_plain::derive_display_from_serialize!(CategoryChart);
serde_plain::derive_display_from_serialize!(MonthlyChart);

/// Draws the category chart and writes it to `path`. Writes nothing for empty totals.
pub async fn category(
    totals: &Totals<Category>,
    kind: CategoryChart,
    currency: Currency,
    path: &Path,
) -> Result<Rendered> {
    match category_document(totals, kind, currency) {
        Some(document) => save(&document, path).await,
        None => Ok(Rendered::NoData),
    }
}

/// Draws the monthly chart and writes it to `path`. Writes nothing for empty totals.
pub async fn monthly(
    totals: &Totals<Period>,
    kind: MonthlyChart,
    currency: Currency,
    path: &Path,
) -> Result<Rendered> {
    match monthly_document(totals, kind, currency) {
        Some(document) => save(&document, path).await,
        None => Ok(Rendered::NoData),
    }
}

pub(crate) fn category_document(
    totals: &Totals<Category>,
    kind: CategoryChart,
    currency: Currency,
) -> Option<Document> {
    if totals.is_empty() {
        return None;
    }
    let entries: Vec<(String, Amount)> = ledger::sorted_desc(totals)
        .into_iter()
        .map(|(category, amount)| (category.to_string(), amount))
        .collect();
    Some(match kind {
        CategoryChart::Pie => pie("Expenses by Category", &entries, currency),
        CategoryChart::Bar => bars("Expenses by Category", &entries, currency),
    })
}

pub(crate) fn monthly_document(
    totals: &Totals<Period>,
    kind: MonthlyChart,
    currency: Currency,
) -> Option<Document> {
    if totals.is_empty() {
        return None;
    }
    let entries: Vec<(String, Amount)> = totals
        .iter()
        .map(|(period, amount)| (period.to_string(), *amount))
        .collect();
    Some(match kind {
        MonthlyChart::Bar => bars("Monthly Expenses", &entries, currency),
        MonthlyChart::Line => trend("Monthly Expense Trend", &entries, currency),
    })
}

async fn save(document: &Document, path: &Path) -> Result<Rendered> {
    utils::write(path, document.to_string())
        .await
        .with_context(|| format!("Unable to save the chart to {}", path.display()))
        .pub_result(ErrorType::Render)?;
    debug!("Wrote chart {}", path.display());
    Ok(Rendered::Written(path.to_path_buf()))
}

fn canvas(title: &str) -> Document {
    Document::new()
        .set("viewBox", (0.0, 0.0, WIDTH, HEIGHT))
        .set("width", WIDTH)
        .set("height", HEIGHT)
        .add(
            Rectangle::new()
                .set("width", WIDTH)
                .set("height", HEIGHT)
                .set("fill", "white"),
        )
        .add(text(WIDTH / 2.0, 32.0, "middle", 20.0, title))
}

fn text(x: f64, y: f64, anchor: &str, size: f64, content: &str) -> Text {
    Text::new(content)
        .set("x", x)
        .set("y", y)
        .set("text-anchor", anchor)
        .set("font-family", FONT)
        .set("font-size", size)
}

fn color(ix: usize) -> &'static str {
    COLORS[ix % COLORS.len()]
}

/// A pie with a legend on the right. Each slice is a polygon that follows its arc in steps of at
/// most one degree.
fn pie(title: &str, entries: &[(String, Amount)], currency: Currency) -> Document {
    let total: Amount = entries.iter().map(|(_, amount)| amount).sum();
    let (cx, cy, r) = (WIDTH * 0.3, HEIGHT / 2.0 + 20.0, 170.0);
    let point = |turns: f64| {
        let angle = turns * 2.0 * PI - PI / 2.0;
        (cx + r * angle.cos(), cy + r * angle.sin())
    };

    let mut document = canvas(title);
    let mut start = 0.0;
    for (ix, (label, amount)) in entries.iter().enumerate() {
        let fraction = amount.fraction_of(total);
        let end = start + fraction;
        let steps = ((fraction * 360.0).ceil() as usize).max(1);
        let mut data = Data::new().move_to((cx, cy));
        for step in 0..=steps {
            data = data.line_to(point(start + fraction * step as f64 / steps as f64));
        }
        document = document.add(
            SvgPath::new()
                .set("fill", color(ix))
                .set("stroke", "white")
                .set("stroke-width", 1)
                .set("d", data.close()),
        );

        let y = 90.0 + ix as f64 * 26.0;
        document = document
            .add(
                Rectangle::new()
                    .set("x", WIDTH * 0.6)
                    .set("y", y - 13.0)
                    .set("width", 16)
                    .set("height", 16)
                    .set("fill", color(ix)),
            )
            .add(text(
                WIDTH * 0.6 + 24.0,
                y,
                "start",
                14.0,
                &format!(
                    "{label}: {:.1}% ({})",
                    fraction * 100.0,
                    amount.display(currency)
                ),
            ));
        start = end;
    }
    document
}

fn scale(entries: &[(String, Amount)]) -> f64 {
    entries
        .iter()
        .map(|(_, amount)| amount.to_f64())
        .fold(0.0, f64::max)
        .max(f64::MIN_POSITIVE)
}

fn axes(document: Document) -> Document {
    let bottom = HEIGHT - MARGIN;
    document
        .add(
            Line::new()
                .set("x1", MARGIN)
                .set("y1", MARGIN)
                .set("x2", MARGIN)
                .set("y2", bottom)
                .set("stroke", "black"),
        )
        .add(
            Line::new()
                .set("x1", MARGIN)
                .set("y1", bottom)
                .set("x2", WIDTH - MARGIN)
                .set("y2", bottom)
                .set("stroke", "black"),
        )
}

/// Vertical bars in the order given, each labelled with its key below and its sum above.
fn bars(title: &str, entries: &[(String, Amount)], currency: Currency) -> Document {
    let max = scale(entries);
    let plot_width = WIDTH - 2.0 * MARGIN;
    let plot_height = HEIGHT - 2.0 * MARGIN - 20.0;
    let bottom = HEIGHT - MARGIN;
    let slot = plot_width / entries.len() as f64;
    let bar_width = slot * 0.7;

    let mut document = axes(canvas(title));
    for (ix, (label, amount)) in entries.iter().enumerate() {
        let height = amount.to_f64() / max * plot_height;
        let x = MARGIN + slot * ix as f64 + (slot - bar_width) / 2.0;
        let center = x + bar_width / 2.0;
        document = document
            .add(
                Rectangle::new()
                    .set("x", x)
                    .set("y", bottom - height)
                    .set("width", bar_width)
                    .set("height", height)
                    .set("fill", color(ix)),
            )
            .add(text(center, bottom + 18.0, "middle", 12.0, label))
            .add(text(
                center,
                bottom - height - 6.0,
                "middle",
                11.0,
                &amount.display(currency),
            ));
    }
    document
}

/// A line through the sums, one marked point per entry.
fn trend(title: &str, entries: &[(String, Amount)], currency: Currency) -> Document {
    let max = scale(entries);
    let plot_width = WIDTH - 2.0 * MARGIN;
    let plot_height = HEIGHT - 2.0 * MARGIN - 20.0;
    let bottom = HEIGHT - MARGIN;
    let slot = plot_width / entries.len() as f64;

    let points: Vec<(f64, f64)> = entries
        .iter()
        .enumerate()
        .map(|(ix, (_, amount))| {
            (
                MARGIN + slot * (ix as f64 + 0.5),
                bottom - amount.to_f64() / max * plot_height,
            )
        })
        .collect();
    let polyline: Vec<String> = points.iter().map(|(x, y)| format!("{x:.2},{y:.2}")).collect();

    let mut document = axes(canvas(title)).add(
        Polyline::new()
            .set("points", polyline.join(" "))
            .set("fill", "none")
            .set("stroke", color(0))
            .set("stroke-width", 2),
    );
    for ((label, amount), (x, y)) in entries.iter().zip(&points) {
        document = document
            .add(
                Circle::new()
                    .set("cx", *x)
                    .set("cy", *y)
                    .set("r", 4)
                    .set("fill", color(0)),
            )
            .add(text(*x, bottom + 18.0, "middle", 12.0, label))
            .add(text(*x, y - 10.0, "middle", 11.0, &amount.display(currency)));
    }
    document
}

//! The fare report: aggregates over prepared tickets and their rendering.

use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Write};

use serde::Serialize;
use thiserror::Error;

use crate::config::ReportConfig;
use crate::stats::{self, Correlation, StatsError, Summary, round2};
use crate::tickets::Ticket;

#[derive(Debug, Error, PartialEq)]
pub enum ReportError {
    #[error("no priced tickets to analyse")]
    NoTickets,
    #[error(transparent)]
    Stats(#[from] StatsError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallStats {
    pub mean: f64,
    pub median: f64,
    pub std: Option<f64>,
    pub confidence: f64,
    /// `None` when the standard error is undefined (single ticket).
    pub confidence_interval: Option<(f64, f64)>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteStats {
    pub origin: String,
    pub destination: String,
    pub price: Summary,
    pub duration_mean: f64,
    /// Rounded mean price over rounded mean duration; `None` for zero-length trips.
    pub price_per_hour: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FareStats {
    pub mean: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteCount {
    pub origin: String,
    pub destination: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
    pub range: f64,
}

/// Premium and flexible ticket counts and how far ahead tickets were bought.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TicketMix {
    pub premium: usize,
    pub flexible: usize,
    pub total: usize,
    /// Mean days between `insert_date` and `start_date`.
    pub lead_days_mean: f64,
}

/// Overall statistics, class and train type breakdowns, duration correlation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceDistribution {
    pub overall: OverallStats,
    pub by_class: BTreeMap<String, Summary>,
    pub by_train_type: BTreeMap<String, Summary>,
    /// `None` when duration or price is constant.
    pub duration_correlation: Option<Correlation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FareReport {
    #[serde(flatten)]
    pub prices: PriceDistribution,
    pub routes: Vec<RouteStats>,
    pub fares: BTreeMap<String, FareStats>,
    pub busiest_routes: Vec<RouteCount>,
    pub ticket_mix: TicketMix,
    pub price_range: PriceRange,
}

/// Group tickets by `key`, skipping tickets without one.
fn group_by<'a, K, F>(tickets: &'a [Ticket], key: F) -> BTreeMap<K, Vec<&'a Ticket>>
where
    K: Ord,
    F: Fn(&'a Ticket) -> Option<K>,
{
    let mut groups: BTreeMap<K, Vec<&Ticket>> = BTreeMap::new();
    for t in tickets {
        if let Some(k) = key(t) {
            groups.entry(k).or_default().push(t);
        }
    }
    groups
}

fn prices(tickets: &[&Ticket]) -> Vec<f64> {
    tickets.iter().map(|t| t.price).collect()
}

fn price_summaries<'a, F>(tickets: &'a [Ticket], key: F) -> stats::Result<BTreeMap<String, Summary>>
where
    F: Fn(&'a Ticket) -> Option<&'a String>,
{
    group_by(tickets, key)
        .into_iter()
        .map(|(k, group)| -> stats::Result<(String, Summary)> {
            Ok((k.clone(), Summary::of(&prices(&group))?.rounded()))
        })
        .collect()
}

pub fn analyze_price_distribution(
    tickets: &[Ticket],
    confidence: f64,
) -> Result<PriceDistribution, ReportError> {
    let all: Vec<f64> = tickets.iter().map(|t| t.price).collect();
    let mean = stats::mean(&all)?;
    let confidence_interval = match stats::sem(&all) {
        Some(sem) => Some(stats::normal_interval(confidence, mean, sem)?),
        None => None,
    };
    let overall = OverallStats {
        mean,
        median: stats::median(&all)?,
        std: stats::std_dev(&all),
        confidence,
        confidence_interval,
        count: all.len(),
    };

    let by_class = price_summaries(tickets, |t| t.train_class.as_ref())?;
    let by_train_type = price_summaries(tickets, |t| t.train_type.as_ref())?;

    let durations: Vec<f64> = tickets.iter().map(|t| t.duration_hours).collect();
    let duration_correlation = match stats::pearson(&durations, &all) {
        Ok(c) => Some(c),
        Err(e) => {
            log::warn!("duration/price correlation undefined: {e}");
            None
        }
    };

    Ok(PriceDistribution {
        overall,
        by_class,
        by_train_type,
        duration_correlation,
    })
}

/// Price and duration aggregates per (origin, destination).
pub fn analyze_routes(tickets: &[Ticket]) -> Result<Vec<RouteStats>, ReportError> {
    group_by(tickets, Ticket::route)
        .into_iter()
        .map(|((origin, destination), group)| -> Result<RouteStats, ReportError> {
            let price = Summary::of(&prices(&group))?.rounded();
            let durations: Vec<f64> = group.iter().map(|t| t.duration_hours).collect();
            let duration_mean = round2(stats::mean(&durations)?);
            let price_per_hour =
                (duration_mean != 0.0).then(|| round2(price.mean / duration_mean));
            Ok(RouteStats {
                origin: origin.to_string(),
                destination: destination.to_string(),
                price,
                duration_mean,
                price_per_hour,
            })
        })
        .collect()
}

/// Mean price and ticket count per fare.
pub fn fare_summary(tickets: &[Ticket]) -> Result<BTreeMap<String, FareStats>, ReportError> {
    group_by(tickets, |t| t.fare.as_ref())
        .into_iter()
        .map(|(fare, group)| -> Result<(String, FareStats), ReportError> {
            let mean = round2(stats::mean(&prices(&group))?);
            Ok((fare.clone(), FareStats { mean, count: group.len() }))
        })
        .collect()
}

/// The `top` routes by ticket count, most tickets first. Ties keep route order.
pub fn busiest_routes(tickets: &[Ticket], top: usize) -> Vec<RouteCount> {
    let mut counts: Vec<RouteCount> = group_by(tickets, Ticket::route)
        .into_iter()
        .map(|((origin, destination), group)| RouteCount {
            origin: origin.to_string(),
            destination: destination.to_string(),
            count: group.len(),
        })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(top);
    counts
}

pub fn ticket_mix(tickets: &[Ticket]) -> Result<TicketMix, ReportError> {
    let lead_days: Vec<f64> = tickets
        .iter()
        .map(|t| (t.start_date - t.insert_date).num_seconds() as f64 / 86_400.0)
        .collect();
    Ok(TicketMix {
        premium: tickets.iter().filter(|t| t.is_premium).count(),
        flexible: tickets.iter().filter(|t| t.is_flexible).count(),
        total: tickets.len(),
        lead_days_mean: round2(stats::mean(&lead_days)?),
    })
}

pub fn price_range(tickets: &[Ticket]) -> Result<PriceRange, ReportError> {
    let all: Vec<f64> = tickets.iter().map(|t| t.price).collect();
    let min = stats::min(&all)?;
    let max = stats::max(&all)?;
    Ok(PriceRange {
        min,
        max,
        range: max - min,
    })
}

/// The two analysis passes of [`build`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    PriceDistribution,
    Routes,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::PriceDistribution => write!(f, "Analysing price distribution..."),
            Stage::Routes => write!(f, "Analysing routes..."),
        }
    }
}

/// Run every analysis over `tickets`, calling `on_stage` as each pass starts.
pub fn build<F>(
    tickets: &[Ticket],
    config: &ReportConfig,
    mut on_stage: F,
) -> Result<FareReport, ReportError>
where
    F: FnMut(Stage),
{
    if tickets.is_empty() {
        return Err(ReportError::NoTickets);
    }
    on_stage(Stage::PriceDistribution);
    let prices = analyze_price_distribution(tickets, config.confidence)?;
    on_stage(Stage::Routes);
    Ok(FareReport {
        prices,
        routes: analyze_routes(tickets)?,
        fares: fare_summary(tickets)?,
        busiest_routes: busiest_routes(tickets, config.top_routes),
        ticket_mix: ticket_mix(tickets)?,
        price_range: price_range(tickets)?,
    })
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}"),
        None => "NaN".to_string(),
    }
}

/// Write an aligned plain-text table: first `text_cols` columns left-aligned,
/// the rest right-aligned.
fn write_table<W: Write>(
    out: &mut W,
    headers: &[&str],
    rows: &[Vec<String>],
    text_cols: usize,
) -> io::Result<()> {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (cell, &w))| {
                if i < text_cols {
                    format!("{cell:<w$}")
                } else {
                    format!("{cell:>w$}")
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    writeln!(out, "{}", line(headers.to_vec()))?;
    for row in rows {
        writeln!(out, "{}", line(row.iter().map(String::as_str).collect()))?;
    }
    Ok(())
}

fn write_summaries<W: Write>(out: &mut W, groups: &BTreeMap<String, Summary>) -> io::Result<()> {
    for (name, s) in groups {
        writeln!(out, "\n{name}:")?;
        writeln!(out, "Mean price: {:.2} €", s.mean)?;
        writeln!(out, "Standard deviation: {} €", fmt_opt(s.std, 2))?;
        writeln!(out, "Ticket count: {}", s.count)?;
    }
    Ok(())
}

/// Human-readable report.
pub fn render_text<W: Write>(report: &FareReport, out: &mut W) -> io::Result<()> {
    let p = &report.prices;
    let o = &p.overall;
    writeln!(out, "\nANALYSIS RESULTS:")?;
    writeln!(out, "\n1. Overall price statistics:")?;
    writeln!(out, "Mean price: {:.2} €", o.mean)?;
    writeln!(out, "Median price: {:.2} €", o.median)?;
    writeln!(out, "Standard deviation: {} €", fmt_opt(o.std, 2))?;
    let level = round2(o.confidence * 100.0);
    match o.confidence_interval {
        Some((lo, hi)) => writeln!(out, "{level}% confidence interval: [{lo:.2}, {hi:.2}] €")?,
        None => writeln!(out, "{level}% confidence interval: [NaN, NaN] €")?,
    }

    writeln!(out, "\n2. Prices by ticket class:")?;
    write_summaries(out, &p.by_class)?;
    writeln!(out, "\nPrices by train type:")?;
    write_summaries(out, &p.by_train_type)?;

    writeln!(out, "\n3. Correlation between duration and price:")?;
    match p.duration_correlation {
        Some(c) => {
            writeln!(out, "Correlation coefficient: {:.3}", c.r)?;
            writeln!(out, "P-value: {:.3}", c.p_value)?;
        }
        None => writeln!(out, "Correlation coefficient: NaN\nP-value: NaN")?,
    }

    writeln!(out, "\n4. Route statistics:")?;
    let rows: Vec<Vec<String>> = report
        .routes
        .iter()
        .map(|r| {
            vec![
                r.origin.clone(),
                r.destination.clone(),
                format!("{:.2}", r.price.mean),
                fmt_opt(r.price.std, 2),
                r.price.count.to_string(),
                format!("{:.2}", r.duration_mean),
                fmt_opt(r.price_per_hour, 2),
            ]
        })
        .collect();
    write_table(
        out,
        &[
            "origin",
            "destination",
            "price_mean",
            "price_std",
            "price_count",
            "duration_mean",
            "price_per_hour",
        ],
        &rows,
        2,
    )?;

    writeln!(out, "\n5. Additional statistics:")?;
    writeln!(out, "\nMean prices by fare type:")?;
    let rows: Vec<Vec<String>> = report
        .fares
        .iter()
        .map(|(fare, f)| vec![fare.clone(), format!("{:.2}", f.mean), f.count.to_string()])
        .collect();
    write_table(out, &["fare", "mean", "count"], &rows, 1)?;

    writeln!(out, "\nBusiest routes:")?;
    let rows: Vec<Vec<String>> = report
        .busiest_routes
        .iter()
        .map(|r| vec![r.origin.clone(), r.destination.clone(), r.count.to_string()])
        .collect();
    write_table(out, &["origin", "destination", "count"], &rows, 2)?;

    let mix = &report.ticket_mix;
    writeln!(out, "\nTicket mix:")?;
    writeln!(out, "Premium tickets: {} of {}", mix.premium, mix.total)?;
    writeln!(out, "Flexible tickets: {} of {}", mix.flexible, mix.total)?;
    writeln!(out, "Mean booking lead: {:.2} days", mix.lead_days_mean)?;

    let range = &report.price_range;
    writeln!(out, "\nPrice ranges:")?;
    writeln!(out, "Minimum price: {:.2} €", range.min)?;
    writeln!(out, "Maximum price: {:.2} €", range.max)?;
    writeln!(out, "Price range: {:.2} €", range.range)?;
    Ok(())
}

/// The whole report as pretty JSON.
pub fn render_json<W: Write>(report: &FareReport, out: &mut W) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)
}

use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::bayes::{NaiveBayes, Posterior, Prediction};
use crate::cli::{BayesArgs, Cli, Command, FaresArgs, OutputFormat};
use crate::config::ReportConfig;
use crate::data::loader;
use crate::data::model::Value;
use crate::data::weather::{self, HUMIDITY, OUTLOOK, PLAY, WIND};
use crate::{report, tickets};

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

pub fn run<W: Write>(cli: &Cli, out: &mut W) -> Result<()> {
    match &cli.command {
        Command::Bayes(args) => run_bayes(args, out),
        Command::Fares(args) => run_fares(args, out),
    }
}

// ---------------------------------------------------------------------------
// bayes
// ---------------------------------------------------------------------------

fn class_label(class: &Value) -> String {
    match class.as_str() {
        Some("Yes") => "Probability match is played".to_string(),
        Some("No") => "Probability match is cancelled".to_string(),
        _ => format!("Probability of {class}"),
    }
}

#[derive(Serialize)]
struct BayesOutput<'a> {
    posteriors: &'a [Posterior],
    most_likely: Option<&'a Value>,
}

/// Train on the weather table and print the posterior of each class.
pub fn run_bayes<W: Write>(args: &BayesArgs, out: &mut W) -> Result<()> {
    let model = NaiveBayes::fit(&weather::table(), PLAY, &weather::FEATURES, args.alpha)?;
    let query = [
        (OUTLOOK, Value::from(args.outlook.as_str())),
        (HUMIDITY, Value::from(args.humidity.as_str())),
        (WIND, Value::from(args.wind.as_str())),
    ];
    let prediction: Prediction = model
        .predict(&query)
        .with_context(|| format!("predicting {query:?}"))?;

    match args.format {
        OutputFormat::Text => {
            writeln!(out, "Prediction results:")?;
            for p in &prediction.posteriors {
                writeln!(out, "{}: {:.2}%", class_label(&p.class), p.probability * 100.0)?;
            }
        }
        OutputFormat::Json => {
            let output = BayesOutput {
                posteriors: &prediction.posteriors,
                most_likely: prediction.most_likely().map(|p| &p.class),
            };
            serde_json::to_writer_pretty(&mut *out, &output)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// fares
// ---------------------------------------------------------------------------

/// Config file (if any) with CLI overrides applied.
pub fn resolve_config(args: &FaresArgs) -> Result<ReportConfig> {
    let mut config = ReportConfig::load(args.config.as_deref())?;
    if let Some(confidence) = args.confidence {
        config.confidence = confidence;
    }
    if let Some(top) = args.top {
        config.top_routes = top;
    }
    config.validate()?;
    Ok(config)
}

/// Load the ticket dataset and print the fare report.
pub fn run_fares<W: Write>(args: &FaresArgs, out: &mut W) -> Result<()> {
    let config = resolve_config(args)?;
    let text = args.format == OutputFormat::Text;

    if text {
        writeln!(out, "Loading and preparing data...")?;
    }
    let table = loader::load_file(&args.input)
        .with_context(|| format!("loading {}", args.input.display()))?;
    let tickets = tickets::prepare(&table, &config)?;
    log::info!("{} priced tickets", tickets.len());

    let mut progress: std::io::Result<()> = Ok(());
    let report = report::build(&tickets, &config, |stage| {
        if text && progress.is_ok() {
            progress = writeln!(out, "\n{stage}");
        }
    })?;
    progress?;

    match args.format {
        OutputFormat::Text => report::render_text(&report, out)?,
        OutputFormat::Json => report::render_json(&report, out)?,
    }
    Ok(())
}

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use clap::Parser;
use parquet::arrow::ArrowWriter;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use statrs::distribution::Normal;

/// Write a synthetic Renfe-style ticket dataset for the `fares` report.
#[derive(Parser, Debug)]
#[command(name = "generate_sample")]
struct Args {
    /// Output file; `.parquet` writes Parquet, anything else CSV
    #[arg(default_value = "renfe_small.csv")]
    output: PathBuf,

    /// Number of tickets
    #[arg(long, default_value_t = 1000)]
    rows: usize,

    /// RNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// (origin, destination, scheduled hours)
const ROUTES: [(&str, &str, f64); 8] = [
    ("MADRID", "BARCELONA", 2.8),
    ("BARCELONA", "MADRID", 2.8),
    ("MADRID", "SEVILLA", 2.6),
    ("SEVILLA", "MADRID", 2.6),
    ("MADRID", "VALENCIA", 1.8),
    ("VALENCIA", "MADRID", 1.8),
    ("MADRID", "PONFERRADA", 4.2),
    ("PONFERRADA", "MADRID", 4.2),
];

/// (train type, duration factor, price factor)
const TRAIN_TYPES: [(&str, f64, f64); 5] = [
    ("AVE", 1.0, 1.0),
    ("ALVIA", 1.25, 0.8),
    ("AV City", 1.1, 0.7),
    ("INTERCITY", 1.4, 0.6),
    ("MD-AVE", 1.3, 0.55),
];

/// (class, price factor)
const CLASSES: [(&str, f64); 3] = [("Turista", 1.0), ("Turista Plus", 1.2), ("Preferente", 1.6)];

/// (fare, price factor)
const FARES: [(&str, f64); 4] = [
    ("Promo", 0.8),
    ("Promo +", 0.95),
    ("Flexible", 1.3),
    ("Adulto ida", 1.1),
];

const MISSING_PRICE_RATE: f64 = 0.03;
const EUROS_PER_HOUR: f64 = 18.0;

#[derive(Debug, Serialize)]
struct SampleTicket {
    insert_date: String,
    start_date: String,
    end_date: String,
    price: Option<f64>,
    train_class: String,
    fare: String,
    origin: String,
    destination: String,
    train_type: String,
}

fn timestamp(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn generate(rows: usize, seed: u64) -> Result<Vec<SampleTicket>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let price_noise = Normal::new(0.0, 4.0).context("price noise distribution")?;
    let base = NaiveDate::from_ymd_opt(2019, 4, 11)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .context("base date")?;

    let mut tickets = Vec::with_capacity(rows);
    for _ in 0..rows {
        let &(origin, destination, hours) = ROUTES.choose(&mut rng).context("routes")?;
        let &(train_type, slow, cheap) = TRAIN_TYPES.choose(&mut rng).context("train types")?;
        let &(class, class_factor) = CLASSES.choose(&mut rng).context("classes")?;
        let &(fare, fare_factor) = FARES.choose(&mut rng).context("fares")?;

        let insert_date = base + Duration::minutes(rng.gen_range(0..7 * 24 * 60));
        let start_date = insert_date
            + Duration::days(rng.gen_range(7..60))
            + Duration::minutes(rng.gen_range(0..24 * 60 / 5) * 5);
        let minutes = (hours * slow * 60.0) as i64 + rng.gen_range(-10..=10);
        let end_date = start_date + Duration::minutes(minutes);

        let price = if rng.gen_bool(MISSING_PRICE_RATE) {
            None
        } else {
            let mean = EUROS_PER_HOUR * hours * cheap * class_factor * fare_factor;
            let noisy = (mean + rng.sample(price_noise)).max(5.0);
            Some((noisy * 100.0).round() / 100.0)
        };

        tickets.push(SampleTicket {
            insert_date: timestamp(insert_date),
            start_date: timestamp(start_date),
            end_date: timestamp(end_date),
            price,
            train_class: class.to_string(),
            fare: fare.to_string(),
            origin: origin.to_string(),
            destination: destination.to_string(),
            train_type: train_type.to_string(),
        });
    }
    Ok(tickets)
}

fn write_csv(path: &Path, tickets: &[SampleTicket]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    for t in tickets {
        writer.serialize(t).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_parquet(path: &Path, tickets: &[SampleTicket]) -> Result<()> {
    let text = |f: fn(&SampleTicket) -> &str| -> ArrayRef {
        Arc::new(StringArray::from(tickets.iter().map(f).collect::<Vec<_>>()))
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new("insert_date", DataType::Utf8, false),
        Field::new("start_date", DataType::Utf8, false),
        Field::new("end_date", DataType::Utf8, false),
        Field::new("price", DataType::Float64, true),
        Field::new("train_class", DataType::Utf8, false),
        Field::new("fare", DataType::Utf8, false),
        Field::new("origin", DataType::Utf8, false),
        Field::new("destination", DataType::Utf8, false),
        Field::new("train_type", DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            text(|t| t.insert_date.as_str()),
            text(|t| t.start_date.as_str()),
            text(|t| t.end_date.as_str()),
            Arc::new(Float64Array::from(
                tickets.iter().map(|t| t.price).collect::<Vec<_>>(),
            )),
            text(|t| t.train_class.as_str()),
            text(|t| t.fare.as_str()),
            text(|t| t.origin.as_str()),
            text(|t| t.destination.as_str()),
            text(|t| t.train_type.as_str()),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let tickets = generate(args.rows, args.seed)?;
    let is_parquet = args
        .output
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("parquet"));

    log::info!(
        "writing {} tickets as {}",
        tickets.len(),
        if is_parquet { "parquet" } else { "csv" }
    );
    if is_parquet {
        write_parquet(&args.output, &tickets)?;
    } else {
        write_csv(&args.output, &tickets)?;
    }

    let missing = tickets.iter().filter(|t| t.price.is_none()).count();
    println!(
        "Wrote {} tickets ({missing} without price) to {}",
        tickets.len(),
        args.output.display()
    );
    Ok(())
}

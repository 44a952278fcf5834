//! CLI argument parsing for tabstat

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "tabstat")]
#[command(version)]
#[command(about = "Naive Bayes match prediction and train fare statistics", long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Predict whether a match is played from the weather
    Bayes(BayesArgs),
    /// Descriptive statistics report over train ticket prices
    Fares(FaresArgs),
}

#[derive(Args, Debug)]
pub struct BayesArgs {
    /// Outlook of the day (Sunny, Overcast, Rain)
    #[arg(long, default_value = "Rain")]
    pub outlook: String,

    /// Humidity (High, Normal)
    #[arg(long, default_value = "High")]
    pub humidity: String,

    /// Wind (Weak, Strong)
    #[arg(long, default_value = "Strong")]
    pub wind: String,

    /// Laplace smoothing pseudo-count (0 disables smoothing)
    #[arg(long, value_name = "ALPHA", default_value_t = 0.0)]
    pub alpha: f64,

    /// Output format (text or json)
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct FaresArgs {
    /// Ticket dataset (.csv, .json or .parquet)
    #[arg(short, long, value_name = "PATH", default_value = "renfe_small.csv")]
    pub input: PathBuf,

    /// TOML file with report settings
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Confidence level of the mean price interval (overrides the config file)
    #[arg(long, value_name = "LEVEL")]
    pub confidence: Option<f64>,

    /// Number of busiest routes to list (overrides the config file)
    #[arg(long, value_name = "N")]
    pub top: Option<usize>,

    /// Output format (text or json)
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bayes_defaults() {
        let cli = Cli::try_parse_from(["tabstat", "bayes"]).unwrap();
        let Command::Bayes(args) = cli.command else {
            panic!("expected bayes");
        };
        assert_eq!(args.outlook, "Rain");
        assert_eq!(args.humidity, "High");
        assert_eq!(args.wind, "Strong");
        assert_eq!(args.alpha, 0.0);
        assert_eq!(args.format, OutputFormat::Text);
    }

    #[test]
    fn test_fares_overrides_and_verbosity() {
        let cli = Cli::try_parse_from([
            "tabstat", "fares", "-vv", "--input", "t.parquet", "--confidence", "0.9", "--top", "3",
            "--format", "json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Command::Fares(args) = cli.command else {
            panic!("expected fares");
        };
        assert_eq!(args.input, PathBuf::from("t.parquet"));
        assert_eq!(args.confidence, Some(0.9));
        assert_eq!(args.top, Some(3));
        assert_eq!(args.config, None);
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn test_subcommand_is_required() {
        assert!(Cli::try_parse_from(["tabstat"]).is_err());
    }
}

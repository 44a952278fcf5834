use anyhow::Result;
use clap::Parser;
use tabstat::{app, cli::Cli};

/// Map `-v` occurrences to a default log filter; RUST_LOG still wins.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    app::run(&cli, &mut out)
}

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::process::ExitCode;

use clap::Parser;
use stockbook::config::Cli;
use stockbook::{Menu, StockManager};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(cli.env_filter())
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let input: Box<dyn BufRead> = match &cli.input {
        Some(path) => match File::open(path) {
            Ok(file) => Box::new(BufReader::new(file)),
            Err(e) => {
                tracing::error!(path = %path.display(), "failed to open input: {e}");
                eprintln!("stockbook: can't open {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => Box::new(io::stdin().lock()),
    };

    let mut menu = Menu::new(StockManager::new(), input, io::stdout().lock()).prompts(!cli.quiet);
    match menu.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("menu aborted: {e}");
            ExitCode::FAILURE
        }
    }
}

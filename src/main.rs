//! Command line interface: prints installed browser versions.

use std::process::ExitCode;

use clap::{ArgGroup, Parser};
use tracing_subscriber::EnvFilter;

use driloader::command::SystemCommandRunner;
use driloader::detect;
use driloader::error::Error;

#[derive(Parser)]
#[command(
    name = "driloader",
    version,
    about = "Detects installed browser versions and fetches matching WebDriver binaries."
)]
#[command(group(ArgGroup::new("action").required(true).multiple(false)))]
struct Cli {
    /// get Google Chrome version.
    #[arg(short = 'c', long, group = "action")]
    chrome: bool,

    /// get Firefox version.
    #[arg(short = 'f', long, group = "action")]
    firefox: bool,

    /// get Internet Explorer version.
    #[arg(short = 'i', long, group = "action")]
    internet_explorer: bool,

    /// look for browsers and get their versions.
    #[arg(long, group = "action")]
    all: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let runner = SystemCommandRunner;

    let result = if cli.chrome {
        detect::chrome_version(&runner)
            .map(|v| v.to_string())
            .map_err(|e| ("Unable to get the Google Chrome version", e))
    } else if cli.firefox {
        detect::firefox_version(&runner)
            .map(|v| v.to_string())
            .map_err(|e| ("Unable to get the Firefox version", e))
    } else if cli.internet_explorer {
        detect::ie_version(&runner)
            .map(|v| v.to_string())
            .map_err(|e| ("Unable to get the Internet Explorer version", e))
    } else {
        // Per-browser failures are already rendered inline in the report.
        Ok(detect::detect_all(&runner))
    };

    match result {
        Ok(message) => {
            println!("{message}");
            ExitCode::SUCCESS
        }
        Err((message, error)) => {
            eprintln!("Error: {message}.\nCause: {}", render_cause(&error));
            ExitCode::FAILURE
        }
    }
}

fn render_cause(error: &Error) -> String {
    match std::error::Error::source(error) {
        Some(cause) => format!("{error}: {cause}"),
        None => error.to_string(),
    }
}

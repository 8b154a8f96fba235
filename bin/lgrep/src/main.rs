//! lgrep: grep for log indices.
//!
//! Exits with 1 on configuration problems, 2 when the search itself fails.

mod cli;
mod config;
mod output;

use std::io;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use config::{ConfigError, FileConfig, Settings};
use lgrep_elastic::ElasticTransport;
use lgrep_format::{FormatError, Formatter};
use lgrep_search::Client;
use output::Printer;
use tracing::{debug, warn};

const EXIT_CONFIG: u8 = 1;
const EXIT_SEARCH: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
	let cli = Cli::parse();

	let subscriber = tracing_subscriber::fmt()
		.with_writer(io::stderr)
		.with_target(false)
		.with_max_level(if cli.verbose || cli.debug {
			tracing::Level::DEBUG
		} else {
			tracing::Level::WARN
		})
		.finish();
	if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
		eprintln!("lgrep: failed to install logger: {err}");
	}

	match run(cli).await {
		Ok(0) => {
			warn!("no results found");
			ExitCode::SUCCESS
		}
		Ok(printed) => {
			debug!(printed, "search finished");
			ExitCode::SUCCESS
		}
		Err(err) => {
			eprintln!("lgrep: {err:#}");
			ExitCode::from(exit_code(&err))
		}
	}
}

async fn run(cli: Cli) -> anyhow::Result<usize> {
	let file = FileConfig::load(cli.config.as_deref())?;
	let settings = Settings::resolve(cli, file)?;
	debug!(endpoint = %settings.endpoint, size = settings.spec.size(), "resolved settings");

	let formatter = Formatter::new(&settings.format)?;
	let client = Client::new(ElasticTransport::new(&settings.endpoint)?);
	let mut printer = Printer::new(formatter, settings.tabulate, io::stdout())?;

	let mut stream = client.search(&settings.query, &settings.spec).await?;
	printer.print(&mut stream).await.context("search failed")?;
	printer.finish().context("failed to write output")
}

/// Maps a failure to the process exit code.
fn exit_code(err: &anyhow::Error) -> u8 {
	let config = err.chain().any(|cause| {
		cause.is::<ConfigError>()
			|| cause.is::<FormatError>()
			|| cause
				.downcast_ref::<lgrep_search::Error>()
				.is_some_and(lgrep_search::Error::is_config)
	});
	if config { EXIT_CONFIG } else { EXIT_SEARCH }
}

//! Interactive front end for the pickup-point order manager.
//!
//! This binary wires the pieces together: configuration, the JSON file
//! store, the in-memory repository, and the lifecycle service. It then runs
//! a line-oriented command loop on stdin, one fully processed command at a
//! time.

use clap::Parser;
use pickup_config::Config;
use pickup_core::OrderService;
use pickup_repository::InMemoryRepository;
use pickup_storage::implementations::file::JsonFileStore;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{stdin, AsyncBufReadExt, BufReader};

mod commands;
mod table;

use commands::{Command, Handler};

/// Command-line arguments for the pickup-point manager.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt().with_env_filter(env_filter).with_target(true).init();

	let config = Config::load(&args.config).await?;
	tracing::info!(storage = %config.storage.path.display(), "loaded configuration");

	let service = OrderService::new(
		Arc::new(InMemoryRepository::new()),
		Arc::new(JsonFileStore::new(config.storage.path.clone())),
	);
	service.bootstrap().await?;

	let handler = Handler::new(service, config.listing.page_size);
	run_loop(handler).await
}

/// Reads commands from stdin until `exit` or end of input.
///
/// "Now" is sampled once per line and threaded through the whole command,
/// so every deadline comparison within one command is coherent.
async fn run_loop(handler: Handler) -> Result<(), Box<dyn std::error::Error>> {
	println!("Pickup-point order manager. Type help for the command list.");

	let mut lines = BufReader::new(stdin()).lines();
	prompt()?;

	while let Some(line) = lines.next_line().await? {
		let now = chrono::Utc::now();

		match Command::parse(&line, now) {
			Ok(None) => {}
			Ok(Some(Command::Exit)) => {
				println!("Bye.");
				return Ok(());
			}
			Ok(Some(Command::ClearDb)) => {
				print!("Are you sure you want to clear the database? (Y/N): ");
				std::io::stdout().flush()?;
				match lines.next_line().await? {
					Some(answer) if answer.trim().eq_ignore_ascii_case("y") => {
						if let Err(e) = handler.clear_db().await {
							report(&line, e);
						}
					}
					_ => println!("Operation cancelled."),
				}
			}
			Ok(Some(command)) => {
				if let Err(e) = handler.execute(command, now).await {
					report(&line, e);
				}
			}
			Err(e) => report(&line, e),
		}

		prompt()?;
	}

	Ok(())
}

fn prompt() -> std::io::Result<()> {
	print!("> ");
	std::io::stdout().flush()
}

fn report(line: &str, error: commands::CommandError) {
	tracing::debug!(command = line.trim(), error = %error, "command failed");
	println!("error: {error}");
}

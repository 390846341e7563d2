pub mod worker;

use std::{path::PathBuf, time::Duration};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cgr_service::SearchService;
use cgr_storage::db::Db;

#[derive(Debug, Parser)]
#[command(
	version = cgr_cli::VERSION,
	rename_all = "kebab",
	styles = cgr_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Run a single sweep and exit.
	#[arg(long)]
	pub once: bool,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = cgr_config::load(&args.config)?;
	let filter = EnvFilter::new(config.service.log_level.clone());

	tracing_subscriber::fmt().with_env_filter(filter).init();

	let db = Db::connect(&config.storage.postgres).await?;

	db.ensure_schema().await?;

	let interval = Duration::from_secs(config.cache.sweep_interval_seconds);
	let evictor = SearchService::new(config, db).evictor();

	if args.once {
		let count = worker::sweep_once(&evictor).await?;

		tracing::info!(count, "Cache sweep finished.");

		return Ok(());
	}

	worker::run_worker(evictor, interval).await;

	Ok(())
}

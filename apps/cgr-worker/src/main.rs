use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = cgr_worker::Args::parse();

	cgr_worker::run(args).await
}

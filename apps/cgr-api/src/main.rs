use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = cgr_api::Args::parse();

	cgr_api::run(args).await
}

mod tools;

use anyhow::Result;
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};

#[derive(Parser, Debug)]
#[command(
	name = "metatile-cleaner",
	author,
	version,
	about,
	long_about = None,
	arg_required_else_help = true,
)]
struct Cli {
	#[command(flatten)]
	arguments: tools::clean::Arguments,

	#[command(flatten)]
	verbose: Verbosity<InfoLevel>, // Set verbosity flag
}

fn main() -> Result<()> {
	let cli = Cli::parse();

	env_logger::Builder::new()
		.filter_level(cli.verbose.log_level_filter())
		.format_timestamp(None)
		.init();

	run(cli)
}

fn run(cli: Cli) -> Result<()> {
	tools::clean::run(&cli.arguments)
}

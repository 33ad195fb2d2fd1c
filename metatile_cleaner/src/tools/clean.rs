use anyhow::{Context, Result};
use clap::builder::NonEmptyStringValueParser;
use metatile_cleaner::{
	config::{CleanerConfig, DEFAULT_CONCURRENCY, DEFAULT_MAX_ZOOM},
	core::GeoBBox,
	pipeline::CleanupPipeline,
	queue::DEFAULT_QUEUE_SIZE,
	stats::RunStatistics,
	store::{MAX_DELETE_KEYS, get_store},
};
use std::path::PathBuf;

#[derive(clap::Args, Debug)]
pub struct Arguments {
	/// build whose metatiles are deleted
	#[arg(long, value_name = "ID", value_parser = NonEmptyStringValueParser::new(), display_order = 1)]
	build_id: String,

	/// bucket to delete from
	#[arg(long, value_name = "NAME", value_parser = NonEmptyStringValueParser::new(), display_order = 1)]
	bucket: String,

	/// number of parallel delete workers
	#[arg(long, value_name = "int", default_value_t = DEFAULT_CONCURRENCY, display_order = 2)]
	concurrency: usize,

	/// minimum zoom level
	#[arg(long, value_name = "int", default_value_t = 0, display_order = 2)]
	min_zoom: u8,

	/// maximum zoom level
	#[arg(long, value_name = "int", default_value_t = DEFAULT_MAX_ZOOM, display_order = 2)]
	max_zoom: u8,

	/// delete only tiles inside a bounding box
	#[arg(
		long,
		short,
		value_name = "lon_min,lat_min,lon_max,lat_max",
		allow_hyphen_values = true,
		display_order = 2
	)]
	bbox: Option<GeoBBox>,

	/// count rows from the south (TMS) instead of from the north
	#[arg(long, display_order = 2)]
	inverted_y: bool,

	/// keys per delete request
	#[arg(long, value_name = "int", default_value_t = MAX_DELETE_KEYS, display_order = 3)]
	batch_size: usize,

	/// capacity of the queue between tile enumeration and delete workers
	#[arg(long, value_name = "int", default_value_t = DEFAULT_QUEUE_SIZE, display_order = 3)]
	queue_size: usize,

	/// directory containing the buckets
	#[arg(long, value_name = "DIR", default_value = ".", display_order = 4)]
	root: PathBuf,

	/// only log what would be deleted
	#[arg(long, display_order = 4)]
	dry_run: bool,
}

impl Arguments {
	fn to_config(&self) -> CleanerConfig {
		CleanerConfig {
			concurrency: self.concurrency,
			min_zoom: self.min_zoom,
			max_zoom: self.max_zoom,
			bounds: self.bbox.unwrap_or_default(),
			inverted_y: self.inverted_y,
			batch_size: self.batch_size,
			queue_size: self.queue_size,
			..CleanerConfig::new(&self.build_id, &self.bucket)
		}
	}
}

#[tokio::main]
pub async fn run(arguments: &Arguments) -> Result<()> {
	let config = arguments.to_config();
	config.validate()?;

	let store = get_store(&arguments.root, arguments.dry_run)
		.with_context(|| format!("Failed to open the object store at {:?}", arguments.root))?;

	CleanupPipeline::new(config.arc(), store, RunStatistics::new_arc())
		.run()
		.await?;

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use clap::Parser;

	#[derive(Parser, Debug)]
	struct TestCli {
		#[command(flatten)]
		arguments: Arguments,
	}

	fn parse(args: &[&str]) -> Result<Arguments> {
		let mut argv = vec!["test", "--build-id", "abc123", "--bucket", "tiles"];
		argv.extend_from_slice(args);
		Ok(TestCli::try_parse_from(argv)?.arguments)
	}

	#[test]
	fn defaults() -> Result<()> {
		let config = parse(&[])?.to_config();
		assert_eq!(config.build_id, "abc123");
		assert_eq!(config.bucket, "tiles");
		assert_eq!(config.concurrency, 32);
		assert_eq!(config.min_zoom, 0);
		assert_eq!(config.max_zoom, 13);
		assert_eq!(config.bounds, GeoBBox::world());
		assert!(!config.inverted_y);
		assert_eq!(config.batch_size, 500);
		assert_eq!(config.queue_size, 10_000);
		Ok(())
	}

	#[test]
	fn all_options() -> Result<()> {
		let arguments = parse(&[
			"--concurrency",
			"4",
			"--min-zoom",
			"2",
			"--max-zoom",
			"9",
			"--bbox",
			"-10,-20,30,40",
			"--inverted-y",
			"--batch-size",
			"100",
			"--queue-size",
			"50",
			"--root",
			"/data",
			"--dry-run",
		])?;
		assert!(arguments.dry_run);
		assert_eq!(arguments.root, PathBuf::from("/data"));

		let config = arguments.to_config();
		assert_eq!(config.concurrency, 4);
		assert_eq!((config.min_zoom, config.max_zoom), (2, 9));
		assert_eq!(config.bounds.as_array(), [-10.0, -20.0, 30.0, 40.0]);
		assert!(config.inverted_y);
		assert_eq!(config.batch_size, 100);
		assert_eq!(config.queue_size, 50);
		Ok(())
	}

	#[test]
	fn invalid_bbox() {
		let err = parse(&["--bbox", "1,2,3"]).unwrap_err().to_string();
		assert!(err.contains("exactly 4 numbers"), "{err}");
	}

	#[test]
	fn zero_concurrency_is_rejected_before_opening_a_store() {
		let arguments = parse(&["--concurrency", "0", "--root", "/does/not/exist"]).unwrap();
		let err = run(&arguments).unwrap_err().to_string();
		assert!(err.contains("concurrency"), "{err}");
	}
}

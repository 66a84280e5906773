use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use configseek::loaders::NodeRuntime;
use configseek::{ConfigResult, Finder, Options, SyncFinder};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "configseek")]
#[command(
	author,
	version,
	about = "Find and load a project's configuration file"
)]
#[command(arg_required_else_help = true)]
struct Cli {
	/// Project name, used to derive default search places and the package.json property
	name: String,

	#[command(subcommand)]
	command: Commands,

	/// Highest directory to search (defaults to the home directory)
	#[arg(long, value_name = "DIR", global = true)]
	stop_dir: Option<PathBuf>,

	/// Search place to check in each directory, in priority order (repeatable)
	#[arg(long = "search-place", value_name = "PLACE", global = true)]
	search_places: Vec<String>,

	/// Key or dotted path of the config inside package.json
	#[arg(long, value_name = "PROP", global = true)]
	package_prop: Option<String>,

	/// One key of an explicit package.json property path, taken literally (repeatable)
	#[arg(
		long = "package-prop-segment",
		value_name = "KEY",
		global = true,
		conflicts_with = "package_prop"
	)]
	package_prop_segments: Vec<String>,

	/// Report empty config files instead of skipping them
	#[arg(long, global = true)]
	keep_empty: bool,

	/// Use the async finder, which can also load .mjs files
	#[arg(long = "async", global = true)]
	suspending: bool,

	/// Executable used to evaluate JavaScript config modules
	#[arg(long, value_name = "PROGRAM", global = true)]
	node: Option<PathBuf>,

	/// Log search progress to stderr
	#[arg(short, long, global = true)]
	verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
	/// Search upward from a directory for the first matching config file
	Search {
		/// Directory to start from (defaults to the current directory)
		dir: Option<PathBuf>,
	},
	/// Load a specific config file
	Load {
		/// Path of the config file
		file: PathBuf,
	},
}

fn main() -> ExitCode {
	match run() {
		Ok(code) => code,
		Err(e) => {
			eprintln!("error: {e:?}");
			ExitCode::FAILURE
		}
	}
}

fn run() -> Result<ExitCode> {
	let cli = Cli::parse();
	init_tracing(cli.verbose);

	let options = build_options(&cli);
	let result = if cli.suspending {
		run_suspending(&cli, options)?
	} else {
		run_blocking(&cli, options)?
	};

	print_result(result.as_ref())?;
	Ok(ExitCode::SUCCESS)
}

fn init_tracing(verbose: bool) {
	let filter = if verbose {
		EnvFilter::new("configseek=debug")
	} else {
		EnvFilter::try_from_env("CONFIGSEEK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
	};
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.init();
}

fn build_options(cli: &Cli) -> Options {
	let mut options = Options::new().with_ignore_empty_search_places(!cli.keep_empty);
	if let Some(ref dir) = cli.stop_dir {
		options = options.with_stop_dir(dir);
	}
	if !cli.search_places.is_empty() {
		options = options.with_search_places(cli.search_places.iter().cloned());
	}
	if let Some(ref prop) = cli.package_prop {
		options = options.with_package_prop(prop.as_str());
	} else if !cli.package_prop_segments.is_empty() {
		options = options.with_package_prop(cli.package_prop_segments.clone());
	}
	if let Some(ref program) = cli.node {
		options = options.with_module_runtime(Arc::new(NodeRuntime::new(program)));
	}
	options
}

fn run_blocking(cli: &Cli, options: Options) -> Result<Option<ConfigResult>> {
	let finder = SyncFinder::new(&cli.name, options).context("Invalid finder options")?;
	match &cli.command {
		Commands::Search { dir } => finder
			.search(dir.as_deref())
			.context("Failed to search for configuration"),
		Commands::Load { file } => finder
			.load(file)
			.with_context(|| format!("Failed to load {}", file.display())),
	}
}

fn run_suspending(cli: &Cli, options: Options) -> Result<Option<ConfigResult>> {
	let runtime = tokio::runtime::Builder::new_current_thread()
		.enable_all()
		.build()
		.context("Failed to start async runtime")?;
	let finder = Finder::new(&cli.name, options).context("Invalid finder options")?;

	runtime.block_on(async {
		match &cli.command {
			Commands::Search { dir } => finder
				.search(dir.as_deref())
				.await
				.context("Failed to search for configuration"),
			Commands::Load { file } => finder
				.load(file)
				.await
				.with_context(|| format!("Failed to load {}", file.display())),
		}
	})
}

fn print_result(result: Option<&ConfigResult>) -> Result<()> {
	match result {
		Some(found) => {
			let json = serde_json::to_string_pretty(found).context("Failed to serialize result")?;
			println!("{json}");
		}
		None => println!("No configuration found."),
	}
	Ok(())
}

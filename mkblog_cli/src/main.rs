use std::path::Path;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use mkblog_cli::Commands;
use mkblog_cli::MkblogCli;
use mkblog_cli::OutputFormat;
use mkblog_core::AnyEmptyResult;
use mkblog_core::AnyResult;
use mkblog_core::Collection;
use mkblog_core::Document;
use mkblog_core::MkblogConfig;
use mkblog_core::MkblogError;
use mkblog_core::schema::Shape;
use mkblog_toc::TocPlugin;
use mkblog_toc::WithToc;
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,dimmed) => {
		if color_enabled() {
			format!("{}", $text.dimmed())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = MkblogCli::parse();

	let use_color = !args.no_color
		&& std::env::var_os("NO_COLOR").is_none()
		&& supports_color::on(supports_color::Stream::Stdout).is_some();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	init_tracing(args.verbose);

	let result = match &args.command {
		Some(Commands::List { format }) => run_list(&args, *format),
		Some(Commands::Html { slug }) => run_html(&args, slug),
		Some(Commands::Toc { slug }) => run_toc(&args, slug),
		Some(Commands::Metadata { slug }) => run_metadata(&args, slug),
		Some(Commands::Check) => run_check(&args),
		None => {
			eprintln!("No subcommand specified. Run `mkblog --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		match e.downcast::<MkblogError>() {
			Ok(mkblog_err) => {
				let report: miette::Report = (*mkblog_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Logs go to stderr so command output stays parseable. `RUST_LOG` wins over
/// `--verbose`.
fn init_tracing(verbose: bool) {
	let default_level = if verbose { "debug" } else { "warn" };
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.without_time()
		.init();
}

fn resolve_root(args: &MkblogCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn load_collection(root: &Path) -> AnyResult<Collection<Shape>> {
	let Some(config) = MkblogConfig::load(root)? else {
		return Err(format!(
			"no mkblog.toml found in `{}`. Create one with an `include` pattern.",
			root.display()
		)
		.into());
	};

	tracing::debug!(root = %root.display(), toc = config.toc, "loading collection");
	let mut collection = config.collection(root)?;
	if config.toc {
		collection = collection.plugin(&TocPlugin);
	}

	Ok(collection.build()?)
}

fn find_document<'a>(
	collection: &'a Collection<Shape>,
	slug: &str,
) -> AnyResult<&'a Document<Shape>> {
	collection.find(slug).ok_or_else(|| {
		format!("no document with slug `{slug}`. Run `mkblog list` to see every slug.").into()
	})
}

fn run_list(args: &MkblogCli, format: OutputFormat) -> AnyEmptyResult {
	let root = resolve_root(args);
	let collection = load_collection(&root)?;

	match format {
		OutputFormat::Json => {
			let entries: Vec<serde_json::Value> = collection
				.iter()
				.map(|document| {
					serde_json::json!({
						"slug": document.slug(),
						"identifier": document.identifier(),
						"filepath": document.filepath().display().to_string(),
					})
				})
				.collect();
			println!("{}", serde_json::to_string_pretty(&entries)?);
		}
		OutputFormat::Text => {
			if collection.is_empty() {
				println!("No documents matched the include patterns.");
				return Ok(());
			}

			for document in &collection {
				println!(
					"{}  {}",
					document.slug(),
					colored!(document.identifier(), dimmed)
				);
			}
			println!("\n{} document(s)", collection.len());
		}
	}

	Ok(())
}

fn run_html(args: &MkblogCli, slug: &str) -> AnyEmptyResult {
	let root = resolve_root(args);
	let collection = load_collection(&root)?;
	let document = find_document(&collection, slug)?;

	println!("{}", document.html(None)?);
	Ok(())
}

fn run_toc(args: &MkblogCli, slug: &str) -> AnyEmptyResult {
	let root = resolve_root(args);
	let collection = load_collection(&root)?;
	let document = find_document(&collection, slug)?;

	println!("{}", document.with_toc().toc()?);
	Ok(())
}

fn run_metadata(args: &MkblogCli, slug: &str) -> AnyEmptyResult {
	let root = resolve_root(args);
	let collection = load_collection(&root)?;
	let document = find_document(&collection, slug)?;

	let metadata = document.metadata(None)?;
	println!("{}", serde_json::to_string_pretty(&metadata)?);
	Ok(())
}

fn run_check(args: &MkblogCli) -> AnyEmptyResult {
	let root = resolve_root(args);
	let collection = load_collection(&root)?;
	let mut failed = 0usize;

	for document in &collection {
		let Err(error) = document.metadata(None) else {
			continue;
		};

		failed += 1;
		eprintln!(
			"{} {} ({})",
			colored!("✗", red),
			document.identifier(),
			document.slug()
		);
		match error {
			MkblogError::MetadataInvalid(errors) => {
				for field in errors.into_inner() {
					eprintln!("    {field}");
				}
			}
			other => eprintln!("    {other}"),
		}
	}

	if failed > 0 {
		eprintln!(
			"\n{} {failed} of {} document(s) failed metadata validation.",
			colored!("Check failed:", red),
			collection.len()
		);
		process::exit(1);
	}

	println!(
		"{} {} document(s) have valid metadata.",
		colored!("Check passed:", green),
		collection.len()
	);
	Ok(())
}

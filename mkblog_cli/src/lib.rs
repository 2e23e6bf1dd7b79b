use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Inspect and render a markdown content collection.",
	long_about = "mkblog loads the markdown documents matched by the `mkblog.toml` config of a \
	              project, validates their frontmatter against the configured schema and renders \
	              them to HTML.\n\nQuick start:\n  mkblog list           List every document \
	              slug\n  mkblog html <slug>    Render a document\n  mkblog check          \
	              Validate all frontmatter"
)]
pub struct MkblogCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output. `RUST_LOG` takes precedence when set.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// List every document of the collection with its slug.
	List {
		/// Output format. Use `text` for one document per line or `json` for
		/// programmatic consumption.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// Render the document with the given slug to HTML.
	Html {
		/// Slug of the document.
		slug: String,
	},
	/// Render the table of contents of the document with the given slug.
	///
	/// Heading links only resolve when `toc = true` is set in `mkblog.toml`,
	/// which installs the heading anchor extension.
	Toc {
		/// Slug of the document.
		slug: String,
	},
	/// Print the validated frontmatter of a document as JSON.
	Metadata {
		/// Slug of the document.
		slug: String,
	},
	/// Validate the frontmatter of every document.
	///
	/// Reports every failing document and every failing field. Exits with a
	/// non-zero status code when any document fails, which makes it suitable
	/// for CI pipelines.
	Check,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output.
	Text,
	/// JSON output for programmatic consumption.
	Json,
}

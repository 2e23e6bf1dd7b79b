use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::MkblogError;
use crate::MkblogResult;
use crate::collection::CollectionConfig;
use crate::extension::Gfm;
use crate::schema::Field;
use crate::schema::Shape;
use crate::slug::SlugStrategy;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = ["mkblog.toml", ".mkblog.toml", ".config/mkblog.toml"];

/// A collection defined in a config file.
///
/// ```toml
/// include = ["posts/**/*.md", "!posts/drafts/**"]
/// slug = "mix"
/// gfm = true
///
/// [schema]
/// title = "string"
/// tags = "string[]?"
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MkblogConfig {
	pub include: Include,
	/// Gitignore-style patterns for files to skip.
	#[serde(default)]
	pub exclude: Vec<String>,
	/// Name of a built-in slug strategy.
	#[serde(default = "default_slug")]
	pub slug: String,
	/// Enable GitHub flavoured markdown syntax.
	#[serde(default)]
	pub gfm: bool,
	#[serde(default)]
	pub allow_dangerous_html: bool,
	/// Install the table of contents plugin. Read by front ends that depend
	/// on it, the core crate only carries the flag.
	#[serde(default)]
	pub toc: bool,
	#[serde(default)]
	pub respect_gitignore: bool,
	/// Metadata fields mapped to type specs such as `string`, `integer[]` or
	/// `boolean?`.
	#[serde(default)]
	pub schema: BTreeMap<String, String>,
}

/// One include pattern or several.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Include {
	One(String),
	Many(Vec<String>),
}

impl Include {
	pub fn patterns(&self) -> Vec<String> {
		match self {
			Self::One(pattern) => vec![pattern.clone()],
			Self::Many(patterns) => patterns.clone(),
		}
	}
}

fn default_slug() -> String {
	"removeExtension".to_string()
}

impl MkblogConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if there is none.
	pub fn load(root: &Path) -> MkblogResult<Option<MkblogConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		tracing::debug!(path = %config_path.display(), "loading config");
		let content = std::fs::read_to_string(&config_path)?;
		content.parse().map(Some)
	}

	/// The metadata shape declared in `[schema]`.
	pub fn shape(&self) -> MkblogResult<Shape> {
		let mut shape = Shape::new();
		for (name, spec) in &self.schema {
			shape = shape.with(name, spec.parse::<Field>()?);
		}

		Ok(shape)
	}

	/// A collection rooted at `root` configured from this file.
	pub fn collection(&self, root: impl Into<PathBuf>) -> MkblogResult<CollectionConfig<Shape>> {
		let slug: SlugStrategy = self.slug.parse()?;
		let mut config = CollectionConfig::new(self.include.patterns(), self.shape()?)
			.root(root)
			.slug(slug)
			.respect_gitignore(self.respect_gitignore)
			.allow_dangerous_html(self.allow_dangerous_html);

		for pattern in &self.exclude {
			config = config.exclude(pattern.clone());
		}

		if self.gfm {
			config = config.mdast_extension(Gfm);
		}

		Ok(config)
	}
}

impl std::str::FromStr for MkblogConfig {
	type Err = MkblogError;

	fn from_str(content: &str) -> Result<Self, Self::Err> {
		toml::from_str(content).map_err(|e| MkblogError::ConfigParse(e.to_string()))
	}
}

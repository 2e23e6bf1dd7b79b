use std::collections::BTreeMap;
use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use globset::GlobBuilder;
use globset::GlobMatcher;
use ignore::gitignore::Gitignore;
use ignore::gitignore::GitignoreBuilder;

use crate::MkblogError;
use crate::MkblogResult;
use crate::document::Document;
use crate::extension::HastExtension;
use crate::extension::MdastExtension;
use crate::extension::Plugin;
use crate::lower::LowerOptions;
use crate::pipeline::Pipeline;
use crate::slug::SlugStrategy;

/// Everything needed to define a collection. Nothing touches the file
/// system until [`CollectionConfig::build`].
pub struct CollectionConfig<S> {
	root: PathBuf,
	include: Vec<String>,
	exclude: Vec<String>,
	respect_gitignore: bool,
	slug: SlugStrategy,
	schema: S,
	pipeline: Pipeline,
	plugins: HashSet<String>,
}

impl<S> CollectionConfig<S> {
	/// A collection of the files matching `include` under the current
	/// directory. Patterns starting with `!` exclude the files they match.
	pub fn new<I>(include: I, schema: S) -> Self
	where
		I: IntoIterator,
		I::Item: Into<String>,
	{
		Self {
			root: PathBuf::from("."),
			include: include.into_iter().map(Into::into).collect(),
			exclude: Vec::new(),
			respect_gitignore: false,
			slug: SlugStrategy::default(),
			schema,
			pipeline: Pipeline::new(),
			plugins: HashSet::new(),
		}
	}

	/// The directory the include patterns are resolved against.
	#[must_use]
	pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
		self.root = root.into();
		self
	}

	#[must_use]
	pub fn include(mut self, pattern: impl Into<String>) -> Self {
		self.include.push(pattern.into());
		self
	}

	/// Exclude files with a gitignore-style pattern.
	#[must_use]
	pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
		self.exclude.push(pattern.into());
		self
	}

	/// Skip files ignored by the root `.gitignore`.
	#[must_use]
	pub fn respect_gitignore(mut self, respect: bool) -> Self {
		self.respect_gitignore = respect;
		self
	}

	#[must_use]
	pub fn slug(mut self, strategy: SlugStrategy) -> Self {
		self.slug = strategy;
		self
	}

	/// Append an extension to the source stage.
	#[must_use]
	pub fn mdast_extension(mut self, extension: impl MdastExtension + 'static) -> Self {
		self.pipeline.mdast.push(Arc::new(extension));
		self
	}

	/// Append an extension to the presentation stage.
	#[must_use]
	pub fn hast_extension(mut self, extension: impl HastExtension + 'static) -> Self {
		self.pipeline.hast.push(Arc::new(extension));
		self
	}

	/// Append an extension that runs just before serialization.
	#[must_use]
	pub fn html_extension(mut self, extension: impl HastExtension + 'static) -> Self {
		self.pipeline.html.push(Arc::new(extension));
		self
	}

	/// Install every extension of `plugin`. A plugin whose name is already
	/// installed is skipped.
	#[must_use]
	pub fn plugin(mut self, plugin: &dyn Plugin) -> Self {
		if !self.plugins.insert(plugin.name().to_string()) {
			tracing::debug!(plugin = plugin.name(), "plugin already installed");
			return self;
		}

		self.pipeline.mdast.extend(plugin.mdast_extensions());
		self.pipeline.hast.extend(plugin.hast_extensions());
		self.pipeline.html.extend(plugin.html_extensions());
		self
	}

	pub fn has_plugin(&self, name: &str) -> bool {
		self.plugins.contains(name)
	}

	#[must_use]
	pub fn lower_options(mut self, options: LowerOptions) -> Self {
		self.pipeline.lower_options = options;
		self
	}

	/// Keep raw HTML from the source in the rendered output.
	#[must_use]
	pub fn allow_dangerous_html(mut self, allow: bool) -> Self {
		self.pipeline.lower_options.allow_dangerous_html = allow;
		self
	}

	/// Resolve the matching files and create one document per file. No file
	/// is read.
	pub fn build(self) -> MkblogResult<Collection<S>> {
		let identifiers = collect_identifiers(
			&self.root,
			&self.include,
			&self.exclude,
			self.respect_gitignore,
		)?;

		tracing::debug!(
			root = %self.root.display(),
			patterns = self.include.len(),
			files = identifiers.len(),
			"collection resolved"
		);

		let pipeline = Arc::new(self.pipeline);
		let schema = Arc::new(self.schema);
		let documents = identifiers
			.into_iter()
			.map(|(identifier, relative)| {
				let slug = self.slug.apply(&identifier);
				Document::new(
					self.root.join(relative),
					identifier,
					slug,
					Arc::clone(&pipeline),
					Arc::clone(&schema),
				)
			})
			.collect();

		Ok(Collection { documents })
	}
}

/// The documents of a collection, in identifier order.
#[derive(Debug)]
pub struct Collection<S> {
	documents: Vec<Document<S>>,
}

impl<S> Collection<S> {
	pub fn documents(&self) -> &[Document<S>] {
		&self.documents
	}

	pub fn iter(&self) -> std::slice::Iter<'_, Document<S>> {
		self.documents.iter()
	}

	pub fn len(&self) -> usize {
		self.documents.len()
	}

	pub fn is_empty(&self) -> bool {
		self.documents.is_empty()
	}

	/// The first document with `slug`. Slugs are not checked for uniqueness,
	/// so later documents with the same slug are unreachable here.
	pub fn find(&self, slug: &str) -> Option<&Document<S>> {
		self.documents.iter().find(|document| document.slug() == slug)
	}

	pub fn into_documents(self) -> Vec<Document<S>> {
		self.documents
	}
}

impl<S> IntoIterator for Collection<S> {
	type IntoIter = std::vec::IntoIter<Document<S>>;
	type Item = Document<S>;

	fn into_iter(self) -> Self::IntoIter {
		self.documents.into_iter()
	}
}

impl<'a, S> IntoIterator for &'a Collection<S> {
	type IntoIter = std::slice::Iter<'a, Document<S>>;
	type Item = &'a Document<S>;

	fn into_iter(self) -> Self::IntoIter {
		self.documents.iter()
	}
}

/// A compiled include pattern. The `./` prefix is not part of the glob but is
/// kept on the identifiers it matches.
struct IncludePattern {
	prefix: &'static str,
	matcher: GlobMatcher,
}

/// Resolve the include patterns to `(identifier, path relative to root)`
/// pairs, sorted by identifier.
fn collect_identifiers(
	root: &Path,
	include: &[String],
	exclude: &[String],
	respect_gitignore: bool,
) -> MkblogResult<Vec<(String, String)>> {
	let mut patterns = Vec::new();
	let mut negated = exclude.to_vec();

	for pattern in include {
		if let Some(negation) = pattern.strip_prefix('!') {
			negated.push(negation.trim_start_matches("./").to_string());
			continue;
		}

		let (prefix, glob) = match pattern.strip_prefix("./") {
			Some(rest) => ("./", rest),
			None => ("", pattern.as_str()),
		};
		let matcher = GlobBuilder::new(glob)
			.literal_separator(true)
			.build()
			.map_err(|e| {
				MkblogError::InvalidPattern {
					pattern: pattern.clone(),
					reason: e.kind().to_string(),
				}
			})?
			.compile_matcher();
		patterns.push(IncludePattern { prefix, matcher });
	}

	let gitignore = if respect_gitignore {
		build_gitignore(root)
	} else {
		Gitignore::empty()
	};
	let exclude_matcher = build_exclude_matcher(root, &negated)?;

	let mut files = Vec::new();
	let mut visited_dirs = HashSet::new();
	walk_dir(
		root,
		&mut files,
		&gitignore,
		&exclude_matcher,
		&mut visited_dirs,
	)?;

	let mut identifiers = BTreeMap::new();
	for path in files {
		let Some(relative) = relative_identifier(root, &path) else {
			continue;
		};

		if let Some(pattern) = patterns.iter().find(|p| p.matcher.is_match(&relative)) {
			identifiers
				.entry(format!("{}{relative}", pattern.prefix))
				.or_insert(relative);
		}
	}

	Ok(identifiers.into_iter().collect())
}

/// The path of `path` below `root` with `/` separators.
fn relative_identifier(root: &Path, path: &Path) -> Option<String> {
	let relative = path.strip_prefix(root).ok()?;
	let parts: Option<Vec<&str>> = relative
		.components()
		.map(|component| component.as_os_str().to_str())
		.collect();

	Some(parts?.join("/"))
}

/// Build a `Gitignore` matcher from exclude patterns. These follow
/// `.gitignore` syntax and are applied on top of any `.gitignore` rules.
fn build_exclude_matcher(root: &Path, patterns: &[String]) -> MkblogResult<Gitignore> {
	let mut builder = GitignoreBuilder::new(root);
	for pattern in patterns {
		builder.add_line(None, pattern).map_err(|e| {
			MkblogError::InvalidPattern {
				pattern: pattern.clone(),
				reason: e.to_string(),
			}
		})?;
	}

	builder.build().map_err(|e| {
		MkblogError::InvalidPattern {
			pattern: patterns.join(", "),
			reason: e.to_string(),
		}
	})
}

/// Build a `Gitignore` matcher from the root `.gitignore` file, if any.
fn build_gitignore(root: &Path) -> Gitignore {
	let (gitignore, error) = Gitignore::new(root.join(".gitignore"));
	if let Some(error) = error {
		tracing::debug!(%error, "ignoring unreadable .gitignore rules");
	}
	gitignore
}

fn is_ignored_directory_name(name: &str) -> bool {
	name.starts_with('.') || name == "node_modules" || name == "target"
}

fn walk_dir(
	dir: &Path,
	files: &mut Vec<PathBuf>,
	gitignore: &Gitignore,
	exclude: &Gitignore,
	visited_dirs: &mut HashSet<PathBuf>,
) -> MkblogResult<()> {
	if !dir.is_dir() {
		return Ok(());
	}

	// Symlinked directories may loop back on themselves.
	let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
	if !visited_dirs.insert(canonical) {
		return Ok(());
	}

	for entry in std::fs::read_dir(dir)? {
		let path = entry?.path();

		if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
			if is_ignored_directory_name(name) {
				continue;
			}
		}

		let is_dir = path.is_dir();
		if gitignore.matched(&path, is_dir).is_ignore() || exclude.matched(&path, is_dir).is_ignore() {
			continue;
		}

		if is_dir {
			walk_dir(&path, files, gitignore, exclude, visited_dirs)?;
		} else {
			files.push(path);
		}
	}

	Ok(())
}

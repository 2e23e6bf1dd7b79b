use std::fmt;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use markdown::mdast;

use crate::MkblogError;
use crate::MkblogResult;
use crate::hast::Root;
use crate::metadata::extract_metadata;
use crate::parser::normalize_line_endings;
use crate::pipeline::Pipeline;
use crate::schema::Schema;

/// One file of a collection.
///
/// Every operation re-reads and re-derives its result. Pass an artifact you
/// already hold (`ast`, `tree`) to skip the upstream stages.
pub struct Document<S> {
	filepath: PathBuf,
	identifier: String,
	slug: String,
	pipeline: Arc<Pipeline>,
	schema: Arc<S>,
}

impl<S> Document<S> {
	pub fn new(
		filepath: impl Into<PathBuf>,
		identifier: impl Into<String>,
		slug: impl Into<String>,
		pipeline: Arc<Pipeline>,
		schema: Arc<S>,
	) -> Self {
		Self {
			filepath: filepath.into(),
			identifier: identifier.into(),
			slug: slug.into(),
			pipeline,
			schema,
		}
	}

	/// Path of the file on disk.
	pub fn filepath(&self) -> &Path {
		&self.filepath
	}

	/// The file identifier matched by the include patterns, relative to the
	/// collection root. Slugs are computed from this value.
	pub fn identifier(&self) -> &str {
		&self.identifier
	}

	pub fn slug(&self) -> &str {
		&self.slug
	}

	pub fn pipeline(&self) -> &Pipeline {
		&self.pipeline
	}

	pub fn schema(&self) -> &S {
		&self.schema
	}

	/// The raw text of the file with line endings normalized.
	pub fn source(&self) -> MkblogResult<String> {
		let content = std::fs::read_to_string(&self.filepath).map_err(|source| {
			MkblogError::SourceNotFound {
				path: self.filepath.clone(),
				source,
			}
		})?;

		Ok(normalize_line_endings(&content))
	}

	#[tracing::instrument(level = "trace", skip(self), fields(slug = %self.slug))]
	pub fn ast(&self) -> MkblogResult<mdast::Node> {
		self.pipeline.parse(&self.source()?)
	}

	/// The presentation tree, lowering `ast` when given.
	#[tracing::instrument(level = "trace", skip_all, fields(slug = %self.slug))]
	pub fn presentation_tree(&self, ast: Option<&mdast::Node>) -> MkblogResult<Root> {
		match ast {
			Some(ast) => self.pipeline.lower(ast),
			None => self.pipeline.lower(&self.ast()?),
		}
	}

	/// The rendered HTML, serializing `tree` when given.
	#[tracing::instrument(level = "trace", skip_all, fields(slug = %self.slug))]
	pub fn html(&self, tree: Option<Root>) -> MkblogResult<String> {
		let tree = match tree {
			Some(tree) => tree,
			None => self.presentation_tree(None)?,
		};

		self.pipeline.serialize(tree)
	}
}

impl<S: Schema> Document<S> {
	/// The frontmatter validated against the collection schema.
	///
	/// Fails with [`MkblogError::MetadataNotFound`] when the document has no
	/// frontmatter and [`MkblogError::MetadataInvalid`] when it does not
	/// match the schema.
	#[tracing::instrument(level = "trace", skip_all, fields(slug = %self.slug))]
	pub fn metadata(&self, ast: Option<&mdast::Node>) -> MkblogResult<S::Output> {
		match ast {
			Some(ast) => extract_metadata(ast, self.schema.as_ref()),
			None => extract_metadata(&self.ast()?, self.schema.as_ref()),
		}
	}
}

impl<S> Clone for Document<S> {
	fn clone(&self) -> Self {
		Self {
			filepath: self.filepath.clone(),
			identifier: self.identifier.clone(),
			slug: self.slug.clone(),
			pipeline: Arc::clone(&self.pipeline),
			schema: Arc::clone(&self.schema),
		}
	}
}

impl<S> fmt::Debug for Document<S> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Document")
			.field("filepath", &self.filepath)
			.field("identifier", &self.identifier)
			.field("slug", &self.slug)
			.finish_non_exhaustive()
	}
}

use std::sync::Arc;

use derive_more::Deref;
use mkblog_core::Document;
use mkblog_core::MkblogResult;
use mkblog_core::extension::Plugin;
use mkblog_core::extension::SharedHastExtension;
use mkblog_core::hast::Root;

use crate::HeadingAnchors;
use crate::build_toc;
use crate::collect_headings;

/// Installs [`HeadingAnchors`] into the presentation stage so that every
/// heading has an anchor for the table of contents to link to.
#[derive(Debug, Clone, Copy, Default)]
pub struct TocPlugin;

impl Plugin for TocPlugin {
	fn name(&self) -> &str {
		"toc"
	}

	fn hast_extensions(&self) -> Vec<SharedHastExtension> {
		vec![Arc::new(HeadingAnchors)]
	}
}

/// A document with table of contents operations.
///
/// Dereferences to the wrapped [`Document`], so every base operation stays
/// available.
#[derive(Debug, Deref)]
pub struct TocDocument<S> {
	document: Document<S>,
}

impl<S> TocDocument<S> {
	pub fn new(document: Document<S>) -> Self {
		Self { document }
	}

	pub fn into_inner(self) -> Document<S> {
		self.document
	}

	/// The table of contents as a presentation tree: a root holding one
	/// `ul.toc` list.
	///
	/// Headings link to their `id`. Without [`TocPlugin`] installed the
	/// headings have none and every link points to `#`.
	#[tracing::instrument(level = "trace", skip_all, fields(slug = %self.document.slug()))]
	pub fn raw_toc(&self) -> MkblogResult<Root> {
		let tree = self.document.presentation_tree(None)?;
		Ok(build_toc(collect_headings(&tree)))
	}

	/// The table of contents rendered with the document's markup stage.
	pub fn toc(&self) -> MkblogResult<String> {
		self.document.pipeline().serialize(self.raw_toc()?)
	}
}

impl<S> From<Document<S>> for TocDocument<S> {
	fn from(document: Document<S>) -> Self {
		Self::new(document)
	}
}

/// Adds [`WithToc::with_toc`] to documents.
pub trait WithToc<S> {
	fn with_toc(&self) -> TocDocument<S>;
}

impl<S> WithToc<S> for Document<S> {
	fn with_toc(&self) -> TocDocument<S> {
		TocDocument::new(self.clone())
	}
}

use std::fmt;

use markdown::mdast;

use crate::MkblogResult;
use crate::extension::ExtensionNames;
use crate::extension::SharedHastExtension;
use crate::extension::SharedMdastExtension;
use crate::hast::Root;
use crate::html::to_html;
use crate::lower::LowerOptions;
use crate::lower::lower;
use crate::parser::parse;

/// The three transformation stages and the extensions of each, fixed when a
/// collection is built and shared read-only by all of its documents.
#[derive(Clone, Default)]
pub struct Pipeline {
	pub(crate) mdast: Vec<SharedMdastExtension>,
	pub(crate) hast: Vec<SharedHastExtension>,
	pub(crate) html: Vec<SharedHastExtension>,
	pub(crate) lower_options: LowerOptions,
}

impl Pipeline {
	pub fn new() -> Self {
		Self::default()
	}

	/// Source text → mdast.
	pub fn parse(&self, content: &str) -> MkblogResult<mdast::Node> {
		parse(content, &self.mdast)
	}

	/// mdast → presentation tree.
	pub fn lower(&self, ast: &mdast::Node) -> MkblogResult<Root> {
		lower(ast, &self.lower_options, &self.hast)
	}

	/// Presentation tree → HTML. The markup-stage extensions rewrite the tree
	/// before the fixed serializer runs.
	pub fn serialize(&self, tree: Root) -> MkblogResult<String> {
		let mut tree = tree;
		for extension in &self.html {
			tracing::trace!(extension = extension.name(), "rewriting hast before serialization");
			tree = extension.rewrite(tree)?;
		}

		Ok(to_html(&tree))
	}

	pub fn mdast_extensions(&self) -> &[SharedMdastExtension] {
		&self.mdast
	}

	pub fn hast_extensions(&self) -> &[SharedHastExtension] {
		&self.hast
	}

	pub fn html_extensions(&self) -> &[SharedHastExtension] {
		&self.html
	}

	pub fn lower_options(&self) -> &LowerOptions {
		&self.lower_options
	}
}

impl fmt::Debug for Pipeline {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Pipeline")
			.field("mdast", &ExtensionNames(&self.mdast))
			.field("hast", &ExtensionNames(&self.hast))
			.field("html", &ExtensionNames(&self.html))
			.field("lower_options", &self.lower_options)
			.finish()
	}
}

use markdown::ParseOptions;
use markdown::mdast::Node;
use markdown::to_mdast;

use crate::MkblogError;
use crate::MkblogResult;
use crate::extension::SharedMdastExtension;

/// The parse options every document starts from: CommonMark with
/// frontmatter recognised, so that a leading `---` (YAML) or `+++` (TOML)
/// block becomes its own node instead of a thematic break.
pub fn base_parse_options() -> ParseOptions {
	let mut options = ParseOptions::default();
	options.constructs.frontmatter = true;
	options
}

/// Parse raw document text into an mdast.
///
/// Each extension first adjusts the parse options (in order), then each
/// extension rewrites the parsed tree (in order).
pub fn parse(content: impl AsRef<str>, extensions: &[SharedMdastExtension]) -> MkblogResult<Node> {
	let mut options = base_parse_options();
	for extension in extensions {
		extension.configure(&mut options);
	}

	let mut tree = to_mdast(content.as_ref(), &options)
		.map_err(|e| MkblogError::Markdown(e.to_string()))?;

	for extension in extensions {
		tracing::trace!(extension = extension.name(), "rewriting mdast");
		tree = extension.rewrite(tree)?;
	}

	Ok(tree)
}

/// The frontmatter block of a parsed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Frontmatter<'a> {
	Yaml(&'a str),
	Toml(&'a str),
}

impl Frontmatter<'_> {
	/// The raw text between the fences, exactly as written.
	pub fn value(&self) -> &str {
		match self {
			Self::Yaml(value) | Self::Toml(value) => value,
		}
	}
}

/// Find the first frontmatter node anywhere in the tree, in document order.
pub fn find_frontmatter(node: &Node) -> Option<Frontmatter<'_>> {
	match node {
		Node::Yaml(yaml) => Some(Frontmatter::Yaml(&yaml.value)),
		Node::Toml(toml) => Some(Frontmatter::Toml(&toml.value)),
		_ => {
			node.children()?
				.iter()
				.find_map(find_frontmatter)
		}
	}
}

/// Normalize CRLF line endings to LF.
pub fn normalize_line_endings(content: &str) -> String {
	if content.contains('\r') {
		content.replace("\r\n", "\n").replace('\r', "\n")
	} else {
		content.to_string()
	}
}

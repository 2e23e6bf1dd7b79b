//! Rewrite extensions for each pipeline stage, and plugins that bundle them.
//!
//! Extensions are trusted code: an error returned from a rewrite surfaces
//! unchanged to the caller of the document operation that triggered it.

use std::fmt;
use std::sync::Arc;

use markdown::Constructs;
use markdown::ParseOptions;
use markdown::mdast;

use crate::MkblogResult;
use crate::hast;

/// An extension of the source stage. It may change how the source is parsed
/// (syntax extensions) and rewrite the resulting mdast.
pub trait MdastExtension: Send + Sync {
	fn name(&self) -> &str;

	/// Adjust the parse options before the source is parsed.
	fn configure(&self, _options: &mut ParseOptions) {}

	/// Rewrite the parsed tree. The default returns it untouched.
	fn rewrite(&self, tree: mdast::Node) -> MkblogResult<mdast::Node> {
		Ok(tree)
	}
}

/// An extension of the presentation stage. The same trait is used for the
/// extensions that run just before serialization.
pub trait HastExtension: Send + Sync {
	fn name(&self) -> &str;

	fn rewrite(&self, tree: hast::Root) -> MkblogResult<hast::Root>;
}

pub type SharedMdastExtension = Arc<dyn MdastExtension>;
pub type SharedHastExtension = Arc<dyn HastExtension>;

/// GitHub flavoured markdown syntax: tables, strikethrough, task lists,
/// autolink literals and footnotes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gfm;

impl MdastExtension for Gfm {
	fn name(&self) -> &str {
		"gfm"
	}

	fn configure(&self, options: &mut ParseOptions) {
		let frontmatter = options.constructs.frontmatter;
		options.constructs = Constructs {
			frontmatter,
			..Constructs::gfm()
		};
	}
}

/// An mdast extension backed by a closure.
pub struct MdastFn<F> {
	name: String,
	rewrite: F,
}

/// Wrap a closure as an [`MdastExtension`].
pub fn mdast_fn<F>(name: impl Into<String>, rewrite: F) -> MdastFn<F>
where
	F: Fn(mdast::Node) -> MkblogResult<mdast::Node> + Send + Sync,
{
	MdastFn {
		name: name.into(),
		rewrite,
	}
}

impl<F> MdastExtension for MdastFn<F>
where
	F: Fn(mdast::Node) -> MkblogResult<mdast::Node> + Send + Sync,
{
	fn name(&self) -> &str {
		&self.name
	}

	fn rewrite(&self, tree: mdast::Node) -> MkblogResult<mdast::Node> {
		(self.rewrite)(tree)
	}
}

/// A hast extension backed by a closure.
pub struct HastFn<F> {
	name: String,
	rewrite: F,
}

/// Wrap a closure as a [`HastExtension`].
pub fn hast_fn<F>(name: impl Into<String>, rewrite: F) -> HastFn<F>
where
	F: Fn(hast::Root) -> MkblogResult<hast::Root> + Send + Sync,
{
	HastFn {
		name: name.into(),
		rewrite,
	}
}

impl<F> HastExtension for HastFn<F>
where
	F: Fn(hast::Root) -> MkblogResult<hast::Root> + Send + Sync,
{
	fn name(&self) -> &str {
		&self.name
	}

	fn rewrite(&self, tree: hast::Root) -> MkblogResult<hast::Root> {
		(self.rewrite)(tree)
	}
}

/// A named bundle of extensions installed into a collection in one step.
///
/// Installation is keyed by [`Plugin::name`]: installing a plugin whose name
/// is already installed leaves the configuration unchanged.
pub trait Plugin: Send + Sync {
	fn name(&self) -> &str;

	fn mdast_extensions(&self) -> Vec<SharedMdastExtension> {
		Vec::new()
	}

	fn hast_extensions(&self) -> Vec<SharedHastExtension> {
		Vec::new()
	}

	fn html_extensions(&self) -> Vec<SharedHastExtension> {
		Vec::new()
	}
}

/// Names of a list of extensions, for `Debug` output and logging.
pub(crate) struct ExtensionNames<'a, T: ?Sized>(pub(crate) &'a [Arc<T>]);

impl fmt::Debug for ExtensionNames<'_, dyn MdastExtension> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list()
			.entries(self.0.iter().map(|extension| extension.name()))
			.finish()
	}
}

impl fmt::Debug for ExtensionNames<'_, dyn HastExtension> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list()
			.entries(self.0.iter().map(|extension| extension.name()))
			.finish()
	}
}

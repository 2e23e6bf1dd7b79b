use std::path::Path;

use serde::Deserialize;
use tempfile::TempDir;

use crate::Collection;
use crate::CollectionConfig;
use crate::Document;
use crate::MkblogResult;
use crate::schema::FieldType;
use crate::schema::Shape;

pub(crate) const TITLE_DOCUMENT: &str = "---\ntitle: A1\ntags:\n  - intro\n  - rust\n---\n\n# Hello\n\nSome *text*.\n";
pub(crate) const TABLE_DOCUMENT: &str = "---\ntitle: Table\n---\n\n| a | b |\n| - | :-: |\n| 1 | 2 |\n";
pub(crate) const PLAIN_DOCUMENT: &str = "---\ntitle: Plain\n---\n\n# Title\n\nplain paragraph\n";

#[derive(Debug, Deserialize, PartialEq)]
pub(crate) struct Post {
	pub title: String,
	pub tags: Option<Vec<String>>,
}

pub(crate) fn post_shape() -> Shape<Post> {
	Shape::new()
		.field("title", FieldType::String)
		.optional("tags", FieldType::array(FieldType::String))
}

/// A shape accepting any record, validating nothing.
pub(crate) fn any_shape() -> Shape {
	Shape::new()
}

pub(crate) fn tempdir() -> TempDir {
	tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"))
}

/// Write `content` to `relative` below `root`, creating parent directories.
pub(crate) fn write_file(root: &Path, relative: &str, content: &str) {
	let path = root.join(relative);
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent).unwrap_or_else(|e| panic!("create dir: {e}"));
	}
	std::fs::write(&path, content).unwrap_or_else(|e| panic!("write {relative}: {e}"));
}

/// A directory holding a single document at `cases/a1/title.md`.
pub(crate) fn single_case(content: &str) -> TempDir {
	let tmp = tempdir();
	write_file(tmp.path(), "cases/a1/title.md", content);
	tmp
}

/// Build a collection of every markdown file below `root`.
pub(crate) fn collection_at<S>(root: &Path, schema: S) -> MkblogResult<Collection<S>> {
	CollectionConfig::new(["**/*.md"], schema).root(root).build()
}

/// The only document of a collection.
pub(crate) fn only_document<S>(collection: Collection<S>) -> Document<S> {
	let mut documents = collection.into_documents();
	assert_eq!(documents.len(), 1, "expected exactly one document");
	documents.remove(0)
}

/// Render `content` as a standalone document with the given config applied.
pub(crate) fn render_with(
	content: &str,
	configure: impl FnOnce(CollectionConfig<Shape>) -> CollectionConfig<Shape>,
) -> MkblogResult<String> {
	let tmp = single_case(content);
	let config = configure(CollectionConfig::new(["**/*.md"], Shape::new()).root(tmp.path()));
	only_document(config.build()?).html(None)
}

pub(crate) fn render(content: &str) -> MkblogResult<String> {
	render_with(content, |config| config)
}

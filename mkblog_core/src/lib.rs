//! `mkblog_core` loads collections of markdown documents with frontmatter
//! metadata. It discovers the matching files, derives a stable slug for each,
//! and renders any document on demand to HTML through a three-stage pipeline
//! with pluggable extensions at every stage.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Markdown file
//!   → Parser (markdown → mdast, frontmatter kept as a Yaml/Toml node)
//!   → mdast extensions (syntax options, tree rewrites)
//!   → Lowering (mdast → hast) → hast extensions
//!   → html extensions → Serializer (hast → HTML string)
//!
//! mdast → frontmatter → decoded record → Schema → typed metadata
//! ```
//!
//! ## Modules
//!
//! - [`collection`]: collection definition and file discovery.
//! - [`Document`]: the per-file handle. Nothing is cached between calls.
//! - [`extension`]: extension traits for each stage and plugins bundling
//!   them.
//! - [`schema`]: metadata shapes bound to a result type.
//! - [`slug`]: built-in and custom slug strategies.
//! - [`config`]: collections defined in `mkblog.toml`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mkblog_core::CollectionConfig;
//! use mkblog_core::extension::Gfm;
//! use mkblog_core::schema::FieldType;
//! use mkblog_core::schema::Shape;
//! use mkblog_core::slug::SlugStrategy;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Post {
//! 	title: String,
//! }
//!
//! let posts = CollectionConfig::new(["posts/*.md"], Shape::<Post>::new().field("title", FieldType::String))
//! 	.slug(SlugStrategy::Mix)
//! 	.mdast_extension(Gfm)
//! 	.build()
//! 	.unwrap();
//!
//! for post in &posts {
//! 	let ast = post.ast().unwrap();
//! 	let metadata = post.metadata(Some(&ast)).unwrap();
//! 	let tree = post.presentation_tree(Some(&ast)).unwrap();
//! 	println!("{}: {}", metadata.title, post.html(Some(tree)).unwrap());
//! }
//! ```

pub use collection::*;
pub use config::*;
pub use document::*;
pub use error::*;
pub use markdown;
pub use pipeline::*;

pub mod collection;
pub mod config;
mod document;
#[allow(unused_assignments)]
mod error;
pub mod extension;
pub mod hast;
pub mod html;
pub mod lower;
pub mod metadata;
pub mod parser;
mod pipeline;
pub mod schema;
pub mod slug;

#[cfg(test)]
mod __fixtures;

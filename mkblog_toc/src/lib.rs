//! `mkblog_toc` adds a table of contents to the documents of an
//! [`mkblog_core`] collection.
//!
//! Install [`TocPlugin`] when defining the collection so that headings get
//! anchors, then wrap any document with [`WithToc::with_toc`]:
//!
//! ```rust,no_run
//! use mkblog_core::CollectionConfig;
//! use mkblog_core::schema::Shape;
//! use mkblog_toc::TocPlugin;
//! use mkblog_toc::WithToc;
//!
//! let shape: Shape = Shape::new();
//! let posts = CollectionConfig::new(["posts/*.md"], shape)
//! 	.plugin(&TocPlugin)
//! 	.build()
//! 	.unwrap();
//! let post = posts.find("hello").unwrap().with_toc();
//! println!("{}", post.toc().unwrap());
//! ```
//!
//! The table of contents mirrors the heading levels present in the document.
//! A level is nested below the previous heading only when it is deeper, and a
//! skipped level produces no empty placeholder list.

pub use anchor::*;
pub use headings::*;
pub use plugin::*;

mod anchor;
mod headings;
mod plugin;

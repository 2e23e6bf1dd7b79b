//! GitHub-compatible heading anchors.

use std::collections::HashMap;

use mkblog_core::MkblogResult;
use mkblog_core::extension::HastExtension;
use mkblog_core::hast::Root;

/// Generates unique anchor slugs from heading text.
///
/// The algorithm follows GitHub's conventions:
/// - Lowercase the text
/// - Remove punctuation and symbols, keeping letters, digits, `-` and `_`
/// - Replace each space with a hyphen (runs of spaces are not collapsed)
/// - Append `-N` for duplicates, starting at 1
#[derive(Debug, Default)]
pub struct Slugger {
	occurrences: HashMap<String, usize>,
}

impl Slugger {
	pub fn new() -> Self {
		Self::default()
	}

	/// The slug for `text`, unique among every slug this slugger returned.
	pub fn slug(&mut self, text: &str) -> String {
		let original = base_slug(text);
		let mut slug = original.clone();

		while self.occurrences.contains_key(&slug) {
			let count = self.occurrences.entry(original.clone()).or_insert(0);
			*count += 1;
			slug = format!("{original}-{count}");
		}

		self.occurrences.insert(slug.clone(), 0);
		slug
	}

	/// Forget every slug seen so far.
	pub fn reset(&mut self) {
		self.occurrences.clear();
	}
}

fn base_slug(text: &str) -> String {
	text.chars()
		.flat_map(char::to_lowercase)
		.filter_map(|c| {
			match c {
				' ' => Some('-'),
				'-' | '_' => Some(c),
				c if c.is_alphanumeric() => Some(c),
				_ => None,
			}
		})
		.collect()
}

/// Presentation-stage extension assigning an `id` to every `h1`–`h6`
/// element that lacks one. Slugs are unique within one tree and a fresh
/// slugger is used for every tree, so identical documents always receive
/// identical anchors.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadingAnchors;

impl HastExtension for HeadingAnchors {
	fn name(&self) -> &str {
		"heading-anchors"
	}

	fn rewrite(&self, mut tree: Root) -> MkblogResult<Root> {
		let mut slugger = Slugger::new();
		tree.visit_elements_mut(&mut |element| {
			if element.heading_rank().is_none() || element.properties.contains("id") {
				return;
			}

			let id = slugger.slug(&element.text_content());
			tracing::trace!(%id, "assigned heading anchor");
			element.properties.insert("id", id);
		});

		Ok(tree)
	}
}

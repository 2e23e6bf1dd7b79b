use std::collections::VecDeque;

use mkblog_core::hast::Element;
use mkblog_core::hast::Node;
use mkblog_core::hast::Root;
use mkblog_core::hast::h;

/// A heading found in a presentation tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingEntry {
	/// The heading's `id`, or an empty string when it has none.
	pub id: String,
	/// The concatenated direct text children of the heading. Text nested in
	/// inline elements such as `em` or `code` is not included.
	pub text: String,
	/// 1 through 6.
	pub level: u8,
}

impl HeadingEntry {
	pub fn new(id: impl Into<String>, text: impl Into<String>, level: u8) -> Self {
		Self {
			id: id.into(),
			text: text.into(),
			level,
		}
	}
}

/// Every `h1`–`h6` element of `tree` in document order.
pub fn collect_headings(tree: &Root) -> Vec<HeadingEntry> {
	let mut headings = Vec::new();
	tree.visit_elements(&mut |element| {
		let Some(level) = element.heading_rank() else {
			return;
		};

		let text: String = element.children.iter().filter_map(Node::as_text).collect();
		headings.push(HeadingEntry::new(element.id().unwrap_or_default(), text, level));
	});

	headings
}

/// Nest a flat heading sequence into a table of contents.
///
/// Nesting follows the levels actually present: a level 3 heading directly
/// after a level 1 heading is nested one list below it, with no placeholder
/// for the missing level 2.
pub fn build_toc(headings: Vec<HeadingEntry>) -> Root {
	let mut remaining = VecDeque::from(headings);
	Root::new(vec![build_list(&mut remaining, 1).into()])
}

fn build_list(remaining: &mut VecDeque<HeadingEntry>, threshold: u8) -> Element {
	let mut items: Vec<Node> = Vec::new();

	while remaining.front().is_some_and(|next| next.level >= threshold) {
		let Some(heading) = remaining.pop_front() else {
			break;
		};
		let link = h("a", [("href", format!("#{}", heading.id))], [Node::text(heading.text)]);
		let mut item = h(
			"li",
			[("class", vec![format!("toc-level-{}", heading.level)])],
			[link.into()],
		);

		if remaining.front().is_some_and(|next| next.level > heading.level) {
			item.children.push(build_list(remaining, heading.level + 1).into());
		}

		items.push(item.into());
	}

	h("ul", [("class", vec!["toc"])], items)
}

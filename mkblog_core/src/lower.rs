//! Lowering of the structural tree (mdast) into the presentation tree (hast).

use std::collections::HashMap;

use markdown::mdast;
use markdown::mdast::AlignKind;
use markdown::mdast::ReferenceKind;
use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;
use percent_encoding::utf8_percent_encode;
use serde::Deserialize;

use crate::MkblogResult;
use crate::extension::SharedHastExtension;
use crate::hast::Element;
use crate::hast::Node;
use crate::hast::PropertyValue;
use crate::hast::Root;
use crate::hast::h;

/// Options for the baseline mdast → hast mapping.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LowerOptions {
	/// Keep raw HTML from the source as verbatim output. When `false` (the
	/// default) raw HTML is dropped.
	pub allow_dangerous_html: bool,
	/// Text of the heading above the footnote section.
	pub footnote_label: String,
	/// Accessible label of footnote back references. `{n}` is replaced with
	/// the reference number.
	pub footnote_back_label: String,
}

impl Default for LowerOptions {
	fn default() -> Self {
		Self {
			allow_dangerous_html: false,
			footnote_label: "Footnotes".to_string(),
			footnote_back_label: "Back to reference {n}".to_string(),
		}
	}
}

/// Lower an mdast into a presentation tree: the baseline mapping first, then
/// every extension in order, each receiving the previous tree.
pub fn lower(
	ast: &mdast::Node,
	options: &LowerOptions,
	extensions: &[SharedHastExtension],
) -> MkblogResult<Root> {
	let mut tree = to_hast(ast, options);

	for extension in extensions {
		tracing::trace!(extension = extension.name(), "rewriting hast");
		tree = extension.rewrite(tree)?;
	}

	Ok(tree)
}

/// The baseline mapping alone, without extensions.
pub fn to_hast(ast: &mdast::Node, options: &LowerOptions) -> Root {
	let mut state = State::new(options);
	state.collect_definitions(ast);

	let mut children = match ast {
		mdast::Node::Root(root) => wrap(state.all(&root.children), false),
		other => wrap(state.one(other), false),
	};

	if let Some(footer) = state.footer() {
		children.push(Node::text("\n"));
		children.push(footer.into());
	}

	Root::new(children)
}

struct State<'a> {
	options: &'a LowerOptions,
	definitions: HashMap<String, &'a mdast::Definition>,
	footnotes: HashMap<String, &'a mdast::FootnoteDefinition>,
	/// Footnote identifiers in order of first reference.
	footnote_order: Vec<String>,
	footnote_counts: HashMap<String, usize>,
}

impl<'a> State<'a> {
	fn new(options: &'a LowerOptions) -> Self {
		Self {
			options,
			definitions: HashMap::new(),
			footnotes: HashMap::new(),
			footnote_order: Vec::new(),
			footnote_counts: HashMap::new(),
		}
	}

	/// Record link and footnote definitions. The first definition of an
	/// identifier wins.
	fn collect_definitions(&mut self, node: &'a mdast::Node) {
		match node {
			mdast::Node::Definition(definition) => {
				self.definitions
					.entry(normalize_identifier(&definition.identifier))
					.or_insert(definition);
			}
			mdast::Node::FootnoteDefinition(definition) => {
				self.footnotes
					.entry(normalize_identifier(&definition.identifier))
					.or_insert(definition);
			}
			_ => {}
		}

		if let Some(children) = node.children() {
			for child in children {
				self.collect_definitions(child);
			}
		}
	}

	fn all(&mut self, nodes: &'a [mdast::Node]) -> Vec<Node> {
		nodes.iter().flat_map(|node| self.one(node)).collect()
	}

	#[allow(clippy::match_same_arms)]
	fn one(&mut self, node: &'a mdast::Node) -> Vec<Node> {
		match node {
			mdast::Node::Root(root) => self.all(&root.children),
			mdast::Node::Paragraph(paragraph) => {
				vec![Element::new("p").with_children(self.all(&paragraph.children)).into()]
			}
			mdast::Node::Heading(heading) => {
				let tag = format!("h{}", heading.depth.clamp(1, 6));
				vec![Element::new(tag).with_children(self.all(&heading.children)).into()]
			}
			mdast::Node::Blockquote(blockquote) => {
				let children = wrap(self.all(&blockquote.children), true);
				vec![Element::new("blockquote").with_children(children).into()]
			}
			mdast::Node::List(list) => vec![self.list(list).into()],
			mdast::Node::ListItem(item) => vec![self.list_item(item, item.spread).into()],
			mdast::Node::Code(code) => {
				let mut inner = Element::new("code");
				if let Some(lang) = code.lang.as_deref() {
					inner = inner.with_property("class", vec![format!("language-{lang}")]);
				}
				let value = if code.value.is_empty() {
					String::new()
				} else {
					format!("{}\n", code.value)
				};
				vec![Element::new("pre").with_child(inner.with_child(value)).into()]
			}
			mdast::Node::Math(math) => {
				let inner = Element::new("code")
					.with_property("class", vec!["language-math", "math-display"])
					.with_child(format!("{}\n", math.value));
				vec![Element::new("pre").with_child(inner).into()]
			}
			mdast::Node::InlineMath(math) => {
				vec![
					Element::new("code")
						.with_property("class", vec!["language-math", "math-inline"])
						.with_child(math.value.clone())
						.into(),
				]
			}
			mdast::Node::InlineCode(code) => {
				vec![
					Element::new("code")
						.with_child(code.value.replace("\r\n", " ").replace('\n', " "))
						.into(),
				]
			}
			mdast::Node::Text(text) => vec![Node::text(text.value.clone())],
			mdast::Node::Emphasis(emphasis) => {
				vec![Element::new("em").with_children(self.all(&emphasis.children)).into()]
			}
			mdast::Node::Strong(strong) => {
				vec![Element::new("strong").with_children(self.all(&strong.children)).into()]
			}
			mdast::Node::Delete(delete) => {
				vec![Element::new("del").with_children(self.all(&delete.children)).into()]
			}
			mdast::Node::Break(_) => vec![Element::new("br").into(), Node::text("\n")],
			mdast::Node::ThematicBreak(_) => vec![Element::new("hr").into()],
			mdast::Node::Link(link) => {
				let mut anchor = Element::new("a").with_property("href", normalize_uri(&link.url));
				if let Some(title) = &link.title {
					anchor = anchor.with_property("title", title.clone());
				}
				vec![anchor.with_children(self.all(&link.children)).into()]
			}
			mdast::Node::Image(image) => {
				vec![image_element(&image.url, &image.alt, image.title.as_deref()).into()]
			}
			mdast::Node::LinkReference(reference) => self.link_reference(reference),
			mdast::Node::ImageReference(reference) => self.image_reference(reference),
			mdast::Node::FootnoteReference(reference) => {
				vec![self.footnote_reference(&reference.identifier).into()]
			}
			mdast::Node::Table(table) => vec![self.table(table).into()],
			mdast::Node::Html(html) => {
				if self.options.allow_dangerous_html {
					vec![Node::raw(html.value.clone())]
				} else {
					Vec::new()
				}
			}
			// Frontmatter, definitions and mdx constructs have no presentation.
			mdast::Node::Yaml(_)
			| mdast::Node::Toml(_)
			| mdast::Node::Definition(_)
			| mdast::Node::FootnoteDefinition(_) => Vec::new(),
			_ => Vec::new(),
		}
	}

	fn list(&mut self, list: &'a mdast::List) -> Element {
		let loose = list.spread
			|| list
				.children
				.iter()
				.any(|child| matches!(child, mdast::Node::ListItem(item) if item.spread));
		let is_task_list = list
			.children
			.iter()
			.any(|child| matches!(child, mdast::Node::ListItem(item) if item.checked.is_some()));

		let mut element = Element::new(if list.ordered { "ol" } else { "ul" });
		if list.ordered {
			if let Some(start) = list.start.filter(|start| *start != 1) {
				element = element.with_property("start", start.to_string());
			}
		}
		if is_task_list {
			element = element.with_property("class", vec!["contains-task-list"]);
		}

		let items: Vec<Node> = list
			.children
			.iter()
			.map(|child| {
				match child {
					mdast::Node::ListItem(item) => self.list_item(item, loose).into(),
					other => Element::new("li").with_children(self.one(other)).into(),
				}
			})
			.collect();

		element.with_children(wrap(items, true))
	}

	fn list_item(&mut self, item: &'a mdast::ListItem, loose: bool) -> Element {
		let mut results = self.all(&item.children);
		let mut element = Element::new("li");

		if let Some(checked) = item.checked {
			let input = h(
				"input",
				[
					("type", PropertyValue::from("checkbox")),
					("checked", PropertyValue::from(checked)),
					("disabled", PropertyValue::from(true)),
				],
				[],
			);

			match results.first_mut() {
				Some(Node::Element(paragraph)) if paragraph.tag == "p" => {
					if !paragraph.children.is_empty() {
						paragraph.children.insert(0, Node::text(" "));
					}
					paragraph.children.insert(0, input.into());
				}
				_ => results.insert(0, Element::new("p").with_child(input).into()),
			}

			element = element.with_property("class", vec!["task-list-item"]);
		}

		let ends_in_paragraph = results
			.last()
			.and_then(Node::as_element)
			.is_some_and(|last| last.tag == "p");
		let has_results = !results.is_empty();

		let mut children = Vec::new();
		for (index, child) in results.into_iter().enumerate() {
			let is_paragraph = child.as_element().is_some_and(|el| el.tag == "p");
			if loose || index != 0 || !is_paragraph {
				children.push(Node::text("\n"));
			}

			match child {
				Node::Element(paragraph) if paragraph.tag == "p" && !loose => {
					children.extend(paragraph.children);
				}
				other => children.push(other),
			}
		}

		if has_results && (loose || !ends_in_paragraph) {
			children.push(Node::text("\n"));
		}

		element.with_children(children)
	}

	fn table(&mut self, table: &'a mdast::Table) -> Element {
		let mut rows = table.children.iter().filter_map(|row| {
			match row {
				mdast::Node::TableRow(row) => Some(row),
				_ => None,
			}
		});

		let mut sections = Vec::new();
		if let Some(head) = rows.next() {
			let row = self.table_row(head, &table.align, "th");
			sections.push(Element::new("thead").with_children(wrap(vec![row.into()], true)).into());
		}

		let body: Vec<Node> = rows
			.map(|row| self.table_row(row, &table.align, "td").into())
			.collect();
		if !body.is_empty() {
			sections.push(Element::new("tbody").with_children(wrap(body, true)).into());
		}

		Element::new("table").with_children(wrap(sections, true))
	}

	fn table_row(&mut self, row: &'a mdast::TableRow, align: &[AlignKind], tag: &str) -> Element {
		// Cells beyond the delimiter row's column count are dropped.
		let length = if align.is_empty() {
			row.children.len()
		} else {
			align.len()
		};
		let mut cells = Vec::with_capacity(length);

		for index in 0..length {
			let mut cell = Element::new(tag);
			if let Some(value) = align.get(index).and_then(|kind| align_value(*kind)) {
				cell = cell.with_property("align", value);
			}
			if let Some(mdast::Node::TableCell(source)) = row.children.get(index) {
				cell = cell.with_children(self.all(&source.children));
			}
			cells.push(cell.into());
		}

		Element::new("tr").with_children(wrap(cells, true))
	}

	fn link_reference(&mut self, reference: &'a mdast::LinkReference) -> Vec<Node> {
		let children = self.all(&reference.children);
		let Some(definition) = self
			.definitions
			.get(&normalize_identifier(&reference.identifier))
		else {
			return revert_reference(
				"[",
				children,
				&reference.reference_kind,
				reference.label.as_deref().unwrap_or(&reference.identifier),
			);
		};

		let mut anchor = Element::new("a").with_property("href", normalize_uri(&definition.url));
		if let Some(title) = &definition.title {
			anchor = anchor.with_property("title", title.clone());
		}
		vec![anchor.with_children(children).into()]
	}

	fn image_reference(&mut self, reference: &'a mdast::ImageReference) -> Vec<Node> {
		let Some(definition) = self
			.definitions
			.get(&normalize_identifier(&reference.identifier))
		else {
			return revert_reference(
				"![",
				vec![Node::text(reference.alt.clone())],
				&reference.reference_kind,
				reference.label.as_deref().unwrap_or(&reference.identifier),
			);
		};

		vec![image_element(&definition.url, &reference.alt, definition.title.as_deref()).into()]
	}

	fn footnote_reference(&mut self, identifier: &str) -> Element {
		let id = normalize_identifier(identifier);
		let counter = match self.footnote_order.iter().position(|known| *known == id) {
			Some(index) => index + 1,
			None => {
				self.footnote_order.push(id.clone());
				self.footnote_order.len()
			}
		};

		let reuse = self.footnote_counts.entry(id.clone()).or_insert(0);
		*reuse += 1;
		let reference_id = if *reuse > 1 {
			format!("user-content-fnref-{id}-{reuse}")
		} else {
			format!("user-content-fnref-{id}")
		};

		let anchor = h(
			"a",
			[
				("href", PropertyValue::from(format!("#user-content-fn-{id}"))),
				("id", PropertyValue::from(reference_id)),
				("data-footnote-ref", PropertyValue::from(true)),
				("aria-describedby", PropertyValue::from("footnote-label")),
			],
			[Node::text(counter.to_string())],
		);

		Element::new("sup").with_child(anchor)
	}

	/// The footnote section, when any footnote was referenced. Definitions
	/// may reference further footnotes, which are appended as they appear.
	fn footer(&mut self) -> Option<Element> {
		let mut items = Vec::new();
		let mut index = 0;

		while let Some(id) = self.footnote_order.get(index).cloned() {
			index += 1;
			let Some(definition) = self.footnotes.get(&id).copied() else {
				continue;
			};

			let mut content = self.all(&definition.children);
			let references = self.footnote_counts.get(&id).copied().unwrap_or(1);
			let mut backrefs = Vec::new();
			for reuse in 1..=references {
				let target = if reuse > 1 {
					format!("#user-content-fnref-{id}-{reuse}")
				} else {
					format!("#user-content-fnref-{id}")
				};
				let label = self.options.footnote_back_label.replace("{n}", &index.to_string());
				if !backrefs.is_empty() {
					backrefs.push(Node::text(" "));
				}
				backrefs.push(
					h(
						"a",
						[
							("href", PropertyValue::from(target)),
							("data-footnote-backref", PropertyValue::from("")),
							("aria-label", PropertyValue::from(label)),
							("class", PropertyValue::from(vec!["data-footnote-backref"])),
						],
						[Node::text("\u{21a9}")],
					)
					.into(),
				);
			}

			match content.last_mut() {
				Some(Node::Element(last)) if last.tag == "p" => {
					last.children.push(Node::text(" "));
					last.children.extend(backrefs);
				}
				_ => content.extend(backrefs),
			}

			items.push(
				Element::new("li")
					.with_property("id", format!("user-content-fn-{id}"))
					.with_children(wrap(content, true))
					.into(),
			);
		}

		if items.is_empty() {
			return None;
		}

		let heading = h(
			"h2",
			[
				("id", PropertyValue::from("footnote-label")),
				("class", PropertyValue::from(vec!["sr-only"])),
			],
			[Node::text(self.options.footnote_label.clone())],
		);
		let list = Element::new("ol").with_children(wrap(items, true));

		Some(
			Element::new("section")
				.with_property("data-footnotes", true)
				.with_property("class", vec!["footnotes"])
				.with_children(wrap(vec![heading.into(), list.into()], true)),
		)
	}
}

fn image_element(url: &str, alt: &str, title: Option<&str>) -> Element {
	let mut image = Element::new("img")
		.with_property("src", normalize_uri(url))
		.with_property("alt", alt);
	if let Some(title) = title {
		image = image.with_property("title", title);
	}
	image
}

fn align_value(kind: AlignKind) -> Option<&'static str> {
	match kind {
		AlignKind::Left => Some("left"),
		AlignKind::Right => Some("right"),
		AlignKind::Center => Some("center"),
		AlignKind::None => None,
	}
}

/// Render an unresolved reference back as the text it was written with.
fn revert_reference(
	open: &str,
	children: Vec<Node>,
	kind: &ReferenceKind,
	label: &str,
) -> Vec<Node> {
	let suffix = match kind {
		ReferenceKind::Full => format!("][{label}]"),
		ReferenceKind::Collapsed => "][]".to_string(),
		ReferenceKind::Shortcut => "]".to_string(),
	};

	let mut result = Vec::with_capacity(children.len() + 2);
	result.push(Node::text(open));
	result.extend(children);
	result.push(Node::text(suffix));
	merge_adjacent_text(result)
}

fn merge_adjacent_text(nodes: Vec<Node>) -> Vec<Node> {
	let mut merged: Vec<Node> = Vec::with_capacity(nodes.len());
	for node in nodes {
		if let (Some(Node::Text(previous)), Node::Text(current)) = (merged.last_mut(), &node) {
			previous.value.push_str(&current.value);
			continue;
		}
		merged.push(node);
	}
	merged
}

/// Join block-level siblings with line endings. A loose wrap also starts and
/// ends with one.
fn wrap(nodes: Vec<Node>, loose: bool) -> Vec<Node> {
	let mut result = Vec::with_capacity(nodes.len() * 2 + 1);
	if loose {
		result.push(Node::text("\n"));
	}

	let has_nodes = !nodes.is_empty();
	for (index, node) in nodes.into_iter().enumerate() {
		if index > 0 {
			result.push(Node::text("\n"));
		}
		result.push(node);
	}

	if loose && has_nodes {
		result.push(Node::text("\n"));
	}

	result
}

/// Characters left as is in a URL. Everything else, including non-ASCII, is
/// percent-encoded.
const URI_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
	.remove(b'!')
	.remove(b'#')
	.remove(b'$')
	.remove(b'&')
	.remove(b'\'')
	.remove(b'(')
	.remove(b')')
	.remove(b'*')
	.remove(b'+')
	.remove(b',')
	.remove(b'-')
	.remove(b'.')
	.remove(b'/')
	.remove(b':')
	.remove(b';')
	.remove(b'=')
	.remove(b'?')
	.remove(b'@')
	.remove(b'_')
	.remove(b'~');

/// Percent-encode a URL for use in `href` or `src`. Existing `%XX` escapes
/// are kept, a stray `%` becomes `%25`.
pub fn normalize_uri(url: &str) -> String {
	let mut normalized = String::with_capacity(url.len());
	let mut rest = url;

	while let Some(index) = rest.find('%') {
		normalized.extend(utf8_percent_encode(&rest[..index], URI_ENCODE_SET));
		let after = &rest.as_bytes()[index + 1..];
		let is_escape = matches!(after, [first, second, ..]
			if first.is_ascii_alphanumeric() && second.is_ascii_alphanumeric());
		normalized.push_str(if is_escape { "%" } else { "%25" });
		rest = &rest[index + 1..];
	}

	normalized.extend(utf8_percent_encode(rest, URI_ENCODE_SET));
	normalized
}

fn normalize_identifier(identifier: &str) -> String {
	identifier
		.split_whitespace()
		.collect::<Vec<_>>()
		.join(" ")
		.to_lowercase()
}

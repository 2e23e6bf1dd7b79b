//! Serialization of a presentation tree to an HTML string.

use crate::hast::Element;
use crate::hast::Node;
use crate::hast::PropertyValue;
use crate::hast::Root;

/// Elements that never have content and are written without a closing tag.
const VOID_ELEMENTS: [&str; 14] = [
	"area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
	"track", "wbr",
];

/// Serialize a presentation tree. The output depends only on the tree.
pub fn to_html(root: &Root) -> String {
	let mut output = String::new();
	write_nodes(&root.children, &mut output);
	output
}

/// Serialize a single element and its descendants.
pub fn element_to_html(element: &Element) -> String {
	let mut output = String::new();
	write_element(element, &mut output);
	output
}

fn write_nodes(nodes: &[Node], output: &mut String) {
	for node in nodes {
		match node {
			Node::Element(element) => write_element(element, output),
			Node::Text(text) => escape_text(&text.value, output),
			Node::Comment(comment) => {
				output.push_str("<!--");
				output.push_str(&comment.value);
				output.push_str("-->");
			}
			Node::Raw(raw) => output.push_str(&raw.value),
		}
	}
}

fn write_element(element: &Element, output: &mut String) {
	output.push('<');
	output.push_str(&element.tag);

	for (name, value) in element.properties.iter() {
		match value {
			PropertyValue::Bool(false) => {}
			PropertyValue::Bool(true) => {
				output.push(' ');
				output.push_str(name);
			}
			PropertyValue::String(value) => write_attribute(name, value, output),
			PropertyValue::List(tokens) => write_attribute(name, &tokens.join(" "), output),
		}
	}

	output.push('>');

	if is_void(&element.tag) {
		return;
	}

	write_nodes(&element.children, output);
	output.push_str("</");
	output.push_str(&element.tag);
	output.push('>');
}

fn write_attribute(name: &str, value: &str, output: &mut String) {
	output.push(' ');
	output.push_str(name);
	output.push_str("=\"");
	escape_attribute(value, output);
	output.push('"');
}

fn is_void(tag: &str) -> bool {
	VOID_ELEMENTS.contains(&tag)
}

fn escape_text(value: &str, output: &mut String) {
	for ch in value.chars() {
		match ch {
			'&' => output.push_str("&amp;"),
			'<' => output.push_str("&lt;"),
			'>' => output.push_str("&gt;"),
			_ => output.push(ch),
		}
	}
}

fn escape_attribute(value: &str, output: &mut String) {
	for ch in value.chars() {
		match ch {
			'&' => output.push_str("&amp;"),
			'"' => output.push_str("&quot;"),
			_ => output.push(ch),
		}
	}
}

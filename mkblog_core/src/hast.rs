//! The presentation tree: HTML-shaped nodes produced by lowering the mdast
//! and consumed by the serializer.
//!
//! Properties keep their insertion order so that serialization is
//! deterministic and mirrors the order in which the lowering (or an
//! extension) attached them.

use serde::Serialize;

/// The root of a presentation tree. A root has no tag of its own and
/// serializes to the concatenation of its children.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Root {
	pub children: Vec<Node>,
}

/// A presentation tree node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
#[non_exhaustive]
pub enum Node {
	Element(Element),
	Text(Text),
	Comment(Text),
	/// Markup that is emitted verbatim by the serializer.
	Raw(Text),
}

/// A text-carrying leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Text {
	pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Element {
	pub tag: String,
	pub properties: Properties,
	pub children: Vec<Node>,
}

/// The value of a single element property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
#[non_exhaustive]
pub enum PropertyValue {
	String(String),
	/// Boolean attributes such as `checked` or `disabled`. `false` omits the
	/// attribute entirely.
	Bool(bool),
	/// Space separated token lists such as `class`.
	List(Vec<String>),
}

impl From<&str> for PropertyValue {
	fn from(value: &str) -> Self {
		Self::String(value.to_string())
	}
}

impl From<String> for PropertyValue {
	fn from(value: String) -> Self {
		Self::String(value)
	}
}

impl From<bool> for PropertyValue {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<Vec<String>> for PropertyValue {
	fn from(value: Vec<String>) -> Self {
		Self::List(value)
	}
}

impl From<Vec<&str>> for PropertyValue {
	fn from(value: Vec<&str>) -> Self {
		Self::List(value.into_iter().map(ToString::to_string).collect())
	}
}

impl PropertyValue {
	/// The value as a string, when it is one.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(value) => Some(value),
			_ => None,
		}
	}
}

/// Ordered element properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Properties(Vec<(String, PropertyValue)>);

impl Properties {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, name: &str) -> Option<&PropertyValue> {
		self.0
			.iter()
			.find_map(|(key, value)| (key == name).then_some(value))
	}

	pub fn contains(&self, name: &str) -> bool {
		self.get(name).is_some()
	}

	/// Set a property, replacing an existing value in place so that its
	/// position is preserved.
	pub fn insert(&mut self, name: impl Into<String>, value: impl Into<PropertyValue>) {
		let name = name.into();
		let value = value.into();
		match self.0.iter_mut().find(|(key, _)| *key == name) {
			Some((_, existing)) => *existing = value,
			None => self.0.push((name, value)),
		}
	}

	pub fn remove(&mut self, name: &str) -> Option<PropertyValue> {
		let index = self.0.iter().position(|(key, _)| key == name)?;
		Some(self.0.remove(index).1)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
		self.0.iter().map(|(key, value)| (key.as_str(), value))
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}
}

impl<K, V> FromIterator<(K, V)> for Properties
where
	K: Into<String>,
	V: Into<PropertyValue>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let mut properties = Self::new();
		for (key, value) in iter {
			properties.insert(key, value);
		}
		properties
	}
}

impl Element {
	pub fn new(tag: impl Into<String>) -> Self {
		Self {
			tag: tag.into(),
			properties: Properties::new(),
			children: Vec::new(),
		}
	}

	#[must_use]
	pub fn with_property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
		self.properties.insert(name, value);
		self
	}

	#[must_use]
	pub fn with_child(mut self, child: impl Into<Node>) -> Self {
		self.children.push(child.into());
		self
	}

	#[must_use]
	pub fn with_children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
		self.children.extend(children);
		self
	}

	/// The `id` property, if it is a string.
	pub fn id(&self) -> Option<&str> {
		self.properties.get("id").and_then(PropertyValue::as_str)
	}

	/// The heading rank for `h1` through `h6`, otherwise `None`.
	pub fn heading_rank(&self) -> Option<u8> {
		let mut chars = self.tag.chars();
		match (chars.next(), chars.next(), chars.next()) {
			(Some('h'), Some(digit @ '1'..='6'), None) => digit.to_digit(10).map(|rank| rank as u8),
			_ => None,
		}
	}

	/// The concatenated value of every descendant text node.
	pub fn text_content(&self) -> String {
		let mut text = String::new();
		collect_text(&self.children, &mut text);
		text
	}
}

fn collect_text(nodes: &[Node], text: &mut String) {
	for node in nodes {
		match node {
			Node::Text(leaf) => text.push_str(&leaf.value),
			Node::Element(element) => collect_text(&element.children, text),
			Node::Comment(_) | Node::Raw(_) => {}
		}
	}
}

impl Node {
	pub fn text(value: impl Into<String>) -> Self {
		Self::Text(Text {
			value: value.into(),
		})
	}

	pub fn comment(value: impl Into<String>) -> Self {
		Self::Comment(Text {
			value: value.into(),
		})
	}

	pub fn raw(value: impl Into<String>) -> Self {
		Self::Raw(Text {
			value: value.into(),
		})
	}

	pub fn as_element(&self) -> Option<&Element> {
		match self {
			Self::Element(element) => Some(element),
			_ => None,
		}
	}

	pub fn as_text(&self) -> Option<&str> {
		match self {
			Self::Text(text) => Some(&text.value),
			_ => None,
		}
	}
}

impl From<Element> for Node {
	fn from(element: Element) -> Self {
		Self::Element(element)
	}
}

impl From<&str> for Node {
	fn from(value: &str) -> Self {
		Self::text(value)
	}
}

impl From<String> for Node {
	fn from(value: String) -> Self {
		Self::text(value)
	}
}

/// Build an element in one expression.
///
/// ```
/// use mkblog_core::hast::h;
///
/// let link = h("a", [("href", "#intro")], ["Intro".into()]);
/// assert_eq!(link.tag, "a");
/// ```
pub fn h<K, V>(
	tag: impl Into<String>,
	properties: impl IntoIterator<Item = (K, V)>,
	children: impl IntoIterator<Item = Node>,
) -> Element
where
	K: Into<String>,
	V: Into<PropertyValue>,
{
	Element {
		tag: tag.into(),
		properties: properties.into_iter().collect(),
		children: children.into_iter().collect(),
	}
}

impl Root {
	pub fn new(children: Vec<Node>) -> Self {
		Self { children }
	}

	/// Visit every element in document order (pre-order, depth first).
	pub fn visit_elements<'a>(&'a self, visitor: &mut impl FnMut(&'a Element)) {
		visit(&self.children, visitor);
	}

	/// Mutable variant of [`Root::visit_elements`]. The visitor sees a parent
	/// before its children, so children it inserts are visited too.
	pub fn visit_elements_mut(&mut self, visitor: &mut impl FnMut(&mut Element)) {
		visit_mut(&mut self.children, visitor);
	}

	/// All elements in document order.
	pub fn elements(&self) -> Vec<&Element> {
		let mut elements = Vec::new();
		self.visit_elements(&mut |element| elements.push(element));
		elements
	}
}

fn visit<'a>(nodes: &'a [Node], visitor: &mut impl FnMut(&'a Element)) {
	for node in nodes {
		if let Node::Element(element) = node {
			visitor(element);
			visit(&element.children, visitor);
		}
	}
}

fn visit_mut(nodes: &mut [Node], visitor: &mut impl FnMut(&mut Element)) {
	for node in nodes {
		if let Node::Element(element) = node {
			visitor(element);
			visit_mut(&mut element.children, visitor);
		}
	}
}

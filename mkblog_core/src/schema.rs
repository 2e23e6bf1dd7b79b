//! Shape descriptors for document metadata.
//!
//! A [`Schema`] validates the loosely typed record decoded from a document's
//! frontmatter and produces a strongly typed value. [`Shape`] is the
//! declarative implementation: the expected fields are supplied as a value,
//! while the result type is bound through its type parameter.
//!
//! ```
//! use mkblog_core::schema::FieldType;
//! use mkblog_core::schema::Schema;
//! use mkblog_core::schema::Shape;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Post {
//! 	title: String,
//! 	tags: Option<Vec<String>>,
//! }
//!
//! let shape = Shape::<Post>::new()
//! 	.field("title", FieldType::String)
//! 	.optional("tags", FieldType::array(FieldType::String));
//! let post = shape
//! 	.validate(serde_json::json!({ "title": "Hello", "draft": true }))
//! 	.unwrap();
//! assert_eq!(post.title, "Hello");
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde_json::Map;
use serde_json::Value;

use crate::FieldError;
use crate::MkblogError;
use crate::ValidationErrors;

/// Validates a decoded metadata record and binds it to a typed result.
pub trait Schema: Send + Sync {
	type Output;

	/// Validate `record`, reporting every failing field rather than stopping
	/// at the first.
	fn validate(&self, record: Value) -> Result<Self::Output, ValidationErrors>;
}

/// The expected type of one metadata field.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FieldType {
	String,
	/// Any number, integer or not.
	Number,
	Integer,
	Boolean,
	/// Any value, accepted unchecked.
	Any,
	Array(Box<FieldType>),
	Object(Fields),
}

impl FieldType {
	pub fn array(items: FieldType) -> Self {
		Self::Array(Box::new(items))
	}

	/// A nested object with the fields of `shape`.
	pub fn object<T>(shape: Shape<T>) -> Self {
		Self::Object(shape.fields)
	}

	/// Check `value`, pushing one error per mismatch and returning the value
	/// with unknown object keys removed.
	fn check(&self, path: &str, value: Value, errors: &mut ValidationErrors) -> Value {
		match (self, value) {
			(Self::Any, value) => value,
			(Self::String, value @ Value::String(_))
			| (Self::Boolean, value @ Value::Bool(_))
			| (Self::Number, value @ Value::Number(_)) => value,
			(Self::Integer, Value::Number(number)) if number.is_i64() || number.is_u64() => {
				Value::Number(number)
			}
			(Self::Integer, Value::Number(number)) => {
				errors.push(FieldError::new(
					path,
					format!("expected integer, received {number}"),
				));
				Value::Number(number)
			}
			(Self::Array(items), Value::Array(values)) => {
				Value::Array(
					values
						.into_iter()
						.enumerate()
						.map(|(index, item)| items.check(&format!("{path}[{index}]"), item, errors))
						.collect(),
				)
			}
			(Self::Object(fields), Value::Object(map)) => {
				Value::Object(fields.check(path, map, errors))
			}
			(expected, value) => {
				errors.push(FieldError::new(
					path,
					format!("expected {expected}, received {}", describe(&value)),
				));
				value
			}
		}
	}
}

impl fmt::Display for FieldType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::String => f.write_str("string"),
			Self::Number => f.write_str("number"),
			Self::Integer => f.write_str("integer"),
			Self::Boolean => f.write_str("boolean"),
			Self::Any => f.write_str("any"),
			Self::Array(items) => write!(f, "{items}[]"),
			Self::Object(_) => f.write_str("object"),
		}
	}
}

/// Parses the compact type spec used in config files: a base name
/// (`string`, `number`, `integer`, `boolean`, `any`) followed by any number
/// of `[]` array suffixes.
impl FromStr for FieldType {
	type Err = MkblogError;

	fn from_str(spec: &str) -> Result<Self, Self::Err> {
		let spec = spec.trim();
		if let Some(items) = spec.strip_suffix("[]") {
			return Ok(Self::array(items.parse()?));
		}

		match spec {
			"string" => Ok(Self::String),
			"number" => Ok(Self::Number),
			"integer" => Ok(Self::Integer),
			"boolean" | "bool" => Ok(Self::Boolean),
			"any" => Ok(Self::Any),
			_ => Err(MkblogError::InvalidFieldType(spec.to_string())),
		}
	}
}

/// A declared field: its type and whether it must be present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
	pub ty: FieldType,
	pub required: bool,
}

impl Field {
	pub fn required(ty: FieldType) -> Self {
		Self { ty, required: true }
	}

	pub fn optional(ty: FieldType) -> Self {
		Self {
			ty,
			required: false,
		}
	}
}

/// Parses a [`FieldType`] spec with an optional trailing `?` marking the
/// field as optional, e.g. `string[]?`.
impl FromStr for Field {
	type Err = MkblogError;

	fn from_str(spec: &str) -> Result<Self, Self::Err> {
		let spec = spec.trim();
		match spec.strip_suffix('?') {
			Some(ty) => Ok(Self::optional(ty.parse()?)),
			None => Ok(Self::required(spec.parse()?)),
		}
	}
}

/// Ordered field declarations of an object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(Vec<(String, Field)>);

impl Fields {
	fn insert(&mut self, name: String, field: Field) {
		match self.0.iter_mut().find(|(key, _)| *key == name) {
			Some((_, existing)) => *existing = field,
			None => self.0.push((name, field)),
		}
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &Field)> {
		self.0.iter().map(|(name, field)| (name.as_str(), field))
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	fn check(&self, path: &str, mut map: Map<String, Value>, errors: &mut ValidationErrors) -> Map<String, Value> {
		let mut output = Map::new();

		for (name, field) in &self.0 {
			let field_path = if path.is_empty() {
				name.clone()
			} else {
				format!("{path}.{name}")
			};

			match map.remove(name) {
				Some(value) => {
					output.insert(name.clone(), field.ty.check(&field_path, value, errors));
				}
				None if field.required => {
					errors.push(FieldError::new(field_path, format!("required {}", field.ty)));
				}
				None => {}
			}
		}

		output
	}
}

/// A declarative object shape bound to the result type `T`.
///
/// Unknown keys are stripped before the record is converted into `T`.
pub struct Shape<T = Value> {
	fields: Fields,
	marker: PhantomData<fn() -> T>,
}

impl<T> Shape<T> {
	pub fn new() -> Self {
		Self {
			fields: Fields::default(),
			marker: PhantomData,
		}
	}

	/// Declare a required field.
	#[must_use]
	pub fn field(self, name: impl Into<String>, ty: FieldType) -> Self {
		self.with(name, Field::required(ty))
	}

	/// Declare a field that may be absent.
	#[must_use]
	pub fn optional(self, name: impl Into<String>, ty: FieldType) -> Self {
		self.with(name, Field::optional(ty))
	}

	/// Declare a field. A later declaration of the same name replaces the
	/// earlier one.
	#[must_use]
	pub fn with(mut self, name: impl Into<String>, field: Field) -> Self {
		self.fields.insert(name.into(), field);
		self
	}

	pub fn fields(&self) -> &Fields {
		&self.fields
	}

	/// The same fields bound to a different result type.
	pub fn bind<U>(self) -> Shape<U> {
		Shape {
			fields: self.fields,
			marker: PhantomData,
		}
	}
}

impl<T> Default for Shape<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> Clone for Shape<T> {
	fn clone(&self) -> Self {
		Self {
			fields: self.fields.clone(),
			marker: PhantomData,
		}
	}
}

impl<T> fmt::Debug for Shape<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Shape").field("fields", &self.fields).finish()
	}
}

impl<T> Schema for Shape<T>
where
	T: DeserializeOwned,
{
	type Output = T;

	fn validate(&self, record: Value) -> Result<T, ValidationErrors> {
		let Value::Object(map) = record else {
			return Err(FieldError::root(format!("expected object, received {}", describe(&record))).into());
		};

		let mut errors = ValidationErrors::new();
		let output = self.fields.check("", map, &mut errors);
		if !errors.is_empty() {
			return Err(errors);
		}

		serde_json::from_value(Value::Object(output)).map_err(|e| FieldError::root(e.to_string()).into())
	}
}

fn describe(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "boolean",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}

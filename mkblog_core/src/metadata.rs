use markdown::mdast::Node;
use serde_json::Value;

use crate::FieldError;
use crate::MkblogError;
use crate::MkblogResult;
use crate::parser::Frontmatter;
use crate::parser::find_frontmatter;
use crate::schema::Schema;

/// Decode the raw text of a frontmatter block into an untyped record.
///
/// Malformed text is reported as [`MkblogError::MetadataInvalid`] with a
/// single root-level error, the same failure a shape mismatch produces.
pub fn decode_frontmatter(frontmatter: Frontmatter<'_>) -> MkblogResult<Value> {
	let decoded = match frontmatter {
		Frontmatter::Yaml(text) => serde_yaml_ng::from_str::<Value>(text).map_err(|e| e.to_string()),
		Frontmatter::Toml(text) => {
			toml::from_str::<toml::Table>(text)
				.map_err(|e| e.to_string())
				.and_then(|table| toml_to_json(toml::Value::Table(table)))
		}
	};

	decoded.map_err(|reason| MkblogError::MetadataInvalid(FieldError::root(reason).into()))
}

/// Locate the frontmatter of `ast`, decode it and validate it against
/// `schema`.
pub fn extract_metadata<S>(ast: &Node, schema: &S) -> MkblogResult<S::Output>
where
	S: Schema + ?Sized,
{
	let frontmatter = find_frontmatter(ast).ok_or(MkblogError::MetadataNotFound)?;
	// An empty block decodes to null and is rejected by object shapes.
	let record = decode_frontmatter(frontmatter)?;

	schema.validate(record).map_err(MkblogError::MetadataInvalid)
}

/// Convert a `toml::Value` to a `serde_json::Value`. Datetimes have no JSON
/// counterpart and become their RFC 3339 string.
fn toml_to_json(value: toml::Value) -> Result<Value, String> {
	let json = match value {
		toml::Value::String(s) => Value::String(s),
		toml::Value::Integer(i) => Value::Number(i.into()),
		toml::Value::Float(f) => {
			Value::Number(
				serde_json::Number::from_f64(f)
					.ok_or_else(|| format!("cannot represent float `{f}` as a number"))?,
			)
		}
		toml::Value::Boolean(b) => Value::Bool(b),
		toml::Value::Datetime(dt) => Value::String(dt.to_string()),
		toml::Value::Array(arr) => {
			Value::Array(
				arr.into_iter()
					.map(toml_to_json)
					.collect::<Result<Vec<_>, _>>()?,
			)
		}
		toml::Value::Table(table) => {
			let mut map = serde_json::Map::new();
			for (k, v) in table {
				map.insert(k, toml_to_json(v)?);
			}
			Value::Object(map)
		}
	};

	Ok(json)
}

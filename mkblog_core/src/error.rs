use std::fmt;
use std::path::PathBuf;

use derive_more::Deref;
use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum MkblogError {
	#[error(transparent)]
	#[diagnostic(code(mkblog::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to read source file `{}`", .path.display())]
	#[diagnostic(
		code(mkblog::source_not_found),
		help("check that the file still exists and is readable")
	)]
	SourceNotFound {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failure to load markdown: {0}")]
	#[diagnostic(code(mkblog::markdown))]
	Markdown(String),

	#[error("metadata not found")]
	#[diagnostic(
		code(mkblog::metadata_not_found),
		help("add a `---` fenced frontmatter block at the very start of the document")
	)]
	MetadataNotFound,

	#[error("invalid metadata: {0}")]
	#[diagnostic(code(mkblog::metadata_invalid))]
	MetadataInvalid(ValidationErrors),

	#[error("invalid glob pattern `{pattern}`: {reason}")]
	#[diagnostic(code(mkblog::invalid_pattern))]
	InvalidPattern { pattern: String, reason: String },

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(mkblog::config_parse),
		help("check that mkblog.toml is valid TOML with an `include` entry")
	)]
	ConfigParse(String),

	#[error("unknown slug strategy: `{0}`")]
	#[diagnostic(
		code(mkblog::unknown_slug_strategy),
		help("available strategies: removeExtension, hashing, mix")
	)]
	UnknownSlugStrategy(String),

	#[error("invalid field type: `{0}`")]
	#[diagnostic(
		code(mkblog::invalid_field_type),
		help("use string, number, integer, boolean or any, optionally suffixed with `[]` or `?`")
	)]
	InvalidFieldType(String),

	#[error("extension `{name}` failed: {reason}")]
	#[diagnostic(code(mkblog::extension))]
	Extension { name: String, reason: String },
}

impl MkblogError {
	/// Build an [`MkblogError::Extension`] from any displayable reason.
	pub fn extension(name: impl Into<String>, reason: impl fmt::Display) -> Self {
		Self::Extension {
			name: name.into(),
			reason: reason.to_string(),
		}
	}
}

/// A single metadata field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
	/// Dotted path to the field, e.g. `author.name` or `tags[1]`. Empty for
	/// the record itself.
	pub path: String,
	pub message: String,
}

impl FieldError {
	pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			message: message.into(),
		}
	}

	/// An error about the whole record rather than one of its fields.
	pub fn root(message: impl Into<String>) -> Self {
		Self::new("", message)
	}
}

impl fmt::Display for FieldError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.path.is_empty() {
			write!(f, "{}", self.message)
		} else {
			write!(f, "`{}`: {}", self.path, self.message)
		}
	}
}

/// Every field error found while validating one metadata record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref, Serialize)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, error: FieldError) {
		self.0.push(error);
	}

	pub fn into_inner(self) -> Vec<FieldError> {
		self.0
	}
}

impl From<Vec<FieldError>> for ValidationErrors {
	fn from(errors: Vec<FieldError>) -> Self {
		Self(errors)
	}
}

impl From<FieldError> for ValidationErrors {
	fn from(error: FieldError) -> Self {
		Self(vec![error])
	}
}

impl fmt::Display for ValidationErrors {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (index, error) in self.0.iter().enumerate() {
			if index > 0 {
				f.write_str("; ")?;
			}
			write!(f, "{error}")?;
		}
		Ok(())
	}
}

pub type MkblogResult<T> = Result<T, MkblogError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;

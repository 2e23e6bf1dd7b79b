//! Slug strategies mapping a file identifier to a short, stable string.
//!
//! The file identifier is the path of a matched file relative to the
//! collection root, exactly as the include pattern produced it (so a pattern
//! written as `./posts/*.md` yields identifiers starting with `./`).

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use crate::MkblogError;

/// A caller-supplied slug function.
pub type SlugFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// How a collection derives each document's slug from its file identifier.
#[derive(Clone, Default)]
#[non_exhaustive]
pub enum SlugStrategy {
	/// The file name without its final extension. This is the default.
	#[default]
	RemoveExtension,
	/// A stable non-cryptographic hash of the identifier, base-36 encoded.
	Hashing,
	/// `{remove_extension}-{hashing}`.
	Mix,
	/// Any caller-supplied function.
	Custom(SlugFn),
}

impl SlugStrategy {
	/// Wrap a closure as a custom strategy.
	pub fn custom(slug: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
		Self::Custom(Arc::new(slug))
	}

	/// Compute the slug for a file identifier.
	pub fn apply(&self, identifier: &str) -> String {
		match self {
			Self::RemoveExtension => remove_extension(identifier),
			Self::Hashing => hashing(identifier),
			Self::Mix => mix(identifier),
			Self::Custom(slug) => slug(identifier),
		}
	}
}

impl fmt::Debug for SlugStrategy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::RemoveExtension => f.write_str("RemoveExtension"),
			Self::Hashing => f.write_str("Hashing"),
			Self::Mix => f.write_str("Mix"),
			Self::Custom(_) => f.write_str("Custom(..)"),
		}
	}
}

impl FromStr for SlugStrategy {
	type Err = MkblogError;

	fn from_str(name: &str) -> Result<Self, Self::Err> {
		match name {
			"removeExtension" | "remove_extension" | "remove-extension" => Ok(Self::RemoveExtension),
			"hashing" => Ok(Self::Hashing),
			"mix" => Ok(Self::Mix),
			_ => Err(MkblogError::UnknownSlugStrategy(name.to_string())),
		}
	}
}

/// The file name of `identifier` with its final extension removed.
///
/// Only the last `.ext` is stripped, so `archive.tar.gz` becomes
/// `archive.tar`. Leading dots are kept (`.draft` stays `.draft`).
pub fn remove_extension(identifier: &str) -> String {
	Path::new(identifier)
		.file_stem()
		.map(|stem| stem.to_string_lossy().into_owned())
		.unwrap_or_default()
}

/// A stable base-36 hash of `identifier`.
///
/// Uses the 53-bit cyrb53 hash over UTF-16 code units so that the output is
/// identical to slugs generated by other implementations of the same scheme.
pub fn hashing(identifier: &str) -> String {
	to_base36(cyrb53(identifier, 0))
}

/// `{remove_extension}-{hashing}`.
pub fn mix(identifier: &str) -> String {
	format!("{}-{}", remove_extension(identifier), hashing(identifier))
}

fn cyrb53(value: &str, seed: u32) -> u64 {
	let mut h1: u32 = 0xdead_beef ^ seed;
	let mut h2: u32 = 0x41c6_ce57 ^ seed;

	for unit in value.encode_utf16() {
		let unit = u32::from(unit);
		h1 = (h1 ^ unit).wrapping_mul(2_654_435_761);
		h2 = (h2 ^ unit).wrapping_mul(1_597_334_677);
	}

	h1 = (h1 ^ (h1 >> 16)).wrapping_mul(2_246_822_507);
	h1 ^= (h2 ^ (h2 >> 13)).wrapping_mul(3_266_489_909);
	h2 = (h2 ^ (h2 >> 16)).wrapping_mul(2_246_822_507);
	h2 ^= (h1 ^ (h1 >> 13)).wrapping_mul(3_266_489_909);

	(u64::from(h2 & 0x001f_ffff) << 32) | u64::from(h1)
}

fn to_base36(mut value: u64) -> String {
	const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

	if value == 0 {
		return "0".to_string();
	}

	let mut digits = Vec::with_capacity(11);
	while value > 0 {
		digits.push(DIGITS[(value % 36) as usize]);
		value /= 36;
	}
	digits.reverse();

	String::from_utf8_lossy(&digits).into_owned()
}

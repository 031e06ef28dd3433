//! Package manifest parsing.
//!
//! A language package carries a `package.json` whose `tree-sitter` field
//! lists the grammars it provides:
//!
//! ```json
//! {
//!   "name": "language-javascript",
//!   "tree-sitter": [
//!     {
//!       "scope": "source.js",
//!       "file-types": ["js", "mjs"],
//!       "path": "./grammars/javascript",
//!       "highlights": ["queries/highlights.scm"],
//!       "locals": ["queries/locals.scm"],
//!       "injections": "queries/injections.scm",
//!       "injection-regex": "^(js|javascript)$"
//!     }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

use crate::error::{InvalidPackage, ManifestIssue, PackageError};

/// File name of the manifest inside a package directory.
pub const MANIFEST_FILE: &str = "package.json";

/// Manifest field holding the grammar list.
pub const GRAMMARS_FIELD: &str = "tree-sitter";

/// One grammar declared by a package.
///
/// Only `file_types` and `path` drive registry construction; the query and
/// injection fields are parsed for callers but otherwise unused.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GrammarSpec {
	/// Highlighting scope name (e.g., "source.js").
	pub scope: String,
	/// File-type identifiers the grammar applies to.
	#[serde(rename = "file-types")]
	pub file_types: Vec<String>,
	/// Grammar module path, relative to the search roots.
	pub path: String,
	/// Highlight query files.
	#[serde(default, deserialize_with = "one_or_many")]
	pub highlights: Vec<String>,
	/// Locals query files.
	#[serde(default, deserialize_with = "one_or_many")]
	pub locals: Vec<String>,
	/// Injection query file.
	#[serde(default)]
	pub injections: String,
	#[serde(rename = "injection-regex")]
	pub injection_regex: Option<String>,
	#[serde(rename = "content-regex")]
	pub content_regex: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
	One(String),
	Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(match OneOrMany::deserialize(deserializer)? {
		OneOrMany::One(path) => vec![path],
		OneOrMany::Many(paths) => paths,
	})
}

/// Reads the grammar list from `package_dir/package.json`.
///
/// An unreadable file, malformed JSON and a missing grammar list are all
/// reported as [`PackageError::Invalid`].
pub fn read_grammar_specs(package_dir: &Path, name: &str) -> Result<Vec<GrammarSpec>, PackageError> {
	let manifest = package_dir.join(MANIFEST_FILE);
	let text = std::fs::read_to_string(&manifest).map_err(|e| reject(name, ManifestIssue::NotFound(e)))?;
	parse_grammar_specs(&text, name)
}

/// Extracts the grammar list from manifest text.
pub fn parse_grammar_specs(text: &str, name: &str) -> Result<Vec<GrammarSpec>, PackageError> {
	let mut doc: Value = serde_json::from_str(text).map_err(|e| reject(name, ManifestIssue::Parse(e)))?;

	let grammars = match doc.get_mut(GRAMMARS_FIELD).map(Value::take) {
		Some(grammars @ Value::Array(_)) => grammars,
		_ => return Err(reject(name, ManifestIssue::MissingField)),
	};

	serde_json::from_value(grammars).map_err(|e| reject(name, ManifestIssue::Parse(e)))
}

fn reject(name: &str, cause: ManifestIssue) -> PackageError {
	warn!(package = name, cause = %cause, "Rejected language package manifest");
	InvalidPackage::new(name, cause).into()
}

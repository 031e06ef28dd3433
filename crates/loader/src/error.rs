//! Error types for package loading.
//!
//! Callers see three failure kinds: the package could not be found, the
//! package is not a valid language package, or one of its grammars failed to
//! resolve or load. Manifest problems are reported as a single kind; the
//! underlying cause is kept as the error source for logging.

use thiserror::Error;

use crate::grammar::GrammarError;

/// Errors produced while locating a package or building its registry.
#[derive(Debug, Error)]
pub enum PackageError {
	/// No search root contains a directory with the package name.
	#[error("could not find package: {0}")]
	NotFound(String),

	/// The package manifest is missing, unparsable, or has no grammar list.
	#[error(transparent)]
	Invalid(#[from] InvalidPackage),

	/// A grammar declared by the package failed to resolve or load.
	#[error(transparent)]
	Grammar(#[from] GrammarError),
}

/// Result type for package operations.
pub type Result<T> = std::result::Result<T, PackageError>;

/// A package whose manifest could not be used.
#[derive(Debug, Error)]
#[error("package {name} is not a valid language package")]
pub struct InvalidPackage {
	name: String,
	#[source]
	cause: ManifestIssue,
}

impl InvalidPackage {
	pub(crate) fn new(name: impl Into<String>, cause: ManifestIssue) -> Self {
		Self {
			name: name.into(),
			cause,
		}
	}

	/// Name of the rejected package.
	pub fn package_name(&self) -> &str {
		&self.name
	}

	/// Underlying reason the manifest was rejected.
	pub fn cause(&self) -> &ManifestIssue {
		&self.cause
	}
}

/// Why a manifest was rejected.
#[derive(Debug, Error)]
pub enum ManifestIssue {
	/// The manifest file could not be read.
	#[error("manifest unreadable: {0}")]
	NotFound(#[source] std::io::Error),

	/// The manifest is not valid JSON or a grammar entry has the wrong shape.
	#[error("manifest unparsable: {0}")]
	Parse(#[source] serde_json::Error),

	/// The manifest has no grammar list, or it is not an array.
	#[error("manifest has no `tree-sitter` grammar list")]
	MissingField,
}

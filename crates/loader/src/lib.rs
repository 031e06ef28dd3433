// Library code reports through tracing; embedding applications own stderr.
#![deny(clippy::print_stderr)]

//! Language package loading.
//!
//! A language package is a directory holding a `package.json` manifest whose
//! `tree-sitter` field lists grammars, each with the file types it handles and
//! the path of its compiled parser. This crate finds such a package and
//! builds a [`LanguageRegistry`] mapping every declared file type to its
//! loaded grammar.
//!
//! # Architecture
//!
//! * [`roots`]: Ordered candidate roots for packages and grammar modules
//! * [`locate`]: First-match package directory lookup
//! * [`manifest`]: Manifest parsing and validation
//! * [`grammar`]: Grammar path resolution and shared-library loading
//! * [`registry`]: Registry construction
//!
//! # Usage
//!
//! ```no_run
//! use langpack_loader::{LibraryLoader, SearchRoots, load_languages_from_package};
//!
//! let roots = SearchRoots::merge(["/usr/share/langpack/packages"], ["./packages"]);
//! let registry = load_languages_from_package("language-javascript", &roots, &LibraryLoader)?;
//! if let Some(js) = registry.get("js") {
//!     assert!(js.scope_mappings.is_none());
//! }
//! # Ok::<(), langpack_loader::PackageError>(())
//! ```

pub mod error;
pub mod grammar;
pub mod locate;
pub mod manifest;
pub mod registry;
pub mod roots;

pub use error::{InvalidPackage, ManifestIssue, PackageError, Result};
pub use grammar::{GrammarError, GrammarLoader, LibraryLoader, grammar_library_name, grammar_name, resolve_grammar_path};
pub use locate::locate_package;
pub use manifest::{GrammarSpec, parse_grammar_specs, read_grammar_specs};
pub use registry::{
	LanguageRegistry, PreparedLanguage, ScopeMappings, build_registry, load_languages, load_languages_from_package,
};
pub use roots::SearchRoots;

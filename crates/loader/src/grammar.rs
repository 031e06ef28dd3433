//! Grammar module resolution and loading.
//!
//! Grammars are compiled tree-sitter parsers shipped as shared libraries
//! inside language packages. A manifest names each grammar by a path relative
//! to the search roots; this module turns that path into a library file and
//! hands it to a [`GrammarLoader`].

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::debug;
use tree_sitter::Grammar;

use crate::roots::SearchRoots;

/// Errors that can occur when resolving or loading a grammar.
#[derive(Error, Debug)]
pub enum GrammarError {
	/// Grammar path did not resolve against any search root.
	#[error("grammar not found: {0}")]
	NotFound(String),

	/// Failed to load the grammar module.
	#[error("failed to load grammar library: {0}")]
	LoadError(String),

	/// Filesystem I/O error.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
}

/// Loads a grammar module from a resolved path.
///
/// The loaded value is opaque to the registry builder. Closures and plain
/// functions of the form `Fn(&str, &Path) -> Result<G, GrammarError>` are
/// loaders too.
pub trait GrammarLoader {
	/// The loaded grammar handle.
	type Grammar;

	/// Loads the grammar `name` from the library at `path`.
	fn load(&self, name: &str, path: &Path) -> Result<Self::Grammar, GrammarError>;
}

impl<F, G> GrammarLoader for F
where
	F: Fn(&str, &Path) -> Result<G, GrammarError>,
{
	type Grammar = G;

	fn load(&self, name: &str, path: &Path) -> Result<G, GrammarError> {
		self(name, path)
	}
}

/// Loads tree-sitter grammars from shared libraries.
///
/// Libraries are opened once per process; loading the same path again returns
/// the grammar that is already resident.
#[derive(Debug, Default, Clone, Copy)]
pub struct LibraryLoader;

static LOADED_GRAMMARS: LazyLock<GrammarCache<Grammar>> = LazyLock::new(GrammarCache::default);

impl GrammarLoader for LibraryLoader {
	type Grammar = Grammar;

	fn load(&self, name: &str, path: &Path) -> Result<Grammar, GrammarError> {
		LOADED_GRAMMARS.get_or_load(name, path, load_grammar_from_path)
	}
}

/// Loaded grammars keyed by canonical library path.
struct GrammarCache<G> {
	loaded: Mutex<HashMap<PathBuf, G>>,
}

impl<G> Default for GrammarCache<G> {
	fn default() -> Self {
		Self {
			loaded: Mutex::new(HashMap::new()),
		}
	}
}

impl<G: Clone> GrammarCache<G> {
	/// Returns the resident grammar for `path`, loading it on first use.
	///
	/// Failed loads are not cached.
	fn get_or_load<F>(&self, name: &str, path: &Path, load: F) -> Result<G, GrammarError>
	where
		F: FnOnce(&Path, &str) -> Result<G, GrammarError>,
	{
		let key = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
		let mut loaded = self.loaded.lock();

		if let Some(grammar) = loaded.get(&key) {
			debug!(grammar = name, path = %key.display(), "Reusing loaded grammar");
			return Ok(grammar.clone());
		}

		let grammar = load(&key, name)?;
		debug!(grammar = name, path = %key.display(), "Loaded grammar library");
		loaded.insert(key, grammar.clone());
		Ok(grammar)
	}
}

/// Loads a grammar from a specific library path.
fn load_grammar_from_path(path: &Path, name: &str) -> Result<Grammar, GrammarError> {
	// SAFETY: Loading a tree-sitter grammar from a dynamic library.
	unsafe { Grammar::new(name, path).map_err(|e| GrammarError::LoadError(format!("{}: {}", path.display(), e))) }
}

/// Resolves a manifest grammar path to a library file.
///
/// Absolute paths are used directly. Relative paths are joined onto each root
/// in order and the first existing candidate wins. For each base path the
/// candidates are the path itself, the path with the platform library
/// extension, and the platform library named after the directory inside it.
pub fn resolve_grammar_path(spec_path: &str, roots: &SearchRoots) -> Result<PathBuf, GrammarError> {
	let path = Path::new(spec_path);

	let resolved = if path.is_absolute() {
		library_candidate(path)
	} else {
		roots.iter().find_map(|root| library_candidate(&root.join(path)))
	};

	resolved.ok_or_else(|| GrammarError::NotFound(spec_path.to_string()))
}

fn library_candidate(base: &Path) -> Option<PathBuf> {
	let base: PathBuf = base.components().collect();

	if base.is_file() {
		return Some(base);
	}

	let with_extension = append_extension(&base, std::env::consts::DLL_EXTENSION);
	if with_extension.is_file() {
		return Some(with_extension);
	}

	if base.is_dir() {
		let dir_name = base.file_name()?.to_str()?;
		let library = base.join(grammar_library_name(strip_grammar_prefix(dir_name)));
		if library.is_file() {
			return Some(library);
		}
	}

	None
}

fn append_extension(path: &Path, extension: &str) -> PathBuf {
	let mut name = OsString::from(path.as_os_str());
	name.push(".");
	name.push(extension);
	PathBuf::from(name)
}

/// Derives the grammar name from a resolved library path.
///
/// `libjavascript.so`, `javascript.dll` and `tree-sitter-javascript.so` all
/// yield `javascript`. The library loader maps `-` to `_` when looking up the
/// language symbol.
pub fn grammar_name(path: &Path) -> String {
	let stem = path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
	let stem = stem.strip_prefix("lib").unwrap_or(&stem);
	strip_grammar_prefix(stem).to_string()
}

fn strip_grammar_prefix(name: &str) -> &str {
	name.strip_prefix("tree-sitter-")
		.or_else(|| name.strip_prefix("tree_sitter_"))
		.unwrap_or(name)
}

/// Returns the platform-specific library filename for a grammar.
pub fn grammar_library_name(name: &str) -> String {
	let safe_name = name.replace('-', "_");
	#[cfg(target_os = "macos")]
	{
		format!("lib{safe_name}.dylib")
	}
	#[cfg(target_os = "windows")]
	{
		format!("{safe_name}.dll")
	}
	#[cfg(not(any(target_os = "macos", target_os = "windows")))]
	{
		format!("lib{safe_name}.so")
	}
}

//! File-type to grammar registry construction.

use std::collections::HashMap;
use std::collections::hash_map;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};
use tree_sitter::Grammar;

use crate::error::Result;
use crate::grammar::{GrammarLoader, LibraryLoader, grammar_name, resolve_grammar_path};
use crate::locate::locate_package;
use crate::manifest::read_grammar_specs;
use crate::roots::SearchRoots;

/// Selector to highlight class table (e.g., `"class > identifier"` to
/// `"entity.name.type.class"`).
pub type ScopeMappings = HashMap<String, String>;

/// A grammar ready for use by a parser, keyed by file type in a
/// [`LanguageRegistry`].
#[derive(Debug)]
pub struct PreparedLanguage<G> {
	/// The loaded grammar, shared by every file type its spec declares.
	pub grammar: Arc<G>,
	/// Always `None`: manifests do not yet supply scope mappings.
	pub scope_mappings: Option<ScopeMappings>,
}

impl<G> PreparedLanguage<G> {
	fn new(grammar: Arc<G>) -> Self {
		Self {
			grammar,
			scope_mappings: None,
		}
	}
}

impl<G> Clone for PreparedLanguage<G> {
	fn clone(&self) -> Self {
		Self {
			grammar: Arc::clone(&self.grammar),
			scope_mappings: self.scope_mappings.clone(),
		}
	}
}

/// Mapping from file-type identifier to prepared language.
#[derive(Debug)]
pub struct LanguageRegistry<G = Grammar> {
	languages: HashMap<String, PreparedLanguage<G>>,
}

impl<G> Default for LanguageRegistry<G> {
	fn default() -> Self {
		Self {
			languages: HashMap::new(),
		}
	}
}

impl<G> LanguageRegistry<G> {
	/// Inserts an entry, returning the one it replaced.
	fn insert(&mut self, file_type: String, language: PreparedLanguage<G>) -> Option<PreparedLanguage<G>> {
		self.languages.insert(file_type, language)
	}

	/// Returns the language registered for a file type.
	pub fn get(&self, file_type: &str) -> Option<&PreparedLanguage<G>> {
		self.languages.get(file_type)
	}

	pub fn contains(&self, file_type: &str) -> bool {
		self.languages.contains_key(file_type)
	}

	pub fn len(&self) -> usize {
		self.languages.len()
	}

	pub fn is_empty(&self) -> bool {
		self.languages.is_empty()
	}

	/// Registered file types, in arbitrary order.
	pub fn file_types(&self) -> impl Iterator<Item = &str> {
		self.languages.keys().map(String::as_str)
	}

	pub fn iter(&self) -> hash_map::Iter<'_, String, PreparedLanguage<G>> {
		self.languages.iter()
	}

	/// Consumes the registry, returning the underlying map.
	pub fn into_inner(self) -> HashMap<String, PreparedLanguage<G>> {
		self.languages
	}
}

impl<G> IntoIterator for LanguageRegistry<G> {
	type Item = (String, PreparedLanguage<G>);
	type IntoIter = hash_map::IntoIter<String, PreparedLanguage<G>>;

	fn into_iter(self) -> Self::IntoIter {
		self.languages.into_iter()
	}
}

impl<'a, G> IntoIterator for &'a LanguageRegistry<G> {
	type Item = (&'a String, &'a PreparedLanguage<G>);
	type IntoIter = hash_map::Iter<'a, String, PreparedLanguage<G>>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

/// Builds the registry for the package at `package_dir`.
///
/// Specs are processed in manifest order and file types in declared order.
/// A file type declared again replaces the earlier entry. The first grammar
/// that fails to resolve or load aborts the build.
pub fn build_registry<L>(
	package_dir: &Path,
	name: &str,
	roots: &SearchRoots,
	loader: &L,
) -> Result<LanguageRegistry<L::Grammar>>
where
	L: GrammarLoader,
{
	let specs = read_grammar_specs(package_dir, name)?;
	let mut registry = LanguageRegistry::default();

	for spec in specs {
		let path = resolve_grammar_path(&spec.path, roots)?;
		let grammar = Arc::new(loader.load(&grammar_name(&path), &path)?);

		for file_type in spec.file_types {
			let replaced = registry.insert(file_type.clone(), PreparedLanguage::new(Arc::clone(&grammar)));
			debug!(
				package = name,
				file_type = %file_type,
				scope = %spec.scope,
				replaced = replaced.is_some(),
				"Registered grammar"
			);
		}
	}

	info!(package = name, languages = registry.len(), "Built language registry");
	Ok(registry)
}

/// Locates `name` under `roots` and builds its registry.
pub fn load_languages_from_package<L>(
	name: &str,
	roots: &SearchRoots,
	loader: &L,
) -> Result<LanguageRegistry<L::Grammar>>
where
	L: GrammarLoader,
{
	let package_dir = locate_package(name, roots)?;
	build_registry(&package_dir, name, roots, loader)
}

/// Loads a package using the environment search roots and shared-library
/// grammars.
pub fn load_languages(name: &str) -> Result<LanguageRegistry> {
	load_languages_from_package(name, &SearchRoots::from_env(), &LibraryLoader)
}

#![allow(unused_crate_dependencies)]

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use langpack_loader::{
	GrammarError, GrammarLoader, ManifestIssue, PackageError, SearchRoots, load_languages_from_package,
	locate_package,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

/// Grammar stand-in: the contents of the resolved module file.
#[derive(Debug, PartialEq, Eq)]
struct FakeGrammar {
	name: String,
	body: String,
}

/// Reads module files as grammars and records every load.
#[derive(Default)]
struct FakeLoader {
	loads: RefCell<Vec<PathBuf>>,
}

impl GrammarLoader for FakeLoader {
	type Grammar = FakeGrammar;

	fn load(&self, name: &str, path: &Path) -> Result<FakeGrammar, GrammarError> {
		self.loads.borrow_mut().push(path.to_path_buf());
		let body = fs::read_to_string(path)?;
		if body.starts_with("broken") {
			return Err(GrammarError::LoadError(format!("{}: bad grammar", path.display())));
		}
		Ok(FakeGrammar {
			name: name.to_string(),
			body,
		})
	}
}

/// Writes `root/<name>/package.json` and the given module files under `root`.
fn write_package(root: &Path, name: &str, manifest: &str, modules: &[(&str, &str)]) {
	let dir = root.join(name);
	fs::create_dir_all(&dir).expect("must create package dir");
	fs::write(dir.join("package.json"), manifest).expect("must write manifest");
	for (path, body) in modules {
		let file = root.join(path);
		fs::create_dir_all(file.parent().expect("module has parent")).expect("must create module dir");
		fs::write(file, body).expect("must write module");
	}
}

fn tempdir() -> TempDir {
	tempfile::tempdir().expect("must create tempdir")
}

fn sorted_keys<G>(registry: &langpack_loader::LanguageRegistry<G>) -> Vec<&str> {
	let mut keys: Vec<_> = registry.file_types().collect();
	keys.sort_unstable();
	keys
}

#[test]
fn builds_registry_for_well_formed_package() {
	let root = tempdir();
	write_package(
		root.path(),
		"language-test",
		r#"{"tree-sitter": [
			{"scope": "source.foo", "file-types": ["foo"], "path": "./g1"},
			{"scope": "source.bar", "file-types": ["bar", "baz"], "path": "./g2"}
		]}"#,
		&[("g1", "grammar one"), ("g2", "grammar two")],
	);

	let roots = SearchRoots::new([root.path()]);
	let loader = FakeLoader::default();
	let registry = load_languages_from_package("language-test", &roots, &loader).expect("package loads");

	assert_eq!(sorted_keys(&registry), ["bar", "baz", "foo"]);

	let foo = registry.get("foo").expect("foo registered");
	assert_eq!(foo.grammar.body, "grammar one");
	assert_eq!(foo.grammar.name, "g1");

	let bar = registry.get("bar").expect("bar registered");
	let baz = registry.get("baz").expect("baz registered");
	assert_eq!(bar.grammar.body, "grammar two");
	assert!(Arc::ptr_eq(&bar.grammar, &baz.grammar));

	assert_eq!(*loader.loads.borrow(), [root.path().join("g1"), root.path().join("g2")]);
}

#[test]
fn host_root_package_shadows_default_root() {
	let default_root = tempdir();
	let host_root = tempdir();
	let manifest = r#"{"tree-sitter": [{"scope": "source.foo", "file-types": ["foo"], "path": "./g1"}]}"#;
	write_package(default_root.path(), "language-test", manifest, &[("g1", "from default")]);
	write_package(host_root.path(), "language-test", manifest, &[("g1", "from host")]);

	let roots = SearchRoots::merge([default_root.path()], [host_root.path()]);

	let located = locate_package("language-test", &roots).expect("package located");
	assert_eq!(located, host_root.path().join("language-test"));

	let registry = load_languages_from_package("language-test", &roots, &FakeLoader::default()).expect("package loads");
	assert_eq!(registry.get("foo").expect("foo registered").grammar.body, "from host");
}

#[test]
fn grammar_paths_resolve_across_all_roots() {
	let package_root = tempdir();
	let module_root = tempdir();
	write_package(
		package_root.path(),
		"language-test",
		r#"{"tree-sitter": [{"scope": "source.foo", "file-types": ["foo"], "path": "./shared/g1"}]}"#,
		&[],
	);
	fs::create_dir_all(module_root.path().join("shared")).expect("must create module dir");
	fs::write(module_root.path().join("shared/g1"), "shared grammar").expect("must write module");

	let roots = SearchRoots::new([package_root.path(), module_root.path()]);
	let registry = load_languages_from_package("language-test", &roots, &FakeLoader::default()).expect("package loads");
	assert_eq!(registry.get("foo").expect("foo registered").grammar.body, "shared grammar");
}

#[test]
fn later_spec_wins_for_repeated_file_type() {
	let root = tempdir();
	write_package(
		root.path(),
		"language-test",
		r#"{"tree-sitter": [
			{"scope": "source.js", "file-types": ["js", "jsx"], "path": "./g1"},
			{"scope": "source.jsx", "file-types": ["jsx"], "path": "./g2"}
		]}"#,
		&[("g1", "javascript"), ("g2", "jsx dialect")],
	);

	let roots = SearchRoots::new([root.path()]);
	let registry = load_languages_from_package("language-test", &roots, &FakeLoader::default()).expect("package loads");

	assert_eq!(registry.len(), 2);
	assert_eq!(registry.get("js").expect("js registered").grammar.body, "javascript");
	assert_eq!(registry.get("jsx").expect("jsx registered").grammar.body, "jsx dialect");
}

#[test]
fn missing_package_is_not_found() {
	let root = tempdir();
	let roots = SearchRoots::new([root.path()]);

	let err = load_languages_from_package("language-missing", &roots, &FakeLoader::default()).unwrap_err();
	assert!(matches!(err, PackageError::NotFound(ref name) if name == "language-missing"));
}

#[test]
fn manifest_without_grammar_list_is_invalid() {
	let root = tempdir();
	write_package(root.path(), "language-test", r#"{"name": "language-test"}"#, &[]);

	let roots = SearchRoots::new([root.path()]);
	let err = load_languages_from_package("language-test", &roots, &FakeLoader::default()).unwrap_err();

	let PackageError::Invalid(invalid) = &err else {
		panic!("expected invalid package, got {err:?}");
	};
	assert_eq!(invalid.package_name(), "language-test");
	assert!(matches!(invalid.cause(), ManifestIssue::MissingField));
	assert_eq!(err.to_string(), "package language-test is not a valid language package");
}

#[test]
fn package_without_manifest_is_invalid() {
	let root = tempdir();
	fs::create_dir(root.path().join("language-test")).expect("must create package dir");

	let roots = SearchRoots::new([root.path()]);
	let err = load_languages_from_package("language-test", &roots, &FakeLoader::default()).unwrap_err();
	assert!(matches!(err, PackageError::Invalid(ref invalid) if matches!(invalid.cause(), ManifestIssue::NotFound(_))));
}

#[test]
fn unresolvable_grammar_aborts_build() {
	let root = tempdir();
	write_package(
		root.path(),
		"language-test",
		r#"{"tree-sitter": [
			{"scope": "source.foo", "file-types": ["foo"], "path": "./g1"},
			{"scope": "source.bar", "file-types": ["bar"], "path": "./missing"}
		]}"#,
		&[("g1", "grammar one")],
	);

	let roots = SearchRoots::new([root.path()]);
	let loader = FakeLoader::default();
	let err = load_languages_from_package("language-test", &roots, &loader).unwrap_err();

	assert!(matches!(err, PackageError::Grammar(GrammarError::NotFound(ref path)) if path == "./missing"));
	assert_eq!(loader.loads.borrow().len(), 1);
}

#[test]
fn grammar_load_error_propagates_unmodified() {
	let root = tempdir();
	write_package(
		root.path(),
		"language-test",
		r#"{"tree-sitter": [
			{"scope": "source.foo", "file-types": ["foo"], "path": "./g1"},
			{"scope": "source.bar", "file-types": ["bar"], "path": "./g2"},
			{"scope": "source.baz", "file-types": ["baz"], "path": "./g3"}
		]}"#,
		&[("g1", "grammar one"), ("g2", "broken"), ("g3", "grammar three")],
	);

	let roots = SearchRoots::new([root.path()]);
	let loader = FakeLoader::default();
	let err = load_languages_from_package("language-test", &roots, &loader).unwrap_err();

	let expected = format!("{}: bad grammar", root.path().join("g2").display());
	assert!(matches!(err, PackageError::Grammar(GrammarError::LoadError(ref msg)) if *msg == expected));
	assert_eq!(loader.loads.borrow().len(), 2);
}

#[test]
fn scope_mappings_are_never_populated() {
	let root = tempdir();
	write_package(
		root.path(),
		"language-test",
		r#"{"tree-sitter": [{
			"scope": "source.foo",
			"file-types": ["foo", "foo2"],
			"path": "./g1",
			"highlights": ["queries/highlights.scm"],
			"locals": ["queries/locals.scm"],
			"injections": "queries/injections.scm",
			"injection-regex": "^foo$"
		}]}"#,
		&[("g1", "grammar one")],
	);

	let roots = SearchRoots::new([root.path()]);
	for _ in 0..2 {
		let registry =
			load_languages_from_package("language-test", &roots, &FakeLoader::default()).expect("package loads");
		assert!(registry.iter().all(|(_, language)| language.scope_mappings.is_none()));
	}
}

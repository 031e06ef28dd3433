//! Candidate search roots for packages and grammar modules.
//!
//! The same ordered list is used to find a package directory and to resolve
//! the grammar paths its manifest declares. Order is significant: the first
//! root containing a match wins.
//!
//! # Default roots
//!
//! [`SearchRoots::from_env`] merges two lists, with the host list taking
//! priority:
//!
//! * host: `LANGPACK_PATH` entries, then `packages/` lookup directories above
//!   the running executable
//! * default: `packages/` lookup directories above the working directory,
//!   then the user data directory (`~/.local/share/langpack/packages`)

use std::path::{Path, PathBuf};

/// Name of the lookup directory searched in every ancestor.
pub const PACKAGES_DIR: &str = "packages";

/// Environment variable holding extra high-priority roots.
pub const PATH_ENV: &str = "LANGPACK_PATH";

/// Ordered, deduplicated list of candidate root directories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchRoots {
	paths: Vec<PathBuf>,
}

impl SearchRoots {
	/// Creates a root list, dropping repeated entries after their first occurrence.
	pub fn new<I, P>(paths: I) -> Self
	where
		I: IntoIterator<Item = P>,
		P: Into<PathBuf>,
	{
		let mut roots = Vec::new();
		for path in paths {
			let path = path.into();
			if !roots.contains(&path) {
				roots.push(path);
			}
		}
		Self { paths: roots }
	}

	/// Merges the default roots with the hosting process roots.
	///
	/// Host roots are placed in front in their original relative order; any
	/// host root already present among the defaults keeps its default
	/// position.
	pub fn merge<D, H>(defaults: D, host: H) -> Self
	where
		D: IntoIterator,
		D::Item: Into<PathBuf>,
		H: IntoIterator,
		H::Item: Into<PathBuf>,
	{
		let mut roots = Self::new(defaults).paths;
		let host: Vec<PathBuf> = host.into_iter().map(Into::into).collect();

		for path in host.into_iter().rev() {
			if !roots.contains(&path) {
				roots.insert(0, path);
			}
		}

		Self { paths: roots }
	}

	/// Lookup directories named `dir_name` in `start` and each of its ancestors.
	///
	/// Ancestors that are themselves named `dir_name` are skipped so nested
	/// lookup directories do not produce `packages/packages` entries.
	pub fn ancestors(start: &Path, dir_name: &str) -> Self {
		Self::new(
			start
				.ancestors()
				.filter(|dir| dir.file_name().is_none_or(|name| name != dir_name))
				.map(|dir| dir.join(dir_name)),
		)
	}

	/// Builds the process default root list from the environment.
	pub fn from_env() -> Self {
		let mut host = Vec::new();
		if let Some(extra) = std::env::var_os(PATH_ENV) {
			host.extend(std::env::split_paths(&extra).filter(|p| !p.as_os_str().is_empty()));
		}
		if let Ok(exe) = std::env::current_exe()
			&& let Some(exe_dir) = exe.parent()
		{
			host.extend(Self::ancestors(exe_dir, PACKAGES_DIR).paths);
		}

		let mut defaults = Vec::new();
		if let Ok(cwd) = std::env::current_dir() {
			defaults.extend(Self::ancestors(&cwd, PACKAGES_DIR).paths);
		}
		if let Some(data) = dirs::data_local_dir() {
			defaults.push(data.join("langpack").join(PACKAGES_DIR));
		}

		let roots = Self::merge(defaults, host);
		tracing::debug!(roots = roots.len(), "Resolved package search roots");
		roots
	}

	/// The roots in priority order.
	pub fn paths(&self) -> &[PathBuf] {
		&self.paths
	}

	pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
		self.paths.iter()
	}

	pub fn len(&self) -> usize {
		self.paths.len()
	}

	pub fn is_empty(&self) -> bool {
		self.paths.is_empty()
	}
}

impl<'a> IntoIterator for &'a SearchRoots {
	type Item = &'a PathBuf;
	type IntoIter = std::slice::Iter<'a, PathBuf>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

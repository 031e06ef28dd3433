//! Package directory lookup.

use std::path::{Component, Path, PathBuf};

use tracing::{debug, info};

use crate::error::{PackageError, Result};
use crate::roots::SearchRoots;

/// Returns the first `root/name` directory entry that exists.
///
/// Roots are probed in order and the first hit wins, so a package under a
/// host root shadows a same-named package under any default root. A name
/// that is not a single plain path component never matches, so the result
/// always lies directly inside one of the roots.
pub fn locate_package(name: &str, roots: &SearchRoots) -> Result<PathBuf> {
	if !is_package_name(name) {
		debug!(package = name, "Rejected package name outside search roots");
		return Err(PackageError::NotFound(name.to_string()));
	}

	for root in roots {
		let candidate = root.join(name);
		debug!(package = name, path = %candidate.display(), "Probing package root");
		if candidate.exists() {
			info!(package = name, path = %candidate.display(), "Located language package");
			return Ok(candidate);
		}
	}

	Err(PackageError::NotFound(name.to_string()))
}

fn is_package_name(name: &str) -> bool {
	let mut components = Path::new(name).components();
	matches!((components.next(), components.next()), (Some(Component::Normal(_)), None))
}

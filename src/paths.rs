//! Path helpers used by the search and load pipeline.

use crate::error::{Result, SeekError};
use std::path::{Component, MAIN_SEPARATOR_STR, Path, PathBuf};

/// Loader key for files that have no extension.
pub const NO_EXT: &str = "noExt";

/// File name of the package manifest checked for an embedded config property.
pub const PACKAGE_MANIFEST: &str = "package.json";

/// Compute the parent of `dir`.
///
/// The root is its own parent, so `parent_dir(root) == root` is the signal
/// the upward walk uses to stop. A relative single-component path has an
/// empty parent; the path separator stands in for it.
pub fn parent_dir(dir: &Path) -> PathBuf {
	match dir.parent() {
		None => dir.to_path_buf(),
		Some(parent) if parent.as_os_str().is_empty() => PathBuf::from(MAIN_SEPARATOR_STR),
		Some(parent) => parent.to_path_buf(),
	}
}

/// Lookup key into the loaders table: the extension with its leading dot,
/// or [`NO_EXT`] when there is none.
///
/// Dotfiles such as `.foorc` have no extension.
pub fn loader_key(path: impl AsRef<Path>) -> String {
	match path.as_ref().extension() {
		Some(ext) if !ext.is_empty() => format!(".{}", ext.to_string_lossy()),
		_ => NO_EXT.to_string(),
	}
}

/// Whether the final component of `path` is the package manifest.
pub fn is_package_manifest(path: &Path) -> bool {
	path.file_name().is_some_and(|name| name == PACKAGE_MANIFEST)
}

/// Resolve `path` against the current working directory, folding `.` and
/// `..` lexically. Symlinks are not followed.
pub fn absolute_from_cwd(path: &Path) -> Result<PathBuf> {
	let absolute = std::path::absolute(path).map_err(SeekError::CurrentDirectory)?;
	Ok(normalize(&absolute))
}

/// Drop `.` components and let each `..` remove the segment before it.
/// A `..` directly under the root stays at the root.
fn normalize(path: &Path) -> PathBuf {
	let mut components: Vec<Component<'_>> = Vec::new();
	for component in path.components() {
		match component {
			Component::CurDir => {}
			Component::ParentDir => match components.last() {
				Some(Component::Normal(_)) => {
					components.pop();
				}
				Some(Component::RootDir | Component::Prefix(_)) => {}
				_ => components.push(component),
			},
			_ => components.push(component),
		}
	}
	components.iter().collect()
}

pub fn current_dir() -> Result<PathBuf> {
	std::env::current_dir()
		.map(|dir| normalize(&dir))
		.map_err(SeekError::CurrentDirectory)
}

/// Existence check for a candidate file. Any failure counts as absent.
///
/// Only regular files (or symlinks to them) count. A directory that happens
/// to carry a search-place name is skipped rather than failing the search
/// when its read is attempted.
pub fn is_file(path: &Path) -> bool {
	std::fs::metadata(path).is_ok_and(|meta| meta.is_file())
}

pub async fn is_file_async(path: &Path) -> bool {
	tokio::fs::metadata(path)
		.await
		.is_ok_and(|meta| meta.is_file())
}

pub fn read_to_string(path: &Path) -> Result<String> {
	std::fs::read_to_string(path).map_err(|source| SeekError::read(path, source))
}

pub async fn read_to_string_async(path: &Path) -> Result<String> {
	tokio::fs::read_to_string(path)
		.await
		.map_err(|source| SeekError::read(path, source))
}

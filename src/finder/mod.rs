//! Searching for and loading configuration files.
//!
//! [`SyncFinder`] and [`Finder`] run the same algorithm; the first blocks on
//! every filesystem and loader call, the second awaits them. Both walk from
//! a start directory up to the stop directory (or the filesystem root),
//! checking each search place in order, and cache results per directory
//! and per loaded file.

pub mod blocking;
mod cache;
pub mod suspending;

pub use blocking::SyncFinder;
pub use suspending::Finder;

use crate::error::Result;
use crate::loaders::LoaderEntry;
use crate::options::ResolvedOptions;
use crate::paths::{self, PACKAGE_MANIFEST};
use cache::Cache;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A configuration file that was found or loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResult {
	/// Absolute path of the file.
	pub filepath: PathBuf,

	/// Parsed configuration. `None` when the file was empty, or when a
	/// loaded `package.json` lacks the package property.
	pub config: Option<Value>,

	/// Set when the file had no content.
	#[serde(skip_serializing_if = "is_false")]
	pub is_empty: bool,
}

fn is_false(value: &bool) -> bool {
	!*value
}

impl ConfigResult {
	pub fn found(filepath: impl Into<PathBuf>, config: Value) -> Self {
		Self {
			filepath: filepath.into(),
			config: Some(config),
			is_empty: false,
		}
	}

	pub fn empty(filepath: impl Into<PathBuf>) -> Self {
		Self {
			filepath: filepath.into(),
			config: None,
			is_empty: true,
		}
	}
}

/// What to do with a search place whose content has been read.
pub(crate) enum Candidate<'a> {
	/// Blank file, skipped.
	Skip,
	/// Blank file, reported as an empty result.
	Empty,
	/// Package manifest; parse, then look up the package property.
	Manifest(&'a LoaderEntry, String),
	/// Regular config file.
	Parse(&'a LoaderEntry, String),
}

/// What to do with an explicitly loaded file. Blank files are never
/// skipped here.
pub(crate) enum LoadCandidate<'a> {
	Empty,
	Manifest(&'a LoaderEntry, String),
	Parse(&'a LoaderEntry, String),
}

/// State and decisions shared by both finders.
pub(crate) struct Core {
	pub(crate) options: ResolvedOptions,
	load_cache: Cache,
	search_cache: Cache,
}

impl Core {
	pub(crate) fn new(options: ResolvedOptions) -> Self {
		let enabled = options.cache;
		Self {
			options,
			load_cache: Cache::new(enabled),
			search_cache: Cache::new(enabled),
		}
	}

	pub(crate) fn start_dir(&self, from: Option<&Path>) -> Result<PathBuf> {
		match from {
			Some(dir) => paths::absolute_from_cwd(dir),
			None => paths::current_dir(),
		}
	}

	/// Check the search cache for `dir`. A hit is copied to every directory
	/// visited so far.
	pub(crate) fn cached_search(
		&self,
		dir: &Path,
		visited: &[PathBuf],
	) -> Option<Option<ConfigResult>> {
		let hit = self.search_cache.get(dir)?;
		debug!(dir = %dir.display(), "Search cache hit");
		self.search_cache.insert_all(visited, &hit);
		Some(hit)
	}

	pub(crate) fn remember_search(&self, visited: &[PathBuf], result: &Option<ConfigResult>) {
		self.search_cache.insert_all(visited, result);
	}

	pub(crate) fn cached_load(&self, filepath: &Path) -> Option<Option<ConfigResult>> {
		let hit = self.load_cache.get(filepath)?;
		debug!(path = %filepath.display(), "Load cache hit");
		Some(hit)
	}

	pub(crate) fn remember_load(&self, filepath: &Path, result: &Option<ConfigResult>) {
		self.load_cache.insert(filepath.to_path_buf(), result.clone());
	}

	/// Decide how a search place's content is handled.
	pub(crate) fn classify_search_place(&self, place: &str, content: &str) -> Result<Candidate<'_>> {
		if place == PACKAGE_MANIFEST {
			let (entry, key) = self.options.callable_loader_for(Path::new(place))?;
			return Ok(Candidate::Manifest(entry, key));
		}
		if content.trim().is_empty() {
			return Ok(if self.options.ignore_empty_search_places {
				Candidate::Skip
			} else {
				Candidate::Empty
			});
		}
		let (entry, key) = self.options.callable_loader_for(Path::new(place))?;
		Ok(Candidate::Parse(entry, key))
	}

	/// Decide how an explicitly loaded file is handled. Blank files always
	/// produce an empty result.
	pub(crate) fn classify_load<'a>(
		&self,
		filepath: &Path,
		content: &str,
		entry: &'a LoaderEntry,
		key: String,
	) -> LoadCandidate<'a> {
		if paths::is_package_manifest(filepath) {
			LoadCandidate::Manifest(entry, key)
		} else if content.trim().is_empty() {
			LoadCandidate::Empty
		} else {
			LoadCandidate::Parse(entry, key)
		}
	}

	/// Extract the package property from a parsed manifest.
	pub(crate) fn package_config(&self, manifest: &Value) -> Option<Value> {
		self.options.package_prop.lookup(manifest).cloned()
	}

	/// Whether the walk ends after `dir`.
	pub(crate) fn is_last_dir(&self, dir: &Path, parent: &Path) -> bool {
		dir == self.options.stop_dir || dir == parent
	}

	pub(crate) fn transform(&self, result: Option<ConfigResult>) -> Option<ConfigResult> {
		(self.options.transform)(result)
	}

	pub(crate) fn clear_load_cache(&self) {
		self.load_cache.clear();
	}

	pub(crate) fn clear_search_cache(&self) {
		self.search_cache.clear();
	}
}

#[cfg(test)]
pub(crate) mod test_support {
	use std::fs;
	use std::path::{Path, PathBuf};

	/// Write `content` to `root/relative`, creating parent directories.
	pub fn write(root: &Path, relative: &str, content: &str) -> PathBuf {
		let path = root.join(relative);
		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent).unwrap();
		}
		fs::write(&path, content).unwrap();
		path
	}

	/// Create `root/relative` as a directory tree.
	pub fn mkdirs(root: &Path, relative: &str) -> PathBuf {
		let path = root.join(relative);
		fs::create_dir_all(&path).unwrap();
		path
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::options::{Mode, Options, resolve};
	use serde_json::json;

	fn core(options: Options) -> Core {
		Core::new(resolve("foo", options.with_stop_dir("/"), Mode::Blocking).unwrap())
	}

	#[test]
	fn test_classify_blank_search_place() {
		let ignoring = core(Options::new());
		assert!(matches!(
			ignoring.classify_search_place(".foorc", "  \n\t").unwrap(),
			Candidate::Skip
		));

		let keeping = core(Options::new().with_ignore_empty_search_places(false));
		assert!(matches!(
			keeping.classify_search_place(".foorc", "").unwrap(),
			Candidate::Empty
		));
	}

	#[test]
	fn test_classify_manifest_even_when_blank() {
		let core = core(Options::new());
		assert!(matches!(
			core.classify_search_place("package.json", "").unwrap(),
			Candidate::Manifest(_, _)
		));
		match core.classify_search_place(".foorc.json", "{}").unwrap() {
			Candidate::Parse(_, key) => assert_eq!(key, ".json"),
			_ => panic!("Expected Parse"),
		}
	}

	#[test]
	fn test_classify_load_blank_is_empty() {
		let core = core(Options::new());
		let (entry, key) = core.options.loader_for(Path::new("/p/.foorc")).unwrap();
		assert!(matches!(
			core.classify_load(Path::new("/p/.foorc"), " ", entry, key),
			LoadCandidate::Empty
		));
	}

	#[test]
	fn test_serialized_shape() {
		let found = serde_json::to_value(ConfigResult::found("/p/.foorc", json!({"a": 1}))).unwrap();
		assert_eq!(found, json!({"filepath": "/p/.foorc", "config": {"a": 1}}));

		let empty = serde_json::to_value(ConfigResult::empty("/p/.foorc")).unwrap();
		assert_eq!(empty, json!({"filepath": "/p/.foorc", "config": null, "isEmpty": true}));
	}

	#[test]
	fn test_is_last_dir() {
		let core = Core::new(
			resolve("foo", Options::new().with_stop_dir("/stop/here"), Mode::Blocking).unwrap(),
		);
		assert!(core.is_last_dir(Path::new("/stop/here"), Path::new("/stop")));
		assert!(core.is_last_dir(Path::new("/"), Path::new("/")));
		assert!(!core.is_last_dir(Path::new("/stop/here/deeper"), Path::new("/stop/here")));
	}
}

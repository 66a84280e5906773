use super::{Candidate, ConfigResult, Core, LoadCandidate};
use crate::error::{Result, SeekError};
use crate::options::{Mode, Options, ResolvedOptions, resolve};
use crate::paths;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Finder whose operations block until every filesystem and loader call
/// has completed.
pub struct SyncFinder {
	core: Core,
}

impl SyncFinder {
	/// Resolve `options` for project `name`.
	///
	/// Fails if a search place has no loader that can run synchronously.
	pub fn new(name: &str, options: Options) -> Result<Self> {
		let options = resolve(name, options, Mode::Blocking)?;
		Ok(Self {
			core: Core::new(options),
		})
	}

	pub fn options(&self) -> &ResolvedOptions {
		&self.core.options
	}

	/// Search from `from` (default: the current directory) up to the stop
	/// directory, returning the first match.
	pub fn search(&self, from: Option<&Path>) -> Result<Option<ConfigResult>> {
		let mut dir = self.core.start_dir(from)?;
		let mut visited: Vec<PathBuf> = Vec::new();
		debug!(from = %dir.display(), "Searching for config");

		let found = loop {
			if let Some(hit) = self.core.cached_search(&dir, &visited) {
				return Ok(hit);
			}
			visited.push(dir.clone());

			if let Some(result) = self.search_directory(&dir)? {
				break Some(result);
			}

			let parent = paths::parent_dir(&dir);
			if self.core.is_last_dir(&dir, &parent) {
				break None;
			}
			dir = parent;
		};

		match &found {
			Some(result) => debug!(path = %result.filepath.display(), "Found config"),
			None => debug!(dirs = visited.len(), "No config found"),
		}

		let result = self.core.transform(found);
		self.core.remember_search(&visited, &result);
		Ok(result)
	}

	fn search_directory(&self, dir: &Path) -> Result<Option<ConfigResult>> {
		for place in &self.core.options.search_places {
			let filepath = dir.join(place);
			if !paths::is_file(&filepath) {
				continue;
			}
			trace!(path = %filepath.display(), "Checking candidate");
			let content = paths::read_to_string(&filepath)?;

			match self.core.classify_search_place(place, &content)? {
				Candidate::Skip => {
					trace!(path = %filepath.display(), "Skipping empty file");
				}
				Candidate::Empty => return Ok(Some(ConfigResult::empty(filepath))),
				Candidate::Manifest(entry, key) => {
					let manifest = entry.load_blocking(&key, &filepath, &content)?;
					if let Some(config) = self.core.package_config(&manifest) {
						return Ok(Some(ConfigResult::found(filepath, config)));
					}
					trace!(path = %filepath.display(), "Package property not present");
				}
				Candidate::Parse(entry, key) => {
					let config = entry.load_blocking(&key, &filepath, &content)?;
					return Ok(Some(ConfigResult::found(filepath, config)));
				}
			}
		}
		Ok(None)
	}

	/// Load the file at `filepath`, resolved against the current directory.
	pub fn load(&self, filepath: impl AsRef<Path>) -> Result<Option<ConfigResult>> {
		let filepath = filepath.as_ref();
		if filepath.as_os_str().is_empty() {
			return Err(SeekError::EmptyFilepath);
		}
		let filepath = paths::absolute_from_cwd(filepath)?;

		if let Some(hit) = self.core.cached_load(&filepath) {
			return Ok(hit);
		}

		let (entry, key) = self.core.options.callable_loader_for(&filepath)?;
		debug!(path = %filepath.display(), "Loading config");
		let content = paths::read_to_string(&filepath)?;

		let result = match self.core.classify_load(&filepath, &content, entry, key) {
			LoadCandidate::Manifest(entry, key) => {
				let manifest = entry.load_blocking(&key, &filepath, &content)?;
				ConfigResult {
					config: self.core.package_config(&manifest),
					filepath,
					is_empty: false,
				}
			}
			LoadCandidate::Parse(entry, key) => {
				let config = entry.load_blocking(&key, &filepath, &content)?;
				ConfigResult::found(filepath, config)
			}
			LoadCandidate::Empty => ConfigResult::empty(filepath),
		};

		let cache_key = result.filepath.clone();
		let result = self.core.transform(Some(result));
		self.core.remember_load(&cache_key, &result);
		Ok(result)
	}

	pub fn clear_load_cache(&self) {
		self.core.clear_load_cache();
	}

	pub fn clear_search_cache(&self) {
		self.core.clear_search_cache();
	}

	pub fn clear_caches(&self) {
		self.clear_load_cache();
		self.clear_search_cache();
	}
}

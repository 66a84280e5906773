//! Option resolution for a finder.
//!
//! This module handles:
//! - User overrides via the [`Options`] builder
//! - Mode-aware defaults for search places and loaders
//! - Validation that every search place has a callable loader

pub mod defaults;
pub mod package_prop;

pub use defaults::{default_loaders, default_search_places};
pub use package_prop::PackageProp;

use crate::error::{Result, SeekError};
use crate::finder::ConfigResult;
use crate::loaders::{
	FallbackPolicy, LoaderEntry, Loaders, ModuleRuntime, NodeRuntime,
};
use crate::paths::{absolute_from_cwd, loader_key};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Post-processing hook applied to every result, including not-found.
pub type Transform = Arc<dyn Fn(Option<ConfigResult>) -> Option<ConfigResult> + Send + Sync>;

/// Execution mode a set of options is resolved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
	/// Every filesystem and loader call completes before the next step.
	Blocking,
	/// Filesystem and loader calls are awaited.
	Suspending,
}

/// User-supplied overrides. Anything left unset takes its default.
///
/// # Example
///
/// ```
/// use configseek::{Options, SyncFinder};
///
/// let finder = SyncFinder::new(
///     "myapp",
///     Options::new()
///         .with_search_places(["package.json", ".myapprc.json"])
///         .with_stop_dir("/"),
/// )
/// .unwrap();
/// finder.clear_caches();
/// ```
#[derive(Clone, Default)]
pub struct Options {
	search_places: Option<Vec<String>>,
	stop_dir: Option<PathBuf>,
	ignore_empty_search_places: Option<bool>,
	cache: Option<bool>,
	transform: Option<Transform>,
	package_prop: Option<PackageProp>,
	loaders: Loaders,
	module_runtime: Option<Arc<dyn ModuleRuntime>>,
	fallback_policy: Option<FallbackPolicy>,
}

impl Options {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Replace the default search places entirely.
	#[must_use]
	pub fn with_search_places<I, S>(mut self, places: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.search_places = Some(places.into_iter().map(Into::into).collect());
		self
	}

	/// Highest directory the search checks. Defaults to the home directory.
	#[must_use]
	pub fn with_stop_dir(mut self, dir: impl Into<PathBuf>) -> Self {
		self.stop_dir = Some(dir.into());
		self
	}

	/// Whether blank files are skipped during search. Defaults to `true`.
	#[must_use]
	pub fn with_ignore_empty_search_places(mut self, ignore: bool) -> Self {
		self.ignore_empty_search_places = Some(ignore);
		self
	}

	/// Whether search and load results are cached. Defaults to `true`.
	#[must_use]
	pub fn with_cache(mut self, enabled: bool) -> Self {
		self.cache = Some(enabled);
		self
	}

	#[must_use]
	pub fn with_transform<F>(mut self, transform: F) -> Self
	where
		F: Fn(Option<ConfigResult>) -> Option<ConfigResult> + Send + Sync + 'static,
	{
		self.transform = Some(Arc::new(transform));
		self
	}

	/// Key, or dotted path, of the config inside `package.json`.
	/// Defaults to the project name.
	#[must_use]
	pub fn with_package_prop(mut self, prop: impl Into<PackageProp>) -> Self {
		self.package_prop = Some(prop.into());
		self
	}

	/// Add a loader, replacing the default for the same key.
	#[must_use]
	pub fn with_loader(mut self, key: impl Into<String>, entry: LoaderEntry) -> Self {
		self.loaders.insert(key, entry);
		self
	}

	/// Runtime used by the default JavaScript module loaders.
	#[must_use]
	pub fn with_module_runtime(mut self, runtime: Arc<dyn ModuleRuntime>) -> Self {
		self.module_runtime = Some(runtime);
		self
	}

	/// Import-to-require fallback rules for the default `.mjs` loader.
	#[must_use]
	pub fn with_fallback_policy(mut self, policy: FallbackPolicy) -> Self {
		self.fallback_policy = Some(policy);
		self
	}
}

impl fmt::Debug for Options {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Options")
			.field("search_places", &self.search_places)
			.field("stop_dir", &self.stop_dir)
			.field("ignore_empty_search_places", &self.ignore_empty_search_places)
			.field("cache", &self.cache)
			.field("package_prop", &self.package_prop)
			.field("loaders", &self.loaders)
			.finish_non_exhaustive()
	}
}

/// Fully populated options, fixed for the lifetime of a finder.
#[derive(Clone)]
pub struct ResolvedOptions {
	pub(crate) mode: Mode,
	pub(crate) stop_dir: PathBuf,
	pub(crate) search_places: Vec<String>,
	pub(crate) ignore_empty_search_places: bool,
	pub(crate) cache: bool,
	pub(crate) transform: Transform,
	pub(crate) package_prop: PackageProp,
	pub(crate) loaders: Loaders,
}

impl ResolvedOptions {
	pub fn mode(&self) -> Mode {
		self.mode
	}

	pub fn stop_dir(&self) -> &Path {
		&self.stop_dir
	}

	pub fn search_places(&self) -> &[String] {
		&self.search_places
	}

	pub fn ignore_empty_search_places(&self) -> bool {
		self.ignore_empty_search_places
	}

	pub fn cache_enabled(&self) -> bool {
		self.cache
	}

	pub fn package_prop(&self) -> &PackageProp {
		&self.package_prop
	}

	pub fn loaders(&self) -> &Loaders {
		&self.loaders
	}

	/// Look up the loader registered for `path`'s extension.
	pub(crate) fn loader_for(&self, path: &Path) -> Result<(&LoaderEntry, String)> {
		let key = loader_key(path);
		match self.loaders.get(&key) {
			Some(entry) => Ok((entry, key)),
			None => Err(SeekError::MissingLoader {
				key,
				path: path.to_path_buf(),
			}),
		}
	}

	/// Like [`loader_for`](Self::loader_for), but also rejects loaders the
	/// current mode cannot call.
	pub(crate) fn callable_loader_for(&self, path: &Path) -> Result<(&LoaderEntry, String)> {
		let (entry, key) = self.loader_for(path)?;
		if self.mode == Mode::Blocking && !entry.is_blocking() {
			return Err(SeekError::LoaderNotCallable {
				key,
				path: path.to_path_buf(),
			});
		}
		Ok((entry, key))
	}
}

impl fmt::Debug for ResolvedOptions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ResolvedOptions")
			.field("mode", &self.mode)
			.field("stop_dir", &self.stop_dir)
			.field("search_places", &self.search_places)
			.field("ignore_empty_search_places", &self.ignore_empty_search_places)
			.field("cache", &self.cache)
			.field("package_prop", &self.package_prop)
			.field("loaders", &self.loaders)
			.finish_non_exhaustive()
	}
}

/// Merge `options` over the defaults for `name` and validate the result.
///
/// Fails if any search place maps to a missing loader, or to one that
/// `mode` cannot call.
pub fn resolve(name: &str, options: Options, mode: Mode) -> Result<ResolvedOptions> {
	let runtime = options
		.module_runtime
		.unwrap_or_else(|| Arc::new(NodeRuntime::default()));
	let policy = options.fallback_policy.unwrap_or_default();

	let mut loaders = default_loaders(mode, runtime, policy);
	loaders.merge(options.loaders);

	let stop_dir = match options.stop_dir {
		Some(dir) => absolute_from_cwd(&dir)?,
		None => dirs::home_dir().ok_or(SeekError::HomeDirectoryNotFound)?,
	};

	let resolved = ResolvedOptions {
		mode,
		stop_dir,
		search_places: options
			.search_places
			.unwrap_or_else(|| default_search_places(name, mode)),
		ignore_empty_search_places: options.ignore_empty_search_places.unwrap_or(true),
		cache: options.cache.unwrap_or(true),
		transform: options.transform.unwrap_or_else(|| Arc::new(|result: Option<ConfigResult>| result)),
		package_prop: options
			.package_prop
			.unwrap_or_else(|| PackageProp::Key(name.to_string())),
		loaders,
	};

	for place in &resolved.search_places {
		resolved.callable_loader_for(Path::new(place))?;
	}

	debug!(
		name,
		?mode,
		stop_dir = %resolved.stop_dir.display(),
		search_places = resolved.search_places.len(),
		"Resolved finder options"
	);

	Ok(resolved)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::loaders::{AsyncLoader, LoaderError};
	use async_trait::async_trait;
	use serde_json::{Value, json};

	struct Pending;

	#[async_trait]
	impl AsyncLoader for Pending {
		async fn load(&self, _filepath: &Path, _content: &str) -> std::result::Result<Value, LoaderError> {
			Ok(Value::Null)
		}
	}

	fn base() -> Options {
		Options::new().with_stop_dir("/")
	}

	#[test]
	fn test_defaults() {
		let resolved = resolve("foo", base(), Mode::Blocking).unwrap();

		assert_eq!(resolved.search_places(), default_search_places("foo", Mode::Blocking));
		assert!(resolved.ignore_empty_search_places());
		assert!(resolved.cache_enabled());
		assert_eq!(resolved.package_prop(), &PackageProp::Key("foo".to_string()));
		assert_eq!(resolved.mode(), Mode::Blocking);
	}

	#[test]
	fn test_default_stop_dir_is_home() {
		let Some(home) = dirs::home_dir() else {
			return;
		};
		let resolved = resolve("foo", Options::new(), Mode::Blocking).unwrap();
		assert_eq!(resolved.stop_dir(), home);
	}

	#[test]
	fn test_default_transform_is_identity() {
		let resolved = resolve("foo", base(), Mode::Blocking).unwrap();
		let result = ConfigResult::found("/a/.foorc", json!({"a": 1}));

		assert_eq!((resolved.transform)(Some(result.clone())), Some(result));
		assert_eq!((resolved.transform)(None), None);
	}

	#[test]
	fn test_overrides_replace_scalars_and_arrays() {
		let options = base()
			.with_search_places([".foorc.json"])
			.with_ignore_empty_search_places(false)
			.with_cache(false)
			.with_package_prop("tools.foo");
		let resolved = resolve("foo", options, Mode::Blocking).unwrap();

		assert_eq!(resolved.search_places(), [".foorc.json".to_string()]);
		assert!(!resolved.ignore_empty_search_places());
		assert!(!resolved.cache_enabled());
		assert_eq!(resolved.package_prop(), &PackageProp::Key("tools.foo".to_string()));
	}

	#[test]
	fn test_user_loaders_extend_defaults() {
		let options = base()
			.with_search_places([".foorc.yaml"])
			.with_loader(".yaml", LoaderEntry::from_fn(|_, _| Ok(json!("yaml"))));
		let resolved = resolve("foo", options, Mode::Blocking).unwrap();

		let keys: Vec<&str> = resolved.loaders().keys().collect();
		assert!(keys.contains(&".yaml"));
		assert!(keys.contains(&".json"));
		assert!(keys.contains(&"noExt"));
	}

	#[test]
	fn test_missing_loader_fails_at_resolution() {
		let options = base().with_search_places(["package.json", ".foorc.yaml"]);
		let err = resolve("foo", options, Mode::Blocking).unwrap_err();

		match err {
			SeekError::MissingLoader { key, path } => {
				assert_eq!(key, ".yaml");
				assert_eq!(path, PathBuf::from(".foorc.yaml"));
			}
			other => panic!("Expected MissingLoader, got {other:?}"),
		}
	}

	#[test]
	fn test_mjs_search_place_is_not_callable_when_blocking() {
		let options = base().with_search_places(["foo.config.mjs"]);
		let err = resolve("foo", options, Mode::Blocking).unwrap_err();
		assert!(matches!(err, SeekError::MissingLoader { .. }));

		let options = base()
			.with_search_places(["foo.config.mjs"])
			.with_loader(".mjs", LoaderEntry::suspending(Pending));
		let err = resolve("foo", options, Mode::Blocking).unwrap_err();
		assert!(matches!(err, SeekError::LoaderNotCallable { .. }));
	}

	#[test]
	fn test_suspending_mode_accepts_mjs() {
		let options = base().with_search_places(["foo.config.mjs"]);
		let resolved = resolve("foo", options, Mode::Suspending).unwrap();
		assert_eq!(resolved.mode(), Mode::Suspending);
	}

	#[test]
	fn test_relative_stop_dir_is_made_absolute() {
		let resolved = resolve("foo", Options::new().with_stop_dir("some/dir"), Mode::Blocking).unwrap();
		assert!(resolved.stop_dir().is_absolute());
		assert!(resolved.stop_dir().ends_with("some/dir"));
	}
}

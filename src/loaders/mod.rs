//! Loaders turn a file's raw text into a parsed configuration value.
//!
//! This module handles:
//! - The blocking [`Loader`] and suspending [`AsyncLoader`] traits
//! - The extension-keyed [`Loaders`] table
//! - Built-in JSON, TOML and JavaScript module loaders

pub mod formats;
pub mod module;
pub mod node;

pub use formats::{JsonLoader, TomlLoader};
pub use module::{FallbackPolicy, ImportLoader, ModuleError, ModuleRuntime, RequireLoader};
pub use node::NodeRuntime;

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Errors raised by a loader while parsing a file.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
	#[error("invalid JSON: {0}")]
	Json(#[from] serde_json::Error),

	#[error("invalid TOML: {0}")]
	Toml(#[from] toml::de::Error),

	#[error(transparent)]
	Module(#[from] ModuleError),

	#[error(transparent)]
	Custom(Box<dyn std::error::Error + Send + Sync>),
}

impl LoaderError {
	/// Wrap an arbitrary error raised by a user-supplied loader.
	pub fn custom(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
		LoaderError::Custom(err.into())
	}
}

/// A loader that completes before returning.
///
/// Any `Fn(&Path, &str) -> Result<Value, LoaderError>` closure is a loader.
pub trait Loader: Send + Sync {
	fn load(&self, filepath: &Path, content: &str) -> Result<Value, LoaderError>;
}

impl<F> Loader for F
where
	F: Fn(&Path, &str) -> Result<Value, LoaderError> + Send + Sync,
{
	fn load(&self, filepath: &Path, content: &str) -> Result<Value, LoaderError> {
		self(filepath, content)
	}
}

/// A loader that must be awaited. Only usable by the suspending finder.
#[async_trait]
pub trait AsyncLoader: Send + Sync {
	async fn load(&self, filepath: &Path, content: &str) -> Result<Value, LoaderError>;
}

/// One entry of the loaders table.
#[derive(Clone)]
pub enum LoaderEntry {
	Blocking(Arc<dyn Loader>),
	Suspending(Arc<dyn AsyncLoader>),
}

impl LoaderEntry {
	pub fn blocking(loader: impl Loader + 'static) -> Self {
		LoaderEntry::Blocking(Arc::new(loader))
	}

	/// Build a blocking entry from a closure.
	pub fn from_fn<F>(f: F) -> Self
	where
		F: Fn(&Path, &str) -> Result<Value, LoaderError> + Send + Sync + 'static,
	{
		LoaderEntry::Blocking(Arc::new(f))
	}

	pub fn suspending(loader: impl AsyncLoader + 'static) -> Self {
		LoaderEntry::Suspending(Arc::new(loader))
	}

	/// Whether this entry can run without an async runtime.
	pub fn is_blocking(&self) -> bool {
		matches!(self, LoaderEntry::Blocking(_))
	}

	pub(crate) fn load_blocking(
		&self,
		key: &str,
		filepath: &Path,
		content: &str,
	) -> crate::Result<Value> {
		match self {
			LoaderEntry::Blocking(loader) => loader
				.load(filepath, content)
				.map_err(|source| crate::SeekError::loader(filepath, source)),
			LoaderEntry::Suspending(_) => Err(crate::SeekError::LoaderNotCallable {
				key: key.to_string(),
				path: filepath.to_path_buf(),
			}),
		}
	}

	pub(crate) async fn load(&self, filepath: &Path, content: &str) -> crate::Result<Value> {
		let loaded = match self {
			LoaderEntry::Blocking(loader) => loader.load(filepath, content),
			LoaderEntry::Suspending(loader) => loader.load(filepath, content).await,
		};
		loaded.map_err(|source| crate::SeekError::loader(filepath, source))
	}
}

impl fmt::Debug for LoaderEntry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			LoaderEntry::Blocking(_) => f.write_str("LoaderEntry::Blocking"),
			LoaderEntry::Suspending(_) => f.write_str("LoaderEntry::Suspending"),
		}
	}
}

/// Loaders keyed by extension (`".json"`) or [`NO_EXT`](crate::paths::NO_EXT).
#[derive(Debug, Clone, Default)]
pub struct Loaders {
	entries: BTreeMap<String, LoaderEntry>,
}

impl Loaders {
	pub fn new() -> Self {
		Self::default()
	}

	/// Add an entry, replacing any existing entry for the same key.
	#[must_use]
	pub fn with(mut self, key: impl Into<String>, entry: LoaderEntry) -> Self {
		self.insert(key, entry);
		self
	}

	pub fn insert(&mut self, key: impl Into<String>, entry: LoaderEntry) -> Option<LoaderEntry> {
		self.entries.insert(key.into(), entry)
	}

	pub fn remove(&mut self, key: &str) -> Option<LoaderEntry> {
		self.entries.remove(key)
	}

	pub fn get(&self, key: &str) -> Option<&LoaderEntry> {
		self.entries.get(key)
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.entries.keys().map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Shallow merge: entries from `overrides` replace same-key entries here.
	pub fn merge(&mut self, overrides: Loaders) {
		self.entries.extend(overrides.entries);
	}
}

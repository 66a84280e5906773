use super::ConfigResult;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Path-keyed result cache. A disabled cache stores nothing.
///
/// Entries hold transformed results, including not-found (`None`).
pub(crate) struct Cache {
	entries: Option<Mutex<HashMap<PathBuf, Option<ConfigResult>>>>,
}

impl Cache {
	pub(crate) fn new(enabled: bool) -> Self {
		Self {
			entries: enabled.then(|| Mutex::new(HashMap::new())),
		}
	}

	/// A hit returns the cached result; `None` means miss or disabled.
	pub(crate) fn get(&self, key: &Path) -> Option<Option<ConfigResult>> {
		self.entries.as_ref()?.lock().get(key).cloned()
	}

	pub(crate) fn insert(&self, key: PathBuf, value: Option<ConfigResult>) {
		if let Some(entries) = &self.entries {
			entries.lock().insert(key, value);
		}
	}

	pub(crate) fn insert_all(&self, keys: &[PathBuf], value: &Option<ConfigResult>) {
		if let Some(entries) = &self.entries {
			let mut entries = entries.lock();
			for key in keys {
				entries.insert(key.clone(), value.clone());
			}
		}
	}

	pub(crate) fn clear(&self) {
		if let Some(entries) = &self.entries {
			entries.lock().clear();
		}
	}

	#[cfg(test)]
	pub(crate) fn len(&self) -> usize {
		self.entries.as_ref().map_or(0, |entries| entries.lock().len())
	}
}

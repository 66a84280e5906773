use super::{Loader, LoaderError};
use serde_json::Value;
use std::path::Path;

/// Parses JSON files, including extensionless rc files.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLoader;

impl Loader for JsonLoader {
	fn load(&self, _filepath: &Path, content: &str) -> Result<Value, LoaderError> {
		Ok(serde_json::from_str(content)?)
	}
}

/// Parses TOML files into the same value model as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlLoader;

impl Loader for TomlLoader {
	fn load(&self, _filepath: &Path, content: &str) -> Result<Value, LoaderError> {
		Ok(toml::from_str(content)?)
	}
}

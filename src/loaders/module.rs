//! Loaders for JavaScript configuration modules.
//!
//! Evaluation is delegated to a [`ModuleRuntime`]. [`RequireLoader`] uses the
//! runtime's require-style entry point; [`ImportLoader`] tries a dynamic
//! import first and falls back to require when the [`FallbackPolicy`] says
//! the import failure was a module system mismatch.

use super::{AsyncLoader, Loader, LoaderError};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// An error reported by a module runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleError {
	/// Runtime error code, e.g. `ERR_REQUIRE_ESM`.
	pub code: Option<String>,
	pub message: String,
}

impl ModuleError {
	pub fn new(code: Option<String>, message: impl Into<String>) -> Self {
		Self {
			code,
			message: message.into(),
		}
	}

	/// Whether the error carries one of `codes`.
	pub fn has_code(&self, codes: &[&str]) -> bool {
		self.code
			.as_deref()
			.is_some_and(|code| codes.contains(&code))
	}
}

impl fmt::Display for ModuleError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.code {
			Some(code) => write!(f, "{} [{}]", self.message, code),
			None => f.write_str(&self.message),
		}
	}
}

impl std::error::Error for ModuleError {}

/// Something that can evaluate a configuration module and hand back its
/// exported value.
#[async_trait]
pub trait ModuleRuntime: Send + Sync {
	/// Require-style load that blocks the calling thread.
	fn require_blocking(&self, filepath: &Path) -> Result<Value, ModuleError>;

	/// Require-style load.
	async fn require(&self, filepath: &Path) -> Result<Value, ModuleError>;

	/// Native dynamic import.
	async fn import(&self, filepath: &Path) -> Result<Value, ModuleError>;
}

/// Decides when [`ImportLoader`] falls back from import to require, and
/// which error it surfaces when the fallback fails too.
#[derive(Clone, Copy)]
pub struct FallbackPolicy {
	/// Import failed because dynamic import is unavailable for this kind of
	/// module. Only these failures trigger the require fallback.
	pub should_fallback: fn(&ModuleError) -> bool,

	/// Require failed with a module system mismatch. That error is surfaced;
	/// any other require failure surfaces the original import error.
	pub is_mismatch: fn(&ModuleError) -> bool,
}

const IMPORT_UNAVAILABLE_CODES: &[&str] = &[
	"ERR_UNSUPPORTED_ESM_URL_SCHEME",
	"ERR_VM_DYNAMIC_IMPORT_CALLBACK_MISSING",
	"ERR_UNKNOWN_FILE_EXTENSION",
];

const MISMATCH_CODES: &[&str] = &["ERR_REQUIRE_ESM", "ERR_REQUIRE_ASYNC_MODULE"];

impl FallbackPolicy {
	/// Error classification for Node.js.
	pub fn node() -> Self {
		Self {
			should_fallback: |err| err.has_code(IMPORT_UNAVAILABLE_CODES),
			is_mismatch: |err| {
				err.has_code(MISMATCH_CODES)
					|| err
						.message
						.contains("Cannot use import statement outside a module")
			},
		}
	}

	/// Never fall back; the import error always propagates.
	pub fn never() -> Self {
		Self {
			should_fallback: |_| false,
			is_mismatch: |_| false,
		}
	}
}

impl fmt::Debug for FallbackPolicy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FallbackPolicy").finish_non_exhaustive()
	}
}

impl Default for FallbackPolicy {
	fn default() -> Self {
		Self::node()
	}
}

/// Loads `.js` and `.cjs` files through the runtime's require entry point.
#[derive(Clone)]
pub struct RequireLoader {
	runtime: Arc<dyn ModuleRuntime>,
}

impl RequireLoader {
	pub fn new(runtime: Arc<dyn ModuleRuntime>) -> Self {
		Self { runtime }
	}
}

impl Loader for RequireLoader {
	fn load(&self, filepath: &Path, _content: &str) -> Result<Value, LoaderError> {
		Ok(self.runtime.require_blocking(filepath)?)
	}
}

#[async_trait]
impl AsyncLoader for RequireLoader {
	async fn load(&self, filepath: &Path, _content: &str) -> Result<Value, LoaderError> {
		Ok(self.runtime.require(filepath).await?)
	}
}

/// Loads ES modules by dynamic import, with a require fallback.
#[derive(Clone)]
pub struct ImportLoader {
	runtime: Arc<dyn ModuleRuntime>,
	policy: FallbackPolicy,
}

impl ImportLoader {
	pub fn new(runtime: Arc<dyn ModuleRuntime>) -> Self {
		Self::with_policy(runtime, FallbackPolicy::default())
	}

	pub fn with_policy(runtime: Arc<dyn ModuleRuntime>, policy: FallbackPolicy) -> Self {
		Self { runtime, policy }
	}
}

#[async_trait]
impl AsyncLoader for ImportLoader {
	async fn load(&self, filepath: &Path, _content: &str) -> Result<Value, LoaderError> {
		let import_err = match self.runtime.import(filepath).await {
			Ok(value) => return Ok(value),
			Err(err) => err,
		};

		if !(self.policy.should_fallback)(&import_err) {
			return Err(import_err.into());
		}

		debug!(path = %filepath.display(), error = %import_err, "Import unavailable, falling back to require");

		match self.runtime.require(filepath).await {
			Ok(value) => Ok(value),
			Err(require_err) if (self.policy.is_mismatch)(&require_err) => Err(require_err.into()),
			Err(_) => Err(import_err.into()),
		}
	}
}

use crate::loaders::LoaderError;
use std::path::PathBuf;

/// Library-level structured errors for configseek.
///
/// Use `thiserror` for structured errors that library consumers can match on.
/// The CLI binary wraps these with `anyhow` for rich context chains.
#[derive(Debug, thiserror::Error)]
pub enum SeekError {
	#[error("No loader specified for {}", describe_key(.key))]
	MissingLoader { key: String, path: PathBuf },

	#[error("Loader for {} cannot be called synchronously: {}", describe_key(.key), .path.display())]
	LoaderNotCallable { key: String, path: PathBuf },

	#[error("load must be passed a non-empty file path")]
	EmptyFilepath,

	#[error("Failed to read config file: {}", .path.display())]
	ReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to load config file: {}", .path.display())]
	Loader {
		path: PathBuf,
		#[source]
		source: LoaderError,
	},

	#[error("Failed to resolve home directory")]
	HomeDirectoryNotFound,

	#[error("Failed to resolve current directory")]
	CurrentDirectory(#[source] std::io::Error),
}

/// Broad classification of a [`SeekError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
	/// A search place or load target has no usable loader.
	Configuration,
	/// The caller passed an invalid argument.
	Validation,
	/// A loader failed to parse a file.
	Loader,
	/// A file could not be read.
	Filesystem,
	/// The process environment could not provide a directory.
	Environment,
}

impl SeekError {
	pub fn kind(&self) -> ErrorKind {
		match self {
			SeekError::MissingLoader { .. } | SeekError::LoaderNotCallable { .. } => {
				ErrorKind::Configuration
			}
			SeekError::EmptyFilepath => ErrorKind::Validation,
			SeekError::Loader { .. } => ErrorKind::Loader,
			SeekError::ReadError { .. } => ErrorKind::Filesystem,
			SeekError::HomeDirectoryNotFound | SeekError::CurrentDirectory(_) => {
				ErrorKind::Environment
			}
		}
	}

	pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
		SeekError::ReadError {
			path: path.into(),
			source,
		}
	}

	pub(crate) fn loader(path: impl Into<PathBuf>, source: LoaderError) -> Self {
		SeekError::Loader {
			path: path.into(),
			source,
		}
	}
}

fn describe_key(key: &str) -> String {
	if key == crate::paths::NO_EXT {
		"files without extensions".to_string()
	} else {
		format!("extension \"{key}\"")
	}
}

/// Result type alias using SeekError.
pub type Result<T> = std::result::Result<T, SeekError>;

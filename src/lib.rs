//! Configseek - find and load a project's configuration file.
//!
//! This library provides:
//! - Upward directory search over a prioritized list of search places
//! - `package.json` property lookup alongside dedicated rc files
//! - Extension-keyed loaders for JSON, TOML and JavaScript modules
//! - Per-directory and per-file result caching
//! - Blocking ([`SyncFinder`]) and async ([`Finder`]) entry points
//!
//! # Example
//!
//! ```no_run
//! use configseek::{Options, SyncFinder};
//!
//! let finder = SyncFinder::new("myapp", Options::new()).unwrap();
//!
//! if let Some(found) = finder.search(None).unwrap() {
//!     println!("Config from {}: {:?}", found.filepath.display(), found.config);
//! }
//!
//! let explicit = finder.load("config/myapp.json").unwrap();
//! # let _ = explicit;
//! ```

pub mod error;
pub mod finder;
pub mod loaders;
pub mod options;
pub mod paths;

pub use error::{ErrorKind, Result, SeekError};
pub use finder::{ConfigResult, Finder, SyncFinder};
pub use loaders::{AsyncLoader, Loader, LoaderEntry, LoaderError, Loaders};
pub use options::{Mode, Options, PackageProp, ResolvedOptions};

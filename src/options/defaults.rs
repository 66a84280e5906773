use super::Mode;
use crate::loaders::{
	FallbackPolicy, ImportLoader, JsonLoader, LoaderEntry, Loaders, ModuleRuntime, RequireLoader,
	TomlLoader,
};
use crate::paths::{NO_EXT, PACKAGE_MANIFEST};
use std::sync::Arc;

/// Default search places for `name`, in priority order.
///
/// ES module variants are only included in [`Mode::Suspending`], since they
/// cannot be loaded without awaiting.
pub fn default_search_places(name: &str, mode: Mode) -> Vec<String> {
	let mut extensions = vec!["", ".json", ".js", ".cjs"];
	let mut module_extensions = vec!["js", "cjs"];
	if mode == Mode::Suspending {
		extensions.push(".mjs");
		module_extensions.push("mjs");
	}

	let mut places = vec![PACKAGE_MANIFEST.to_string()];
	places.extend(extensions.iter().map(|ext| format!(".{name}rc{ext}")));
	places.extend(extensions.iter().map(|ext| format!(".config/{name}rc{ext}")));
	places.extend(module_extensions.iter().map(|ext| format!("{name}.config.{ext}")));
	places
}

/// A fresh default loaders table for `mode`.
pub fn default_loaders(
	mode: Mode,
	runtime: Arc<dyn ModuleRuntime>,
	policy: FallbackPolicy,
) -> Loaders {
	let require = RequireLoader::new(runtime.clone());
	let loaders = Loaders::new()
		.with(".json", LoaderEntry::blocking(JsonLoader))
		.with(NO_EXT, LoaderEntry::blocking(JsonLoader))
		.with(".toml", LoaderEntry::blocking(TomlLoader));

	match mode {
		Mode::Blocking => loaders
			.with(".js", LoaderEntry::blocking(require.clone()))
			.with(".cjs", LoaderEntry::blocking(require)),
		Mode::Suspending => loaders
			.with(".js", LoaderEntry::suspending(require.clone()))
			.with(".cjs", LoaderEntry::suspending(require))
			.with(
				".mjs",
				LoaderEntry::suspending(ImportLoader::with_policy(runtime, policy)),
			),
	}
}

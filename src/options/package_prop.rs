use serde_json::Value;

/// Where to find the config inside a package manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageProp {
	/// A single key. If no such key exists and it contains dots, it is
	/// treated as a dotted path.
	Key(String),
	/// An explicit sequence of keys.
	Path(Vec<String>),
}

impl PackageProp {
	/// Extract the property from a parsed manifest.
	///
	/// Returns `None` as soon as a segment is missing, and when the final
	/// value is `null`.
	pub fn lookup<'a>(&self, source: &'a Value) -> Option<&'a Value> {
		let found = match self {
			PackageProp::Key(key) => match source.get(key.as_str()) {
				Some(value) => Some(value),
				None => walk(source, key.split('.')),
			},
			PackageProp::Path(segments) => walk(source, segments.iter().map(String::as_str)),
		};
		found.filter(|value| !value.is_null())
	}
}

fn walk<'a, 's>(source: &'a Value, segments: impl IntoIterator<Item = &'s str>) -> Option<&'a Value> {
	segments.into_iter().try_fold(source, |current, segment| match current {
		Value::Object(map) => map.get(segment),
		Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
		_ => None,
	})
}

impl From<&str> for PackageProp {
	fn from(key: &str) -> Self {
		PackageProp::Key(key.to_string())
	}
}

impl From<String> for PackageProp {
	fn from(key: String) -> Self {
		PackageProp::Key(key)
	}
}

impl From<Vec<String>> for PackageProp {
	fn from(segments: Vec<String>) -> Self {
		PackageProp::Path(segments)
	}
}

impl<const N: usize> From<[&str; N]> for PackageProp {
	fn from(segments: [&str; N]) -> Self {
		PackageProp::Path(segments.iter().map(|s| s.to_string()).collect())
	}
}

use super::module::{ModuleError, ModuleRuntime};
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::sync::LazyLock;
use tracing::trace;

const REQUIRE_SCRIPT: &str =
	"const m = require(process.argv[1]); process.stdout.write(JSON.stringify(m) ?? 'null');";

const IMPORT_SCRIPT: &str = "import { pathToFileURL } from 'node:url'; \
	const m = await import(pathToFileURL(process.argv[1]).href); \
	process.stdout.write(JSON.stringify(m.default) ?? 'null');";

static CODE_PROPERTY: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"code: '([A-Z0-9_]+)'").expect("valid regex"));

static BRACKETED_CODE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\[(ERR_[A-Z0-9_]+)\]").expect("valid regex"));

static ERROR_LINE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?m)^[A-Za-z]*Error(?: \[[A-Z0-9_]+\])?: .*$").expect("valid regex")
});

/// Evaluates configuration modules with the `node` executable.
///
/// The module's export is serialized to JSON on stdout. Failures are
/// classified by the error code Node prints on stderr.
#[derive(Debug, Clone)]
pub struct NodeRuntime {
	program: PathBuf,
}

impl NodeRuntime {
	pub fn new(program: impl Into<PathBuf>) -> Self {
		Self {
			program: program.into(),
		}
	}

	pub fn program(&self) -> &Path {
		&self.program
	}

	fn args<'a>(script: &'a str, esm: bool, filepath: &'a Path) -> Vec<&'a OsStr> {
		let mut args = Vec::with_capacity(4);
		if esm {
			args.push(OsStr::new("--input-type=module"));
		}
		args.push(OsStr::new("-e"));
		args.push(OsStr::new(script));
		args.push(filepath.as_os_str());
		args
	}

	fn run_blocking(&self, script: &str, esm: bool, filepath: &Path) -> Result<Value, ModuleError> {
		trace!(program = %self.program.display(), path = %filepath.display(), esm, "Evaluating module");
		let output = Command::new(&self.program)
			.args(Self::args(script, esm, filepath))
			.stdin(Stdio::null())
			.output()
			.map_err(|source| self.spawn_error(source))?;
		parse_output(&output)
	}

	async fn run(&self, script: &str, esm: bool, filepath: &Path) -> Result<Value, ModuleError> {
		trace!(program = %self.program.display(), path = %filepath.display(), esm, "Evaluating module");
		let output = tokio::process::Command::new(&self.program)
			.args(Self::args(script, esm, filepath))
			.stdin(Stdio::null())
			.output()
			.await
			.map_err(|source| self.spawn_error(source))?;
		parse_output(&output)
	}

	fn spawn_error(&self, source: std::io::Error) -> ModuleError {
		let code = (source.kind() == std::io::ErrorKind::NotFound).then(|| "ENOENT".to_string());
		ModuleError::new(
			code,
			format!("Failed to run {}: {}", self.program.display(), source),
		)
	}
}

impl Default for NodeRuntime {
	fn default() -> Self {
		Self::new("node")
	}
}

#[async_trait]
impl ModuleRuntime for NodeRuntime {
	fn require_blocking(&self, filepath: &Path) -> Result<Value, ModuleError> {
		self.run_blocking(REQUIRE_SCRIPT, false, filepath)
	}

	async fn require(&self, filepath: &Path) -> Result<Value, ModuleError> {
		self.run(REQUIRE_SCRIPT, false, filepath).await
	}

	async fn import(&self, filepath: &Path) -> Result<Value, ModuleError> {
		self.run(IMPORT_SCRIPT, true, filepath).await
	}
}

fn parse_output(output: &Output) -> Result<Value, ModuleError> {
	if output.status.success() {
		serde_json::from_slice(&output.stdout).map_err(|err| {
			ModuleError::new(None, format!("Module export is not JSON-serializable: {err}"))
		})
	} else {
		Err(parse_stderr(&String::from_utf8_lossy(&output.stderr)))
	}
}

/// Extract the error code and headline from Node's stderr.
fn parse_stderr(stderr: &str) -> ModuleError {
	let code = CODE_PROPERTY
		.captures(stderr)
		.or_else(|| BRACKETED_CODE.captures(stderr))
		.map(|caps| caps[1].to_string());

	let message = ERROR_LINE
		.find(stderr)
		.map(|m| m.as_str().trim().to_string())
		.or_else(|| {
			stderr
				.lines()
				.rev()
				.map(str::trim)
				.find(|line| !line.is_empty())
				.map(str::to_string)
		})
		.unwrap_or_else(|| "Module evaluation failed".to_string());

	ModuleError::new(code, message)
}

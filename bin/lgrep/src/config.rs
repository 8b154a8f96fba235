//! Settings resolution: command line over config file over built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};

use lgrep_elastic::DEFAULT_ENDPOINT;
use lgrep_search::{Query, SearchSpec};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::cli::Cli;

const DEFAULT_FORMAT: &str = ".";

/// Problems with the user's input, reported before anything is sent.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("no endpoint given, pass --endpoint or set LGREP_ENDPOINT")]
	MissingEndpoint,

	#[error("no query given, pass query words or --query-file")]
	MissingQuery,

	#[error("failed to read {path}: {error}")]
	Read {
		path: PathBuf,
		error: std::io::Error,
	},

	#[error("invalid config file {path}: {error}")]
	Parse {
		path: PathBuf,
		error: toml::de::Error,
	},

	#[error("invalid query file {path}: {error}")]
	QueryFile {
		path: PathBuf,
		error: lgrep_search::Error,
	},
}

/// Defaults read from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
	pub endpoint: Option<String>,
	pub index: Vec<String>,
	pub size: Option<usize>,
	pub format: Option<String>,
}

impl FileConfig {
	/// Loads `path`, or the default location when `None`.
	///
	/// A missing default file yields empty defaults; a missing explicit file
	/// is an error.
	pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
		let (path, explicit) = match path {
			Some(path) => (path.to_path_buf(), true),
			None => match default_path() {
				Some(path) => (path, false),
				None => return Ok(Self::default()),
			},
		};
		let text = match fs::read_to_string(&path) {
			Ok(text) => text,
			Err(error) if !explicit && error.kind() == std::io::ErrorKind::NotFound => {
				debug!(path = %path.display(), "no config file");
				return Ok(Self::default());
			}
			Err(error) => return Err(ConfigError::Read { path, error }),
		};
		debug!(path = %path.display(), "loading config file");
		toml::from_str(&text).map_err(|error| ConfigError::Parse { path, error })
	}
}

/// `$XDG_CONFIG_HOME/lgrep/config.toml` or the platform equivalent.
pub fn default_path() -> Option<PathBuf> {
	dirs::config_dir().map(|dir| dir.join("lgrep").join("config.toml"))
}

/// Everything a run needs, fully resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
	pub endpoint: String,
	pub query: Query,
	pub spec: SearchSpec,
	pub format: String,
	pub tabulate: bool,
}

impl Settings {
	pub fn resolve(cli: Cli, file: FileConfig) -> Result<Self, ConfigError> {
		let endpoint = cli
			.endpoint
			.or(file.endpoint)
			.unwrap_or_else(|| DEFAULT_ENDPOINT.to_owned());
		if endpoint.trim().is_empty() {
			return Err(ConfigError::MissingEndpoint);
		}

		let query = match &cli.query_file {
			Some(path) => read_query_file(path)?,
			None if cli.query.is_empty() => return Err(ConfigError::MissingQuery),
			None => Query::lucene(cli.query.join(" ")),
		};

		let indices = if cli.index.is_empty() { file.index } else { cli.index };
		let mut spec = SearchSpec::new()
			.with_fields(cli.fields)
			.with_raw(cli.raw)
			.with_debug(cli.debug)
			.with_skip_validation(cli.skip_validate);
		spec.size = cli.size.or(file.size);
		spec.sort_time = cli.sort.and_then(|sort| sort.order());
		spec = indices.into_iter().fold(spec, SearchSpec::with_index);
		spec = cli.doc_type.into_iter().fold(spec, SearchSpec::with_type);

		Ok(Self {
			endpoint,
			query,
			spec,
			format: cli
				.format
				.or(file.format)
				.unwrap_or_else(|| DEFAULT_FORMAT.to_owned()),
			tabulate: cli.tabulate,
		})
	}
}

fn read_query_file(path: &Path) -> Result<Query, ConfigError> {
	let bytes = fs::read(path).map_err(|error| ConfigError::Read {
		path: path.to_path_buf(),
		error,
	})?;
	Query::from_json(&bytes).map_err(|error| ConfigError::QueryFile {
		path: path.to_path_buf(),
		error,
	})
}

use std::path::PathBuf;

use clap::{ArgGroup, Parser, ValueEnum};
use lgrep_search::SortOrder;

#[derive(Parser, Debug)]
#[command(name = "lgrep")]
#[command(about = "Search Elasticsearch indices and print each result through a template")]
#[command(version)]
#[command(group(ArgGroup::new("source").args(["query", "query_file"])))]
/// Command-line arguments.
pub struct Cli {
	/// Lucene query; words are joined with spaces
	pub query: Vec<String>,

	/// Read a raw JSON request body from this file instead
	#[arg(short = 'Q', long, value_name = "PATH")]
	pub query_file: Option<PathBuf>,

	/// Search server endpoint
	#[arg(short, long, env = "LGREP_ENDPOINT", value_name = "URL")]
	pub endpoint: Option<String>,

	/// Number of results to fetch
	#[arg(short = 'n', long)]
	pub size: Option<usize>,

	/// Index or index pattern to search (repeatable)
	#[arg(short, long = "index", value_name = "INDEX")]
	pub index: Vec<String>,

	/// Document type to search (repeatable)
	#[arg(short = 't', long = "type", value_name = "TYPE")]
	pub doc_type: Vec<String>,

	/// Only return these fields (comma-separated)
	#[arg(long, value_delimiter = ',')]
	pub fields: Vec<String>,

	/// Output format, e.g. '.host .message' or '{{.host}}: {{.message}}'
	#[arg(short, long)]
	pub format: Option<String>,

	/// Return whole hits including server metadata
	#[arg(long)]
	pub raw: bool,

	/// Align tab-separated output into columns
	#[arg(short = 'T', long)]
	pub tabulate: bool,

	/// Order results by time
	#[arg(long, value_enum)]
	pub sort: Option<SortArg>,

	/// Log request bodies as they are sent
	#[arg(short = 'D', long)]
	pub debug: bool,

	/// Skip the validation request before searching
	#[arg(long)]
	pub skip_validate: bool,

	/// Verbose logging
	#[arg(short, long)]
	pub verbose: bool,

	/// Config file to read instead of the default location
	#[arg(long, value_name = "PATH")]
	pub config: Option<PathBuf>,
}

/// Time ordering choices.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortArg {
	Asc,
	Desc,
	None,
}

impl SortArg {
	pub fn order(self) -> Option<SortOrder> {
		match self {
			Self::Asc => Some(SortOrder::Asc),
			Self::Desc => Some(SortOrder::Desc),
			Self::None => None,
		}
	}
}

use comfy_table::presets::NOTHING;
use comfy_table::{ContentArrangement, Table};

use crate::{Result, field_tokens};

/// Lays rendered lines out as aligned columns.
///
/// Each pushed line is split on tabs into cells, so a format such as
/// `.host\t.level\t.message` produces one column per field.
#[derive(Debug, Clone, Default)]
pub struct Tabulator {
	header: Option<Vec<String>>,
	rows: Vec<Vec<String>>,
}

impl Tabulator {
	pub fn new() -> Self {
		Self::default()
	}

	/// Tabulator whose header names the fields used in `format`.
	pub fn with_header(format: &str) -> Result<Self> {
		let header = field_tokens(format)?
			.into_iter()
			.map(|token| token.trim_start_matches('.').to_owned())
			.collect();
		Ok(Self {
			header: Some(header),
			rows: Vec::new(),
		})
	}

	pub fn push(&mut self, line: &str) {
		self.rows.push(line.split('\t').map(str::to_owned).collect());
	}

	pub fn len(&self) -> usize {
		self.rows.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rows.is_empty()
	}

	/// Renders all rows, one line per row with trailing padding removed.
	pub fn render(&self) -> String {
		let mut table = Table::new();
		table.load_preset(NOTHING);
		table.set_content_arrangement(ContentArrangement::Disabled);
		if let Some(header) = &self.header {
			table.set_header(header);
		}
		for row in &self.rows {
			table.add_row(row);
		}
		table
			.lines()
			.map(|line| line.trim_end().to_owned())
			.collect::<Vec<_>>()
			.join("\n")
	}
}

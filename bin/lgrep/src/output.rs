use std::io::{self, Write};

use lgrep_format::{FormatError, Formatter, Tabulator};
use lgrep_search::{Document, Error, SearchStream};
use tracing::warn;

/// Writes rendered results as they arrive, or buffers them for tabulation.
pub struct Printer<W> {
	formatter: Formatter,
	table: Option<Tabulator>,
	out: W,
	printed: usize,
}

impl<W: Write> Printer<W> {
	pub fn new(formatter: Formatter, tabulate: bool, out: W) -> Result<Self, FormatError> {
		let table = match (tabulate, formatter.is_raw()) {
			(false, _) => None,
			(true, true) => Some(Tabulator::new()),
			(true, false) => Some(Tabulator::with_header(formatter.format())?),
		};
		Ok(Self {
			formatter,
			table,
			out,
			printed: 0,
		})
	}

	/// Consumes `stream`, stopping it on the first fatal error.
	pub async fn print(&mut self, stream: &mut SearchStream) -> lgrep_search::Result<()> {
		stream.for_each(|doc| self.result(&doc), skip_bad_documents).await
	}

	fn result(&mut self, doc: &Document) -> lgrep_search::Result<()> {
		let line = match self.formatter.render(doc) {
			Ok(line) => line,
			Err(err) => {
				warn!(error = %err, "failed to format result");
				return Ok(());
			}
		};
		match &mut self.table {
			Some(table) => table.push(&line),
			None => writeln!(self.out, "{line}").map_err(Error::handler)?,
		}
		self.printed += 1;
		Ok(())
	}

	/// Flushes buffered output and returns how many results were printed.
	pub fn finish(mut self) -> io::Result<usize> {
		if let Some(table) = self.table.take()
			&& !table.is_empty()
		{
			writeln!(self.out, "{}", table.render())?;
		}
		self.out.flush()?;
		Ok(self.printed)
	}
}

/// A single corrupt hit is not worth aborting the search for.
fn skip_bad_documents(err: Error) -> lgrep_search::Result<()> {
	match err {
		Error::Document { .. } | Error::EmptyHit { .. } => {
			warn!(error = %err, "skipping result");
			Ok(())
		}
		other => Err(other),
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	fn doc(host: &str, level: &str) -> Document {
		Document::Source(format!(r#"{{"host":"{host}","level":"{level}"}}"#).into_bytes())
	}

	#[test]
	fn lines_are_written_as_they_arrive() {
		let mut out = Vec::new();
		let mut printer = Printer::new(Formatter::new(".host .level").unwrap(), false, &mut out).unwrap();
		printer.result(&doc("web-1", "INFO")).unwrap();
		printer.result(&Document::Source(b"{".to_vec())).unwrap();
		printer.result(&doc("web-2", "WARN")).unwrap();

		assert_eq!(printer.finish().unwrap(), 2);
		assert_eq!(String::from_utf8(out).unwrap(), "web-1 INFO\nweb-2 WARN\n");
	}

	#[test]
	fn tables_are_written_on_finish() {
		let mut out = Vec::new();
		let mut printer = Printer::new(Formatter::new(".host\t.level").unwrap(), true, &mut out).unwrap();
		printer.result(&doc("web-1", "INFO")).unwrap();
		printer.result(&doc("database-primary", "WARN")).unwrap();
		assert_eq!(printer.finish().unwrap(), 2);

		let text = String::from_utf8(out).unwrap();
		let lines: Vec<&str> = text.lines().collect();
		assert_eq!(lines.len(), 3);
		assert_eq!(lines[1].find("INFO"), lines[2].find("WARN"));
	}

	#[test]
	fn only_bad_documents_are_skipped() {
		let corrupt = Error::EmptyHit { id: "7".into() };
		assert!(skip_bad_documents(corrupt).is_ok());
		assert!(skip_bad_documents(Error::Transport("reset".into())).is_err());
	}
}

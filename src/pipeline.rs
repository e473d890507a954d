use std::io::{BufRead, Write};

use crate::domain::Threshold;
use crate::error::SimError;
use crate::identifier::{Identifier, parse_identifier_group};
use crate::output::RecordSerializer;
use crate::record::{ResultSet, dedupe};
use crate::similarity::{SimilaritySearch, query};

/// Lines starting with one of these (case-insensitive) are header rows.
pub const HEADER_TOKENS: &[&str] = &["smiles", "query"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub lines_read: usize,
    pub lines_written: usize,
    pub lines_skipped: usize,
    pub tokens_dropped: usize,
    pub queries: usize,
    pub records: usize,
}

pub struct Pipeline<S: SimilaritySearch> {
    search: S,
    threshold: Threshold,
    serializer: &'static dyn RecordSerializer,
    human: bool,
}

impl<S: SimilaritySearch> Pipeline<S> {
    pub fn new(
        search: S,
        threshold: Threshold,
        serializer: &'static dyn RecordSerializer,
        human: bool,
    ) -> Self {
        Self {
            search,
            threshold,
            serializer,
            human,
        }
    }

    /// Runs every line of `reader` through the pipeline, writing one entry per
    /// processed line. The first remote failure aborts the run.
    pub fn run<R: BufRead, W: Write>(
        &self,
        reader: R,
        writer: &mut W,
    ) -> Result<RunSummary, SimError> {
        let mut summary = RunSummary::default();
        if self.human {
            self.serializer.write_header(writer)?;
        }
        for line in reader.lines() {
            let line = line?;
            summary.lines_read += 1;
            match self.process_line(&line, &mut summary)? {
                Some(rendered) => {
                    writer.write_all(rendered.as_bytes())?;
                    summary.lines_written += 1;
                }
                None => summary.lines_skipped += 1,
            }
        }
        writer.flush()?;
        Ok(summary)
    }

    /// Returns `None` for blank and header lines.
    pub fn process_line(
        &self,
        line: &str,
        summary: &mut RunSummary,
    ) -> Result<Option<String>, SimError> {
        if is_skippable(line) {
            tracing::debug!(line, "skipping blank or header line");
            return Ok(None);
        }

        let (identifiers, dropped) = parse_identifier_group(line);
        if dropped > 0 {
            tracing::debug!(dropped, line, "dropped unrecognized identifiers");
        }
        summary.tokens_dropped += dropped;

        let results = self.collect(&identifiers, summary)?;
        summary.records += results.len();

        let name = identifiers
            .iter()
            .map(Identifier::as_str)
            .collect::<Vec<_>>()
            .join(",");
        tracing::info!(query = %name, hits = results.len(), "line processed");
        Ok(Some(self.serializer.serialize_line(
            &results, self.human, &name,
        )))
    }

    fn collect(
        &self,
        identifiers: &[Identifier],
        summary: &mut RunSummary,
    ) -> Result<ResultSet, SimError> {
        let mut pool = Vec::new();
        for identifier in identifiers {
            summary.queries += 1;
            for record in query(&self.search, identifier, self.threshold) {
                pool.push(record?);
            }
        }
        Ok(dedupe(pool))
    }
}

pub fn is_skippable(line: &str) -> bool {
    let trimmed = line.trim_start();
    if trimmed.is_empty() {
        return true;
    }
    let lower = trimmed.to_lowercase();
    HEADER_TOKENS.iter().any(|token| lower.starts_with(token))
}

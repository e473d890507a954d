use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Cursor, Read, Write};

use camino::Utf8Path;

use crate::config::RunConfig;
use crate::convert::StructureConverter;
use crate::error::SimError;
use crate::output::serializer_for;
use crate::pipeline::{Pipeline, RunSummary};
use crate::similarity::SimilaritySearch;

#[derive(Clone)]
pub struct App<S: SimilaritySearch, C: StructureConverter> {
    search: S,
    converter: C,
}

impl<S: SimilaritySearch, C: StructureConverter> App<S, C> {
    pub fn new(search: S, converter: C) -> Self {
        Self { search, converter }
    }

    /// Opens the configured streams (standard streams by default) and runs the
    /// pipeline. Both streams are released when this returns, on any path.
    pub fn run(&self, config: &RunConfig) -> Result<RunSummary, SimError> {
        let input = open_input(config.input.as_deref())?;
        let mut output = open_output(config.output.as_deref())?;
        let summary = self.run_streams(config, input, &mut output)?;
        output.flush()?;
        Ok(summary)
    }

    pub fn run_streams<R: BufRead, W: Write>(
        &self,
        config: &RunConfig,
        input: R,
        output: &mut W,
    ) -> Result<RunSummary, SimError> {
        tracing::info!(
            threshold = %config.threshold,
            source = %config.source_format,
            destination = %config.destination_format,
            human = config.human,
            "starting similarity run"
        );
        let serializer = serializer_for(config.destination_format);
        let pipeline = Pipeline::new(&self.search, config.threshold, serializer, config.human);

        let summary = if config.source_format.needs_conversion() {
            let converted = self.convert(input)?;
            pipeline.run(converted, output)?
        } else {
            pipeline.run(input, output)?
        };

        tracing::info!(
            lines_read = summary.lines_read,
            lines_written = summary.lines_written,
            lines_skipped = summary.lines_skipped,
            tokens_dropped = summary.tokens_dropped,
            queries = summary.queries,
            records = summary.records,
            "similarity run finished"
        );
        Ok(summary)
    }

    /// Converts the whole SDF stream to SMILES before any line is processed.
    fn convert<R: Read>(&self, mut input: R) -> Result<Cursor<Vec<u8>>, SimError> {
        let mut sdf = String::new();
        input.read_to_string(&mut sdf)?;
        let lines = self.converter.ctab_to_smiles(&sdf)?;
        tracing::debug!(structures = lines.len(), "converted SDF input");
        let mut text = lines.join("\n");
        text.push('\n');
        Ok(Cursor::new(text.into_bytes()))
    }
}

pub fn open_input(path: Option<&Utf8Path>) -> Result<Box<dyn BufRead>, SimError> {
    match path {
        Some(path) => {
            let file =
                File::open(path).map_err(|_| SimError::MissingInput(path.as_std_path().into()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(io::stdin().lock())),
    }
}

pub fn open_output(path: Option<&Utf8Path>) -> Result<Box<dyn Write>, SimError> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .map_err(|err| SimError::Io(format!("create {path}: {err}")))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}

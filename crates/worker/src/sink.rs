//! JSON-lines rep output.

use std::io::{BufWriter, Write};

use repsense_core::{RepRecord, RepResult, RepSink};
use serde::Serialize;

use crate::config::Endpoint;
use crate::error::{WorkerError, WorkerResult};

/// One output line: the persisted record tagged with its exercise.
#[derive(Debug, Serialize)]
struct SinkLine<'a> {
    exercise: &'a str,
    #[serde(flatten)]
    record: RepRecord,
}

/// Open the output endpoint for buffered writing.
pub fn open_output(endpoint: &Endpoint) -> WorkerResult<Box<dyn Write + Send>> {
    match endpoint {
        Endpoint::Stdio => Ok(Box::new(BufWriter::new(std::io::stdout()))),
        Endpoint::Path(path) => {
            let file = std::fs::File::create(path)?;
            Ok(Box::new(BufWriter::new(file)))
        }
    }
}

/// Writes each rep as one JSON object per line.
pub struct JsonLinesSink<W> {
    writer: W,
    written: usize,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn flush(&mut self) -> WorkerResult<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RepSink for JsonLinesSink<W> {
    type Error = WorkerError;

    fn emit(&mut self, rep: &RepResult) -> Result<(), Self::Error> {
        let line = SinkLine {
            exercise: &rep.exercise,
            record: rep.to_record(),
        };
        serde_json::to_writer(&mut self.writer, &line).map_err(WorkerError::Encode)?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }
}

//! JSON-lines frame input.
//!
//! Each non-empty line is one frame, `{"frame": 12, "landmarks": [...]}`
//! with `landmarks` a list of `{"x": .., "y": ..}` points indexed by
//! landmark id, or `null` when nothing was detected. The stream may open
//! with a `{"fps": 30.0}` header carrying the source frame rate.

use repsense_core::FrameSample;
use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Split};

use crate::config::Endpoint;
use crate::error::{WorkerError, WorkerResult};

/// One decoded input line.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum InputLine {
    Header { fps: f64 },
    Frame(FrameSample),
}

/// Open the input endpoint for buffered async reading.
pub async fn open_input(endpoint: &Endpoint) -> WorkerResult<Box<dyn AsyncBufRead + Unpin + Send>> {
    match endpoint {
        Endpoint::Stdio => Ok(Box::new(BufReader::new(tokio::io::stdin()))),
        Endpoint::Path(path) => {
            let file = tokio::fs::File::open(path).await?;
            Ok(Box::new(BufReader::new(file)))
        }
    }
}

/// Reads [`InputLine`]s, skipping blank lines.
///
/// Lines are split on raw bytes, so invalid UTF-8 is just another malformed
/// line: skipped with a warning, or returned as [`WorkerError::Decode`] when
/// `strict` is set.
pub struct FrameReader<R> {
    lines: Split<R>,
    line_no: usize,
    skipped: usize,
    strict: bool,
}

impl<R: AsyncBufRead + Unpin> FrameReader<R> {
    pub fn new(reader: R, strict: bool) -> Self {
        Self {
            lines: reader.split(b'\n'),
            line_no: 0,
            skipped: 0,
            strict,
        }
    }

    /// Number of malformed lines skipped so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub async fn next_line(&mut self) -> WorkerResult<Option<InputLine>> {
        while let Some(line) = self.lines.next_segment().await? {
            self.line_no += 1;
            let trimmed = line.trim_ascii();
            if trimmed.is_empty() {
                continue;
            }

            match serde_json::from_slice::<InputLine>(trimmed) {
                Ok(parsed) => return Ok(Some(parsed)),
                Err(source) if self.strict => {
                    return Err(WorkerError::Decode {
                        line: self.line_no,
                        source,
                    });
                }
                Err(e) => {
                    self.skipped += 1;
                    tracing::warn!(line = self.line_no, error = %e, "Skipping malformed input line");
                }
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    async fn read_all(input: &[u8], strict: bool) -> (WorkerResult<Vec<InputLine>>, usize) {
        let mut reader = FrameReader::new(input, strict);
        let mut out = Vec::new();
        loop {
            match reader.next_line().await {
                Ok(Some(line)) => out.push(line),
                Ok(None) => return (Ok(out), reader.skipped()),
                Err(e) => return (Err(e), reader.skipped()),
            }
        }
    }

    #[tokio::test]
    async fn decodes_header_and_frames() {
        let input = "{\"fps\": 25}\n\n{\"frame\": 0, \"landmarks\": null}\n{\"frame\": 1}\n";
        let (lines, skipped) = read_all(input.as_bytes(), false).await;
        let lines = lines.unwrap();
        assert_eq!(skipped, 0);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], InputLine::Header { fps: 25.0 });
        assert_matches!(&lines[1], InputLine::Frame(f) if f.index == 0 && !f.has_detection());
        assert_matches!(&lines[2], InputLine::Frame(f) if f.index == 1);
    }

    #[tokio::test]
    async fn lenient_mode_skips_garbage() {
        let input = "not json\n{\"frame\": 3, \"landmarks\": [{\"x\": 0.1, \"y\": 0.2}]}\n";
        let (lines, skipped) = read_all(input.as_bytes(), false).await;
        let lines = lines.unwrap();
        assert_eq!(skipped, 1);
        assert_eq!(lines.len(), 1);
    }

    #[tokio::test]
    async fn strict_mode_reports_line_number() {
        let input = "{\"frame\": 0}\n\n{\"frame\": \"one\"}\n";
        let (lines, _) = read_all(input.as_bytes(), true).await;
        assert_matches!(lines, Err(WorkerError::Decode { line: 3, .. }));
    }

    #[tokio::test]
    async fn invalid_utf8_is_skipped_in_lenient_mode() {
        let input = b"{\"frame\": 0}\n\xff\xfe\n{\"frame\": 1}\r\n";
        let (lines, skipped) = read_all(input, false).await;
        let lines = lines.unwrap();
        assert_eq!(skipped, 1);
        assert_matches!(&lines[..], [InputLine::Frame(a), InputLine::Frame(b)] if a.index == 0 && b.index == 1);
    }

    #[tokio::test]
    async fn invalid_utf8_is_a_decode_error_in_strict_mode() {
        let (lines, _) = read_all(b"\xff\xfe\n", true).await;
        assert_matches!(lines, Err(WorkerError::Decode { line: 1, .. }));
    }
}

//! Frame stream -> session analyzer -> rep sink.

use std::io::Write;

use repsense_core::{AnalysisConfig, SessionAnalyzer, SessionSummary};
use tokio::io::AsyncBufRead;

use crate::config::WorkerConfig;
use crate::error::WorkerResult;
use crate::sink::{open_output, JsonLinesSink};
use crate::source::{open_input, FrameReader, InputLine};

/// Run the worker end to end with the configured endpoints.
pub async fn run(config: &WorkerConfig) -> WorkerResult<SessionSummary> {
    let analysis = config.analysis_config()?;
    let reader = open_input(&config.input).await?;
    let writer = open_output(&config.output)?;
    process_stream(reader, writer, &analysis, config.fps, config.strict).await
}

/// Analyze every frame from `reader`, writing reps to `writer` as they are
/// finalized. A leading `{"fps": ..}` header overrides `fallback_fps`.
pub async fn process_stream<R, W>(
    reader: R,
    writer: W,
    analysis: &AnalysisConfig,
    fallback_fps: f64,
    strict: bool,
) -> WorkerResult<SessionSummary>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut frames = FrameReader::new(reader, strict);
    let mut sink = JsonLinesSink::new(writer);

    let (fps, mut pending) = match frames.next_line().await? {
        Some(InputLine::Header { fps }) => {
            tracing::info!(fps, "Using frame rate from stream header");
            (fps, None)
        }
        first => (fallback_fps, first),
    };

    let mut analyzer = SessionAnalyzer::new(analysis, fps)?;

    loop {
        let line = match pending.take() {
            Some(line) => line,
            None => match frames.next_line().await? {
                Some(line) => line,
                None => break,
            },
        };

        let frame = match line {
            InputLine::Frame(frame) => frame,
            InputLine::Header { fps: ignored } => {
                tracing::warn!(fps = ignored, "Ignoring stream header after the first line");
                continue;
            }
        };

        let outcome = analyzer.process_into(&frame, &mut sink)?;
        if outcome.switched {
            tracing::info!(
                frame = outcome.frame,
                exercise = outcome.active_exercise.as_deref(),
                "Active exercise changed",
            );
        }
        if let Some(rep) = &outcome.rep {
            tracing::info!(
                exercise = %rep.exercise,
                rep = rep.rep,
                min_depth = rep.min_depth,
                duration_sec = rep.duration_sec,
                valid_depth = rep.valid_depth,
                "Rep recorded",
            );
        }
    }

    sink.flush()?;

    let pending_reps = analyzer.pending_reps();
    if !pending_reps.is_empty() {
        tracing::info!(exercises = ?pending_reps, "Input ended mid-rep; incomplete reps dropped");
    }

    let summary = analyzer.summary().clone();
    tracing::info!(
        frames = summary.frames,
        frames_without_detection = summary.frames_without_detection,
        skipped_lines = frames.skipped(),
        total_reps = summary.total_reps,
        valid_reps = summary.valid_reps,
        "Stream processed",
    );
    Ok(summary)
}

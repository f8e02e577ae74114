use std::fmt;
use std::path::PathBuf;

use repsense_core::{AnalysisConfig, ExerciseConfig};

use crate::error::{WorkerError, WorkerResult};

/// Frame rate assumed when the stream carries no header.
pub const DEFAULT_FPS: f64 = 30.0;

/// Where frames are read from or records written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Stdio,
    Path(PathBuf),
}

impl Endpoint {
    /// `-` (or an empty value) selects stdin/stdout.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "" | "-" => Self::Stdio,
            path => Self::Path(PathBuf::from(path)),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdio => f.write_str("-"),
            Self::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Worker configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub input: Endpoint,
    pub output: Endpoint,
    /// Fallback frame rate when the stream has no `{"fps": ...}` header.
    pub fps: f64,
    /// Optional JSON file holding an [`AnalysisConfig`].
    pub config_path: Option<PathBuf>,
    /// Preset exercises to track, in priority order. Overrides the list
    /// from `config_path`.
    pub exercises: Option<Vec<String>>,
    /// Fail on malformed input lines instead of skipping them.
    pub strict: bool,
}

impl WorkerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var              | Default                  |
    /// |----------------------|--------------------------|
    /// | `REPSENSE_INPUT`     | `-` (stdin)              |
    /// | `REPSENSE_OUTPUT`    | `-` (stdout)             |
    /// | `REPSENSE_FPS`       | `30`                     |
    /// | `REPSENSE_CONFIG`    | unset (built-in config)  |
    /// | `REPSENSE_EXERCISES` | unset (all presets)      |
    /// | `REPSENSE_STRICT`    | `false`                  |
    pub fn from_env() -> WorkerResult<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable lookup.
    pub fn from_vars<F>(var: F) -> WorkerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let input = Endpoint::parse(&var("REPSENSE_INPUT").unwrap_or_default());
        let output = Endpoint::parse(&var("REPSENSE_OUTPUT").unwrap_or_default());

        let fps = match var("REPSENSE_FPS") {
            Some(raw) => raw.trim().parse::<f64>().map_err(|_| {
                WorkerError::Config(format!("REPSENSE_FPS must be a number, got '{raw}'"))
            })?,
            None => DEFAULT_FPS,
        };
        if !(fps.is_finite() && fps > 0.0) {
            return Err(WorkerError::Config(format!(
                "REPSENSE_FPS must be > 0, got {fps}"
            )));
        }

        let config_path = var("REPSENSE_CONFIG")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let exercises = var("REPSENSE_EXERCISES")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|list| !list.is_empty());

        let strict = var("REPSENSE_STRICT")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            input,
            output,
            fps,
            config_path,
            exercises,
            strict,
        })
    }

    /// Build and validate the analysis configuration.
    pub fn analysis_config(&self) -> WorkerResult<AnalysisConfig> {
        let mut config = match &self.config_path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                serde_json::from_str::<AnalysisConfig>(&raw).map_err(|e| {
                    WorkerError::Config(format!("{}: {e}", path.display()))
                })?
            }
            None => AnalysisConfig::default(),
        };

        if let Some(names) = &self.exercises {
            config.exercises = names
                .iter()
                .map(|name| ExerciseConfig::preset(name))
                .collect::<Result<_, _>>()?;
        }

        config.validate()?;
        Ok(config)
    }
}

//! `repsense-worker` -- rep counting over a pose-landmark stream.
//!
//! Reads one JSON frame per line, tracks the configured exercises, and
//! writes one JSON record per completed rep. Logs go to stderr so stdout
//! can carry records.
//!
//! # Environment variables
//!
//! | Variable             | Required | Default | Description                                 |
//! |----------------------|----------|---------|---------------------------------------------|
//! | `REPSENSE_INPUT`     | no       | `-`     | Frame stream path, `-` for stdin            |
//! | `REPSENSE_OUTPUT`    | no       | `-`     | Rep record path, `-` for stdout             |
//! | `REPSENSE_FPS`       | no       | `30`    | Frame rate when the stream has no header    |
//! | `REPSENSE_CONFIG`    | no       | --      | JSON analysis config file                   |
//! | `REPSENSE_EXERCISES` | no       | --      | Comma-separated presets, e.g. `Squat,Push-Up` |
//! | `REPSENSE_STRICT`    | no       | `false` | Fail on malformed input lines               |
//! | `LOG_FORMAT`         | no       | --      | `json` for structured log lines             |

use repsense_worker::config::WorkerConfig;
use repsense_worker::pipeline;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "repsense_worker=info,repsense_core=info".into()),
        )
        .with(json_logs.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();

    let config = WorkerConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid worker configuration");
        std::process::exit(1);
    });

    tracing::info!(
        input = %config.input,
        output = %config.output,
        fps = config.fps,
        strict = config.strict,
        "Starting repsense-worker",
    );

    match pipeline::run(&config).await {
        Ok(summary) => {
            tracing::info!(
                total_reps = summary.total_reps,
                valid_reps = summary.valid_reps,
                "Session complete",
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "Worker failed");
            std::process::exit(1);
        }
    }
}

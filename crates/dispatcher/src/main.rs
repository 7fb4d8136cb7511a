//! `gacek-dispatcher` -- submits queued test jobs to Testing Farm.
//!
//! Scans `<queues>/new` once, submits each job's subject and artifacts
//! as a Testing Farm request, records the returned id in the job
//! directory and moves the job to `<queues>/pending`. Exits non-zero if
//! the configuration is invalid or the run is aborted.
//!
//! See [`DispatcherConfig::from_env`] for the environment variables.

use gacek_dispatcher::config::DispatcherConfig;
use gacek_dispatcher::dispatch::Dispatcher;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "gacek_dispatcher=info,gacek_queue=info,gacek_testing_farm=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = DispatcherConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        std::process::exit(1);
    });

    let api_key = config.load_api_key().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to load Testing Farm API key");
        std::process::exit(1);
    });

    let dispatcher = Dispatcher::new(&config, api_key);
    match dispatcher.run().await {
        Ok(summary) => {
            for failed in &summary.failed {
                tracing::warn!(job = %failed.job, error = %failed.error, "Job left in new queue");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Dispatch aborted");
            std::process::exit(1);
        }
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0

//! Example: Full Job Lifecycle with a Tuned Retry Budget
//!
//! Reports start, a few progress steps, and the final status for one job,
//! with a custom endpoint and retry configuration.

use std::time::Duration;

use cronbeats_rs::{CronbeatsClient, CronbeatsClientConfig, CronbeatsError, ProgressOptions};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging (for demonstration)
    tracing_subscriber::fmt::init();

    let config = CronbeatsClientConfig {
        base_url: "https://cronbeats.io".to_string(),
        timeout: Duration::from_secs(10),
        max_retries: 3,
        retry_backoff: Duration::from_millis(500),
        retry_jitter: Duration::from_millis(250),
        ..Default::default()
    };

    let client = CronbeatsClient::new("YCrXzYbV", config)?;

    let started = client.start().await?;
    println!("started at {}", started.timestamp);

    for step in 0..3 {
        // Do a slice of the job's work here.
        let res = client
            .progress(ProgressOptions::new().seq(step).message(format!("step {step} done")))
            .await;

        match res {
            Ok(ping) => println!("progress {step}: processed in {} ms", ping.processing_time_ms),
            Err(err @ CronbeatsError::Api(_)) if !err.is_retryable() => {
                eprintln!("progress rejected: {err}");
                client.fail().await?;
                return Ok(());
            }
            Err(err) => {
                eprintln!("progress lost after retries: {err}");
            }
        }
    }

    let done = client.success().await?;
    println!(
        "finished; next run expected {}",
        done.next_expected.as_deref().unwrap_or("unknown")
    );

    Ok(())
}

// SPDX-License-Identifier: MIT OR Apache-2.0

use cronbeats_rs::{CronbeatsClient, CronbeatsClientConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = CronbeatsClient::new("YCrXzYbV", CronbeatsClientConfig::default())?;

    let res = client.ping().await?;

    println!("{}", res.ok);
    println!("{}", res.action);
    println!("{}", res.job_key);

    Ok(())
}

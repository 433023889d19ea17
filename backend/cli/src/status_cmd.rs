//! CLI Status Command
//!
//! Asks a running server for its `/health` report.

use anyhow::Result;
use std::time::Duration;

pub async fn run(port: u16) -> Result<()> {
    println!("\n📊 textlift status\n");

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?;
    match client
        .get(format!("http://127.0.0.1:{port}/health"))
        .send()
        .await
    {
        Ok(resp) => {
            let body: serde_json::Value = resp.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        Err(_) => {
            println!("textlift is not running on port {port}");
        }
    }

    Ok(())
}

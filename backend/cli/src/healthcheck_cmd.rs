//! Container health check: one GET against `/health`.
//!
//! Exit status is the only output that matters; nothing is retried.

use std::time::Duration;

/// `http://127.0.0.1:<port>/health` unless a full URL is given.
pub fn health_url(url: Option<String>, port: u16) -> String {
    url.unwrap_or_else(|| format!("http://127.0.0.1:{port}/health"))
}

/// `true` when the endpoint answered with a 2xx status.
pub async fn run(url: &str, timeout: Duration) -> bool {
    let client = match reqwest::Client::builder().timeout(timeout).build() {
        Ok(client) => client,
        Err(e) => {
            eprintln!("healthcheck: could not build HTTP client: {e}");
            return false;
        }
    };

    match client.get(url).send().await {
        Ok(resp) if resp.status().is_success() => true,
        Ok(resp) => {
            eprintln!("healthcheck: {url} returned {}", resp.status());
            false
        }
        Err(e) => {
            eprintln!("healthcheck: {url} unreachable: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_url_targets_loopback() {
        assert_eq!(health_url(None, 10000), "http://127.0.0.1:10000/health");
        assert_eq!(
            health_url(Some("http://web:8080/health".into()), 10000),
            "http://web:8080/health"
        );
    }

    #[tokio::test]
    async fn unreachable_server_fails() {
        // Bind then drop so the port is very likely closed.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        assert!(!run(&health_url(None, port), Duration::from_secs(2)).await);
    }

    #[tokio::test]
    async fn running_server_passes() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = textlift_config::ServiceConfig::default();
        config.storage.upload_dir = dir.path().to_path_buf();
        let app = textlift_gateway::build_router(textlift_gateway::GatewayState::new(config, None, None));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
        let server = tokio::spawn(textlift_gateway::serve_listener(listener, app, async {
            let _ = stop_rx.await;
        }));

        assert!(run(&health_url(None, port), Duration::from_secs(5)).await);
        assert!(!run(&format!("http://127.0.0.1:{port}/missing"), Duration::from_secs(5)).await);

        stop_tx.send(()).unwrap();
        server.await.unwrap().unwrap();
    }
}

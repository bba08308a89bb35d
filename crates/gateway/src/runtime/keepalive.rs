//! Periodic self-ping.

use std::time::Duration;

use guru_domain::config::KeepAliveConfig;
use guru_domain::trace::TraceEvent;
use reqwest::Client;
use tokio::task::JoinHandle;

/// Spawn the ping loop if a URL is configured. The first ping fires one
/// full interval after startup.
pub fn spawn(cfg: &KeepAliveConfig) -> Option<JoinHandle<()>> {
    let url = cfg.url.clone()?;
    let period = Duration::from_secs(cfg.interval_secs.max(1));

    let client = match Client::builder().timeout(Duration::from_secs(10)).build() {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(error = %e, "keepalive client could not be built, ping disabled");
            return None;
        }
    };

    tracing::info!(url = %url, interval_secs = period.as_secs(), "keepalive ping enabled");

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        loop {
            ticker.tick().await;
            ping_once(&client, &url).await;
        }
    }))
}

/// GET `url` once. Failures are logged and otherwise ignored.
pub async fn ping_once(client: &Client, url: &str) -> bool {
    let ok = match client.get(url).send().await {
        Ok(resp) if resp.status().is_success() => {
            tracing::info!(url, status = resp.status().as_u16(), "keepalive ping ok");
            true
        }
        Ok(resp) => {
            tracing::warn!(url, status = resp.status().as_u16(), "keepalive ping rejected");
            false
        }
        Err(e) => {
            tracing::warn!(url, error = %e, "keepalive ping failed");
            false
        }
    };
    TraceEvent::KeepAlivePing {
        url: url.to_owned(),
        ok,
    }
    .emit();
    ok
}

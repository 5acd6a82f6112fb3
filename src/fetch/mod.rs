// src/fetch/mod.rs

use reqwest::Client;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, warn};
use url::Url;

use crate::error::{HolidayError, Result};

/// Cabinet Office list of national holidays, Shift_JIS encoded.
pub const DEFAULT_SOURCE_URL: &str = "https://www8.cao.go.jp/chosei/shukujitsu/syukujitsu.csv";

/// Client with a bounded overall timeout so a stalled upstream cannot hang
/// startup forever.
pub fn build_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder()
        .timeout(timeout)
        .user_agent(concat!("holidaycal/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

async fn get_bytes_core(client: &Client, url: &Url) -> Result<Vec<u8>> {
    debug!("Fetching {}", url);
    let resp = client.get(url.clone()).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(HolidayError::BadStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(resp.bytes().await?.to_vec())
}

/// Download the raw source body, retrying with exponential backoff.
pub async fn download_source(
    client: &Client,
    url: &Url,
    max_retries: u32,
    initial_backoff_ms: u64,
) -> Result<Vec<u8>> {
    let mut attempts = 0;
    loop {
        match get_bytes_core(client, url).await {
            Ok(bytes) => return Ok(bytes),
            Err(e) if attempts < max_retries => {
                attempts += 1;
                let backoff = initial_backoff_ms * 2u64.pow(attempts - 1);
                warn!(%url, attempt = attempts, delay_ms = backoff, error = %e, "Retrying");
                sleep(Duration::from_millis(backoff)).await;
            }
            Err(e) => {
                error!(%url, error = %e, "Exhausted retries");
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use warp::Filter;

    async fn serve(status: u16) -> SocketAddr {
        let route = warp::path!("syukujitsu.csv").map(move || {
            warp::reply::with_status(
                "2026/1/1,x\n",
                warp::http::StatusCode::from_u16(status).unwrap(),
            )
        });
        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        addr
    }

    #[tokio::test]
    async fn downloads_body() {
        let addr = serve(200).await;
        let url = Url::parse(&format!("http://{}/syukujitsu.csv", addr)).unwrap();
        let client = build_client(Duration::from_secs(5)).unwrap();
        let body = download_source(&client, &url, 0, 1).await.unwrap();
        assert_eq!(body, b"2026/1/1,x\n");
    }

    #[tokio::test]
    async fn non_success_status_is_fatal_after_retries() {
        let addr = serve(503).await;
        let url = Url::parse(&format!("http://{}/syukujitsu.csv", addr)).unwrap();
        let client = build_client(Duration::from_secs(5)).unwrap();
        let err = download_source(&client, &url, 1, 1).await.unwrap_err();
        assert!(matches!(err, HolidayError::BadStatus { status: 503, .. }));
    }
}

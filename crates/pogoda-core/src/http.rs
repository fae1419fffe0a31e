//! Shared HTTP plumbing for the provider clients.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{Error, Result};

/// Default timeout for outbound provider requests, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Build a reusable client with a request timeout and optional User-Agent.
pub(crate) fn build_client(user_agent: Option<&str>, timeout: Duration) -> Result<Client> {
    let mut builder = Client::builder().timeout(timeout);
    if let Some(agent) = user_agent {
        builder = builder.user_agent(agent);
    }
    builder.build().map_err(Error::ClientBuild)
}

/// Trim a trailing slash and require an http(s) scheme.
pub(crate) fn normalize_base_url(base_url: &str) -> Result<String> {
    let base_url = base_url.trim().trim_end_matches('/').to_string();

    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(Error::InvalidUrl(format!(
            "URL must start with http:// or https://, got: {}",
            base_url
        )));
    }

    Ok(base_url)
}

/// Issue a single GET and decode the JSON body.
///
/// No retries: a transport failure or non-2xx status is returned as-is.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    query: &[(&str, String)],
) -> Result<T> {
    let request = client
        .get(url)
        .query(query)
        .build()
        .map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))?;
    let full_url = request.url().to_string();

    debug!("GET {}", full_url);

    let response = client
        .execute(request)
        .await
        .map_err(|e| Error::Transport {
            url: full_url.clone(),
            source: Box::new(e),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::HttpStatus {
            url: full_url,
            status: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(|e| Error::Transport {
        url: full_url.clone(),
        source: Box::new(e),
    })?;

    serde_json::from_str(&body).map_err(|e| Error::Decode {
        url: full_url,
        message: e.to_string(),
    })
}

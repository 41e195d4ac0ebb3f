use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::transport::StatusSnapshot;

/// Fetch the raw status document.
///
/// Any non-success response is an error. Callers treat every fetch error
/// the same way: log it and keep showing the current state.
pub async fn fetch_status_document(client: &Client, url: &str) -> Result<Value> {
    let resp = client
        .get(url)
        .send()
        .await
        .context("status request failed")?;

    let status_code = resp.status();
    if !status_code.is_success() {
        let error_body = resp.text().await.unwrap_or_else(|_| "<no body>".to_string());
        debug!(
            status_code = %status_code,
            error_body = %error_body,
            url = %url,
            "status poll: unexpected HTTP status"
        );
        bail!("status endpoint returned {}", status_code);
    }

    resp.json::<Value>()
        .await
        .context("status response is not valid JSON")
}

/// Fetch one status snapshot.
pub async fn fetch_status(client: &Client, url: &str) -> Result<StatusSnapshot> {
    let document = fetch_status_document(client, url).await?;
    let snapshot: StatusSnapshot =
        serde_json::from_value(document).context("status document has an unexpected shape")?;

    debug!(
        opcua_connected = snapshot.opcua_connected,
        detection_enabled = snapshot.detection_enabled,
        has_detection = snapshot.last_detection.is_some(),
        "status snapshot fetched"
    );
    Ok(snapshot)
}

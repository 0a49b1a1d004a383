//! Pinata pinning service client.
//!
//! Two endpoints: `POST /pinning/pinFileToIPFS` (multipart) for image bytes
//! and `POST /pinning/pinJSONToIPFS` for the metadata document. Both are
//! bearer-token authenticated and answer `{ "IpfsHash": ... }`. Failures
//! are fatal to the current mint attempt; retrying is a caller decision,
//! never done here.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use super::{ContentStore, MemoryMetadata};
use crate::error::{KeepRealError, Result};

/// Response shape shared by both pinning endpoints.
#[derive(Debug, Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

pub struct PinataStore {
    client: Client,
    api_url: String,
    jwt: String,
    gateway: String,
}

impl PinataStore {
    pub fn new(
        api_url: String,
        jwt: String,
        gateway: String,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| KeepRealError::UploadFailed(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            jwt,
            gateway: normalize_gateway(gateway),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.api_url)
    }

    async fn parse_pin_response(response: reqwest::Response) -> Result<String> {
        let status = response.status();
        if !status.is_success() {
            return Err(KeepRealError::UploadFailed(format!(
                "pinning service returned status {status}"
            )));
        }

        let parsed: PinResponse = response
            .json()
            .await
            .map_err(|e| KeepRealError::UploadFailed(format!("malformed pinning response: {e}")))?;
        Ok(parsed.ipfs_hash)
    }
}

fn normalize_gateway(gateway: String) -> String {
    if gateway.ends_with('/') {
        gateway
    } else {
        format!("{gateway}/")
    }
}

#[async_trait]
impl ContentStore for PinataStore {
    async fn store_image(&self, bytes: Vec<u8>) -> Result<String> {
        let file_name = format!("KeepItReal_{}.jpg", Utc::now().timestamp_millis());
        let byte_count = bytes.len();

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.clone())
            .mime_str("image/jpeg")
            .map_err(|e| KeepRealError::UploadFailed(format!("invalid multipart payload: {e}")))?;

        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("pinataMetadata", json!({ "name": file_name }).to_string())
            .text("pinataOptions", json!({ "cidVersion": 1 }).to_string());

        let response = self
            .client
            .post(self.endpoint("/pinning/pinFileToIPFS"))
            .bearer_auth(&self.jwt)
            .multipart(form)
            .send()
            .await
            .map_err(|e| KeepRealError::UploadFailed(e.to_string()))?;

        let cid = Self::parse_pin_response(response).await?;
        info!(cid = %cid, bytes = byte_count, "Pinned image");
        Ok(cid)
    }

    async fn store_metadata(&self, metadata: &MemoryMetadata) -> Result<String> {
        let timestamp_iso = metadata
            .timestamp
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .map(|dt| dt.to_rfc3339());

        let description = if metadata.caption.is_empty() {
            "Minted memory from Keep It Real".to_string()
        } else {
            metadata.caption.clone()
        };

        let body = json!({
            "pinataContent": {
                "name": "Reality Proof",
                "description": description,
                "image": format!("ipfs://{}", metadata.image_cid),
                "attributes": [
                    { "trait_type": "Caption", "value": metadata.caption },
                    { "trait_type": "Timestamp", "value": timestamp_iso },
                    { "trait_type": "Location", "value": metadata.location },
                ],
                // App recovery payload; everything above is display sugar.
                "keep_it_real_metadata": metadata,
            },
            "pinataMetadata": {
                "name": format!("Metadata_{}.json", Utc::now().timestamp_millis()),
            },
            "pinataOptions": { "cidVersion": 1 },
        });

        let response = self
            .client
            .post(self.endpoint("/pinning/pinJSONToIPFS"))
            .bearer_auth(&self.jwt)
            .json(&body)
            .send()
            .await
            .map_err(|e| KeepRealError::UploadFailed(e.to_string()))?;

        let cid = Self::parse_pin_response(response).await?;
        info!(cid = %cid, image_cid = %metadata.image_cid, "Pinned metadata document");
        Ok(cid)
    }

    async fn fetch_metadata(&self, cid: &str) -> Result<Option<MemoryMetadata>> {
        let url = self.gateway_url(cid);
        let response = self.client.get(&url).send().await.map_err(|e| {
            KeepRealError::MetadataResolutionFailed {
                cid: cid.to_string(),
                reason: e.to_string(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(KeepRealError::MetadataResolutionFailed {
                cid: cid.to_string(),
                reason: format!("gateway returned status {status}"),
            });
        }

        let is_json = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("application/json"));
        if !is_json {
            // Not a metadata document; the identifier is the image itself.
            debug!(cid, "Pinned content is not JSON, treating as raw image");
            return Ok(None);
        }

        let value: serde_json::Value = response.json().await.map_err(|e| {
            KeepRealError::MetadataResolutionFailed {
                cid: cid.to_string(),
                reason: format!("malformed JSON: {e}"),
            }
        })?;

        match value.get("keep_it_real_metadata") {
            Some(payload) => serde_json::from_value(payload.clone()).map(Some).map_err(|e| {
                KeepRealError::MetadataResolutionFailed {
                    cid: cid.to_string(),
                    reason: format!("unrecognized recovery payload: {e}"),
                }
            }),
            None => Ok(None),
        }
    }

    fn gateway_url(&self, cid: &str) -> String {
        format!("{}{cid}", self.gateway)
    }
}

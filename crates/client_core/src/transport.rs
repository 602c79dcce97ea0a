use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use shared::{domain::SlotId, error::ErrorBody, protocol::ResultSet};
use tracing::{debug, warn};
use url::Url;

use crate::{config::ClientConfig, error::CombineError, slots::SlotFile};

const FALLBACK_PART_MIME: &str = "application/octet-stream";

/// The seam between the submission workflow and the remote combine service.
#[async_trait]
pub trait CombineService: Send + Sync {
    async fn combine(&self, image1: &SlotFile, image2: &SlotFile)
        -> Result<ResultSet, CombineError>;
}

#[derive(Debug, Clone)]
pub struct HttpCombineService {
    http: Client,
    endpoint: Url,
}

impl HttpCombineService {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            endpoint: config.combine_endpoint(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Downloads one result image. Failures are scoped to that image.
    pub async fn fetch_result_image(&self, url: &str) -> Result<Vec<u8>> {
        let bytes = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("failed to request result image {url}"))?
            .error_for_status()
            .with_context(|| format!("result image {url} is unavailable"))?
            .bytes()
            .await
            .with_context(|| format!("failed to read result image {url}"))?;
        Ok(bytes.to_vec())
    }
}

fn file_part(file: &SlotFile) -> Result<Part, CombineError> {
    let content_type = match file.content_type().parse::<mime_guess::mime::Mime>() {
        Ok(_) => file.content_type(),
        Err(_) => {
            warn!(name = file.name(), mime = file.content_type(), "ignoring unparsable MIME type");
            FALLBACK_PART_MIME
        }
    };
    Part::bytes(file.bytes().to_vec())
        .file_name(file.name().to_string())
        .mime_str(content_type)
        .map_err(CombineError::from)
}

/// Maps a combine response to its outcome. A 2xx body must be a flat object
/// of strings; anything else is an error carrying the server's `error` field
/// when one is present.
pub fn interpret_response(status: u16, body: &[u8]) -> Result<ResultSet, CombineError> {
    if (200..300).contains(&status) {
        return serde_json::from_slice::<ResultSet>(body)
            .map_err(|err| CombineError::MalformedResult(err.to_string()));
    }
    let message = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.message().map(str::to_string));
    Err(CombineError::Server { status, message })
}

#[async_trait]
impl CombineService for HttpCombineService {
    async fn combine(
        &self,
        image1: &SlotFile,
        image2: &SlotFile,
    ) -> Result<ResultSet, CombineError> {
        let form = Form::new()
            .part(SlotId::Slot1.part_name(), file_part(image1)?)
            .part(SlotId::Slot2.part_name(), file_part(image2)?);

        debug!(endpoint = %self.endpoint, "posting combine request");
        let response = self
            .http
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        debug!(status, bytes = body.len(), "combine response received");
        interpret_response(status, &body)
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use crate::app::{GroupfeedError, Result};
use crate::capture::{Capture, CaptureReader};
use crate::normalizer::{QueryKind, QueryMarkers};

#[derive(Debug, Deserialize)]
struct Har {
    log: HarLog,
}

#[derive(Debug, Deserialize)]
struct HarLog {
    #[serde(default)]
    entries: Vec<HarEntry>,
}

#[derive(Debug, Deserialize)]
struct HarEntry {
    request: HarRequest,
    response: HarResponse,
}

#[derive(Debug, Deserialize)]
struct HarRequest {
    #[serde(default)]
    url: String,
    #[serde(rename = "postData")]
    post_data: Option<HarPostData>,
}

#[derive(Debug, Deserialize)]
struct HarPostData {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HarResponse {
    content: HarContent,
}

#[derive(Debug, Deserialize)]
struct HarContent {
    text: Option<String>,
    encoding: Option<String>,
}

/// One line of a capture log written by a page hook.
#[derive(Debug, Deserialize)]
struct LoggedExchange {
    #[serde(default)]
    request_body: String,
    #[serde(default)]
    response_text: String,
}

/// Reads HAR exports and newline-delimited capture logs from disk.
#[derive(Debug, Clone, Default)]
pub struct FileCaptureReader {
    markers: QueryMarkers,
}

impl FileCaptureReader {
    pub fn new(markers: QueryMarkers) -> Self {
        Self { markers }
    }

    /// Parse file content in either supported format.
    pub fn parse(&self, content: &str, source: &str) -> Result<Vec<Capture>> {
        if let Ok(har) = serde_json::from_str::<Har>(content) {
            return Ok(self.from_har(har, source));
        }
        self.from_log(content, source)
    }

    fn from_har(&self, har: Har, source: &str) -> Vec<Capture> {
        let mut captures = Vec::new();
        for (index, entry) in har.log.entries.into_iter().enumerate() {
            if !entry.request.url.to_ascii_lowercase().contains("graphql") {
                continue;
            }
            let origin = format!("{}#entry{}", source, index);

            if entry.response.content.encoding.as_deref() == Some("base64") {
                tracing::debug!(%origin, "skipping base64-encoded response body");
                continue;
            }

            let request_body = entry
                .request
                .post_data
                .and_then(|p| p.text)
                .unwrap_or_default();
            let body = entry.response.content.text.unwrap_or_default();
            if let Some(capture) = self.tag(&request_body, body, origin) {
                captures.push(capture);
            }
        }
        captures
    }

    fn from_log(&self, content: &str, source: &str) -> Result<Vec<Capture>> {
        let mut captures = Vec::new();
        let mut parsed_any = false;
        let mut blank = true;

        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            blank = false;
            let origin = format!("{}:{}", source, index + 1);

            match serde_json::from_str::<LoggedExchange>(line) {
                Ok(exchange) => {
                    parsed_any = true;
                    if let Some(capture) = self.tag(&exchange.request_body, exchange.response_text, origin) {
                        captures.push(capture);
                    }
                }
                Err(e) => {
                    tracing::warn!(%origin, error = %e, "skipping unreadable capture log line");
                }
            }
        }

        if !blank && !parsed_any {
            return Err(GroupfeedError::CaptureFormat(format!(
                "{} is neither a HAR export nor a capture log",
                source
            )));
        }
        Ok(captures)
    }

    fn tag(&self, request_body: &str, body: String, origin: String) -> Option<Capture> {
        match QueryKind::detect(request_body, &self.markers) {
            Some(kind) => Some(Capture { kind, body, origin }),
            None => {
                tracing::debug!(%origin, "request matches no known query");
                None
            }
        }
    }
}

#[async_trait]
impl CaptureReader for FileCaptureReader {
    async fn read(&self, path: &Path) -> Result<Vec<Capture>> {
        let content = tokio::fs::read_to_string(path).await?;
        let captures = self.parse(&content, &path.display().to_string())?;
        tracing::debug!(path = %path.display(), captures = captures.len(), "capture file read");
        Ok(captures)
    }
}

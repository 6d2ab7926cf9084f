use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::reader::{DocumentId, ReadingMode};

/// Failures talking to the conversion service. The message is what the
/// user sees next to the mode toggle.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{0}")]
    Upload(String),
    #[error("{0}")]
    Conversion(String),
}

#[derive(Deserialize)]
struct UploadResponse {
    doc_id: DocumentId,
}

#[derive(Deserialize)]
struct ConvertResponse {
    #[serde(default)]
    units: serde_json::Value,
}

/// A unit as sent by the service: either bare text or `{ page, text }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawUnit {
    Text(String),
    Paged {
        #[serde(default)]
        text: Option<String>,
    },
}

/// Client for the upload/convert endpoints.
#[derive(Clone)]
pub struct BackendClient {
    base_url: String,
    http: reqwest::Client,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// `base_url` followed by `segments`, each percent-encoded as a single
    /// path segment.
    fn endpoint(&self, segments: &[&str]) -> Result<reqwest::Url, String> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| format!("Invalid backend URL {}: {e}", self.base_url))?;
        url.path_segments_mut()
            .map_err(|()| format!("Invalid backend URL {}", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Upload a PDF and return the id the service assigned to it.
    pub async fn upload(&self, path: &Path) -> Result<DocumentId, BackendError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| BackendError::Upload(format!("Could not read {}: {e}", path.display())))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".into());

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/pdf")
            .map_err(|e| BackendError::Upload(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let url = self
            .endpoint(&["api", "documents"])
            .map_err(BackendError::Upload)?;
        log::info!("Uploading {} to {url}", path.display());
        let resp = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| BackendError::Upload(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            log::error!("Upload rejected with {status}");
            return Err(BackendError::Upload(failure_message(&text, "Upload failed")));
        }

        let body: UploadResponse = resp
            .json()
            .await
            .map_err(|e| BackendError::Upload(e.to_string()))?;
        log::info!("Uploaded as document {}", body.doc_id);
        Ok(body.doc_id)
    }

    /// Fetch the converted units of an uploaded document.
    pub async fn convert(
        &self,
        doc_id: &DocumentId,
        mode: ReadingMode,
    ) -> Result<Vec<String>, BackendError> {
        let url = self
            .endpoint(&["api", "documents", doc_id.as_str(), "convert"])
            .map_err(BackendError::Conversion)?;
        log::info!("Converting {doc_id} ({})", mode.as_query());
        let resp = self
            .http
            .get(url)
            .query(&[("mode", mode.as_query())])
            .send()
            .await
            .map_err(|e| BackendError::Conversion(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            log::error!("Conversion rejected with {status}");
            return Err(BackendError::Conversion(failure_message(&text, "Convert failed")));
        }

        let body: ConvertResponse = resp
            .json()
            .await
            .map_err(|e| BackendError::Conversion(e.to_string()))?;
        let units = normalize_units(body.units);
        log::info!("Received {} units", units.len());
        Ok(units)
    }
}

fn failure_message(body: &str, fallback: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        fallback.to_string()
    } else {
        body.to_string()
    }
}

/// Flatten the `units` field to its non-empty texts. Anything that is not an
/// array yields no units.
fn normalize_units(units: serde_json::Value) -> Vec<String> {
    let serde_json::Value::Array(items) = units else {
        return Vec::new();
    };
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<RawUnit>(item) {
            Ok(RawUnit::Text(text)) => Some(text),
            Ok(RawUnit::Paged { text }) => text,
            Err(_) => None,
        })
        .filter(|text| !text.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn units_of(body: serde_json::Value) -> Vec<String> {
        let resp: ConvertResponse = serde_json::from_value(body).unwrap();
        normalize_units(resp.units)
    }

    #[test]
    fn paged_units_are_flattened() {
        let units = units_of(json!({
            "doc_id": "abc",
            "mode": "dyslexia",
            "units": [{ "page": 1, "text": "Hello there." }]
        }));
        assert_eq!(units, vec!["Hello there."]);
    }

    #[test]
    fn plain_and_mixed_units() {
        let units = units_of(json!({
            "units": ["Page one text.", { "page": 2, "text": "Page two text." }, ""]
        }));
        assert_eq!(units, vec!["Page one text.", "Page two text."]);
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let units = units_of(json!({
            "units": [{ "page": 3 }, { "page": 4, "text": null }, 42, "kept"]
        }));
        assert_eq!(units, vec!["kept"]);
    }

    #[test]
    fn missing_or_non_array_units_yield_nothing() {
        assert!(units_of(json!({ "doc_id": "abc" })).is_empty());
        assert!(units_of(json!({ "units": "oops" })).is_empty());
        assert!(units_of(json!({ "units": [] })).is_empty());
    }

    #[test]
    fn error_body_becomes_message() {
        assert_eq!(
            failure_message("{\"detail\":\"Only PDF supported.\"}", "Upload failed"),
            "{\"detail\":\"Only PDF supported.\"}"
        );
        assert_eq!(failure_message("  \n", "Convert failed"), "Convert failed");
    }

    #[test]
    fn upload_response_parses_doc_id() {
        let resp: UploadResponse = serde_json::from_str(r#"{"doc_id":"7f3e"}"#).unwrap();
        assert_eq!(resp.doc_id.as_str(), "7f3e");
    }

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let client = BackendClient::new("http://127.0.0.1:8000/");
        assert_eq!(client.base_url, "http://127.0.0.1:8000");
    }

    #[test]
    fn document_id_is_one_escaped_path_segment() {
        let client = BackendClient::new("http://127.0.0.1:8000/");
        let url = client
            .endpoint(&["api", "documents", "a/b c?", "convert"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8000/api/documents/a%2Fb%20c%3F/convert"
        );
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let client = BackendClient::new("http://host/reader");
        let url = client.endpoint(&["api", "documents"]).unwrap();
        assert_eq!(url.as_str(), "http://host/reader/api/documents");
    }

    #[test]
    fn unparsable_base_url_is_reported() {
        let client = BackendClient::new("not a url");
        assert!(client.endpoint(&["api", "documents"]).is_err());
    }
}

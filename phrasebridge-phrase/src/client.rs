//! Phrase API v2 client.
//!
//! Every request carries `Authorization: token <token>`. A response with any
//! status other than the one the endpoint documents for success is turned
//! into [`PhraseError::Status`].

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;

use async_trait::async_trait;
use reqwest::{multipart, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;

use phrasebridge_core::{Locale, LocaleId, ProjectId, UploadId, UploadState};

use crate::error::{invalid_argument, PhraseError};
use crate::poller::{ensure_upload_succeeded, PollPolicy, UploadStatusSource};

/// Public Phrase API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.phraseapp.com/api/v2";

/// Format used for both uploads and downloads.
pub const FILE_FORMAT: &str = "nested_json";

fn summarize_response_body(body: &str) -> String {
    let mut hasher = DefaultHasher::new();
    body.hash(&mut hasher);
    format!("len={},digest={:016x}", body.len(), hasher.finish())
}

#[derive(Debug, Deserialize)]
struct CreatedUpload {
    id: UploadId,
}

#[derive(Debug, Deserialize)]
struct UploadStatusBody {
    #[serde(default)]
    state: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct KeysDeleted {
    #[serde(default)]
    records_affected: u64,
}

/// Client for the subset of the Phrase API used by a sync run.
#[derive(Clone, Debug)]
pub struct PhraseClient {
    http: reqwest::Client,
    token: String,
    base_url: String,
}

impl PhraseClient {
    pub fn new(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self::with_http_client(reqwest::Client::new(), token, base_url)
    }

    pub fn with_http_client(
        http: reqwest::Client,
        token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            http,
            token: token.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn project_url(&self, project_id: &ProjectId, rest: &str) -> String {
        format!("{}/projects/{}/{}", self.base_url, project_id, rest)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("Authorization", format!("token {}", self.token))
    }

    /// Send `request` and return the body text when the status is `expected`.
    async fn send_expecting(
        &self,
        operation: &'static str,
        request: RequestBuilder,
        expected: StatusCode,
    ) -> Result<String, PhraseError> {
        let response: Response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if status != expected {
            let body_summary = summarize_response_body(&body);
            tracing::error!(operation, status = status.as_u16(), body_summary = %body_summary, "Phrase API error");
            return Err(PhraseError::Status {
                operation,
                status: status.as_u16(),
                body_summary,
            });
        }
        Ok(body)
    }

    /// List all locales of a project.
    pub async fn fetch_locales(&self, project_id: &ProjectId) -> Result<Vec<Locale>, PhraseError> {
        const OP: &str = "fetch locales";
        let url = self.project_url(project_id, "locales");
        tracing::debug!(project_id = %project_id, "fetching locales");
        let body = self
            .send_expecting(OP, self.request(Method::GET, &url), StatusCode::OK)
            .await?;
        serde_json::from_str(&body).map_err(|source| PhraseError::Decode {
            operation: OP,
            source,
        })
    }

    /// Upload a nested-JSON locale file and return the id of the created upload.
    ///
    /// The upload is processed asynchronously by Phrase; use
    /// [`ensure_upload_succeeded`] to wait for it.
    pub async fn upload_locale(
        &self,
        locale_id: &LocaleId,
        file: &Path,
        project_id: &ProjectId,
    ) -> Result<UploadId, PhraseError> {
        const OP: &str = "upload locale";
        let contents = tokio::fs::read(file).await.map_err(|e| PhraseError::Io {
            path: file.to_path_buf(),
            source: e,
        })?;
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "locale.json".to_string());
        let part = multipart::Part::bytes(contents)
            .file_name(file_name)
            .mime_str("application/json")?;
        let form = multipart::Form::new()
            .part("file", part)
            .text("locale_id", locale_id.to_string())
            .text("file_format", FILE_FORMAT);

        let url = self.project_url(project_id, "uploads");
        let body = self
            .send_expecting(
                OP,
                self.request(Method::POST, &url).multipart(form),
                StatusCode::CREATED,
            )
            .await?;
        let created: CreatedUpload =
            serde_json::from_str(&body).map_err(|source| PhraseError::Decode {
                operation: OP,
                source,
            })?;
        Ok(created.id)
    }

    /// Download one locale as nested JSON. The body is returned verbatim.
    pub async fn download_locale(
        &self,
        locale_id: &LocaleId,
        project_id: &ProjectId,
    ) -> Result<String, PhraseError> {
        let url = self.project_url(project_id, &format!("locales/{locale_id}/download"));
        let request = self
            .request(Method::GET, &url)
            .query(&[("file_format", FILE_FORMAT)]);
        self.send_expecting("download locale", request, StatusCode::OK)
            .await
    }

    /// Delete every key that was not part of `upload_id`.
    ///
    /// Waits for the upload to succeed first. If it does not, a warning is
    /// logged and [`PhraseError::UploadNotConfirmed`] is returned without
    /// deleting anything. Returns the number of deleted keys.
    pub async fn remove_unmentioned_keys(
        &self,
        project_id: &ProjectId,
        upload_id: &UploadId,
        policy: PollPolicy,
    ) -> Result<u64, PhraseError> {
        const OP: &str = "remove unmentioned keys";
        if upload_id.as_str().trim().is_empty() {
            return Err(invalid_argument("upload id must not be empty"));
        }

        if !ensure_upload_succeeded(self, project_id, upload_id, policy).await? {
            tracing::warn!("unmentioned keys for upload with id {upload_id} could not be removed.");
            return Err(PhraseError::UploadNotConfirmed {
                upload_id: upload_id.clone(),
            });
        }

        let url = self.project_url(project_id, "keys");
        let request = self
            .request(Method::DELETE, &url)
            .query(&[("q", format!("unmentioned_in_upload:{upload_id}"))]);
        let body = self.send_expecting(OP, request, StatusCode::OK).await?;
        if body.trim().is_empty() {
            return Ok(0);
        }
        let deleted: KeysDeleted =
            serde_json::from_str(&body).map_err(|source| PhraseError::Decode {
                operation: OP,
                source,
            })?;
        tracing::info!(upload_id = %upload_id, records_affected = deleted.records_affected, "removed unmentioned keys");
        Ok(deleted.records_affected)
    }
}

#[async_trait]
impl UploadStatusSource for PhraseClient {
    async fn query_upload_status(
        &self,
        project_id: &ProjectId,
        upload_id: &UploadId,
    ) -> Result<UploadState, PhraseError> {
        let url = self.project_url(project_id, &format!("uploads/{upload_id}"));
        let body = self
            .send_expecting(
                "query upload status",
                self.request(Method::GET, &url),
                StatusCode::OK,
            )
            .await?;
        let raw = serde_json::from_str::<UploadStatusBody>(&body)
            .ok()
            .and_then(|b| b.state);
        Ok(UploadState::from_raw(raw.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = PhraseClient::new("t", "https://api.example.test/api/v2/");
        assert_eq!(client.base_url(), "https://api.example.test/api/v2");
        assert_eq!(
            client.project_url(&ProjectId::from("p1"), "locales"),
            "https://api.example.test/api/v2/projects/p1/locales"
        );
    }

    #[test]
    fn body_summary_does_not_echo_body() {
        let summary = summarize_response_body("secret token value");
        assert!(summary.starts_with("len=18,digest="));
        assert!(!summary.contains("secret"));
    }
}

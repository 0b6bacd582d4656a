//! Azure DevOps pull-request publishing.
//!
//! Three REST calls against `{collection}/{project}/_apis/git/repositories/{repo}`:
//!
//! 1. `POST pullrequests` — open the PR.
//! 2. `PATCH pullrequests/{id}` — enable auto-complete (squash, delete source branch).
//! 3. `PUT pullrequests/{id}/reviewers/{creator}` — approve as the creator (vote 10).

use reqwest::{Method, RequestBuilder};
use serde::{Deserialize, Serialize};

use crate::error::PublishError;

const API_VERSION: &str = "7.0";

/// Reviewer vote value meaning "approved".
pub const VOTE_APPROVED: i32 = 10;

pub const DEFAULT_TITLE: &str = "chore(phrase): automatic update of i18n files";
pub const DEFAULT_DESCRIPTION: &str = "Automatic PhraseApp Update";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatePullRequestBody<'a> {
    source_ref_name: String,
    target_ref_name: String,
    title: &'a str,
    description: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompletionOptions {
    delete_source_branch: bool,
    merge_strategy: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AutoCompleteBody {
    auto_complete_set_by: IdentityRef,
    completion_options: CompletionOptions,
}

#[derive(Debug, Serialize)]
struct ReviewerVoteBody<'a> {
    id: &'a str,
    vote: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullRequestResponse {
    pull_request_id: i64,
    #[serde(default)]
    created_by: Option<IdentityRef>,
}

#[derive(Debug, Deserialize)]
struct AzureErrorBody {
    message: String,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// What to open a pull request for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRequest {
    /// Short branch name, without `refs/heads/`.
    pub source_branch: String,
    pub target_branch: String,
    pub title: String,
    pub description: String,
}

impl PullRequestRequest {
    pub fn for_branch(source_branch: impl Into<String>, target_branch: impl Into<String>) -> Self {
        Self {
            source_branch: source_branch.into(),
            target_branch: target_branch.into(),
            title: DEFAULT_TITLE.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
        }
    }
}

/// A pull request that was opened, set to auto-complete and approved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishedPullRequest {
    pub pull_request_id: i64,
    pub created_by: String,
}

/// Client for the Azure DevOps Git pull-request endpoints.
#[derive(Clone, Debug)]
pub struct AzureDevOps {
    http: reqwest::Client,
    collection_uri: String,
    project_id: String,
    repository_id: String,
    token: String,
}

fn refs_heads(branch: &str) -> String {
    format!("refs/heads/{branch}")
}

impl AzureDevOps {
    pub fn new(
        collection_uri: impl Into<String>,
        project_id: impl Into<String>,
        repository_id: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            collection_uri: collection_uri.into().trim_end_matches('/').to_string(),
            project_id: project_id.into(),
            repository_id: repository_id.into(),
            token: token.into(),
        }
    }

    fn pull_requests_url(&self, rest: &str) -> String {
        let base = format!(
            "{}/{}/_apis/git/repositories/{}/pullrequests",
            self.collection_uri, self.project_id, self.repository_id
        );
        if rest.is_empty() {
            base
        } else {
            format!("{base}/{rest}")
        }
    }

    /// Personal access tokens go in as the password of basic auth with an empty user.
    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .query(&[("api-version", API_VERSION)])
            .basic_auth("", Some(&self.token))
    }

    async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<String, PublishError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let message = serde_json::from_str::<AzureErrorBody>(&body)
                .map(|b| b.message)
                .unwrap_or_else(|_| format!("{} bytes of response body", body.len()));
            tracing::error!(operation, status = status.as_u16(), %message, "Azure DevOps API error");
            return Err(PublishError::Status {
                operation,
                status: status.as_u16(),
                message,
            });
        }
        Ok(body)
    }

    /// Open a pull request and return its id and creator.
    pub async fn create_pull_request(
        &self,
        request: &PullRequestRequest,
    ) -> Result<PublishedPullRequest, PublishError> {
        const OP: &str = "create pull request";
        let body = CreatePullRequestBody {
            source_ref_name: refs_heads(&request.source_branch),
            target_ref_name: refs_heads(&request.target_branch),
            title: &request.title,
            description: &request.description,
        };
        tracing::debug!(url = %self.pull_requests_url(""), "creating pull request");
        let text = self
            .send(
                OP,
                self.request(Method::POST, &self.pull_requests_url(""))
                    .json(&body),
            )
            .await?;

        let created: PullRequestResponse =
            serde_json::from_str(&text).map_err(|e| PublishError::InvalidResponse {
                operation: OP,
                message: e.to_string(),
            })?;
        let created_by = created
            .created_by
            .map(|identity| identity.id)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| PublishError::InvalidResponse {
                operation: OP,
                message: "pull request has no creator id".to_string(),
            })?;

        tracing::info!(pull_request_id = created.pull_request_id, "pull request created");
        Ok(PublishedPullRequest {
            pull_request_id: created.pull_request_id,
            created_by,
        })
    }

    /// Squash-merge the pull request automatically once policies pass.
    pub async fn enable_auto_complete(
        &self,
        pull_request_id: i64,
        set_by: &str,
    ) -> Result<(), PublishError> {
        let body = auto_complete_body(set_by);
        self.send(
            "enable auto-complete",
            self.request(
                Method::PATCH,
                &self.pull_requests_url(&pull_request_id.to_string()),
            )
            .json(&body),
        )
        .await?;
        tracing::info!(pull_request_id, "pull request set to auto-complete by {set_by}");
        Ok(())
    }

    /// Cast an approving vote as `reviewer_id`.
    pub async fn approve(&self, pull_request_id: i64, reviewer_id: &str) -> Result<(), PublishError> {
        let body = ReviewerVoteBody {
            id: reviewer_id,
            vote: VOTE_APPROVED,
        };
        let url = self.pull_requests_url(&format!("{pull_request_id}/reviewers/{reviewer_id}"));
        self.send("approve pull request", self.request(Method::PUT, &url).json(&body))
            .await?;
        tracing::info!(pull_request_id, "pull request approved by {reviewer_id}");
        Ok(())
    }

    /// Open the pull request, enable auto-complete and approve it as its creator.
    pub async fn open_auto_completing(
        &self,
        request: &PullRequestRequest,
    ) -> Result<PublishedPullRequest, PublishError> {
        let pr = self.create_pull_request(request).await?;
        self.enable_auto_complete(pr.pull_request_id, &pr.created_by)
            .await?;
        self.approve(pr.pull_request_id, &pr.created_by).await?;
        Ok(pr)
    }
}

fn auto_complete_body(set_by: &str) -> AutoCompleteBody {
    AutoCompleteBody {
        auto_complete_set_by: IdentityRef {
            id: set_by.to_string(),
            display_name: None,
        },
        completion_options: CompletionOptions {
            delete_source_branch: true,
            merge_strategy: "squash",
        },
    }
}

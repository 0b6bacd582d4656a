//! # phrasebridge-publish
//!
//! Getting pulled translations back into the repository: [`git`] commits and
//! pushes a branch, [`azure`] opens an auto-completing pull request for it and
//! approves it on behalf of its creator.

pub mod azure;
pub mod error;
pub mod git;

pub use azure::{AzureDevOps, PullRequestRequest, PublishedPullRequest};
pub use error::PublishError;
pub use git::{GitIdentity, GitPublisher};

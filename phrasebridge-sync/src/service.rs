//! The translation-service seam the pipeline runs against.

use std::path::Path;

use async_trait::async_trait;

use phrasebridge_core::{Locale, LocaleId, ProjectId, UploadId};
use phrasebridge_phrase::{PhraseClient, PhraseError, PollPolicy};

/// Remote operations a sync run needs from the localization service.
#[async_trait]
pub trait TranslationService: Send + Sync {
    async fn fetch_locales(&self, project_id: &ProjectId) -> Result<Vec<Locale>, PhraseError>;

    async fn upload_locale(
        &self,
        locale_id: &LocaleId,
        file: &Path,
        project_id: &ProjectId,
    ) -> Result<UploadId, PhraseError>;

    async fn download_locale(
        &self,
        locale_id: &LocaleId,
        project_id: &ProjectId,
    ) -> Result<String, PhraseError>;

    /// Wait for `upload_id` to succeed, then delete keys it did not mention.
    async fn remove_unmentioned_keys(
        &self,
        project_id: &ProjectId,
        upload_id: &UploadId,
        policy: PollPolicy,
    ) -> Result<u64, PhraseError>;
}

#[async_trait]
impl TranslationService for PhraseClient {
    async fn fetch_locales(&self, project_id: &ProjectId) -> Result<Vec<Locale>, PhraseError> {
        PhraseClient::fetch_locales(self, project_id).await
    }

    async fn upload_locale(
        &self,
        locale_id: &LocaleId,
        file: &Path,
        project_id: &ProjectId,
    ) -> Result<UploadId, PhraseError> {
        PhraseClient::upload_locale(self, locale_id, file, project_id).await
    }

    async fn download_locale(
        &self,
        locale_id: &LocaleId,
        project_id: &ProjectId,
    ) -> Result<String, PhraseError> {
        PhraseClient::download_locale(self, locale_id, project_id).await
    }

    async fn remove_unmentioned_keys(
        &self,
        project_id: &ProjectId,
        upload_id: &UploadId,
        policy: PollPolicy,
    ) -> Result<u64, PhraseError> {
        PhraseClient::remove_unmentioned_keys(self, project_id, upload_id, policy).await
    }
}

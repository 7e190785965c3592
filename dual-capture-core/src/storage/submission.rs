use std::path::PathBuf;

use thiserror::Error;

use crate::models::capture::{CaptureKind, CaptureRecord, CapturedPair, NewCapture};
use crate::models::config::SessionConfiguration;
use crate::models::error::CaptureError;
use crate::storage::local_store::{LocalCapture, LocalCaptureList};
use crate::storage::stager::ArtifactStager;
use crate::traits::capture_store::CaptureStore;

/// Why a finished pair could not be kept.
///
/// Every variant means the capture itself succeeded.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("capture succeeded but could not be saved: {0}")]
    Persistence(String),

    #[error("{message}")]
    Validation { message: String, field: Option<String> },

    #[error("could not stage artifacts: {0}")]
    Staging(String),
}

impl From<CaptureError> for SubmissionError {
    fn from(error: CaptureError) -> Self {
        match error {
            CaptureError::Validation { message, field } => Self::Validation { message, field },
            CaptureError::StorageError(reason) => Self::Staging(reason),
            other => Self::Persistence(other.to_string()),
        }
    }
}

/// Where a submitted pair went.
#[derive(Debug, Clone, PartialEq)]
pub enum Submitted {
    Local(LocalCapture),
    Remote(CaptureRecord),
}

/// Routes finished pairs to the local list (cloud sync off) or stages
/// them and creates a record in the store (cloud sync on).
pub struct CaptureSubmitter<S: CaptureStore> {
    store: S,
    stager: ArtifactStager,
    local: LocalCaptureList,
    cloud_sync: bool,
    product_name: String,
}

impl<S: CaptureStore> CaptureSubmitter<S> {
    pub fn new(store: S, stager: ArtifactStager, product_name: impl Into<String>, cloud_sync: bool) -> Self {
        Self {
            store,
            stager,
            local: LocalCaptureList::new(),
            cloud_sync,
            product_name: product_name.into(),
        }
    }

    /// Submitter whose titles and file names use the session's product name.
    pub fn for_session(
        store: S,
        output_directory: impl Into<PathBuf>,
        config: &SessionConfiguration,
        cloud_sync: bool,
    ) -> Self {
        let stager = ArtifactStager::for_session(output_directory, config);
        Self::new(store, stager, config.product_name.clone(), cloud_sync)
    }

    pub fn cloud_sync(&self) -> bool {
        self.cloud_sync
    }

    pub fn set_cloud_sync(&mut self, enabled: bool) {
        self.cloud_sync = enabled;
    }

    pub fn local(&self) -> &LocalCaptureList {
        &self.local
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Keep a finished pair. `title` defaults to product, kind and time.
    pub async fn submit(&mut self, pair: CapturedPair, title: Option<String>) -> Result<Submitted, SubmissionError> {
        let title = title.unwrap_or_else(|| self.default_title(&pair));

        if !self.cloud_sync {
            let entry = self.local.push(pair, title).clone();
            log::info!("Kept {} pair locally as {}", entry.kind.as_str(), entry.id);
            return Ok(Submitted::Local(entry));
        }

        let staged = self.stager.stage(&pair)?;
        let request = NewCapture {
            title,
            kind: pair.kind,
            landscape_url: staged.landscape_url,
            portrait_url: staged.portrait_url,
        };
        request.validate()?;

        match self.store.create(request).await {
            Ok(record) => {
                log::info!("Saved {} pair as record {}", record.kind.as_str(), record.id);
                Ok(Submitted::Remote(record))
            }
            Err(e) => {
                log::warn!("Saving pair {} failed: {}", pair.id, e);
                Err(e.into())
            }
        }
    }

    fn default_title(&self, pair: &CapturedPair) -> String {
        let kind = match pair.kind {
            CaptureKind::Video => "Video",
            CaptureKind::Photo => "Photo",
        };
        format!(
            "{} {} {}",
            self.product_name,
            kind,
            pair.created_at.format("%Y-%m-%d %H:%M:%S")
        )
    }
}

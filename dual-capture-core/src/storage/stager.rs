use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::models::capture::{Artifact, CaptureKind, CapturedPair};
use crate::models::config::SessionConfiguration;
use crate::models::error::CaptureError;
use crate::models::view::{CropRect, ViewKind};
use crate::storage::naming;

/// Per-artifact entry of the sidecar metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub view: ViewKind,
    pub file_name: String,
    pub content_type: String,
    pub width: u32,
    pub height: u32,
    pub bytes: u64,
    pub checksum: String,
    pub crop: Option<CropRect>,
}

/// JSON sidecar written next to a staged pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairMetadata {
    pub id: String,
    pub kind: CaptureKind,
    pub created_at: String,
    pub duration_secs: Option<f64>,
    pub landscape: ArtifactMetadata,
    pub portrait: ArtifactMetadata,
}

/// Where a pair ended up on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedPair {
    pub landscape_path: PathBuf,
    pub portrait_path: PathBuf,
    pub metadata_path: PathBuf,
    pub landscape_url: String,
    pub portrait_url: String,
}

/// Writes both artifacts of a pair to a directory under their download
/// names, plus a `{id}.metadata.json` sidecar with sizes and checksums.
#[derive(Debug, Clone)]
pub struct ArtifactStager {
    output_directory: PathBuf,
    product_name: String,
}

impl ArtifactStager {
    pub fn new(output_directory: impl Into<PathBuf>, product_name: impl Into<String>) -> Self {
        Self {
            output_directory: output_directory.into(),
            product_name: product_name.into(),
        }
    }

    /// Stager naming files after the session's configured product.
    pub fn for_session(output_directory: impl Into<PathBuf>, config: &SessionConfiguration) -> Self {
        Self::new(output_directory, config.product_name.clone())
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    pub fn stage(&self, pair: &CapturedPair) -> Result<StagedPair, CaptureError> {
        fs::create_dir_all(&self.output_directory)
            .map_err(|e| CaptureError::StorageError(format!("failed to create directory: {}", e)))?;
        let directory = fs::canonicalize(&self.output_directory)
            .map_err(|e| CaptureError::StorageError(format!("failed to resolve directory: {}", e)))?;

        let timestamp = naming::timestamp_millis(pair.created_at);
        let landscape = self.write_artifact(&directory, &pair.landscape, timestamp)?;
        let portrait = self.write_artifact(&directory, &pair.portrait, timestamp)?;

        let metadata = PairMetadata {
            id: pair.id.clone(),
            kind: pair.kind,
            created_at: pair.created_at.to_rfc3339(),
            duration_secs: pair.duration.map(|d| d.as_secs_f64()),
            landscape: artifact_metadata(&pair.landscape, &landscape),
            portrait: artifact_metadata(&pair.portrait, &portrait),
        };
        let metadata_path = directory.join(format!("{}.metadata.json", pair.id));
        write_metadata(&metadata, &metadata_path)?;

        log::debug!("Staged pair {} in {}", pair.id, directory.display());
        Ok(StagedPair {
            landscape_url: file_url(&landscape),
            portrait_url: file_url(&portrait),
            landscape_path: landscape,
            portrait_path: portrait,
            metadata_path,
        })
    }

    fn write_artifact(&self, directory: &Path, artifact: &Artifact, timestamp: i64) -> Result<PathBuf, CaptureError> {
        if artifact.is_empty() {
            return Err(CaptureError::StorageError(format!(
                "{} artifact is empty",
                artifact.view.label()
            )));
        }
        let name = naming::download_name(&self.product_name, artifact.view, timestamp, &artifact.content_type);
        let path = directory.join(name);
        fs::write(&path, &artifact.data)
            .map_err(|e| CaptureError::StorageError(format!("failed to write {}: {}", path.display(), e)))?;
        Ok(path)
    }
}

fn artifact_metadata(artifact: &Artifact, path: &Path) -> ArtifactMetadata {
    ArtifactMetadata {
        view: artifact.view,
        file_name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        content_type: artifact.content_type.clone(),
        width: artifact.size.width,
        height: artifact.size.height,
        bytes: artifact.len() as u64,
        checksum: artifact.checksum.clone(),
        crop: artifact.crop,
    }
}

fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}

pub fn write_metadata(metadata: &PairMetadata, path: &Path) -> Result<(), CaptureError> {
    let json = serde_json::to_string_pretty(metadata)
        .map_err(|e| CaptureError::StorageError(format!("failed to serialize metadata: {}", e)))?;
    fs::write(path, json).map_err(|e| CaptureError::StorageError(format!("failed to write metadata: {}", e)))?;
    Ok(())
}

pub fn read_metadata(path: &Path) -> Result<PairMetadata, CaptureError> {
    let json = fs::read_to_string(path)
        .map_err(|e| CaptureError::StorageError(format!("failed to read metadata: {}", e)))?;
    serde_json::from_str(&json).map_err(|e| CaptureError::StorageError(format!("failed to parse metadata: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::view::FrameSize;
    use std::time::Duration;

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("dual_capture_test_{}_{}", name, uuid::Uuid::new_v4()))
    }

    fn pair(kind: CaptureKind, content_type: &str) -> CapturedPair {
        let crop = (kind == CaptureKind::Photo).then_some(CropRect { x: 1.0, y: 2.0, width: 16.0, height: 9.0 });
        CapturedPair::new(
            kind,
            Artifact::new(ViewKind::Landscape, vec![1, 2, 3], content_type, FrameSize::new(16, 9), crop),
            Artifact::new(ViewKind::Portrait, vec![4, 5], content_type, FrameSize::new(9, 16), crop),
            (kind == CaptureKind::Video).then_some(Duration::from_millis(1500)),
        )
    }

    #[test]
    fn stages_files_and_sidecar() {
        let dir = temp_dir("stage");
        let stager = ArtifactStager::new(&dir, "FlipCastDuo");
        let pair = pair(CaptureKind::Video, "video/webm");

        let staged = stager.stage(&pair).unwrap();

        let name = staged.landscape_path.file_name().unwrap().to_string_lossy().into_owned();
        assert_eq!(name, format!("FlipCastDuo_Landscape_{}.webm", pair.created_at.timestamp_millis()));
        assert_eq!(fs::read(&staged.portrait_path).unwrap(), vec![4, 5]);
        assert!(staged.landscape_url.starts_with("file:///"));
        assert!(staged.portrait_url.ends_with(".webm"));

        let metadata = read_metadata(&staged.metadata_path).unwrap();
        assert_eq!(metadata.id, pair.id);
        assert_eq!(metadata.duration_secs, Some(1.5));
        assert_eq!(metadata.landscape.checksum, pair.landscape.checksum);
        assert_eq!(metadata.portrait.bytes, 2);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn photo_sidecar_records_crop() {
        let dir = temp_dir("photo");
        let stager = ArtifactStager::new(&dir, "FlipCastDuo");
        let staged = stager.stage(&pair(CaptureKind::Photo, "image/png")).unwrap();

        let metadata = read_metadata(&staged.metadata_path).unwrap();
        assert_eq!(metadata.kind, CaptureKind::Photo);
        assert_eq!(metadata.landscape.crop.map(|c| c.width), Some(16.0));
        assert!(metadata.portrait.file_name.ends_with(".png"));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn empty_artifact_is_rejected() {
        let dir = temp_dir("empty");
        let stager = ArtifactStager::new(&dir, "FlipCastDuo");
        let mut pair = pair(CaptureKind::Video, "video/webm");
        pair.portrait.data.clear();

        assert!(matches!(stager.stage(&pair), Err(CaptureError::StorageError(_))));
        let _ = fs::remove_dir_all(&dir);
    }
}

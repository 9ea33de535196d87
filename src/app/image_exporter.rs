use std::path::{Path, PathBuf};

use bytes::Bytes;
use tempfile::TempDir;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::ImageReference;

use super::{ContainerEngine, ContainerEngineError};

const TARBALL_NAME: &str = "tmpimage.tar";
const SCRATCH_DIR_PREFIX: &str = "docker-image-";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("while creating tmp dir for docker image tarball: {0}")]
    ScratchDir(std::io::Error),

    #[error("while saving docker image to tmp dir {dir}: {source}")]
    Save {
        dir: String,
        source: ContainerEngineError,
    },
}

/// An image tarball living in its own scratch directory. The directory is
/// removed when this value is dropped; a failed removal is only logged.
#[derive(Debug)]
pub struct ExportedImage {
    dir: Option<TempDir>,
    tarball: PathBuf,
}

impl ExportedImage {
    pub fn path(&self) -> &Path {
        &self.tarball
    }

    pub async fn read(&self) -> std::io::Result<Bytes> {
        Ok(Bytes::from(tokio::fs::read(&self.tarball).await?))
    }
}

impl Drop for ExportedImage {
    fn drop(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };

        let path = dir.path().to_path_buf();
        match dir.close() {
            Ok(()) => debug!("deleted tmp docker image dir {}", path.display()),
            Err(err) => warn!(
                "while deleting tmp docker image {}: {}",
                path.display(),
                err
            ),
        }
    }
}

/// Saves `image` into a fresh scratch directory.
pub async fn export_image<E>(
    engine: &E,
    image: &ImageReference,
) -> Result<ExportedImage, ExportError>
where
    E: ContainerEngine + Sync + ?Sized,
{
    let dir = tempfile::Builder::new()
        .prefix(SCRATCH_DIR_PREFIX)
        .tempdir()
        .map_err(ExportError::ScratchDir)?;

    let exported = ExportedImage {
        tarball: dir.path().join(TARBALL_NAME),
        dir: Some(dir),
    };

    info!("saving {} to {}", image, exported.path().display());
    engine
        .save_image(image, exported.path())
        .await
        .map_err(|source| ExportError::Save {
            dir: exported
                .path()
                .parent()
                .unwrap_or(exported.path())
                .display()
                .to_string(),
            source,
        })?;

    Ok(exported)
}

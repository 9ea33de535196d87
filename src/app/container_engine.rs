use std::{error::Error, path::Path};

use thiserror::Error;

use crate::domain::ImageReference;

/// The narrow slice of a container engine needed to export and list images.
#[async_trait::async_trait]
pub trait ContainerEngine {
    /// Whether the engine is available on this machine at all.
    async fn is_installed(&self) -> bool;

    /// Whether the engine daemon answers.
    async fn is_running(&self) -> bool;

    /// Serializes `image` into a tarball written at `destination`.
    async fn save_image(
        &self,
        image: &ImageReference,
        destination: &Path,
    ) -> Result<(), ContainerEngineError>;

    /// Local, non-dangling images as `repository:tag` strings.
    async fn list_images(&self) -> Result<Vec<String>, ContainerEngineError>;
}

#[derive(Error, Debug)]
pub enum ContainerEngineError {
    #[error("container engine error: {0}")]
    ContainerEngineError(#[from] Box<dyn Error + Send + Sync>),
}

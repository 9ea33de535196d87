use std::{collections::HashMap, path::Path};

use bollard::{Docker, image::ListImagesOptions};
use futures::StreamExt;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::{
    app::{ContainerEngine, ContainerEngineError},
    domain::ImageReference,
};

const UNTAGGED: &str = "<none>:<none>";

#[derive(Error, Debug)]
pub(in crate::infra) enum DockerApiEngineError {
    #[error("docker client is not connected")]
    NotConnected,

    #[error("internal io error: {0}")]
    IO(#[from] std::io::Error),

    #[error("internal docker client error: {0:?}")]
    Docker(#[from] bollard::errors::Error),
}

impl From<DockerApiEngineError> for ContainerEngineError {
    fn from(value: DockerApiEngineError) -> Self {
        ContainerEngineError::ContainerEngineError(Box::new(value))
    }
}

/// Talks to the engine daemon over its API socket instead of spawning the CLI.
#[derive(Clone)]
pub struct DockerApiEngine {
    docker_client: Option<Docker>,
}

impl DockerApiEngine {
    pub fn new(docker_client: Docker) -> Self {
        Self {
            docker_client: Some(docker_client),
        }
    }

    /// Connects with the local defaults (`DOCKER_HOST` or the default socket).
    /// A failed connection is reported later as "not installed".
    pub fn connect_with_local_defaults() -> Self {
        let docker_client = Docker::connect_with_local_defaults()
            .inspect_err(|e| warn!("unable to configure docker client: {}", e))
            .ok();

        Self { docker_client }
    }

    fn client(&self) -> Result<&Docker, DockerApiEngineError> {
        self.docker_client
            .as_ref()
            .ok_or(DockerApiEngineError::NotConnected)
    }

    async fn export_to_file(
        &self,
        image: &ImageReference,
        destination: &Path,
    ) -> Result<(), DockerApiEngineError> {
        let client = self.client()?;
        let image_name = image.to_string();

        let mut file = tokio::fs::File::create(destination).await?;
        let mut chunks = std::pin::pin!(client.export_image(&image_name));
        let mut written = 0usize;
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk?;
            written += chunk.len();
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        debug!("exported {} bytes of {}", written, image_name);
        Ok(())
    }

    async fn repo_tags(&self) -> Result<Vec<String>, DockerApiEngineError> {
        let mut filters = HashMap::new();
        filters.insert("dangling".to_string(), vec!["false".to_string()]);

        let images = self
            .client()?
            .list_images(Some(ListImagesOptions::<String> {
                all: false,
                filters,
                ..Default::default()
            }))
            .await?;

        Ok(images
            .into_iter()
            .flat_map(|summary| summary.repo_tags)
            .filter(|tag| tag != UNTAGGED)
            .collect())
    }
}

#[async_trait::async_trait]
impl ContainerEngine for DockerApiEngine {
    async fn is_installed(&self) -> bool {
        self.docker_client.is_some()
    }

    async fn is_running(&self) -> bool {
        let Ok(client) = self.client() else {
            return false;
        };

        client
            .ping()
            .await
            .inspect_err(|e| debug!("docker ping failed: {}", e))
            .is_ok()
    }

    async fn save_image(
        &self,
        image: &ImageReference,
        destination: &Path,
    ) -> Result<(), ContainerEngineError> {
        Ok(self.export_to_file(image, destination).await?)
    }

    async fn list_images(&self) -> Result<Vec<String>, ContainerEngineError> {
        Ok(self.repo_tags().await?)
    }
}

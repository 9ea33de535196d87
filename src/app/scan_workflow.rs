use thiserror::Error;
use tracing::info;

use crate::domain::ImageReference;

use super::{
    ContainerEngine, ExportError, PreflightError, ScanService, ScanServiceError,
    ensure_engine_ready, export_image,
};

/// Where the scanning service gets the image from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanMode {
    /// The service pulls the image from its registry itself.
    Remote,
    /// The image is exported from the local engine and uploaded.
    Local,
}

#[derive(Error, Debug)]
pub enum ScanWorkflowError {
    #[error(transparent)]
    Preflight(#[from] PreflightError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("while reading exported image tarball: {0}")]
    ReadTarball(std::io::Error),

    #[error(transparent)]
    Scan(#[from] ScanServiceError),
}

pub struct ScanWorkflow<'a, E: ?Sized, S: ?Sized>
where
    E: ContainerEngine,
    S: ScanService,
{
    engine: &'a E,
    scan_service: &'a S,
}

impl<'a, E: ?Sized, S: ?Sized> ScanWorkflow<'a, E, S>
where
    E: ContainerEngine + Sync,
    S: ScanService + Sync,
{
    pub fn new(engine: &'a E, scan_service: &'a S) -> Self {
        Self {
            engine,
            scan_service,
        }
    }

    /// Submits `image` for scanning and returns the report URL.
    pub async fn run(
        &self,
        image: &ImageReference,
        mode: ScanMode,
    ) -> Result<String, ScanWorkflowError> {
        match mode {
            ScanMode::Remote => self.order_remote_scan(image).await,
            ScanMode::Local => self.upload_local_image(image).await,
        }
    }

    async fn order_remote_scan(
        &self,
        image: &ImageReference,
    ) -> Result<String, ScanWorkflowError> {
        info!("ordering remote scan of {}", image);
        Ok(self.scan_service.order_remote_scan(image).await?)
    }

    async fn upload_local_image(
        &self,
        image: &ImageReference,
    ) -> Result<String, ScanWorkflowError> {
        ensure_engine_ready(self.engine).await?;

        let exported = export_image(self.engine, image).await?;
        let tarball = exported
            .read()
            .await
            .map_err(ScanWorkflowError::ReadTarball)?;

        info!("uploading {} ({} bytes)", image, tarball.len());
        let report_url = self.scan_service.upload_image(tarball, image).await?;

        Ok(report_url)
    }
}

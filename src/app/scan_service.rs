use std::error::Error;

use bytes::Bytes;
use thiserror::Error;

use crate::domain::ImageReference;

/// Remote vulnerability scanning service. Both operations answer with the URL
/// of the human readable report.
#[async_trait::async_trait]
pub trait ScanService {
    /// Asks the service to pull `image` from its registry and scan it.
    async fn order_remote_scan(&self, image: &ImageReference) -> Result<String, ScanServiceError>;

    /// Uploads an exported image tarball for scanning.
    async fn upload_image(
        &self,
        tarball: Bytes,
        image: &ImageReference,
    ) -> Result<String, ScanServiceError>;
}

#[derive(Error, Debug)]
pub enum ScanServiceError {
    #[error("scan service error: {0}")]
    ScanServiceError(#[from] Box<dyn Error + Send + Sync>),
}

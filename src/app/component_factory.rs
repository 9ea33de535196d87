use thiserror::Error;

use super::{Config, ContainerEngine, ScanService};

pub type BoxedContainerEngine = Box<dyn ContainerEngine + Send + Sync>;
pub type BoxedScanService = Box<dyn ScanService + Send + Sync>;

/// Builds the concrete engine and scan service. Binaries depend on this trait
/// so the wiring stays replaceable in tests.
pub trait ComponentFactory {
    fn create_container_engine(&self) -> Result<BoxedContainerEngine, ComponentFactoryError>;

    fn create_scan_service(
        &self,
        config: &Config,
    ) -> Result<BoxedScanService, ComponentFactoryError>;
}

#[derive(Error, Debug)]
pub enum ComponentFactoryError {
    #[error("unable to create docker client: {0}")]
    DockerClientError(String),

    #[error("unable to create http client: {0}")]
    HttpClientError(String),
}

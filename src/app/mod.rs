pub mod component_factory;
mod config;
mod container_engine;
mod image_exporter;
mod image_lister;
mod preflight;
mod scan_service;
mod scan_workflow;

pub use config::{ApiToken, Config, ConfigError, RawConfig};
pub use container_engine::{ContainerEngine, ContainerEngineError};
pub use image_exporter::{ExportError, ExportedImage, export_image};
pub use image_lister::{ImageListError, ImageLister};
pub use preflight::{PreflightError, ensure_engine_ready};
pub use scan_service::{ScanService, ScanServiceError};
pub use scan_workflow::{ScanMode, ScanWorkflow, ScanWorkflowError};

mod component_factory_impl;
mod config_loader;
mod docker_api_engine;
mod docker_cli_engine;
mod http_scan_client;
pub mod logging;

pub use component_factory_impl::{ConcreteComponentFactory, EngineKind};
pub use config_loader::{ConfigLoader, TOKEN_ENV_VAR, default_search_dirs, parse_config};
pub use docker_api_engine::DockerApiEngine;
pub use docker_cli_engine::{DockerCliEngine, find_executable, parse_image_listing};
pub use http_scan_client::HttpScanClient;

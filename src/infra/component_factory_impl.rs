use clap::ValueEnum;
use reqwest::Client;

use crate::{
    app::{
        Config,
        component_factory::{
            BoxedContainerEngine, BoxedScanService, ComponentFactory, ComponentFactoryError,
        },
    },
    infra::{DockerApiEngine, DockerCliEngine, HttpScanClient},
};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// How the container engine is driven.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum EngineKind {
    /// Spawn the `docker` command line client.
    #[default]
    Cli,
    /// Talk to the docker daemon API directly.
    Api,
}

pub struct ConcreteComponentFactory {
    engine_kind: EngineKind,
}

impl ConcreteComponentFactory {
    pub fn new(engine_kind: EngineKind) -> Self {
        Self { engine_kind }
    }
}

impl ComponentFactory for ConcreteComponentFactory {
    fn create_container_engine(&self) -> Result<BoxedContainerEngine, ComponentFactoryError> {
        Ok(match self.engine_kind {
            EngineKind::Cli => Box::new(DockerCliEngine::default()),
            EngineKind::Api => Box::new(DockerApiEngine::connect_with_local_defaults()),
        })
    }

    fn create_scan_service(
        &self,
        config: &Config,
    ) -> Result<BoxedScanService, ComponentFactoryError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ComponentFactoryError::HttpClientError(e.to_string()))?;

        Ok(Box::new(HttpScanClient::new(client, config)))
    }
}

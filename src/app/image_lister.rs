use thiserror::Error;

use super::{ContainerEngine, ContainerEngineError, PreflightError, ensure_engine_ready};

#[derive(Error, Debug)]
pub enum ImageListError {
    #[error(transparent)]
    Preflight(#[from] PreflightError),

    #[error("while listing local images: {0}")]
    Engine(#[from] ContainerEngineError),
}

pub struct ImageLister<'a, E: ?Sized>
where
    E: ContainerEngine,
{
    engine: &'a E,
}

impl<'a, E: ?Sized> ImageLister<'a, E>
where
    E: ContainerEngine + Sync,
{
    pub fn new(engine: &'a E) -> Self {
        Self { engine }
    }

    pub async fn list(&self) -> Result<Vec<String>, ImageListError> {
        ensure_engine_ready(self.engine).await?;
        Ok(self.engine.list_images().await?)
    }
}

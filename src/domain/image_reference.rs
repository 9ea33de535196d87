use std::fmt::{Display, Formatter};
use std::str::FromStr;

use thiserror::Error;

/// A `repository:tag` pair naming a container image.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ImageReference {
    repository: String,
    tag: String,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ImageReferenceError {
    #[error("no tag provided in image reference {0:?}, expected repo:tag")]
    MissingTag(String),

    #[error("empty repository in image reference {0:?}")]
    EmptyRepository(String),

    #[error("empty tag in image reference {0:?}")]
    EmptyTag(String),
}

impl ImageReference {
    pub fn new(repository: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            tag: tag.into(),
        }
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }
}

impl FromStr for ImageReference {
    type Err = ImageReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // The last colon separates the tag; earlier ones belong to a registry port.
        let Some((repository, tag)) = s.rsplit_once(':') else {
            return Err(ImageReferenceError::MissingTag(s.to_string()));
        };

        if tag.contains('/') {
            return Err(ImageReferenceError::MissingTag(s.to_string()));
        }
        if repository.is_empty() {
            return Err(ImageReferenceError::EmptyRepository(s.to_string()));
        }
        if tag.is_empty() {
            return Err(ImageReferenceError::EmptyTag(s.to_string()));
        }

        Ok(Self::new(repository, tag))
    }
}

impl Display for ImageReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.repository, self.tag)
    }
}

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::app::{Config, ConfigError, RawConfig};

pub const TOKEN_ENV_VAR: &str = "PTCH_TOKEN";

const CONFIG_FILE_NAMES: [&str; 2] = ["config.yaml", "config.yml"];

/// Finds, reads and validates the configuration file.
#[derive(Clone, Debug)]
pub struct ConfigLoader {
    explicit_path: Option<PathBuf>,
    search_dirs: Vec<PathBuf>,
}

impl ConfigLoader {
    /// Uses `explicit_path` when given, otherwise searches `~/.config/ptch`
    /// and then `~/.ptch`.
    pub fn new(explicit_path: Option<PathBuf>) -> Self {
        Self {
            explicit_path,
            search_dirs: default_search_dirs(),
        }
    }

    pub fn with_search_dirs(search_dirs: Vec<PathBuf>) -> Self {
        Self {
            explicit_path: None,
            search_dirs,
        }
    }

    pub fn load(&self) -> Result<Config, ConfigError> {
        let path = self.locate()?;
        info!("using configuration file {}", path.display());

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let mut raw = parse_config(&content, &path)?;
        if raw.token.is_none() {
            debug!("token not set in config file, reading {}", TOKEN_ENV_VAR);
            raw.token = std::env::var(TOKEN_ENV_VAR).ok();
        }

        Config::try_from(raw)
    }

    fn locate(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.explicit_path {
            return Ok(path.clone());
        }

        let candidates = self
            .search_dirs
            .iter()
            .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
            .collect::<Vec<_>>();

        candidates
            .iter()
            .find(|candidate| candidate.is_file())
            .cloned()
            .ok_or_else(|| ConfigError::NotFound {
                searched: candidates
                    .iter()
                    .map(|c| c.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

pub fn default_search_dirs() -> Vec<PathBuf> {
    let Some(home) = dirs::home_dir() else {
        return vec![];
    };

    vec![home.join(".config").join("ptch"), home.join(".ptch")]
}

/// Reads the `group`, `apiEndpoint` and `token` keys from a YAML mapping. Keys
/// are matched ignoring case and unknown keys are ignored.
pub fn parse_config(content: &str, path: &Path) -> Result<RawConfig, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidYaml {
        path: path.display().to_string(),
        reason,
    };

    let node = marked_yaml::parse_yaml(0, content).map_err(|e| invalid(format!("{e:?}")))?;
    let marked_yaml::Node::Mapping(map) = node else {
        return Err(invalid("top level must be a mapping".to_string()));
    };

    let mut raw = RawConfig::default();
    for (key, value) in map.iter() {
        let slot = match key.as_str().to_ascii_lowercase().as_str() {
            "group" => &mut raw.group,
            "apiendpoint" => &mut raw.api_endpoint,
            "token" => &mut raw.token,
            _ => continue,
        };

        let marked_yaml::Node::Scalar(scalar) = value else {
            return Err(invalid(format!("{} must be a plain value", key.as_str())));
        };

        *slot = Some(scalar.as_str().trim().to_string()).filter(|v| !is_null(v));
    }

    Ok(raw)
}

fn is_null(value: &str) -> bool {
    matches!(value, "" | "~" | "null" | "Null" | "NULL")
}

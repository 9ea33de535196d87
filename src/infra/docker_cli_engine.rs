use std::{
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
    process::Stdio,
};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::{
    app::{ContainerEngine, ContainerEngineError},
    domain::ImageReference,
};

const DEFAULT_BINARY: &str = "docker";
const LIST_IMAGES_FORMAT: &str = "{{.Repository}}:{{.Tag}}";

#[derive(Error, Debug)]
pub(in crate::infra) enum DockerCliEngineError {
    #[error("error executing the command: {0}")]
    CommandExecution(#[from] std::io::Error),

    #[error("`{command}` exited with status {code}: {stderr}")]
    CommandFailed {
        command: String,
        code: i32,
        stderr: String,
    },
}

impl From<DockerCliEngineError> for ContainerEngineError {
    fn from(value: DockerCliEngineError) -> Self {
        ContainerEngineError::ContainerEngineError(Box::new(value))
    }
}

/// Drives the engine by spawning its command line client.
#[derive(Clone, Debug)]
pub struct DockerCliEngine {
    binary: OsString,
    search_path: Option<OsString>,
}

impl Default for DockerCliEngine {
    fn default() -> Self {
        Self::new(DEFAULT_BINARY)
    }
}

impl DockerCliEngine {
    /// Uses `binary` looked up in the process `PATH`.
    pub fn new(binary: impl Into<OsString>) -> Self {
        Self {
            binary: binary.into(),
            search_path: std::env::var_os("PATH"),
        }
    }

    /// Uses `binary` looked up in `search_path` instead of the process `PATH`.
    pub fn with_search_path(
        binary: impl Into<OsString>,
        search_path: impl Into<OsString>,
    ) -> Self {
        Self {
            binary: binary.into(),
            search_path: Some(search_path.into()),
        }
    }

    fn resolved_binary(&self) -> Option<PathBuf> {
        find_executable(&self.binary, self.search_path.as_deref())
    }

    fn command(&self) -> Command {
        // Spawn the resolved path so a custom search path is honored.
        let program = self
            .resolved_binary()
            .map(OsString::from)
            .unwrap_or_else(|| self.binary.clone());
        let mut command = Command::new(program);
        command.stdin(Stdio::null());
        command
    }

    async fn run(&self, args: &[&OsStr]) -> Result<Vec<u8>, DockerCliEngineError> {
        let output = self.command().args(args).output().await?;

        if !output.status.success() {
            return Err(DockerCliEngineError::CommandFailed {
                command: std::iter::once(self.binary.as_os_str())
                    .chain(args.iter().copied())
                    .map(|a| a.to_string_lossy())
                    .collect::<Vec<_>>()
                    .join(" "),
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output.stdout)
    }
}

#[async_trait::async_trait]
impl ContainerEngine for DockerCliEngine {
    async fn is_installed(&self) -> bool {
        match self.resolved_binary() {
            Some(path) => {
                debug!("found {}", path.display());
                true
            }
            None => {
                warn!(
                    "executable file {} not found in $PATH",
                    self.binary.to_string_lossy()
                );
                false
            }
        }
    }

    async fn is_running(&self) -> bool {
        let status = self
            .command()
            .arg("info")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        matches!(status, Ok(status) if status.success())
    }

    async fn save_image(
        &self,
        image: &ImageReference,
        destination: &Path,
    ) -> Result<(), ContainerEngineError> {
        let image = image.to_string();
        self.run(&[
            OsStr::new("save"),
            OsStr::new(&image),
            OsStr::new("-o"),
            destination.as_os_str(),
        ])
        .await?;

        Ok(())
    }

    async fn list_images(&self) -> Result<Vec<String>, ContainerEngineError> {
        let stdout = self
            .run(&[
                OsStr::new("images"),
                OsStr::new("--filter"),
                OsStr::new("dangling=false"),
                OsStr::new("--format"),
                OsStr::new(LIST_IMAGES_FORMAT),
            ])
            .await?;

        Ok(parse_image_listing(&String::from_utf8_lossy(&stdout)))
    }
}

/// One image per non-blank line.
pub fn parse_image_listing(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Resolves `binary` the way a shell would: names containing a path separator
/// are checked directly, bare names are searched in every `search_path` entry.
pub fn find_executable(binary: &OsStr, search_path: Option<&OsStr>) -> Option<PathBuf> {
    let candidate = Path::new(binary);
    if candidate.components().count() > 1 {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }

    std::env::split_paths(search_path?)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(binary))
        .find(|path| is_executable(path))
}

fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        match std::fs::metadata(path) {
            Ok(metadata) => metadata.is_file() && metadata.permissions().mode() & 0o111 != 0,
            _ => false,
        }
    }

    #[cfg(windows)]
    {
        path.is_file()
            && path
                .extension()
                .is_some_and(|ext| matches!(ext.to_str(), Some("exe") | Some("bat") | Some("cmd")))
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsStr;

    use super::{find_executable, parse_image_listing};

    #[test]
    fn it_drops_the_trailing_empty_line_of_the_listing() {
        assert_eq!(
            parse_image_listing("ubuntu:22.04\nnginx:latest\n"),
            vec!["ubuntu:22.04".to_string(), "nginx:latest".to_string()]
        );
    }

    #[test]
    fn it_yields_nothing_for_empty_output() {
        assert!(parse_image_listing("").is_empty());
        assert!(parse_image_listing("\n\n").is_empty());
    }

    #[test]
    fn it_does_not_find_a_binary_without_search_path() {
        assert_eq!(find_executable(OsStr::new("docker"), None), None);
    }

    #[test]
    fn it_does_not_find_a_binary_missing_from_the_search_path() {
        let dir = tempfile::tempdir().unwrap();

        assert_eq!(
            find_executable(OsStr::new("docker"), Some(dir.path().as_os_str())),
            None
        );
    }

    #[cfg(unix)]
    mod unix {
        use std::{
            ffi::OsStr,
            os::unix::fs::PermissionsExt,
            path::{Path, PathBuf},
        };

        use serial_test::serial;

        use crate::{app::ContainerEngine, domain::ImageReference, infra::DockerCliEngine};

        use super::super::find_executable;

        fn fake_docker(dir: &Path, script: &str) -> PathBuf {
            let path = dir.join("docker");
            std::fs::write(&path, format!("#!/bin/sh\n{script}\n")).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        fn engine_in(dir: &Path) -> DockerCliEngine {
            DockerCliEngine::with_search_path("docker", dir.as_os_str())
        }

        #[test]
        fn it_finds_an_executable_in_the_search_path() {
            let dir = tempfile::tempdir().unwrap();
            let docker = fake_docker(dir.path(), "exit 0");

            assert_eq!(
                find_executable(OsStr::new("docker"), Some(dir.path().as_os_str())),
                Some(docker)
            );
        }

        #[test]
        fn it_ignores_files_that_are_not_executable() {
            let dir = tempfile::tempdir().unwrap();
            let docker = fake_docker(dir.path(), "exit 0");
            std::fs::set_permissions(&docker, std::fs::Permissions::from_mode(0o644)).unwrap();

            assert_eq!(
                find_executable(OsStr::new("docker"), Some(dir.path().as_os_str())),
                None
            );
        }

        #[tokio::test]
        #[serial]
        async fn it_is_not_installed_when_the_binary_is_absent() {
            let dir = tempfile::tempdir().unwrap();

            assert!(!engine_in(dir.path()).is_installed().await);
        }

        #[tokio::test]
        #[serial]
        async fn it_is_running_when_info_succeeds() {
            let dir = tempfile::tempdir().unwrap();
            fake_docker(dir.path(), r#"[ "$1" = "info" ] && exit 0; exit 1"#);

            let engine = engine_in(dir.path());

            assert!(engine.is_installed().await);
            assert!(engine.is_running().await);
        }

        #[tokio::test]
        #[serial]
        async fn it_is_not_running_when_info_fails() {
            let dir = tempfile::tempdir().unwrap();
            fake_docker(dir.path(), "echo 'Cannot connect to the Docker daemon' >&2; exit 1");

            assert!(!engine_in(dir.path()).is_running().await);
        }

        #[tokio::test]
        #[serial]
        async fn it_saves_the_image_with_the_save_subcommand() {
            let dir = tempfile::tempdir().unwrap();
            fake_docker(
                dir.path(),
                r#"[ "$1" = "save" ] && [ "$3" = "-o" ] && printf '%s' "$2" > "$4""#,
            );
            let destination = dir.path().join("image.tar");

            engine_in(dir.path())
                .save_image(&ImageReference::new("ubuntu", "22.04"), &destination)
                .await
                .unwrap();

            assert_eq!(std::fs::read_to_string(destination).unwrap(), "ubuntu:22.04");
        }

        #[tokio::test]
        #[serial]
        async fn it_surfaces_stderr_when_saving_fails() {
            let dir = tempfile::tempdir().unwrap();
            fake_docker(
                dir.path(),
                "echo 'Error response from daemon: reference does not exist' >&2; exit 1",
            );

            let err = engine_in(dir.path())
                .save_image(
                    &ImageReference::new("missing", "latest"),
                    &dir.path().join("image.tar"),
                )
                .await
                .unwrap_err();

            let message = err.to_string();
            assert!(message.contains("docker save missing:latest -o"));
            assert!(message.contains("reference does not exist"));
        }

        #[tokio::test]
        #[serial]
        async fn it_lists_non_dangling_images() {
            let dir = tempfile::tempdir().unwrap();
            fake_docker(
                dir.path(),
                r#"[ "$1" = "images" ] && [ "$3" = "dangling=false" ] || exit 1
printf 'ubuntu:22.04\nnginx:latest\n'"#,
            );

            let images = engine_in(dir.path()).list_images().await.unwrap();

            assert_eq!(images, vec!["ubuntu:22.04", "nginx:latest"]);
        }

        #[tokio::test]
        #[serial]
        async fn it_lists_nothing_when_there_are_no_images() {
            let dir = tempfile::tempdir().unwrap();
            fake_docker(dir.path(), "exit 0");

            let images = engine_in(dir.path()).list_images().await.unwrap();

            assert!(images.is_empty());
        }
    }
}

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use bollard::image::ListImagesOptions;
use bollard::{Docker, API_DEFAULT_VERSION};
use log::debug;
use stakesign_defs::{ImageIndex, LocalImage};

const CONNECT_TIMEOUT_SECS: u64 = 120;
const NONE_TAG: &str = "<none>:<none>";
const NONE_DIGEST: &str = "<none>@<none>";

/// Image index backed by the docker daemon. Connects on first use.
pub struct DockerDaemon {
    host: Option<String>,
}

impl DockerDaemon {
    /// `None` uses the client's local defaults (honouring `DOCKER_HOST`).
    pub fn new(host: Option<String>) -> Self {
        DockerDaemon { host }
    }

    fn connect(&self) -> Result<Docker> {
        let docker = match self.host.as_deref() {
            None => Docker::connect_with_local_defaults(),
            Some(host) if host.starts_with("unix://") => {
                Docker::connect_with_unix(host, CONNECT_TIMEOUT_SECS, API_DEFAULT_VERSION)
            }
            Some(host) if host.starts_with("tcp://") || host.starts_with("http://") => {
                Docker::connect_with_http(host, CONNECT_TIMEOUT_SECS, API_DEFAULT_VERSION)
            }
            Some(host) => bail!("Unsupported docker host: {}", host),
        };
        docker.context("Failed to connect to docker daemon")
    }
}

/// Docker reports short IDs as the `sha256:` prefix plus 12 hex digits.
fn short_id(id: &str) -> String {
    match id.strip_prefix("sha256:") {
        Some(hex) => format!("sha256:{}", hex.get(..12).unwrap_or(hex)),
        None => id.get(..12).unwrap_or(id).to_string(),
    }
}

fn local_image(id: String, repo_tags: Vec<String>, repo_digests: Vec<String>) -> LocalImage {
    LocalImage {
        short_id: short_id(&id),
        id,
        repo_tags: repo_tags.into_iter().filter(|t| t != NONE_TAG).collect(),
        repo_digests: repo_digests
            .into_iter()
            .filter(|d| d != NONE_DIGEST)
            .collect(),
    }
}

#[async_trait]
impl ImageIndex for DockerDaemon {
    async fn list_images(&self) -> Result<Vec<LocalImage>, anyhow::Error> {
        let docker = self.connect()?;
        let summaries = docker
            .list_images(Some(ListImagesOptions::<String> {
                all: false,
                ..Default::default()
            }))
            .await
            .context("Failed to list docker images")?;
        debug!("Docker daemon reports {} images", summaries.len());
        Ok(summaries
            .into_iter()
            .map(|image| local_image(image.id, image.repo_tags, image.repo_digests))
            .collect())
    }
}

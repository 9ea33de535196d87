use bytes::Bytes;
use reqwest::{Client, RequestBuilder};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::{
    app::{ApiToken, Config, ScanService, ScanServiceError},
    domain::{ImageReference, ScanReport, ScanReportError, sanitize_image_name},
};

const FETCH_PATH: [&str; 2] = ["api", "fetch"];
const UPLOAD_PATH: [&str; 2] = ["api", "upload"];
const REGISTRY_URL_SCHEME: &str = "docker-registry-https://";

#[derive(Error, Debug)]
pub(in crate::infra) enum HttpScanClientError {
    #[error("apiEndpoint url {0} cannot be used as a base url")]
    InvalidEndpoint(String),

    #[error("while performing request: {0}")]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Report(#[from] ScanReportError),
}

impl From<HttpScanClientError> for ScanServiceError {
    fn from(value: HttpScanClientError) -> Self {
        ScanServiceError::ScanServiceError(Box::new(value))
    }
}

/// Scanning service reached over HTTP with bearer-token authentication.
#[derive(Clone, Debug)]
pub struct HttpScanClient {
    client: Client,
    endpoint: Url,
    group: String,
    token: ApiToken,
}

impl HttpScanClient {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            endpoint: config.api_endpoint.clone(),
            group: config.group.clone(),
            token: config.token.clone(),
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.token.0)
            .header("Group", self.group.as_str())
    }

    async fn report_url(&self, request: RequestBuilder) -> Result<String, HttpScanClientError> {
        let response = self.authorized(request).send().await?;
        debug!("scan service answered {}", response.status());

        // Failures are reported in the body as well, whatever the status.
        let body = response.text().await?;
        Ok(ScanReport::report_url_from_body(&body)?)
    }

    async fn fetch(&self, image: &ImageReference) -> Result<String, HttpScanClientError> {
        let url = join_endpoint(&self.endpoint, &FETCH_PATH)?;
        debug!("POST {}", url);

        let request = self
            .client
            .post(url)
            .header("Url", format!("{REGISTRY_URL_SCHEME}{image}"));

        self.report_url(request).await
    }

    async fn upload(
        &self,
        tarball: Bytes,
        image: &ImageReference,
    ) -> Result<String, HttpScanClientError> {
        let name = sanitize_image_name(&image.to_string());
        let segments = [UPLOAD_PATH[0], UPLOAD_PATH[1], name.as_str()];
        let url = join_endpoint(&self.endpoint, &segments)?;
        debug!("PUT {} ({} bytes)", url, tarball.len());

        let request = self
            .client
            .put(url)
            .header("Force-Scan", "True")
            .body(tarball);

        self.report_url(request).await
    }
}

#[async_trait::async_trait]
impl ScanService for HttpScanClient {
    async fn order_remote_scan(&self, image: &ImageReference) -> Result<String, ScanServiceError> {
        Ok(self.fetch(image).await?)
    }

    async fn upload_image(
        &self,
        tarball: Bytes,
        image: &ImageReference,
    ) -> Result<String, ScanServiceError> {
        Ok(self.upload(tarball, image).await?)
    }
}

/// Appends `segments` to the endpoint path, dropping empty segments and ending
/// with exactly one slash. The endpoint query string is kept.
pub(in crate::infra) fn join_endpoint(
    endpoint: &Url,
    segments: &[&str],
) -> Result<Url, HttpScanClientError> {
    if endpoint.cannot_be_a_base() {
        return Err(HttpScanClientError::InvalidEndpoint(endpoint.to_string()));
    }

    let path = endpoint
        .path()
        .split('/')
        .chain(segments.iter().flat_map(|s| s.split('/')))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>();

    let mut url = endpoint.clone();
    if path.is_empty() {
        url.set_path("/");
    } else {
        url.set_path(&format!("/{}/", path.join("/")));
    }

    Ok(url)
}

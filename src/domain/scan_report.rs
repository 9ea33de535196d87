use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Response returned by the scanning service for both upload and fetch requests.
///
/// Only the report URL drives behavior, but every documented field is typed so
/// that a response with a mismatching shape is rejected instead of silently
/// accepted.
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct ScanReport {
    #[serde(default)]
    pub meta: Option<ScanReportMeta>,
    #[serde(default)]
    pub results: Option<ScanReportResults>,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct ScanReportMeta {
    #[serde(default)]
    pub code: Option<i64>,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct ScanReportResults {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub sha1sum: Option<Value>,
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub product_id: Option<i64>,
    #[serde(default)]
    pub report_url: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(rename = "rescan-possible", default)]
    pub rescan_possible: Option<bool>,
    #[serde(default)]
    pub stale: Option<bool>,
    #[serde(default)]
    pub custom_data: Option<Map<String, Value>>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub notify: Option<bool>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

#[derive(Error, Debug)]
pub enum ScanReportError {
    #[error("while unmarshalling the scan report ({source}), raw body: {body}")]
    InvalidJson {
        source: serde_json::Error,
        body: String,
    },

    #[error("scan report has no report_url, raw body: {body}")]
    MissingReportUrl { body: String },
}

impl ScanReport {
    pub fn from_body(body: &str) -> Result<Self, ScanReportError> {
        serde_json::from_str(body).map_err(|source| ScanReportError::InvalidJson {
            source,
            body: body.to_string(),
        })
    }

    pub fn report_url(&self) -> Option<&str> {
        self.results
            .as_ref()
            .and_then(|r| r.report_url.as_deref())
            .filter(|url| !url.is_empty())
    }

    /// Parses `body` and extracts the report URL in one step.
    pub fn report_url_from_body(body: &str) -> Result<String, ScanReportError> {
        Self::from_body(body)?
            .report_url()
            .map(str::to_string)
            .ok_or_else(|| ScanReportError::MissingReportUrl {
                body: body.to_string(),
            })
    }
}

//! DataRobot datasets API client.

use super::{DatasetInfo, Publisher};
use crate::Result;
use crate::source::resilient_send;
use core::time::Duration;
use ohno::{IntoAppError, bail};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use url::Url;

/// Public DataRobot API root.
pub const DEFAULT_ENDPOINT: &str = "https://app.datarobot.com/api/v2";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    catalog_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DatasetResponse {
    dataset_id: String,
    name: Option<String>,
    row_count: Option<u64>,
    column_count: Option<u64>,
}

impl From<DatasetResponse> for DatasetInfo {
    fn from(resp: DatasetResponse) -> Self {
        Self {
            id: resp.dataset_id,
            name: resp.name,
            row_count: resp.row_count,
            column_count: resp.column_count,
        }
    }
}

/// Publishes tables to DataRobot's AI Catalog.
#[derive(Debug, Clone)]
pub struct DataRobotClient {
    client: reqwest::Client,
    endpoint: Url,
    timeout: Duration,
}

impl DataRobotClient {
    pub fn new(endpoint: &Url, api_token: &str, timeout: Duration) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_token}")).into_app_err("invalid API token")?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        let _ = headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .user_agent(crate::USER_AGENT)
            .default_headers(headers)
            .build()
            .into_app_err("unable to create HTTP client")?;

        // Url::join replaces the last path segment unless the base ends with '/'.
        let mut endpoint = endpoint.clone();
        if !endpoint.path().ends_with('/') {
            let path = format!("{}/", endpoint.path());
            endpoint.set_path(&path);
        }

        Ok(Self {
            client,
            endpoint,
            timeout,
        })
    }

    fn url(&self, relative: &str) -> Result<Url> {
        self.endpoint
            .join(relative)
            .into_app_err_with(|| format!("invalid API path '{relative}'"))
    }

    fn dataset_url(&self, id: &str) -> Result<Url> {
        self.url(&format!("datasets/{id}/"))
    }
}

async fn check_status(resp: reqwest::Response, action: &str) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    let body = body.trim();
    if body.is_empty() {
        bail!("{action} failed: HTTP {status}");
    }
    bail!("{action} failed: HTTP {status}: {body}");
}

impl Publisher for DataRobotClient {
    async fn upload(&self, csv: Vec<u8>, file_name: &str) -> Result<DatasetInfo> {
        let url = self.url("datasets/fromFile/")?;
        log::info!("uploading {} bytes to {url}", csv.len());

        let file_name = file_name.to_string();
        let resp = resilient_send(&self.client, "dataset upload", self.timeout, move |client| {
            let mut part_headers = HeaderMap::new();
            let _ = part_headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/csv"));
            let part = Part::bytes(csv.clone()).file_name(file_name.clone()).headers(part_headers);
            client.post(url.clone()).multipart(Form::new().part("file", part))
        })
        .await?;

        let resp = check_status(resp, "dataset upload").await?;
        let uploaded: UploadResponse = resp.json().await.into_app_err("unable to parse dataset upload response")?;

        log::info!("uploaded dataset {}", uploaded.catalog_id);
        Ok(DatasetInfo::new(uploaded.catalog_id))
    }

    async fn rename(&self, id: &str, name: &str) -> Result<DatasetInfo> {
        let url = self.dataset_url(id)?;
        let body = serde_json::json!({ "name": name });

        let resp = resilient_send(&self.client, "dataset rename", self.timeout, move |client| {
            client.patch(url.clone()).json(&body)
        })
        .await?;
        let resp = check_status(resp, "dataset rename").await?;
        let dataset: DatasetResponse = resp.json().await.into_app_err("unable to parse dataset rename response")?;

        Ok(dataset.into())
    }

    async fn refresh(&self, id: &str) -> Result<DatasetInfo> {
        let url = self.dataset_url(id)?;

        let resp = resilient_send(&self.client, "dataset refresh", self.timeout, move |client| client.get(url.clone())).await?;
        let resp = check_status(resp, "dataset refresh").await?;
        let dataset: DatasetResponse = resp.json().await.into_app_err("unable to parse dataset response")?;

        Ok(dataset.into())
    }
}

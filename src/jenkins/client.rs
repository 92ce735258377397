use async_trait::async_trait;
use log::{debug, info};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::time::Duration;
use url::Url;

use super::types::{Crumb, JobInfo, StageInfo};
use super::JobService;
use crate::config::Auth;
use crate::error::{JenkinsBtError, Result};

const REQUEST_TIMEOUT_SECONDS: u64 = 30;

/// Jenkins REST API client authenticated with a user name and API token.
pub struct JenkinsClient {
    client: Client,
    base_url: Url,
    auth: Auth,
}

impl JenkinsClient {
    pub fn new(base_url: &Url, auth: Auth) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("jenkins-bt/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
            .build()
            .map_err(|e| JenkinsBtError::Config(format!("Failed to create HTTP client: {e}")))?;

        if base_url.cannot_be_a_base() {
            return Err(JenkinsBtError::Config(format!(
                "Invalid Jenkins endpoint: {base_url}"
            )));
        }

        Ok(Self {
            client,
            base_url: base_url.clone(),
            auth,
        })
    }

    fn auth_request(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(&self.auth.username, Some(&self.auth.api_token))
    }

    /// URL below the endpoint built from raw path segments.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// URL of a job, where `folder/name` addresses a job inside a folder.
    fn job_url(&self, job_name: &str, suffix: &[&str]) -> Url {
        let mut segments = Vec::new();
        for part in job_name.split('/').filter(|p| !p.is_empty()) {
            segments.push("job");
            segments.push(part);
        }
        segments.extend_from_slice(suffix);
        self.url(&segments)
    }

    /// CSRF crumb for POST requests; `None` when the server does not issue crumbs.
    async fn crumb(&self) -> Result<Option<Crumb>> {
        let url = self.url(&["crumbIssuer", "api", "json"]);
        let response = self.auth_request(self.client.get(url)).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("Crumb issuer disabled");
            return Ok(None);
        }

        let crumb = ensure_success(response).await?.json().await?;
        Ok(Some(crumb))
    }
}

async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read error response".to_string());
    Err(JenkinsBtError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl JobService for JenkinsClient {
    async fn next_build_number(&self, job_name: &str) -> Result<u64> {
        let mut url = self.job_url(job_name, &["api", "json"]);
        url.query_pairs_mut().append_pair("tree", "nextBuildNumber");

        let response = self.auth_request(self.client.get(url)).send().await?;
        let info: JobInfo = ensure_success(response).await?.json().await?;

        debug!("Next build number of {job_name}: {}", info.next_build_number);
        Ok(info.next_build_number)
    }

    async fn trigger(&self, job_name: &str) -> Result<()> {
        let url = self.job_url(job_name, &["build"]);
        let mut request = self.auth_request(self.client.post(url));

        if let Some(crumb) = self.crumb().await? {
            request = request.header(crumb.crumb_request_field, crumb.crumb);
        }

        ensure_success(request.send().await?).await?;

        info!("Triggered job {job_name}");
        Ok(())
    }

    async fn stage_info(&self, job_name: &str, build_number: u64) -> Result<Option<StageInfo>> {
        let build = build_number.to_string();
        let url = self.job_url(job_name, &[build.as_str(), "wfapi", "describe"]);

        let response = self.auth_request(self.client.get(url)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!("{job_name} #{build_number} not started yet");
            return Ok(None);
        }

        let info = ensure_success(response).await?.json().await?;
        Ok(Some(info))
    }
}

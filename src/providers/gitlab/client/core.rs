use log::warn;
use reqwest::header::HeaderValue;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use url::Url;

use crate::auth::Token;
use crate::error::{Result, TimesheetError};

const TOKEN_HEADER: &str = "PRIVATE-TOKEN";
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_RETRY_DELAY_MS: u64 = 1000;
const DEFAULT_PER_PAGE: usize = 100;
const MAX_CONCURRENT_REQUESTS: usize = 50;

/// Tuning knobs for [`GitLabClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub per_page: usize,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// GitLab REST v4 client.
///
/// Holds no per-user state: the token travels with every call, so one client
/// (and its connection pool) can be shared by concurrent report builds.
pub struct GitLabClient {
    client: Client,
    api_url: Url,
    pub(super) options: ClientOptions,
    semaphore: Arc<Semaphore>,
}

impl GitLabClient {
    pub fn new(base_url: &str, api_path: &str, options: ClientOptions) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("gitlab-timesheet/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TimesheetError::Config(format!("Failed to create HTTP client: {e}")))?;

        // A trailing slash keeps the api path when joining endpoint paths
        let api_path = if api_path.ends_with('/') {
            api_path.to_string()
        } else {
            format!("{api_path}/")
        };

        let api_url = Url::parse(base_url)
            .map_err(|e| TimesheetError::Config(format!("Invalid base URL: {e}")))?
            .join(&api_path)
            .map_err(|e| TimesheetError::Config(format!("Invalid API base URL: {e}")))?;

        Ok(Self {
            client,
            api_url,
            options,
            semaphore: Arc::new(Semaphore::new(MAX_CONCURRENT_REQUESTS)),
        })
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    pub(super) fn endpoint(&self, path: &str) -> Result<Url> {
        self.api_url
            .join(path)
            .map_err(|e| TimesheetError::Config(format!("Invalid endpoint URL '{path}': {e}")))
    }

    fn auth_request(
        &self,
        request: reqwest::RequestBuilder,
        token: &Token,
    ) -> Result<reqwest::RequestBuilder> {
        let value = HeaderValue::from_str(token.as_str())
            .map_err(|_| TimesheetError::Config("Token contains invalid characters".into()))?;
        Ok(request.header(TOKEN_HEADER, value))
    }

    /// Execute a GET request, retrying network errors, rate limits and server errors.
    /// Returns the response once its status is a success.
    pub(super) async fn get(&self, url: Url, token: &Token) -> Result<reqwest::Response> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| TimesheetError::Config("HTTP request limiter is closed".into()))?;

        let max_retries = self.options.max_retries;
        let delay = self.options.retry_delay;
        let mut retry_count = 0;

        loop {
            let request = self.auth_request(self.client.get(url.clone()), token)?;

            let response = match request.send().await {
                Ok(resp) => resp,
                Err(e) if e.is_connect() || e.is_timeout() => {
                    if retry_count >= max_retries {
                        return Err(e.into());
                    }
                    warn!(
                        "Network error ({}), retrying in {:?} ({}/{})...",
                        e,
                        delay,
                        retry_count + 1,
                        max_retries
                    );
                    tokio::time::sleep(delay).await;
                    retry_count += 1;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                if retry_count >= max_retries {
                    return Err(TimesheetError::ApiErrorAfterRetries {
                        status: status.as_u16(),
                        retries: max_retries,
                    });
                }

                warn!(
                    "GitLab API error (status {status}) for {}. Waiting {delay:?} before retry {}/{}...",
                    url.path(),
                    retry_count + 1,
                    max_retries
                );

                tokio::time::sleep(delay).await;
                retry_count += 1;
                continue;
            }

            if !status.is_success() {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unable to read error response".to_string());
                return Err(TimesheetError::ApiError {
                    status: status.as_u16(),
                    message: error_text,
                });
            }

            return Ok(response);
        }
    }
}

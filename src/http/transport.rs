use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Proxy, Request, Response};
use tracing::error;

use crate::{
    args::DEFAULT_USER_AGENT,
    error::{AppError, AppResult, HttpError, ValidationError},
};

/// Sends one request. Elapsed time is measured by the caller, not here.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request) -> Result<Response, HttpError>;
}

/// Client-wide settings shared by every worker of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportSettings {
    pub verify_tls: bool,
    /// Applies to connection establishment, TLS handshake included.
    pub connect_timeout: Option<Duration>,
    pub request_timeout: Option<Duration>,
    pub proxy: Option<String>,
}

impl TransportSettings {
    /// `0` disables the connect timeout and a blank proxy disables proxying.
    #[must_use]
    pub fn new(
        verify_tls: bool,
        connect_timeout_ms: u64,
        request_timeout_ms: Option<u64>,
        proxy: Option<&str>,
    ) -> Self {
        let connect_timeout = if connect_timeout_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(connect_timeout_ms))
        };
        Self {
            verify_tls,
            connect_timeout,
            request_timeout: request_timeout_ms.map(Duration::from_millis),
            proxy: proxy
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_owned),
        }
    }
}

/// reqwest-backed transport. The client pools connections and is cheap to
/// share between workers.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Builds the pooled client for a run.
    ///
    /// # Errors
    ///
    /// Returns `InvalidProxyUrl` for a proxy reqwest rejects, or
    /// `BuildClientFailed` when the client cannot be constructed.
    pub fn new(settings: &TransportSettings) -> AppResult<Self> {
        let mut client_builder = Client::builder().user_agent(DEFAULT_USER_AGENT);

        if let Some(connect_timeout) = settings.connect_timeout {
            client_builder = client_builder.connect_timeout(connect_timeout);
        }
        if let Some(request_timeout) = settings.request_timeout {
            client_builder = client_builder.timeout(request_timeout);
        }

        if !settings.verify_tls {
            client_builder = client_builder
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true);
        }

        if let Some(proxy_url) = settings.proxy.as_deref() {
            let proxy = Proxy::all(proxy_url).map_err(|err| {
                error!("Invalid proxy URL '{}': {}", proxy_url, err);
                AppError::validation(ValidationError::InvalidProxyUrl {
                    url: proxy_url.to_owned(),
                    source: err,
                })
            })?;
            client_builder = client_builder.proxy(proxy);
        } else {
            client_builder = client_builder.no_proxy();
        }

        let client = client_builder.build().map_err(|err| {
            error!("Failed to build HTTP client: {}", err);
            AppError::http(HttpError::BuildClientFailed { source: err })
        })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: Request) -> Result<Response, HttpError> {
        self.client.execute(request).await.map_err(HttpError::send)
    }
}

use base64::Engine as _;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Request, Url};

use crate::{
    args::HttpMethod,
    error::{HttpError, ValidationError},
};

/// Basic auth credentials. Only constructed when both halves are present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicAuth {
    user: String,
    password: String,
}

impl BasicAuth {
    /// Pairs a user and password, or `None` when either one is empty.
    #[must_use]
    pub fn from_parts(user: &str, password: &str) -> Option<Self> {
        if user.is_empty() || password.is_empty() {
            return None;
        }
        Some(Self {
            user: user.to_owned(),
            password: password.to_owned(),
        })
    }

    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    fn header_value(&self) -> String {
        let token = format!("{}:{}", self.user, self.password);
        let encoded = base64::engine::general_purpose::STANDARD.encode(token.as_bytes());
        format!("Basic {}", encoded)
    }
}

/// Immutable description of the request a run sends N times.
///
/// Header names and values are validated up front so that `build` only fails
/// on a broken template, never on user input.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    method: HttpMethod,
    url: Url,
    headers: HeaderMap,
    body: String,
    auth: Option<BasicAuth>,
}

impl RequestOptions {
    /// Validates headers into a case-insensitive map; later entries replace
    /// earlier ones with the same name.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHeaderName`/`InvalidHeaderValue` for headers that are
    /// not valid HTTP.
    pub fn new(
        method: HttpMethod,
        url: Url,
        headers: &[(String, String)],
        body: String,
        auth: Option<BasicAuth>,
    ) -> Result<Self, ValidationError> {
        let mut map = HeaderMap::with_capacity(headers.len());
        for (key, value) in headers {
            let name = HeaderName::from_bytes(key.as_bytes()).map_err(|err| {
                ValidationError::InvalidHeaderName {
                    header: key.clone(),
                    source: err,
                }
            })?;
            let val =
                HeaderValue::from_str(value).map_err(|err| ValidationError::InvalidHeaderValue {
                    header: key.clone(),
                    source: err,
                })?;
            map.insert(name, val);
        }
        Ok(Self {
            method,
            url,
            headers: map,
            body,
            auth,
        })
    }

    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        self.method
    }

    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    #[must_use]
    pub const fn auth(&self) -> Option<&BasicAuth> {
        self.auth.as_ref()
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&HeaderValue> {
        self.headers.get(CONTENT_TYPE)
    }

    /// Produces a fresh request. The template itself is never modified.
    ///
    /// # Errors
    ///
    /// Returns `BuildRequestFailed` or `ConvertRequestFailed` when the
    /// template cannot be turned into a request.
    pub fn build(&self) -> Result<Request, HttpError> {
        let mut builder = http::Request::builder()
            .method(self.method.to_method())
            .uri(self.url.as_str());

        for (name, value) in &self.headers {
            if self.auth.is_some() && name == AUTHORIZATION {
                continue;
            }
            builder = builder.header(name, value);
        }
        if let Some(auth) = self.auth.as_ref() {
            builder = builder.header(AUTHORIZATION, auth.header_value());
        }

        let request = builder
            .body(self.body.clone())
            .map_err(|err| HttpError::BuildRequestFailed { source: err })?;
        Request::try_from(request).map_err(|err| HttpError::ConvertRequestFailed { source: err })
    }
}

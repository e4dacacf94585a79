use serde::Deserialize;

use crate::args::HttpMethod;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub url: Option<String>,
    pub method: Option<HttpMethod>,
    pub headers: Option<Vec<String>>,
    pub content_type: Option<String>,
    pub body: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub proxy: Option<String>,
    pub verify: Option<bool>,
    pub requests: Option<u64>,
    #[serde(alias = "workers")]
    pub concurrency: Option<usize>,
    #[serde(alias = "timeout")]
    pub timeout_ms: Option<u64>,
    pub request_timeout_ms: Option<u64>,
    pub cpus: Option<usize>,
    pub verbose: Option<bool>,
    pub no_color: Option<bool>,
}

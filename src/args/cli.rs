use clap::{ArgAction, Parser};

use super::defaults::{DEFAULT_CONCURRENCY, DEFAULT_CONTENT_TYPE, DEFAULT_REQUESTS};
use super::parsers::{parse_positive_u64, parse_positive_usize};
use super::types::{HttpMethod, PositiveU64, PositiveUsize};

/// `-h` carries request headers, so the automatic help flag is long-only.
#[derive(Debug, Parser, Clone)]
#[command(
    version,
    disable_help_flag = true,
    about = "Fixed-count async HTTP load generator with a bounded worker pool and live throughput reporting."
)]
pub struct LoadArgs {
    /// Print help
    #[arg(long, action = ArgAction::Help)]
    pub help: Option<bool>,

    /// Target URL for the load test
    #[arg(value_name = "URL")]
    pub url: Option<String>,

    /// HTTP method to use (GET, POST or PUT)
    #[arg(long, short = 'm', default_value = "get", ignore_case = true)]
    pub method: HttpMethod,

    /// Request headers as ';'-separated 'Name: value' pairs (repeatable)
    #[arg(long = "headers", short = 'h')]
    pub headers: Vec<String>,

    /// Content-Type header value
    #[arg(long = "content-type", short = 'T', default_value = DEFAULT_CONTENT_TYPE)]
    pub content_type: String,

    /// Request body, or '@<path>' to read the body from a file
    #[arg(long, short = 'b', default_value = "")]
    pub body: String,

    /// Basic auth user (applied only together with --password)
    #[arg(long, short = 'u', default_value = "")]
    pub user: String,

    /// Basic auth password (applied only together with --user)
    #[arg(long, short = 'p', default_value = "")]
    pub password: String,

    /// Proxy URL; an empty value disables proxying
    #[arg(long, env = "FIRELOAD_PROXY")]
    pub proxy: Option<String>,

    /// Verify TLS certificates and hostnames
    #[arg(long, default_value_t = true, action = ArgAction::Set, value_name = "BOOL")]
    pub verify: bool,

    /// Total number of requests to send
    #[arg(
        long,
        short = 'n',
        env = "FIRELOAD_REQUESTS",
        default_value = DEFAULT_REQUESTS,
        value_parser = parse_positive_u64
    )]
    pub requests: PositiveU64,

    /// Number of concurrent workers (must not exceed --requests)
    #[arg(
        long,
        short = 'c',
        env = "FIRELOAD_CONCURRENCY",
        default_value = DEFAULT_CONCURRENCY,
        value_parser = parse_positive_usize
    )]
    pub concurrency: PositiveUsize,

    /// Connection timeout in milliseconds, including the TLS handshake (0 disables)
    #[arg(long = "timeout", short = 't', env = "FIRELOAD_TIMEOUT_MS", default_value_t = 0)]
    pub timeout_ms: u64,

    /// Whole-request timeout in milliseconds (unset disables)
    #[arg(long = "request-timeout", value_parser = parse_positive_u64)]
    pub request_timeout_ms: Option<PositiveU64>,

    /// Runtime worker threads (defaults to the number of CPUs)
    #[arg(long = "cpus", short = 'C', value_parser = parse_positive_usize)]
    pub cpus: Option<PositiveUsize>,

    /// Path to config file (TOML/JSON). Defaults to ./fireload.toml or ./fireload.json if present.
    #[arg(long)]
    pub config: Option<String>,

    /// Enable verbose logging (sets log level to debug unless overridden by FIRELOAD_LOG/RUST_LOG)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,
}

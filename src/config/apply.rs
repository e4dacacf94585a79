use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{LoadArgs, PositiveU64, PositiveUsize};
use crate::error::{AppError, AppResult, ConfigError};

use super::types::ConfigFile;

/// Applies configuration values to CLI arguments.
///
/// Values given on the command line always win; environment variables and
/// defaults are overridden by the file.
///
/// # Errors
///
/// Returns an error when a count in the config is below 1.
pub fn apply_config(
    args: &mut LoadArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if !is_cli(matches, "url")
        && let Some(url) = config.url.clone()
    {
        args.url = Some(url);
    }

    if !is_cli(matches, "method")
        && let Some(method) = config.method
    {
        args.method = method;
    }

    if !is_cli(matches, "headers")
        && let Some(headers) = config.headers.clone()
    {
        args.headers = headers;
    }

    if !is_cli(matches, "content_type")
        && let Some(content_type) = config.content_type.clone()
    {
        args.content_type = content_type;
    }

    if !is_cli(matches, "body")
        && let Some(body) = config.body.clone()
    {
        args.body = body;
    }

    if !is_cli(matches, "user")
        && let Some(user) = config.user.clone()
    {
        args.user = user;
    }

    if !is_cli(matches, "password")
        && let Some(password) = config.password.clone()
    {
        args.password = password;
    }

    if !is_cli(matches, "proxy")
        && let Some(proxy) = config.proxy.clone()
    {
        args.proxy = Some(proxy);
    }

    if !is_cli(matches, "verify")
        && let Some(verify) = config.verify
    {
        args.verify = verify;
    }

    if !is_cli(matches, "requests")
        && let Some(requests) = config.requests
    {
        args.requests = ensure_positive_u64(requests, "requests")?;
    }

    if !is_cli(matches, "concurrency")
        && let Some(concurrency) = config.concurrency
    {
        args.concurrency = ensure_positive_usize(concurrency, "concurrency")?;
    }

    if !is_cli(matches, "timeout_ms")
        && let Some(timeout_ms) = config.timeout_ms
    {
        args.timeout_ms = timeout_ms;
    }

    if !is_cli(matches, "request_timeout_ms")
        && let Some(request_timeout_ms) = config.request_timeout_ms
    {
        args.request_timeout_ms = Some(ensure_positive_u64(
            request_timeout_ms,
            "request_timeout_ms",
        )?);
    }

    if !is_cli(matches, "cpus")
        && let Some(cpus) = config.cpus
    {
        args.cpus = Some(ensure_positive_usize(cpus, "cpus")?);
    }

    if !is_cli(matches, "verbose")
        && let Some(verbose) = config.verbose
    {
        args.verbose = verbose;
    }

    if !is_cli(matches, "no_color")
        && let Some(no_color) = config.no_color
    {
        args.no_color = no_color;
    }

    Ok(())
}

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}

fn ensure_positive_u64(value: u64, field: &str) -> AppResult<PositiveU64> {
    PositiveU64::try_from(value).map_err(|err| {
        AppError::config(ConfigError::FieldMustBePositive {
            field: field.to_owned(),
            source: err,
        })
    })
}

fn ensure_positive_usize(value: usize, field: &str) -> AppResult<PositiveUsize> {
    PositiveUsize::try_from(value).map_err(|err| {
        AppError::config(ConfigError::FieldMustBePositive {
            field: field.to_owned(),
            source: err,
        })
    })
}

use tracing::debug;
use url::Url;

use super::types::{PositiveU64, PositiveUsize};
use crate::error::{AppError, AppResult, ValidationError};

/// Separator between entries of a `-h` header list.
const HEADER_LIST_SEPARATOR: char = ';';

/// Parses one `Name: value` header.
///
/// The name is limited to word characters and `-`, and the value must not be
/// empty after trimming.
///
/// # Errors
///
/// Returns `InvalidHeaderFormat` when the entry does not match `Name: value`.
pub fn parse_header(s: &str) -> Result<(String, String), ValidationError> {
    let invalid = || ValidationError::InvalidHeaderFormat {
        value: s.to_owned(),
    };
    let (name, value) = s.split_once(':').ok_or_else(invalid)?;
    let name = name.trim_start();
    let value = value.trim();
    if name.is_empty() || value.is_empty() || !name.chars().all(is_header_name_char) {
        return Err(invalid());
    }
    Ok((name.to_owned(), value.to_owned()))
}

const fn is_header_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '-'
}

/// Parses a `;`-separated header list, skipping malformed entries.
#[must_use]
pub fn parse_header_list(s: &str) -> Vec<(String, String)> {
    s.split(HEADER_LIST_SEPARATOR)
        .filter(|entry| !entry.trim().is_empty())
        .filter_map(|entry| match parse_header(entry) {
            Ok(pair) => Some(pair),
            Err(err) => {
                debug!("Skipping header entry: {}", err);
                None
            }
        })
        .collect()
}

pub(super) fn parse_positive_u64(s: &str) -> AppResult<PositiveU64> {
    s.parse::<PositiveU64>().map_err(AppError::from)
}

pub(super) fn parse_positive_usize(s: &str) -> AppResult<PositiveUsize> {
    s.parse::<PositiveUsize>().map_err(AppError::from)
}

/// Parses the target URL, accepting only `http` and `https`.
///
/// # Errors
///
/// Returns `InvalidUrl` when the value does not parse, or `UnsupportedScheme`
/// for any other scheme.
pub fn parse_target_url(s: &str) -> Result<Url, ValidationError> {
    let url = Url::parse(s.trim()).map_err(|err| ValidationError::InvalidUrl {
        url: s.to_owned(),
        source: err,
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ValidationError::UnsupportedScheme {
            scheme: other.to_owned(),
        }),
    }
}

/// Resolves the request body; a leading `@` reads the body from that path.
///
/// # Errors
///
/// Returns `BodyFilePathEmpty` for a bare `@`, or `ReadBodyFile` when the
/// file cannot be read.
pub fn resolve_body(value: &str) -> Result<String, ValidationError> {
    let Some(path) = value.strip_prefix('@') else {
        return Ok(value.to_owned());
    };
    if path.is_empty() {
        return Err(ValidationError::BodyFilePathEmpty);
    }
    std::fs::read_to_string(path).map_err(|err| ValidationError::ReadBodyFile {
        path: path.to_owned(),
        source: err,
    })
}

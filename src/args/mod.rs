//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
pub(crate) mod parsers;
mod types;

#[cfg(test)]
mod test_support;

pub use cli::LoadArgs;
pub use types::{HttpMethod, PositiveU64, PositiveUsize};

pub(crate) use defaults::DEFAULT_USER_AGENT;
pub use parsers::{parse_header, parse_header_list, parse_target_url, resolve_body};

#[cfg(test)]
pub(crate) use test_support::parse_test_args;

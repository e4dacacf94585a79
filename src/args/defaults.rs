pub(crate) const DEFAULT_USER_AGENT: &str = concat!("fireload/", env!("CARGO_PKG_VERSION"));

pub(crate) const DEFAULT_CONTENT_TYPE: &str = "application/json";

pub(super) const DEFAULT_REQUESTS: &str = "100";

pub(super) const DEFAULT_CONCURRENCY: &str = "20";

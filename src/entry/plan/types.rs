use crate::engine::RunSettings;
use crate::http::{HttpTransport, RequestOptions};

/// A validated run, ready to execute. Nothing in here changes once built.
pub(in crate::entry) struct RunPlan {
    pub(in crate::entry) options: RequestOptions,
    pub(in crate::entry) settings: RunSettings,
    pub(in crate::entry) transport: HttpTransport,
    pub(in crate::entry) cpus: Option<usize>,
    pub(in crate::entry) use_color: bool,
}

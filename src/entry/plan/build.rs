use clap::ArgMatches;
use tracing::{debug, error};

use crate::args::{
    LoadArgs, PositiveU64, PositiveUsize, parse_header_list, parse_target_url, resolve_body,
};
use crate::config::{apply_config, load_config};
use crate::engine::RunSettings;
use crate::error::{AppError, AppResult, ValidationError};
use crate::http::{BasicAuth, HttpTransport, RequestOptions, TransportSettings};

use super::types::RunPlan;

pub(crate) fn build_plan(mut args: LoadArgs, matches: &ArgMatches) -> AppResult<RunPlan> {
    if let Some(config) = load_config(args.config.as_deref())? {
        apply_config(&mut args, matches, &config)?;
    }

    crate::logger::init_logging(args.verbose, args.no_color);

    let plan = validate(&args);
    if let Err(err) = &plan {
        error!("{}", err);
    }
    plan
}

pub(super) fn validate(args: &LoadArgs) -> AppResult<RunPlan> {
    let Some(raw_url) = args.url.as_deref() else {
        return Err(AppError::validation(ValidationError::MissingUrl));
    };
    let url = parse_target_url(raw_url)?;
    let settings = RunSettings::new(args.requests, args.concurrency)?;
    let body = resolve_body(&args.body)?;

    let headers = request_headers(args);
    let auth = BasicAuth::from_parts(&args.user, &args.password);
    if let Some(auth) = &auth {
        debug!("Using basic auth for user '{}'", auth.user());
    }
    let options = RequestOptions::new(args.method, url, &headers, body, auth)?;

    let transport_settings = TransportSettings::new(
        args.verify,
        args.timeout_ms,
        args.request_timeout_ms.map(PositiveU64::get),
        args.proxy.as_deref(),
    );
    let transport = HttpTransport::new(&transport_settings)?;

    Ok(RunPlan {
        options,
        settings,
        transport,
        cpus: args.cpus.map(PositiveUsize::get),
        use_color: !args.no_color,
    })
}

/// Content type first, then every `-h` list in order, so explicit headers
/// override it and later duplicates win.
pub(super) fn request_headers(args: &LoadArgs) -> Vec<(String, String)> {
    let mut headers = vec![("Content-Type".to_owned(), args.content_type.clone())];
    for list in &args.headers {
        headers.extend(parse_header_list(list));
    }
    headers
}

use tracing_subscriber::{EnvFilter, FmtSubscriber};

const LOG_ENV: &str = "FIRELOAD_LOG";
const FALLBACK_LOG_ENV: &str = "RUST_LOG";

/// Installs the global subscriber. Log events go to stderr so stdout only
/// carries progress lines.
pub fn init_logging(verbose: bool, no_color: bool) {
    let directives = filter_directives(
        std::env::var(LOG_ENV).ok(),
        std::env::var(FALLBACK_LOG_ENV).ok(),
        verbose,
    );
    let filter = EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_ansi(!no_color)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set global default subscriber: {}", err);
    }
}

fn filter_directives(own: Option<String>, fallback: Option<String>, verbose: bool) -> String {
    own.or(fallback).unwrap_or_else(|| {
        if verbose {
            "debug".to_owned()
        } else {
            "info".to_owned()
        }
    })
}

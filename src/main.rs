mod args;
mod config;
mod engine;
mod entry;
mod error;
mod http;
mod logger;
mod shutdown;

use error::AppResult;

fn main() -> AppResult<()> {
    entry::run()
}

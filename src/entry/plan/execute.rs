use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::engine::{LoadTester, RunTally, format_rate};
use crate::error::AppResult;
use crate::shutdown::{setup_signal_shutdown_handler, shutdown_channel};

use super::types::RunPlan;

pub(crate) async fn execute_plan(plan: RunPlan) -> AppResult<()> {
    let RunPlan {
        options,
        settings,
        transport,
        use_color,
        ..
    } = plan;

    let (shutdown_tx, _) = shutdown_channel();

    let mut handle = LoadTester::new(options, settings, Arc::new(transport))
        .with_shutdown(shutdown_tx.clone())
        .with_progress_output(Box::new(std::io::stdout()), use_color)
        .start();
    let signal_handle = setup_signal_shutdown_handler(&shutdown_tx);

    let mut tally = RunTally::default();
    while let Some(result) = handle.next_result().await {
        if let Some(err) = result.error() {
            debug!("Request {} failed after {:?}: {}", result.index, result.elapsed, err);
        }
        tally.record(&result);
    }
    let summary = handle.finish().await?;

    signal_handle.abort();

    info!(
        total = tally.total,
        responses = tally.responses,
        non_success_status = tally.non_success_status,
        failures = tally.failures,
        timeouts = tally.timeouts,
        cancelled = tally.cancelled,
        elapsed = ?summary.elapsed,
        rps = %format_rate(tally.total, summary.elapsed),
        "Run finished"
    );
    if tally.cancelled > 0 {
        warn!("Run interrupted: {} of {} requests were cancelled", tally.cancelled, tally.total);
    }
    Ok(())
}

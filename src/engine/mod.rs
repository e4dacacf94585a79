//! Fixed-count run engine.
//!
//! A run dispatches exactly `requests` copies of one request template to a
//! pool of `concurrency` workers. Every job produces one [`RequestResult`] on
//! the result stream, which closes once all of them have been emitted.
mod progress;
mod result;
mod tally;
mod worker;


use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::args::{PositiveU64, PositiveUsize};
use crate::error::{AppResult, ValidationError};
use crate::http::{RequestOptions, Transport};
use crate::shutdown::{ShutdownReceiver, ShutdownSender};
use worker::{Job, WorkerChannels, run_worker};

pub use progress::{ProgressSummary, ProgressTally, format_rate};
pub use result::{Outcome, RequestResult, ResponseRecord};
pub use tally::RunTally;

/// Upper bound on jobs buffered ahead of the workers.
const JOB_QUEUE_CAPACITY_MAX: usize = 65_536;

/// Request count and worker count of a run. Concurrency never exceeds the
/// request count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSettings {
    requests: PositiveU64,
    concurrency: PositiveUsize,
}

impl RunSettings {
    /// # Errors
    ///
    /// Returns `ConcurrencyExceedsRequests` when `concurrency > requests`.
    pub fn new(requests: PositiveU64, concurrency: PositiveUsize) -> Result<Self, ValidationError> {
        let fits = u64::try_from(concurrency.get()).is_ok_and(|workers| workers <= requests.get());
        if !fits {
            return Err(ValidationError::ConcurrencyExceedsRequests {
                requests: requests.get(),
                concurrency: concurrency.get(),
            });
        }
        Ok(Self {
            requests,
            concurrency,
        })
    }

    #[must_use]
    pub const fn requests(&self) -> u64 {
        self.requests.get()
    }

    #[must_use]
    pub const fn concurrency(&self) -> usize {
        self.concurrency.get()
    }
}

/// Everything a run needs, frozen before it starts.
///
/// [`LoadTester::start`] and [`LoadTester::run`] consume the tester, so each
/// instance runs at most once.
pub struct LoadTester<T: Transport + ?Sized> {
    options: Arc<RequestOptions>,
    settings: RunSettings,
    transport: Arc<T>,
    shutdown: Option<ShutdownSender>,
    progress_out: Box<dyn Write + Send>,
    use_color: bool,
}

/// Timing of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub elapsed: Duration,
    pub progress: ProgressSummary,
}

/// A run whose results have been collected in completion order.
#[derive(Debug)]
pub struct RunReport {
    pub results: Vec<RequestResult>,
    pub summary: RunSummary,
}

impl RunReport {
    #[must_use]
    pub fn tally(&self) -> RunTally {
        RunTally::from_results(&self.results)
    }
}

/// A started run. Results can be consumed while workers are still busy.
pub struct RunHandle {
    results: mpsc::UnboundedReceiver<RequestResult>,
    dispatcher: JoinHandle<AppResult<RunSummary>>,
}

impl RunHandle {
    /// Next result in completion order, `None` once all of them were emitted.
    pub async fn next_result(&mut self) -> Option<RequestResult> {
        self.results.recv().await
    }

    /// Waits for the dispatcher. Results not yet consumed are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error when a worker or the progress reporter panicked.
    pub async fn finish(self) -> AppResult<RunSummary> {
        drop(self.results);
        self.dispatcher.await?
    }

    /// Drains the whole result stream, then waits for the dispatcher.
    ///
    /// # Errors
    ///
    /// Returns an error when a worker or the progress reporter panicked.
    pub async fn collect(mut self) -> AppResult<RunReport> {
        let mut results = Vec::new();
        while let Some(result) = self.results.recv().await {
            results.push(result);
        }
        let summary = self.dispatcher.await??;
        Ok(RunReport { results, summary })
    }
}

impl<T> LoadTester<T>
where
    T: Transport + ?Sized + 'static,
{
    /// Progress lines go to stdout without color until configured otherwise.
    #[must_use]
    pub fn new(options: RequestOptions, settings: RunSettings, transport: Arc<T>) -> Self {
        Self {
            options: Arc::new(options),
            settings,
            transport,
            shutdown: None,
            progress_out: Box::new(std::io::stdout()),
            use_color: false,
        }
    }

    /// Workers stop executing once anything is broadcast on `shutdown`.
    #[must_use]
    pub fn with_shutdown(mut self, shutdown: ShutdownSender) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    #[must_use]
    pub fn with_progress_output(mut self, out: Box<dyn Write + Send>, use_color: bool) -> Self {
        self.progress_out = out;
        self.use_color = use_color;
        self
    }

    #[must_use]
    pub const fn settings(&self) -> RunSettings {
        self.settings
    }

    /// Spawns the dispatcher and returns at once. The run's start time is
    /// taken here. Must be called from within a tokio runtime.
    ///
    /// Workers are subscribed to the shutdown channel before this returns, so
    /// a shutdown sent right after `start` is never missed.
    #[must_use]
    pub fn start(self) -> RunHandle {
        let started = Instant::now();
        let shutdown_receivers: Vec<ShutdownReceiver> = match self.shutdown.as_ref() {
            Some(shutdown) => (0..self.settings.concurrency())
                .map(|_| shutdown.subscribe())
                .collect(),
            None => Vec::new(),
        };
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        let dispatcher = tokio::spawn(dispatch(self, shutdown_receivers, results_tx, started));
        RunHandle {
            results: results_rx,
            dispatcher,
        }
    }

    /// Runs to completion and collects every result.
    ///
    /// # Errors
    ///
    /// Returns an error when a worker or the progress reporter panicked.
    /// Request failures are carried in the results instead.
    pub async fn run(self) -> AppResult<RunReport> {
        self.start().collect().await
    }
}

async fn dispatch<T>(
    tester: LoadTester<T>,
    shutdown_receivers: Vec<ShutdownReceiver>,
    results_tx: mpsc::UnboundedSender<RequestResult>,
    started: Instant,
) -> AppResult<RunSummary>
where
    T: Transport + ?Sized + 'static,
{
    let LoadTester {
        options,
        settings,
        transport,
        progress_out,
        use_color,
        ..
    } = tester;
    let total = settings.requests();
    let concurrency = settings.concurrency();
    info!(
        "Starting run: {} {} ({} requests, {} workers)",
        options.method().as_str(),
        options.url(),
        total,
        concurrency
    );

    let capacity = usize::try_from(total)
        .unwrap_or(JOB_QUEUE_CAPACITY_MAX)
        .min(JOB_QUEUE_CAPACITY_MAX);
    let (job_tx, job_rx) = flume::bounded::<Job>(capacity);
    let (completion_tx, completion_rx) = mpsc::unbounded_channel::<()>();

    let reporter =
        progress::ProgressReporter::new(total, started, use_color, progress_out).spawn(completion_rx);

    let mut shutdown_receivers = shutdown_receivers.into_iter();
    let mut workers = Vec::with_capacity(concurrency);
    for worker_id in 0..concurrency {
        let channels = WorkerChannels {
            jobs: job_rx.clone(),
            results: results_tx.clone(),
            completions: completion_tx.clone(),
            shutdown: shutdown_receivers.next(),
        };
        workers.push(tokio::spawn(run_worker(
            worker_id,
            Arc::clone(&transport),
            channels,
        )));
    }
    drop(job_rx);
    drop(results_tx);
    drop(completion_tx);

    for index in 0..total {
        let job = Job {
            index,
            request: options.build(),
        };
        if job_tx.send_async(job).await.is_err() {
            debug!("Job queue closed after {} jobs", index);
            break;
        }
    }
    drop(job_tx);

    let mut join_error = None;
    for worker in workers {
        if let Err(err) = worker.await {
            join_error.get_or_insert(err);
        }
    }
    let progress = reporter.await?;
    if let Some(err) = join_error {
        return Err(err.into());
    }

    let elapsed = started.elapsed();
    debug!(
        "Run finished: {} completions, {} progress lines",
        progress.completed, progress.lines_printed
    );
    Ok(RunSummary { elapsed, progress })
}

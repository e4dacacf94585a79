use std::sync::Arc;

use futures_util::StreamExt;
use reqwest::{Request, Response};
use tokio::sync::{broadcast, mpsc};
use tokio::time::Instant;
use tracing::debug;

use super::result::{Outcome, RequestResult, ResponseRecord};
use crate::error::HttpError;
use crate::http::Transport;
use crate::shutdown::ShutdownReceiver;

/// One unit of work. A request that failed to build is still a job so that
/// its failure is reported like any other.
pub(crate) struct Job {
    pub(crate) index: u64,
    pub(crate) request: Result<Request, HttpError>,
}

pub(crate) struct WorkerChannels {
    pub(crate) jobs: flume::Receiver<Job>,
    pub(crate) results: mpsc::UnboundedSender<RequestResult>,
    pub(crate) completions: mpsc::UnboundedSender<()>,
    pub(crate) shutdown: Option<ShutdownReceiver>,
}

/// Pulls jobs until the queue is closed and empty.
///
/// After a shutdown is observed the remaining jobs are still taken off the
/// queue and reported as cancelled, so every dispatched job yields a result.
pub(crate) async fn run_worker<T>(worker_id: usize, transport: Arc<T>, channels: WorkerChannels)
where
    T: Transport + ?Sized,
{
    let WorkerChannels {
        jobs,
        results,
        completions,
        mut shutdown,
    } = channels;
    let mut stopping = false;
    let mut executed: u64 = 0;

    while let Ok(job) = jobs.recv_async().await {
        if !stopping {
            stopping = shutdown_observed(shutdown.as_mut());
        }
        let started = Instant::now();
        let outcome = if stopping {
            Outcome::Cancelled
        } else {
            match job.request {
                Ok(request) => {
                    tokio::select! {
                        outcome = execute(transport.as_ref(), request) => outcome,
                        () = wait_for_shutdown(shutdown.as_mut()) => {
                            stopping = true;
                            Outcome::Cancelled
                        }
                    }
                }
                Err(err) => Outcome::Failed(err),
            }
        };
        executed = executed.saturating_add(1);
        let result = RequestResult {
            index: job.index,
            outcome,
            elapsed: started.elapsed(),
        };
        if results.send(result).is_err() {
            debug!("Worker {} result receiver dropped", worker_id);
        }
        if completions.send(()).is_err() {
            debug!("Worker {} completion receiver dropped", worker_id);
        }
    }

    debug!("Worker {} finished after {} jobs", worker_id, executed);
}

async fn execute<T>(transport: &T, request: Request) -> Outcome
where
    T: Transport + ?Sized,
{
    match transport.send(request).await {
        Ok(response) => match drain_response(response).await {
            Ok(record) => Outcome::Response(record),
            Err(err) => Outcome::Failed(err),
        },
        Err(err) => Outcome::Failed(err),
    }
}

/// Reads the body to the end so the connection can go back to the pool.
async fn drain_response(response: Response) -> Result<ResponseRecord, HttpError> {
    let status = response.status();
    let version = response.version();
    let headers = response.headers().clone();
    let mut body_bytes: u64 = 0;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(HttpError::read_body)?;
        let len = u64::try_from(chunk.len()).unwrap_or(u64::MAX);
        body_bytes = body_bytes.saturating_add(len);
    }
    Ok(ResponseRecord {
        status,
        version,
        headers,
        body_bytes,
    })
}

fn shutdown_observed(shutdown: Option<&mut ShutdownReceiver>) -> bool {
    let Some(receiver) = shutdown else {
        return false;
    };
    match receiver.try_recv() {
        Ok(()) | Err(broadcast::error::TryRecvError::Lagged(_)) => true,
        Err(broadcast::error::TryRecvError::Empty | broadcast::error::TryRecvError::Closed) => {
            false
        }
    }
}

/// Resolves once a shutdown is broadcast. Never resolves without a receiver
/// or after the sender side is gone.
async fn wait_for_shutdown(shutdown: Option<&mut ShutdownReceiver>) {
    if let Some(receiver) = shutdown {
        match receiver.recv().await {
            Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => return,
            Err(broadcast::error::RecvError::Closed) => {}
        }
    }
    std::future::pending::<()>().await;
}

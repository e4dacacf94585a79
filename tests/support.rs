use std::ffi::OsStr;
use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::process::{Command, Output};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::Duration;

const HEADER_END: &[u8] = b"\r\n\r\n";
const READ_TIMEOUT: Duration = Duration::from_secs(2);

/// Requests seen by the test server, in arrival order.
#[derive(Clone, Default)]
pub struct Captured {
    hits: Arc<AtomicU64>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl Captured {
    #[must_use]
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::SeqCst)
    }

    /// Raw request text (head and body), lossily decoded.
    ///
    /// # Errors
    ///
    /// Returns an error if the capture lock is poisoned.
    pub fn requests(&self) -> Result<Vec<String>, String> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .map_err(|err| format!("capture lock poisoned: {}", err))
    }

    fn record(&self, raw: &[u8]) {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(String::from_utf8_lossy(raw).into_owned());
        }
        self.hits.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct ServerHandle {
    shutdown: mpsc::Sender<()>,
    thread: Option<thread::JoinHandle<()>>,
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        let _send_result = self.shutdown.send(());
        if let Some(handle) = self.thread.take() {
            drop(handle.join());
        }
    }
}

/// Spawn a lightweight HTTP server that answers every request with 200.
///
/// # Errors
///
/// Returns an error if the listener cannot be created or configured.
pub fn spawn_http_server() -> Result<(String, Captured, ServerHandle), String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("bind test server failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("server addr failed: {}", err))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("set_nonblocking failed: {}", err))?;

    let (shutdown_tx, shutdown_rx) = mpsc::channel();
    let captured = Captured::default();
    let server_capture = captured.clone();

    let handle = thread::spawn(move || {
        loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }

            match listener.accept() {
                Ok((stream, _)) => {
                    let capture = server_capture.clone();
                    thread::spawn(move || handle_client(stream, &capture));
                }
                Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(5));
                }
                Err(_) => break,
            }
        }
    });

    Ok((
        format!("http://{}/load", addr),
        captured,
        ServerHandle {
            shutdown: shutdown_tx,
            thread: Some(handle),
        },
    ))
}

/// Like [`spawn_http_server`], but skips in sandboxes that forbid sockets.
///
/// # Errors
///
/// Returns an error if the server fails for any other reason.
pub fn spawn_http_server_or_skip() -> Result<Option<(String, Captured, ServerHandle)>, String> {
    match spawn_http_server() {
        Ok(result) => Ok(Some(result)),
        Err(err) if err.contains("Operation not permitted") => {
            eprintln!("Skipping e2e test: {}", err);
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

fn handle_client(mut stream: TcpStream, captured: &Captured) {
    if stream.set_nonblocking(false).is_err() || stream.set_read_timeout(Some(READ_TIMEOUT)).is_err() {
        return;
    }
    let Some(raw) = read_request(&mut stream) else {
        return;
    };
    captured.record(&raw);
    if stream
        .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nOK")
        .is_err()
    {
        return;
    }
    if stream.flush().is_err() {
        return;
    }
    drop(stream.shutdown(Shutdown::Both));
}

/// Reads one request: the head, then `Content-Length` bytes of body.
fn read_request(stream: &mut TcpStream) -> Option<Vec<u8>> {
    let mut raw = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        if let Some(head_len) = find_header_end(&raw) {
            let body_len = content_length(raw.get(..head_len)?);
            if raw.len() >= head_len.saturating_add(body_len) {
                return Some(raw);
            }
        }
        let read = stream.read(&mut chunk).ok()?;
        if read == 0 {
            return if raw.is_empty() { None } else { Some(raw) };
        }
        raw.extend_from_slice(chunk.get(..read)?);
    }
}

fn find_header_end(raw: &[u8]) -> Option<usize> {
    raw.windows(HEADER_END.len())
        .position(|window| window == HEADER_END)
        .map(|pos| pos.saturating_add(HEADER_END.len()))
}

fn content_length(head: &[u8]) -> usize {
    String::from_utf8_lossy(head)
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse().ok())
        .unwrap_or(0)
}

/// Run the `fireload` binary and capture output.
///
/// # Errors
///
/// Returns an error if the binary cannot be executed.
pub fn run_fireload<I, S>(args: I) -> Result<Output, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = fireload_bin()?;
    let dir = tempfile::tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    Command::new(bin)
        .args(args)
        .current_dir(dir.path())
        .env("RUST_LOG", "error")
        .env_remove("FIRELOAD_LOG")
        .env_remove("FIRELOAD_REQUESTS")
        .env_remove("FIRELOAD_CONCURRENCY")
        .env_remove("FIRELOAD_TIMEOUT_MS")
        .env_remove("FIRELOAD_PROXY")
        .output()
        .map_err(|err| format!("run fireload failed: {}", err))
}

fn fireload_bin() -> Result<String, String> {
    option_env!("CARGO_BIN_EXE_fireload").map_or_else(
        || Err("CARGO_BIN_EXE_fireload missing at compile time.".to_owned()),
        |path| Ok(path.to_owned()),
    )
}

/// Counts reported in `Completed: N  Requests Per Second: R` lines.
#[must_use]
pub fn progress_counts(stdout: &[u8]) -> Vec<u64> {
    String::from_utf8_lossy(stdout)
        .lines()
        .filter_map(|line| line.strip_prefix("Completed: "))
        .filter_map(|rest| rest.split_whitespace().next())
        .filter_map(|count| count.parse().ok())
        .collect()
}

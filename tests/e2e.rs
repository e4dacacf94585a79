mod support;

use std::fs;
use std::process::Output;

use tempfile::tempdir;

use support::{progress_counts, run_fireload, spawn_http_server_or_skip};

fn describe(output: &Output) -> String {
    format!(
        "status: {}\nstdout: {}\nstderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

#[test]
fn e2e_hundred_requests_twenty_workers() -> Result<(), String> {
    let Some((url, captured, _server)) = spawn_http_server_or_skip()? else {
        return Ok(());
    };

    let output = run_fireload(["-n", "100", "-c", "20", "--no-color", url.as_str()])?;
    if !output.status.success() {
        return Err(describe(&output));
    }
    if captured.hits() != 100 {
        return Err(format!("Expected 100 hits, got {}", captured.hits()));
    }
    let counts = progress_counts(&output.stdout);
    if counts != [10, 20, 30, 40, 50, 60, 70, 80, 90, 100] {
        return Err(format!("Unexpected progress lines: {:?}", counts));
    }
    Ok(())
}

#[test]
fn e2e_small_run_reports_every_completion() -> Result<(), String> {
    let Some((url, captured, _server)) = spawn_http_server_or_skip()? else {
        return Ok(());
    };

    let output = run_fireload(["-n", "5", "-c", "5", "--no-color", url.as_str()])?;
    if !output.status.success() {
        return Err(describe(&output));
    }
    if captured.hits() != 5 {
        return Err(format!("Expected 5 hits, got {}", captured.hits()));
    }
    if progress_counts(&output.stdout) != [1, 2, 3, 4, 5] {
        return Err(describe(&output));
    }
    Ok(())
}

#[test]
fn e2e_post_body_from_file_with_headers() -> Result<(), String> {
    let Some((url, captured, _server)) = spawn_http_server_or_skip()? else {
        return Ok(());
    };
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let body_path = dir.path().join("body.json");
    fs::write(&body_path, "{\"a\":1}").map_err(|err| format!("write body failed: {}", err))?;
    let body_arg = format!("@{}", body_path.display());

    let output = run_fireload([
        "-m",
        "POST",
        "-b",
        body_arg.as_str(),
        "-h",
        "X-Test: yes; X-Other: 2",
        "-u",
        "alice",
        "-p",
        "secret",
        "-n",
        "2",
        "-c",
        "1",
        "--no-color",
        url.as_str(),
    ])?;
    if !output.status.success() {
        return Err(describe(&output));
    }

    let requests = captured.requests()?;
    if requests.len() != 2 {
        return Err(format!("Expected 2 requests, got {}", requests.len()));
    }
    for request in &requests {
        let lowered = request.to_ascii_lowercase();
        if !request.starts_with("POST /load ") {
            return Err(format!("Unexpected request line: {}", request));
        }
        if !request.ends_with("{\"a\":1}") {
            return Err(format!("Unexpected body: {}", request));
        }
        for expected in [
            "content-type: application/json",
            "x-test: yes",
            "x-other: 2",
            "authorization: basic ywxpy2u6c2vjcmv0",
        ] {
            if !lowered.contains(expected) {
                return Err(format!("Missing '{}' in request: {}", expected, request));
            }
        }
    }
    Ok(())
}

#[test]
fn e2e_concurrency_above_requests_fails_before_sending() -> Result<(), String> {
    let Some((url, captured, _server)) = spawn_http_server_or_skip()? else {
        return Ok(());
    };

    let output = run_fireload(["-n", "10", "-c", "30", url.as_str()])?;
    if output.status.success() {
        return Err(format!("Expected failure\n{}", describe(&output)));
    }
    if captured.hits() != 0 {
        return Err(format!("Expected no hits, got {}", captured.hits()));
    }
    Ok(())
}

#[test]
fn e2e_unreachable_target_still_accounts_every_request() -> Result<(), String> {
    let output = run_fireload(["-n", "3", "-c", "1", "--no-color", "http://127.0.0.1:1/"])?;
    if !output.status.success() {
        return Err(describe(&output));
    }
    if progress_counts(&output.stdout) != [1, 2, 3] {
        return Err(describe(&output));
    }
    Ok(())
}

#[test]
fn e2e_missing_url_is_a_usage_error() -> Result<(), String> {
    let output = run_fireload(["-n", "5"])?;
    if output.status.success() {
        return Err(format!("Expected failure\n{}", describe(&output)));
    }
    Ok(())
}

//! Week 14: check a list of web services and compare execution modes.
//!
//! The same ping task runs three ways: sequentially, one thread per host,
//! and one child process per host. No worker shares state with another and
//! a failing host is only logged; the point is the elapsed-time comparison.

use std::error::Error;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, error, info};

use deskwork::logging;
use deskwork::prompt;

const TARGET_HOSTS: [&str; 6] = [
    "google.com",
    "github.com",
    "yahoo.co.jp",
    "amazon.co.jp",
    "bing.com",
    "python.org",
];
const PING_COUNT: &str = "3";

/// One ping task. Returns whether the host answered.
fn check_host(host: &str) -> Result<bool, std::io::Error> {
    debug_assert!(!host.is_empty(), "host must not be empty");

    debug!("pinging {host}");
    let status = Command::new("ping")
        .args(["-c", PING_COUNT, host])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()?;

    info!("{host}: {}", if status.success() { "OK" } else { "NG" });
    Ok(status.success())
}

/// Mode 1: hosts one after another.
fn run_sequential(hosts: &[&str]) -> Duration {
    let start = Instant::now();
    for host in hosts {
        if let Err(e) = check_host(host) {
            error!("{host}: ping failed to start: {e}");
        }
    }
    let elapsed = start.elapsed();
    info!("sequential mode took {elapsed:.2?}");
    elapsed
}

/// Mode 2: one thread per host, join them all.
fn run_threaded(hosts: &[&str]) -> Duration {
    let start = Instant::now();

    let workers: Vec<thread::JoinHandle<()>> = hosts
        .iter()
        .map(|host| {
            let host = host.to_string();
            thread::spawn(move || {
                if let Err(e) = check_host(&host) {
                    error!("{host}: ping failed to start: {e}");
                }
            })
        })
        .collect();

    for worker in workers {
        // a panicked worker is a failed ping, nothing to recover
        let _ = worker.join();
    }

    let elapsed = start.elapsed();
    info!("threaded mode took {elapsed:.2?}");
    elapsed
}

/// Mode 3: one child process per host, wait on them all.
fn run_processes(hosts: &[&str]) -> Duration {
    let start = Instant::now();

    let mut children: Vec<(&str, Child)> = Vec::new();
    for host in hosts {
        match Command::new("ping")
            .args(["-c", PING_COUNT, host])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => children.push((host, child)),
            Err(e) => error!("{host}: ping failed to start: {e}"),
        }
    }

    for (host, mut child) in children {
        match child.wait() {
            Ok(status) => info!("{host}: {}", if status.success() { "OK" } else { "NG" }),
            Err(e) => error!("{host}: wait failed: {e}"),
        }
    }

    let elapsed = start.elapsed();
    info!("process mode took {elapsed:.2?}");
    elapsed
}

fn main() -> Result<(), Box<dyn Error>> {
    logging::setup();
    info!("monitoring {} web services", TARGET_HOSTS.len());

    let mode = prompt::input_menu_stdin(
        "Pick an execution mode:",
        &["Sequential", "Threading", "Multiprocessing"],
    )?;

    let elapsed = match mode.as_str() {
        "Sequential" => run_sequential(&TARGET_HOSTS),
        "Threading" => run_threaded(&TARGET_HOSTS),
        "Multiprocessing" => run_processes(&TARGET_HOSTS),
        other => unreachable!("menu returned unknown mode {other:?}"),
    };

    println!("{mode} mode finished in {elapsed:.2?}");
    Ok(())
}

//! yt-dlp backed track lister
//!
//! Runs `yt-dlp --flat-playlist --print title --ignore-errors <url>` and
//! reads one title per output line. The call is bounded by a wall-clock
//! timeout and an output size cap; either limit kills the child.

use super::traits::TrackLister;
use crate::error::FetchError;
use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

/// Maximum time a single playlist fetch may take
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Maximum stdout size accepted from one fetch (10 MiB)
pub const DEFAULT_MAX_OUTPUT: usize = 10 * 1024 * 1024;

/// Stderr kept for error messages
const STDERR_TAIL: usize = 4096;

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Track lister that invokes yt-dlp
#[derive(Debug, Clone)]
pub struct YtDlpLister {
    /// Program to run (name on PATH or a path)
    program: String,
    /// Wall-clock limit per call
    timeout: Duration,
    /// Stdout size limit per call
    max_output: usize,
}

impl YtDlpLister {
    pub fn new() -> Self {
        Self {
            program: "yt-dlp".to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_output: DEFAULT_MAX_OUTPUT,
        }
    }

    /// Use a different executable
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Set the per-call timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the stdout size limit
    pub fn with_max_output(mut self, bytes: usize) -> Self {
        self.max_output = bytes;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn run(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        if which::which(&self.program).is_err() {
            return Err(FetchError::ToolNotFound(self.program.clone()));
        }

        let deadline = Instant::now() + self.timeout;

        let mut command = Command::new(&self.program);
        command
            .args(["--flat-playlist", "--print", "title", "--ignore-errors"])
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // Own process group, so a kill also reaches helpers the tool started
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let mut child = command
            .spawn()
            .map_err(|source| FetchError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // Pipes are drained on helper threads so the deadline can be enforced here
        let limit = self.max_output;
        let (out_tx, out_rx) = mpsc::channel();
        thread::spawn(move || {
            let result = match stdout {
                Some(pipe) => read_capped(pipe, limit + 1, false),
                None => Ok(Vec::new()),
            };
            let _ = out_tx.send(result);
        });

        let (err_tx, err_rx) = mpsc::channel();
        thread::spawn(move || {
            let text = match stderr {
                Some(pipe) => read_capped(pipe, STDERR_TAIL, true)
                    .map(|bytes| String::from_utf8_lossy(&bytes).trim().to_string())
                    .unwrap_or_default(),
                None => String::new(),
            };
            let _ = err_tx.send(text);
        });

        let output = match out_rx.recv_timeout(remaining(deadline)) {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                kill(&mut child);
                return Err(FetchError::Io(e));
            }
            Err(_) => {
                kill(&mut child);
                return Err(FetchError::Timeout(self.timeout));
            }
        };

        if output.len() > limit {
            kill(&mut child);
            return Err(FetchError::OutputTooLarge(limit));
        }

        let status = match wait_until(&mut child, deadline)? {
            Some(status) => status,
            None => {
                kill(&mut child);
                return Err(FetchError::Timeout(self.timeout));
            }
        };

        if !status.success() {
            let stderr = err_rx
                .recv_timeout(remaining(deadline))
                .unwrap_or_default();
            return Err(FetchError::ExitStatus { status, stderr });
        }

        Ok(output)
    }
}

impl Default for YtDlpLister {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackLister for YtDlpLister {
    fn list_tracks(&self, playlist_id: &str) -> Result<Vec<String>, FetchError> {
        log::info!("  Fetching playlist: {}", playlist_id);

        let output = self.run(&playlist_url(playlist_id))?;
        let titles = parse_titles(&String::from_utf8_lossy(&output));

        log::info!("  Found {} tracks", titles.len());
        Ok(titles)
    }
}

/// Public playlist URL for a list id
pub fn playlist_url(playlist_id: &str) -> String {
    format!(
        "https://www.youtube.com/playlist?list={}",
        urlencoding::encode(playlist_id)
    )
}

/// One title per line; surrounding whitespace trimmed, blank lines dropped
pub fn parse_titles(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read up to `limit` bytes; with `drain`, discard the rest so the writer never blocks
fn read_capped<R: Read>(mut pipe: R, limit: usize, drain: bool) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    (&mut pipe).take(limit as u64).read_to_end(&mut buf)?;
    if drain && buf.len() >= limit {
        io::copy(&mut pipe, &mut io::sink())?;
    }
    Ok(buf)
}

fn remaining(deadline: Instant) -> Duration {
    deadline.saturating_duration_since(Instant::now())
}

/// Poll for exit until the deadline; `None` if still running
fn wait_until(child: &mut Child, deadline: Instant) -> Result<Option<ExitStatus>, FetchError> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL.min(remaining(deadline)));
    }
}

fn kill(child: &mut Child) {
    #[cfg(unix)]
    kill_group(child.id());

    if let Err(e) = child.kill() {
        log::debug!("Failed to kill child process: {}", e);
    }
    let _ = child.wait();
}

/// SIGKILL the whole process group led by `pgid`
#[cfg(unix)]
fn kill_group(pgid: u32) {
    let result = Command::new("kill")
        .args(["-9", "--", &format!("-{}", pgid)])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
    match result {
        Ok(status) if status.success() => {}
        Ok(status) => log::debug!("kill of process group {} exited with {}", pgid, status),
        Err(e) => log::debug!("Failed to run kill for process group {}: {}", pgid, e),
    }
}

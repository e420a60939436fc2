//! Background producers feeding the log viewer's shared buffer.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::core::logview::SharedLogBuffer;
use crate::domain::error::{XtuiError, XtuiResult};

pub const TREE_REFRESH: Duration = Duration::from_secs(3);

/// Both producer tasks; aborted together when dropped.
pub struct LogSources {
    stream: JoinHandle<()>,
    tree: Option<JoinHandle<()>>,
}

impl LogSources {
    pub fn start(command: &[String], tree_dir: Option<PathBuf>, buffer: &SharedLogBuffer) -> XtuiResult<Self> {
        let stream = spawn_command_stream(command, buffer.clone())?;
        let tree = tree_dir.map(|dir| spawn_tree_refresh(dir, TREE_REFRESH, buffer.clone()));
        Ok(Self { stream, tree })
    }
}

impl Drop for LogSources {
    fn drop(&mut self) {
        self.stream.abort();
        if let Some(tree) = &self.tree {
            tree.abort();
        }
    }
}

/// Spawn `command` and push each stdout line into `buffer` until it exits.
pub fn spawn_command_stream(command: &[String], buffer: SharedLogBuffer) -> XtuiResult<JoinHandle<()>> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| XtuiError::InvalidInput("no log command given".to_string()))?;
    let command_line = command.join(" ");

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| XtuiError::subprocess(&command_line, e))?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| XtuiError::subprocess(&command_line, "stdout was not captured"))?;
    info!(command = %command_line, "Streaming log command");

    Ok(tokio::spawn(async move {
        pump_lines(stdout, &buffer).await;
        match child.wait().await {
            Ok(status) => {
                debug!(%status, "Log command exited");
                buffer.lock().push(format!("[{} exited with {}]", command_line, status));
            }
            Err(e) => warn!(error = %e, "Failed to reap log command"),
        }
    }))
}

/// Push every line of `reader` into `buffer`; returns how many lines were read.
pub async fn pump_lines<R: AsyncRead + Unpin>(reader: R, buffer: &SharedLogBuffer) -> usize {
    let mut lines = BufReader::new(reader).lines();
    let mut count = 0;
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                buffer.lock().push(line);
                count += 1;
            }
            Ok(None) => break,
            Err(e) => {
                error!(error = %e, "Failed to read log stream");
                break;
            }
        }
    }
    count
}

/// Re-render the directory tree into `buffer` every `period`.
pub fn spawn_tree_refresh(dir: PathBuf, period: Duration, buffer: SharedLogBuffer) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let tree = match tree_snapshot(&dir).await {
                Ok(tree) => tree,
                Err(e) => {
                    debug!(error = %e, "Tree view unavailable");
                    format!("{} (tree unavailable: {})", dir.display(), e)
                }
            };
            buffer.lock().set_tree(tree);
        }
    })
}

/// `tree -s --du -h -P *.log <dir>`
pub async fn tree_snapshot(dir: &Path) -> XtuiResult<String> {
    let output = Command::new("tree")
        .args(["-s", "--du", "-h", "-P", "*.log"])
        .arg(dir)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| XtuiError::subprocess("tree", e))?;
    if !output.status.success() {
        return Err(XtuiError::subprocess("tree", format!("exited with {}", output.status)));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
}

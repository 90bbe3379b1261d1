// src/engine/emacs.rs

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::EngineSection;
use crate::engine::{LiterateEngine, wire};
use crate::errors::RunError;
use crate::report::Reporter;
use crate::resolve::TangleTarget;

/// Subprocess adapter for Emacs in batch mode.
///
/// Every operation is `emacs --batch --quick`, optionally preceded by the
/// configured `--load` files, followed by the operation itself. Emacs keeps
/// its own chatter on stderr, which we forward to the log and keep around
/// for error messages; only dry-run records travel on stdout.
pub struct EmacsEngine {
    program: String,
    load: Vec<String>,
}

impl EmacsEngine {
    pub fn from_config(cfg: &EngineSection) -> Self {
        Self {
            program: cfg.program.clone(),
            load: cfg.load.clone(),
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("--batch").arg("--quick");
        for file in &self.load {
            cmd.arg("--load").arg(file);
        }
        cmd.stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

impl LiterateEngine for EmacsEngine {
    /// Dry run: compute every tangle destination without writing anything.
    ///
    /// The eval reuses org-babel's own block collection, so the engine's
    /// `:tangle` name derivation (explicit paths, yes/no sentinels, the
    /// auto-derived name with appended extension) is reproduced exactly.
    async fn list_targets(
        &self,
        source: &Path,
        log: &Reporter,
    ) -> Result<Vec<TangleTarget>, RunError> {
        info!(source = %source.display(), "listing tangle targets");

        let mut child = self
            .command()
            .arg("--eval")
            .arg(list_targets_eval(source))
            .spawn()?;

        let stderr_task = forward_stderr(child.stderr.take(), log);

        let mut targets = Vec::new();
        if let Some(stdout) = child.stdout.take() {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                match wire::parse_target_line(&line) {
                    Some(target) => {
                        debug!(
                            source = %target.source.display(),
                            dest = %target.dest.display(),
                            "discovered tangle target"
                        );
                        targets.push(target);
                    }
                    None => warn!(line = %line, "ignoring malformed target record"),
                }
            }
        }

        let status = child.wait().await?;
        let diagnostics = stderr_task.await.unwrap_or_default();

        if !status.success() {
            return Err(RunError::Discovery {
                file: source.to_path_buf(),
                detail: error_detail(&diagnostics, status.code()),
            });
        }

        info!(count = targets.len(), "target discovery complete");
        Ok(targets)
    }

    async fn tangle(&self, source: &Path, log: &Reporter) -> Result<(), RunError> {
        info!(source = %source.display(), "tangling");

        let mut child = self
            .command()
            .arg("--eval")
            .arg(tangle_eval(source))
            .spawn()?;

        let stderr_task = forward_stderr(child.stderr.take(), log);
        drain_stdout(child.stdout.take(), log).await;

        let status = child.wait().await?;
        let diagnostics = stderr_task.await.unwrap_or_default();

        if !status.success() {
            warn!(
                source = %source.display(),
                exit_code = status.code(),
                "tangle process failed: {diagnostics}"
            );
            return Err(RunError::Tangle(source.to_path_buf()));
        }

        Ok(())
    }

    async fn compile(&self, files: &[PathBuf], log: &Reporter) -> Result<(), RunError> {
        info!(count = files.len(), "byte-compiling");

        let mut cmd = self.command();
        cmd.arg("-f").arg("batch-byte-compile");
        for file in files {
            cmd.arg(file);
        }

        let mut child = cmd.spawn()?;
        let stderr_task = forward_stderr(child.stderr.take(), log);
        drain_stdout(child.stdout.take(), log).await;

        let status = child.wait().await?;
        let diagnostics = stderr_task.await.unwrap_or_default();

        if !status.success() {
            return Err(RunError::Compile(error_detail(
                &diagnostics,
                status.code(),
            )));
        }

        Ok(())
    }
}

/// Forward a child's stderr to the log line-by-line, collecting the lines
/// for error reporting. Always consumed so pipe buffers never fill.
fn forward_stderr(
    stderr: Option<impl AsyncRead + Unpin + Send + 'static>,
    log: &Reporter,
) -> tokio::task::JoinHandle<String> {
    let log = log.clone();
    tokio::spawn(async move {
        let mut collected = String::new();
        if let Some(stderr) = stderr {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                log.detail(&line).await;
                collected.push_str(&line);
                collected.push('\n');
            }
        }
        collected
    })
}

/// Forward a child's stdout to the log line-by-line.
async fn drain_stdout(stdout: Option<impl AsyncRead + Unpin>, log: &Reporter) {
    if let Some(stdout) = stdout {
        let mut lines = BufReader::new(stdout).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            log.detail(&line).await;
        }
    }
}

/// Last few diagnostic lines, or the exit code when the engine said nothing.
fn error_detail(diagnostics: &str, code: Option<i32>) -> String {
    let tail: Vec<&str> = diagnostics.lines().rev().take(5).collect();
    if tail.is_empty() {
        format!("engine exited with code {}", code.unwrap_or(-1))
    } else {
        tail.into_iter().rev().collect::<Vec<_>>().join("\n")
    }
}

fn list_targets_eval(source: &Path) -> String {
    let src = elisp_string(source);
    format!(
        "(progn \
           (require 'ob-tangle) \
           (with-current-buffer (find-file-noselect {src}) \
             (dolist (spec (org-babel-tangle-collect-blocks)) \
               (princ (format \"%s:%s\\n\" {src} (car spec))))))"
    )
}

fn tangle_eval(source: &Path) -> String {
    let src = elisp_string(source);
    format!("(progn (require 'ob-tangle) (org-babel-tangle-file {src}))")
}

/// Escape a path into an elisp string literal.
fn elisp_string(path: &Path) -> String {
    let escaped = path
        .to_string_lossy()
        .replace('\\', "\\\\")
        .replace('"', "\\\"");
    format!("\"{escaped}\"")
}

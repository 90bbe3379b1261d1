// src/report/mod.rs

//! Progress reporting.
//!
//! A dedicated tokio task owns the terminal: it receives state-update
//! messages over an mpsc channel and is the only place that draws, so the
//! animated status line and plain log lines can never interleave mid-line.
//! The rest of the application talks to it through the cheap-to-clone
//! [`Reporter`] handle.
//!
//! The reporter is a small state machine: `Setup` until the first `begin`,
//! `Doing` while the spinner animates, and exactly one of `Failed`, `Ok`, or
//! `Done` at the end. Events arriving after a terminal state are ignored.

pub mod style;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

pub use style::{AnsiStyler, PlainStyler, Styler};

/// Reporter states. `Failed`, `Ok`, and `Done` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Setup,
    Doing,
    Failed,
    Ok,
    Done,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Failed | Status::Ok | Status::Done)
    }
}

#[derive(Debug)]
enum ReportEvent {
    Begin(String),
    Update(String),
    Plain(String),
    Finish(Status, String),
}

/// Handle used by the pipeline and the engine adapters to talk to the
/// render task. Sends are fire-and-forget: once the task has finished, the
/// remaining events are dropped on the floor.
#[derive(Debug, Clone)]
pub struct Reporter {
    tx: mpsc::Sender<ReportEvent>,
    verbose: bool,
}

impl Reporter {
    /// Enter `Doing` with the given status message.
    pub async fn begin(&self, message: impl Into<String>) {
        let _ = self.tx.send(ReportEvent::Begin(message.into())).await;
    }

    /// Replace the status message while `Doing`.
    pub async fn update(&self, message: impl Into<String>) {
        let _ = self.tx.send(ReportEvent::Update(message.into())).await;
    }

    /// Print a plain line without corrupting the animated status line.
    pub async fn plain(&self, line: impl Into<String>) {
        let _ = self.tx.send(ReportEvent::Plain(line.into())).await;
    }

    /// Subprocess output: shown as plain lines in verbose mode, otherwise
    /// routed to the debug log only.
    pub async fn detail(&self, line: &str) {
        if self.verbose {
            self.plain(line).await;
        } else {
            debug!("engine: {line}");
        }
    }

    pub async fn finish_ok(&self, message: impl Into<String>) {
        let _ = self
            .tx
            .send(ReportEvent::Finish(Status::Ok, message.into()))
            .await;
    }

    pub async fn finish_done(&self, message: impl Into<String>) {
        let _ = self
            .tx
            .send(ReportEvent::Finish(Status::Done, message.into()))
            .await;
    }

    pub async fn finish_failed(&self, message: impl Into<String>) {
        let _ = self
            .tx
            .send(ReportEvent::Finish(Status::Failed, message.into()))
            .await;
    }
}

/// Spawn the render task.
///
/// With `interactive` set, status is drawn as an indicatif spinner redrawn
/// on `tick_ms` intervals; otherwise each state change is a static line on
/// stderr. The task exits once every [`Reporter`] clone has been dropped.
pub fn spawn_reporter(interactive: bool, verbose: bool, tick_ms: u64) -> (Reporter, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel::<ReportEvent>(64);

    let handle = tokio::spawn(render_loop(rx, interactive, tick_ms));

    (Reporter { tx, verbose }, handle)
}

async fn render_loop(mut rx: mpsc::Receiver<ReportEvent>, interactive: bool, tick_ms: u64) {
    let styler = style::auto();
    let mut status = Status::Setup;
    let mut bar: Option<ProgressBar> = None;

    while let Some(event) = rx.recv().await {
        if status.is_terminal() {
            debug!(?event, "reporter already finished; dropping event");
            continue;
        }

        match event {
            ReportEvent::Begin(message) | ReportEvent::Update(message) => {
                status = Status::Doing;
                match &bar {
                    Some(bar) => bar.set_message(message),
                    None if interactive => {
                        let spinner = ProgressBar::new_spinner();
                        spinner.set_style(
                            ProgressStyle::with_template("{spinner} {msg}")
                                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                        );
                        spinner.enable_steady_tick(Duration::from_millis(tick_ms.max(1)));
                        spinner.set_message(message);
                        bar = Some(spinner);
                    }
                    None => eprintln!("{message}"),
                }
            }
            ReportEvent::Plain(line) => match &bar {
                // indicatif erases the animated line, prints, then redraws.
                Some(bar) => bar.println(line),
                None => eprintln!("{line}"),
            },
            ReportEvent::Finish(final_status, message) => {
                status = final_status;
                if let Some(bar) = bar.take() {
                    bar.finish_and_clear();
                }
                let line = match final_status {
                    Status::Failed => format!("{} {message}", styler.failed("✗")),
                    Status::Ok | Status::Done => format!("{} {message}", styler.ok("✓")),
                    // Not a terminal state; render it as-is rather than lie.
                    Status::Setup | Status::Doing => styler.emphasis(&message),
                };
                eprintln!("{line}");
            }
        }
    }
}

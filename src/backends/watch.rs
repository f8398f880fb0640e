//! Watch backend - periodic monitoring driven by a tokio interval
//!
//! Each cycle runs on the blocking pool, so the command reader on stdin is
//! never held up by a scan. Commands: `now`, `stop`, `start`, `copy`, `quit`.

use anyhow::Result;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

use crate::core::config::MonitorConfig;
use crate::core::model::{LogEntry, ScanResult};
use crate::core::render::{RenderConfig, Renderer};
use crate::flows::monitor::{Monitor, MonitorListener};

/// Prints scan results to stdout and log lines to stderr
pub struct ConsoleListener {
    renderer: Renderer,
    quiet: bool,
}

impl ConsoleListener {
    pub fn new(config: RenderConfig, quiet: bool) -> Self {
        Self {
            renderer: Renderer::with_config(config),
            quiet,
        }
    }
}

impl MonitorListener for ConsoleListener {
    fn on_scan_complete(&self, result: &ScanResult) {
        println!("{}", self.renderer.render(result));
    }

    fn on_log(&self, entry: &LogEntry) {
        if !self.quiet {
            eprintln!("{}", entry);
        }
    }
}

/// A line typed on stdin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchCommand {
    ScanNow,
    Start,
    Stop,
    CopyLatest,
    Quit,
}

impl std::str::FromStr for WatchCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "now" | "scan" => Ok(WatchCommand::ScanNow),
            "start" => Ok(WatchCommand::Start),
            "stop" => Ok(WatchCommand::Stop),
            "copy" => Ok(WatchCommand::CopyLatest),
            "quit" | "exit" | "q" => Ok(WatchCommand::Quit),
            other => Err(format!(
                "Unknown command: {} (expected now, start, stop, copy or quit)",
                other
            )),
        }
    }
}

/// Run the watch command until `quit` or Ctrl-C
pub fn run_watch(config: MonitorConfig, render: RenderConfig, quiet: bool) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(watch(config, ConsoleListener::new(render, quiet)));
    // a pending stdin read cannot be cancelled; do not wait for it
    runtime.shutdown_background();
    result
}

async fn watch<L: MonitorListener + 'static>(config: MonitorConfig, listener: L) -> Result<()> {
    let period = config.check_interval();
    let monitor = Arc::new(Monitor::new(config, listener));
    let mut inflight: Vec<JoinHandle<()>> = Vec::new();

    monitor.start();

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // the first tick completes immediately: initial cycle
    ticker.tick().await;
    inflight.push(spawn_op(&monitor, |m| {
        m.tick();
    }));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        inflight.retain(|h| !h.is_finished());

        tokio::select! {
            _ = ticker.tick() => {
                inflight.push(spawn_op(&monitor, |m| {
                    m.tick();
                }));
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) if line.trim().is_empty() => {}
                Ok(Some(line)) => match line.parse::<WatchCommand>() {
                    Ok(WatchCommand::Quit) => break,
                    Ok(WatchCommand::Stop) => {
                        monitor.stop();
                    }
                    Ok(WatchCommand::Start) => {
                        if monitor.start() {
                            ticker.reset();
                            inflight.push(spawn_op(&monitor, |m| {
                                m.tick();
                            }));
                        }
                    }
                    Ok(WatchCommand::ScanNow) => {
                        inflight.push(spawn_op(&monitor, |m| {
                            m.scan_now();
                        }));
                    }
                    Ok(WatchCommand::CopyLatest) => {
                        inflight.push(spawn_op(&monitor, |m| {
                            m.copy_latest();
                        }));
                    }
                    Err(message) => monitor.log(message),
                },
                Ok(None) => {
                    debug!("stdin closed, commands disabled");
                    stdin_open = false;
                }
                Err(e) => {
                    debug!(error = %e, "stdin read failed, commands disabled");
                    stdin_open = false;
                }
            },
            _ = &mut ctrl_c => break,
        }
    }

    // let in-flight work finish before reporting the stop
    for handle in inflight {
        let _ = handle.await;
    }
    monitor.stop();

    Ok(())
}

fn spawn_op<L, F>(monitor: &Arc<Monitor<L>>, op: F) -> JoinHandle<()>
where
    L: MonitorListener + 'static,
    F: FnOnce(&Monitor<L>) + Send + 'static,
{
    let monitor = Arc::clone(monitor);
    tokio::task::spawn_blocking(move || op(&monitor))
}

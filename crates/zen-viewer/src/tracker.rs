//! Bridge to the external hand landmark detector.
//!
//! The detector is any child process that writes one wire frame (JSON) per
//! line on stdout; by default that is the bundled `hand_emulator`, but a
//! camera-backed detector script slots in the same way. A background thread
//! owns the pipe and parses lines; the render thread drains parsed frames
//! once per display frame without ever blocking on the child.

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use handsig::{wire::WireFrame, LandmarkSet};
use std::io::{BufRead, BufReader};
use std::process::{Child, ChildStdout, Command, Stdio};

enum TrackerMsg {
    Frame(Option<LandmarkSet>),
    /// Reader saw EOF: the child exited or closed stdout.
    Eof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerStatus {
    Running,
    /// Stopped on purpose; `start` resumes.
    Paused,
    /// Spawn failed or the child died; `start` retries.
    Failed(String),
}

pub struct TrackerBridge {
    command: String,
    child: Option<Child>,
    rx: Option<Receiver<TrackerMsg>>,
    pub status: TrackerStatus,
}

impl TrackerBridge {
    /// Prepares a bridge without launching anything yet.
    pub fn new(command: String) -> Self {
        Self {
            command,
            child: None,
            rx: None,
            status: TrackerStatus::Paused,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == TrackerStatus::Running
    }

    /// Launches the detector process and its reader thread. Failure is
    /// recorded in `status` for the HUD, never propagated as fatal.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        match self.spawn() {
            Ok(()) => {
                self.status = TrackerStatus::Running;
                log::info!("Detector started: {}", self.command);
            }
            Err(e) => {
                log::error!("Detector failed to start: {e:#}");
                self.status = TrackerStatus::Failed(format!("{e:#}"));
            }
        }
    }

    fn spawn(&mut self) -> Result<()> {
        let mut parts = self.command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| anyhow!("empty detector command"))?;
        let mut child = Command::new(program)
            .args(parts)
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .with_context(|| format!("spawning `{}`", self.command))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("detector stdout was not captured"))?;

        let (tx, rx) = unbounded();
        std::thread::spawn(move || reader_loop(stdout, tx));

        self.child = Some(child);
        self.rx = Some(rx);
        Ok(())
    }

    /// Stops the detector and releases the process. Used for both the HUD
    /// power toggle and final teardown.
    pub fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            // Kill before wait; the reader thread drains to EOF and exits.
            let _ = child.kill();
            let _ = child.wait();
            log::info!("Detector stopped");
        }
        self.rx = None;
        if self.status == TrackerStatus::Running {
            self.status = TrackerStatus::Paused;
        }
    }

    /// Drains everything the detector produced since the previous call, in
    /// arrival order. Returns immediately when there is nothing.
    pub fn poll(&mut self) -> Vec<Option<LandmarkSet>> {
        let mut frames = Vec::new();
        let mut died = false;
        if let Some(rx) = &self.rx {
            while let Ok(msg) = rx.try_recv() {
                match msg {
                    TrackerMsg::Frame(f) => frames.push(f),
                    TrackerMsg::Eof => died = true,
                }
            }
        }
        if died && self.status == TrackerStatus::Running {
            let detail = self
                .child
                .as_mut()
                .and_then(|c| c.try_wait().ok().flatten())
                .map(|s| format!("detector exited ({s})"))
                .unwrap_or_else(|| "detector closed its output".to_string());
            log::warn!("{detail}");
            self.stop();
            self.status = TrackerStatus::Failed(detail);
        }
        frames
    }
}

impl Drop for TrackerBridge {
    fn drop(&mut self) {
        self.stop();
    }
}

fn reader_loop(stdout: ChildStdout, tx: Sender<TrackerMsg>) {
    for line in BufReader::new(stdout).lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }
        let frame = match serde_json::from_str::<WireFrame>(&line) {
            Ok(wire) => wire.to_landmarks(),
            Err(e) => {
                // A detector speaking garbage is treated as one with no
                // hand in view.
                log::warn!("Unparseable detector line: {e}");
                None
            }
        };
        if tx.send(TrackerMsg::Frame(frame)).is_err() {
            // Consumer is gone; stop reading.
            return;
        }
    }
    let _ = tx.send(TrackerMsg::Eof);
}

//! # Host Spawner
//!
//! Runs commands on the local machine.
//!
//! ## Architecture
//!
//! - [`ProcessSpawner::capture`] uses `std::process::Command` and waits for
//!   the command to exit (folder and image listings are short).
//! - [`ProcessSpawner::stream`] spawns the command in a pseudo-terminal with
//!   `portable-pty`. A reader thread feeds PTY output into the shared `vt100`
//!   parser; a waiter thread records the exit status once the reader has
//!   drained the PTY, so the completion message always follows the last
//!   line of output.

use crate::playbook::CommandSpec;
use crate::spawn::{Escalation, ProcessSpawner, RunHandle};
use anyhow::{Context, Result};
use portable_pty::{CommandBuilder, MasterPty, NativePtySystem, PtySize, PtySystem};
use std::io::Read;
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Spawns commands on the local host, optionally escalated
#[derive(Debug, Clone, Copy)]
pub struct HostSpawner {
    escalation: Escalation,
}

impl HostSpawner {
    pub fn new(escalation: Escalation) -> Self {
        Self { escalation }
    }
}

impl ProcessSpawner for HostSpawner {
    fn capture(&self, command: &CommandSpec) -> Result<String> {
        let command = self.escalation.wrap(command);
        let line = command.display_line();
        debug!(command = %line, "capturing command output");

        let output = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("Failed to execute `{}`", line))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let code = output
                .status
                .code()
                .map_or_else(|| "a signal".to_string(), |c| format!("code {}", c));
            anyhow::bail!("`{}` exited with {}: {}", line, code, stderr.trim());
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn stream(
        &self,
        command: &CommandSpec,
        sink: Arc<Mutex<vt100::Parser>>,
        cols: u16,
        rows: u16,
    ) -> Result<RunHandle> {
        let command = self.escalation.wrap(command);
        let line = command.display_line();
        debug!(command = %line, cols, rows, "spawning command in PTY");

        let pty_system = NativePtySystem::default();
        let pty_pair = pty_system
            .openpty(PtySize {
                rows,
                cols,
                pixel_width: 0,
                pixel_height: 0,
            })
            .context("Failed to open PTY")?;

        let mut cmd = CommandBuilder::new(&command.program);
        for arg in &command.args {
            cmd.arg(arg);
        }
        if let Ok(cwd) = std::env::current_dir() {
            cmd.cwd(cwd);
        }

        let mut child = pty_pair
            .slave
            .spawn_command(cmd)
            .with_context(|| format!("Failed to spawn `{}`", line))?;

        // Only the master side is needed once the child owns the slave
        drop(pty_pair.slave);

        let mut reader = pty_pair
            .master
            .try_clone_reader()
            .context("Failed to clone PTY reader")?;
        let killer = child.clone_killer();
        let master: Arc<Mutex<Option<Box<dyn MasterPty + Send>>>> =
            Arc::new(Mutex::new(Some(pty_pair.master)));

        let (handle, reporter) = RunHandle::new(line);

        let reader_thread = std::thread::spawn(move || {
            let mut buf = [0u8; 4096];
            loop {
                match reader.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        if let Ok(mut parser) = sink.lock() {
                            parser.process(&buf[..n]);
                        }
                    }
                    // EIO once the child side has closed
                    Err(_) => break,
                }
            }
        });

        std::thread::spawn(move || {
            let result = child.wait();
            if reader_thread.join().is_err() {
                warn!("PTY reader thread panicked");
            }
            match result {
                Ok(exit_status) => {
                    let code: i32 = exit_status.exit_code().try_into().unwrap_or(1);
                    reporter.finish(code);
                }
                Err(e) => reporter.fail(format!("Failed to wait for process: {}", e)),
            }
        });

        Ok(handle.with_killer(killer).with_master(master))
    }
}

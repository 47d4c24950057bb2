//! # Process Spawning
//!
//! The panel never runs anything itself: listings and playbook runs go
//! through a [`ProcessSpawner`], the boundary to the operating system.
//!
//! - [`HostSpawner`] - production spawner. Captured commands run with
//!   `std::process`, streamed runs inside a PTY (`portable-pty`) so
//!   `ansible-playbook` keeps its colors and line buffering.
//! - [`RunHandle`] - a streaming run in flight, polled by the event loop.
//!
//! Both paths can wrap the command in a privilege escalation helper
//! ([`Escalation`]), since playbook folders and the podman image store are
//! usually root-owned.

pub mod host;
pub mod run;

pub use host::HostSpawner;
pub use run::{ExecutionStatus, RunHandle, RunReporter};

use crate::playbook::CommandSpec;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// The external process service used by the panel.
///
/// Implemented by [`HostSpawner`] in production and by recording fakes in
/// tests.
pub trait ProcessSpawner {
    /// Run a command to completion and return its standard output.
    ///
    /// A non-zero exit status is an error carrying the command's stderr.
    fn capture(&self, command: &CommandSpec) -> Result<String>;

    /// Start a command whose output is fed into `sink` as it arrives.
    fn stream(
        &self,
        command: &CommandSpec,
        sink: Arc<Mutex<vt100::Parser>>,
        cols: u16,
        rows: u16,
    ) -> Result<RunHandle>;
}

/// How commands acquire superuser rights
///
/// Listings and runs need root: `systemd-run --scope` would otherwise ask
/// polkit on the run's PTY, where nobody can answer. The default is therefore
/// `sudo` unless the panel already runs as root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Escalation {
    /// Run as the current user
    None,
    /// `sudo -n --`, never prompts (needs cached credentials or NOPASSWD)
    Sudo,
    /// `pkexec`, uses the polkit agent of the session
    Pkexec,
}

impl Default for Escalation {
    fn default() -> Self {
        Self::for_uid(effective_uid())
    }
}

/// Owner of `/proc/self`, which is the effective uid of this process.
#[cfg(unix)]
fn effective_uid() -> Option<u32> {
    use std::os::unix::fs::MetadataExt;
    std::fs::metadata("/proc/self").ok().map(|m| m.uid())
}

#[cfg(not(unix))]
fn effective_uid() -> Option<u32> {
    None
}

impl Escalation {
    /// Escalation needed by a process running as `uid` (unknown counts as
    /// unprivileged).
    pub fn for_uid(uid: Option<u32>) -> Self {
        match uid {
            Some(0) => Escalation::None,
            _ => Escalation::Sudo,
        }
    }

    /// Wrap a command with the escalation helper, if any.
    pub fn wrap(self, command: &CommandSpec) -> CommandSpec {
        match self {
            Escalation::None => command.clone(),
            Escalation::Sudo => {
                let mut args = vec!["-n".to_string(), "--".to_string(), command.program.clone()];
                args.extend(command.args.iter().cloned());
                CommandSpec::new("sudo", args)
            }
            Escalation::Pkexec => {
                let mut args = vec![command.program.clone()];
                args.extend(command.args.iter().cloned());
                CommandSpec::new("pkexec", args)
            }
        }
    }
}

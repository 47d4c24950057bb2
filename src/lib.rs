//! pbrun - a terminal panel for running Ansible playbooks
//!
//! This library lists the playbooks in a folder and the podman images
//! labelled as Ansible execution environments, builds the command that runs
//! a playbook on the host or inside such an image, and streams its output.

pub mod playbook;
pub mod spawn;
pub mod ui;

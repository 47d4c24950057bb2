//! # Playbook and Image Listing
//!
//! Parses the output of the folder listing and image inventory commands and
//! runs them through a [`ProcessSpawner`].
//!
//! Both listings are newline separated. Blank lines (including the trailing
//! one every command prints) are dropped and the remaining order is kept, so
//! the dropdowns show entries exactly as the commands reported them.

use crate::playbook::command::{list_folder_command, list_images_command};
use crate::spawn::ProcessSpawner;
use anyhow::{Context, Result};

/// File extensions recognised as playbooks
pub const PLAYBOOK_EXTENSIONS: &[&str] = &[".yml", ".yaml"];

/// Whether a folder entry looks like a playbook (`.yml` or `.yaml` suffix)
pub fn is_playbook_file(name: &str) -> bool {
    PLAYBOOK_EXTENSIONS.iter().any(|ext| {
        name.len() > ext.len()
            && name
                .get(name.len() - ext.len()..)
                .is_some_and(|suffix| suffix.eq_ignore_ascii_case(ext))
    })
}

/// Extract playbook names from `ls -1` output.
pub fn parse_playbook_listing(output: &str) -> Vec<String> {
    output
        .split('\n')
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.is_empty())
        .filter(|line| is_playbook_file(line))
        .map(ToString::to_string)
        .collect()
}

/// Extract image repositories from the image inventory output.
pub fn parse_image_listing(output: &str) -> Vec<String> {
    output
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// List the playbooks in `folder`.
pub fn list_playbooks(spawner: &dyn ProcessSpawner, folder: &str) -> Result<Vec<String>> {
    let command = list_folder_command(folder);
    let output = spawner
        .capture(&command)
        .with_context(|| format!("Failed to list playbooks in {}", folder))?;
    Ok(parse_playbook_listing(&output))
}

/// List the execution environment images known to podman.
pub fn list_images(spawner: &dyn ProcessSpawner) -> Result<Vec<String>> {
    let command = list_images_command();
    let output = spawner
        .capture(&command)
        .context("Failed to list execution environment images")?;
    Ok(parse_image_listing(&output))
}

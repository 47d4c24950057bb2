//! # Playbook Module
//!
//! Everything about finding and running Ansible playbooks that does not
//! depend on the terminal UI.
//!
//! | Concern | Module |
//! |---------|--------|
//! | Folder and image listings | [`listing`] |
//! | Run command construction | [`command`] |

pub mod command;
pub mod listing;

pub use command::{
    build_command, playbook_path, CommandError, CommandSpec, RunMode, RunRequest,
    EXECUTION_ENVIRONMENT_LABEL,
};
pub use listing::{
    is_playbook_file, list_images, list_playbooks, parse_image_listing, parse_playbook_listing,
};

/// Folder scanned for playbooks when nothing else is configured
pub const DEFAULT_PLAYBOOK_FOLDER: &str = "/opt/playbooks";

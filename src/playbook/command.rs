//! # Command Construction
//!
//! Turns a [`RunRequest`] into the argument vector that runs a playbook.
//!
//! ## Command Shapes
//!
//! | Mode | Command |
//! |------|---------|
//! | Host | `systemd-run --quiet --scope ansible-playbook <folder>/<playbook> <extra args...>` |
//! | Container | `podman container runlabel ansible_execution_environment <image> "<folder>/<playbook> <extra args>"` |
//!
//! Commands are always built as a program plus a list of arguments and are
//! spawned without a shell, so nothing the operator types is ever parsed by
//! `bash`. Extra arguments for host runs are split with POSIX shell-word
//! rules (via `shlex`) so quoting in the extra-args field still works. In
//! container mode the label command receives the playbook path and the extra
//! arguments as one embedded argument, which `podman` expands into the
//! label's command line.
//!
//! [`CommandSpec::display_line`] renders the argument vector back into a
//! copy-pasteable line for the preview and the output banner.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Label identifying Ansible execution environment images.
pub const EXECUTION_ENVIRONMENT_LABEL: &str = "ansible_execution_environment";

/// How a playbook should be run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// Run `ansible-playbook` on the host inside a transient systemd scope
    Host,
    /// Run via the `ansible_execution_environment` label of a container image
    Container { image: String },
}

/// Everything needed to build the command for one playbook run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub folder: String,
    pub playbook: String,
    pub extra_args: String,
    pub mode: RunMode,
}

/// Reasons a [`RunRequest`] cannot be turned into a command
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("No playbook selected")]
    NoPlaybook,

    #[error("Playbook folder cannot be empty")]
    EmptyFolder,

    #[error("Invalid playbook folder '{0}': must not start with '-'")]
    InvalidFolder(String),

    #[error("Invalid playbook name '{0}': must be a file name inside the playbook folder")]
    InvalidPlaybookName(String),

    #[error("No container image selected")]
    NoImage,

    #[error("Invalid container image reference '{0}'")]
    InvalidImage(String),

    #[error("Extra arguments have unbalanced quotes: {0}")]
    UnbalancedQuotes(String),
}

/// A program and its arguments, ready to be spawned without a shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new<P, I, S>(program: P, args: I) -> Self
    where
        P: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Render the command as a single line a shell would split back into the
    /// same arguments.
    pub fn display_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(quote_arg)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_line())
    }
}

/// Double-quote an argument when a shell would otherwise split or expand it.
///
/// `"`, `\`, `$` and `` ` `` keep their special meaning inside double quotes,
/// so they are backslash-escaped.
fn quote_arg(arg: &str) -> String {
    let needs_quotes = arg.is_empty()
        || arg.chars().any(|c| {
            c.is_whitespace()
                || matches!(
                    c,
                    '"' | '\''
                        | '\\'
                        | '$'
                        | '`'
                        | ';'
                        | '&'
                        | '|'
                        | '<'
                        | '>'
                        | '('
                        | ')'
                        | '*'
                        | '?'
                        | '['
                        | ']'
                        | '#'
                        | '~'
                        | '!'
                )
        });

    if !needs_quotes {
        return arg.to_string();
    }

    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('"');
    for c in arg.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Registry/repository[:tag][@digest]. Must not start with '-' so it can
/// never be read as a podman option.
const IMAGE_REF_PATTERN: &str = r"^[A-Za-z0-9][A-Za-z0-9._/:@+-]*$";

fn is_valid_image_ref(image: &str) -> bool {
    static IMAGE_REF: OnceLock<Option<Regex>> = OnceLock::new();
    IMAGE_REF
        .get_or_init(|| Regex::new(IMAGE_REF_PATTERN).ok())
        .as_ref()
        .is_some_and(|re| re.is_match(image))
}

/// Check that a playbook name is a bare file name inside the folder.
fn validate_playbook_name(playbook: &str) -> Result<(), CommandError> {
    if playbook.is_empty() {
        return Err(CommandError::NoPlaybook);
    }
    if playbook == "."
        || playbook == ".."
        || playbook.contains('/')
        || playbook.contains('\0')
    {
        return Err(CommandError::InvalidPlaybookName(playbook.to_string()));
    }
    Ok(())
}

/// Join the folder and playbook name without doubling a trailing slash.
pub fn playbook_path(folder: &str, playbook: &str) -> String {
    let folder = folder.trim_end_matches('/');
    if folder.is_empty() {
        format!("/{}", playbook)
    } else {
        format!("{}/{}", folder, playbook)
    }
}

/// Build the command that runs the requested playbook.
pub fn build_command(request: &RunRequest) -> Result<CommandSpec, CommandError> {
    validate_playbook_name(&request.playbook)?;

    let folder = request.folder.trim();
    if folder.is_empty() {
        return Err(CommandError::EmptyFolder);
    }
    // The playbook path is a positional argument of ansible-playbook
    if folder.starts_with('-') {
        return Err(CommandError::InvalidFolder(folder.to_string()));
    }

    let path = playbook_path(folder, &request.playbook);
    let extra_args = request.extra_args.trim();

    match &request.mode {
        RunMode::Container { image } => {
            let image = image.trim();
            if image.is_empty() {
                return Err(CommandError::NoImage);
            }
            if !is_valid_image_ref(image) {
                return Err(CommandError::InvalidImage(image.to_string()));
            }

            // Reject unbalanced quoting here too; the label command will
            // split this string itself.
            if shlex::split(extra_args).is_none() {
                return Err(CommandError::UnbalancedQuotes(extra_args.to_string()));
            }

            let embedded = if extra_args.is_empty() {
                path
            } else {
                format!("{} {}", path, extra_args)
            };

            Ok(CommandSpec::new(
                "podman",
                [
                    "container".to_string(),
                    "runlabel".to_string(),
                    EXECUTION_ENVIRONMENT_LABEL.to_string(),
                    image.to_string(),
                    embedded,
                ],
            ))
        }
        RunMode::Host => {
            let extra = shlex::split(extra_args)
                .ok_or_else(|| CommandError::UnbalancedQuotes(extra_args.to_string()))?;

            let mut args = vec![
                "--quiet".to_string(),
                "--scope".to_string(),
                "ansible-playbook".to_string(),
                path,
            ];
            args.extend(extra);

            Ok(CommandSpec::new("systemd-run", args))
        }
    }
}

/// Command listing the entries of the playbook folder, one per line.
pub fn list_folder_command(folder: &str) -> CommandSpec {
    CommandSpec::new("ls", ["-1", "--", folder])
}

/// Command listing the repositories of execution environment images.
pub fn list_images_command() -> CommandSpec {
    CommandSpec::new(
        "podman",
        [
            "image",
            "list",
            "--filter",
            &format!("label={}", EXECUTION_ENVIRONMENT_LABEL),
            "--noheading",
            "--format",
            "table {{.Repository}}",
        ],
    )
}

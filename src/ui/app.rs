use crate::playbook::{
    self, build_command, CommandError, CommandSpec, RunMode, RunRequest, DEFAULT_PLAYBOOK_FOLDER,
};
use crate::spawn::{ExecutionStatus, ProcessSpawner, RunHandle};
use crate::ui::output::OutputLog;
use crate::ui::theme::Theme;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Form fields and panes that can hold keyboard focus, in tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusField {
    Folder,
    Playbook,
    ExtraArgs,
    Image,
    RunInContainer,
    LoadButton,
    RunButton,
    Output,
}

impl FocusField {
    const ORDER: [FocusField; 8] = [
        FocusField::Folder,
        FocusField::Playbook,
        FocusField::ExtraArgs,
        FocusField::Image,
        FocusField::RunInContainer,
        FocusField::LoadButton,
        FocusField::RunButton,
        FocusField::Output,
    ];

    fn position(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// One-line message shown in the footer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub level: StatusLevel,
    pub text: String,
}

/// View state of the playbook runner panel.
///
/// Every form field lives here; the renderer draws purely from this struct.
pub struct App {
    pub theme: Theme,
    /// Folder the playbook list was loaded from
    pub playbook_folder: String,
    /// Contents of the folder text field
    pub folder_input: String,
    pub playbooks: Vec<String>,
    pub selected_playbook: Option<usize>,
    pub extra_args: String,
    pub images: Vec<String>,
    pub selected_image: Option<usize>,
    pub run_in_container: bool,
    pub focus: FocusField,
    pub output: OutputLog,
    /// Rows scrolled back from the bottom of the output (0 = following)
    pub output_scroll: usize,
    pub run: Option<RunHandle>,
    /// Status of the current or most recent run
    pub run_status: ExecutionStatus,
    pub status_message: Option<StatusMessage>,
    pub show_help: bool,
    pub should_quit: bool,
    /// First `g` of a `gg` sequence was pressed in the output pane
    pub pending_g: bool,
}

impl App {
    pub fn new(playbook_folder: String, theme: Theme, scrollback_lines: usize) -> Self {
        Self {
            theme,
            folder_input: playbook_folder.clone(),
            playbook_folder,
            playbooks: Vec::new(),
            selected_playbook: None,
            extra_args: String::new(),
            images: Vec::new(),
            selected_image: None,
            run_in_container: false,
            focus: FocusField::Folder,
            output: OutputLog::new(24, 80, scrollback_lines),
            output_scroll: 0,
            run: None,
            run_status: ExecutionStatus::Idle,
            status_message: None,
            show_help: false,
            should_quit: false,
            pending_g: false,
        }
    }

    /// Populate both dropdowns, as done when the panel opens.
    pub fn mount(&mut self, spawner: &dyn ProcessSpawner) {
        self.load_playbooks(spawner);
        self.load_images(spawner);
    }

    /// Re-read the applied playbook folder and the image inventory.
    ///
    /// Whatever is typed in the folder field is left alone.
    pub fn reload(&mut self, spawner: &dyn ProcessSpawner) {
        self.refresh_playbooks(spawner);
        self.load_images(spawner);
    }

    /// Apply the folder field and list the playbooks in it.
    ///
    /// The list is cleared first and stays empty if the listing fails.
    pub fn load_playbooks(&mut self, spawner: &dyn ProcessSpawner) {
        let folder = self.folder_input.trim();
        self.playbook_folder = if folder.is_empty() {
            DEFAULT_PLAYBOOK_FOLDER.to_string()
        } else {
            folder.to_string()
        };
        self.folder_input = self.playbook_folder.clone();
        self.refresh_playbooks(spawner);
    }

    /// List `playbook_folder` into the dropdown.
    fn refresh_playbooks(&mut self, spawner: &dyn ProcessSpawner) {
        self.playbooks.clear();
        self.selected_playbook = None;

        match playbook::list_playbooks(spawner, &self.playbook_folder) {
            Ok(playbooks) => {
                info!(
                    folder = %self.playbook_folder,
                    count = playbooks.len(),
                    "loaded playbooks"
                );
                self.selected_playbook = if playbooks.is_empty() { None } else { Some(0) };
                self.set_status(
                    StatusLevel::Info,
                    format!(
                        "{} playbook(s) in {}",
                        playbooks.len(),
                        self.playbook_folder
                    ),
                );
                self.playbooks = playbooks;
            }
            Err(e) => {
                error!(folder = %self.playbook_folder, error = %format!("{:#}", e), "error fetching playbooks");
                self.set_status(StatusLevel::Error, format!("{:#}", e));
            }
        }
    }

    /// Replace the image list with the current inventory.
    ///
    /// On failure the previous list is kept.
    pub fn load_images(&mut self, spawner: &dyn ProcessSpawner) {
        match playbook::list_images(spawner) {
            Ok(images) => {
                info!(count = images.len(), "loaded execution environment images");
                let previous = self.selected_image_name().map(ToString::to_string);
                self.selected_image = previous
                    .and_then(|name| images.iter().position(|i| *i == name))
                    .or(if images.is_empty() { None } else { Some(0) });
                self.images = images;
            }
            Err(e) => {
                error!(error = %format!("{:#}", e), "error fetching images");
            }
        }
    }

    pub fn selected_playbook_name(&self) -> Option<&str> {
        self.selected_playbook
            .and_then(|i| self.playbooks.get(i))
            .map(String::as_str)
    }

    pub fn selected_image_name(&self) -> Option<&str> {
        self.selected_image
            .and_then(|i| self.images.get(i))
            .map(String::as_str)
    }

    pub fn select_next_playbook(&mut self) {
        self.selected_playbook = cycle(self.selected_playbook, self.playbooks.len(), true);
    }

    pub fn select_previous_playbook(&mut self) {
        self.selected_playbook = cycle(self.selected_playbook, self.playbooks.len(), false);
    }

    pub fn select_next_image(&mut self) {
        self.selected_image = cycle(self.selected_image, self.images.len(), true);
    }

    pub fn select_previous_image(&mut self) {
        self.selected_image = cycle(self.selected_image, self.images.len(), false);
    }

    pub fn toggle_run_in_container(&mut self) {
        self.run_in_container = !self.run_in_container;
    }

    /// The request the form currently describes, if a playbook is selected
    pub fn run_request(&self) -> Option<RunRequest> {
        let playbook = self.selected_playbook_name()?;
        let mode = if self.run_in_container {
            RunMode::Container {
                image: self.selected_image_name().unwrap_or_default().to_string(),
            }
        } else {
            RunMode::Host
        };
        Some(RunRequest {
            folder: self.playbook_folder.clone(),
            playbook: playbook.to_string(),
            extra_args: self.extra_args.clone(),
            mode,
        })
    }

    /// The command "Run Playbook" would execute
    pub fn command_preview(&self) -> Option<Result<CommandSpec, CommandError>> {
        self.run_request().map(|request| build_command(&request))
    }

    pub fn is_running(&self) -> bool {
        self.run.as_ref().is_some_and(|r| !r.is_finished())
    }

    /// Run the selected playbook, streaming into the output pane.
    ///
    /// Does nothing without a selected playbook or while another run is in
    /// flight. Returns whether a run was started.
    pub fn submit(&mut self, spawner: &dyn ProcessSpawner, cols: u16, rows: u16) -> bool {
        if self.run.is_some() {
            self.set_status(
                StatusLevel::Warning,
                "A playbook is already running (Ctrl+C to cancel)",
            );
            return false;
        }

        let Some(request) = self.run_request() else {
            self.set_status(StatusLevel::Warning, "Select a playbook first");
            return false;
        };

        self.output.reset(rows, cols);
        self.output_scroll = 0;

        let command = match build_command(&request) {
            Ok(command) => command,
            Err(e) => {
                warn!(error = %e, "refusing to build playbook command");
                self.fail_run(&e.to_string());
                return false;
            }
        };

        let line = command.display_line();
        self.output.append_line(&format!(
            "[{}] $ {}",
            chrono::Local::now().format("%H:%M:%S"),
            line
        ));

        match spawner.stream(&command, Arc::clone(self.output.parser()), cols, rows) {
            Ok(handle) => {
                info!(command = %line, "playbook run started");
                self.run = Some(handle);
                self.run_status = ExecutionStatus::Running;
                self.focus = FocusField::Output;
                self.set_status(
                    StatusLevel::Info,
                    format!("Running {}", request.playbook),
                );
                true
            }
            Err(e) => {
                self.fail_run(&format!("{:#}", e));
                false
            }
        }
    }

    fn fail_run(&mut self, message: &str) {
        error!(error = %message, "error executing playbook");
        self.output
            .append_line(&format!("Error executing playbook: {}", message));
        self.run_status = ExecutionStatus::Failed;
        self.set_status(StatusLevel::Error, "Playbook run failed");
    }

    /// Finalize the current run once its process has exited.
    ///
    /// Returns the final status when a run finished during this poll.
    pub fn poll_run(&mut self) -> Option<ExecutionStatus> {
        if !self.run.as_ref().is_some_and(RunHandle::is_finished) {
            return None;
        }
        let handle = self.run.take()?;
        let status = handle.poll_status();
        let elapsed = handle.elapsed().as_secs_f32();

        match status {
            ExecutionStatus::Succeeded => {
                info!(command = %handle.command_line, elapsed, "playbook execution complete");
                self.output.append_line(&format!(
                    "Playbook execution complete ({:.1}s)",
                    elapsed
                ));
                self.run_status = status;
                self.set_status(StatusLevel::Info, "Playbook execution complete");
            }
            ExecutionStatus::Cancelled => {
                warn!(command = %handle.command_line, "playbook run cancelled");
                self.output.append_line("Playbook run cancelled");
                self.run_status = status;
                self.set_status(StatusLevel::Warning, "Playbook run cancelled");
            }
            _ => {
                let message = handle.error_message().unwrap_or_else(|| {
                    match handle.poll_exit_code() {
                        Some(code) => format!("exited with code {}", code),
                        None => "process ended without an exit status".to_string(),
                    }
                });
                self.fail_run(&message);
            }
        }

        Some(self.run_status)
    }

    /// Ask the running playbook to stop.
    pub fn cancel_run(&mut self) {
        let Some(run) = self.run.as_mut() else {
            return;
        };
        match run.cancel() {
            Ok(()) => {
                info!(command = %run.command_line, "cancelling playbook run");
                self.set_status(StatusLevel::Warning, "Cancelling…");
            }
            Err(e) => {
                error!(error = %format!("{:#}", e), "failed to cancel playbook run");
                self.set_status(StatusLevel::Error, format!("{:#}", e));
            }
        }
    }

    /// Stop any run before the panel goes away.
    pub fn shutdown(&mut self) {
        if self.is_running() {
            self.cancel_run();
        }
    }

    pub fn set_status(&mut self, level: StatusLevel, text: impl Into<String>) {
        self.status_message = Some(StatusMessage {
            level,
            text: text.into(),
        });
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn focus_next(&mut self) {
        self.move_focus(true);
    }

    pub fn focus_previous(&mut self) {
        self.move_focus(false);
    }

    fn move_focus(&mut self, forward: bool) {
        let len = FocusField::ORDER.len();
        let mut pos = self.focus.position();
        loop {
            pos = if forward {
                (pos + 1) % len
            } else {
                (pos + len - 1) % len
            };
            let candidate = FocusField::ORDER[pos];
            // Skip the output pane until there is something to look at
            if candidate != FocusField::Output || self.has_output() {
                self.focus = candidate;
                break;
            }
        }
        self.pending_g = false;
    }

    pub fn has_output(&self) -> bool {
        self.run.is_some() || self.run_status != ExecutionStatus::Idle
    }

    /// Type a character into the focused text field.
    pub fn input_char(&mut self, c: char) {
        match self.focus {
            FocusField::Folder => self.folder_input.push(c),
            FocusField::ExtraArgs => self.extra_args.push(c),
            _ => {}
        }
    }

    /// Delete the last character of the focused text field.
    pub fn input_backspace(&mut self) {
        match self.focus {
            FocusField::Folder => {
                self.folder_input.pop();
            }
            FocusField::ExtraArgs => {
                self.extra_args.pop();
            }
            _ => {}
        }
    }

    /// Scroll towards older output
    pub fn scroll_output_up(&mut self) {
        let max = self.output.max_scrollback();
        if self.output_scroll < max {
            self.output_scroll += 1;
        }
    }

    /// Scroll towards newer output
    pub fn scroll_output_down(&mut self) {
        self.output_scroll = self.output_scroll.saturating_sub(1);
    }

    pub fn scroll_output_half_page_up(&mut self, visible_rows: usize) {
        let max = self.output.max_scrollback();
        self.output_scroll = (self.output_scroll + (visible_rows / 2).max(1)).min(max);
    }

    pub fn scroll_output_half_page_down(&mut self, visible_rows: usize) {
        self.output_scroll = self
            .output_scroll
            .saturating_sub((visible_rows / 2).max(1));
    }

    pub fn scroll_output_to_top(&mut self) {
        self.output_scroll = self.output.max_scrollback();
    }

    pub fn scroll_output_to_bottom(&mut self) {
        self.output_scroll = 0;
    }
}

/// Move a dropdown selection one step, wrapping at both ends.
fn cycle(current: Option<usize>, len: usize, forward: bool) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match current {
        None => 0,
        Some(i) if forward => (i + 1) % len,
        Some(0) => len - 1,
        Some(i) => (i - 1).min(len - 1),
    })
}

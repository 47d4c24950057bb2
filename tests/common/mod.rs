//! Shared test helpers: a recording process spawner and app constructors.

#![allow(dead_code)]

use anyhow::{bail, Result};
use pbrun::playbook::CommandSpec;
use pbrun::spawn::{ProcessSpawner, RunHandle, RunReporter};
use pbrun::ui::theme::Theme;
use pbrun::ui::App;
use std::sync::{Arc, Mutex};

/// Spawner that answers listings with canned output and records every command.
///
/// `ls` invocations receive the playbook listing, `podman` invocations the
/// image listing. Streamed runs write `chunks` into the sink and stay
/// running until the test completes them through [`FakeSpawner::reporter`].
#[derive(Default)]
pub struct FakeSpawner {
    pub playbook_listing: Mutex<Option<Result<String, String>>>,
    pub image_listing: Mutex<Option<Result<String, String>>>,
    pub chunks: Vec<Vec<u8>>,
    pub stream_error: Option<String>,
    pub captured: Mutex<Vec<CommandSpec>>,
    pub streamed: Mutex<Vec<CommandSpec>>,
    pub reporters: Mutex<Vec<RunReporter>>,
}

impl FakeSpawner {
    pub fn new(playbooks: &str, images: &str) -> Self {
        Self {
            playbook_listing: Mutex::new(Some(Ok(playbooks.to_string()))),
            image_listing: Mutex::new(Some(Ok(images.to_string()))),
            ..Self::default()
        }
    }

    pub fn with_chunks(mut self, chunks: &[&str]) -> Self {
        self.chunks = chunks.iter().map(|c| c.as_bytes().to_vec()).collect();
        self
    }

    pub fn with_stream_error(mut self, message: &str) -> Self {
        self.stream_error = Some(message.to_string());
        self
    }

    pub fn set_playbook_listing(&self, listing: Result<&str, &str>) {
        *self.playbook_listing.lock().unwrap() =
            Some(listing.map(str::to_string).map_err(str::to_string));
    }

    pub fn set_image_listing(&self, listing: Result<&str, &str>) {
        *self.image_listing.lock().unwrap() =
            Some(listing.map(str::to_string).map_err(str::to_string));
    }

    pub fn captured_lines(&self) -> Vec<String> {
        self.captured
            .lock()
            .unwrap()
            .iter()
            .map(CommandSpec::display_line)
            .collect()
    }

    pub fn streamed_lines(&self) -> Vec<String> {
        self.streamed
            .lock()
            .unwrap()
            .iter()
            .map(CommandSpec::display_line)
            .collect()
    }

    /// Reporter of the n-th streamed run
    pub fn reporter(&self, n: usize) -> RunReporter {
        self.reporters.lock().unwrap()[n].clone()
    }
}

impl ProcessSpawner for FakeSpawner {
    fn capture(&self, command: &CommandSpec) -> Result<String> {
        self.captured.lock().unwrap().push(command.clone());

        let response = match command.program.as_str() {
            "ls" => self.playbook_listing.lock().unwrap().clone(),
            "podman" => self.image_listing.lock().unwrap().clone(),
            _ => None,
        };
        match response {
            Some(Ok(output)) => Ok(output),
            Some(Err(message)) => bail!("{}", message),
            None => bail!("unexpected command: {}", command),
        }
    }

    fn stream(
        &self,
        command: &CommandSpec,
        sink: Arc<Mutex<vt100::Parser>>,
        _cols: u16,
        _rows: u16,
    ) -> Result<RunHandle> {
        self.streamed.lock().unwrap().push(command.clone());
        if let Some(message) = &self.stream_error {
            bail!("{}", message);
        }

        {
            let mut parser = sink.lock().unwrap();
            for chunk in &self.chunks {
                parser.process(chunk);
            }
        }

        let (handle, reporter) = RunHandle::new(command.display_line());
        self.reporters.lock().unwrap().push(reporter);
        Ok(handle)
    }
}

/// App over `/opt/playbooks` with the default theme
pub fn create_test_app() -> App {
    App::new(
        "/opt/playbooks".to_string(),
        Theme::default_theme().clone(),
        1_000,
    )
}

/// App mounted against `spawner`
pub fn mounted_app(spawner: &FakeSpawner) -> App {
    let mut app = create_test_app();
    app.mount(spawner);
    app
}

//! # UI Module
//!
//! Terminal user interface of the playbook runner.
//!
//! ## Components
//!
//! - [`App`] - Panel state (form fields, dropdowns, current run, output)
//! - [`keys`] - Key bindings mapped onto [`App`] operations
//! - [`mod@render`] - Drawing the panel from [`App`]
//! - [`OutputLog`] - Bounded, text-only buffer of run output
//! - [`terminal_widget`] - Widget drawing an [`OutputLog`]
//! - [`config`] / [`theme`] - User configuration and color themes
//!
//! ## Layout
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                    Header                        │
//! ├───────────────────┬─────────────────────────────┤
//! │ Run Ansible       │                             │
//! │ Playbook          │          Output             │
//! │  Folder           │   (streamed run output)     │
//! │  Playbook ◀ ▶     │                             │
//! │  Extra Arguments  │                             │
//! │  Image ◀ ▶        │                             │
//! │  [x] Container    │                             │
//! │  [Load] [Run]     │                             │
//! │  Command preview  │                             │
//! ├───────────────────┴─────────────────────────────┤
//! │                    Footer                        │
//! └─────────────────────────────────────────────────┘
//! ```

pub mod app;
pub mod config;
pub mod keys;
pub mod output;
pub mod render;
pub mod terminal_widget;
pub mod theme;

pub use app::App;
pub use output::OutputLog;
pub use render::render;

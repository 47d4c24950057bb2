//! # Output Log
//!
//! The output pane's buffer. Streamed bytes go through a `vt100` parser, so
//! playbook output is only ever interpreted as terminal text (colors and
//! cursor movement), never as markup. The parser keeps a fixed number of
//! scrollback rows, which bounds memory for long runs.

use std::sync::{Arc, Mutex};

/// Default number of scrollback rows kept for a run
pub const DEFAULT_SCROLLBACK_LINES: usize = 10_000;

/// Bounded terminal-text buffer shared with the process reader thread
pub struct OutputLog {
    parser: Arc<Mutex<vt100::Parser>>,
    scrollback: usize,
}

impl OutputLog {
    pub fn new(rows: u16, cols: u16, scrollback: usize) -> Self {
        Self {
            parser: Arc::new(Mutex::new(vt100::Parser::new(
                rows.max(1),
                cols.max(1),
                scrollback,
            ))),
            scrollback,
        }
    }

    /// The parser handed to spawners as the output sink
    pub fn parser(&self) -> &Arc<Mutex<vt100::Parser>> {
        &self.parser
    }

    /// Drop all output and start over with a fresh screen of the given size.
    ///
    /// The parser is replaced in place, so sinks already handed out keep
    /// pointing at the live buffer.
    pub fn reset(&mut self, rows: u16, cols: u16) {
        if let Ok(mut parser) = self.parser.lock() {
            *parser = vt100::Parser::new(rows.max(1), cols.max(1), self.scrollback);
        }
    }

    /// Append raw output bytes after everything received so far.
    pub fn append(&self, bytes: &[u8]) {
        if let Ok(mut parser) = self.parser.lock() {
            parser.process(bytes);
        }
    }

    /// Append a line of plain text, starting on a fresh line.
    pub fn append_line(&self, text: &str) {
        if let Ok(mut parser) = self.parser.lock() {
            let (_, col) = parser.screen().cursor_position();
            if col > 0 {
                parser.process(b"\r\n");
            }
            // Escape bytes in our own messages must not drive the terminal
            let cleaned: String = text
                .chars()
                .map(|c| if c.is_control() { ' ' } else { c })
                .collect();
            parser.process(cleaned.as_bytes());
            parser.process(b"\r\n");
        }
    }

    /// Text currently on the visible screen
    pub fn contents(&self) -> String {
        self.parser
            .lock()
            .map(|p| p.screen().contents())
            .unwrap_or_default()
    }

    /// Number of scrollback rows available above the screen
    pub fn max_scrollback(&self) -> usize {
        let mut parser = match self.parser.lock() {
            Ok(p) => p,
            Err(_) => return 0,
        };
        let original = parser.screen().scrollback();
        parser.screen_mut().set_scrollback(usize::MAX);
        let max = parser.screen().scrollback();
        parser.screen_mut().set_scrollback(original);
        max
    }
}

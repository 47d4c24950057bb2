//! # Output Pane Widget
//!
//! Renders the `vt100` screen behind an [`OutputLog`] into a ratatui buffer,
//! keeping the colors and attributes `ansible-playbook` emits.
//!
//! `scroll_offset` counts rows back from the bottom (0 = newest output) and
//! maps directly onto vt100's `set_scrollback`, which shifts what `cell()`
//! returns. The offset is applied only while drawing and restored afterwards,
//! so the reader thread keeps writing to the live screen.

use crate::ui::output::OutputLog;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};

fn vt100_color_to_ratatui(color: vt100::Color) -> Option<Color> {
    match color {
        vt100::Color::Default => None,
        vt100::Color::Idx(idx) => Some(Color::Indexed(idx)),
        vt100::Color::Rgb(r, g, b) => Some(Color::Rgb(r, g, b)),
    }
}

fn cell_style(cell: &vt100::Cell, base: Style) -> Style {
    let mut style = base;
    if let Some(fg) = vt100_color_to_ratatui(cell.fgcolor()) {
        style = style.fg(fg);
    }
    if let Some(bg) = vt100_color_to_ratatui(cell.bgcolor()) {
        style = style.bg(bg);
    }
    if cell.bold() {
        style = style.add_modifier(Modifier::BOLD);
    }
    if cell.italic() {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if cell.underline() {
        style = style.add_modifier(Modifier::UNDERLINED);
    }
    if cell.inverse() {
        style = style.add_modifier(Modifier::REVERSED);
    }
    style
}

/// Widget drawing the output pane contents
pub struct TerminalView<'a> {
    output: &'a OutputLog,
    scroll_offset: usize,
    base_style: Style,
}

impl<'a> TerminalView<'a> {
    pub fn new(output: &'a OutputLog) -> Self {
        Self {
            output,
            scroll_offset: 0,
            base_style: Style::default(),
        }
    }

    pub fn scroll_offset(mut self, offset: usize) -> Self {
        self.scroll_offset = offset;
        self
    }

    /// Style used for cells that carry no colors of their own
    pub fn base_style(mut self, style: Style) -> Self {
        self.base_style = style;
        self
    }
}

impl Widget for TerminalView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut parser = match self.output.parser().lock() {
            Ok(p) => p,
            Err(_) => return,
        };

        let original_scrollback = parser.screen().scrollback();
        parser.screen_mut().set_scrollback(self.scroll_offset);

        {
            let screen = parser.screen();
            let (screen_rows, screen_cols) = screen.size();
            let rows = area.height.min(screen_rows);
            let cols = area.width.min(screen_cols);

            for y in 0..rows {
                for x in 0..cols {
                    if let Some(cell) = screen.cell(y, x) {
                        let contents = cell.contents();
                        let ch = if contents.is_empty() { " " } else { contents };
                        buf.set_string(
                            area.x + x,
                            area.y + y,
                            ch,
                            cell_style(cell, self.base_style),
                        );
                    }
                }
            }
        }

        parser.screen_mut().set_scrollback(original_scrollback);
    }
}

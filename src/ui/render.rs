use crate::spawn::ExecutionStatus;
use crate::ui::app::{App, FocusField, StatusLevel};
use crate::ui::keys::PaneSize;
use crate::ui::terminal_widget::TerminalView;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Screen regions of the panel
struct PanelLayout {
    header: Rect,
    form: Rect,
    output: Rect,
    footer: Rect,
}

fn panel_layout(area: Rect) -> PanelLayout {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Body
            Constraint::Length(1), // Footer
        ])
        .split(area);

    let body_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(main_chunks[1]);

    PanelLayout {
        header: main_chunks[0],
        form: body_chunks[0],
        output: body_chunks[1],
        footer: main_chunks[2],
    }
}

/// Inner size of the output pane for a terminal of the given size.
///
/// Used to size the PTY so playbook output wraps where it is displayed.
pub fn output_pane_size(width: u16, height: u16) -> PaneSize {
    let layout = panel_layout(Rect::new(0, 0, width, height));
    PaneSize {
        cols: layout.output.width.saturating_sub(2).max(20),
        rows: layout.output.height.saturating_sub(2).max(5),
    }
}

pub fn render(frame: &mut Frame, app: &App) {
    let layout = panel_layout(frame.area());

    frame.render_widget(
        Block::default().style(Style::default().bg(app.theme.bg)),
        frame.area(),
    );

    render_header(frame, app, layout.header);
    render_form(frame, app, layout.form);
    render_output(frame, app, layout.output);
    render_footer(frame, app, layout.footer);

    if app.show_help {
        render_help(frame, app);
    }
}

fn status_style(app: &App, status: ExecutionStatus) -> Style {
    let color = match status {
        ExecutionStatus::Idle => app.theme.fg_dim,
        ExecutionStatus::Running | ExecutionStatus::Cancelled => app.theme.warning,
        ExecutionStatus::Succeeded => app.theme.success,
        ExecutionStatus::Failed => app.theme.error,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled(
            "  pbrun ",
            Style::default()
                .fg(app.theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("· Run Ansible Playbook", Style::default().fg(app.theme.fg)),
    ];

    if app.run_status != ExecutionStatus::Idle {
        spans.push(Span::raw("   "));
        spans.push(Span::styled(
            format!("● {}", app.run_status.label()),
            status_style(app, app.run_status),
        ));
        if let Some(run) = &app.run {
            spans.push(Span::styled(
                format!("  {:.0}s", run.elapsed().as_secs_f32()),
                Style::default().fg(app.theme.fg_dim),
            ));
        }
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.accent)),
    );

    frame.render_widget(header, area);
}

fn border_style(app: &App, field: FocusField) -> Style {
    if app.focus == field {
        Style::default().fg(app.theme.accent)
    } else {
        Style::default().fg(app.theme.fg_dim)
    }
}

fn field_block(app: &App, field: FocusField, title: &'static str) -> Block<'static> {
    let mut block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(border_style(app, field));
    if app.focus == field {
        block = block.style(Style::default().bg(app.theme.field_bg));
    }
    block
}

fn text_field<'a>(app: &App, field: FocusField, value: &'a str, placeholder: &'a str) -> Line<'a> {
    let cursor = if app.focus == field { "▏" } else { "" };
    if value.is_empty() {
        Line::from(vec![
            Span::raw(cursor),
            Span::styled(placeholder, Style::default().fg(app.theme.fg_dim)),
        ])
    } else {
        Line::from(vec![
            Span::styled(value, Style::default().fg(app.theme.fg)),
            Span::raw(cursor),
        ])
    }
}

fn dropdown<'a>(app: &App, selected: Option<usize>, items: &'a [String], empty: &'a str) -> Line<'a> {
    match selected.and_then(|i| items.get(i).map(|item| (i, item))) {
        Some((i, item)) => Line::from(vec![
            Span::styled("◀ ", Style::default().fg(app.theme.fg_dim)),
            Span::styled(
                item.as_str(),
                Style::default()
                    .fg(app.theme.secondary)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" ▶  ({}/{})", i + 1, items.len()),
                Style::default().fg(app.theme.fg_dim),
            ),
        ]),
        None => Line::from(Span::styled(empty, Style::default().fg(app.theme.fg_dim))),
    }
}

fn button<'a>(app: &App, field: FocusField, label: &'a str) -> Span<'a> {
    let style = if app.focus == field {
        Style::default()
            .fg(app.theme.bg)
            .bg(app.theme.accent)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(app.theme.accent)
    };
    Span::styled(format!("[ {} ]", label), style)
}

fn render_form(frame: &mut Frame, app: &App, area: Rect) {
    let outer = Block::default()
        .borders(Borders::ALL)
        .title("📋 Run Ansible Playbook")
        .border_style(Style::default().fg(app.theme.fg_dim));
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Folder
            Constraint::Length(3), // Playbook
            Constraint::Length(3), // Extra args
            Constraint::Length(3), // Image
            Constraint::Length(1), // Checkbox
            Constraint::Length(1), // Buttons
            Constraint::Length(1), // Spacer
            Constraint::Min(0),    // Command preview
        ])
        .split(inner);

    let folder = Paragraph::new(text_field(
        app,
        FocusField::Folder,
        &app.folder_input,
        "/opt/playbooks",
    ))
    .block(field_block(app, FocusField::Folder, "Playbook Folder"));
    frame.render_widget(folder, rows[0]);

    let playbook = Paragraph::new(dropdown(
        app,
        app.selected_playbook,
        &app.playbooks,
        "No playbooks found",
    ))
    .block(field_block(app, FocusField::Playbook, "Select Playbook"));
    frame.render_widget(playbook, rows[1]);

    let extra = Paragraph::new(text_field(
        app,
        FocusField::ExtraArgs,
        &app.extra_args,
        "Enter extra arguments",
    ))
    .block(field_block(app, FocusField::ExtraArgs, "Extra Arguments"));
    frame.render_widget(extra, rows[2]);

    let image = Paragraph::new(dropdown(
        app,
        app.selected_image,
        &app.images,
        "No execution environment images",
    ))
    .block(field_block(app, FocusField::Image, "Container Image"));
    frame.render_widget(image, rows[3]);

    let check = if app.run_in_container { "[x]" } else { "[ ]" };
    let check_style = if app.focus == FocusField::RunInContainer {
        Style::default()
            .fg(app.theme.accent)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(app.theme.fg)
    };
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(format!(" {} ", check), check_style),
            Span::styled("Run in Container", check_style),
        ])),
        rows[4],
    );

    let run_label = if app.is_running() {
        "Running…"
    } else {
        "Run Playbook"
    };
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::raw(" "),
            button(app, FocusField::LoadButton, "Load Playbooks"),
            Span::raw("  "),
            button(app, FocusField::RunButton, run_label),
        ])),
        rows[5],
    );

    let preview = match app.command_preview() {
        Some(Ok(command)) => vec![
            Line::from(Span::styled(
                "Command:",
                Style::default().fg(app.theme.fg_dim),
            )),
            Line::from(Span::styled(
                command.display_line(),
                Style::default().fg(app.theme.secondary),
            )),
        ],
        Some(Err(e)) => vec![Line::from(Span::styled(
            e.to_string(),
            Style::default().fg(app.theme.error),
        ))],
        None => vec![Line::from(Span::styled(
            "Select a playbook to run",
            Style::default().fg(app.theme.fg_dim),
        ))],
    };
    frame.render_widget(
        Paragraph::new(preview).wrap(Wrap { trim: false }),
        rows[7],
    );
}

fn render_output(frame: &mut Frame, app: &App, area: Rect) {
    let mut title = vec![Span::raw("💬 Output")];
    if app.output_scroll > 0 {
        title.push(Span::styled(
            format!("  ↑{}", app.output_scroll),
            Style::default().fg(app.theme.fg_dim),
        ));
    }

    let border = if app.focus == FocusField::Output {
        Style::default().fg(app.theme.accent)
    } else {
        match app.run_status {
            ExecutionStatus::Idle => Style::default().fg(app.theme.fg_dim),
            status => status_style(app, status).remove_modifier(Modifier::BOLD),
        }
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(Line::from(title))
        .border_style(border);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.has_output() {
        frame.render_widget(
            TerminalView::new(&app.output)
                .scroll_offset(app.output_scroll)
                .base_style(Style::default().fg(app.theme.fg)),
            inner,
        );
    } else {
        let hint = Paragraph::new(Line::from(Span::styled(
            "Playbook output appears here",
            Style::default().fg(app.theme.fg_dim),
        )));
        frame.render_widget(hint, inner);
    }
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let line = match &app.status_message {
        Some(message) => {
            let color = match message.level {
                StatusLevel::Info => app.theme.fg_dim,
                StatusLevel::Warning => app.theme.warning,
                StatusLevel::Error => app.theme.error,
            };
            Line::from(Span::styled(
                format!(" {}", message.text),
                Style::default().fg(color),
            ))
        }
        None => {
            let hints = match app.focus {
                FocusField::Output => {
                    " [j/k] Scroll  [Ctrl+d/u] Half page  [G/gg] Bottom/Top  [q] Form  [Ctrl+c] Cancel"
                }
                _ => {
                    " [Tab] Next  [↑↓] Choose  [Space] Toggle  [Enter] Run  [Ctrl+r] Reload  [F1] Help  [Esc] Quit"
                }
            };
            Line::from(Span::styled(hints, Style::default().fg(app.theme.fg_dim)))
        }
    };

    frame.render_widget(Paragraph::new(line), area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn render_help(frame: &mut Frame, app: &App) {
    let key = |k: &'static str| {
        Span::styled(
            format!("{:<14}", k),
            Style::default()
                .fg(app.theme.secondary)
                .add_modifier(Modifier::BOLD),
        )
    };
    let desc = |d: &'static str| Span::styled(d, Style::default().fg(app.theme.fg));

    let lines = vec![
        Line::from(vec![key("Tab/Shift+Tab"), desc("Move between fields")]),
        Line::from(vec![key("↑↓ / j k"), desc("Change playbook or image")]),
        Line::from(vec![key("Space"), desc("Toggle Run in Container / press button")]),
        Line::from(vec![key("Enter"), desc("Load folder (folder field) or run")]),
        Line::from(vec![key("Ctrl+r"), desc("Reload playbooks and images")]),
        Line::from(vec![key("Ctrl+c"), desc("Cancel running playbook / quit")]),
        Line::from(vec![key("Esc"), desc("Quit")]),
        Line::from(""),
        Line::from(Span::styled(
            "Output pane",
            Style::default()
                .fg(app.theme.accent)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![key("j k"), desc("Scroll by line")]),
        Line::from(vec![key("Ctrl+d Ctrl+u"), desc("Scroll by half page")]),
        Line::from(vec![key("G / gg"), desc("Jump to bottom / top")]),
        Line::from(vec![key("q"), desc("Back to the form")]),
    ];

    let area = centered_rect(60, lines.len() as u16 + 2, frame.area());
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Keys  (F1 to close)")
                    .border_style(Style::default().fg(app.theme.accent)),
            )
            .style(Style::default().bg(app.theme.bg)),
        area,
    );
}

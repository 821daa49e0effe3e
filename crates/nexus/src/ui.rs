use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use mdcore::analytics;

use crate::app::App;
use crate::config::PreviewMode;
use crate::ui_state::{Mode, Severity};

pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title bar
            Constraint::Min(0),    // Editor / preview area
            Constraint::Length(2), // Status bar
        ])
        .split(f.size());

    draw_title_bar(f, app, chunks[0]);

    if app.ui_state.mode == Mode::Help {
        draw_help(f, chunks[1]);
    } else {
        draw_body(f, app, chunks[1]);
    }

    draw_status_bar(f, app, chunks[2]);

    if app.ui_state.mode == Mode::TokenPrompt {
        draw_token_prompt(f, app);
    }
}

fn draw_body(f: &mut Frame, app: &mut App, area: Rect) {
    match app.settings.preview_mode {
        PreviewMode::Side => {
            let panes = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(area);
            draw_editor(f, app, panes[0]);
            draw_preview(f, app, panes[1]);
        }
        PreviewMode::EditorOnly => draw_editor(f, app, area),
        PreviewMode::PreviewOnly => draw_preview(f, app, area),
    }
}

fn draw_editor(f: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Editor ")
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    f.render_widget(block, area);

    app.session
        .editor
        .set_viewport_height(inner.height as usize);

    let lines = app.session.editor.get_viewport_lines();
    let highlighted = app.highlighter.highlight_markdown(&lines);
    let content = Paragraph::new(highlighted);
    f.render_widget(content, inner);

    // Place the terminal cursor when it is inside the viewport
    let (cursor_line, cursor_col) = app.session.editor.cursor_position();
    let viewport_offset = app.session.editor.get_viewport_offset();
    if cursor_line >= viewport_offset && cursor_line < viewport_offset + inner.height as usize {
        let x = inner.x + cursor_col as u16;
        let y = inner.y + (cursor_line - viewport_offset) as u16;
        if x < inner.x + inner.width {
            f.set_cursor(x, y);
        }
    }
}

fn draw_preview(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Preview ")
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let preview = Paragraph::new(app.session.preview_html().to_string())
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(Color::Gray));
    f.render_widget(preview, inner);
}

fn draw_title_bar(f: &mut Frame, app: &App, area: Rect) {
    let gist_part = match app.session.gist_id() {
        Some(id) => format!("  gist:{}", id),
        None => String::from("  [unpublished]"),
    };
    let modified_part = if app.session.editor.is_modified() {
        " [Modified]"
    } else {
        ""
    };
    let auto_save_part = if app.settings.auto_save_enabled {
        match app.draft_last_saved() {
            Some(at) => format!(" [draft saved {}]", at.format("%H:%M:%S")),
            None => String::new(),
        }
    } else {
        String::from(" [auto-save off]")
    };

    let title = format!("  Nexus{}{}{}", gist_part, modified_part, auto_save_part);
    let title_bar = Paragraph::new(title)
        .style(Style::default().bg(Color::Blue).fg(Color::White))
        .alignment(Alignment::Left);
    f.render_widget(title_bar, area);
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Analytics + shortcuts
            Constraint::Length(1), // Status message
        ])
        .split(area);

    let content = app.session.editor.get_content();
    let words = analytics::word_count(&content);
    let stats = format!(
        " {} words | {} chars | {} lines | {} ",
        words,
        analytics::char_count(&content),
        analytics::line_count(&content),
        analytics::format_reading_time(analytics::reading_time_minutes(words)),
    );

    let shortcuts = vec![
        Span::raw(stats),
        Span::styled(
            "^S",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" Save gist  "),
        Span::styled(
            "^E",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" Export  "),
        Span::styled(
            "F1",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" Help"),
    ];
    let shortcut_bar =
        Paragraph::new(Line::from(shortcuts)).style(Style::default().bg(Color::DarkGray));
    f.render_widget(shortcut_bar, chunks[0]);

    if let Some(message) = app.ui_state.status_message() {
        let color = match message.severity {
            Severity::Info => Color::Cyan,
            Severity::Success => Color::Green,
            Severity::Warning => Color::Yellow,
            Severity::Error => Color::Red,
        };
        let status =
            Paragraph::new(message.content.clone()).style(Style::default().fg(color));
        f.render_widget(status, chunks[1]);
    }
}

fn draw_token_prompt(f: &mut Frame, app: &App) {
    let area = centered_rect(60, 5, f.size());
    f.render_widget(Clear, area);

    // Mask the token like a password field
    let masked: String = app.ui_state.token_buffer().chars().map(|_| '*').collect();
    let prompt = Paragraph::new(vec![
        Line::from(" A GitHub access token is required to save gists."),
        Line::from(format!(" Token: {}", masked)),
        Line::from(Span::styled(
            " Enter to confirm, Esc to cancel",
            Style::default().add_modifier(Modifier::ITALIC),
        )),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Access Token ")
            .border_style(Style::default().fg(Color::Yellow)),
    );
    f.render_widget(prompt, area);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let help_text = vec![
        Line::from(""),
        Line::from(vec![Span::styled(
            " HELP -- Key Bindings",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from(" Document:"),
        Line::from("  Ctrl+S  Save           - Publish or update the gist"),
        Line::from("  Ctrl+E  Export HTML    - Copy rendered HTML to clipboard"),
        Line::from("  Ctrl+O  Export file    - Write document.md"),
        Line::from(""),
        Line::from(" View:"),
        Line::from("  Ctrl+T  Theme          - Toggle light/dark"),
        Line::from("  Ctrl+P  Layout         - Cycle editor/preview layout"),
        Line::from("  Ctrl+A  Auto-save      - Toggle draft auto-save"),
        Line::from(""),
        Line::from(" Movement:"),
        Line::from("  Arrow keys, Home, End, PageUp, PageDown"),
        Line::from(""),
        Line::from(" Exit:"),
        Line::from("  Ctrl+Q  Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Press Esc or F1 to close help",
            Style::default().add_modifier(Modifier::ITALIC),
        )]),
    ];

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help ")
                .border_style(Style::default().fg(Color::Blue)),
        )
        .alignment(Alignment::Left);

    f.render_widget(help, area);
}

fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}

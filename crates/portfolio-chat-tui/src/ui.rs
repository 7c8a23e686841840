use portfolio_chat_core::{ChatMessage, ChatRole, WidgetState};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::App;

const WIDGET_WIDTH: u16 = 56;
const WIDGET_HEIGHT: u16 = 24;
const LAUNCHER_WIDTH: u16 = 16;
const MARGIN: u16 = 1;

// Esc quits from the launcher, see handler::handle_closed
const HELP_TEXT: &str =
    " Enter: open assistant   Tab: minimize   Esc: close (quit when closed)   Ctrl-C: quit";

/// Render `**bold**` runs; everything else is plain text.
fn parse_markdown_line(text: &str) -> Line<'static> {
    let segments: Vec<&str> = text.split("**").collect();

    // An odd number of markers leaves the last one unclosed
    if segments.len() % 2 == 0 {
        return Line::from(text.to_string());
    }

    let spans: Vec<Span<'static>> = segments
        .into_iter()
        .enumerate()
        .filter(|(_, s)| !s.is_empty())
        .map(|(i, s)| {
            if i % 2 == 1 {
                Span::styled(s.to_string(), Style::default().add_modifier(Modifier::BOLD))
            } else {
                Span::raw(s.to_string())
            }
        })
        .collect();

    Line::from(spans)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    render_page(app, frame, area);

    match app.widget.state() {
        WidgetState::Closed => render_launcher(frame, area),
        WidgetState::Minimized => render_minimized(app, frame, area),
        WidgetState::Open => render_open(app, frame, area),
    }
}

/// Anchor a box of the given size to the bottom-right corner.
fn anchored(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(MARGIN * 2));
    let height = height.min(area.height.saturating_sub(MARGIN * 2));
    Rect::new(
        area.x + area.width.saturating_sub(width + MARGIN),
        area.y + area.height.saturating_sub(height + MARGIN),
        width,
        height,
    )
}

fn render_page(app: &App, frame: &mut Frame, area: Rect) {
    let knowledge = if app.knowledge.is_ready() {
        Span::styled("knowledge loaded", Style::default().fg(Color::Green))
    } else {
        Span::styled("knowledge loading...", Style::default().fg(Color::DarkGray))
    };

    let lines = vec![
        Line::from(Span::styled(" Portfolio ", Style::default().fg(Color::Cyan).bold())),
        Line::default(),
        Line::from(HELP_TEXT)
            .style(Style::default().fg(Color::DarkGray)),
        Line::default(),
        Line::from(vec![
            Span::raw(" "),
            Span::styled(
                format!("{}: {}", app.provider.display_name(), app.model),
                Style::default().fg(Color::DarkGray),
            ),
            Span::raw("  "),
            knowledge,
        ]),
    ];

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_launcher(frame: &mut Frame, area: Rect) {
    let launcher_area = anchored(area, LAUNCHER_WIDTH, 3);
    frame.render_widget(Clear, launcher_area);

    let launcher = Paragraph::new(Line::from(" Ask AI ").centered().bold())
        .style(Style::default().fg(Color::White).bg(Color::Blue))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Blue)));

    frame.render_widget(launcher, launcher_area);
}

fn widget_block(app: &App) -> Block<'static> {
    let title = if app.widget.is_pending() {
        " Ask AI (thinking) "
    } else {
        " Ask AI "
    };

    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue))
        .title(Span::styled(title, Style::default().fg(Color::White).bg(Color::Blue).bold()))
}

fn render_minimized(app: &App, frame: &mut Frame, area: Rect) {
    let bar_area = anchored(area, WIDGET_WIDTH, 3);
    frame.render_widget(Clear, bar_area);

    let hint = Paragraph::new(" Tab to expand, Esc to close")
        .style(Style::default().fg(Color::DarkGray))
        .block(widget_block(app));

    frame.render_widget(hint, bar_area);
}

fn render_open(app: &mut App, frame: &mut Frame, area: Rect) {
    let widget_area = anchored(area, WIDGET_WIDTH, WIDGET_HEIGHT);
    frame.render_widget(Clear, widget_area);

    let block = widget_block(app);
    let inner = block.inner(widget_area);
    frame.render_widget(block, widget_area);

    let [chat_area, input_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(3)]).areas(inner);

    // Record dimensions for scroll calculations
    app.chat_height = chat_area.height;
    app.chat_width = chat_area.width;

    let mut lines: Vec<Line> = Vec::new();
    for msg in app.widget.messages() {
        push_message(&mut lines, msg);
    }

    if app.widget.is_pending() {
        lines.push(Line::from(Span::styled(
            "AI",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    let chat = Paragraph::new(Text::from(lines))
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));
    frame.render_widget(chat, chat_area);

    render_input(app, frame, input_area);
}

fn push_message(lines: &mut Vec<Line<'static>>, msg: &ChatMessage) {
    let (label, color) = match msg.role {
        ChatRole::User => ("You", Color::Cyan),
        ChatRole::Assistant => ("AI", Color::Yellow),
    };

    lines.push(Line::from(vec![
        Span::styled(label, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(
            msg.timestamp.format("%H:%M").to_string(),
            Style::default().fg(Color::DarkGray),
        ),
    ]));

    for line in msg.content.lines() {
        lines.push(parse_markdown_line(line));
    }
    lines.push(Line::default());
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let accepts_input = app.widget.accepts_input();

    let (text, style) = if app.input.is_empty() {
        let placeholder = if accepts_input {
            "Type your question..."
        } else {
            "Waiting for reply..."
        };
        (placeholder.to_string(), Style::default().fg(Color::DarkGray))
    } else {
        (app.input.clone(), Style::default().fg(Color::White))
    };

    let offset = input_offset(app.input_cursor, area.width);
    let input = Paragraph::new(text)
        .style(style)
        .scroll((0, offset))
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    frame.render_widget(input, area);

    if accepts_input {
        let cursor_x = u16::try_from(app.input_cursor)
            .unwrap_or(u16::MAX)
            .saturating_sub(offset);
        frame.set_cursor_position((area.x + cursor_x, area.y + 1));
    }
}

/// Columns to skip so the cursor stays on the last visible column.
fn input_offset(cursor: usize, width: u16) -> u16 {
    let visible = width.saturating_sub(1) as usize;
    u16::try_from(cursor.saturating_sub(visible)).unwrap_or(u16::MAX)
}

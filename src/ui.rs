use ratatui::{
    layout::{Constraint, Layout, Position, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};

use crate::app::{App, InputMode};
use crate::render::LineRole;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let [header_area, input_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_input(app, frame, input_area);
    render_tree(app, frame, body_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let mut spans = vec![
        Span::styled(" Fractal Knowledge ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw("  "),
        Span::styled(
            format!("[{}]", app.language.as_str()),
            Style::default().fg(Color::DarkGray),
        ),
    ];

    if app.navigation.is_loading() {
        let dots = ".".repeat(app.animation_frame as usize + 1);
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("{}{}", app.strings().loading, dots),
            Style::default().fg(Color::Yellow),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;

    let border_style = if editing {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let shown = if app.input.is_empty() && !editing {
        Span::styled(
            app.strings().enter_concept,
            Style::default().fg(Color::DarkGray),
        )
    } else {
        Span::raw(app.input.as_str())
    };

    let input = Paragraph::new(Line::from(shown)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(format!(" {} ", app.strings().search)),
    );
    frame.render_widget(input, area);

    if editing {
        // Cursor sits after the glyph at input_cursor, inside the border.
        // Wide glyphs occupy two columns, so measure display width rather
        // than counting chars.
        let before_cursor: String = app.input.chars().take(app.input_cursor).collect();
        let cursor_col = Span::raw(before_cursor).width() as u16;
        let x = (area.x + 1).saturating_add(cursor_col);
        let max_x = area.right().saturating_sub(2);
        frame.set_cursor_position(Position::new(x.min(max_x), area.y + 1));
    }
}

fn render_tree(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Remember geometry for mouse hit-testing and scroll clamping.
    app.tree_area = Some(inner);
    app.view_height = inner.height;

    if app.lines.is_empty() {
        let hint = if app.navigation.is_loading() {
            String::new()
        } else {
            format!("  {}", app.strings().enter_concept)
        };
        frame.render_widget(
            Paragraph::new(hint).style(Style::default().fg(Color::DarkGray)),
            inner,
        );
        return;
    }

    let selected = app.selected_line;
    let text: Vec<Line> = app
        .lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let indent = "  ".repeat(line.depth);
            let (prefix, style) = match line.role {
                LineRole::Title => ("", Style::default().fg(Color::Cyan).bold()),
                LineRole::Value => ("", Style::default().fg(Color::Gray)),
                LineRole::Media => ("", Style::default().fg(Color::Magenta)),
                LineRole::PreviewItem => ("• ", Style::default().fg(Color::DarkGray)),
            };

            let style = if selected == Some(i) {
                style.add_modifier(Modifier::REVERSED)
            } else {
                style
            };

            Line::from(Span::styled(
                format!("{indent}{prefix}{}", line.text),
                style,
            ))
        })
        .collect();

    let paragraph = Paragraph::new(text).scroll((app.scroll, 0));
    frame.render_widget(paragraph, inner);

    if app.lines.len() as u16 > inner.height {
        let mut scrollbar_state =
            ScrollbarState::new(app.lines.len().saturating_sub(inner.height as usize))
                .position(app.scroll as usize);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            area,
            &mut scrollbar_state,
        );
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    if let Some(notice) = &app.notice {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                format!(" {notice}"),
                Style::default().fg(Color::Yellow),
            ))),
            area,
        );
        return;
    }

    let s = app.strings();
    let dim = Style::default().fg(Color::DarkGray);
    let off = Style::default().fg(Color::Black);

    let hint = |label: &str, key: &str, enabled: bool| -> Vec<Span<'static>> {
        let style = if enabled { dim } else { off };
        vec![
            Span::styled(format!(" {key}"), style.add_modifier(Modifier::BOLD)),
            Span::styled(format!(":{label} "), style),
        ]
    };

    let mut spans = Vec::new();
    spans.extend(hint(s.search, "/", true));
    spans.extend(hint(s.back, "b", app.navigation.back_len() > 0));
    spans.extend(hint(s.forward, "f", app.navigation.forward_len() > 0));
    spans.extend(hint(s.query_selected_text, "s", true));
    spans.extend(hint(s.search_online, "o", true));
    spans.extend(hint(s.quit, "q", true));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::App;
    use crate::config::Config;
    use ratatui::{backend::TestBackend, Terminal};

    fn editing_app(input: &str, cursor: usize) -> App {
        let (mut app, _rx) = App::new(&Config::default());
        app.input_mode = InputMode::Editing;
        app.input = input.to_string();
        app.input_cursor = cursor;
        app
    }

    #[test]
    fn test_render_survives_tiny_terminal() {
        let mut app = editing_app("jazz", 4);
        let mut terminal = Terminal::new(TestBackend::new(1, 1)).unwrap();
        terminal.draw(|frame| render(&mut app, frame)).unwrap();
    }

    #[test]
    fn test_cursor_tracks_wide_glyphs() {
        // Three double-width glyphs before the cursor: column 1 + 6.
        let mut app = editing_app("日本語", 3);
        let mut terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();
        terminal.draw(|frame| render(&mut app, frame)).unwrap();

        let pos = terminal.get_cursor_position().unwrap();
        assert_eq!(pos.x, 7);
        assert_eq!(pos.y, 2);
    }

    #[test]
    fn test_cursor_clamped_inside_input_border() {
        let mut app = editing_app("a very long query indeed", 24);
        let mut terminal = Terminal::new(TestBackend::new(10, 10)).unwrap();
        terminal.draw(|frame| render(&mut app, frame)).unwrap();

        let pos = terminal.get_cursor_position().unwrap();
        assert!(pos.x <= 8);
    }
}

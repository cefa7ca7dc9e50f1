pub mod app;

use std::io::{self, stdout};
use std::time::Duration;

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind, MouseButton,
        MouseEvent, MouseEventKind,
    },
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use sheetscout::display::{shorten_path, WidthMeasure};

use app::{App, Focus, InputField};

const TICK: Duration = Duration::from_millis(100);
const LABEL_WIDTH: u16 = 16;

/// Widget state that survives between frames
#[derive(Default)]
struct View {
    list: ListState,
    /// Inner area of the results list in the last frame
    results_area: Rect,
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    }
}

fn draw(frame: &mut Frame, app: &App, view: &mut View) {
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(6),
        Constraint::Min(3),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .split(frame.area());

    draw_title(frame, app, chunks[0]);
    draw_form(frame, app, chunks[1]);
    draw_results(frame, app, view, chunks[2]);
    draw_status(frame, app, chunks[3]);
    draw_hints(frame, app, chunks[4]);

    if let Some(notice) = &app.notice {
        draw_notice(frame, &notice.title, &notice.message, frame.area());
    }
}

fn draw_title(frame: &mut Frame, app: &App, area: Rect) {
    let state = if app.is_running() { "searching" } else { "idle" };
    let line = Line::from(vec![
        Span::styled(
            " sheetscout ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("  {}", state)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn input_line<'a>(label: &'a str, field: &'a InputField, focused: bool) -> Line<'a> {
    Line::from(vec![
        Span::styled(
            format!("{:<width$}", label, width = LABEL_WIDTH as usize),
            focus_style(focused),
        ),
        Span::raw(field.value.as_str()),
    ])
}

fn toggle_span(label: &str, on: bool, focused: bool) -> Span<'static> {
    let mark = if on { "[x]" } else { "[ ]" };
    Span::styled(format!("{} {}   ", mark, label), focus_style(focused))
}

fn draw_form(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Search ");
    let inner = block.inner(area);

    let lines = vec![
        input_line("Path", &app.path, app.focus == Focus::Path),
        input_line(
            "Filename match",
            &app.filename_match,
            app.focus == Focus::FilenameMatch,
        ),
        input_line("Search text", &app.search_text, app.focus == Focus::SearchText),
        Line::from(vec![
            toggle_span("Recursive", app.recursive, app.focus == Focus::Recursive),
            toggle_span("Include CSV", app.include_csv, app.focus == Focus::IncludeCsv),
            toggle_span(
                "Open in editor",
                app.open_in_editor,
                app.focus == Focus::OpenInEditor,
            ),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), area);

    let field_row = match app.focus {
        Focus::Path => Some((0, &app.path)),
        Focus::FilenameMatch => Some((1, &app.filename_match)),
        Focus::SearchText => Some((2, &app.search_text)),
        _ => None,
    };
    if let (Some((row, field)), None) = (field_row, &app.notice) {
        let before: String = field.value.chars().take(field.cursor).collect();
        let x = inner.x + LABEL_WIDTH + WidthMeasure::Columns.width(&before) as u16;
        if x < inner.right() {
            frame.set_cursor_position((x, inner.y + row));
        }
    }
}

fn draw_results(frame: &mut Frame, app: &App, view: &mut View, area: Rect) {
    let title = format!(" Results ({}) ", app.results.len());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focus_style(app.focus == Focus::Results))
        .title(title);
    view.results_area = block.inner(area);

    let items: Vec<ListItem> = app
        .results
        .iter()
        .map(|result| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    result.relative_path(app.base()),
                    Style::default().fg(Color::Blue),
                ),
                Span::raw("  "),
                Span::raw(result.joined_row()),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");

    view.list.select(app.selected);
    frame.render_stateful_widget(list, area, &mut view.list);
}

fn draw_status(frame: &mut Frame, app: &App, area: Rect) {
    let counts = format!(
        " {} scanned  {} found  {} unreadable ",
        app.status.scanned,
        app.results.len(),
        app.status.skipped
    );
    let available = (area.width as usize).saturating_sub(counts.len());

    let left = match (&app.status.current_dir, &app.status.summary) {
        (Some(dir), _) if app.is_running() => {
            let prefix = " Searching: ";
            let budget = available.saturating_sub(prefix.len());
            format!("{}{}", prefix, shorten_path(dir, budget, WidthMeasure::Columns))
        }
        (_, Some(summary)) => format!(" {}", summary),
        _ => " Ready".to_string(),
    };

    let padding = available.saturating_sub(WidthMeasure::Columns.width(&left));
    let status = format!("{}{:pad$}{}", left, "", counts, pad = padding);
    let para = Paragraph::new(Line::from(Span::styled(
        status,
        Style::default().fg(Color::Black).bg(Color::DarkGray),
    )))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(para, area);
}

fn draw_hints(frame: &mut Frame, app: &App, area: Rect) {
    let hints = if app.is_running() {
        " F6/Esc stop"
    } else if app.focus == Focus::Results {
        " F5 search  Enter open folder  Tab next  Esc quit"
    } else {
        " F5/Enter search  Tab next  Space toggle  Esc quit"
    };
    frame.render_widget(
        Paragraph::new(Span::styled(hints, Style::default().fg(Color::DarkGray))),
        area,
    );
}

fn draw_notice(frame: &mut Frame, title: &str, message: &str, area: Rect) {
    let width: u16 = 50.min(area.width);
    let height: u16 = 6.min(area.height);
    let popup = Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} ", title))
        .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .style(Style::default().bg(Color::Black));

    let lines = vec![
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            "Press Enter to close",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        popup,
    );
}

fn handle_mouse(app: &mut App, view: &View, mouse: MouseEvent) {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) || app.notice.is_some() {
        return;
    }
    let area = view.results_area;
    let inside = mouse.column >= area.x
        && mouse.column < area.right()
        && mouse.row >= area.y
        && mouse.row < area.bottom();
    if inside {
        let index = view.list.offset() + (mouse.row - area.y) as usize;
        app.click_result(index);
    }
}

/// Runs the interactive search window until the user quits
pub fn run(mut app: App) -> io::Result<()> {
    terminal::enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(EnableMouseCapture)?;

    struct Cleanup;
    impl Drop for Cleanup {
        fn drop(&mut self) {
            let _ = stdout().execute(DisableMouseCapture);
            let _ = stdout().execute(LeaveAlternateScreen);
            let _ = terminal::disable_raw_mode();
        }
    }
    let _cleanup = Cleanup;

    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    let mut view = View::default();

    while !app.should_quit {
        app.tick();
        terminal.draw(|frame| draw(frame, &app, &mut view))?;

        if event::poll(TICK)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Event::Mouse(mouse) => handle_mouse(&mut app, &view, mouse),
                _ => {}
            }
        }
    }

    Ok(())
}

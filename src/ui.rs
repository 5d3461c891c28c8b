use crate::app::{App, Overlay, MENU_ITEMS};
use crate::calendar::{DayCell, MONTH_NAMES, WEEKDAY_LABELS};
use crate::entry::JournalEntry;
use crate::form::DraftForm;
use crate::storage::Storage;
use color_eyre::Result;
use crossterm::{
    event::{self, Event, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io::{stdout, Stdout};
use unicode_width::UnicodeWidthChar;

pub struct UI {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl UI {
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;

        Ok(UI { terminal })
    }

    pub fn display<E, S>(&mut self, app: &App<E, S>) -> Result<()>
    where
        E: JournalEntry,
        E::Draft: DraftForm,
        S: Storage,
    {
        self.terminal.draw(|f| draw(f, app))?;
        Ok(())
    }

    /// Blocks until the next key press.
    pub fn next_key(&self) -> Result<KeyEvent> {
        loop {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(key);
                }
            }
        }
    }
}

impl Drop for UI {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}

fn draw<E, S>(f: &mut Frame, app: &App<E, S>)
where
    E: JournalEntry,
    E::Draft: DraftForm,
    S: Storage,
{
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(12),
            Constraint::Length(3),
        ])
        .split(f.area());

    let title = Paragraph::new(format!("{}  ·  {}", E::TITLE, app.view().title()))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(title, chunks[0]);

    let header_cells = Layout::horizontal([Constraint::Ratio(1, 7); 7]).split(chunks[1]);
    for (label, area) in WEEKDAY_LABELS.iter().zip(header_cells.iter()) {
        let color = match *label {
            "Sun" => Color::Red,
            "Sat" => Color::Blue,
            _ => Color::Gray,
        };
        let header = Paragraph::new(*label)
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center);
        f.render_widget(header, *area);
    }

    draw_grid(f, app, chunks[2]);

    let status = if app.query().is_empty() {
        Line::from(Span::raw(format!("{} entries", app.store().len())))
    } else {
        Line::from(vec![
            Span::raw(format!("{} entries · search ", app.store().len())),
            Span::styled(
                format!("\"{}\"", app.query()),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(" matched {} day(s), Esc clears", app.highlights().len())),
        ])
    };
    let controls = Line::from(vec![
        Span::raw("←↑↓→: Move, "),
        Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(": Open, [ ]: Month, { }: Year, g: Go to, t: Today, "),
        Span::styled("/", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(": Search, "),
        Span::styled("m", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(": Menu, "),
        Span::styled("q", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(": Quit"),
    ]);
    let footer = Paragraph::new(vec![status, controls])
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center);
    f.render_widget(footer, chunks[3]);

    if app.editor().is_open() {
        draw_editor(f, app);
    }

    match app.overlay() {
        Overlay::None => {}
        Overlay::Menu { selected } => draw_menu(f, *selected),
        Overlay::Search { input } => draw_search(f, input),
        Overlay::Jump {
            year,
            month0,
            on_year,
        } => draw_jump(f, *year, *month0, *on_year),
        Overlay::Confirm { prompt, .. } => {
            draw_message(f, "Confirm", prompt, "y: Yes, n: No", Color::Red)
        }
        Overlay::Notice(message) => {
            draw_message(f, "Notice", message, "Any key: Close", Color::Cyan)
        }
    }
}

fn draw_grid<E, S>(f: &mut Frame, app: &App<E, S>, area: Rect)
where
    E: JournalEntry,
    E::Draft: DraftForm,
    S: Storage,
{
    let grid = app.grid();
    let rows = Layout::vertical([Constraint::Ratio(1, 6); 6]).split(area);
    for (week, row) in grid.chunks(7).zip(rows.iter()) {
        let columns = Layout::horizontal([Constraint::Ratio(1, 7); 7]).split(*row);
        for (cell, column) in week.iter().zip(columns.iter()) {
            draw_cell(f, cell, cell.date == app.selected(), *column);
        }
    }
}

fn draw_cell(f: &mut Frame, cell: &DayCell, selected: bool, area: Rect) {
    let mut border = Style::default().fg(Color::DarkGray);
    if cell.is_today {
        border = Style::default().fg(Color::Cyan);
    }
    if selected {
        border = Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD);
    }

    let day_style = if !cell.in_month {
        Style::default().fg(Color::DarkGray)
    } else if cell.highlighted {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Magenta)
            .add_modifier(Modifier::BOLD)
    } else if cell.is_today {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(if selected {
            BorderType::Thick
        } else {
            BorderType::Plain
        })
        .border_style(border)
        .title(Span::styled(format!("{:>2}", cell.day()), day_style));
    let inner_width = area.width.saturating_sub(2) as usize;

    let preview = cell
        .preview
        .as_deref()
        .map(|p| truncate_to_width(p, inner_width))
        .unwrap_or_default();
    let body = Paragraph::new(preview)
        .style(Style::default().fg(Color::Green))
        .block(block);
    f.render_widget(body, area);
}

/// Cuts `text` to at most `width` terminal columns, marking the cut with `…`.
fn truncate_to_width(text: &str, width: usize) -> String {
    let total: usize = text.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    if width > 0 {
        out.push('…');
    }
    out
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    cell
}

fn draw_editor<E, S>(f: &mut Frame, app: &App<E, S>)
where
    E: JournalEntry,
    E::Draft: DraftForm,
    S: Storage,
{
    let (Some(date), Some(draft), Some(cursor)) = (
        app.editor().date(),
        app.editor().draft(),
        app.form_cursor(),
    ) else {
        return;
    };

    let screen = f.area();
    let area = centered(
        screen,
        screen.width.saturating_sub(8).max(40),
        screen.height.saturating_sub(4).max(16),
    );
    f.render_widget(Clear, area);

    let dirty = if app.editor().is_dirty() { " *" } else { "" };
    let outer = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(format!("{} · {date}{dirty}", E::TITLE))
        .style(Style::default().bg(Color::Black));
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let [body, hint_area] =
        Layout::vertical([Constraint::Min(6), Constraint::Length(2)]).areas(inner);
    draft.render(cursor, f, body);

    let hints = Paragraph::new(<E::Draft as DraftForm>::hints())
        .style(Style::default().fg(Color::Yellow))
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center);
    f.render_widget(hints, hint_area);
}

fn draw_menu(f: &mut Frame, selected: usize) {
    let area = centered(f.area(), 32, MENU_ITEMS.len() as u16 + 2);
    f.render_widget(Clear, area);
    let items: Vec<ListItem> = MENU_ITEMS
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let style = if i == MENU_ITEMS.len() - 1 {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };
            ListItem::new(*label).style(style)
        })
        .collect();
    let menu = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Menu"))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    f.render_stateful_widget(
        menu,
        area,
        &mut ListState::default().with_selected(Some(selected)),
    );
}

fn draw_search(f: &mut Frame, input: &str) {
    let area = centered(f.area(), 50, 4);
    f.render_widget(Clear, area);
    let search = Paragraph::new(vec![
        Line::from(format!("{input}|")),
        Line::from(Span::styled(
            "Enter: Search, Esc: Cancel",
            Style::default().fg(Color::Yellow),
        )),
    ])
    .block(Block::default().borders(Borders::ALL).title("Search Entries"));
    f.render_widget(search, area);
}

fn draw_jump(f: &mut Frame, year: i32, month0: u32, on_year: bool) {
    let area = centered(f.area(), 40, 5);
    f.render_widget(Clear, area);
    let focus = |active: bool| {
        if active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        }
    };
    let jump = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(format!(" {year} "), focus(on_year)),
            Span::raw("  "),
            Span::styled(format!(" {} ", MONTH_NAMES[month0 as usize]), focus(!on_year)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "↑/↓: Change, ←/→: Switch, Enter: Go, Esc: Cancel",
            Style::default().fg(Color::Yellow),
        )),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL).title("Go to month"));
    f.render_widget(jump, area);
}

fn draw_message(f: &mut Frame, title: &str, message: &str, hint: &str, color: Color) {
    let width = 56u16.min(f.area().width);
    let area = centered(f.area(), width, 7);
    f.render_widget(Clear, area);
    let body = Paragraph::new(vec![
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            hint.to_string(),
            Style::default().fg(Color::Yellow),
        )),
    ])
    .wrap(Wrap { trim: true })
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .title(title.to_string()),
    );
    f.render_widget(body, area);
}

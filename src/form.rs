use crate::diary_entry::DiaryDraft;
use crate::entry::Draft;
use crate::interview::{InterviewDraft, RecordField};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

pub trait DraftForm: Draft + PartialEq {
    /// Focus and caret state; lives beside the draft, never inside it.
    type Cursor: Clone + std::fmt::Debug;

    fn initial_cursor(&self) -> Self::Cursor;

    fn apply_key(&mut self, cursor: &mut Self::Cursor, key: KeyEvent);

    fn render(&self, cursor: &Self::Cursor, frame: &mut Frame, area: Rect);

    fn hints() -> &'static str;
}

fn byte_index(text: &str, char_idx: usize) -> usize {
    text.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

fn line_and_column(text: &str, cursor: usize) -> (usize, usize) {
    let before: Vec<char> = text.chars().take(cursor).collect();
    let line = before.iter().filter(|c| **c == '\n').count();
    let column = before.iter().rev().take_while(|c| **c != '\n').count();
    (line, column)
}

fn cursor_at(text: &str, line: usize, column: usize) -> usize {
    let mut offset = 0;
    for (index, content) in text.split('\n').enumerate() {
        let len = content.chars().count();
        if index == line {
            return offset + column.min(len);
        }
        offset += len + 1;
    }
    text.chars().count()
}

/// Shared caret editing for text fields. `cursor` counts chars, not bytes.
pub(crate) fn edit_text(text: &mut String, cursor: &mut usize, key: KeyEvent, multiline: bool) {
    let len = text.chars().count();
    *cursor = (*cursor).min(len);
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return;
    }
    match key.code {
        KeyCode::Char(c) => {
            let at = byte_index(text, *cursor);
            text.insert(at, c);
            *cursor += 1;
        }
        KeyCode::Enter if multiline => {
            let at = byte_index(text, *cursor);
            text.insert(at, '\n');
            *cursor += 1;
        }
        KeyCode::Backspace if *cursor > 0 => {
            let at = byte_index(text, *cursor - 1);
            text.remove(at);
            *cursor -= 1;
        }
        KeyCode::Delete if *cursor < len => {
            let at = byte_index(text, *cursor);
            text.remove(at);
        }
        KeyCode::Left => *cursor = cursor.saturating_sub(1),
        KeyCode::Right => *cursor = (*cursor + 1).min(len),
        KeyCode::Home => {
            let (line, _) = line_and_column(text, *cursor);
            *cursor = cursor_at(text, line, 0);
        }
        KeyCode::End => {
            let (line, _) = line_and_column(text, *cursor);
            *cursor = cursor_at(text, line, usize::MAX);
        }
        KeyCode::Up if multiline => {
            let (line, column) = line_and_column(text, *cursor);
            if line > 0 {
                *cursor = cursor_at(text, line - 1, column);
            }
        }
        KeyCode::Down if multiline => {
            let (line, column) = line_and_column(text, *cursor);
            if line < text.matches('\n').count() {
                *cursor = cursor_at(text, line + 1, column);
            }
        }
        _ => {}
    }
}

fn with_caret(text: &str, cursor: usize) -> String {
    let mut shown = text.to_string();
    shown.insert(byte_index(text, cursor), '|');
    shown
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiaryCursor {
    pub pos: usize,
}

impl DraftForm for DiaryDraft {
    type Cursor = DiaryCursor;

    fn initial_cursor(&self) -> DiaryCursor {
        DiaryCursor {
            pos: self.content.chars().count(),
        }
    }

    fn apply_key(&mut self, cursor: &mut DiaryCursor, key: KeyEvent) {
        edit_text(&mut self.content, &mut cursor.pos, key, true);
    }

    fn render(&self, cursor: &DiaryCursor, frame: &mut Frame, area: Rect) {
        let content = Paragraph::new(with_caret(&self.content, cursor.pos))
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title("Content"));
        frame.render_widget(content, area);
    }

    fn hints() -> &'static str {
        "Ctrl+S: Save, Ctrl+D: Delete day, Esc: Close"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterviewCursor {
    pub record: usize,
    pub field: usize,
    pub pos: usize,
}

impl InterviewCursor {
    fn field(&self) -> RecordField {
        RecordField::ALL[self.field]
    }
}

impl InterviewDraft {
    fn focus(&self, record: usize, field: usize, cursor: &mut InterviewCursor) {
        cursor.record = record.min(self.records.len().saturating_sub(1));
        cursor.field = field;
        cursor.pos = self
            .records
            .get(cursor.record)
            .map(|r| r.field(cursor.field()).chars().count())
            .unwrap_or(0);
    }

    fn cycle_option(&mut self, cursor: &InterviewCursor, forward: bool) {
        let field = cursor.field();
        let Some(options) = field.options() else {
            return;
        };
        let Some(record) = self.records.get_mut(cursor.record) else {
            return;
        };
        let current = options
            .iter()
            .position(|o| *o == record.field(field))
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % options.len()
        } else {
            (current + options.len() - 1) % options.len()
        };
        *record.field_mut(field) = options[next].to_string();
    }
}

impl DraftForm for InterviewDraft {
    type Cursor = InterviewCursor;

    fn initial_cursor(&self) -> InterviewCursor {
        let mut cursor = InterviewCursor {
            record: 0,
            field: 0,
            pos: 0,
        };
        self.focus(0, 0, &mut cursor);
        cursor
    }

    fn apply_key(&mut self, cursor: &mut InterviewCursor, key: KeyEvent) {
        let last_field = RecordField::ALL.len() - 1;
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('n') if ctrl => {
                self.add_record();
                self.focus(self.records.len() - 1, 0, cursor);
            }
            KeyCode::Char('r') if ctrl => {
                if let Some(id) = self.records.get(cursor.record).map(|r| r.id.clone()) {
                    self.remove_record(&id);
                }
                self.focus(cursor.record, 0, cursor);
            }
            KeyCode::Tab => {
                if cursor.field < last_field {
                    self.focus(cursor.record, cursor.field + 1, cursor);
                } else if cursor.record + 1 < self.records.len() {
                    self.focus(cursor.record + 1, 0, cursor);
                }
            }
            KeyCode::BackTab => {
                if cursor.field > 0 {
                    self.focus(cursor.record, cursor.field - 1, cursor);
                } else if cursor.record > 0 {
                    self.focus(cursor.record - 1, last_field, cursor);
                }
            }
            KeyCode::PageDown => self.focus(cursor.record + 1, cursor.field, cursor),
            KeyCode::PageUp => self.focus(cursor.record.saturating_sub(1), cursor.field, cursor),
            KeyCode::Left | KeyCode::Right if cursor.field().options().is_some() => {
                self.cycle_option(cursor, key.code == KeyCode::Right);
            }
            _ if cursor.field().options().is_none() => {
                let field = cursor.field();
                if let Some(record) = self.records.get_mut(cursor.record) {
                    let multiline = field == RecordField::Content;
                    edit_text(record.field_mut(field), &mut cursor.pos, key, multiline);
                }
            }
            _ => {}
        }
    }

    fn render(&self, cursor: &InterviewCursor, frame: &mut Frame, area: Rect) {
        let [list_area, form_area] =
            Layout::vertical([Constraint::Length(6), Constraint::Min(8)]).areas(area);

        let items: Vec<ListItem> = self
            .records
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let name = if r.student_name.trim().is_empty() {
                    "(no name)"
                } else {
                    r.student_name.as_str()
                };
                ListItem::new(format!("Record {}: {} / {}", i + 1, name, r.category))
            })
            .collect();
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Records ({})", self.records.len())),
            )
            .highlight_style(Style::default().add_modifier(Modifier::BOLD))
            .highlight_symbol("> ");
        let selected = (!self.records.is_empty()).then_some(cursor.record);
        frame.render_stateful_widget(
            list,
            list_area,
            &mut ListState::default().with_selected(selected),
        );

        let Some(record) = self.records.get(cursor.record) else {
            let empty = Paragraph::new("No records. Ctrl+N adds one; saving now clears the day.")
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(empty, form_area);
            return;
        };

        let mut lines = Vec::new();
        for (index, field) in RecordField::ALL.iter().enumerate() {
            let focused = index == cursor.field;
            let label_style = if focused {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Cyan)
            };
            let value = record.field(*field);
            let shown = match (field.options(), focused) {
                (Some(_), true) => format!("< {value} >"),
                (None, true) => with_caret(value, cursor.pos),
                _ => value.to_string(),
            };
            let mut value_lines = shown.split('\n');
            lines.push(Line::from(vec![
                Span::styled(format!("{:<11}", field.label()), label_style),
                Span::raw(value_lines.next().unwrap_or("").to_string()),
            ]));
            for rest in value_lines {
                lines.push(Line::from(format!("{:<11}{rest}", "")));
            }
        }

        let form = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Record {}", cursor.record + 1)),
        );
        frame.render_widget(form, form_area);
    }

    fn hints() -> &'static str {
        "Tab: Next field, ←/→: Choose, PgUp/PgDn: Record, Ctrl+N: Add, Ctrl+R: Remove, Ctrl+S: Save, Ctrl+D: Delete day, Esc: Close"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date_key::DateKey;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_text(text: &mut String, cursor: &mut usize, s: &str) {
        for c in s.chars() {
            edit_text(text, cursor, press(KeyCode::Char(c)), true);
        }
    }

    #[test]
    fn caret_editing_is_char_based() {
        let mut text = String::new();
        let mut cursor = 0;
        type_text(&mut text, &mut cursor, "日記");
        edit_text(&mut text, &mut cursor, press(KeyCode::Left), true);
        type_text(&mut text, &mut cursor, "の");
        assert_eq!(text, "日の記");
        edit_text(&mut text, &mut cursor, press(KeyCode::Backspace), true);
        edit_text(&mut text, &mut cursor, press(KeyCode::Delete), true);
        assert_eq!(text, "日");
        assert_eq!(cursor, 1);
    }

    #[test]
    fn up_and_down_keep_column() {
        let mut text = "abcd\nxy\nlonger".to_string();
        let mut cursor = 3;
        edit_text(&mut text, &mut cursor, press(KeyCode::Down), true);
        assert_eq!(cursor, 7); // end of "xy"
        edit_text(&mut text, &mut cursor, press(KeyCode::Down), true);
        assert_eq!(cursor, 10);
        edit_text(&mut text, &mut cursor, press(KeyCode::Up), true);
        edit_text(&mut text, &mut cursor, press(KeyCode::Up), true);
        assert_eq!(cursor, 2);
        edit_text(&mut text, &mut cursor, press(KeyCode::End), true);
        assert_eq!(cursor, 4);
    }

    #[test]
    fn single_line_fields_ignore_enter() {
        let mut text = "name".to_string();
        let mut cursor = 4;
        edit_text(&mut text, &mut cursor, press(KeyCode::Enter), false);
        assert_eq!(text, "name");
    }

    #[test]
    fn interview_form_tabs_cycles_and_adds() {
        let mut draft = InterviewDraft::open("2025-01-05".parse::<DateKey>().unwrap(), None);
        let mut cursor = draft.initial_cursor();
        for c in "Mori".chars() {
            draft.apply_key(&mut cursor, press(KeyCode::Char(c)));
        }
        draft.apply_key(&mut cursor, press(KeyCode::Tab));
        draft.apply_key(&mut cursor, press(KeyCode::Right));
        draft.apply_key(&mut cursor, press(KeyCode::Tab));
        draft.apply_key(&mut cursor, press(KeyCode::Left));
        assert_eq!(draft.records[0].student_name, "Mori");
        assert_eq!(draft.records[0].student_grade, "2");
        assert_eq!(draft.records[0].student_department, "その他");

        draft.apply_key(&mut cursor, ctrl('n'));
        assert_eq!(draft.records.len(), 2);
        assert_eq!(cursor.record, 1);
        assert_eq!(cursor.field, 0);

        draft.apply_key(&mut cursor, ctrl('r'));
        assert_eq!(draft.records.len(), 1);
        assert_eq!(cursor.record, 0);
    }
}

use crate::calendar::{build_grid, DayCell, MonthView};
use crate::date_key::DateKey;
use crate::editor::{DeleteOutcome, Editor, SaveOutcome};
use crate::entry::JournalEntry;
use crate::error::ExportError;
use crate::form::DraftForm;
use crate::record_store::RecordStore;
use crate::storage::Storage;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{error, info};

pub const MENU_ITEMS: [&str; 2] = ["Export", "Delete all entries"];

const DELETE_ALL_PROMPT: &str = "Really delete every entry? This cannot be undone.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    DeleteAll,
    DeleteDate,
}

/// Modal layers drawn over the calendar; at most one at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    None,
    Menu { selected: usize },
    Search { input: String },
    Jump { year: i32, month0: u32, on_year: bool },
    Confirm { prompt: String, action: PendingAction },
    Notice(String),
}

pub struct App<E, S>
where
    E: JournalEntry,
    E::Draft: DraftForm,
{
    store: RecordStore<E, S>,
    editor: Editor<E>,
    cursor: Option<<E::Draft as DraftForm>::Cursor>,
    view: MonthView,
    selected: DateKey,
    today: DateKey,
    highlights: BTreeSet<DateKey>,
    query: String,
    overlay: Overlay,
    export_dir: PathBuf,
}

impl<E, S> App<E, S>
where
    E: JournalEntry,
    E::Draft: DraftForm,
    S: Storage,
{
    pub fn new(store: RecordStore<E, S>, today: DateKey, export_dir: PathBuf) -> Self {
        App {
            store,
            editor: Editor::new(),
            cursor: None,
            view: MonthView::containing(today),
            selected: today,
            today,
            highlights: BTreeSet::new(),
            query: String::new(),
            overlay: Overlay::None,
            export_dir,
        }
    }

    /// Keeps the today marker right when the app stays open past midnight.
    pub fn refresh_today(&mut self, today: DateKey) {
        self.today = today;
    }

    pub fn store(&self) -> &RecordStore<E, S> {
        &self.store
    }

    pub fn editor(&self) -> &Editor<E> {
        &self.editor
    }

    pub fn form_cursor(&self) -> Option<&<E::Draft as DraftForm>::Cursor> {
        self.cursor.as_ref()
    }

    pub fn view(&self) -> MonthView {
        self.view
    }

    pub fn selected(&self) -> DateKey {
        self.selected
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn highlights(&self) -> &BTreeSet<DateKey> {
        &self.highlights
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn grid(&self) -> Vec<DayCell> {
        build_grid(self.view, self.today, &self.store, &self.highlights)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Control {
        // Confirmations and notices sit above the editor.
        match &self.overlay {
            Overlay::Confirm { .. } => {
                self.handle_confirm_key(key);
                return Control::Continue;
            }
            Overlay::Notice(_) => {
                self.overlay = Overlay::None;
                return Control::Continue;
            }
            _ => {}
        }

        if self.editor.is_open() {
            self.handle_editor_key(key);
            return Control::Continue;
        }

        match self.overlay {
            Overlay::Menu { .. } => self.handle_menu_key(key),
            Overlay::Search { .. } => self.handle_search_key(key),
            Overlay::Jump { .. } => self.handle_jump_key(key),
            _ => return self.handle_calendar_key(key),
        }
        Control::Continue
    }

    fn handle_calendar_key(&mut self, key: KeyEvent) -> Control {
        match key.code {
            KeyCode::Char('q') => return Control::Quit,
            KeyCode::Left => self.select(self.selected.succ_days(-1)),
            KeyCode::Right => self.select(self.selected.succ_days(1)),
            KeyCode::Up => self.select(self.selected.succ_days(-7)),
            KeyCode::Down => self.select(self.selected.succ_days(7)),
            KeyCode::Char('[') => self.show_month(self.view.prev_month()),
            KeyCode::Char(']') => self.show_month(self.view.next_month()),
            KeyCode::Char('{') => self.show_month(self.view.with_year(self.view.year() - 1)),
            KeyCode::Char('}') => self.show_month(self.view.with_year(self.view.year() + 1)),
            KeyCode::Char('t') => self.select(Some(self.today)),
            KeyCode::Char('g') => {
                self.overlay = Overlay::Jump {
                    year: self.view.year(),
                    month0: self.view.month0(),
                    on_year: true,
                }
            }
            KeyCode::Char('/') => {
                self.overlay = Overlay::Search {
                    input: self.query.clone(),
                }
            }
            KeyCode::Char('m') => self.overlay = Overlay::Menu { selected: 0 },
            KeyCode::Esc => {
                self.query.clear();
                self.highlights.clear();
            }
            KeyCode::Enter => self.open_editor(self.selected),
            _ => {}
        }
        Control::Continue
    }

    fn select(&mut self, date: Option<DateKey>) {
        let Some(date) = date else {
            return;
        };
        self.selected = date;
        if !self.view.contains(date) {
            self.view = MonthView::containing(date);
        }
    }

    /// Switches the displayed month, keeping the selected day of month
    /// where it exists.
    fn show_month(&mut self, view: MonthView) {
        self.view = view;
        let day = self.selected.day().min(view.days_in_month());
        if let Ok(date) = DateKey::from_calendar(view.year(), view.month0() as i32, day as i32) {
            self.selected = date;
        }
    }

    pub fn open_editor(&mut self, date: DateKey) {
        self.select(Some(date));
        self.editor.open(date, &self.store);
        self.cursor = self.editor.draft().map(|d| d.initial_cursor());
    }

    fn handle_editor_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => {
                self.editor.close();
                self.cursor = None;
            }
            KeyCode::Char('s') if ctrl => match self.editor.save(&mut self.store) {
                Ok(outcome) => {
                    self.cursor = None;
                    self.refresh_highlights();
                    if outcome == Some(SaveOutcome::Removed) {
                        self.overlay =
                            Overlay::Notice("Nothing to keep; the day was cleared.".into());
                    }
                }
                Err(err) => self.report(format!("Could not save: {err}")),
            },
            KeyCode::Char('d') if ctrl => self.request_delete_date(),
            _ => {
                let (Some(draft), Some(cursor)) = (self.editor.draft(), self.cursor.as_mut())
                else {
                    return;
                };
                let mut next = draft.clone();
                next.apply_key(cursor, key);
                if next != *draft {
                    self.editor.edit(|d| *d = next);
                }
            }
        }
    }

    fn request_delete_date(&mut self) {
        let stored = self
            .editor
            .date()
            .is_some_and(|date| self.store.get(date).is_some());
        self.overlay = if stored {
            Overlay::Confirm {
                prompt: E::DELETE_PROMPT.to_string(),
                action: PendingAction::DeleteDate,
            }
        } else {
            Overlay::Notice("Nothing is stored for this day.".into())
        };
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        let Overlay::Confirm { action, .. } = self.overlay.clone() else {
            return;
        };
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.overlay = Overlay::None;
                match action {
                    PendingAction::DeleteDate => {
                        match self.editor.delete(&mut self.store, |_| true) {
                            Ok(DeleteOutcome::Deleted) => {
                                self.cursor = None;
                                self.refresh_highlights();
                            }
                            Ok(_) => {}
                            Err(err) => self.report(format!("Could not delete: {err}")),
                        }
                    }
                    PendingAction::DeleteAll => match self.store.clear() {
                        Ok(()) => self.highlights.clear(),
                        Err(err) => self.report(format!("Could not delete: {err}")),
                    },
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.overlay = Overlay::None;
            }
            _ => {}
        }
    }

    fn handle_menu_key(&mut self, key: KeyEvent) {
        let Overlay::Menu { selected } = self.overlay else {
            return;
        };
        match key.code {
            KeyCode::Up => {
                self.overlay = Overlay::Menu {
                    selected: selected.saturating_sub(1),
                }
            }
            KeyCode::Down => {
                self.overlay = Overlay::Menu {
                    selected: (selected + 1).min(MENU_ITEMS.len() - 1),
                }
            }
            KeyCode::Enter => match selected {
                0 => self.export(),
                _ => {
                    self.overlay = Overlay::Confirm {
                        prompt: DELETE_ALL_PROMPT.to_string(),
                        action: PendingAction::DeleteAll,
                    }
                }
            },
            KeyCode::Esc | KeyCode::Char('m') => self.overlay = Overlay::None,
            _ => {}
        }
    }

    pub fn export(&mut self) {
        let result = E::export(&self.store.sorted(), self.today)
            .and_then(|file| file.write_to(&self.export_dir));
        self.overlay = match result {
            Ok(path) => Overlay::Notice(format!("Exported to {}", path.display())),
            Err(ExportError::NothingToExport) => {
                info!("export requested with an empty store");
                Overlay::Notice("There is nothing to export.".into())
            }
            Err(err) => {
                error!(error = %err, "export failed");
                Overlay::Notice(format!("Export failed: {err}"))
            }
        };
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        let Overlay::Search { input } = &mut self.overlay else {
            return;
        };
        match key.code {
            KeyCode::Enter => {
                let query = std::mem::take(input);
                self.overlay = Overlay::None;
                self.search(&query);
            }
            KeyCode::Esc => self.overlay = Overlay::None,
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => input.push(c),
            _ => {}
        }
    }

    /// Re-runs the current query so highlights follow the stored content.
    fn refresh_highlights(&mut self) {
        self.highlights = self.store.search(&self.query);
    }

    pub fn search(&mut self, query: &str) {
        self.query = query.trim().to_string();
        self.highlights = self.store.search(&self.query);
        info!(matches = self.highlights.len(), "search applied");
        if !self.query.is_empty() && self.highlights.is_empty() {
            self.overlay = Overlay::Notice(format!("No entries match \"{}\".", self.query));
        }
    }

    fn handle_jump_key(&mut self, key: KeyEvent) {
        let Overlay::Jump {
            year,
            month0,
            on_year,
        } = self.overlay
        else {
            return;
        };
        let years = self.view.year_options();
        let (year, month0, on_year) = match key.code {
            KeyCode::Left | KeyCode::Right | KeyCode::Tab => (year, month0, !on_year),
            KeyCode::Up if on_year => ((year - 1).max(*years.start()), month0, on_year),
            KeyCode::Down if on_year => ((year + 1).min(*years.end()), month0, on_year),
            KeyCode::Up => (year, (month0 + 11) % 12, on_year),
            KeyCode::Down => (year, (month0 + 1) % 12, on_year),
            KeyCode::Enter => {
                self.overlay = Overlay::None;
                self.show_month(self.view.with_year(year).with_month(month0));
                return;
            }
            KeyCode::Esc => {
                self.overlay = Overlay::None;
                return;
            }
            _ => return,
        };
        self.overlay = Overlay::Jump {
            year,
            month0,
            on_year,
        };
    }

    fn report(&mut self, message: String) {
        error!("{message}");
        self.overlay = Overlay::Notice(message);
    }
}

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use sheetscout::{
    export, host, CsvOptions, MatchResult, SearchError, SearchEvent, SearchReport,
    SearchWorker, Settings, WorkerMessage,
};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Messages drained from the worker per tick
const POLL_BUDGET: usize = 512;

/// Focusable controls, in tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Path,
    FilenameMatch,
    SearchText,
    Recursive,
    IncludeCsv,
    OpenInEditor,
    Results,
}

impl Focus {
    const ORDER: [Focus; 7] = [
        Focus::Path,
        Focus::FilenameMatch,
        Focus::SearchText,
        Focus::Recursive,
        Focus::IncludeCsv,
        Focus::OpenInEditor,
        Focus::Results,
    ];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    fn prev(self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    pub fn is_text(self) -> bool {
        matches!(self, Focus::Path | Focus::FilenameMatch | Focus::SearchText)
    }
}

/// Single-line text input with a char cursor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputField {
    pub value: String,
    /// Cursor position in chars
    pub cursor: usize,
}

impl InputField {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = value.chars().count();
        Self { value, cursor }
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    pub fn insert(&mut self, ch: char) {
        let at = self.byte_index(self.cursor);
        self.value.insert(at, ch);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        self.value.remove(at);
    }

    pub fn delete(&mut self) {
        if self.cursor < self.value.chars().count() {
            let at = self.byte_index(self.cursor);
            self.value.remove(at);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.value.chars().count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.value.chars().count();
    }
}

/// Modal message; any confirming key closes it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
}

/// Progress shown on the status line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Status {
    pub current_dir: Option<PathBuf>,
    pub scanned: usize,
    pub skipped: usize,
    /// Text shown once no search is running
    pub summary: Option<String>,
}

pub struct App {
    pub path: InputField,
    pub filename_match: InputField,
    pub search_text: InputField,
    pub recursive: bool,
    pub include_csv: bool,
    pub open_in_editor: bool,
    pub focus: Focus,
    pub results: Vec<MatchResult>,
    pub selected: Option<usize>,
    pub status: Status,
    pub notice: Option<Notice>,
    pub should_quit: bool,
    /// Base directory of the search the results belong to
    base: PathBuf,
    worker: SearchWorker,
    settings: Settings,
    settings_path: PathBuf,
    csv: CsvOptions,
}

impl App {
    pub fn new(settings: Settings, settings_path: PathBuf, csv: CsvOptions) -> Self {
        Self {
            path: InputField::new(settings.path.display().to_string()),
            filename_match: InputField::new(settings.filename_match.clone()),
            search_text: InputField::new(settings.search_text.clone()),
            recursive: settings.recursive_search,
            include_csv: settings.include_csv,
            open_in_editor: settings.open_in_editor,
            focus: Focus::Path,
            results: Vec::new(),
            selected: None,
            status: Status::default(),
            notice: None,
            should_quit: false,
            base: settings.path.clone(),
            worker: SearchWorker::new(),
            settings,
            settings_path,
            csv,
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_running()
    }

    fn field_mut(&mut self) -> Option<&mut InputField> {
        match self.focus {
            Focus::Path => Some(&mut self.path),
            Focus::FilenameMatch => Some(&mut self.filename_match),
            Focus::SearchText => Some(&mut self.search_text),
            _ => None,
        }
    }

    fn notify(&mut self, title: &str, message: impl Into<String>) {
        self.notice = Some(Notice {
            title: title.to_string(),
            message: message.into(),
        });
    }

    fn current_settings(&self) -> Settings {
        Settings {
            path: PathBuf::from(self.path.value.trim()),
            filename_match: self.filename_match.value.clone(),
            search_text: self.search_text.value.clone(),
            open_in_editor: self.open_in_editor,
            recursive_search: self.recursive,
            include_csv: self.include_csv,
            log_level: self.settings.log_level.clone(),
        }
    }

    /// Starts a search with the current inputs, or explains why not
    pub fn start_search(&mut self) {
        if self.is_running() {
            return;
        }

        let settings = self.current_settings();
        let request = settings.to_request(self.csv.clone());
        match self.worker.start(request) {
            Ok(()) => {
                info!("Search started from the terminal UI");
                self.settings = settings;
                self.base = self.settings.path.clone();
                self.results.clear();
                self.selected = None;
                self.status = Status::default();
            }
            Err(SearchError::MissingInput(field)) => {
                self.notify(
                    "Missing input",
                    format!("Please fill in the {} before searching.", field),
                );
            }
            Err(err) => self.notify("Cannot search", err.to_string()),
        }
    }

    pub fn stop_search(&mut self) {
        if self.is_running() {
            self.worker.stop();
            self.status.summary = Some("Stopping...".to_string());
        }
    }

    /// Applies whatever the worker produced since the last tick
    pub fn tick(&mut self) {
        for message in self.worker.poll(POLL_BUDGET) {
            self.apply(message);
        }
    }

    fn apply(&mut self, message: WorkerMessage) {
        match message {
            WorkerMessage::Event(SearchEvent::EnteredDirectory(dir)) => {
                self.status.current_dir = Some(dir);
            }
            WorkerMessage::Event(SearchEvent::Scanning(_)) => self.status.scanned += 1,
            WorkerMessage::Event(SearchEvent::Matched(result)) => {
                self.results.push(result);
                if self.selected.is_none() {
                    self.selected = Some(0);
                }
            }
            WorkerMessage::Event(SearchEvent::Skipped(_)) => self.status.skipped += 1,
            WorkerMessage::Finished(report) => self.finish(report),
            WorkerMessage::Failed(reason) => {
                error!("Search failed: {}", reason);
                self.status.summary = Some("Search failed".to_string());
                self.notify("Search failed", reason);
            }
        }
    }

    fn finish(&mut self, report: SearchReport) {
        self.status.current_dir = None;
        self.status.summary = Some(format!(
            "{}: {} matches in {} files",
            if report.was_stopped() { "Stopped" } else { "Done" },
            report.files_with_matches(),
            report.files_scanned
        ));

        if let Err(err) = self.settings.save_to(&self.settings_path) {
            warn!("Could not save settings: {}", err);
        }

        if report.should_notify_empty() {
            self.notify("Search finished", "No results found.");
            return;
        }

        if self.open_in_editor && !report.was_stopped() {
            let opened = export::export_to_temp_file(&self.base, &report.matches)
                .and_then(|path| host::open_with_default_app(&path));
            if let Err(err) = opened {
                warn!("Could not open exported results: {}", err);
                self.notify("Export failed", err.to_string());
            }
        }
    }

    /// Opens the folder of the selected result
    pub fn activate_selected(&mut self) {
        let Some(result) = self.selected.and_then(|i| self.results.get(i)) else {
            return;
        };
        let path = result.path.clone();
        if let Err(err) = host::reveal_in_file_manager(&path) {
            warn!("Could not reveal {}: {}", path.display(), err);
            self.notify("Cannot open folder", err.to_string());
        }
    }

    /// Handles a click on row `index` of the results list
    pub fn click_result(&mut self, index: usize) {
        if index >= self.results.len() {
            return;
        }
        self.focus = Focus::Results;
        if self.selected == Some(index) {
            self.activate_selected();
        } else {
            self.selected = Some(index);
        }
    }

    fn move_selection(&mut self, delta: isize) {
        if self.results.is_empty() {
            self.selected = None;
            return;
        }
        let last = self.results.len() - 1;
        let current = self.selected.unwrap_or(0) as isize;
        self.selected = Some((current + delta).clamp(0, last as isize) as usize);
    }

    fn toggle_focused(&mut self) {
        match self.focus {
            Focus::Recursive => self.recursive = !self.recursive,
            Focus::IncludeCsv => self.include_csv = !self.include_csv,
            Focus::OpenInEditor => self.open_in_editor = !self.open_in_editor,
            _ => {}
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.notice.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                self.notice = None;
            }
            return;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') if ctrl => {
                self.worker.stop();
                self.should_quit = true;
            }
            KeyCode::Char('r') if ctrl => self.start_search(),
            KeyCode::F(5) => self.start_search(),
            KeyCode::F(6) => self.stop_search(),
            KeyCode::Esc => {
                if self.is_running() {
                    self.stop_search();
                } else {
                    self.should_quit = true;
                }
            }
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.prev(),
            _ if self.focus.is_text() => self.edit_text(key),
            KeyCode::Char(' ') => self.toggle_focused(),
            KeyCode::Up if self.focus == Focus::Results => self.move_selection(-1),
            KeyCode::Down if self.focus == Focus::Results => self.move_selection(1),
            KeyCode::PageUp if self.focus == Focus::Results => self.move_selection(-10),
            KeyCode::PageDown if self.focus == Focus::Results => self.move_selection(10),
            KeyCode::Enter if self.focus == Focus::Results => self.activate_selected(),
            KeyCode::Enter => self.start_search(),
            KeyCode::Up => self.focus = self.focus.prev(),
            KeyCode::Down => self.focus = self.focus.next(),
            _ => {}
        }
    }

    fn edit_text(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                self.start_search();
                return;
            }
            KeyCode::Up => {
                self.focus = self.focus.prev();
                return;
            }
            KeyCode::Down => {
                self.focus = self.focus.next();
                return;
            }
            _ => {}
        }
        let Some(field) = self.field_mut() else {
            return;
        };
        match key.code {
            KeyCode::Char(ch) => field.insert(ch),
            KeyCode::Backspace => field.backspace(),
            KeyCode::Delete => field.delete(),
            KeyCode::Left => field.left(),
            KeyCode::Right => field.right(),
            KeyCode::Home => field.home(),
            KeyCode::End => field.end(),
            _ => {}
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }
}

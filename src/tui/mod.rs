pub mod widgets;

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use ratatui::DefaultTerminal;

use crate::config::{clamp_color_count, MAX_COLOR_COUNT, MIN_COLOR_COUNT};
use crate::export::ExportFormat;
use crate::history::PaletteHistoryStore;
use crate::pipeline::decode::ImageSource;
use crate::session::{Completion, ExtractionRequest, ExtractionResult, ExtractionSession};

use widgets::{ExportWidget, HistoryWidget, PaletteWidget};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Palette,
    History,
}

/// State for the interactive TUI application.
pub struct TuiApp {
    session: ExtractionSession,
    history: PaletteHistoryStore,
    view: View,
    export_open: bool,
    export_format: ExportFormat,
    selected: usize,
    status: String,
    should_quit: bool,
    tx: Sender<ExtractionResult>,
    rx: Receiver<ExtractionResult>,
}

impl TuiApp {
    pub fn new(history: PaletteHistoryStore, color_count: usize) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            session: ExtractionSession::new(clamp_color_count(color_count)),
            history,
            view: View::Palette,
            export_open: false,
            export_format: ExportFormat::default(),
            selected: 0,
            status: String::from("h: history  q: quit"),
            should_quit: false,
            tx,
            rx,
        }
    }

    /// Start extracting `path` in the background.
    pub fn open_image(&mut self, path: PathBuf) {
        let request = self.session.set_image(ImageSource::Path(path));
        self.view = View::Palette;
        self.dispatch(request);
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    fn dispatch(&mut self, request: ExtractionRequest) {
        self.status = format!("Extracting {} colors...", request.color_count);
        request.spawn(self.tx.clone());
    }

    /// Apply finished extractions without blocking.
    pub fn poll_results(&mut self) {
        while let Ok(result) = self.rx.try_recv() {
            self.apply(result);
        }
    }

    fn apply(&mut self, result: ExtractionResult) {
        match self.session.complete(result) {
            Completion::Applied => {
                let found = self.session.current().map_or(0, |p| p.colors.len());
                self.status = format!("Found {found} colors. s: save  e: export  +/-: count");
            }
            Completion::Stale => {}
            Completion::Failed(e) => self.status = format!("Error extracting colors: {e}"),
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('h') => self.toggle_history(),
            _ => match self.view {
                View::Palette => self.handle_palette_key(code),
                View::History => self.handle_history_key(code),
            },
        }
    }

    fn toggle_history(&mut self) {
        self.view = match self.view {
            View::Palette => View::History,
            View::History => View::Palette,
        };
        self.selected = self.selected.min(self.history.len().saturating_sub(1));
    }

    fn handle_palette_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Right => {
                self.change_color_count(1);
            }
            KeyCode::Char('-') | KeyCode::Left => self.change_color_count(-1),
            KeyCode::Char('s') => self.save_current(),
            KeyCode::Char('e') => self.export_open = !self.export_open,
            KeyCode::Char('f') => self.export_format = self.export_format.toggled(),
            _ => {}
        }
    }

    fn change_color_count(&mut self, delta: isize) {
        let count = self
            .session
            .color_count()
            .saturating_add_signed(delta)
            .clamp(MIN_COLOR_COUNT, MAX_COLOR_COUNT);
        if count == self.session.color_count() {
            return;
        }
        match self.session.set_color_count(count) {
            Some(request) => self.dispatch(request),
            None => self.status = format!("Number of colors: {count}"),
        }
    }

    fn save_current(&mut self) {
        match self.session.to_saved(chrono::Utc::now()) {
            Some(saved) => {
                self.history.save(saved);
                self.status = format!("Palette saved ({} in history)", self.history.len());
            }
            None => self.status = String::from("Nothing to save yet"),
        }
    }

    fn handle_history_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up | KeyCode::Char('k') => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.history.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Enter => self.open_selected(),
            KeyCode::Char('x') => {
                self.history.clear();
                self.selected = 0;
                self.status = String::from("History cleared");
            }
            _ => {}
        }
    }

    fn open_selected(&mut self) {
        let Some(saved) = self.history.get(self.selected) else {
            return;
        };
        let image = ImageSource::Path(PathBuf::from(&saved.image_url));
        let palette = saved.palette.clone();
        let request = self.session.reopen(image, palette);
        self.view = View::Palette;
        self.dispatch(request);
        self.status = format!("Opened palette {}", self.selected + 1);
    }

    fn draw(&self, frame: &mut Frame) {
        let [header, body, footer] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        let image = self
            .session
            .image()
            .map(|s| s.reference())
            .unwrap_or_else(|| String::from("no image"));
        let title = format!(
            " chromapick  {}  Number of Colors: {}",
            image,
            self.session.color_count()
        );
        frame.render_widget(
            Paragraph::new(title).style(Style::default().add_modifier(Modifier::BOLD)),
            header,
        );

        match self.view {
            View::History => frame.render_widget(
                HistoryWidget::new(self.history.list(), self.selected, chrono::Local::now()),
                body,
            ),
            View::Palette => {
                let colors = self
                    .session
                    .current()
                    .map(|p| p.colors.as_slice())
                    .unwrap_or_default();
                let palette = PaletteWidget::new(colors, self.session.is_extracting());
                if self.export_open {
                    let [left, right] =
                        Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)])
                            .areas(body);
                    frame.render_widget(palette, left);
                    frame.render_widget(ExportWidget::new(colors, self.export_format), right);
                } else {
                    frame.render_widget(palette, body);
                }
            }
        }

        frame.render_widget(
            Paragraph::new(self.status.as_str()).style(Style::default().fg(Color::DarkGray)),
            footer,
        );
    }
}

/// Launch the TUI application.
pub fn run(mut app: TuiApp) -> Result<()> {
    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, &mut app);
    ratatui::restore();
    result
}

fn event_loop(terminal: &mut DefaultTerminal, app: &mut TuiApp) -> Result<()> {
    while !app.should_quit() {
        app.poll_results();
        terminal.draw(|frame| app.draw(frame))?;

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key.code);
                }
            }
        }
    }
    Ok(())
}

use std::{
    fs, io,
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use crossterm::{
    event::{
        self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
        Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        MouseButton, MouseEvent, MouseEventKind, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
        supports_keyboard_enhancement,
    },
};
use log::{info, warn};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Position, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
};

use daily_outline::config::{Cli, Config};
use daily_outline::editor::{EditOutcome, OutlineEditor, SaveRequest};
use daily_outline::editor_display::EditorDisplay;
use daily_outline::keymap::{Input, Key, KeyInput, Modifiers};
use daily_outline::logging::init_logging;
use daily_outline::outline::{Document, UuidIds};
use daily_outline::render::RenderResult;
use daily_outline::store::{JsonFileStore, SaveStatus, SaveTracker, Saver};
use daily_outline::template::{load_template, open_day};
use daily_outline::theme::Theme;

const STATUS_TIMEOUT: Duration = Duration::from_secs(4);
const TICK_RATE: Duration = Duration::from_millis(100);
const MOUSE_SCROLL_LINES: usize = 3;

fn main() -> Result<()> {
    run()
}

fn editor_wrap_configuration(width: usize) -> (usize, usize) {
    if width == 0 {
        return (1, 0);
    }
    if width < 60 {
        return (width.saturating_sub(1).max(1), 0);
    }
    if width < 100 {
        let padding = 2.min(width / 2);
        return (width.saturating_sub(padding * 2).max(1), padding);
    }
    let left_padding = (width.saturating_sub(100) / 2 + 4).min(width.saturating_sub(1) / 2);
    (width.saturating_sub(left_padding * 2).max(1), left_padding)
}

fn absolute(path: PathBuf) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path);
    }
    let cwd = std::env::current_dir().context("failed to resolve the working directory")?;
    Ok(cwd.join(path))
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let data_dir = absolute(cli.data_dir())?;
    fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create {}", data_dir.display()))?;

    let mut config = Config::load(&data_dir).context("failed to load configuration")?;
    config.apply_cli(&cli);

    let log_dir = absolute(cli.log_dir(&data_dir))?;
    if let Err(err) = init_logging(config.log_level(), &log_dir) {
        // the terminal is still in cooked mode here
        eprintln!("Logging disabled: {err}");
    }

    let template = load_template(&data_dir).context("failed to load the template")?;
    let store = JsonFileStore::new(&data_dir);
    let day = cli.date.unwrap_or_else(|| Local::now().date_naive());
    let (document, created) = open_day(&store, day, &template, &mut UuidIds)
        .with_context(|| format!("failed to open {day}"))?;

    let editor = OutlineEditor::new(document, config.editor_settings(), Box::new(UuidIds));
    let display = EditorDisplay::new(editor, Theme::default());
    let initial_status = created.then(|| "New day from template".to_string());
    let mut app = App::new(display, store, template, day, config, initial_status);

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )
    .context("failed to initialize terminal")?;
    // Ctrl+[ and Ctrl+] only arrive as brackets with disambiguated key codes
    let enhanced_keys = supports_keyboard_enhancement().unwrap_or(false);
    if enhanced_keys {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )
        .context("failed to enable keyboard enhancement")?;
    }
    info!("event=terminal_setup module=app enhanced_keys={enhanced_keys}");
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal backend")?;
    terminal.clear().ok();

    let res = run_app(&mut terminal, &mut app).context("application error");
    app.finish();

    if enhanced_keys {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags).ok();
    }
    disable_raw_mode().ok();
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )
    .ok();
    terminal.show_cursor().ok();

    res
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let mut needs_redraw = true;

    while !app.should_quit {
        if needs_redraw {
            terminal
                .draw(|frame| app.draw(frame))
                .context("failed to draw frame")?;
            needs_redraw = false;
        }

        let timeout = app.next_wakeup(Instant::now());
        if event::poll(timeout).context("event poll failed")? {
            let evt = event::read().context("failed to read event")?;
            app.handle_event(evt, Instant::now());
            needs_redraw = true;
        }

        if app.on_tick(Instant::now()) {
            needs_redraw = true;
        }
    }

    Ok(())
}

struct App {
    display: EditorDisplay,
    store: JsonFileStore,
    saver: Option<Saver>,
    tracker: SaveTracker,
    template: Document,
    day: NaiveDate,
    config: Config,
    scroll_top: usize,
    should_quit: bool,
    status_message: Option<(String, Instant)>,
}

impl App {
    fn new(
        display: EditorDisplay,
        store: JsonFileStore,
        template: Document,
        day: NaiveDate,
        config: Config,
        initial_status: Option<String>,
    ) -> Self {
        let saver = Saver::spawn(store.clone());
        Self {
            display,
            store,
            saver: Some(saver),
            tracker: SaveTracker::new(),
            template,
            day,
            config,
            scroll_top: 0,
            should_quit: false,
            status_message: initial_status.map(|msg| (msg, Instant::now())),
        }
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), Instant::now()));
    }

    fn next_wakeup(&self, now: Instant) -> Duration {
        match self.display.next_deadline() {
            Some(due) => due.saturating_duration_since(now).min(TICK_RATE),
            None => TICK_RATE,
        }
    }

    /// Runs timers and folds in save acknowledgements. `true` when the
    /// screen needs a redraw.
    fn on_tick(&mut self, now: Instant) -> bool {
        let version = self.display.version();
        let mut changed = false;
        if let Some(request) = self.display.poll(now) {
            self.submit(request);
            changed = true;
        }
        changed |= self.display.version() != version;
        changed |= self.drain_acks();

        let had_message = self.status_message.is_some();
        self.prune_status_message();
        changed || (had_message && self.status_message.is_none())
    }

    fn submit(&mut self, request: SaveRequest) {
        self.tracker.requested(request.version);
        let submitted = match &self.saver {
            Some(saver) => saver.submit(self.day, request),
            None => return,
        };
        if let Err(err) = submitted {
            warn!("event=save_submit module=app status=error error={err}");
            self.set_status(format!("Saving stopped: {err}"));
        }
    }

    fn drain_acks(&mut self) -> bool {
        let Some(saver) = &self.saver else {
            return false;
        };
        let mut changed = false;
        for ack in saver.drain_acks() {
            if self.tracker.acknowledge(&ack) {
                changed = true;
                if let SaveStatus::Offline(reason) = self.tracker.status() {
                    let message = format!("Offline, edits kept locally: {reason}");
                    self.set_status(message);
                }
            }
        }
        changed
    }

    fn save_now(&mut self) {
        match self.display.flush_save() {
            Some(request) => {
                self.submit(request);
                self.set_status("Saving…");
            }
            None => self.set_status("Nothing to save"),
        }
    }

    fn switch_day(&mut self, day: NaiveDate) {
        if day == self.day {
            return;
        }
        if let Some(request) = self.display.flush_save() {
            self.submit(request);
        }
        let mut ids = UuidIds;
        match open_day(&self.store, day, &self.template, &mut ids) {
            Ok((document, created)) => {
                self.display.replace_document(document);
                self.day = day;
                self.scroll_top = 0;
                self.display.set_cursor_following(true);
                info!("event=day_switch module=app status=ok day={day} created={created}");
                if created {
                    self.set_status("New day from template");
                }
            }
            Err(err) => {
                warn!("event=day_switch module=app status=error day={day} error={err}");
                self.set_status(format!("Could not open {day}: {err}"));
            }
        }
    }

    fn finish(&mut self) {
        if let Some(request) = self.display.flush_save() {
            self.submit(request);
        }
        if let Some(saver) = self.saver.take() {
            for ack in saver.shutdown() {
                if let Err(err) = &ack.result {
                    warn!(
                        "event=final_save module=app status=error day={} version={} error={}",
                        ack.day, ack.version, err
                    );
                }
            }
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        if area.height == 0 || area.width == 0 {
            return;
        }

        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(area);
        let editor_area = vertical[0];
        let status_area = vertical[1];

        let (computed_width, left_padding) = editor_wrap_configuration(editor_area.width as usize);
        let wrap_width = self
            .config
            .wrap_width
            .map_or(computed_width, |width| width.min(computed_width));
        let text_area = Rect {
            x: editor_area.x + left_padding as u16,
            y: editor_area.y,
            width: (wrap_width as u16).min(editor_area.width),
            height: editor_area.height,
        };

        let render = self.display.render(wrap_width);
        self.display
            .update_after_render(text_area, render.total_lines);
        let viewport_height = text_area.height as usize;
        self.adjust_scroll(&render, viewport_height);

        let outline = Paragraph::new(Text::from(render.lines))
            .block(Block::default().borders(Borders::NONE))
            .style(self.display.theme().background_style())
            .scroll((self.scroll_top as u16, 0));
        frame.render_widget(outline, text_area);

        if let Some(cursor) = self.display.last_cursor_visual()
            && cursor.line >= self.scroll_top
            && cursor.line < self.scroll_top + viewport_height
            && text_area.width > 0
        {
            let cursor_y = text_area.y + (cursor.line - self.scroll_top) as u16;
            let cursor_x = text_area.x + cursor.column.min(text_area.width - 1);
            frame.set_cursor_position(Position::new(cursor_x, cursor_y));
        }

        let status_line = self.status_line(status_area.width as usize);
        let status_widget = Paragraph::new(status_line)
            .block(Block::default().borders(Borders::NONE))
            .style(self.display.theme().status_bar_style());
        frame.render_widget(status_widget, status_area);
    }

    fn status_line(&mut self, terminal_width: usize) -> Line<'static> {
        self.prune_status_message();
        let theme = self.display.theme().clone();

        let mut spans = vec![Span::styled(
            self.day.format("%a %Y-%m-%d").to_string(),
            theme.date_style(),
        )];
        spans.push(Span::raw(" "));
        let status = self.tracker.status();
        let status_style = match status {
            SaveStatus::Offline(_) => theme.offline_style(),
            SaveStatus::Saved | SaveStatus::Pending => theme.saved_style(),
        };
        let marker = if self.display.is_dirty() { "*" } else { "" };
        spans.push(Span::styled(format!("{}{}", status.label(), marker), status_style));

        if let Some((message, _)) = &self.status_message {
            spans.push(Span::raw(format!("  {message}")));
            return Line::from(spans);
        }

        spans.push(Span::raw(format!(
            ", {} items",
            self.display.document().item_count()
        )));

        // least important first
        let all_shortcuts = ["^Z:Undo", "^PgUp/^PgDn:Day", "^T:Today", "^S:Save", "^Q:Quit"];
        let left_width: usize = spans.iter().map(|span| span.content.chars().count()).sum();
        let min_padding = 1;
        let mut shown: Vec<&str> = Vec::new();
        let mut shortcuts_width = 0;
        for shortcut in all_shortcuts.iter().rev() {
            let test_width = if shown.is_empty() {
                shortcut.chars().count()
            } else {
                shortcuts_width + 1 + shortcut.chars().count()
            };
            if left_width + min_padding + test_width > terminal_width {
                break;
            }
            shown.insert(0, shortcut);
            shortcuts_width = test_width;
        }

        if !shown.is_empty() {
            let padding = terminal_width
                .saturating_sub(left_width)
                .saturating_sub(shortcuts_width)
                .max(min_padding);
            spans.push(Span::raw(" ".repeat(padding)));
            spans.push(Span::raw(shown.join(" ")));
        }

        Line::from(spans)
    }

    fn prune_status_message(&mut self) {
        if let Some((_, instant)) = &self.status_message
            && instant.elapsed() > STATUS_TIMEOUT
        {
            self.status_message = None;
        }
    }

    fn adjust_scroll(&mut self, render: &RenderResult, viewport_height: usize) {
        let viewport = viewport_height.max(1);
        let max_scroll = render.total_lines.saturating_sub(viewport);
        if self.scroll_top > max_scroll {
            self.scroll_top = max_scroll;
        }
        if self.display.cursor_following()
            && let Some(cursor) = self.display.last_cursor_visual()
        {
            self.scroll_top = scroll_top_for_cursor(self.scroll_top, cursor.line, viewport)
                .min(max_scroll);
        }
    }

    fn scroll_by_lines(&mut self, delta: isize) {
        if delta == 0 {
            return;
        }
        self.display.set_cursor_following(false);
        let viewport = self.display.last_view_height().max(1);
        let max_scroll = self.display.last_total_lines().saturating_sub(viewport) as isize;
        self.scroll_top = (self.scroll_top as isize + delta).clamp(0, max_scroll.max(0)) as usize;
    }

    fn handle_mouse_event(&mut self, event: MouseEvent, now: Instant) {
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.display
                    .focus_at_mouse(event.column, event.row, self.scroll_top, now);
            }
            MouseEventKind::ScrollUp => self.scroll_by_lines(-(MOUSE_SCROLL_LINES as isize)),
            MouseEventKind::ScrollDown => self.scroll_by_lines(MOUSE_SCROLL_LINES as isize),
            _ => {}
        }
    }

    fn handle_event(&mut self, event: Event, now: Instant) {
        match event {
            Event::Key(KeyEvent {
                code,
                modifiers,
                kind: KeyEventKind::Press,
                ..
            }) => self.handle_key(code, modifiers, now),
            Event::Paste(text) => {
                self.display.handle_input(&Input::Paste(text), now);
                self.display.set_cursor_following(true);
            }
            Event::Mouse(mouse_event) => self.handle_mouse_event(mouse_event, now),
            _ => {}
        }
    }

    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers, now: Instant) {
        let ctrl = modifiers.contains(KeyModifiers::CONTROL);
        match (code, ctrl) {
            (KeyCode::Char('q'), true) => {
                self.should_quit = true;
                return;
            }
            (KeyCode::Char('s'), true) => {
                self.save_now();
                return;
            }
            (KeyCode::Char('t'), true) => {
                self.switch_day(Local::now().date_naive());
                return;
            }
            (KeyCode::PageUp, true) => {
                if let Some(day) = self.day.pred_opt() {
                    self.switch_day(day);
                }
                return;
            }
            (KeyCode::PageDown, true) => {
                if let Some(day) = self.day.succ_opt() {
                    self.switch_day(day);
                }
                return;
            }
            (KeyCode::PageUp, false) => {
                self.scroll_by_lines(-(self.display.page_jump_distance() as isize));
                return;
            }
            (KeyCode::PageDown, false) => {
                self.scroll_by_lines(self.display.page_jump_distance() as isize);
                return;
            }
            _ => {}
        }

        let Some(input) = key_input(code, modifiers) else {
            return;
        };
        let outcome = self.display.handle_input(&Input::Key(input), now);
        if outcome != EditOutcome::Ignored {
            self.display.set_cursor_following(true);
        }
    }
}

fn scroll_top_for_cursor(scroll_top: usize, cursor_line: usize, viewport: usize) -> usize {
    let margin = if viewport >= 3 { 1 } else { 0 };
    let top_limit = scroll_top + margin;
    let bottom_offset = viewport.saturating_sub(1).saturating_sub(margin);
    if cursor_line < top_limit {
        cursor_line.saturating_sub(margin)
    } else if cursor_line > scroll_top + bottom_offset {
        cursor_line.saturating_sub(bottom_offset)
    } else {
        scroll_top
    }
}

/// Translates a crossterm key into the editor's own key type.
fn key_input(code: KeyCode, modifiers: KeyModifiers) -> Option<KeyInput> {
    let mods = Modifiers {
        shift: modifiers.contains(KeyModifiers::SHIFT),
        primary: modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::SUPER),
        alt: modifiers.contains(KeyModifiers::ALT),
    };
    let key = match code {
        // legacy terminals send Ctrl+] as 0x1D, which reads back as Ctrl+5
        KeyCode::Char('5') if mods.primary => Key::Char(']'),
        KeyCode::Char(ch) => Key::Char(ch),
        KeyCode::Enter => Key::Enter,
        KeyCode::Tab => Key::Tab,
        KeyCode::BackTab => Key::BackTab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::Esc => Key::Escape,
        _ => return None,
    };
    Some(KeyInput::new(key, mods))
}

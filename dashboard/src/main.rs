mod collector;
mod error;
mod form;
mod logging;
mod model;
mod scheduler;
mod ui;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
    MouseButton, MouseEventKind,
};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::execute;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use collector::http::HttpBackend;
use form::submit::SubmissionController;
use form::FormField;
use model::{AppState, Page};
use scheduler::SyncScheduler;
use ui::theme::ColorScheme;

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum ThemeChoice {
    Dark,
    Light,
}

#[derive(Parser)]
#[command(name = "feedback-dashboard", about = "Live terminal dashboard for customer feedback analytics")]
struct Cli {
    /// Analytics backend URL
    #[arg(long, env = "FEEDBACK_BACKEND", default_value = "http://localhost:5000")]
    backend: String,

    /// Refresh period in milliseconds
    #[arg(long, env = "FEEDBACK_INTERVAL_MS", default_value_t = 5000)]
    interval_ms: u64,

    /// Per-request HTTP timeout in seconds
    #[arg(long, default_value_t = 5)]
    timeout_secs: u64,

    /// Rows in the dashboard's recent feedback list
    #[arg(long, default_value_t = 8)]
    recent: usize,

    /// Color theme
    #[arg(long, default_value = "dark", value_enum)]
    theme: ThemeChoice,

    /// Log file path
    #[arg(long, default_value = "feedback-dashboard.log")]
    log_file: PathBuf,
}

/// Redraw cadence while bars animate or a save is pending.
const FAST_POLL: Duration = Duration::from_millis(40);
const IDLE_POLL: Duration = Duration::from_millis(200);

/// What a key press asks the loop to do beyond editing state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Action {
    None,
    Quit,
    Refresh,
    Submit,
}

fn on_key(state: &mut AppState, key: KeyEvent) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Action::Quit;
    }
    match (state.page, key.code) {
        (_, KeyCode::Esc) => Action::Quit,
        (_, KeyCode::Tab | KeyCode::BackTab) => {
            state.page = state.page.toggle();
            Action::None
        }
        (Page::Dashboard, KeyCode::Char('q')) => Action::Quit,
        (Page::Dashboard, KeyCode::Char('r')) => Action::Refresh,
        (Page::Dashboard, _) => Action::None,
        (Page::Feedback, KeyCode::Enter) => Action::Submit,
        (Page::Feedback, code) => {
            let form = &mut state.form;
            match code {
                KeyCode::Up => form.focus = form.focus.prev(),
                KeyCode::Down => form.focus = form.focus.next(),
                KeyCode::Left if form.focus == FormField::Rating => form.nudge_rating(-1),
                KeyCode::Right if form.focus == FormField::Rating => form.nudge_rating(1),
                KeyCode::Backspace => form.backspace(),
                KeyCode::PageUp => state.detail_scroll = state.detail_scroll.saturating_sub(5),
                KeyCode::PageDown => state.detail_scroll = state.detail_scroll.saturating_add(5),
                KeyCode::Char(c) => form.type_char(c),
                _ => {}
            }
            Action::None
        }
    }
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    let colors = match cli.theme {
        ThemeChoice::Dark => ColorScheme::dark(),
        ThemeChoice::Light => ColorScheme::light(),
    };

    // Logging is best effort; the dashboard still runs without it.
    let _log_guard = match logging::init(&cli.log_file) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("logging disabled: {err}");
            None
        }
    };

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let enter = rt.enter();

    let backend = Arc::new(
        HttpBackend::new(&cli.backend, Duration::from_secs(cli.timeout_secs)).map_err(io::Error::other)?,
    );
    let backend_url = backend.base_url().to_string();
    info!(backend = %backend_url, interval_ms = cli.interval_ms, "starting dashboard");

    // Sync scheduler; the first cycle runs as soon as the timer starts
    let handle = SyncScheduler::spawn(Arc::clone(&backend));
    handle.start(Duration::from_millis(cli.interval_ms));
    let mut snapshots = handle.subscribe();
    let mut snapshot = handle.latest();

    // Background work reports back to the terminal loop through these
    let (notices_tx, mut notices_rx) = mpsc::unbounded_channel();
    let (outcomes_tx, mut outcomes_rx) = mpsc::unbounded_channel();
    let controller = SubmissionController::new(backend, handle.clone(), notices_tx);

    let mut app_state = AppState::new(cli.recent);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(term_backend)?;

    // Main event loop
    loop {
        let now = Instant::now();
        if snapshots.has_changed().unwrap_or(false) {
            snapshot = Arc::clone(&*snapshots.borrow_and_update());
            app_state.view.apply(&snapshot, now);
            debug!(cycle = app_state.view.cycle, panels = ?app_state.view.rendered_cycles(), "view updated");
        }
        while let Ok(notice) = notices_rx.try_recv() {
            app_state.notifications.notify(notice, now);
        }
        while let Ok((submitted, result)) = outcomes_rx.try_recv() {
            app_state.form.on_submitted(&submitted, &result);
        }
        app_state.notifications.prune(now);

        let busy = controller.is_busy();
        terminal.draw(|frame| {
            ui::draw(frame, &snapshot, &backend_url, busy, &mut app_state, now, &colors);
        })?;
        app_state.tick = app_state.tick.wrapping_add(1);

        let poll_timeout = if busy || app_state.view.sentiment.animating(now) {
            FAST_POLL
        } else {
            IDLE_POLL
        };

        // Handle input
        if event::poll(poll_timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match on_key(&mut app_state, key) {
                    Action::Quit => break,
                    Action::Refresh => handle.trigger_now(),
                    Action::Submit => {
                        let controller = controller.clone();
                        let outcomes = outcomes_tx.clone();
                        let input = app_state.form.input();
                        rt.spawn(async move {
                            let result = controller.submit(input.clone()).await;
                            let _ = outcomes.send((input, result));
                        });
                    }
                    Action::None => {}
                },
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::Moved => app_state.on_mouse_move(mouse.column, mouse.row, Instant::now()),
                    MouseEventKind::Down(MouseButton::Left) => app_state.on_click(mouse.column, mouse.row),
                    _ => {}
                },
                _ => {}
            }
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    handle.stop();
    drop(enter);
    rt.shutdown_timeout(Duration::from_millis(500));
    if controller.is_busy() {
        warn!("exited with a submission still pending");
    }
    info!("dashboard stopped");

    Ok(())
}

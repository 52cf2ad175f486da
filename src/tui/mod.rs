// File: ./src/tui/mod.rs
// Entry point and main loop for the TUI application.
pub mod action;
pub mod handlers;
pub mod state;
pub mod view;

use crate::config::Config;
use crate::context::AppContext;
use crate::controller::AgendaController;
use crate::logging;
use crate::storage::LocalStorage;
use crate::system::{SystemEvent, schedule_transition, spawn_reminder_clock};
use crate::tui::action::Action;
use crate::tui::state::AppState;
use crate::tui::view::draw;

use anyhow::Result;
use chrono::Local;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{io, time::Duration};
use tokio::sync::mpsc;

pub async fn run(ctx: &dyn AppContext) -> Result<()> {
    // --- 1. PREAMBLE & CONFIG ---
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        // Give the terminal back before the panic message is printed.
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        log::error!("PANIC: {}", info);
        default_hook(info);
    }));

    let cfg = match Config::load(ctx) {
        Ok(c) => c,
        Err(e) if Config::is_missing_config_error(&e) => {
            // First start: write the defaults so there is a file to edit.
            let cfg = Config::default();
            if let Err(e) = cfg.save(ctx) {
                eprintln!("Warning: Could not save config file: {:#}", e);
            } else if let Ok(path) = Config::get_path_string(ctx) {
                println!("Configuration saved to: {}", path);
            }
            cfg
        }
        Err(e) => {
            eprintln!("Error loading configuration:\n{:#}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = logging::init_file_logger(ctx, cfg.log_level()) {
        eprintln!("Warning: logging disabled: {:#}", e);
    }
    log::info!("Starting TUI");

    let today = Local::now().date_naive();
    let storage = LocalStorage::new(ctx)?;
    let controller = AgendaController::open(Box::new(storage), cfg.notified_on_edit, today);
    let reminder_period = cfg.reminder_interval();
    let transition_delay = cfg.delete_transition();
    let mut app_state = AppState::new(controller, cfg, today);

    // --- 2. TERMINAL SETUP ---
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // --- 3. TIMERS ---
    let (event_tx, mut event_rx) = mpsc::channel(16);
    let clock = spawn_reminder_clock(reminder_period, event_tx.clone());

    // Appointments already inside their window at startup fire right away.
    handlers::run_reminder_scan(&mut app_state, Local::now().naive_local());

    // --- 4. UI LOOP ---
    let result = ui_loop(
        &mut terminal,
        &mut app_state,
        &mut event_rx,
        &event_tx,
        transition_delay,
    );

    // --- 5. CLEANUP ---
    clock.abort();
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    log::info!("TUI closed");
    result
}

fn ui_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app_state: &mut AppState,
    event_rx: &mut mpsc::Receiver<SystemEvent>,
    event_tx: &mpsc::Sender<SystemEvent>,
    transition_delay: Duration,
) -> Result<()> {
    loop {
        terminal.draw(|f| draw(f, app_state))?;

        // A. Timer events
        while let Ok(event) = event_rx.try_recv() {
            handlers::handle_system_event(app_state, event, Local::now().naive_local());
        }

        // B. Input events
        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        // Filter out KeyRelease events to prevent double input on Windows
        if key.kind == event::KeyEventKind::Release {
            continue;
        }

        let today = Local::now().date_naive();
        match handlers::handle_key_event(key, app_state, today) {
            Some(Action::Quit) => return Ok(()),
            Some(Action::ScheduleDelete(ids)) if transition_delay.is_zero() => {
                handlers::handle_system_event(
                    app_state,
                    SystemEvent::TransitionElapsed(ids),
                    Local::now().naive_local(),
                );
            }
            Some(Action::ScheduleDelete(ids)) => {
                schedule_transition(transition_delay, ids, event_tx.clone());
            }
            None => {}
        }
    }
}

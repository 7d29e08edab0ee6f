//! news-explorer — browse NewsAPI articles in the terminal.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌───────────┐  AppEvent  ┌──────────┐  draw()  ┌──────────┐
//! │ worker.rs │ ─────────► │  app.rs  │ ───────► │  ui.rs   │
//! │  (tokio)  │  (channel) │ (state)  │          │ (render) │
//! └───────────┘            └──────────┘          └──────────┘
//!       ▲                       ▲
//!       │ spawn_fetch()         │ handle_key_event()
//!       │                  ┌──────────┐
//!   main loop              │ input.rs │
//!                          └──────────┘
//! ```
//!
//! * **`article/`** — the decoded records and the response envelope decoder.
//! * **`source/`** — the `NewsSource` trait and the NewsAPI client.
//! * **`query`** — the pure search / date-filter / sort pipeline.
//! * **`connectivity`** — reachability status and probes.
//! * **`worker`** — background fetches and the path watcher.
//! * **`app`** — owns all application state; applies worker events.
//! * **`ui`** — pure rendering: reads `App` state and draws widgets.
//! * **`input`** — maps key events to `App` mutations.
//! * **`main`** — wires everything together: config, logging, runtime,
//!   terminal, and the event loop.

mod app;
mod article;
mod config;
mod connectivity;
mod error;
mod input;
mod logging;
mod query;
mod source;
mod ui;
mod worker;

use std::io;
use std::sync::{mpsc, Arc};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;

use app::App;
use config::Config;
use connectivity::TcpProbe;
use source::NewsApiSource;

// ---------------------------------------------------------------------------
// RAII terminal guard — idiomatic cleanup even on panic
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode and alternate-screen lifetime via [`Drop`].
///
/// Constructing this struct enters raw mode + alternate screen.  When the
/// value is dropped (normally or during stack unwinding) it restores the
/// terminal.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Install a panic hook that restores the terminal before printing the
/// panic message.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    // -- configuration and logging -------------------------------------------
    let config = Config::parse();
    logging::init(&config.log_path())?;
    info!(base_url = %config.base_url, "starting news-explorer");

    install_panic_hook();

    // -- background runtime --------------------------------------------------
    // Workers run here; all state stays on this thread.
    let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
    let _runtime_guard = runtime.enter();

    let client = config.http_client().context("building HTTP client")?;
    let source = Arc::new(NewsApiSource::new(client, &config.base_url, &config.api_key));

    let (tx, rx) = mpsc::channel();
    worker::spawn_path_watcher(
        TcpProbe::new(&config.probe_addr, config.probe_timeout()),
        config.probe_interval(),
        tx.clone(),
    );

    // -- terminal setup (RAII — Drop restores on exit or panic) --------------
    let mut guard = TerminalGuard::new()?;
    let mut app = App::new(config.initial_connectivity(), config.sort);

    // -- main event loop -----------------------------------------------------
    // Runs at ~10 fps (100 ms tick).  Each iteration:
    //   1. Drain any events from the workers.
    //   2. Start a fetch if one was requested and is allowed.
    //   3. Render the UI.
    //   4. Poll for keyboard input (non-blocking, up to tick_rate).
    let tick_rate = Duration::from_millis(100);

    loop {
        while let Ok(event) = rx.try_recv() {
            app.handle_event(event);
        }

        if app.next_fetch() {
            worker::spawn_fetch(Arc::clone(&source), tx.clone());
        }

        guard.terminal.draw(|f| ui::draw(&mut app, f))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                input::handle_key_event(&mut app, key);
            }
        }

        if app.quit {
            break;
        }
    }

    info!("exiting");
    // `guard` is dropped here, restoring the terminal; the runtime drops
    // after it and cancels any outstanding workers.
    Ok(())
}

mod app;
mod events;
mod input;
mod page;
mod ui;

use std::io;
use std::time::Duration;

use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use mission_core::api::{access_guard, CliError, Route};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

pub use app::App;
use events::{InputEvent, InputReader};

use crate::context::AppContext;

pub fn check_tui_support() -> Result<(), String> {
    if !atty::is(atty::Stream::Stdout) {
        return Err("stdout is not a terminal".to_string());
    }
    if !cfg!(windows) && std::env::var("TERM").is_err() {
        return Err("TERM environment variable not set".to_string());
    }
    let (width, height) = terminal::size().map_err(|e| format!("terminal size failed: {e}"))?;
    if width < 80 || height < 24 {
        return Err(format!(
            "terminal too small ({width}x{height}), need at least 80x24"
        ));
    }
    Ok(())
}

/// Where `--route` lands: the access guard lets every path through, and an
/// unknown path falls back to the dashboard.
pub fn start_route(path: Option<&str>) -> Route {
    let Some(path) = path else {
        return Route::Dashboard;
    };
    let decision = access_guard(path);
    tracing::debug!(target: "mission.tui", path, ?decision, allowed = decision.allows(), "access guard");
    Route::parse(path).unwrap_or_else(|| {
        tracing::warn!(target: "mission.tui", path, "unknown route; opening dashboard");
        Route::Dashboard
    })
}

pub async fn run(ctx: AppContext, start: Route) -> Result<(), CliError> {
    check_tui_support().map_err(CliError::Command)?;
    let tick_ms = ctx.cfg.tui.tick_ms;
    let mut terminal = setup_terminal().map_err(CliError::Command)?;
    let (mut app, action_rx) = App::new(ctx, start);
    let result = run_on_terminal(&mut terminal, &mut app, action_rx, tick_ms).await;
    restore_terminal(&mut terminal);
    result
}

async fn run_on_terminal(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    mut action_rx: tokio::sync::mpsc::UnboundedReceiver<app::ActionDone>,
    tick_ms: u64,
) -> Result<(), CliError> {
    tracing::debug!(target: "mission.tui", route = %app.route.path(), "tui loop starting");
    let (input_reader, mut input_rx) = InputReader::start();
    let mut tick = tokio::time::interval(Duration::from_millis(tick_ms.max(16)));

    terminal
        .draw(|f| ui::draw(f, app))
        .map_err(|e| CliError::Command(e.to_string()))?;

    let mut exit_requested = false;
    loop {
        tokio::select! {
            Some(update) = app.page.next_update() => {
                app.handle_page_update(update);
            }
            Some(done) = action_rx.recv() => {
                app.handle_action_done(done);
            }
            Some(input) = input_rx.recv() => {
                match input {
                    InputEvent::Key(key) => exit_requested = app.handle_key(key),
                    InputEvent::Resize => {}
                }
            }
            _ = tick.tick() => {}
        }

        app.maybe_hide_splash();
        terminal
            .draw(|f| ui::draw(f, app))
            .map_err(|e| CliError::Command(e.to_string()))?;

        if exit_requested {
            break;
        }
    }

    input_reader.stop();
    tracing::debug!(target: "mission.tui", "tui loop stopped");
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>, String> {
    enable_raw_mode().map_err(|e| e.to_string())?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).map_err(|e| e.to_string())?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.to_string())
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) {
    let _ = disable_raw_mode();
    let _ = execute!(terminal.backend_mut(), terminal::LeaveAlternateScreen);
    let _ = terminal.show_cursor();
}

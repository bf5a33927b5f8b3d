use std::sync::Arc;

use clap::Parser;
use mission_cli::commands::{cli, list, session, task};
use mission_cli::context::AppContext;
use mission_cli::tui;
use mission_core::api as core_api;
use mission_core::api::{ApiError, CliError};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
    std::sync::OnceLock::new();

#[tokio::main]
async fn main() {
    let exit = match real_main().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e}");
            exit_code_for_error(&e)
        }
    };

    std::process::exit(exit);
}

async fn real_main() -> Result<i32, CliError> {
    let mut args = cli::Args::parse();
    let mut cfg = core_api::load_default().map_err(|e| CliError::Config(e.to_string()))?;
    if let Some(url) = args.api_url.take() {
        cfg.api.base_url = url;
    }
    if let Some(key) = args.api_key.take() {
        cfg.api.api_key = key;
    }

    let cmd = args.command.take().unwrap_or(cli::Commands::Tui(cli::TuiArgs::default()));
    // The TUI owns the terminal; stderr output would tear the screen.
    let interactive = matches!(cmd, cli::Commands::Tui(_));
    init_tracing(&cfg.logging, interactive).map_err(CliError::Command)?;

    let session_path =
        core_api::get_session_file_path(&cfg).map_err(|e| CliError::Config(e.to_string()))?;
    let session = core_api::Session::from_file(&session_path)?;
    let client = core_api::ApiClient::from_config(&cfg.api)
        .map_err(|e| CliError::Config(e.to_string()))?;
    tracing::debug!(base_url = %client.base_url(), session = %session_path.display(), "startup");

    let ctx = AppContext::new(cfg, session, Arc::new(client));
    dispatch(cmd, ctx).await?;
    Ok(0)
}

fn exit_code_for_error(e: &CliError) -> i32 {
    // 0: success
    // 11: config error
    // 12: not logged in
    // 20: api / IO error
    // 30: validation (empty instruction, unknown task)
    // 50: internal/uncategorized
    match e {
        CliError::Config(_) => 11,
        CliError::NotAuthenticated => 12,
        CliError::Api(ApiError::Validation(_)) => 30,
        CliError::Api(_) => 20,
        CliError::Action { source, .. } if source.is_validation() => 30,
        CliError::Action { .. } => 20,
        CliError::Io(_) => 20,
        CliError::Command(_) => 20,
        CliError::Anyhow(_) => 50,
    }
}

async fn dispatch(cmd: cli::Commands, ctx: AppContext) -> Result<(), CliError> {
    match cmd {
        cli::Commands::Tui(tui_args) => {
            let start = tui::start_route(tui_args.route.as_deref());
            tui::run(ctx, start).await
        }
        cli::Commands::Login => session::handle_login(&ctx),
        cli::Commands::Logout => session::handle_logout(&ctx),
        cli::Commands::Agents(args) => list::handle_agents(args, &ctx).await,
        cli::Commands::Tasks(args) => list::handle_tasks(args, &ctx).await,
        cli::Commands::Board(args) => list::handle_board(args, &ctx).await,
        cli::Commands::Activity(args) => list::handle_activity(args, &ctx).await,
        cli::Commands::Task(args) => task::handle_task(args.command, &ctx).await,
    }
}

fn init_tracing(logging: &core_api::LoggingConfig, interactive: bool) -> Result<(), String> {
    if !logging.enabled {
        return Ok(());
    }

    let filter = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => EnvFilter::from_default_env(),
        _ => EnvFilter::try_new(logging.level.clone()).map_err(|e| e.to_string())?,
    };

    let mut maybe_writer = None;

    if logging.file {
        let dir = match logging
            .directory
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(d) => std::path::PathBuf::from(d),
            None => std::env::temp_dir().join("mission-control"),
        };

        std::fs::create_dir_all(&dir).map_err(|e| format!("create log dir failed: {e}"))?;
        let file_name = format!("mission-control.{}.log", std::process::id());
        let appender = tracing_appender::rolling::never(dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let _ = LOG_GUARD.set(guard);
        maybe_writer = Some(non_blocking);
    }

    let console = logging.console && !interactive;
    if !console && maybe_writer.is_none() {
        // Nothing to write to (TUI without a log file); stay silent.
        return Ok(());
    }

    let console_layer = console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(atty::is(atty::Stream::Stderr))
    });

    let file_layer = maybe_writer.map(|w| {
        tracing_subscriber::fmt::layer()
            .with_writer(w)
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}

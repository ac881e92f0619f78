mod config;

use anyhow::{Context, Result, bail};
use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use playtime_api::LoginRequest;
use playtime_api_client::ApiClient;
use playtime_core::Session;
use playtime_core::stats::{GameStats, aggregate_by_game, format_duration};
use playtime_daemon::status::{clear_status, read_status, write_status};
use playtime_daemon::{
    HttpSessionSink, LocalSessionSink, OpenedSession, SessionSink, SessionTracker, SinkError,
    SysinfoLister, SystemClock, TrackerHandle,
};
use playtime_runtime_config::{PlaytimeConfig, SinkKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Token used to pass the tracker's auth gate when recording locally.
const LOCAL_TOKEN: &str = "local";

#[derive(Parser)]
#[command(name = "playtime-daemon", version, about = "Detect running games and record play sessions")]
struct Cli {
    /// Path to playtime.toml (default: ~/.config/playtime/playtime.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Poll for running games until interrupted (default)
    Run,
    /// Show the game currently being tracked
    Status,
    /// Log in to the session server and store the token
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored token
    Logout,
    /// List recent sessions
    History {
        /// Read the local sessions file instead of the server
        #[arg(long)]
        local: bool,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Play time per game
    Stats {
        /// Read the local sessions file instead of the server
        #[arg(long)]
        local: bool,
    },
    /// List the games that can be detected
    Games,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("playtime_daemon=info".parse().unwrap())
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = dispatch(cli).await {
        error!("playtime-daemon: {:#}", e);
        std::process::exit(1);
    }
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config_path = config::config_path(cli.config.as_deref())?;
    let cfg = config::load_config(&config_path)?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(cfg, &config_path).await,
        Command::Status => show_status(&config_path),
        Command::Login { username, password } => login(cfg, &config_path, username, password).await,
        Command::Logout => logout(cfg, &config_path),
        Command::History { local, limit } => history(&cfg, &config_path, local, limit).await,
        Command::Stats { local } => stats(&cfg, &config_path, local).await,
        Command::Games => {
            for game in config::build_catalog(&cfg).iter() {
                println!("{:<28} {}", game.name(), game.aliases().join(", "));
            }
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

/// The sink selected by `tracker.sink`.
enum ConfiguredSink {
    Server(HttpSessionSink),
    Local(LocalSessionSink),
}

impl SessionSink for ConfiguredSink {
    async fn open(
        &self,
        token: &str,
        game_name: &str,
        process_name: &str,
    ) -> Result<OpenedSession, SinkError> {
        match self {
            Self::Server(sink) => sink.open(token, game_name, process_name).await,
            Self::Local(sink) => sink.open(token, game_name, process_name).await,
        }
    }

    async fn close(
        &self,
        token: &str,
        session_id: &str,
        duration_seconds: u64,
    ) -> Result<(), SinkError> {
        match self {
            Self::Server(sink) => sink.close(token, session_id, duration_seconds).await,
            Self::Local(sink) => sink.close(token, session_id, duration_seconds).await,
        }
    }
}

fn configured_sink(cfg: &PlaytimeConfig, config_path: &Path) -> Result<ConfiguredSink> {
    Ok(match cfg.tracker.sink {
        SinkKind::Local => {
            let path = config::sessions_file_path(cfg, config_path);
            info!("Recording sessions to {}", path.display());
            ConfiguredSink::Local(LocalSessionSink::new(path, Arc::new(SystemClock)))
        }
        SinkKind::Server | SinkKind::Unknown => {
            info!("Recording sessions to {}", cfg.server.url);
            let api = ApiClient::new(&cfg.server.url, cfg.server.timeout())?;
            ConfiguredSink::Server(HttpSessionSink::new(api))
        }
    })
}

fn effective_token(cfg: &PlaytimeConfig) -> Option<String> {
    match (cfg.server.auth_token(), &cfg.tracker.sink) {
        (Some(token), _) => Some(token.to_string()),
        (None, SinkKind::Local) => Some(LOCAL_TOKEN.to_string()),
        (None, _) => None,
    }
}

async fn run(cfg: PlaytimeConfig, config_path: &Path) -> Result<()> {
    info!("playtime-daemon starting");

    let catalog = config::build_catalog(&cfg);
    info!("{} games in catalog", catalog.len());

    let sink = configured_sink(&cfg, config_path)?;
    let mut tracker = SessionTracker::new(catalog, SysinfoLister::new(), sink);
    tracker.set_auth_token(effective_token(&cfg));
    if !tracker.has_auth_token() {
        info!("Not logged in; games are detected but no sessions are recorded");
    }

    write_pid_file(config_path)?;
    let status_path = config::status_file_path(config_path);

    let handle = TrackerHandle::start(tracker, cfg.tracker.poll_interval());
    let supervised = supervise(&handle, config_path, &status_path).await;

    info!("Shutdown signal received, stopping...");
    handle.stop().await;
    clear_status(&status_path);
    cleanup_pid_file(config_path);

    info!("playtime-daemon stopped");
    supervised
}

/// Mirror status changes to disk and reload the token on SIGHUP until
/// SIGTERM/SIGINT.
async fn supervise<L, S>(
    handle: &TrackerHandle<L, S>,
    config_path: &Path,
    status_path: &Path,
) -> Result<()>
where
    L: playtime_daemon::ProcessLister + 'static,
    S: SessionSink + 'static,
{
    let mut active = handle.subscribe();
    write_status(status_path, active.borrow().as_ref())?;

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm =
            signal(SignalKind::terminate()).context("Failed to register SIGTERM")?;
        let mut sigint = signal(SignalKind::interrupt()).context("Failed to register SIGINT")?;
        let mut sighup = signal(SignalKind::hangup()).context("Failed to register SIGHUP")?;
        loop {
            tokio::select! {
                _ = sigterm.recv() => { info!("Received SIGTERM"); break; }
                _ = sigint.recv() => { info!("Received SIGINT"); break; }
                _ = sighup.recv() => reload_token(handle, config_path).await,
                changed = active.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let game = active.borrow_and_update().clone();
                    if let Err(e) = write_status(status_path, game.as_ref()) {
                        warn!("{e:#}");
                    }
                }
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = config_path;
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => { info!("Received Ctrl+C"); break; }
                changed = active.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let game = active.borrow_and_update().clone();
                    if let Err(e) = write_status(status_path, game.as_ref()) {
                        warn!("{e:#}");
                    }
                }
            }
        }
    }
    Ok(())
}

#[cfg(unix)]
async fn reload_token<L, S>(handle: &TrackerHandle<L, S>, config_path: &Path)
where
    L: playtime_daemon::ProcessLister + 'static,
    S: SessionSink + 'static,
{
    match config::load_config(config_path) {
        Ok(cfg) => {
            info!("Reloaded auth token from {}", config_path.display());
            handle.set_auth_token(effective_token(&cfg)).await;
        }
        Err(e) => warn!("Config reload failed, keeping current token: {e:#}"),
    }
}

/// Write PID file so `status` and service managers can find us
fn write_pid_file(config_path: &Path) -> Result<()> {
    let path = config::pid_file_path(config_path);
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(&path, std::process::id().to_string())?;
    info!("PID file written: {}", path.display());
    Ok(())
}

/// Remove PID file on clean shutdown
fn cleanup_pid_file(config_path: &Path) {
    let _ = std::fs::remove_file(config::pid_file_path(config_path));
}

// ---------------------------------------------------------------------------
// status / login / logout
// ---------------------------------------------------------------------------

fn show_status(config_path: &Path) -> Result<()> {
    if !config::pid_file_path(config_path).exists() {
        println!("Daemon is not running");
        return Ok(());
    }
    match read_status(&config::status_file_path(config_path))? {
        Some(game) => println!(
            "Playing {} for {} (since {})",
            game.game_name,
            format_duration(game.elapsed_seconds(Utc::now())),
            game.start_time.with_timezone(&Local).format("%H:%M:%S"),
        ),
        None => println!("No game running"),
    }
    Ok(())
}

async fn login(
    mut cfg: PlaytimeConfig,
    config_path: &Path,
    username: String,
    password: String,
) -> Result<()> {
    let api = ApiClient::new(&cfg.server.url, cfg.server.timeout())?;
    let resp = api
        .login(&LoginRequest { username, password })
        .await
        .context("Login failed")?;
    cfg.server.auth_token = resp.token;
    config::save_config(config_path, &cfg)?;
    println!("Logged in. A running daemon picks this up on SIGHUP or restart.");
    Ok(())
}

fn logout(mut cfg: PlaytimeConfig, config_path: &Path) -> Result<()> {
    cfg.server.auth_token.clear();
    config::save_config(config_path, &cfg)?;
    println!("Logged out.");
    Ok(())
}

// ---------------------------------------------------------------------------
// history / stats
// ---------------------------------------------------------------------------

fn authed_client(cfg: &PlaytimeConfig) -> Result<ApiClient> {
    let Some(token) = cfg.server.auth_token() else {
        bail!("not logged in; run `playtime-daemon login` or pass --local");
    };
    let mut api = ApiClient::new(&cfg.server.url, cfg.server.timeout())?;
    api.set_auth(token.to_string());
    Ok(api)
}

fn local_sessions(cfg: &PlaytimeConfig, config_path: &Path) -> Result<Vec<Session>> {
    let path = config::sessions_file_path(cfg, config_path);
    playtime_daemon::sink::load_sessions(&path)
        .with_context(|| format!("Failed to read {}", path.display()))
}

async fn history(cfg: &PlaytimeConfig, config_path: &Path, local: bool, limit: usize) -> Result<()> {
    let mut sessions: Vec<Session> = if local {
        local_sessions(cfg, config_path)?
    } else {
        authed_client(cfg)?
            .history()
            .await?
            .into_iter()
            .map(Session::from)
            .collect()
    };
    sessions.sort_by(|a, b| b.start_time.cmp(&a.start_time));

    for s in sessions.iter().take(limit) {
        let duration = if s.is_open() {
            "(open)".to_string()
        } else {
            format_duration(s.duration_seconds)
        };
        println!(
            "{}  {:<28} {:>12}  {}",
            s.start_time.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            s.game_name,
            duration,
            s.process_name,
        );
    }
    Ok(())
}

async fn stats(cfg: &PlaytimeConfig, config_path: &Path, local: bool) -> Result<()> {
    let stats: Vec<GameStats> = if local {
        aggregate_by_game(&local_sessions(cfg, config_path)?)
    } else {
        authed_client(cfg)?
            .stats()
            .await?
            .into_iter()
            .map(GameStats::from)
            .collect()
    };

    for s in &stats {
        let last = s
            .last_played
            .map(|t| t.with_timezone(&Local).format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<28} {:>12}  {:>4} sessions  last {}",
            s.game_name,
            format_duration(s.total_seconds),
            s.session_count,
            last,
        );
    }
    Ok(())
}

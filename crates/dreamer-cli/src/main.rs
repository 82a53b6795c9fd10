//! dreamer - command-line view of the Dreamer's Land info backend.
//!
//! Prints the same profile, server and channel data the homepage and the
//! verification portal show, using the same cache and fallback rules.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dreamer_core::utils::truncate_string;
use dreamer_core::{
    AccessorState, Config, DataResult, DataSource, HomepageView, InfoAccessor, InfoService,
    PortalView, StalePolicy,
};

/// Width the owner bio is cut to in text output
const ABOUT_PREVIEW_CHARS: usize = 120;

#[derive(Parser)]
#[command(name = "dreamer", version, about = "Dreamer's Land profile and server info")]
struct Cli {
    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Backend base URL (overrides config and DREAMER_BACKEND_URL)
    #[arg(long, global = true)]
    backend_url: Option<String>,

    /// Never contact the backend, use the bundled profile
    #[arg(long, global = true)]
    offline: bool,

    /// Keep the cache in memory only
    #[arg(long, global = true)]
    no_persist: bool,

    /// Serve an expired cache entry when the backend is down
    #[arg(long, global = true)]
    serve_stale: bool,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Homepage data: owner profile, presence, socials
    Show,
    /// Verification portal data: server stats and channel card
    Portal,
    /// Ignore the cache and fetch from the backend
    Refresh,
    /// Remove the cached info document
    ClearCache,
    /// Show configuration and cache age
    Status,
}

/// Initialize the tracing subscriber for logging
fn init_tracing(log_file: Option<&PathBuf>) -> Result<Option<WorkerGuard>> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
            let name = path
                .file_name()
                .ok_or_else(|| anyhow::anyhow!("Invalid log file path: {}", path.display()))?;
            let appender =
                tracing_appender::rolling::never(dir.unwrap_or_else(|| ".".as_ref()), name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    Ok(guard)
}

fn build_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load()?;
    if let Some(ref url) = cli.backend_url {
        config.backend_url = url.clone();
    }
    if cli.offline {
        config.use_remote_api = false;
    }
    if cli.no_persist {
        config.persistent_cache = false;
    }
    if cli.serve_stale {
        config.stale_policy = StalePolicy::ServeStaleOnFailure;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = init_tracing(cli.log_file.as_ref())?;

    let config = build_config(&cli)?;
    info!(backend = %config.backend_url, "dreamer starting");

    let service = Arc::new(InfoService::from_config(&config)?);

    match cli.command.unwrap_or(Command::Show) {
        Command::Show => {
            let state = InfoAccessor::mount(service).settled().await;
            print_homepage(&state, cli.json)?;
        }
        Command::Portal => {
            let state = InfoAccessor::mount(service).settled().await;
            print_portal(&state, cli.json)?;
        }
        Command::Refresh => {
            let result = service.refresh_data().await;
            print_refresh(&result, cli.json)?;
        }
        Command::ClearCache => {
            service.clear_cache();
            if cli.json {
                println!("{}", serde_json::json!({ "cleared": true }));
            } else {
                println!("Cache cleared");
            }
        }
        Command::Status => print_status(&config, &service, cli.json)?,
    }

    Ok(())
}

fn connection_line(is_connected: bool, source: DataSource, error: Option<&str>) -> String {
    match (is_connected, error) {
        (true, _) => format!("connected ({})", source.label()),
        (false, Some(error)) => format!("offline ({}): {}", source.label(), error),
        (false, None) => format!("offline ({})", source.label()),
    }
}

fn print_homepage(state: &AccessorState, json: bool) -> Result<()> {
    let view = HomepageView::from_snapshot(&state.data);

    if json {
        let out = serde_json::json!({
            "connected": state.is_connected,
            "source": state.source.label(),
            "error": state.error,
            "homepage": view,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{}", view.meta.title);
    match view.status_badge {
        Some(badge) => println!("  {} [{}]", view.owner.display_name, badge.label),
        None => println!("  {}", view.owner.display_name),
    }
    println!("  {}", truncate_string(&view.owner.about, ABOUT_PREVIEW_CHARS));
    println!();
    println!("  YouTube    {}  {}", view.youtube.handle, view.youtube.url);
    println!("  Instagram  {}  {}", view.instagram.handle, view.instagram.url);
    println!("  Discord    {}  {}", view.discord_profile.handle, view.discord_profile.url);
    println!("  Server     {}  {}", view.server.name, view.server.invite_url);
    println!();
    println!(
        "  {}",
        connection_line(state.is_connected, state.source, state.error.as_deref())
    );
    Ok(())
}

fn print_portal(state: &AccessorState, json: bool) -> Result<()> {
    let view = PortalView::from_snapshot(&state.data);

    if json {
        let out = serde_json::json!({
            "connected": state.is_connected,
            "source": state.source.label(),
            "error": state.error,
            "portal": view,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{}", view.server.name);
    println!("  Members    {}", view.stats.member_count_formatted);
    println!("  Verified   {}", view.stats.verified_count_formatted);
    println!("  Join       {}", view.server.invite_url);
    println!();
    println!("{}", view.youtube_channel.name);
    println!("  {}", view.youtube_channel.subscribers_label());
    println!("  {}", view.youtube_channel.url);
    println!();
    println!(
        "  {}",
        connection_line(state.is_connected, state.source, state.error.as_deref())
    );
    Ok(())
}

fn print_refresh(result: &DataResult, json: bool) -> Result<()> {
    if json {
        let out = serde_json::json!({
            "connected": result.is_connected,
            "source": result.source.label(),
            "error": result.error,
            "data": &*result.data,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!(
            "{}",
            connection_line(result.is_connected, result.source, result.error.as_deref())
        );
    }
    Ok(())
}

fn print_status(config: &Config, service: &InfoService, json: bool) -> Result<()> {
    let age = service.cache_age();
    let cache_dir = if config.persistent_cache {
        Some(config.cache_dir()?)
    } else {
        None
    };

    if json {
        let out = serde_json::json!({
            "backend_url": config.backend_url,
            "use_remote_api": config.use_remote_api,
            "cache_ttl_secs": config.cache_ttl_secs,
            "cache_dir": cache_dir,
            "cache_age": age,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Backend     {}", config.backend_url);
    println!(
        "Remote API  {}",
        if config.use_remote_api { "enabled" } else { "disabled" }
    );
    match cache_dir {
        Some(dir) => println!("Cache       {}", dir.display()),
        None => println!("Cache       in memory"),
    }
    println!("Cached      {}", age.as_deref().unwrap_or("never"));
    Ok(())
}

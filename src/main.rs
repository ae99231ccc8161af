use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use clap::{Parser, Subcommand};

mod config;
mod error;
mod fetch;
mod handler;
mod http;
mod logger;
mod preview;
mod routing;
mod server;
mod wordpress;

/// Server-rendered WordPress preview page with live-site passthrough
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Configuration file, extension optional
    #[arg(short, long, env = "WPPREVIEW_CONFIG", default_value = "config")]
    config: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve preview requests (default)
    Serve,
    /// Fill title and content of on-demand collection items from the CMS
    Prefetch {
        /// JSON array of collection items
        #[arg(long)]
        items: PathBuf,
        /// Where to write the filled items; defaults to rewriting `--items`
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the host registration and the permalink data for preview pages
    Registration,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cfg = config::Config::load_from(&cli.config)?;
    logger::init(&cfg)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(cfg),
        Command::Prefetch { items, output } => prefetch(cfg, &items, output.as_deref()),
        Command::Registration => {
            let registration = preview::PreviewRegistration::from_config(&cfg.preview)?;
            let out = serde_json::json!({
                "plugin": registration.host_plugin_options(),
                "page_data": registration.permalink_data(),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
            Ok(())
        }
    }
}

fn serve(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    // Worker thread count follows `server.workers`, CPU cores otherwise
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let state = Arc::new(config::AppState::new(cfg)?);
    let listener = server::create_listener(addr)?;
    let active_connections = Arc::new(AtomicUsize::new(0));

    logger::log_server_start(&addr, &state.config);
    logger::log_registration(&state.registration);

    // LocalSet for spawn_local support
    let local = tokio::task::LocalSet::new();
    local
        .run_until(server::start_server_loop(
            listener,
            state,
            active_connections,
            server::shutdown_signal(),
        ))
        .await;
    Ok(())
}

fn prefetch(
    cfg: config::Config,
    items_path: &Path,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(items_path)?;
    let mut items: Vec<preview::RenderCandidate> = serde_json::from_str(&raw)?;
    let state = config::AppState::new(cfg)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let mapped = runtime.block_on(preview::prefetch_serverless_items(
        &mut items,
        &state.gateway,
        |item, post| item.fill_from(post),
    ))?;

    std::fs::write(output.unwrap_or(items_path), serde_json::to_string_pretty(&items)?)?;
    logger::log_prefetch_done(mapped, items.len());
    Ok(())
}

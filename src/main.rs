use clap::Parser;
use std::io::Write as _;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tailview::{poller, render};
use tailview_core::{config::Config, SourceKind};
use tailview_server::{routes, LocalTransport, LogService};
use tailview_sources::{EventTable, LogFile, MemoryTable};

#[derive(Parser)]
#[command(name = "tailview", about = "tail, merge, and watch web-server logs")]
struct Cli {
    /// Config file to use instead of ~/.config/tailview/config.toml.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write debug logs to /tmp/tailview-debug.log (tail -f to inspect).
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.debug {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open("/tmp/tailview-debug.log")?;
        tracing_subscriber::fmt()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .init();
        tracing::info!("tailview debug log started — tail -f /tmp/tailview-debug.log");
    }

    let config = match &cli.config {
        Some(path) => Config::load_path(path)?,
        None => Config::load()?,
    };

    let table: Arc<dyn EventTable> = Arc::new(MemoryTable::new());
    let service = Arc::new(LogService::new(
        LogFile::from_setting(&config.sources.access_log_path),
        LogFile::from_setting(&config.sources.error_log_path),
        table,
    ));

    let listener = tokio::net::TcpListener::bind(&config.server.listen).await?;
    tracing::info!(listen = %config.server.listen, "serving log API");
    let router = routes::router(Arc::clone(&service), config.sources.track_activity);
    tokio::spawn(async move {
        let app = router.into_make_service_with_connect_info::<SocketAddr>();
        if let Err(err) = axum::serve(listener, app).await {
            tracing::warn!(error = %err, "log API server stopped");
        }
    });

    let transport = Arc::new(LocalTransport::new(service));
    let handle = poller::spawn(transport, config.poll.interval());
    handle.enable(SourceKind::Access).await?;
    handle.enable(SourceKind::Error).await?;
    handle.enable(SourceKind::Internal).await?;

    let mut snapshots = handle.snapshots();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let records = snapshots.borrow_and_update().clone();
                let mut stdout = std::io::stdout().lock();
                // Clear the screen and redraw the whole merged view.
                write!(stdout, "\x1b[2J\x1b[H{}", render::render_table(&records))?;
                stdout.flush()?;
            }
        }
    }

    let _ = handle.shutdown().await;
    Ok(())
}

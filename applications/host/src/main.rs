/// Aurora host - local music library and playback backend
use aurora_core::ScanProgress;
use aurora_enrichment::{read_local_lyrics, Enrichment, EnrichmentConfig, LyricsQuery};
use aurora_host::{
    config::HostConfig,
    services::player::TICK_INTERVAL,
    state::AppState,
};
use aurora_library::LibraryCache;
use aurora_subsonic::SubsonicClient;
use clap::{Parser, Subcommand};
use std::{net::SocketAddr, path::PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "aurora-host")]
#[command(about = "Aurora music player backend", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "AURORA_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP host
    Serve,
    /// Scan a folder into the library
    Scan {
        /// Folder to scan
        path: PathBuf,
    },
    /// Forget a folder and every track under it
    RemoveFolder {
        /// Folder as it was scanned
        path: String,
    },
    /// Pull the remote library listing
    SubsonicSync,
    /// Print lyrics for an audio file
    Lyrics {
        /// Audio file path
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aurora_host=info,aurora_library=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = HostConfig::load(cli.config.as_deref())?;
    config.validate()?;

    match cli.command {
        Commands::Serve => serve(config).await?,
        Commands::Scan { path } => scan(&config, path).await?,
        Commands::RemoveFolder { path } => remove_folder(&config, &path).await?,
        Commands::SubsonicSync => subsonic_sync(&config).await?,
        Commands::Lyrics { path } => lyrics(&config, path).await?,
    }

    Ok(())
}

async fn serve(config: HostConfig) -> anyhow::Result<()> {
    tracing::info!("Starting Aurora host");
    tracing::info!("Host: {}", config.server.host);
    tracing::info!("Port: {}", config.server.port);
    tracing::info!("Data directory: {}", config.storage.data_dir.display());

    let state = AppState::init(&config).await?;
    tracing::info!(tracks = state.library.track_count(), "Library loaded");

    let ticker = state.player.spawn_ticker(TICK_INTERVAL);
    let app = aurora_host::create_router(state.clone());

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    ticker.abort();
    state.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}

async fn open_library(config: &HostConfig) -> anyhow::Result<LibraryCache> {
    tokio::fs::create_dir_all(&config.storage.data_dir).await?;
    Ok(LibraryCache::init(config.library_config()).await)
}

async fn scan(config: &HostConfig, path: PathBuf) -> anyhow::Result<()> {
    let library = open_library(config).await?;

    let (tx, mut rx) = tokio::sync::mpsc::channel::<ScanProgress>(16);
    let reporter = tokio::spawn(async move {
        while let Some(progress) = rx.recv().await {
            tracing::info!("Scanned {}/{}", progress.current, progress.total);
        }
    });

    let count = library.scan_folder(&path, Some(tx)).await;
    reporter.await?;
    library.teardown().await;

    println!("Scanned {} tracks from {}", count, path.display());
    Ok(())
}

async fn remove_folder(config: &HostConfig, path: &str) -> anyhow::Result<()> {
    let library = open_library(config).await?;
    let removed = library.remove_folder(path);
    library.teardown().await;

    println!("Removed {} tracks under {}", removed, path);
    Ok(())
}

async fn subsonic_sync(config: &HostConfig) -> anyhow::Result<()> {
    let Some(remote) = config.subsonic.to_config() else {
        anyhow::bail!("subsonic.url is not set");
    };
    let client = SubsonicClient::with_config(remote)?;
    let tracks = client.fetch_all_songs().await?;

    let library = open_library(config).await?;
    let count = tracks.len();
    library.replace_remote_tracks(tracks);
    library.teardown().await;

    println!("Synced {} remote tracks", count);
    Ok(())
}

async fn lyrics(config: &HostConfig, path: PathBuf) -> anyhow::Result<()> {
    if let Some(content) = read_local_lyrics(&path).await {
        println!("{content}");
        return Ok(());
    }
    if !config.enrichment.enabled {
        anyhow::bail!("No sidecar lyrics for {}", path.display());
    }

    let library = open_library(config).await?;
    let track = library.track_by_path(&path.to_string_lossy());
    library.teardown().await;
    let Some(track) = track else {
        anyhow::bail!("{} is not in the library", path.display());
    };

    let enrichment = Enrichment::new(&EnrichmentConfig {
        user_agent: config.enrichment.user_agent.clone(),
        ..Default::default()
    })?;
    match enrichment
        .lyrics
        .find_lyrics(&path, &LyricsQuery::from(&track))
        .await
    {
        Some(found) => println!("{}", found.content),
        None => anyhow::bail!("No lyrics found for {}", track.title),
    }
    Ok(())
}

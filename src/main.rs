use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use roget::{AppState, router};
use roget_db::{LoadMode, ParseOptions, Thesaurus, parse_load_mode};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_SOURCE: &str = "roget.txt";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = load_config();
    info!("binding to {}:{}", config.host, config.port);
    info!(
        "using thesaurus at {} (mode: {:?})",
        config.source.display(),
        config.mode
    );
    if let Some(cache) = &config.cache {
        info!("snapshot cache at {}", cache.display());
    }

    let start = Instant::now();
    let thesaurus = match &config.cache {
        Some(cache) => {
            Thesaurus::load_cached_with_options(&config.source, cache, config.mode, &config.options)?
        }
        None => Thesaurus::load_with_options(&config.source, config.mode, &config.options)?,
    };
    info!(
        "thesaurus ready in {} ms ({} headwords)",
        start.elapsed().as_millis(),
        thesaurus.head_word_count()
    );

    let state = AppState {
        thesaurus: Arc::new(thesaurus),
    };

    let app = router(state).layer(TraceLayer::new_for_http());
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", config.host, config.port))?;
    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Debug, Clone)]
struct Config {
    host: String,
    port: u16,
    source: PathBuf,
    cache: Option<PathBuf>,
    mode: LoadMode,
    options: ParseOptions,
}

fn load_config() -> Config {
    let mut cli_source: Option<PathBuf> = None;
    let mut cli_cache: Option<PathBuf> = None;
    let mut cli_mode: Option<LoadMode> = None;
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--source" => cli_source = args.next().map(PathBuf::from),
            "--cache" => cli_cache = args.next().map(PathBuf::from),
            _ => {
                if let Some(path) = arg.strip_prefix("--source=") {
                    cli_source = Some(PathBuf::from(path));
                } else if let Some(path) = arg.strip_prefix("--cache=") {
                    cli_cache = Some(PathBuf::from(path));
                } else if let Some(mode) = arg.strip_prefix("--load-mode=") {
                    cli_mode = parse_load_mode(mode);
                }
            }
        }
    }

    let host = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);
    let source = cli_source
        .or_else(|| env::var("ROGET_SOURCE").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE));
    let cache = cli_cache.or_else(|| env::var("ROGET_CACHE").ok().map(PathBuf::from));
    let mode = cli_mode
        .or_else(|| {
            env::var("ROGET_LOAD_MODE")
                .ok()
                .as_deref()
                .and_then(parse_load_mode)
        })
        .unwrap_or(LoadMode::Mmap);
    let mut options = ParseOptions::default();
    if let Ok(marker) = env::var("ROGET_END_MARKER")
        && !marker.trim().is_empty()
    {
        options.end_marker = marker;
    }

    Config {
        host,
        port,
        source,
        cache,
        mode,
        options,
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let max_level = env_filter
        .max_level_hint()
        .and_then(|hint| hint.into_level())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .with_max_level(max_level)
        .init();
}

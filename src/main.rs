use clap::Parser;
use linkwall_core::config::Config;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "linkwall", about = "linkwall — chat mentions as a wall of link cards")]
struct Cli {
    /// Write debug logs to /tmp/linkwall-debug.log (tail -f to inspect).
    #[arg(long)]
    debug: bool,

    /// Config file to use instead of ~/.config/linkwall/config.toml.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Search term; repeat for several. Replaces the configured terms.
    #[arg(long = "term", value_name = "TERM")]
    terms: Vec<String>,

    /// Print the first page of cards as JSON lines and exit.
    #[arg(long)]
    headless: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.debug {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open("/tmp/linkwall-debug.log")?;
        tracing_subscriber::fmt()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .init();
        tracing::info!("linkwall debug log started — tail -f /tmp/linkwall-debug.log");
    }

    let config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "config unreadable, using defaults");
            Config::defaults()
        }),
    };
    let mut filter = config.filter()?;
    if !cli.terms.is_empty() {
        filter.terms = cli.terms.clone();
    }
    if cli.headless && filter.terms.is_empty() {
        anyhow::bail!("no search terms configured; pass --term <TERM>");
    }

    let runtime = tokio::runtime::Runtime::new()?;
    let _enter = runtime.enter();
    let sources = linkwall::sources_from_config(&config.sources)?;
    let cancel = CancellationToken::new();
    let (handle, mut views, owner) = linkwall::start_feed(&config, sources, filter, cancel.clone());

    let result = if cli.headless {
        let mut stdout = std::io::stdout().lock();
        runtime
            .block_on(linkwall::run_headless(&mut views, &mut stdout))
            .map(|count| tracing::info!(count, "headless output written"))
    } else {
        linkwall_tui::run(config, handle.clone(), views)
    };

    handle.shutdown();
    cancel.cancel();
    if let Err(e) = runtime.block_on(owner) {
        tracing::warn!(error = %e, "feed owner task failed");
    }
    result
}

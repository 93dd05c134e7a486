use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use box_grid::catalog::Category;
use box_grid::config::Config;
use box_grid::persist::{FileStorage, MemoryStorage, RecordStorage};
use box_grid::App;

#[derive(Parser, Debug)]
#[command(name = "box-grid")]
#[command(about = "Fill a grid of boxes from a categorized keypad")]
#[command(version)]
struct Cli {
    /// Config file to use instead of ~/.config/box-grid/config.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Keep state in memory only; nothing is restored or persisted
    #[arg(long)]
    ephemeral: bool,

    /// Print the keypad catalog and exit
    #[arg(long)]
    show_catalog: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (stderr keeps the grid output clean)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if cli.show_catalog {
        return show_catalog(&config);
    }

    let storage: Arc<dyn RecordStorage> = if cli.ephemeral {
        info!("Ephemeral mode: state will not be persisted");
        Arc::new(MemoryStorage::new())
    } else {
        let storage = FileStorage::new(config.storage.resolve_dir()?);
        info!("Persisting boxes under {:?}", storage.dir());
        Arc::new(storage)
    };

    info!("Starting box-grid");
    let mut app = App::new(&config, storage)?;

    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();

    let result = tokio::select! {
        result = app.run(stdin, stdout) => result,
        _ = signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
            Ok(())
        }
    };

    app.shutdown();
    result
}

fn show_catalog(config: &Config) -> Result<()> {
    let catalog = config.button_catalog()?;

    for category in Category::ALL {
        println!("{}:", category);
        for key in catalog.lookup(category) {
            println!("  {:>3}  {}", key.id, key.label);
        }
    }

    Ok(())
}

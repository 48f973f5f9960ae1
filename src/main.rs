use anyhow::Result;
use clap::Parser;
use playlist_sync::lister::YtDlpLister;
use playlist_sync::{run_failed, CatalogSyncer, SyncConfig, SyncJob};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "playlist-sync")]
#[command(about = "Refresh playlist tracklists in the site catalog from YouTube", long_about = None)]
struct Args {
    /// Directory holding playlists.json
    #[arg(short = 'd', long, default_value = "data")]
    data_dir: String,

    /// Additional catalog files to sync (can be specified multiple times)
    #[arg(long = "catalog")]
    catalogs: Vec<String>,

    /// Top-level keys to sync instead of the defaults (can be specified multiple times)
    #[arg(long = "root")]
    roots: Vec<String>,

    /// Per-playlist fetch timeout in seconds
    #[arg(long, default_value = "120")]
    timeout: u64,

    /// Verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    log::info!("=== YouTube Playlist Sync ===");

    // Expand ~ in paths
    let data_dir = PathBuf::from(shellexpand::tilde(&args.data_dir).as_ref());
    let mut config = SyncConfig::default_for(&data_dir);
    for catalog in &args.catalogs {
        config = config.with_job(SyncJob::new(shellexpand::tilde(catalog).into_owned()));
    }
    if !args.roots.is_empty() {
        config = config.with_root_keys(&args.roots);
    }

    let lister = YtDlpLister::new().with_timeout(Duration::from_secs(args.timeout));
    let syncer = CatalogSyncer::new(lister);
    let reports = syncer.run(&config);

    log::info!("=== Summary ===");
    for report in &reports {
        report.log_summary();
    }

    if run_failed(&reports) {
        anyhow::bail!("Required catalog could not be synced");
    }

    Ok(())
}

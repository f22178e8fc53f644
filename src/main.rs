use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use log::{info, warn};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use promptkit::core::clipboard::SystemClipboard;
use promptkit::core::config::{self, CliOverrides};
use promptkit::core::relay::{Relay, server};
use promptkit::core::workspace::Workspace;
use promptkit::tui::{self, Services};
use promptkit::tui::components::Outlets;

#[derive(Parser)]
#[command(name = "promptkit", about = "Build AI prompts from files or git state")]
struct Args {
    /// Directory to browse and run git in (defaults to the current directory)
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Port for the browser extension relay
    #[arg(short, long)]
    port: Option<u16>,

    /// Do not start the browser extension relay
    #[arg(long)]
    no_relay: bool,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();

    // Initialize file logger - writes to ~/.promptkit/promptkit.log.
    // Installed before config loading so its diagnostics are kept; the level
    // is narrowed once the config is resolved.
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Some(path) = config::log_path() {
        if let Some(dir) = path.parent() {
            let _ = fs::create_dir_all(dir);
        }
        if let Ok(log_file) = File::create(&path) {
            let _ = WriteLogger::init(LevelFilter::Trace, log_config, log_file);
        }
    }

    let file_config = match config::load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: {e}, using defaults");
            warn!("Config not loaded: {}", e);
            Default::default()
        }
    };
    let resolved = config::resolve(
        &file_config,
        &CliOverrides {
            root: args.root,
            port: args.port,
            no_relay: args.no_relay,
        },
    );
    for warning in &resolved.warnings {
        warn!("{}", warning);
    }
    log::set_max_level(resolved.log_level);

    info!("Promptkit starting in {}", resolved.root.display());

    let mut outlets = Outlets {
        clipboard: Some(Arc::new(SystemClipboard::new())),
        ..Default::default()
    };

    let mut relay_server = None;
    let mut broadcaster = None;
    if resolved.relay_enabled {
        let relay = Relay::new();
        match server::start(relay.clone(), resolved.relay_addr).await {
            Ok(started) => {
                let (sink, handle) = relay.spawn_broadcaster();
                outlets.sink = Some(sink);
                outlets.consumers = Some(Arc::new(relay));
                relay_server = Some(started);
                broadcaster = Some(handle);
            }
            Err(e) => warn!("Extension relay unavailable: {}", e),
        }
    }

    let workspace = Workspace::new(&resolved.root).with_max_depth(resolved.max_depth);
    let result = tui::run(
        &resolved,
        Services {
            workspace: Arc::new(workspace),
            outlets,
        },
    );

    if let Some(running) = relay_server {
        running.shutdown().await;
    }
    if let Some(handle) = broadcaster {
        handle.abort();
    }

    info!("Promptkit exiting");
    result
}

use std::io::{self, BufRead, Write};
use std::process;
use std::sync::Arc;
use std::time::Duration;

use log::{error, info, warn};

use quire::app::App;
use quire::boot;
use quire::cli::{self, Command};
use quire::config::Config;
use quire::content::{ContentStore, PostSource};
use quire::fetch::{Fetcher, SourceFetcher};
use quire::store;

fn main() {
    env_logger::init();

    let config = Config::load();

    // Boot check: create the storage directory, inspect content sources
    boot::run(&config);

    let storage = match store::open(&config.storage) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to open {} storage: {}", config.storage.backend, e);
            process::exit(1);
        }
    };

    let timeout = Duration::from_secs(config.content.fetch_timeout_secs.max(1));
    let fetcher: Arc<dyn Fetcher> = match SourceFetcher::new(timeout) {
        Ok(f) => Arc::new(f),
        Err(e) => {
            error!("Failed to build fetcher: {}", e);
            process::exit(1);
        }
    };

    let content = ContentStore::new(
        storage,
        fetcher,
        PostSource::from_config(&config),
        config.display.clone(),
    );
    let mut app = App::new(content);

    info!("Ready. Reading UI events from stdin.");

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                error!("stdin read failed: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let event = match cli::parse_line(&line) {
            Ok(Command::Event(ev)) => ev,
            Ok(Command::Quit) => break,
            Err(e) => {
                warn!("{}", e);
                continue;
            }
        };

        let update = app.dispatch(event);
        match serde_json::to_string(&update) {
            Ok(json) => {
                if writeln!(stdout, "{}", json).is_err() {
                    break;
                }
            }
            Err(e) => error!("Could not encode view update: {}", e),
        }
    }
}

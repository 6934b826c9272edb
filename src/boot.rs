use log::{error, info, warn};
use std::fs;
use std::path::Path;
use std::process;

use crate::config::Config;
use crate::fetch::is_remote;

#[derive(Debug, Default, PartialEq)]
pub struct BootReport {
    pub warnings: u32,
    pub errors: u32,
}

/// Run all boot checks. Call this before opening storage.
/// Aborts the process if anything unrecoverable is found.
pub fn run(config: &Config) {
    let report = check(config);

    if report.errors > 0 {
        error!(
            "Boot check FAILED: {} error(s), {} warning(s). Aborting.",
            report.errors, report.warnings
        );
        process::exit(1);
    }

    if report.warnings > 0 {
        warn!(
            "Boot check passed with {} warning(s). Some content may not load.",
            report.warnings
        );
    } else {
        info!("Boot check passed.");
    }
}

/// Creates the storage directory and inspects the content sources.
pub fn check(config: &Config) -> BootReport {
    info!("Quire boot check starting...");
    let mut report = BootReport::default();

    // ── 1. Storage backend ─────────────────────────────
    match config.storage.backend.as_str() {
        "memory" => {
            warn!("  Memory storage selected: comments and messages are lost on exit");
            report.warnings += 1;
        }
        "sqlite" => check_storage_dir(&config.storage.path, &mut report),
        other => {
            error!("  Unknown storage backend: {}", other);
            report.errors += 1;
        }
    }

    // ── 2. Metadata source ─────────────────────────────
    if let Some(metadata) = config.content.metadata.as_deref() {
        if !is_remote(metadata) && !Path::new(metadata).exists() {
            warn!("  Metadata file not found: {} (initial load will fail)", metadata);
            report.warnings += 1;
        }
    }

    // ── 3. Content base ────────────────────────────────
    if let Some(base) = config.content.content_base.as_deref() {
        if !is_remote(base) && !Path::new(base).is_dir() {
            warn!("  Content directory not found: {} (posts will show without body)", base);
            report.warnings += 1;
        }
    }

    // ── 4. Timezone ────────────────────────────────────
    if config.display.timezone.parse::<chrono_tz::Tz>().is_err() {
        warn!("  Unknown timezone {}, dates will use UTC", config.display.timezone);
        report.warnings += 1;
    }

    report
}

fn check_storage_dir(db_path: &str, report: &mut BootReport) {
    let dir = match Path::new(db_path).parent() {
        Some(d) if !d.as_os_str().is_empty() => d,
        _ => return,
    };

    if !dir.exists() {
        match fs::create_dir_all(dir) {
            Ok(_) => info!("  Created directory: {}", dir.display()),
            Err(e) => {
                error!("  FAILED to create directory {}: {}", dir.display(), e);
                report.errors += 1;
                return;
            }
        }
    }

    let test_file = dir.join(".write_test");
    match fs::write(&test_file, "test") {
        Ok(_) => {
            let _ = fs::remove_file(&test_file);
        }
        Err(e) => {
            error!("  Storage directory not writable: {}", e);
            report.errors += 1;
        }
    }
}

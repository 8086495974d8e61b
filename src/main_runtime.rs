use std::path::Path;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use wagerbook::config::LoggingConfig;

/// Console logs go to stderr so table and JSON output on stdout stay clean.
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info,wagerbook=debug"));

    // WAGERBOOK_LOG_DIR wins over logging.dir; no directory means console only
    let file_layer = std::env::var("WAGERBOOK_LOG_DIR")
        .ok()
        .or_else(|| config.dir.clone())
        .and_then(|dir| match ensure_writable(Path::new(&dir)) {
            Ok(()) => {
                let appender = tracing_appender::rolling::daily(&dir, "wagerbook.log");
                let (writer, guard) = tracing_appender::non_blocking(appender);
                // the writer must outlive main
                Box::leak(Box::new(guard));
                Some(
                    tracing_subscriber::fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false)
                        .with_target(true),
                )
            }
            Err(e) => {
                eprintln!("Warning: log directory {} unusable ({}), file logging disabled", dir, e);
                None
            }
        });

    let json_layer = config.json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
    });
    let plain_layer = (!config.json).then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_file(false)
            .with_line_number(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(plain_layer)
        .with(json_layer)
        .with(file_layer)
        .init();
}

/// `rolling::daily` panics when it cannot create its first file, so check
/// the directory with a throwaway file before handing it over.
fn ensure_writable(dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let marker = dir.join(".wagerbook_write_test");
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&marker)?;
    let _ = std::fs::remove_file(&marker);
    Ok(())
}

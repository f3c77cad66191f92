//! Stderr logging for pipeline runs.
//!
//! Lines look like `   0.012s DEBUG binarize::threshold: message`: seconds
//! since install, level, and the emitting stage with the `blobmark_` crate
//! prefix dropped. Records from other crates (image decoders, clap) are
//! capped at `Warn` so a debug run only shows pipeline stages.

use std::fmt::Write as _;
use std::io::Write as _;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

const CRATE_PREFIX: &str = "blobmark";

struct StageLogger {
    level: LevelFilter,
    started: Instant,
}

impl StageLogger {
    fn level_for(&self, target: &str) -> LevelFilter {
        if target.starts_with(CRATE_PREFIX) {
            self.level
        } else {
            self.level.min(LevelFilter::Warn)
        }
    }
}

impl Log for StageLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level_for(metadata.target())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let mut line = String::new();
        let _ = writeln!(
            line,
            "{:8.3}s {:<5} {}: {}",
            self.started.elapsed().as_secs_f64(),
            record.level(),
            stage_name(record.target()),
            record.args()
        );
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// `blobmark_binarize::threshold` -> `binarize::threshold`; `blobmark` -> `blobmark`.
fn stage_name(target: &str) -> &str {
    target
        .strip_prefix("blobmark_")
        .or_else(|| target.strip_prefix("blobmark::"))
        .unwrap_or(target)
}

static LOGGER: OnceLock<StageLogger> = OnceLock::new();

/// Install the stderr logger at `level` for blobmark stages.
///
/// Only the first call installs; later calls keep the first level.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_some() {
        return Ok(());
    }
    let logger = LOGGER.get_or_init(|| StageLogger {
        level,
        started: Instant::now(),
    });
    log::set_logger(logger)?;
    log::set_max_level(level);
    Ok(())
}

/// Install a `tracing` subscriber writing to stderr, filtered by `RUST_LOG`
/// (default `info`). Span close events carry stage timings; `json` switches
/// to flattened JSON lines.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{fmt, EnvFilter, Layer};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let output = if json {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_span_events(FmtSpan::CLOSE)
            .json()
            .flatten_event(true)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_span_events(FmtSpan::CLOSE)
            .with_timer(fmt::time::Uptime::default())
            .boxed()
    };
    let _ = tracing_subscriber::registry()
        .with(output)
        .with(filter)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    #[test]
    fn repeated_init_is_a_no_op() {
        assert!(init_with_level(LevelFilter::Warn).is_ok());
        assert!(init_with_level(LevelFilter::Debug).is_ok());
        assert_eq!(LOGGER.get().map(|l| l.level), Some(LevelFilter::Warn));
    }

    #[test]
    fn other_crates_are_capped_at_warn() {
        let logger = StageLogger {
            level: LevelFilter::Debug,
            started: Instant::now(),
        };
        let meta = |level, target| Metadata::builder().level(level).target(target).build();

        assert!(logger.enabled(&meta(Level::Debug, "blobmark_region::labeler")));
        assert!(!logger.enabled(&meta(Level::Debug, "png::decoder")));
        assert!(logger.enabled(&meta(Level::Warn, "png::decoder")));
        assert!(!logger.enabled(&meta(Level::Trace, "blobmark")));
    }

    #[test]
    fn stage_names_drop_the_crate_prefix() {
        assert_eq!(stage_name("blobmark_binarize::threshold"), "binarize::threshold");
        assert_eq!(stage_name("blobmark::locate"), "locate");
        assert_eq!(stage_name("blobmark"), "blobmark");
        assert_eq!(stage_name("image::codecs"), "image::codecs");
    }
}

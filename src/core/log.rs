use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

const CACHE_TARGET: &str = "acctpulse::core::cache";

fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Per-module levels for `verbosity` repetitions of `-v`.
///
/// Cache HIT/MISS lines fire once per indicator and month, so they only
/// show from `-vvv` on.
pub fn app_filter(verbosity: u8) -> Targets {
    let level = level_for(verbosity);
    let cache_level = if verbosity >= 3 {
        LevelFilter::TRACE
    } else {
        LevelFilter::WARN
    };
    Targets::new()
        .with_target("acctpulse", level)
        .with_target(CACHE_TARGET, cache_level)
}

/// Installs the global subscriber on stderr, keeping stdout for reports.
/// `RUST_LOG` narrows the output further.
pub fn init_logging(verbosity: u8) -> anyhow::Result<()> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(level_for(verbosity).into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(fmt::layer().pretty().without_time().with_writer(std::io::stderr))
        .with(app_filter(verbosity))
        .with(env_filter)
        .try_init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn test_default_shows_only_warnings() {
        let filter = app_filter(0);
        assert!(filter.would_enable("acctpulse::ingest::csv", &Level::WARN));
        assert!(!filter.would_enable("acctpulse::ingest::csv", &Level::INFO));
    }

    #[test]
    fn test_verbosity_raises_app_level() {
        assert!(app_filter(1).would_enable("acctpulse::ingest::csv", &Level::INFO));
        assert!(!app_filter(1).would_enable("acctpulse::core::turnover", &Level::DEBUG));
        assert!(app_filter(2).would_enable("acctpulse::core::turnover", &Level::DEBUG));
    }

    #[test]
    fn test_cache_lines_need_trace_verbosity() {
        assert!(!app_filter(2).would_enable(CACHE_TARGET, &Level::DEBUG));
        assert!(app_filter(3).would_enable(CACHE_TARGET, &Level::DEBUG));
    }

    #[test]
    fn test_other_crates_are_filtered_out() {
        assert!(!app_filter(3).would_enable("tokio::runtime", &Level::ERROR));
    }
}

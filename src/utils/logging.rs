//! Tracing subscriber setup for the `tena` binary.
//!
//! Logs go to stderr so they never interleave with the shell's stdout.

use crate::utils::config::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset. `verbose` raises the crate to `debug`.
pub fn filter_directive(config: &LoggingConfig, verbose: bool) -> String {
    if verbose {
        format!("{},tena=debug", config.level)
    } else {
        config.level.clone()
    }
}

/// Install the global subscriber. Call once, before any request is made.
pub fn init_tracing(config: &LoggingConfig, verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(config, verbose)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    // A subscriber may already be installed (tests, embedding front ends)
    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if let Err(e) = result {
        tracing::debug!("Tracing subscriber already set: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive() {
        let config = LoggingConfig::default();
        assert_eq!(filter_directive(&config, false), "warn");
        assert_eq!(filter_directive(&config, true), "warn,tena=debug");
    }
}

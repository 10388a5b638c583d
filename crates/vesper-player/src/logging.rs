//! Logger setup for the level runner

use env_logger::{Builder, Env};
use log::LevelFilter;

/// Route `log` records to stderr.
///
/// `RUST_LOG` overrides the level picked by `verbose`.
pub fn init(verbose: bool) {
    let fallback = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut builder = Builder::from_env(Env::default().default_filter_or(fallback.as_str()));
    builder.format_timestamp_millis().format_target(false);

    // A second call keeps the logger already in place.
    if builder.try_init().is_err() {
        log::debug!("logger already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_twice_keeps_first_logger() {
        init(true);
        init(false);
        assert!(log::max_level() >= LevelFilter::Error);
    }
}

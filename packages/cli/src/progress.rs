//! Logger and spinner setup.
//!
//! [`init_logger`] wraps `pretty_env_logger` in `indicatif-log-bridge` so
//! `log::info!` and friends are suspended while spinners redraw.

use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Initializes the global logger and returns the [`MultiProgress`] that
/// every spinner must be added to.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok(); // already set (tests)

    log::set_max_level(level);

    multi
}

/// Starts a spinner for a network call of unknown length.
#[must_use]
pub fn spinner(multi: &MultiProgress, message: &str) -> ProgressBar {
    let bar = multi.add(ProgressBar::new_spinner());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message.to_string());
    bar
}

/// Runs `fut` behind a spinner that is cleared when it completes.
pub async fn with_spinner<F, T>(multi: &MultiProgress, message: &str, fut: F) -> T
where
    F: Future<Output = T>,
{
    let bar = spinner(multi, message);
    let result = fut.await;
    bar.finish_and_clear();
    result
}

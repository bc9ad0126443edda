//! Logging setup for browser and native builds.
//!
//! The crate logs through `tracing`; its `log` feature forwards events to the
//! `console_log` logger in the browser, while native builds (SSR, tests,
//! tools) install a `tracing-subscriber` formatter.

/// Install the platform logger. Safe to call more than once.
pub fn init_logging() {
    #[cfg(feature = "hydrate")]
    {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Debug);
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = tracing_subscriber::fmt().try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_logging_is_idempotent() {
        init_logging();
        init_logging();
        tracing::info!("logging initialized twice");
    }
}

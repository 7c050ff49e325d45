//! Logging initialization

/// Initialize the logging system
///
/// Uses env_logger with default filter level of `info`.
/// Override with RUST_LOG environment variable, e.g. `RUST_LOG=bspview=debug`
/// to see visibility transitions.
///
/// # Example
/// ```
/// bspview::core::logging::init();
/// log::info!("Map loaded");
/// ```
pub fn init() {
    // try_init so hosts that already installed a logger are left alone
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).try_init();
}

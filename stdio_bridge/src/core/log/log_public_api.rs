// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use super::TracingConfig;
use crate::ok;
use tracing::dispatcher;

/// Global default subscriber, which once set, can't be unset or changed.
/// - This is great for apps.
/// - Docs for [Global default tracing
///   subscriber](https://docs.rs/tracing/latest/tracing/subscriber/fn.set_global_default.html)
/// - Configure this using the [`mod@crate::tracing_config_options`] module (which
///   converts any number of arguments into [`Into<TracingConfig>`]).
///
/// Logging is **DISABLED** by **default**.
///
/// If you don't call this function w/ a value other than [`tracing_core::LevelFilter::OFF`],
/// then logging won't be enabled. It won't matter if you use the [`tracing::info!`],
/// [`tracing::debug!`], etc. macros, which the bridge does liberally.
///
/// # Errors
///
/// Returns an error if the subscriber can't be installed.
pub fn try_initialize_logging_global(
    options: impl Into<TracingConfig>,
) -> miette::Result<()> {
    let it: TracingConfig = options.into();

    // Early return if the level filter is off.
    if matches!(it.get_level_filter(), tracing_core::LevelFilter::OFF) {
        return ok!();
    }

    it.install_global()
}

/// Thread local subscriber, which is thread local, and you can assign different ones
/// to different threads.
/// - This is great for tests.
/// - Docs for [Thread local tracing
///   subscriber](https://docs.rs/tracing/latest/tracing/subscriber/fn.set_default.html)
///
/// Logging is **DISABLED** by **default**. Returns [`None`] when the level filter is
/// [`tracing_core::LevelFilter::OFF`].
///
/// # Errors
///
/// Returns an error if the layers can't be created.
pub fn try_initialize_logging_thread_local(
    options: impl Into<TracingConfig>,
) -> miette::Result<Option<dispatcher::DefaultGuard>> {
    let it: TracingConfig = options.into();

    // Early return if the level filter is off.
    if matches!(it.get_level_filter(), tracing_core::LevelFilter::OFF) {
        return Ok(None);
    }

    it.install_thread_local().map(Some)
}

// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::ops::Add;
use tracing_core::LevelFilter;

/// Configure the tracing logging to suit your needs. You can display the logs to a:
/// 1. file,
/// 2. `stdout` or `stderr`,
/// 3. both.
///
/// Keep in mind that the bridge itself owns the terminal display. Logging to `stdout`
/// while a host process is attached will interleave log lines with the echoed input
/// line, so a file is usually what you want.
///
/// This configuration also allows you to set the log level. Use
/// [`crate::try_initialize_logging_global`] to install it.
#[derive(Debug, Clone, PartialEq)]
pub struct TracingConfig {
    pub level_filter: LevelFilter,
    pub writer_config: WriterConfig,
}

/// - `File(String)` is the file path to use for the log file. Eg: `/tmp/bridge.log` or
///   `log.txt`.
/// - `DisplayPreference`: [`DisplayPreference`] is the preferred display to use for
///   logging.
#[derive(Debug, Clone, PartialEq)]
pub enum WriterConfig {
    None,
    Display(DisplayPreference),
    File(String),
    DisplayAndFile(DisplayPreference, String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayPreference {
    Stdout,
    Stderr,
}

impl TracingConfig {
    #[must_use]
    pub fn get_writer_config(&self) -> WriterConfig { self.writer_config.clone() }

    #[must_use]
    pub fn get_level_filter(&self) -> LevelFilter { self.level_filter }
}

/// This module makes it easier to configure the logging system. Instead of having lots
/// of complex arguments to [`crate::try_initialize_logging_global`] and
/// [`crate::try_initialize_logging_thread_local`], they both receive a type that
/// implements [`Into<TracingConfig>`].
///
/// ```no_run
/// use stdio_bridge::{TracingConfig, DisplayPreference, WriterConfig,
///                    try_initialize_logging_global};
///
/// let config_1: TracingConfig = tracing_core::LevelFilter::DEBUG.into();
/// let config_2: TracingConfig = DisplayPreference::Stderr.into();
/// let config_3: TracingConfig = WriterConfig::File("bridge.log".to_string()).into();
///
/// try_initialize_logging_global(config_1 + config_2 + config_3).ok();
/// ```
pub mod tracing_config_options {
    use super::{Add, DisplayPreference, LevelFilter, TracingConfig, WriterConfig};

    pub const DEFAULT_LOG_FILE_NAME: &str = "log.txt";

    impl From<tracing::Level> for TracingConfig {
        fn from(level: tracing::Level) -> Self {
            Self {
                level_filter: level.into(),
                writer_config: WriterConfig::File(DEFAULT_LOG_FILE_NAME.to_string()),
            }
        }
    }

    impl From<LevelFilter> for TracingConfig {
        fn from(level_filter: LevelFilter) -> Self {
            Self {
                level_filter,
                writer_config: WriterConfig::File(DEFAULT_LOG_FILE_NAME.to_string()),
            }
        }
    }

    impl From<DisplayPreference> for TracingConfig {
        fn from(preferred_display: DisplayPreference) -> Self {
            Self {
                level_filter: LevelFilter::DEBUG,
                writer_config: WriterConfig::Display(preferred_display),
            }
        }
    }

    impl From<WriterConfig> for TracingConfig {
        fn from(writer_config: WriterConfig) -> Self {
            Self {
                level_filter: LevelFilter::DEBUG,
                writer_config,
            }
        }
    }

    /// Merge two [`TracingConfig`] instances together. The more verbose level wins.
    impl Add<TracingConfig> for TracingConfig {
        type Output = Self;

        fn add(self, rhs: Self) -> Self::Output {
            Self {
                level_filter: self.level_filter.max(rhs.level_filter),
                writer_config: self.writer_config + rhs.writer_config,
            }
        }
    }

    /// Merge two [`WriterConfig`] instances together. The `rhs` clobbers `self` where
    /// both carry a value, ie, the value in `rhs` has higher specificity.
    ///
    /// - `{a: "foo"} + {a: "bar"} = {a: "bar"}`.
    /// - `{a: None } + {a: "bar"} = {a: "bar"}`.
    /// - `{a: "foo"} + {a: None } = {a: "foo"}`.
    impl Add<WriterConfig> for WriterConfig {
        type Output = Self;

        fn add(self, rhs: WriterConfig) -> Self::Output {
            use WriterConfig::{Display, DisplayAndFile, File, None};

            match (self, rhs) {
                // No collision merge.
                (None, wc_rhs) => wc_rhs,
                (wc_lhs, None) => wc_lhs,
                (Display(dp), File(f)) | (File(f), Display(dp)) => DisplayAndFile(dp, f),

                // Collision (rhs has higher specificity).
                (Display(_), Display(dp_rhs)) => Display(dp_rhs),
                (File(_), File(f_rhs)) => File(f_rhs),
                (Display(_) | File(_) | DisplayAndFile(..), DisplayAndFile(dp_rhs, f_rhs)) => {
                    DisplayAndFile(dp_rhs, f_rhs)
                }
                (DisplayAndFile(_, f_lhs), Display(dp_rhs)) => DisplayAndFile(dp_rhs, f_lhs),
                (DisplayAndFile(dp_lhs, _), File(f_rhs)) => DisplayAndFile(dp_lhs, f_rhs),
            }
        }
    }
}

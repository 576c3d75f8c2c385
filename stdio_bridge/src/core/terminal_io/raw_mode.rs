// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use miette::IntoDiagnostic;

/// RAII guard that puts the real terminal in raw mode, and restores it when dropped
/// (including on panic). The bridge does its own echo and line editing, so the
/// terminal's own line discipline has to be off while it runs.
#[derive(Debug)]
pub struct RawModeGuard;

impl RawModeGuard {
    /// Create a new guard and enable raw mode.
    ///
    /// # Errors
    ///
    /// Returns an error if `stdin` is not a terminal, or raw mode can't be set.
    pub fn new() -> miette::Result<Self> {
        crossterm::terminal::enable_raw_mode().into_diagnostic()?;
        Ok(RawModeGuard)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) { drop(crossterm::terminal::disable_raw_mode()); }
}

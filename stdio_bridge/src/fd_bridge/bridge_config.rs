// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::DEFAULT_INTERRUPT_INDICATOR;

/// Knobs for [`crate::StdioBridge::install`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Render a bare `\n` written by the host as `\r\n`. Leave this on for raw mode
    /// terminals.
    pub convert_eol: bool,
    /// Echoed (followed by `\r\n`) when the user hits <kbd>Ctrl+C</kbd>.
    pub interrupt_indicator: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            convert_eol: true,
            interrupt_indicator: DEFAULT_INTERRUPT_INDICATOR.to_string(),
        }
    }
}

impl BridgeConfig {
    #[must_use]
    pub fn with_convert_eol(mut self, convert_eol: bool) -> Self {
        self.convert_eol = convert_eol;
        self
    }

    #[must_use]
    pub fn with_interrupt_indicator(mut self, indicator: impl Into<String>) -> Self {
        self.interrupt_indicator = indicator.into();
        self
    }
}

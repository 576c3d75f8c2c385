// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Canonical-mode ("cooked") line discipline.
//!
//! - [`InputEvent`] classifies raw display input (a data chunk, a byte, or a crossterm
//!   key event) into the handful of cases the discipline distinguishes.
//! - [`LineEditor`] owns the in-progress line and echoes edits.
//!
//! Only the subset needed to bridge line oriented `stdin` is supported: no cursor
//! movement within the line, no history, no escape sequence handling.

// Attach.
pub mod input_event;
pub mod line_editor;

// Re-export.
pub use input_event::*;
pub use line_editor::*;

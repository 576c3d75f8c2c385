// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{OutputDevice, lock_output_device_as_mut, ok};
use crossterm::style::Stylize;
use std::{borrow::Cow,
          fmt::Display,
          io};

/// The display side of the bridge: anything that can render raw text. Both the echo of
/// the line being edited and the host's `stdout` / `stderr` writes end up here, in the
/// order they were produced.
pub trait OutputSink: Send {
    /// Append `text` to the display. Control characters (`\r`, `\x08`, ANSI sequences)
    /// are passed through for the display to interpret.
    ///
    /// # Errors
    ///
    /// Returns an error if the display can't be written to.
    fn append_text(&mut self, text: &str) -> io::Result<()>;
}

/// Decode a host byte span for display. Malformed UTF-8 (including a multi-byte sequence
/// split across two writes) is replaced with `U+FFFD` instead of failing the write, since
/// this is a display and not a protocol parser.
#[must_use]
pub fn decode_lossy(bytes: &[u8]) -> Cow<'_, str> { String::from_utf8_lossy(bytes) }

/// [`OutputSink`] that renders to an [`OutputDevice`] (usually `stdout` in raw mode, or a
/// [`crate::StdoutMock`] in tests), flushing after every append.
///
/// With `convert_eol` on, a `\n` that doesn't directly follow a `\r` is rendered as
/// `\r\n`. A raw mode terminal doesn't return the caret to column 0 on a line feed, so
/// without this host output drifts to the right. Whether the previous append ended in
/// `\r` is remembered, so `"\r"` followed by `"\n"` is not doubled up.
#[allow(missing_debug_implementations)]
pub struct TerminalOutputSink {
    pub output_device: OutputDevice,
    pub convert_eol: bool,
    last_char_was_carriage_return: bool,
}

impl TerminalOutputSink {
    #[must_use]
    pub fn new(output_device: OutputDevice, convert_eol: bool) -> Self {
        Self {
            output_device,
            convert_eol,
            last_char_was_carriage_return: false,
        }
    }

    fn convert_line_endings(&mut self, text: &str) -> String {
        let mut acc = String::with_capacity(text.len() + text.len() / 8);
        for ch in text.chars() {
            if ch == '\n' && !self.last_char_was_carriage_return {
                acc.push('\r');
            }
            acc.push(ch);
            self.last_char_was_carriage_return = ch == '\r';
        }
        acc
    }
}

impl OutputSink for TerminalOutputSink {
    fn append_text(&mut self, text: &str) -> io::Result<()> {
        if text.is_empty() {
            return ok!();
        }

        let rendered: Cow<'_, str> = if self.convert_eol {
            Cow::Owned(self.convert_line_endings(text))
        } else {
            Cow::Borrowed(text)
        };

        let term = lock_output_device_as_mut!(self.output_device);
        term.write_all(rendered.as_bytes())?;
        term.flush()?;

        ok!()
    }
}

/// Render a failure to start (or keep running) the hosted process, in red, on its own
/// line. The display is the only place the user can see it.
///
/// # Errors
///
/// Returns an error if the display can't be written to.
pub fn report_host_failure(
    sink: &mut dyn OutputSink,
    error: &dyn Display,
) -> io::Result<()> {
    let message = format!("Error loading host: {error}");
    sink.append_text(&format!("\r\n{}\r\n", message.red()))
}

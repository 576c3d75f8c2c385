// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{InputEvent, OutputSink};

/// Echoed to move the caret to the start of a fresh line.
pub const NEW_LINE_ECHO: &str = "\r\n";
/// Echoed to erase one column: move back, blank it, move back again.
pub const ERASE_ONE_COLUMN_ECHO: &str = "\x08 \x08";
/// Default text echoed when an interrupt is received.
pub const DEFAULT_INTERRUPT_INDICATOR: &str = "^C";

/// What the [`LineEditor`] hands back once a line is done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorSignal {
    /// Carriage return; carries the line without any terminator.
    LineCompleted(String),
    /// <kbd>Ctrl+C</kbd>; the in-progress line was thrown away.
    Interrupted,
}

impl EditorSignal {
    /// The text that gets delivered to a pending read. An interrupt delivers the empty
    /// line.
    #[must_use]
    pub fn into_line(self) -> String {
        match self {
            EditorSignal::LineCompleted(line) => line,
            EditorSignal::Interrupted => String::new(),
        }
    }
}

/// Canonical-mode input line editor. Turns a stream of individual [`InputEvent`]s into
/// discrete lines, echoing each edit to an [`OutputSink`] so the visible line always
/// matches the input buffer.
///
/// | Event            | Input buffer        | Echo                  | Returns          |
/// | :--------------- | :------------------ | :-------------------- | :--------------- |
/// | `Printable(ch)`  | push `ch`           | `ch`                  | -                |
/// | `Erase`          | pop (if non-empty)  | `\x08 \x08` (if pop)  | -                |
/// | `CarriageReturn` | reset               | `\r\n`                | `LineCompleted`  |
/// | `Interrupt`      | reset               | `^C\r\n`              | `Interrupted`    |
/// | `Other`          | -                   | -                     | -                |
///
/// The buffer only ever holds printable ASCII, so one `char` is one byte is one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineEditor {
    input_buffer: String,
    interrupt_indicator: String,
}

impl Default for LineEditor {
    fn default() -> Self { Self::new(DEFAULT_INTERRUPT_INDICATOR) }
}

impl LineEditor {
    #[must_use]
    pub fn new(interrupt_indicator: impl Into<String>) -> Self {
        Self {
            input_buffer: String::new(),
            interrupt_indicator: interrupt_indicator.into(),
        }
    }

    /// The not-yet-submitted line.
    #[must_use]
    pub fn input_buffer(&self) -> &str { &self.input_buffer }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.input_buffer.is_empty() }

    /// Drop the in-progress line without echoing anything.
    pub fn reset(&mut self) { self.input_buffer.clear(); }

    /// Apply one event. The input buffer is updated before anything is echoed, and a
    /// failure to echo is logged, not returned: the line discipline never fails, and a
    /// completed line must not be lost because the display hiccuped.
    pub fn apply_event(
        &mut self,
        event: InputEvent,
        sink: &mut dyn OutputSink,
    ) -> Option<EditorSignal> {
        match event {
            InputEvent::CarriageReturn => {
                let line = std::mem::take(&mut self.input_buffer);
                echo(sink, NEW_LINE_ECHO);
                Some(EditorSignal::LineCompleted(line))
            }

            InputEvent::Erase => {
                if self.input_buffer.pop().is_some() {
                    echo(sink, ERASE_ONE_COLUMN_ECHO);
                }
                None
            }

            InputEvent::Interrupt => {
                self.input_buffer.clear();
                let indicator = format!("{}{NEW_LINE_ECHO}", self.interrupt_indicator);
                echo(sink, &indicator);
                Some(EditorSignal::Interrupted)
            }

            InputEvent::Printable(ch) => {
                self.input_buffer.push(ch);
                let mut char_buffer = [0_u8; 4];
                echo(sink, ch.encode_utf8(&mut char_buffer));
                None
            }

            InputEvent::Other => None,
        }
    }
}

fn echo(sink: &mut dyn OutputSink, text: &str) {
    if let Err(error) = sink.append_text(text) {
        // % is Display, ? is Debug.
        tracing::warn!(message = "Failed to echo input", error = %error, echo = ?text);
    }
}

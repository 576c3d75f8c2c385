// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Carriage return, the sole line completion trigger.
pub const CARRIAGE_RETURN_BYTE: u8 = b'\r';
/// Line feed, appended to every line handed to a pending read.
pub const LINE_FEED_BYTE: u8 = b'\n';
/// Backspace (`^H`).
pub const BACKSPACE_BYTE: u8 = 0x08;
/// Delete (`^?`), what most terminals send for the backspace key.
pub const DELETE_BYTE: u8 = 0x7f;
/// End of text (`^C`).
pub const END_OF_TEXT_BYTE: u8 = 0x03;

/// One logical key delivered by the display adapter. This is everything the line
/// discipline distinguishes; arrow keys, escape sequences, function keys, and non-ASCII
/// input all collapse into [`InputEvent::Other`] and are ignored.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// A character in the printable ASCII range, `' '` through `'~'` inclusive.
    Printable(char),
    /// Submit the current line.
    CarriageReturn,
    /// Backspace or delete: remove the last character.
    Erase,
    /// <kbd>Ctrl+C</kbd>.
    Interrupt,
    /// Anything else.
    Other,
}

impl InputEvent {
    /// Classify one chunk of data as delivered by a display's data callback (one key
    /// press, which may be a multi-byte escape sequence).
    #[must_use]
    pub fn from_raw(data: &str) -> Self {
        let mut chars = data.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Self::from_char(ch),
            _ => Self::Other,
        }
    }

    /// Classify a single raw input byte.
    #[must_use]
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            CARRIAGE_RETURN_BYTE => Self::CarriageReturn,
            DELETE_BYTE | BACKSPACE_BYTE => Self::Erase,
            END_OF_TEXT_BYTE => Self::Interrupt,
            b' '..=b'~' => Self::Printable(char::from(byte)),
            _ => Self::Other,
        }
    }

    fn from_char(ch: char) -> Self {
        match u8::try_from(ch) {
            Ok(byte) => Self::from_byte(byte),
            Err(_) => Self::Other,
        }
    }

    /// Classify a whole crossterm event. Returns [`None`] for events that aren't key
    /// presses at all (mouse, focus, resize, paste), so the caller can skip them.
    #[must_use]
    pub fn try_from_crossterm_event(event: Event) -> Option<Self> {
        match event {
            Event::Key(key_event) => Some(Self::from(key_event)),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_printable(&self) -> bool { matches!(self, Self::Printable(_)) }
}

/// Key release events are dropped. A repeat (a held key, when the terminal reports
/// them) counts as another press.
impl From<KeyEvent> for InputEvent {
    fn from(key_event: KeyEvent) -> Self {
        if !matches!(key_event.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
            return Self::Other;
        }

        let modifiers = key_event.modifiers;
        let is_plain =
            modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;

        match key_event.code {
            KeyCode::Enter => Self::CarriageReturn,
            KeyCode::Backspace | KeyCode::Delete => Self::Erase,
            KeyCode::Char('c' | 'C') if modifiers == KeyModifiers::CONTROL => {
                Self::Interrupt
            }
            KeyCode::Char(ch) if is_plain => match Self::from_char(ch) {
                printable @ Self::Printable(_) => printable,
                _ => Self::Other,
            },
            _ => Self::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ctrl_key_event, key_event};
    use crossterm::event::KeyEventState;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case("\r", InputEvent::CarriageReturn ; "carriage return")]
    #[test_case("\x7f", InputEvent::Erase ; "delete")]
    #[test_case("\x08", InputEvent::Erase ; "backspace")]
    #[test_case("\x03", InputEvent::Interrupt ; "ctrl c")]
    #[test_case(" ", InputEvent::Printable(' ') ; "space")]
    #[test_case("~", InputEvent::Printable('~') ; "tilde")]
    #[test_case("a", InputEvent::Printable('a') ; "letter")]
    #[test_case("\n", InputEvent::Other ; "line feed")]
    #[test_case("\x1b[A", InputEvent::Other ; "arrow up escape sequence")]
    #[test_case("\x1b", InputEvent::Other ; "bare escape")]
    #[test_case("é", InputEvent::Other ; "non ascii")]
    #[test_case("ab", InputEvent::Other ; "pasted chunk")]
    #[test_case("", InputEvent::Other ; "empty")]
    fn test_from_raw(data: &str, expected: InputEvent) {
        assert_eq!(InputEvent::from_raw(data), expected);
    }

    #[test]
    fn test_from_byte_printable_range_is_inclusive() {
        for byte in 0_u8..=255 {
            let event = InputEvent::from_byte(byte);
            let expected_printable = (0x20..=0x7e).contains(&byte);
            assert_eq!(event.is_printable(), expected_printable, "byte: {byte:#04x}");
        }
    }

    #[test]
    fn test_from_crossterm_key_events() {
        let classify = |event: Event| InputEvent::try_from_crossterm_event(event).unwrap();

        assert_eq!(classify(key_event(KeyCode::Enter)), InputEvent::CarriageReturn);
        assert_eq!(classify(key_event(KeyCode::Backspace)), InputEvent::Erase);
        assert_eq!(classify(key_event(KeyCode::Delete)), InputEvent::Erase);
        assert_eq!(classify(ctrl_key_event('c')), InputEvent::Interrupt);
        assert_eq!(classify(key_event(KeyCode::Char('q'))), InputEvent::Printable('q'));
        assert_eq!(classify(key_event(KeyCode::Left)), InputEvent::Other);
        assert_eq!(classify(key_event(KeyCode::Char('ß'))), InputEvent::Other);
        assert_eq!(classify(ctrl_key_event('d')), InputEvent::Other);
    }

    #[test]
    fn test_shifted_char_is_printable() {
        let event = Event::Key(KeyEvent::new(KeyCode::Char('Q'), KeyModifiers::SHIFT));
        assert_eq!(
            InputEvent::try_from_crossterm_event(event),
            Some(InputEvent::Printable('Q'))
        );
    }

    #[test]
    fn test_key_release_is_ignored() {
        let release = KeyEvent {
            code: KeyCode::Char('a'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(InputEvent::from(release), InputEvent::Other);
    }

    #[test]
    fn test_key_repeat_counts_as_press() {
        let repeat = |code| KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Repeat,
            state: KeyEventState::NONE,
        };
        assert_eq!(
            InputEvent::from(repeat(KeyCode::Char('a'))),
            InputEvent::Printable('a')
        );
        assert_eq!(InputEvent::from(repeat(KeyCode::Backspace)), InputEvent::Erase);
    }

    #[test]
    fn test_non_key_events_are_skipped() {
        assert_eq!(InputEvent::try_from_crossterm_event(Event::FocusLost), None);
        assert_eq!(
            InputEvent::try_from_crossterm_event(Event::Resize(10, 10)),
            None
        );
    }
}

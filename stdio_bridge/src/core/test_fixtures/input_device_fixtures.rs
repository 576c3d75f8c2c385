// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{CrosstermEventResult, InputDevice, PinnedInputStream};
use async_stream::stream;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use std::time::Duration;

/// The main constructors are:
/// - [`InputDeviceExtMock::new_mock()`]
/// - [`InputDeviceExtMock::new_mock_with_delay()`]
pub fn gen_input_stream<T>(generator_vec: Vec<T>) -> PinnedInputStream<T>
where
    T: Send + Sync + 'static,
{
    let it = stream! {
        for item in generator_vec {
            yield item;
        }
    };
    Box::pin(it)
}

pub fn gen_input_stream_with_delay<T>(
    generator_vec: Vec<T>,
    delay: Duration,
) -> PinnedInputStream<T>
where
    T: Send + Sync + 'static,
{
    let it = stream! {
        for item in generator_vec {
            tokio::time::sleep(delay).await;
            yield item;
        }
    };
    Box::pin(it)
}

pub trait InputDeviceExtMock {
    fn new_mock(generator_vec: Vec<CrosstermEventResult>) -> InputDevice;

    fn new_mock_with_delay(
        generator_vec: Vec<CrosstermEventResult>,
        delay: Duration,
    ) -> InputDevice;
}

impl InputDeviceExtMock for InputDevice {
    fn new_mock(generator_vec: Vec<CrosstermEventResult>) -> InputDevice {
        InputDevice {
            resource: gen_input_stream(generator_vec),
        }
    }

    fn new_mock_with_delay(
        generator_vec: Vec<CrosstermEventResult>,
        delay: Duration,
    ) -> InputDevice {
        InputDevice {
            resource: gen_input_stream_with_delay(generator_vec, delay),
        }
    }
}

/// Unmodified key press.
#[must_use]
pub fn key_event(code: KeyCode) -> Event { Event::Key(KeyEvent::new(code, KeyModifiers::NONE)) }

/// Key press with <kbd>Ctrl</kbd> held down.
#[must_use]
pub fn ctrl_key_event(ch: char) -> Event {
    Event::Key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL))
}

/// One key press per character, eg: `"hi"` becomes `h`, `i`.
#[must_use]
pub fn typed_key_events(text: &str) -> Vec<CrosstermEventResult> {
    text.chars()
        .map(|ch| Ok(key_event(KeyCode::Char(ch))))
        .collect()
}

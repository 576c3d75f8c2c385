// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{CrosstermEventResult, InputEvent, PinnedInputStream};
use crossterm::event::EventStream;
use futures_util::{FutureExt, StreamExt};
use miette::IntoDiagnostic;

/// This struct represents the display's input side: a stream of raw terminal events. See
/// [`crate::InputDeviceExtMock`] for testing features.
///
/// The stream is not `Send`, so the event pump that drains it runs on the task that owns
/// it (see [`crate::BridgeHandle::run_event_pump`]).
#[allow(missing_debug_implementations)]
pub struct InputDevice {
    pub resource: PinnedInputStream<CrosstermEventResult>,
}

impl InputDevice {
    #[must_use]
    pub fn new_event_stream() -> InputDevice {
        InputDevice {
            resource: Box::pin(EventStream::new()),
        }
    }
}

impl InputDevice {
    /// Get the next raw event.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying stream errors, or is exhausted.
    pub async fn next(&mut self) -> miette::Result<crossterm::event::Event> {
        match self.resource.next().fuse().await {
            Some(it) => it.into_diagnostic(),
            None => miette::bail!("Failed to get next event from input source."),
        }
    }

    /// Get the next event that the line discipline cares about, skipping the ones it
    /// doesn't (mouse, focus, resize, paste, key releases). Returns [`None`] when the
    /// stream ends or errors.
    pub async fn next_input_event(&mut self) -> Option<InputEvent> {
        loop {
            let event = self.next().await.ok()?;
            if let Some(input_event) = InputEvent::try_from_crossterm_event(event) {
                return Some(input_event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{InputDevice, InputDeviceExtMock, InputEvent, key_event};
    use crossterm::event::{Event, KeyCode};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_next_input_event_skips_non_key_events() {
        let mut device = InputDevice::new_mock(vec![
            Ok(Event::FocusGained),
            Ok(Event::Resize(80, 24)),
            Ok(key_event(KeyCode::Char('a'))),
            Ok(key_event(KeyCode::Enter)),
        ]);

        assert_eq!(
            device.next_input_event().await,
            Some(InputEvent::Printable('a'))
        );
        assert_eq!(
            device.next_input_event().await,
            Some(InputEvent::CarriageReturn)
        );
        assert_eq!(device.next_input_event().await, None);
    }

    #[tokio::test]
    async fn test_next_input_event_stops_on_error() {
        let mut device = InputDevice::new_mock(vec![
            Err(std::io::Error::other("stdin went away")),
            Ok(key_event(KeyCode::Char('a'))),
        ]);
        assert_eq!(device.next_input_event().await, None);
    }
}

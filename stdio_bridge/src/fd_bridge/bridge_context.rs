// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{BridgeConfig, BridgeError, BridgeResult, Completion, Descriptor,
            DescriptorTable, EditorSignal, FdHandler, InputEvent, LineEditor,
            OutputDevice, OutputSink, PendingReadSlot, ReadRequest, ReadyCompletion,
            SafeHostBuffer, TerminalOutputSink, decode_lossy, lock_host_buffer};
use std::{fmt, sync::Arc};

/// The bridge context: everything needed to serve a hosted process's `stdin`, `stdout`,
/// and `stderr` from a line oriented display.
///
/// There is exactly one writer. Display input ([`Self::handle_event`]) and host calls
/// ([`Self::read`], [`Self::write`]) all take `&mut self`, so they are serialized by
/// construction. To share the bridge between a host task and an input task, use
/// [`crate::BridgeHandle`].
///
/// Each host call has an `apply_*` twin that returns the [`ReadyCompletion`] instead of
/// invoking it, so that a caller holding a lock on the bridge can release it first.
pub struct StdioBridge {
    descriptor_table: DescriptorTable,
    line_editor: LineEditor,
    pending_read: PendingReadSlot,
    sink: Box<dyn OutputSink>,
}

impl fmt::Debug for StdioBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdioBridge")
            .field("descriptor_table", &self.descriptor_table)
            .field("line_editor", &self.line_editor)
            .field("pending_read", &self.pending_read)
            .finish_non_exhaustive()
    }
}

impl StdioBridge {
    /// Set up the bridge. This must happen before the host starts issuing calls. `prior`
    /// is the host's existing handler, and it keeps serving every descriptor other than
    /// `0`, `1`, and `2`.
    #[must_use]
    pub fn install(
        config: &BridgeConfig,
        sink: Box<dyn OutputSink>,
        prior: Option<Arc<dyn FdHandler>>,
    ) -> Self {
        tracing::debug!(
            message = "Installing stdio bridge",
            has_prior = ?prior.is_some(),
            config = ?config
        );
        Self {
            descriptor_table: DescriptorTable::new(prior),
            line_editor: LineEditor::new(config.interrupt_indicator.clone()),
            pending_read: PendingReadSlot::default(),
            sink,
        }
    }

    /// [`Self::install`] with a [`TerminalOutputSink`] rendering to `output_device`.
    #[must_use]
    pub fn install_on_output_device(
        config: &BridgeConfig,
        output_device: OutputDevice,
        prior: Option<Arc<dyn FdHandler>>,
    ) -> Self {
        let sink = TerminalOutputSink::new(output_device, config.convert_eol);
        Self::install(config, Box::new(sink), prior)
    }

    #[must_use]
    pub fn descriptor_table(&self) -> &DescriptorTable { &self.descriptor_table }

    #[must_use]
    pub fn has_pending_read(&self) -> bool { self.pending_read.is_awaiting() }

    /// The line currently being typed.
    #[must_use]
    pub fn input_buffer(&self) -> &str { self.line_editor.input_buffer() }

    /// Direct access to the display, eg: to report a host failure.
    pub fn sink_mut(&mut self) -> &mut dyn OutputSink { self.sink.as_mut() }
}

/// Host facing entry points.
impl StdioBridge {
    /// Read from `fd` into `buffer[offset..offset + length]`.
    ///
    /// On `stdin` this parks the read: `completion` is called later, from
    /// [`Self::handle_event`], once a line is submitted or interrupted. A second read on
    /// `stdin` while one is parked fails immediately with [`BridgeError::DoubleRead`],
    /// leaving the first one parked.
    pub fn read(
        &mut self,
        fd: i32,
        buffer: SafeHostBuffer,
        offset: usize,
        length: usize,
        position: Option<u64>,
        completion: Completion,
    ) {
        match self.descriptor_table.route(fd) {
            Descriptor::Stdin => {
                if let Some(ready) =
                    self.apply_stdin_read(buffer, offset, length, completion)
                {
                    ready.invoke();
                }
            }
            _ => self.descriptor_table.delegate_read(
                fd, buffer, offset, length, position, completion,
            ),
        }
    }

    /// Write `buffer[offset..offset + length]` to `fd`. On `stdout` and `stderr`, this
    /// renders the text and calls `completion(Ok(length))` before returning.
    pub fn write(
        &mut self,
        fd: i32,
        buffer: SafeHostBuffer,
        offset: usize,
        length: usize,
        position: Option<u64>,
        completion: Completion,
    ) {
        let descriptor = self.descriptor_table.route(fd);
        if descriptor.is_output() {
            self.apply_output_write(descriptor, &buffer, offset, length, completion)
                .invoke();
        } else {
            self.descriptor_table.delegate_write(
                fd, buffer, offset, length, position, completion,
            );
        }
    }

    /// Park a read on `stdin`. Returns [`None`] when the read was parked, or the
    /// completion to call right away when it was rejected.
    pub fn apply_stdin_read(
        &mut self,
        buffer: SafeHostBuffer,
        offset: usize,
        length: usize,
        completion: Completion,
    ) -> Option<ReadyCompletion> {
        let buffer_len = lock_host_buffer(&buffer).len();
        if let Err(error) = BridgeError::check_span(offset, length, buffer_len) {
            tracing::warn!(message = "Rejecting stdin read", error = %error);
            return Some(ReadyCompletion::new(completion, Err(error)));
        }

        let request = ReadRequest {
            buffer,
            offset,
            length,
            completion,
        };

        match self.pending_read.install(request) {
            Ok(()) => {
                tracing::trace!(message = "Parked stdin read", length = ?length);
                None
            }
            Err((rejected, error)) => {
                tracing::warn!(message = "Rejecting stdin read", error = %error);
                Some(ReadyCompletion::new(rejected.completion, Err(error)))
            }
        }
    }

    /// Render a write on `stdout` or `stderr`. The bytes are decoded leniently, and the
    /// returned completion carries `Ok(length)` unless the span is out of range. A
    /// display failure is logged like an echo failure, and the write still counts.
    pub fn apply_output_write(
        &mut self,
        descriptor: Descriptor,
        buffer: &SafeHostBuffer,
        offset: usize,
        length: usize,
        completion: Completion,
    ) -> ReadyCompletion {
        let result = self.render(buffer, offset, length);
        match &result {
            Ok(count) => {
                tracing::trace!(message = "Rendered write", descriptor = ?descriptor, count = ?count);
            }
            Err(error) => {
                tracing::warn!(message = "Write failed", descriptor = ?descriptor, error = %error);
            }
        }
        ReadyCompletion::new(completion, result)
    }

    fn render(
        &mut self,
        buffer: &SafeHostBuffer,
        offset: usize,
        length: usize,
    ) -> BridgeResult<usize> {
        let text = {
            let guard = lock_host_buffer(buffer);
            BridgeError::check_span(offset, length, guard.len())?;
            decode_lossy(&guard[offset..offset + length]).into_owned()
        };
        if let Err(error) = self.sink.append_text(&text) {
            // % is Display, ? is Debug.
            tracing::warn!(message = "Failed to render host output", error = %error, length = ?length);
        }
        Ok(length)
    }
}

/// Display facing entry point.
impl StdioBridge {
    /// Feed one input event, calling the parked read's completion if it finishes a line.
    pub fn handle_event(&mut self, event: InputEvent) {
        if let Some(ready) = self.apply_event(event) {
            ready.invoke();
        }
    }

    /// Feed one input event. While no read is parked the terminal is inert and the event
    /// is dropped without being echoed. Otherwise it goes to the [`LineEditor`], and a
    /// completed or interrupted line is handed to the parked read.
    pub fn apply_event(&mut self, event: InputEvent) -> Option<ReadyCompletion> {
        if !self.pending_read.is_awaiting() {
            tracing::trace!(message = "No pending read, dropping input", event = ?event);
            return None;
        }

        let signal = self.line_editor.apply_event(event, self.sink.as_mut())?;

        if matches!(signal, EditorSignal::Interrupted) {
            tracing::debug!(message = "Interrupt, completing read with empty line");
        }
        let line = signal.into_line();
        tracing::debug!(message = "Line completed", line = ?line);

        self.pending_read.take_fulfillment(&line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{StdMutex, StdoutMock, new_host_buffer};
    use pretty_assertions::assert_eq;

    type Results = Arc<StdMutex<Vec<BridgeResult<usize>>>>;

    fn capture() -> (Completion, Results) {
        let results = Arc::new(StdMutex::new(vec![]));
        let results_clone = results.clone();
        let completion: Completion = Box::new(move |result| {
            results_clone.lock().unwrap().push(result);
        });
        (completion, results)
    }

    fn new_bridge() -> (StdioBridge, StdoutMock) {
        let (output_device, stdout_mock) = OutputDevice::new_mock();
        let config = BridgeConfig::default().with_convert_eol(false);
        let bridge = StdioBridge::install_on_output_device(&config, output_device, None);
        (bridge, stdout_mock)
    }

    fn type_text(bridge: &mut StdioBridge, text: &str) {
        for event in text.chars().map(|ch| InputEvent::from_raw(&ch.to_string())) {
            bridge.handle_event(event);
        }
    }

    fn delivered(buffer: &SafeHostBuffer, results: &Results) -> Vec<u8> {
        let results = results.lock().unwrap();
        assert_eq!(results.len(), 1);
        let count = *results[0].as_ref().unwrap();
        buffer.lock().unwrap()[..count].to_vec()
    }

    #[test]
    fn test_scenario_hi() {
        let (mut bridge, stdout_mock) = new_bridge();
        let buffer = new_host_buffer(vec![0; 10]);
        let (completion, results) = capture();

        bridge.read(0, buffer.clone(), 0, 10, None, completion);
        assert!(bridge.has_pending_read());
        assert!(results.lock().unwrap().is_empty());

        type_text(&mut bridge, "hi\r");

        assert_eq!(delivered(&buffer, &results), b"hi\n");
        assert!(!bridge.has_pending_read());
        assert_eq!(stdout_mock.get_copy_of_buffer_as_string(), "hi\r\n");
    }

    #[test]
    fn test_scenario_type_then_erase() {
        let (mut bridge, stdout_mock) = new_bridge();
        let buffer = new_host_buffer(vec![0; 10]);
        let (completion, results) = capture();

        bridge.read(0, buffer.clone(), 0, 10, None, completion);
        type_text(&mut bridge, "a\x7f\r");

        assert_eq!(delivered(&buffer, &results), b"\n");
        assert_eq!(stdout_mock.get_copy_of_buffer_as_string(), "a\x08 \x08\r\n");
    }

    #[test]
    fn test_scenario_truncation() {
        let (mut bridge, _stdout_mock) = new_bridge();
        let buffer = new_host_buffer(vec![0; 3]);
        let (completion, results) = capture();

        bridge.read(0, buffer.clone(), 0, 3, None, completion);
        type_text(&mut bridge, "abcd\r");

        assert_eq!(delivered(&buffer, &results), b"abc");

        // The next read only ever sees the next line.
        let (completion, results) = capture();
        bridge.read(0, buffer.clone(), 0, 3, None, completion);
        type_text(&mut bridge, "z\r");
        assert_eq!(delivered(&buffer, &results), b"z\n");
    }

    #[test]
    fn test_interrupt_completes_read_with_empty_line() {
        let (mut bridge, stdout_mock) = new_bridge();
        let buffer = new_host_buffer(vec![0; 10]);
        let (completion, results) = capture();

        bridge.read(0, buffer.clone(), 0, 10, None, completion);
        type_text(&mut bridge, "rm -rf");
        assert_eq!(bridge.input_buffer(), "rm -rf");
        bridge.handle_event(InputEvent::Interrupt);

        assert_eq!(delivered(&buffer, &results), b"\n");
        assert_eq!(bridge.input_buffer(), "");
        assert_eq!(stdout_mock.get_copy_of_buffer_as_string(), "rm -rf^C\r\n");
    }

    #[test]
    fn test_input_without_pending_read_is_dropped() {
        let (mut bridge, stdout_mock) = new_bridge();

        type_text(&mut bridge, "early\r");

        assert_eq!(bridge.input_buffer(), "");
        assert!(stdout_mock.get_copy_of_buffer().is_empty());

        let buffer = new_host_buffer(vec![0; 10]);
        let (completion, results) = capture();
        bridge.read(0, buffer.clone(), 0, 10, None, completion);
        type_text(&mut bridge, "ok\r");
        assert_eq!(delivered(&buffer, &results), b"ok\n");
    }

    #[test]
    fn test_interrupt_without_pending_read_is_dropped() {
        let (mut bridge, stdout_mock) = new_bridge();

        type_text(&mut bridge, "ab");
        bridge.handle_event(InputEvent::Interrupt);

        assert!(!bridge.has_pending_read());
        assert_eq!(bridge.input_buffer(), "");
        assert!(stdout_mock.get_copy_of_buffer().is_empty());

        // A later read is not completed by the earlier interrupt.
        let buffer = new_host_buffer(vec![0; 10]);
        let (completion, results) = capture();
        bridge.read(0, buffer.clone(), 0, 10, None, completion);
        assert!(results.lock().unwrap().is_empty());
        assert!(bridge.has_pending_read());

        type_text(&mut bridge, "go\r");
        assert_eq!(delivered(&buffer, &results), b"go\n");
        assert_eq!(stdout_mock.get_copy_of_buffer_as_string(), "go\r\n");
    }

    #[test]
    fn test_double_read_fails_second_and_keeps_first() {
        let (mut bridge, _stdout_mock) = new_bridge();
        let buffer = new_host_buffer(vec![0; 10]);
        let (first, first_results) = capture();
        let (second, second_results) = capture();

        bridge.read(0, buffer.clone(), 0, 10, None, first);
        bridge.read(0, buffer.clone(), 0, 10, None, second);

        {
            let second_results = second_results.lock().unwrap();
            assert_eq!(second_results.len(), 1);
            assert!(matches!(second_results[0], Err(BridgeError::DoubleRead)));
        }
        assert!(first_results.lock().unwrap().is_empty());
        assert!(bridge.has_pending_read());

        type_text(&mut bridge, "y\r");
        assert_eq!(delivered(&buffer, &first_results), b"y\n");
        assert_eq!(second_results.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_write_stdout_and_stderr_complete_with_length() {
        let (mut bridge, stdout_mock) = new_bridge();
        let (out_completion, out_results) = capture();
        let (err_completion, err_results) = capture();

        bridge.write(1, new_host_buffer(*b"hello "), 0, 6, None, out_completion);
        bridge.write(2, new_host_buffer(*b"xxoops"), 2, 4, None, err_completion);

        assert!(matches!(out_results.lock().unwrap()[0], Ok(6)));
        assert!(matches!(err_results.lock().unwrap()[0], Ok(4)));
        assert_eq!(stdout_mock.get_copy_of_buffer_as_string(), "hello oops");
    }

    struct DetachedSink;

    impl OutputSink for DetachedSink {
        fn append_text(&mut self, _text: &str) -> std::io::Result<()> {
            Err(std::io::Error::other("display detached"))
        }
    }

    #[test]
    fn test_write_completes_with_length_when_display_fails() {
        let mut bridge =
            StdioBridge::install(&BridgeConfig::default(), Box::new(DetachedSink), None);
        let (out_completion, out_results) = capture();
        let (err_completion, err_results) = capture();

        bridge.write(1, new_host_buffer(*b"abc"), 0, 3, None, out_completion);
        bridge.write(2, new_host_buffer(*b"oops"), 1, 3, None, err_completion);

        let out_results = out_results.lock().unwrap();
        assert_eq!(out_results.len(), 1);
        assert!(matches!(out_results[0], Ok(3)));
        let err_results = err_results.lock().unwrap();
        assert_eq!(err_results.len(), 1);
        assert!(matches!(err_results[0], Ok(3)));
    }

    #[test]
    fn test_write_invalid_utf8_still_counts_all_bytes() {
        let (mut bridge, stdout_mock) = new_bridge();
        let (completion, results) = capture();

        bridge.write(1, new_host_buffer(vec![b'a', 0xff, 0xe2]), 0, 3, None, completion);

        assert!(matches!(results.lock().unwrap()[0], Ok(3)));
        assert_eq!(
            stdout_mock.get_copy_of_buffer_as_string(),
            "a\u{fffd}\u{fffd}"
        );
    }

    #[test]
    fn test_unmapped_descriptor_fails_once() {
        let (mut bridge, _stdout_mock) = new_bridge();
        let (read_completion, read_results) = capture();
        let (write_completion, write_results) = capture();

        bridge.read(5, new_host_buffer(vec![0; 4]), 0, 4, None, read_completion);
        bridge.write(9, new_host_buffer(*b"abcd"), 0, 4, None, write_completion);

        let read_results = read_results.lock().unwrap();
        assert_eq!(read_results.len(), 1);
        assert!(matches!(
            read_results[0],
            Err(BridgeError::InvalidDescriptor { fd: 5 })
        ));
        let write_results = write_results.lock().unwrap();
        assert_eq!(write_results.len(), 1);
        assert!(matches!(
            write_results[0],
            Err(BridgeError::InvalidDescriptor { fd: 9 })
        ));
    }

    #[test]
    fn test_read_on_stdout_and_write_on_stdin_are_not_routed() {
        let (mut bridge, _stdout_mock) = new_bridge();
        let (read_completion, read_results) = capture();
        let (write_completion, write_results) = capture();

        bridge.read(1, new_host_buffer(vec![0; 4]), 0, 4, None, read_completion);
        bridge.write(0, new_host_buffer(*b"abcd"), 0, 4, None, write_completion);

        assert!(!bridge.has_pending_read());
        assert!(matches!(
            read_results.lock().unwrap()[0],
            Err(BridgeError::InvalidDescriptor { fd: 1 })
        ));
        assert!(matches!(
            write_results.lock().unwrap()[0],
            Err(BridgeError::InvalidDescriptor { fd: 0 })
        ));
    }

    struct EchoFileHandler;

    impl FdHandler for EchoFileHandler {
        fn read(
            &self,
            _fd: i32,
            buffer: SafeHostBuffer,
            offset: usize,
            _length: usize,
            _position: Option<u64>,
            completion: Completion,
        ) {
            buffer.lock().unwrap()[offset] = b'!';
            completion(Ok(1));
        }

        fn write(
            &self,
            _fd: i32,
            _buffer: SafeHostBuffer,
            _offset: usize,
            length: usize,
            _position: Option<u64>,
            completion: Completion,
        ) {
            completion(Ok(length));
        }
    }

    #[test]
    fn test_other_descriptors_go_to_prior_handler() {
        let (output_device, stdout_mock) = OutputDevice::new_mock();
        let prior: Arc<dyn FdHandler> = Arc::new(EchoFileHandler);
        let mut bridge = StdioBridge::install_on_output_device(
            &BridgeConfig::default(),
            output_device,
            Some(prior),
        );
        let buffer = new_host_buffer(vec![0; 2]);
        let (read_completion, read_results) = capture();
        let (write_completion, write_results) = capture();

        bridge.read(3, buffer.clone(), 1, 1, None, read_completion);
        bridge.write(3, new_host_buffer(*b"data"), 0, 4, Some(0), write_completion);

        assert!(matches!(read_results.lock().unwrap()[0], Ok(1)));
        assert_eq!(buffer.lock().unwrap().as_slice(), b"\0!");
        assert!(matches!(write_results.lock().unwrap()[0], Ok(4)));
        assert!(stdout_mock.get_copy_of_buffer().is_empty());
    }

    #[test]
    fn test_out_of_range_span_fails_that_call_only() {
        let (mut bridge, stdout_mock) = new_bridge();
        let (write_completion, write_results) = capture();
        let (read_completion, read_results) = capture();

        bridge.write(1, new_host_buffer(*b"abc"), 2, 5, None, write_completion);
        bridge.read(0, new_host_buffer(vec![0; 4]), 3, 8, None, read_completion);

        assert!(matches!(
            write_results.lock().unwrap()[0],
            Err(BridgeError::InvalidBufferRange { .. })
        ));
        assert!(matches!(
            read_results.lock().unwrap()[0],
            Err(BridgeError::InvalidBufferRange { .. })
        ));
        assert!(!bridge.has_pending_read());
        assert!(stdout_mock.get_copy_of_buffer().is_empty());

        let (completion, results) = capture();
        bridge.write(1, new_host_buffer(*b"abc"), 0, 3, None, completion);
        assert!(matches!(results.lock().unwrap()[0], Ok(3)));
    }

    #[test]
    fn test_convert_eol_applies_to_host_output() {
        let (output_device, stdout_mock) = OutputDevice::new_mock();
        let mut bridge = StdioBridge::install_on_output_device(
            &BridgeConfig::default(),
            output_device,
            None,
        );
        let (completion, results) = capture();

        bridge.write(1, new_host_buffer(*b"a\nb\n"), 0, 4, None, completion);

        // The host asked for 4 bytes, that is what it is told, regardless of rendering.
        assert!(matches!(results.lock().unwrap()[0], Ok(4)));
        assert_eq!(stdout_mock.get_copy_of_buffer_as_string(), "a\r\nb\r\n");
    }
}

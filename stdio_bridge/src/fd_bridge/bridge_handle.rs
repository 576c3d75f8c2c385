// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{BridgeError, CommonResult, Completion, Descriptor, DescriptorTable,
            InputDevice, InputEvent, STDIN_FD, SafeHostBuffer, StdMutex, StdioBridge,
            lock_host_buffer, new_host_buffer, ok};
use std::sync::{Arc, MutexGuard};
use tokio::sync::{broadcast, oneshot};

/// Type alias for a [`StdioBridge`] that can be shared between tasks.
pub type SafeStdioBridge = Arc<StdMutex<StdioBridge>>;

/// The most bytes [`BridgeHandle::read_line`] accepts for one line. Longer lines are
/// truncated.
pub const DEFAULT_READ_LINE_CAPACITY: usize = 4096;

/// Async facade over a [`StdioBridge`] for tokio based hosts. It is cheap to clone; give
/// one clone to the task running the host, and another to the task pumping display
/// input.
///
/// Completions are never called while the bridge lock is held, so a completion is free
/// to call right back into the bridge.
#[derive(Clone, Debug)]
pub struct BridgeHandle {
    pub safe_bridge: SafeStdioBridge,
    /// Clone of the bridge's table. It never changes after install, so delegated calls
    /// are routed without taking the bridge lock.
    descriptor_table: DescriptorTable,
}

impl BridgeHandle {
    #[must_use]
    pub fn new(bridge: StdioBridge) -> Self {
        let descriptor_table = bridge.descriptor_table().clone();
        Self {
            safe_bridge: Arc::new(StdMutex::new(bridge)),
            descriptor_table,
        }
    }

    /// Locks the bridge.
    ///
    /// # Panics
    ///
    /// This method will panic if the mutex is poisoned, which can happen if a thread
    /// panics while holding the lock.
    pub fn lock(&self) -> MutexGuard<'_, StdioBridge> { self.safe_bridge.lock().unwrap() }

    #[must_use]
    pub fn has_pending_read(&self) -> bool { self.lock().has_pending_read() }

    /// Callback style read, the same contract as [`StdioBridge::read`].
    pub fn read_with_completion(
        &self,
        fd: i32,
        buffer: SafeHostBuffer,
        offset: usize,
        length: usize,
        position: Option<u64>,
        completion: Completion,
    ) {
        match self.descriptor_table.route(fd) {
            Descriptor::Stdin => {
                let maybe_ready =
                    self.lock().apply_stdin_read(buffer, offset, length, completion);
                if let Some(ready) = maybe_ready {
                    ready.invoke();
                }
            }
            _ => self.descriptor_table.delegate_read(
                fd, buffer, offset, length, position, completion,
            ),
        }
    }

    /// Callback style write, the same contract as [`StdioBridge::write`].
    pub fn write_with_completion(
        &self,
        fd: i32,
        buffer: SafeHostBuffer,
        offset: usize,
        length: usize,
        position: Option<u64>,
        completion: Completion,
    ) {
        let descriptor = self.descriptor_table.route(fd);
        if descriptor.is_output() {
            let ready = self.lock().apply_output_write(
                descriptor, &buffer, offset, length, completion,
            );
            ready.invoke();
        } else {
            self.descriptor_table.delegate_write(
                fd, buffer, offset, length, position, completion,
            );
        }
    }

    /// Read up to `capacity` bytes from `fd`. On `stdin` this resolves once the user
    /// submits (or interrupts) a line.
    ///
    /// # Errors
    ///
    /// Whatever the read completes with, or [`BridgeError::Closed`] if the completion is
    /// dropped without being called.
    pub async fn read(&self, fd: i32, capacity: usize) -> CommonResult<Vec<u8>> {
        let buffer = new_host_buffer(vec![0; capacity]);
        let (sender, receiver) = oneshot::channel();
        let completion: Completion = Box::new(move |result| {
            // The receiver is gone if the caller stopped waiting.
            sender.send(result).ok();
        });

        self.read_with_completion(fd, buffer.clone(), 0, capacity, None, completion);

        let count = receiver.await.map_err(|_| BridgeError::Closed)??;
        let mut bytes = lock_host_buffer(&buffer).to_vec();
        bytes.truncate(count);
        Ok(bytes)
    }

    /// Read one line from `stdin`, without its trailing `\n`. An interrupted line comes
    /// back empty.
    ///
    /// # Errors
    ///
    /// See [`Self::read`].
    pub async fn read_line(&self) -> CommonResult<String> {
        let bytes = self.read(STDIN_FD, DEFAULT_READ_LINE_CAPACITY).await?;
        let line = String::from_utf8_lossy(&bytes).into_owned();
        match line.strip_suffix('\n') {
            Some(without_line_feed) => Ok(without_line_feed.to_string()),
            None => Ok(line),
        }
    }

    /// Write all of `bytes` to `fd`, returning how many bytes were written.
    ///
    /// # Errors
    ///
    /// Whatever the write completes with, or [`BridgeError::Closed`] if the completion
    /// is dropped without being called.
    pub async fn write(&self, fd: i32, bytes: &[u8]) -> CommonResult<usize> {
        let length = bytes.len();
        let (sender, receiver) = oneshot::channel();
        let completion: Completion = Box::new(move |result| {
            sender.send(result).ok();
        });

        self.write_with_completion(
            fd,
            new_host_buffer(bytes),
            0,
            length,
            None,
            completion,
        );

        let count = receiver.await.map_err(|_| BridgeError::Closed)??;
        Ok(count)
    }

    /// Feed one input event to the bridge.
    pub fn handle_event(&self, event: InputEvent) {
        let maybe_ready = self.lock().apply_event(event);
        if let Some(ready) = maybe_ready {
            ready.invoke();
        }
    }

    /// Drain `input_device` into the bridge until the stream ends, or a shutdown signal
    /// arrives (or every shutdown sender is dropped).
    ///
    /// [`InputDevice`] is not `Send`, so run this on the task that created it, eg:
    /// inline in `main`, while the host runs in a spawned task.
    ///
    /// # Errors
    ///
    /// Currently never fails; the stream ending is a normal exit.
    pub async fn run_event_pump(
        &self,
        mut input_device: InputDevice,
        mut shutdown_receiver: broadcast::Receiver<()>,
    ) -> CommonResult<()> {
        loop {
            tokio::select! {
                // Cancel safe: an event is only taken off the stream when this branch
                // completes.
                maybe_input_event = input_device.next_input_event() => {
                    match maybe_input_event {
                        Some(input_event) => self.handle_event(input_event),
                        None => {
                            tracing::debug!(message = "Input stream ended, stopping event pump");
                            break;
                        }
                    }
                }

                _ = shutdown_receiver.recv() => {
                    tracing::debug!(message = "Shutdown signal received, stopping event pump");
                    break;
                }
            }
        }

        ok!()
    }
}

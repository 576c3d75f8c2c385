// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{BridgeError, BridgeResult, LINE_FEED_BYTE, StdMutex};
use std::{fmt,
          sync::{Arc, MutexGuard, PoisonError}};

/// Host visible memory that reads copy into and writes copy out of. Shared, because the
/// host keeps its own handle while a read is parked.
pub type SafeHostBuffer = Arc<StdMutex<Vec<u8>>>;

/// Single use continuation that finalizes one `read` or `write` call with the number of
/// bytes transferred or an error. Being [`FnOnce`], it can't be called twice.
pub type Completion = Box<dyn FnOnce(BridgeResult<usize>) + Send>;

/// Make a [`SafeHostBuffer`] from some bytes.
#[must_use]
pub fn new_host_buffer(bytes: impl Into<Vec<u8>>) -> SafeHostBuffer {
    Arc::new(StdMutex::new(bytes.into()))
}

/// Lock a [`SafeHostBuffer`]. The buffer is plain bytes with no invariant that a panic
/// could break, so a poisoned lock is recovered from instead of propagated.
pub fn lock_host_buffer(buffer: &SafeHostBuffer) -> MutexGuard<'_, Vec<u8>> {
    buffer.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Append the single trailing line feed to a completed line.
#[must_use]
pub fn encode_line(line: &str) -> Vec<u8> {
    let mut encoded = Vec::with_capacity(line.len() + 1);
    encoded.extend_from_slice(line.as_bytes());
    encoded.push(LINE_FEED_BYTE);
    encoded
}

/// An outstanding read on `stdin`: where to put the line, and who to tell.
pub struct ReadRequest {
    pub buffer: SafeHostBuffer,
    pub offset: usize,
    /// The most bytes the caller will accept.
    pub length: usize,
    pub completion: Completion,
}

impl fmt::Debug for ReadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadRequest")
            .field("offset", &self.offset)
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}

/// A [`Completion`] paired with the result it must be called with. Returned from
/// operations on the bridge so the caller can release any lock it holds before
/// [`invoke`](Self::invoke)-ing it, since the continuation may call right back into the
/// bridge (eg: issue the next read).
#[must_use = "the completion must be invoked, or the caller is never resumed"]
pub struct ReadyCompletion {
    pub completion: Completion,
    pub result: BridgeResult<usize>,
}

impl fmt::Debug for ReadyCompletion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadyCompletion")
            .field("result", &self.result)
            .finish_non_exhaustive()
    }
}

impl ReadyCompletion {
    pub fn new(completion: Completion, result: BridgeResult<usize>) -> Self {
        Self { completion, result }
    }

    pub fn invoke(self) { (self.completion)(self.result); }
}

/// Holds at most one parked read on `stdin`.
///
/// ```text
/// Empty ──install──▶ Awaiting ──take_fulfillment──▶ Empty
///                       │
///                       └──install──▶ DoubleRead (slot unchanged)
/// ```
#[derive(Debug, Default)]
pub enum PendingReadSlot {
    #[default]
    Empty,
    Awaiting(ReadRequest),
}

impl PendingReadSlot {
    #[must_use]
    pub fn is_awaiting(&self) -> bool { matches!(self, PendingReadSlot::Awaiting(_)) }

    /// Park `request`.
    ///
    /// # Errors
    ///
    /// If a read is already parked, the slot is left untouched, and the rejected request
    /// is handed back along with [`BridgeError::DoubleRead`] so its completion can be
    /// failed.
    pub fn install(
        &mut self,
        request: ReadRequest,
    ) -> Result<(), (ReadRequest, BridgeError)> {
        match self {
            PendingReadSlot::Awaiting(_) => Err((request, BridgeError::DoubleRead)),
            PendingReadSlot::Empty => {
                *self = PendingReadSlot::Awaiting(request);
                Ok(())
            }
        }
    }

    /// Deliver `line` to the parked read, if there is one, and empty the slot.
    ///
    /// The line is encoded with a trailing `\n` (`n` bytes), and the first
    /// `k = min(length, n)` bytes are copied to `buffer[offset..offset + k]`. The rest of
    /// the line is dropped; it is not carried over to the next read. The returned
    /// completion carries `Ok(k)`.
    pub fn take_fulfillment(&mut self, line: &str) -> Option<ReadyCompletion> {
        let PendingReadSlot::Awaiting(request) = std::mem::take(self) else {
            return None;
        };

        let ReadRequest {
            buffer,
            offset,
            length,
            completion,
        } = request;

        let encoded = encode_line(line);
        let result = copy_into(&buffer, offset, length, &encoded);

        Some(ReadyCompletion::new(completion, result))
    }
}

/// Copies as much of `source` as fits into `buffer[offset..offset + length]`. The span
/// was checked when the read was parked, but the host still owns the buffer and could
/// have shrunk it since, so it is checked again.
fn copy_into(
    buffer: &SafeHostBuffer,
    offset: usize,
    length: usize,
    source: &[u8],
) -> BridgeResult<usize> {
    let mut guard = lock_host_buffer(buffer);
    BridgeError::check_span(offset, length, guard.len())?;
    let count = length.min(source.len());
    guard[offset..offset + count].copy_from_slice(&source[..count]);
    Ok(count)
}
